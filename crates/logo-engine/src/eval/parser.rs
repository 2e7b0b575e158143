//! Precedence-climbing parser from tokens to deferred expressions
//!
//! ```text
//! expression     := relational
//! relational     := additive ( ('=' | '<' | '>' | '<=' | '>=' | '<>') additive )*
//! additive       := multiplicative ( ('+' | '-') multiplicative )*
//! multiplicative := unary ( ('*' | '/' | '%') unary )*
//! unary          := '-' unary | power
//! power          := primary [ '^' unary ]
//! primary        := list | array | number | '"word | :name
//!                 | '(' procedure input* ')' | '(' expression ')' | procedure input*
//! ```

use crate::error::{ErrorCode, Result};
use crate::machine::Machine;
use crate::reader::{Token, TokenStream};
use crate::stack::ensure_sufficient_stack;
use crate::value::{is_number, Value};

use super::{BinaryOp, Deferred};

/// Parse one expression from the front of `tokens`.
///
/// Special forms (`TO`) run while being parsed.
pub fn parse_expression(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let mut lhs = parse_additive(m, tokens)?;
    while let Some(op) = peek_op(tokens, BinaryOp::relational) {
        tokens.next();
        let rhs = parse_additive(m, tokens)?;
        lhs = binary(op, lhs, rhs);
    }
    Ok(lhs)
}

fn peek_op(tokens: &TokenStream, tier: fn(&str) -> Option<BinaryOp>) -> Option<BinaryOp> {
    match tokens.peek()? {
        Token::Atom(Value::Word(w)) => tier(&w.text()),
        _ => None,
    }
}

fn binary(op: BinaryOp, lhs: Deferred, rhs: Deferred) -> Deferred {
    Deferred::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

fn parse_additive(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let mut lhs = parse_multiplicative(m, tokens)?;
    while let Some(op) = peek_op(tokens, BinaryOp::additive) {
        tokens.next();
        let rhs = parse_multiplicative(m, tokens)?;
        lhs = binary(op, lhs, rhs);
    }
    Ok(lhs)
}

fn parse_multiplicative(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let mut lhs = parse_unary(m, tokens)?;
    while let Some(op) = peek_op(tokens, BinaryOp::multiplicative) {
        tokens.next();
        let rhs = parse_unary(m, tokens)?;
        lhs = binary(op, lhs, rhs);
    }
    Ok(lhs)
}

fn parse_unary(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    ensure_sufficient_stack(|| {
        if matches!(tokens.peek(), Some(Token::UnaryMinus)) {
            tokens.next();
            let operand = parse_unary(m, tokens)?;
            return Ok(Deferred::Negate(Box::new(operand)));
        }
        parse_power(m, tokens)
    })
}

fn parse_power(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let base = parse_primary(m, tokens)?;
    if tokens.peek_is("^") {
        tokens.next();
        let exponent = parse_unary(m, tokens)?;
        return Ok(binary(BinaryOp::Pow, base, exponent));
    }
    Ok(base)
}

fn parse_primary(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let Some(token) = tokens.next() else {
        return Err(end_of_instructions(m));
    };

    let word = match token {
        Token::UnaryMinus => {
            let operand = parse_unary(m, tokens)?;
            return Ok(Deferred::Negate(Box::new(operand)));
        }
        Token::Atom(Value::Word(word)) => word.text().into_owned(),
        Token::Atom(value) => return Ok(Deferred::Literal(value)),
    };

    if is_number(&word) {
        let n = word.parse().unwrap_or(f64::NAN);
        return Ok(Deferred::Literal(Value::number(n)));
    }
    if let Some(literal) = word.strip_prefix('"').or_else(|| word.strip_prefix('\'')) {
        return Ok(Deferred::Literal(Value::word(literal)));
    }
    if let Some(name) = word.strip_prefix(':') {
        return Ok(Deferred::Variable(name.to_string()));
    }
    match word.as_str() {
        "(" => parse_parenthesized(m, tokens),
        ")" => Err(m.error(ErrorCode::BadParen, "Unexpected ')'", &[])),
        _ => m.dispatch(&word, tokens, true),
    }
}

/// After `(`: an explicit-arity call when a known procedure follows (and
/// isn't itself the left operand of an infix operator), otherwise a
/// grouped expression.
fn parse_parenthesized(m: &mut Machine, tokens: &mut TokenStream) -> Result<Deferred> {
    let call_name = match tokens.peek() {
        Some(Token::Atom(Value::Word(w))) => {
            let name = w.text().into_owned();
            let operand = tokens.peek_nth(1).is_some_and(Token::is_infix);
            (m.procedures.contains(&name) && !operand).then_some(name)
        }
        _ => None,
    };
    if let Some(name) = call_name {
        tokens.next();
        return m.dispatch(&name, tokens, false);
    }

    let inner = parse_expression(m, tokens)?;
    match tokens.next() {
        None => Err(m.error(ErrorCode::MissingParen, "Expected ')'", &[])),
        Some(t) if t.is_word(")") => Ok(inner),
        Some(t) => Err(m.error(
            ErrorCode::MissingParen,
            "Expected ')', saw {word}",
            &[("word", t.to_source().as_str())],
        )),
    }
}

fn end_of_instructions(m: &Machine) -> crate::error::EvalError {
    match &m.last_call {
        Some(last) => m.error(
            ErrorCode::MissingParen,
            "Unexpected end of instructions, {last} ?",
            &[("last", last.as_str())],
        ),
        None => m.error(ErrorCode::MissingParen, "Unexpected end of instructions", &[]),
    }
}
