//! Tokenizer: text to atoms, with unary minus disambiguation

use super::{
    Ch, ReadError, Stream, Token, TokenStream, OPERATOR_CHARS, OWN_WORD_CHARS, QUOTED_DELIMITERS,
    WORD_DELIMITERS, WS_CHARS,
};
use crate::stack::ensure_sufficient_stack;
use crate::value::{LogoArray, Value};

/// Tokenize a script.
///
/// A `-` is read as [`Token::UnaryMinus`] at the start of input, after an
/// infix operator, `(` or another unary minus, or when it is preceded by
/// whitespace and not followed by whitespace. Otherwise it is subtraction.
pub fn tokenize(text: &str) -> Result<TokenStream, ReadError> {
    let mut stream = Stream::new(text);
    let mut tokens: Vec<Token> = Vec::new();

    loop {
        let leading_space = is_ws(stream.peek());
        while is_ws(stream.peek()) {
            stream.get();
        }
        let Some(c) = stream.peek() else {
            break;
        };

        let token = if c.is('[') {
            stream.get();
            Token::Atom(read_list(&mut stream)?)
        } else if c.is(']') {
            return Err(ReadError::UnexpectedBracket);
        } else if c.is('{') {
            stream.get();
            Token::Atom(read_array(&mut stream)?)
        } else if c.is('}') {
            return Err(ReadError::UnexpectedBrace);
        } else if c.is('"') {
            Token::word(&read_delimited(&mut stream, QUOTED_DELIMITERS))
        } else if c.is_in(OWN_WORD_CHARS) {
            stream.get();
            Token::word(&c.value().to_string())
        } else if matches!(c, Ch::Plain(d) if d.is_ascii_digit()) {
            Token::word(&read_number(&mut stream))
        } else if c.is_in(OPERATOR_CHARS) {
            let op = read_operator(&mut stream);
            if op == "-" {
                let trailing_space = is_ws(stream.peek());
                let unary = match tokens.last() {
                    None => true,
                    Some(prev) => {
                        prev.is_infix()
                            || prev.is_word("(")
                            || matches!(prev, Token::UnaryMinus)
                            || (leading_space && !trailing_space)
                    }
                };
                if unary {
                    Token::UnaryMinus
                } else {
                    Token::word("-")
                }
            } else {
                Token::word(&op)
            }
        } else {
            Token::word(&read_delimited(&mut stream, WORD_DELIMITERS))
        };
        tokens.push(token);
    }

    Ok(TokenStream::new(tokens))
}

fn is_ws(c: Option<Ch>) -> bool {
    c.is_some_and(|c| c.is_in(WS_CHARS))
}

fn read_delimited(stream: &mut Stream, delimiters: &str) -> String {
    let mut word = String::new();
    while let Some(c) = stream.peek() {
        if c.is_in(delimiters) {
            break;
        }
        stream.get();
        word.push(c.value());
    }
    word
}

fn push_digits(stream: &mut Stream, word: &mut String) {
    while let Some(Ch::Plain(d)) = stream.peek() {
        if !d.is_ascii_digit() {
            break;
        }
        stream.get();
        word.push(d);
    }
}

/// Digits, an optional fraction and an optional exponent.
fn read_number(stream: &mut Stream) -> String {
    let mut word = String::new();
    push_digits(stream, &mut word);
    if stream.peek().is_some_and(|c| c.is('.')) {
        stream.get();
        word.push('.');
        push_digits(stream, &mut word);
    }
    if let Some(e) = stream.peek().filter(|c| c.is('e') || c.is('E')) {
        stream.get();
        word.push(e.value());
        if let Some(sign) = stream.peek().filter(|c| c.is('-') || c.is('+')) {
            stream.get();
            word.push(sign.value());
        }
        push_digits(stream, &mut word);
    }
    word
}

/// A single operator character, or one of `<=`, `>=`, `<>`.
fn read_operator(stream: &mut Stream) -> String {
    let mut word = String::new();
    if let Some(c) = stream.get() {
        word.push(c.value());
    }
    if let Some(next) = stream.peek() {
        let pair = matches!(
            (word.as_str(), next),
            ("<", Ch::Plain('=')) | (">", Ch::Plain('=')) | ("<", Ch::Plain('>'))
        );
        if pair {
            stream.get();
            word.push(next.value());
        }
    }
    word
}

enum Element {
    Item(Value),
    Close,
}

/// Read one list or array element. Words inside brackets end only at
/// whitespace and brackets.
fn read_element(stream: &mut Stream, close: char, eof: ReadError) -> Result<Element, ReadError> {
    while is_ws(stream.peek()) {
        stream.get();
    }
    let c = stream.get().ok_or(eof)?;
    match c {
        Ch::Plain(d) if d == close => Ok(Element::Close),
        Ch::Plain('[') => Ok(Element::Item(ensure_sufficient_stack(|| read_list(stream))?)),
        Ch::Plain('{') => Ok(Element::Item(ensure_sufficient_stack(|| read_array(stream))?)),
        Ch::Plain(']') => Err(ReadError::UnexpectedBracket),
        Ch::Plain('}') => Err(ReadError::UnexpectedBrace),
        first => {
            let mut word = String::new();
            word.push(first.value());
            while let Some(next) = stream.peek() {
                if next.is_in(WS_CHARS) || next.is_in("[]{}") {
                    break;
                }
                stream.get();
                word.push(next.value());
            }
            Ok(Element::Item(Value::word(word)))
        }
    }
}

/// Read list elements up to the matching `]` (the `[` is consumed).
fn read_list(stream: &mut Stream) -> Result<Value, ReadError> {
    let mut items = Vec::new();
    loop {
        match read_element(stream, ']', ReadError::ExpectedBracket)? {
            Element::Item(v) => items.push(v),
            Element::Close => return Ok(Value::list(items)),
        }
    }
}

/// Read array elements up to the matching `}` plus an optional `@origin`.
fn read_array(stream: &mut Stream) -> Result<Value, ReadError> {
    let mut items = Vec::new();
    loop {
        match read_element(stream, '}', ReadError::ExpectedBrace)? {
            Element::Item(v) => items.push(v),
            Element::Close => break,
        }
    }

    let mut origin = 1;
    while is_ws(stream.peek()) {
        stream.get();
    }
    if stream.peek().is_some_and(|c| c.is('@')) {
        stream.get();
        while is_ws(stream.peek()) {
            stream.get();
        }
        origin = read_integer(stream);
    }
    Ok(Value::Array(LogoArray::from_items(items, origin)))
}

fn read_integer(stream: &mut Stream) -> i64 {
    let mut word = String::new();
    if stream.peek().is_some_and(|c| c.is('-')) {
        stream.get();
        word.push('-');
    }
    push_digits(stream, &mut word);
    word.parse().unwrap_or(0)
}
