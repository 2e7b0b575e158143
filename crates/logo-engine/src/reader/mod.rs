//! Reader: script text to tokens
//!
//! The reader turns text into a flat sequence of [`Token`]s. Lists and
//! arrays are read recursively into values whose elements are left
//! unevaluated; everything else becomes a word.

mod stream;
mod tokenizer;

pub use stream::{Ch, Stream};
pub use tokenizer::tokenize;

use std::borrow::Cow;
use std::collections::VecDeque;

use thiserror::Error;

use crate::error::ErrorCode;
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════════════
// Character Classes
// ═══════════════════════════════════════════════════════════════════════

/// Whitespace separating tokens.
pub const WS_CHARS: &str = " \u{c}\n\r\t\u{b}";

/// Characters ending a quoted word.
pub const QUOTED_DELIMITERS: &str = " \u{c}\n\r\t\u{b}[](){}";

/// Characters ending a bare word or variable reference.
pub const WORD_DELIMITERS: &str = " \u{c}\n\r\t\u{b}[](){}+-*/%^=<>";

/// Characters that form operator tokens on their own.
pub const OPERATOR_CHARS: &str = "+-*/%^=<>[]{}()";

/// Arrows read as single-character words.
pub const OWN_WORD_CHARS: &str = "\u{2190}\u{2191}\u{2192}\u{2193}";

const INFIX_OPERATORS: [&str; 12] = ["+", "-", "*", "/", "%", "^", "=", "<", ">", "<=", ">=", "<>"];

/// Whether `word` is an infix operator.
pub fn is_infix(word: &str) -> bool {
    INFIX_OPERATORS.contains(&word)
}

/// Whether `word` is an infix operator or a bracket/paren.
pub fn is_operator(word: &str) -> bool {
    is_infix(word) || matches!(word, "[" | "]" | "{" | "}" | "(" | ")")
}

// ═══════════════════════════════════════════════════════════════════════
// Tokens
// ═══════════════════════════════════════════════════════════════════════

/// One unit of a tokenized script.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A word, list or array
    Atom(Value),

    /// A minus sign read as negation rather than subtraction
    UnaryMinus,
}

impl Token {
    /// Shorthand for a word token.
    pub fn word(text: &str) -> Self {
        Token::Atom(Value::word(text))
    }

    /// The text of a word token.
    pub fn word_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Token::Atom(Value::Word(w)) => Some(w.text()),
            _ => None,
        }
    }

    /// Whether this is the word `text` (exact match).
    pub fn is_word(&self, text: &str) -> bool {
        self.word_text().is_some_and(|w| w == text)
    }

    /// Whether this is an infix operator word.
    pub fn is_infix(&self) -> bool {
        self.word_text().is_some_and(|w| is_infix(&w))
    }

    /// Source text for this token.
    pub fn to_source(&self) -> String {
        match self {
            Token::Atom(Value::Word(w)) => crate::value::escape_token_word(&w.text()),
            Token::Atom(other) => other.to_source(),
            Token::UnaryMinus => "-".to_string(),
        }
    }
}

/// The remaining tokens of a statement sequence, consumed from the front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    tokens: VecDeque<Token>,
}

impl TokenStream {
    /// Wrap a token sequence.
    pub fn new(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    /// The next token, if any.
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.front()
    }

    /// The token `n` places ahead.
    pub fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(n)
    }

    /// Whether the next token is the word `text`.
    pub fn peek_is(&self, text: &str) -> bool {
        self.peek().is_some_and(|t| t.is_word(text))
    }

    /// Whether no tokens remain.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of remaining tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Remaining tokens, in order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }
}

/// Render tokens back to source text. A unary minus is glued to the
/// token that follows it.
pub fn tokens_to_source<'a>(tokens: impl IntoIterator<Item = &'a Token>) -> String {
    let mut out = String::new();
    let mut glue = false;
    for token in tokens {
        if !out.is_empty() && !glue {
            out.push(' ');
        }
        out.push_str(&token.to_source());
        glue = matches!(token, Token::UnaryMinus);
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════

/// Unbalanced brackets and braces.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// `]` with no open list
    #[error("Unexpected ']'")]
    UnexpectedBracket,

    /// End of input inside a list
    #[error("Expected ']'")]
    ExpectedBracket,

    /// `}` with no open array
    #[error("Unexpected '}}'")]
    UnexpectedBrace,

    /// End of input inside an array
    #[error("Expected '}}'")]
    ExpectedBrace,
}

impl ReadError {
    /// Message template, before localization.
    pub fn template(self) -> &'static str {
        match self {
            ReadError::UnexpectedBracket => "Unexpected ']'",
            ReadError::ExpectedBracket => "Expected ']'",
            ReadError::UnexpectedBrace => "Unexpected '}'",
            ReadError::ExpectedBrace => "Expected '}'",
        }
    }

    /// Error code reported to the host.
    pub fn code(self) -> ErrorCode {
        match self {
            ReadError::UnexpectedBracket | ReadError::ExpectedBracket => ErrorCode::BadBracket,
            ReadError::UnexpectedBrace | ReadError::ExpectedBrace => ErrorCode::BadBrace,
        }
    }
}
