//! Words: the scalar values

use std::borrow::Cow;
use std::rc::Rc;

use super::display::format_number;

/// A scalar: text as written, or a number produced by arithmetic.
#[derive(Debug, Clone)]
pub enum Word {
    /// Text, possibly numeric-looking (`"10"`)
    Text(Rc<str>),

    /// A computed number
    Number(f64),
}

impl Word {
    /// The word's text.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Word::Text(s) => Cow::Borrowed(s),
            Word::Number(n) => Cow::Owned(format_number(*n)),
        }
    }

    /// The raw text, when the word is textual.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Word::Text(s) => Some(s),
            Word::Number(_) => None,
        }
    }

    /// Numeric value of the word, when it has one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Word::Number(n) => Some(*n),
            Word::Text(s) if is_number(s) => s.parse().ok(),
            Word::Text(_) => None,
        }
    }

    /// Whether this word was produced as a number.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Word::Number(_))
    }
}

impl PartialEq for Word {
    /// Numeric comparison if either side is a number, text comparison
    /// otherwise.
    fn eq(&self, other: &Self) -> bool {
        if self.is_numeric() || other.is_numeric() {
            match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            }
        } else {
            self.text() == other.text()
        }
    }
}

/// Whether `s` is a number literal: optional `-`, digits with an optional
/// fraction, optional exponent. `.5` is a number, `5.` is not.
pub fn is_number(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    } else if int_digits == 0 {
        return false;
    }

    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        i += 1;
        if i < bytes.len() && (bytes[i] == b'-' || bytes[i] == b'+') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
