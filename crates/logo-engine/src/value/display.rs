//! Display and Debug implementations for Value

use std::fmt;

use super::word::is_number;
use super::*;
use crate::reader::{is_infix, QUOTED_DELIMITERS, WORD_DELIMITERS};

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Word(Word::Text(s)) => write!(f, "{:?}", s),
            Value::Word(Word::Number(n)) => write!(f, "{}", format_number(*n)),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Array(array) => write!(f, "{:?}", array),
        }
    }
}

/// Show form: lists keep their brackets, arrays their braces.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Word(word) => f.write_str(&word.text()),
            Value::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Value::Array(array) => {
                f.write_str("{")?;
                write_joined(f, &array.to_vec())?;
                f.write_str("}")?;
                if array.origin() != 1 {
                    write!(f, "@{}", array.origin())?;
                }
                Ok(())
            }
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Value {
    /// Print form: like the show form, minus the outermost brackets.
    pub fn print_form(&self) -> String {
        match self {
            Value::List(items) => items
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        }
    }

    /// Source text that the reader turns back into this value.
    pub fn to_source(&self) -> String {
        match self {
            Value::Word(word) => escape_list_word(&word.text()),
            Value::List(items) => format!("[{}]", source_contents(items)),
            Value::Array(array) => {
                let mut out = format!("{{{}}}", source_contents(&array.to_vec()));
                if array.origin() != 1 {
                    out.push_str(&format!("@{}", array.origin()));
                }
                out
            }
        }
    }
}

/// Source text of list elements without the enclosing brackets.
pub(crate) fn source_contents(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::to_source)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a number the way words print it.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else {
        format!("{}", n)
    }
}

fn escape_chars(out: &mut String, text: &str, special: &str) {
    for c in text.chars() {
        if special.contains(c) || c == ';' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
}

/// Escape a word that sits inside a list literal.
pub fn escape_list_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    escape_chars(&mut out, word, " \u{c}\n\r\t\u{b}[]{}");
    out
}

/// Escape a word that sits at instruction level, so that tokenizing the
/// result yields the same single token.
pub fn escape_token_word(word: &str) -> String {
    if word.is_empty() || is_number(word) || is_infix(word) || matches!(word, "(" | ")") {
        return word.to_string();
    }
    let mut out = String::with_capacity(word.len() + 2);
    if let Some(rest) = word.strip_prefix('"') {
        out.push('"');
        escape_chars(&mut out, rest, QUOTED_DELIMITERS);
    } else {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            if first.is_ascii_digit() {
                out.push('\\');
                out.push(first);
                escape_chars(&mut out, chars.as_str(), WORD_DELIMITERS);
            } else {
                escape_chars(&mut out, word, WORD_DELIMITERS);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_show_form() {
        let v = Value::list(vec![
            Value::word("fd"),
            Value::number(10.0),
            Value::list(vec![Value::word("rt"), Value::word("90")]),
        ]);
        assert_eq!(v.to_string(), "[fd 10 [rt 90]]");
        assert_eq!(v.print_form(), "fd 10 [rt 90]");
    }

    #[test]
    fn test_array_origin_suffix() {
        let one = Value::Array(LogoArray::from_items(vec![Value::word("a")], 1));
        let zero = Value::Array(LogoArray::from_items(vec![Value::word("a")], 0));
        assert_eq!(one.to_string(), "{a}");
        assert_eq!(zero.to_string(), "{a}@0");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_escape_token_word() {
        assert_eq!(escape_token_word("\"a b"), "\"a\\ b");
        assert_eq!(escape_token_word("\"a-b"), "\"a-b");
        assert_eq!(escape_token_word("a+b"), "a\\+b");
        assert_eq!(escape_token_word("1.5e-3"), "1.5e-3");
        assert_eq!(escape_token_word("<="), "<=");
        assert_eq!(escape_token_word(":size"), ":size");
    }

    #[test]
    fn test_escape_list_word_keeps_operators() {
        assert_eq!(escape_list_word(":x+1"), ":x+1");
        assert_eq!(escape_list_word("a;b"), "a\\;b");
    }
}
