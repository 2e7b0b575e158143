//! Value trait implementations: constructors, predicates, extractors, copying, PartialEq

use std::rc::Rc;

use super::*;

// ═══════════════════════════════════════════════════════════════════
// Convenience Constructors
// ═══════════════════════════════════════════════════════════════════

impl Value {
    /// Create a text word
    pub fn word(s: impl AsRef<str>) -> Self {
        Value::Word(Word::Text(Rc::from(s.as_ref())))
    }

    /// Create a numeric word
    pub fn number(n: f64) -> Self {
        Value::Word(Word::Number(n))
    }

    /// Create a `true`/`false` word
    pub fn boolean(b: bool) -> Self {
        Value::word(if b { "true" } else { "false" })
    }

    /// Create a list
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(items))
    }

    /// Create an empty list
    pub fn empty_list() -> Self {
        Value::list(Vec::new())
    }

    /// Create an array
    pub fn array(items: Vec<Value>, origin: i64) -> Self {
        Value::Array(LogoArray::from_items(items, origin))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Type Classification
    // ═══════════════════════════════════════════════════════════════════

    /// Which of the three shapes this value has.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Word(_) => ValueKind::Word,
            Value::List(_) => ValueKind::List,
            Value::Array(_) => ValueKind::Array,
        }
    }

    /// Check if value is a word
    pub fn is_word(&self) -> bool {
        matches!(self, Value::Word(_))
    }

    /// Check if value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Empty word or empty list
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Word(w) => w.text().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Array(_) => false,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value Extraction
    // ═══════════════════════════════════════════════════════════════════

    /// Get the word, if this is one
    pub fn as_word(&self) -> Option<&Word> {
        match self {
            Value::Word(w) => Some(w),
            _ => None,
        }
    }

    /// Get the numeric value of a word
    pub fn as_number(&self) -> Option<f64> {
        self.as_word().and_then(Word::as_number)
    }

    /// Get the list elements
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the array handle
    pub fn as_array(&self) -> Option<&LogoArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Copying
    // ═══════════════════════════════════════════════════════════════════

    /// Deep copy: lists are rebuilt recursively, words are returned as-is
    /// and arrays keep pointing at the same storage.
    pub fn deep_copy(&self) -> Value {
        match self {
            Value::List(items) => Value::list(items.iter().map(Value::deep_copy).collect()),
            other => other.clone(),
        }
    }

    /// Whether two values share storage (lists and arrays) or are the same
    /// word. Used to tell a copy from an alias.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Word(a), Value::Word(b)) => a == b,
            _ => false,
        }
    }

    /// Whether `needle` occurs anywhere inside this value (identity for
    /// containers, equality for words).
    pub fn contains(&self, needle: &Value) -> bool {
        if self.same_ref(needle) {
            return true;
        }
        match self {
            Value::List(items) => items.iter().any(|v| v.contains(needle)),
            Value::Array(array) => array.to_vec().iter().any(|v| v.contains(needle)),
            Value::Word(_) => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// From Implementations
// ═══════════════════════════════════════════════════════════════════

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::word(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

// ═══════════════════════════════════════════════════════════════════
// Equality
// ═══════════════════════════════════════════════════════════════════

/// Logo equality: words by value, lists structurally, arrays by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Word(a), Value::Word(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
