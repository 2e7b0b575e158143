//! Value representation for runtime values

mod array;
mod display;
mod impls;
mod word;

pub use array::LogoArray;
pub(crate) use display::source_contents;
pub use display::{escape_list_word, escape_token_word, format_number};
pub use word::{is_number, Word};

use std::rc::Rc;

/// Runtime value: the Logo "atom".
///
/// - `Word` is an immutable scalar compared by value.
/// - `List` is an immutable, nestable sequence compared structurally. Clones
///   share the backing storage; [`Value::deep_copy`] does not.
/// - `Array` is a fixed-size mutable container compared by identity and
///   always shared by reference.
#[derive(Clone)]
pub enum Value {
    /// Text or number
    Word(Word),

    /// Ordered sequence of values
    List(Rc<Vec<Value>>),

    /// Fixed-length container with an index origin
    Array(LogoArray),
}

/// Type classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A word
    Word,
    /// A list
    List,
    /// An array
    Array,
}

impl ValueKind {
    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Word => "word",
            ValueKind::List => "list",
            ValueKind::Array => "array",
        }
    }
}
