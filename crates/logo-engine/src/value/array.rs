//! Arrays: fixed-size, identity-compared containers

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::Value;

/// A shared, mutable, fixed-length array with an index origin.
///
/// Cloning yields another handle to the same storage.
#[derive(Clone)]
pub struct LogoArray {
    inner: Rc<ArrayData>,
}

struct ArrayData {
    items: RefCell<Vec<Value>>,
    origin: i64,
}

impl LogoArray {
    /// An array of `size` empty lists.
    pub fn new(size: usize, origin: i64) -> Self {
        Self::from_items(vec![Value::empty_list(); size], origin)
    }

    /// An array holding `items`.
    pub fn from_items(items: Vec<Value>, origin: i64) -> Self {
        Self {
            inner: Rc::new(ArrayData {
                items: RefCell::new(items),
                origin,
            }),
        }
    }

    /// Index of the first element.
    pub fn origin(&self) -> i64 {
        self.inner.origin
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn offset(&self, index: i64) -> Option<usize> {
        let offset = usize::try_from(index.checked_sub(self.inner.origin)?).ok()?;
        (offset < self.len()).then_some(offset)
    }

    /// Element at `index` (origin-relative).
    pub fn item(&self, index: i64) -> Option<Value> {
        let offset = self.offset(index)?;
        self.inner.items.borrow().get(offset).cloned()
    }

    /// Replace the element at `index`. Returns false when out of bounds.
    pub fn set_item(&self, index: i64, value: Value) -> bool {
        match self.offset(index) {
            Some(offset) => {
                self.inner.items.borrow_mut()[offset] = value;
                true
            }
            None => false,
        }
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.items.borrow().clone()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &LogoArray) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for LogoArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogoArray")
            .field("origin", &self.inner.origin)
            .field("items", &self.inner.items.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_relative_indexing() {
        let array = LogoArray::from_items(vec![Value::word("a"), Value::word("b")], 0);
        assert_eq!(array.item(0), Some(Value::word("a")));
        assert_eq!(array.item(1), Some(Value::word("b")));
        assert_eq!(array.item(2), None);
        assert_eq!(array.item(-1), None);
    }

    #[test]
    fn test_set_item_is_visible_through_clones() {
        let array = LogoArray::new(3, 1);
        let alias = array.clone();
        assert!(alias.set_item(2, Value::number(7.0)));
        assert_eq!(array.item(2), Some(Value::number(7.0)));
        assert!(!array.set_item(4, Value::number(1.0)));
        assert!(array.ptr_eq(&alias));
    }

    #[test]
    fn test_new_array_holds_empty_lists() {
        let array = LogoArray::new(2, 1);
        assert_eq!(array.len(), 2);
        assert_eq!(array.item(1), Some(Value::empty_list()));
    }
}
