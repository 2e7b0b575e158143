//! Text output collaborator

use std::cell::RefCell;
use std::rc::Rc;

/// Where `PRINT`, `SHOW` and `TYPE` write.
pub trait Console {
    /// Append text.
    fn write(&mut self, text: &str);

    /// Clear everything written so far.
    fn clear(&mut self);
}

/// Console that drops all output.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullConsole;

impl Console for NullConsole {
    fn write(&mut self, _text: &str) {}

    fn clear(&mut self) {}
}

/// Console collecting output in a shared buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferConsole {
    buffer: Rc<RefCell<String>>,
}

impl BufferConsole {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the buffer; stays valid after the console moves into an
    /// interpreter.
    pub fn buffer(&self) -> Rc<RefCell<String>> {
        Rc::clone(&self.buffer)
    }

    /// Copy of everything written.
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }
}

impl Console for BufferConsole {
    fn write(&mut self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }

    fn clear(&mut self) {
        self.buffer.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_is_shared() {
        let mut console = BufferConsole::new();
        let buffer = console.buffer();
        console.write("hello ");
        console.write("world\n");
        assert_eq!(*buffer.borrow(), "hello world\n");
        console.clear();
        assert!(console.contents().is_empty());
    }
}
