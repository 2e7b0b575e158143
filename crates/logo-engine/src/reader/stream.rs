//! Character scanner with escapes, comments and line continuations

/// One character of input, remembering whether it was escaped with `\`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ch {
    /// An ordinary character
    Plain(char),
    /// A character preceded by `\`; never a delimiter
    Escaped(char),
}

impl Ch {
    /// The character itself.
    pub fn value(self) -> char {
        match self {
            Ch::Plain(c) | Ch::Escaped(c) => c,
        }
    }

    /// Whether this is the unescaped character `c`.
    pub fn is(self, c: char) -> bool {
        self == Ch::Plain(c)
    }

    /// Whether this is an unescaped character from `set`.
    pub fn is_in(self, set: &str) -> bool {
        matches!(self, Ch::Plain(c) if set.contains(c))
    }
}

/// Scanner over script text.
///
/// Comments (`;` to end of line) and `~` line continuations are skipped
/// after every character taken, so they may appear anywhere, including
/// inside words.
pub struct Stream {
    chars: Vec<char>,
    index: usize,
}

impl Stream {
    /// Scan `text`.
    pub fn new(text: &str) -> Self {
        let mut chars: Vec<char> = text.chars().collect();
        let trailing = chars.iter().rev().take_while(|c| **c == '\\').count();
        if trailing % 2 == 1 {
            chars.pop();
        }
        let mut stream = Self { chars, index: 0 };
        stream.skip();
        stream
    }

    /// Whether all input was consumed.
    pub fn eof(&self) -> bool {
        self.index >= self.chars.len()
    }

    /// The next character without consuming it.
    pub fn peek(&self) -> Option<Ch> {
        let c = *self.chars.get(self.index)?;
        if c == '\\' {
            self.chars.get(self.index + 1).map(|e| Ch::Escaped(*e))
        } else {
            Some(Ch::Plain(c))
        }
    }

    /// Consume the next character, then skip any comment or continuation.
    pub fn get(&mut self) -> Option<Ch> {
        let c = self.next_raw();
        self.skip();
        c
    }

    /// Unconsumed input.
    pub fn rest(&self) -> String {
        self.chars[self.index.min(self.chars.len())..].iter().collect()
    }

    fn next_raw(&mut self) -> Option<Ch> {
        let c = self.peek()?;
        self.index += match c {
            Ch::Plain(_) => 1,
            Ch::Escaped(_) => 2,
        };
        Some(c)
    }

    fn skip(&mut self) {
        while let Some(c) = self.peek() {
            if c.is('~') && self.chars.get(self.index + 1) == Some(&'\n') {
                self.index += 2;
            } else if c.is(';') {
                let mut last = None;
                loop {
                    last = self.next_raw().or(last);
                    match self.peek() {
                        Some(next) if !next.is('\n') => continue,
                        _ => break,
                    }
                }
                if last.is_some_and(|l| l.is('~')) {
                    self.next_raw();
                }
            } else {
                return;
            }
        }
    }
}
