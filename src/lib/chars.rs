//! A char stream similar to `CharIndices` but that tracks line/column
//! position, and a stack of such streams for `\input` nesting.
//!
//! Owns its source as a `Vec<char>` rather than borrowing `&'source str`,
//! so that `\input` can push a freshly-read file onto the Eyes without
//! fighting the borrow checker over an unbounded nesting depth.

/// One line-oriented character source: a file's (or a string's) contents,
/// plus a cursor tracking line and column.
#[derive(Debug, Clone)]
pub struct InputSource {
    pub name: Option<String>,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl InputSource {
    #[must_use]
    pub fn new(contents: impl Into<String>, name: Option<String>) -> Self {
        Self {
            name,
            chars: contents.into().chars().collect(),
            pos: 0,
            line: 1,
            column: 0,
        }
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[must_use]
    pub fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Consumes and returns the next character along with the position it
    /// was read at, advancing line/column bookkeeping.
    pub fn advance(&mut self) -> Option<(char, usize, usize)> {
        let c = *self.chars.get(self.pos)?;
        let (line, column) = (self.line, self.column);
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some((c, line, column))
    }

    /// Skips the remainder of the current line, including its terminating
    /// newline if present (used by comment handling).
    pub fn skip_to_end_of_line(&mut self) {
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }
}

/// The stack of input sources owned by the environment: the main file (or
/// string) plus any files pushed by `\input`.
#[derive(Debug, Clone, Default)]
pub struct InputStack {
    sources: Vec<InputSource>,
}

impl InputStack {
    #[must_use]
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    pub fn push(&mut self, source: InputSource) {
        self.sources.push(source);
    }

    /// Pops the current (innermost) source, e.g. on exhaustion or
    /// `\endinput`.
    pub fn pop(&mut self) -> Option<InputSource> {
        self.sources.pop()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.iter().all(InputSource::is_at_end)
    }

    fn current_mut(&mut self) -> Option<&mut InputSource> {
        // Drop exhausted sources so the stack always reflects live input.
        while matches!(self.sources.last(), Some(s) if s.is_at_end()) {
            self.sources.pop();
        }
        self.sources.last_mut()
    }

    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.sources.last().and_then(|s| s.name.as_deref())
    }

    #[must_use]
    pub fn peek(&mut self) -> Option<char> {
        self.current_mut().and_then(InputSource::peek)
    }

    #[must_use]
    pub fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.current_mut().and_then(|s| s.peek_at(offset))
    }

    pub fn advance(&mut self) -> Option<(char, usize, usize, Option<String>)> {
        let name = self.current_name().map(str::to_owned);
        let (c, line, column) = self.current_mut()?.advance()?;
        Some((c, line, column, name))
    }

    pub fn skip_to_end_of_line(&mut self) {
        if let Some(source) = self.current_mut() {
            source.skip_to_end_of_line();
        }
    }

    /// `true` when the innermost source is exhausted (used by `\endinput`
    /// to decide when to pop it on the next end-of-line).
    #[must_use]
    pub fn current_is_at_end(&self) -> bool {
        match self.sources.last() {
            Some(source) => source.is_at_end(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column() {
        let mut src = InputSource::new("ab\ncd", None);
        assert_eq!(src.advance(), Some(('a', 1, 0)));
        assert_eq!(src.advance(), Some(('b', 1, 1)));
        assert_eq!(src.advance(), Some(('\n', 1, 2)));
        assert_eq!(src.advance(), Some(('c', 2, 0)));
    }

    #[test]
    fn stack_falls_through_to_parent_when_child_exhausted() {
        let mut stack = InputStack::new();
        stack.push(InputSource::new("outer", None));
        stack.push(InputSource::new("in", None));
        assert_eq!(stack.advance().unwrap().0, 'i');
        assert_eq!(stack.advance().unwrap().0, 'n');
        assert_eq!(stack.advance().unwrap().0, 'o');
    }
}
