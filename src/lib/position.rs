//! Source positions, including the "stacked" positions produced when a
//! token is the result of macro expansion rather than raw input.

use std::fmt;

/// A location in some named input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub source_name: Option<String>,
    /// When this position was produced by substituting a parameter into a
    /// macro's replacement text, `parent` holds the call-site position.
    pub parent: Option<Box<Position>>,
}

impl Position {
    #[must_use]
    pub fn new(line: usize, column: usize, source_name: Option<String>) -> Self {
        Self {
            line,
            column,
            source_name,
            parent: None,
        }
    }

    /// The position used before any input has been read.
    #[must_use]
    pub fn initial() -> Self {
        Self::new(1, 0, None)
    }

    /// Returns a copy of `self` stacked on top of `call_site`, recording
    /// that this token's text originates from an expansion performed at
    /// `call_site`.
    #[must_use]
    pub fn stacked(self, call_site: Position) -> Self {
        Self {
            parent: Some(Box::new(call_site)),
            ..self
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.column)?;
        if let Some(parent) = &self.parent {
            write!(f, " expanded from position [{parent}]")?;
        }
        Ok(())
    }
}
