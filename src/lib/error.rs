//! Error and Result structures used all across this crate.

use crate::position::Position;

/// Enumeration of all possible error types produced by the pipeline.
///
/// Each variant that can be attributed to a point in the input carries the
/// [`Position`] at which it was raised; stacked positions (produced by macro
/// expansion) render via [`Position`]'s own `Display` impl.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from reading and writing to IO (see [`std::io::Error`]).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Invalid `^^`-escape, control-sequence name running off the end of
    /// input, or an invalid-category character in the input.
    #[error("[{position}] {message}")]
    Lexical { position: Position, message: String },

    /// Undefined control sequence used where a definition is required,
    /// `\outer` inside a macro argument, `\par` in a non-`\long` argument,
    /// or an unmatched `}`.
    #[error("[{position}] {message}")]
    Expansion { position: Position, message: String },

    /// Expected keyword/character/number/dimension/glue not found, or
    /// non-consecutively numbered macro parameters.
    #[error("[{position}] {message}")]
    Parse { position: Position, message: String },

    /// Integer outside its declared bit range.
    #[error("[{position}] {value} is out of range (expected {range})")]
    Range {
        position: Position,
        value: i64,
        range: &'static str,
    },

    /// `\input` target missing.
    #[error("[{position}] could not find file '{filename}'")]
    InputNotFound { position: Position, filename: String },

    /// Surfaced by `\errmessage`.
    #[error("[{position}] {message}")]
    User { position: Position, message: String },

    /// Invariant violation; should be unreachable in correct operation.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The [`Position`] this error was raised at, when one is known.
    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        match self {
            Self::Lexical { position, .. }
            | Self::Expansion { position, .. }
            | Self::Parse { position, .. }
            | Self::Range { position, .. }
            | Self::InputNotFound { position, .. }
            | Self::User { position, .. } => Some(position),
            Self::Io(_) | Self::Internal(_) => None,
        }
    }
}

/// Result type alias with error type defined above (see [`Error`]).
pub type Result<T> = std::result::Result<T, Error>;
