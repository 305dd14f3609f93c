//! Scanner errors.

use std::fmt;
use std::ops::Range;

/// Byte range in the source text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn from_range(range: Range<usize>) -> Self {
        Span {
            start: u32::try_from(range.start).unwrap_or(u32::MAX),
            end: u32::try_from(range.end).unwrap_or(u32::MAX),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// What went wrong while scanning.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("invalid token `{text}`")]
    InvalidToken { text: String },
    #[error("integer literal does not fit in 64 bits")]
    IntOverflow,
    #[error("invalid escape `\\{escape}` in text")]
    InvalidEscape { escape: char },
    #[error("`{open}` is never closed")]
    Unclosed { open: char },
    #[error("unexpected `{close}`")]
    UnexpectedClose { close: char },
    #[error("`{close}` does not match `{open}`")]
    Mismatched { open: char, close: char },
    #[error("quote is not followed by a value")]
    DanglingQuote,
}

/// A scanner error located in the source.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at {span}")]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

impl LexError {
    #[cold]
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }
}
