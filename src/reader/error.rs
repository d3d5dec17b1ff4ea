//! Errors raised by the on-demand reader.
use std::error::Error;
use std::fmt;

use crate::reader::TokenKind;

/// What went wrong while reading a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonErrorKind {
    /// The document contains no value at all.
    Empty,
    /// A byte sequence that is not a JSON token, e.g. an unterminated string
    /// or a misspelled literal.
    IllegalToken,
    /// A closing bracket without a matching opening bracket, or the reverse.
    UnbalancedBracket,
    /// A well-formed token appeared where the grammar does not allow it.
    UnexpectedToken {
        /// What the reader needed at this position
        expected: &'static str,
        /// What it found instead
        found: TokenKind,
    },
    /// More than one top-level value.
    TrailingContent,
    /// A string whose escapes or encoding are invalid.
    InvalidString,
    /// Number text that does not follow the JSON number grammar.
    InvalidNumber,
    /// Nesting deeper than the configured limit.
    DepthLimitExceeded(usize),
}

/// A malformed-document error, located by byte offset.
///
/// Malformed documents are ordinary input for batch extraction, so this is
/// returned as a value and never panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonError {
    /// Category of the failure
    pub kind: JsonErrorKind,
    /// Byte offset in the document where the failure was detected
    pub offset: usize,
}

impl JsonError {
    pub(crate) const fn new(kind: JsonErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl Error for JsonError {}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            JsonErrorKind::Empty => write!(f, "empty JSON document"),
            JsonErrorKind::IllegalToken => {
                write!(f, "illegal token at byte {}", self.offset)
            }
            JsonErrorKind::UnbalancedBracket => {
                write!(f, "unbalanced bracket at byte {}", self.offset)
            }
            JsonErrorKind::UnexpectedToken { expected, found } => write!(
                f,
                "expected {expected} at byte {}, found {found}",
                self.offset
            ),
            JsonErrorKind::TrailingContent => {
                write!(f, "trailing content at byte {}", self.offset)
            }
            JsonErrorKind::InvalidString => {
                write!(f, "invalid string at byte {}", self.offset)
            }
            JsonErrorKind::InvalidNumber => {
                write!(f, "invalid number at byte {}", self.offset)
            }
            JsonErrorKind::DepthLimitExceeded(limit) => write!(
                f,
                "nesting deeper than {limit} levels at byte {}",
                self.offset
            ),
        }
    }
}
