//! # Structural Tokens
//!
//! Defines the tokens of the structural tape built from a JSON document.
use std::fmt::Display;

/// The kind of a token read from a JSON document.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub enum TokenKind {
    /* Delimiters */
    /// Opening curly brace
    LCurly,

    /// Closing curly brace
    RCurly,

    /// Opening square bracket
    LSquare,

    /// Closing square bracket
    RSquare,

    /// Colon character
    Colon,

    /// Comma character
    Comma,

    /* Values */
    /// Nil value
    Null,

    /// Boolean value
    Bool(bool),

    /// String value. The byte span excludes the surrounding quotes.
    Str {
        /// Set when the raw content contains at least one backslash escape.
        escaped: bool,
    },

    /// Numeric value
    Number,

    /* Reserved */
    /// Invalid character, bad literal or unterminated string
    Illegal,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns `true` if a value may start with this token.
    #[must_use]
    pub const fn starts_value(self) -> bool {
        matches!(
            self,
            Self::LCurly
                | Self::LSquare
                | Self::Null
                | Self::Bool(_)
                | Self::Str { .. }
                | Self::Number
        )
    }
}

/// A token on the tape together with the input bytes it covers.
#[derive(Debug, PartialEq, Clone, Copy, Eq)]
pub struct Token {
    /// What was read
    pub kind: TokenKind,
    /// Byte offset of the first byte of the token
    pub start: usize,
    /// Byte offset one past the last byte of the token
    pub end: usize,
}

impl Token {
    /// Byte range of the token's payload. For strings the quotes are
    /// stripped; for every other kind this is the whole token.
    #[must_use]
    pub const fn content(&self) -> std::ops::Range<usize> {
        match self.kind {
            TokenKind::Str { .. } => self.start + 1..self.end - 1,
            _ => self.start..self.end,
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LCurly => write!(f, "'{{'"),
            Self::RCurly => write!(f, "'}}'"),
            Self::LSquare => write!(f, "'['"),
            Self::RSquare => write!(f, "']'"),
            Self::Colon => write!(f, "':'"),
            Self::Comma => write!(f, "','"),
            Self::Null => write!(f, "null"),
            Self::Bool(val) => write!(f, "{val}"),
            Self::Str { .. } => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Illegal => write!(f, "illegal token"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}
