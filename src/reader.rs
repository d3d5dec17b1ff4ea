//! # On-demand JSON Reader
//!
//! Indexes a JSON byte buffer into a structural token tape and exposes lazy,
//! fallible [`Node`] handles over it. Nothing is decoded until a node is
//! inspected.
pub mod document;
pub mod error;
pub mod lexer;
pub mod token;

// Re-exports
pub use document::{
    Children, DEFAULT_MAX_DEPTH, Document, Elements, Fields, JsonType, Key,
    Limits, Node,
};
pub use error::{JsonError, JsonErrorKind};
pub use lexer::tokenize;
pub use token::{Token, TokenKind};
