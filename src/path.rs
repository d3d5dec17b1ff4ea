//! # JSON Path Expressions
//!
//! A compact JSONPath subset for pulling values out of JSON documents:
//! - The root `$`, dot (`.key`) and bracket (`["key"]`, `[0]`) child access
//! - Bare all-digit tokens that match array positions and object keys alike
//! - The `*` wildcard and `..` recursive descent
//!
//! Paths compile once into an immutable [`PathProgram`] which [`evaluate`]
//! runs against lazily-read documents.

pub mod ast;
pub mod eval;
pub mod parser;

// Re-exports
pub use ast::*;
pub use eval::evaluate;
pub use parser::{PathParseError, compile};
