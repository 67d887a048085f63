//! Shared types for ToyScript.
//!
//! This crate defines the AST node types, source spans and the script error
//! taxonomy shared by the lexer, the parser and the evaluator.

mod error;
mod span;
pub mod ast;

pub use error::{ErrorKind, ScriptError, MAX_ERRORS};
pub use span::{SourceFile, Span};
