use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of syntax errors collected before the parser gives up.
pub const MAX_ERRORS: usize = 20;

/// Category of a [`ScriptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed source text, reported before evaluation starts.
    Syntax,
    /// Duplicate declaration in one scope, or an unresolved identifier.
    Declaration,
    /// An operation needed an array, string, struct or function and got something else.
    TypeMismatch,
    IndexOutOfBounds,
    MemberNotFound,
    /// A function name used as a plain value.
    FunctionReference,
    /// A script `throw` nobody caught.
    UserThrow,
    /// `break`, `continue` or `return` outside its construct.
    IllegalSignal,
    /// A native library call failed.
    HostIo,
    /// Arithmetic faults, negative array sizes, call depth exhaustion.
    Runtime,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Syntax => "syntax error",
            Self::Declaration => "declaration error",
            Self::TypeMismatch => "type mismatch",
            Self::IndexOutOfBounds => "index out of bounds",
            Self::MemberNotFound => "member not found",
            Self::FunctionReference => "function reference",
            Self::UserThrow => "uncaught throw",
            Self::IllegalSignal => "illegal signal",
            Self::HostIo => "host I/O error",
            Self::Runtime => "runtime error",
        };
        f.write_str(name)
    }
}

/// An error surfaced to the host: a syntax error from the front end or a
/// fatal runtime error from the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The source line the error points into, when the source is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span: Some(span),
            source_line: None,
        }
    }

    /// An error with no source position.
    pub fn unlocated(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
            source_line: None,
        }
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }

    pub fn line(&self) -> Option<u32> {
        self.span.map(|s| s.start_line)
    }

    pub fn column(&self) -> Option<u32> {
        self.span.map(|s| s.start_col)
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(span) = self.span {
            write!(f, " at {span}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}
