//! Non-local control flow.

use toyscript_types::{ScriptError, Span};

use crate::value::Value;

/// Outcome of executing a statement.
///
/// Anything other than `None` unwinds through enclosing statements until
/// a construct that understands it consumes it: loops take `Break` and
/// `Continue`, calls take `Return`, `try` takes `Throw`, and the program
/// top level takes `Exit`.
#[derive(Debug, Clone)]
pub enum Signal {
    None,
    Return(Value, Span),
    Break(Span),
    Continue(Span),
    Throw(Value, Span),
    Exit(Value, Span),
}

impl Signal {
    pub fn is_none(&self) -> bool {
        matches!(self, Signal::None)
    }

    /// Keyword that raised the signal, for diagnostics.
    pub fn keyword(&self) -> &'static str {
        match self {
            Signal::None => "none",
            Signal::Return(..) => "return",
            Signal::Break(_) => "break",
            Signal::Continue(_) => "continue",
            Signal::Throw(..) => "throw",
            Signal::Exit(..) => "exit",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Signal::None => None,
            Signal::Return(_, span)
            | Signal::Break(span)
            | Signal::Continue(span)
            | Signal::Throw(_, span)
            | Signal::Exit(_, span) => Some(*span),
        }
    }
}

/// Why expression evaluation stopped early: a fatal error, or a `throw` /
/// `exit` raised inside a called function that must keep unwinding.
#[derive(Debug)]
pub enum Unwind {
    Signal(Signal),
    Error(ScriptError),
}

impl From<ScriptError> for Unwind {
    fn from(err: ScriptError) -> Self {
        Unwind::Error(err)
    }
}

/// Result of evaluating an expression.
pub type EvalResult<T> = Result<T, Unwind>;

/// Result of executing a statement.
pub type ExecResult = Result<Signal, ScriptError>;
