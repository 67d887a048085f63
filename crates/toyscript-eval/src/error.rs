//! Mapping of internal failures onto [`ScriptError`].

use toyscript_types::{ErrorKind, ScriptError, Span};

use crate::env::ScopeError;
use crate::ops::OpError;
use crate::value::{NativeError, Value};

pub(crate) fn scope_error(err: ScopeError, span: Span) -> ScriptError {
    ScriptError::new(ErrorKind::Declaration, err.to_string(), span)
}

pub(crate) fn op_error(err: OpError, span: Span) -> ScriptError {
    ScriptError::new(ErrorKind::Runtime, err.to_string(), span)
}

pub(crate) fn native_error(err: NativeError, span: Span) -> ScriptError {
    ScriptError::new(ErrorKind::HostIo, err.to_string(), span)
}

pub(crate) fn type_mismatch(expected: &str, found: &Value, span: Span) -> ScriptError {
    ScriptError::new(
        ErrorKind::TypeMismatch,
        format!("Expected {expected} but was {}", found.type_name()),
        span,
    )
}

pub(crate) fn function_reference(span: Span) -> ScriptError {
    ScriptError::new(
        ErrorKind::FunctionReference,
        "Function reference cannot be used in expression",
        span,
    )
}

pub(crate) fn index_out_of_bounds(index: i32, len: usize, span: Span) -> ScriptError {
    ScriptError::new(
        ErrorKind::IndexOutOfBounds,
        format!("Index {index} out of bounds for length {len}"),
        span,
    )
}

pub(crate) fn member_not_found(member: &str, span: Span) -> ScriptError {
    ScriptError::new(
        ErrorKind::MemberNotFound,
        format!("Member {member} not found"),
        span,
    )
}

pub(crate) fn illegal_signal(keyword: &str, span: Span) -> ScriptError {
    ScriptError::new(
        ErrorKind::IllegalSignal,
        format!("Token '{keyword}' in illegal position"),
        span,
    )
}

pub(crate) fn uncaught_throw(payload: &Value, span: Span) -> ScriptError {
    ScriptError::new(ErrorKind::UserThrow, payload.to_string(), span)
}

pub(crate) fn runtime(message: impl Into<String>, span: Span) -> ScriptError {
    ScriptError::new(ErrorKind::Runtime, message, span)
}
