//! Value coercion and operator semantics.
//!
//! Numeric operators work on the result of [`number_cast`]: two ints stay
//! an int (wrapping on overflow), anything involving a float promotes both
//! sides to `f32`. `+` concatenates as soon as either side is a string.

use std::rc::Rc;

use toyscript_types::ast::{BinOp, UnaryOp};

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OpError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Modulo by zero")]
    ModuloByZero,
}

/// A value seen as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i32),
    Float(f32),
}

impl Number {
    pub fn as_f32(self) -> f32 {
        match self {
            Number::Int(n) => n as f32,
            Number::Float(n) => n,
        }
    }

    /// Truncates floats toward zero, saturating at the `i32` range.
    pub fn as_i32(self) -> i32 {
        match self {
            Number::Int(n) => n,
            Number::Float(n) => n as i32,
        }
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(n) => Value::Int(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Casts
// ══════════════════════════════════════════════════════════════════════════

pub fn number_cast(value: &Value) -> Number {
    match value {
        Value::Null => Number::Int(0),
        Value::Bool(b) => Number::Int(i32::from(*b)),
        Value::Int(n) => Number::Int(*n),
        Value::Float(n) => Number::Float(*n),
        Value::String(s) => Number::Int(if s.trim().is_empty() { 0 } else { 1 }),
        Value::Array(_) | Value::Struct(_) | Value::Function(_) | Value::Native(_) => {
            Number::Int(1)
        }
    }
}

pub fn int_cast(value: &Value) -> i32 {
    number_cast(value).as_i32()
}

pub fn bool_cast(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(n) => *n != 0.0,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(_) | Value::Struct(_) | Value::Function(_) | Value::Native(_) => true,
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Operators
// ══════════════════════════════════════════════════════════════════════════

/// Apply a binary operator to two already-evaluated operands.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> Result<Value, OpError> {
    let value = match op {
        BinOp::Add => add(left, right),
        BinOp::Sub => arith(left, right, i32::wrapping_sub, |a, b| a - b),
        BinOp::Mul => arith(left, right, i32::wrapping_mul, |a, b| a * b),
        BinOp::Div => div(left, right)?,
        BinOp::Mod => rem(left, right)?,
        BinOp::Eq => Value::Bool(loose_eq(left, right)),
        BinOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinOp::Less => Value::Bool(less(left, right)),
        BinOp::Greater => Value::Bool(less(right, left)),
        BinOp::LessEq => Value::Bool(!less(right, left)),
        BinOp::GreaterEq => Value::Bool(!less(left, right)),
        BinOp::And => Value::Bool(bool_cast(left) && bool_cast(right)),
        BinOp::Or => Value::Bool(bool_cast(left) || bool_cast(right)),
    };
    Ok(value)
}

pub fn unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Neg => match number_cast(operand) {
            Number::Int(n) => Value::Int(n.wrapping_neg()),
            Number::Float(n) => Value::Float(-n),
        },
        UnaryOp::Not => Value::Bool(!bool_cast(operand)),
    }
}

pub fn add(left: &Value, right: &Value) -> Value {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        return Value::String(format!("{left}{right}"));
    }
    arith(left, right, i32::wrapping_add, |a, b| a + b)
}

fn arith(
    left: &Value,
    right: &Value,
    int_op: fn(i32, i32) -> i32,
    float_op: fn(f32, f32) -> f32,
) -> Value {
    match (number_cast(left), number_cast(right)) {
        (Number::Int(a), Number::Int(b)) => Value::Int(int_op(a, b)),
        (a, b) => Value::Float(float_op(a.as_f32(), b.as_f32())),
    }
}

/// Int division truncates toward zero and rejects a zero divisor; float
/// division follows IEEE 754.
pub fn div(left: &Value, right: &Value) -> Result<Value, OpError> {
    match (number_cast(left), number_cast(right)) {
        (Number::Int(_), Number::Int(0)) => Err(OpError::DivisionByZero),
        (Number::Int(a), Number::Int(b)) => Ok(Value::Int(a.wrapping_div(b))),
        (a, b) => Ok(Value::Float(a.as_f32() / b.as_f32())),
    }
}

/// Both operands are cast to int first.
pub fn rem(left: &Value, right: &Value) -> Result<Value, OpError> {
    let (a, b) = (int_cast(left), int_cast(right));
    if b == 0 {
        return Err(OpError::ModuloByZero);
    }
    Ok(Value::Int(a.wrapping_rem(b)))
}

fn less(left: &Value, right: &Value) -> bool {
    match (number_cast(left), number_cast(right)) {
        (Number::Int(a), Number::Int(b)) => a < b,
        (a, b) => a.as_f32() < b.as_f32(),
    }
}

/// Script `==`.
///
/// `null` equals only `null`; strings compare by value; arrays, structs and
/// callables by identity; booleans and numbers by numeric promotion. Any
/// other pairing of different kinds is unequal.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
        (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b),
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
        (
            Value::Bool(_) | Value::Int(_) | Value::Float(_),
            Value::Bool(_) | Value::Int(_) | Value::Float(_),
        ) => match (number_cast(left), number_cast(right)) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f32() == b.as_f32(),
        },
        _ => false,
    }
}
