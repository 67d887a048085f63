//! Runtime values.
//!
//! Arrays and structs are shared by reference: cloning a [`Value`] clones the
//! handle, never the contents. Script functions hold only a weak handle to
//! their defining scope (see [`Closure`]).

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use toyscript_types::ast::FunctionDef;

use crate::env::WeakScope;

/// Field storage of a struct value, in declaration order.
pub type Fields = IndexMap<String, Value>;

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Array(Rc<RefCell<Vec<Value>>>),
    /// A closed record: the field set is fixed at construction.
    Struct(Rc<RefCell<Fields>>),
    Function(Rc<Closure>),
    Native(Rc<NativeFn>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn structure(fields: Fields) -> Self {
        Value::Struct(Rc::new(RefCell::new(fields)))
    }

    /// Build a struct from `(name, value)` pairs; later duplicates overwrite earlier ones.
    pub fn struct_from<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::structure(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Register a host callable. `params` names the arguments for display;
    /// its length is the arity that calls are padded or truncated to.
    pub fn native<F>(name: &str, params: &[&str], func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, NativeError> + 'static,
    {
        Value::Native(Rc::new(NativeFn {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            func: Box::new(func),
        }))
    }

    /// Type name as reported by `typeof` and in type-mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "void",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Function(_) => "function",
            Value::Native(_) => "native",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Snapshot of an array's elements.
    pub fn to_vec(&self) -> Option<Vec<Value>> {
        match self {
            Value::Array(items) => Some(items.borrow().clone()),
            _ => None,
        }
    }

    /// Field of a struct value, if present.
    pub fn field(&self, name: &str) -> Option<Value> {
        match self {
            Value::Struct(fields) => fields.borrow().get(name).cloned(),
            _ => None,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::array(items)
    }
}

/// Structural equality for host code and tests. Aggregates compare by
/// contents, callables by identity. Script `==` lives in [`crate::ops`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Struct(a), Value::Struct(b)) => Rc::ptr_eq(a, b) || *a.borrow() == *b.borrow(),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ── Textual form ─────────────────────────────────────────────────────────

/// Render a float the way script output expects: always a fractional
/// digit, scientific notation outside `[1e-3, 1e7)`.
pub fn format_float(n: f32) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = n.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        let s = n.to_string();
        if s.contains('.') {
            s
        } else {
            format!("{s}.0")
        }
    } else {
        let s = format!("{n:E}");
        match s.split_once('E') {
            Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
            _ => s,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut seen = Vec::new();
        write_value(f, self, &mut seen)
    }
}

/// `seen` holds the aggregates currently being printed, so a value that
/// contains itself prints the inner occurrence as `[...]` / `{...}`.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Int(n) => write!(f, "{n}"),
        Value::Float(n) => f.write_str(&format_float(*n)),
        Value::String(s) => f.write_str(s),
        Value::Array(items) => {
            let id = Rc::as_ptr(items) as *const () as usize;
            if seen.contains(&id) {
                return f.write_str("[...]");
            }
            seen.push(id);
            f.write_str("[")?;
            for (i, item) in items.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item, seen)?;
            }
            seen.pop();
            f.write_str("]")
        }
        Value::Struct(fields) => {
            let id = Rc::as_ptr(fields) as *const () as usize;
            if seen.contains(&id) {
                return f.write_str("{...}");
            }
            seen.push(id);
            f.write_str("{")?;
            for (i, (name, item)) in fields.borrow().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{name}=")?;
                write_value(f, item, seen)?;
            }
            seen.pop();
            f.write_str("}")
        }
        Value::Function(closure) => f.write_str(&closure.signature()),
        Value::Native(native) => f.write_str(&native.signature()),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Function(closure) => write!(f, "<function {}>", closure.name()),
            Value::Native(native) => write!(f, "<native {}>", native.name),
            other => write!(f, "{other}"),
        }
    }
}

// ── Callables ────────────────────────────────────────────────────────────

/// A script function paired with the scope it was declared in.
///
/// The scope handle is weak: the closure itself is stored in that scope,
/// and a strong handle would keep the frame alive forever.
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub scope: WeakScope,
}

impl Closure {
    pub fn name(&self) -> &str {
        &self.def.name.name
    }

    pub fn signature(&self) -> String {
        let params: Vec<&str> = self.def.params.iter().map(|p| p.name.as_str()).collect();
        format!("function({})", params.join(", "))
    }
}

/// Failure reported by a native function.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NativeError {
    pub fn msg(message: impl Into<String>) -> Self {
        NativeError::Message(message.into())
    }
}

type NativeImpl = Box<dyn Fn(&[Value]) -> Result<Value, NativeError>>;

/// A host callable with a fixed arity.
pub struct NativeFn {
    pub name: String,
    pub params: Vec<String>,
    func: NativeImpl,
}

impl NativeFn {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn signature(&self) -> String {
        format!("function({})", self.params.join(", "))
    }

    /// Invoke with `args` padded with `Null` or truncated to the arity.
    pub fn call(&self, args: &[Value]) -> Result<Value, NativeError> {
        if args.len() == self.arity() {
            return (self.func)(args);
        }
        let mut fitted: Vec<Value> = args.iter().take(self.arity()).cloned().collect();
        fitted.resize(self.arity(), Value::Null);
        (self.func)(&fitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_format() {
        assert_eq!(format_float(3.0), "3.0");
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(-0.5), "-0.5");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(1e10), "1.0E10");
        assert_eq!(format_float(1.5e-5), "1.5E-5");
        assert_eq!(format_float(f32::NAN), "NaN");
        assert_eq!(format_float(f32::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_display_aggregates() {
        let arr = Value::array(vec![Value::Int(1), "Two".into(), Value::Int(3)]);
        assert_eq!(arr.to_string(), "[1, Two, 3]");

        let inner = Value::struct_from([("c", Value::Int(2))]);
        let outer = Value::struct_from([("a", Value::Int(1)), ("b", inner)]);
        assert_eq!(outer.to_string(), "{a=1, b={c=2}}");
    }

    #[test]
    fn test_display_self_containing_array() {
        let arr = Value::array(vec![Value::Int(1)]);
        if let Value::Array(items) = &arr {
            items.borrow_mut().push(arr.clone());
        }
        assert_eq!(arr.to_string(), "[1, [...]]");
        // Break the cycle so the test does not leak.
        if let Value::Array(items) = &arr {
            items.borrow_mut().clear();
        }
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "void");
        assert_eq!(Value::Bool(true).type_name(), "boolean");
        assert_eq!(Value::Int(1).type_name(), "integer");
        assert_eq!(Value::Float(1.0).type_name(), "float");
        assert_eq!(Value::from("s").type_name(), "string");
        assert_eq!(Value::array(vec![]).type_name(), "array");
        assert_eq!(Value::structure(Fields::new()).type_name(), "struct");
    }

    #[test]
    fn test_native_pads_and_truncates_arguments() {
        let count = Value::native("count", &["a", "b"], |args| {
            assert_eq!(args.len(), 2);
            Ok(Value::Int(args.iter().filter(|v| !v.is_null()).count() as i32))
        });
        let Value::Native(native) = count else {
            panic!("expected native");
        };
        assert_eq!(native.call(&[]).unwrap(), Value::Int(0));
        assert_eq!(native.call(&[Value::Int(1)]).unwrap(), Value::Int(1));
        let three = [Value::Int(1), Value::Int(2), Value::Int(3)];
        assert_eq!(native.call(&three).unwrap(), Value::Int(2));
        assert_eq!(native.signature(), "function(a, b)");
    }

    #[test]
    fn test_structural_equality_for_hosts() {
        let a = Value::array(vec![Value::Int(1)]);
        let b = Value::array(vec![Value::Int(1)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::array(vec![]));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }
}
