//! Native functions seeded into every root scope.
//!
//! Each evaluation gets fresh instances bound to its [`Console`]; scripts may
//! shadow any of them with their own declarations.

use std::fs;

use tracing::debug;

use crate::console::Console;
use crate::env::Scope;
use crate::value::{NativeError, Value};

/// Names of the functions [`install`] declares.
pub const NATIVE_NAMES: [&str; 7] = [
    "print",
    "read",
    "readFile",
    "writeFile",
    "length",
    "keys",
    "typeof",
];

/// Declare the standard natives in `root`, which must be a fresh frame.
pub fn install(root: &Scope, console: &Console) {
    for native in io_natives(console).into_iter().chain(inspect_natives()) {
        let name = match &native {
            Value::Native(f) => f.name.clone(),
            _ => continue,
        };
        root.set_local(&name, native);
    }
}

fn io_natives(console: &Console) -> Vec<Value> {
    let out = console.clone();
    let print = Value::native("print", &["line"], move |args| {
        out.write_line(&args[0].to_string())?;
        Ok(Value::Null)
    });

    let input = console.clone();
    let read = Value::native("read", &[], move |_| {
        Ok(input.read_line()?.map_or(Value::Null, Value::String))
    });

    let read_file = Value::native("readFile", &["path"], |args| {
        let path = path_arg(&args[0])?;
        debug!(path = %path, "readFile");
        let contents = fs::read_to_string(&path)?;
        Ok(Value::String(contents.lines().collect::<Vec<_>>().join("\n")))
    });

    let write_file = Value::native("writeFile", &["path", "text"], |args| {
        let path = path_arg(&args[0])?;
        if args[1].is_null() {
            return Err(NativeError::msg("Text to write cannot be null"));
        }
        debug!(path = %path, "writeFile");
        fs::write(&path, args[1].to_string())?;
        Ok(Value::Null)
    });

    vec![print, read, read_file, write_file]
}

fn inspect_natives() -> Vec<Value> {
    let length = Value::native("length", &["x"], |args| {
        let len = match &args[0] {
            Value::Array(items) => items.borrow().len(),
            Value::Struct(fields) => fields.borrow().len(),
            Value::String(s) => s.chars().count(),
            _ => return Ok(Value::Null),
        };
        Ok(Value::Int(len as i32))
    });

    let keys = Value::native("keys", &["x"], |args| {
        Ok(match &args[0] {
            Value::Struct(fields) => Value::array(
                fields
                    .borrow()
                    .keys()
                    .map(|k| Value::String(k.clone()))
                    .collect(),
            ),
            _ => Value::Null,
        })
    });

    let type_of = Value::native("typeof", &["x"], |args| {
        Ok(Value::from(args[0].type_name()))
    });

    vec![length, keys, type_of]
}

fn path_arg(value: &Value) -> Result<String, NativeError> {
    match value {
        Value::Null => Err(NativeError::msg("Path to file cannot be null")),
        other => Ok(other.to_string()),
    }
}
