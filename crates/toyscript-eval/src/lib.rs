//! ToyScript tree-walking evaluator.
//!
//! Executes a parsed [`Program`] against host-owned [`Bindings`]. The crate
//! holds the runtime value model, the lexical scope chain, the control-flow
//! signals, the coercion rules and the native standard library.
//!
//! ```ignore
//! let program = toyscript_parser::parse_source("main", "var x = 6 * 7;")?;
//! let bindings = Bindings::new();
//! toyscript_eval::evaluate(&program, &bindings, std::io::empty(), std::io::sink())?;
//! assert_eq!(bindings.get("x"), Some(Value::Int(42)));
//! ```

mod bindings;
mod config;
mod console;
mod env;
mod error;
mod evaluator;
pub mod ops;
mod signal;
mod stack;
pub mod stdlib;
mod value;

use std::io::{BufRead, Write};

pub use bindings::Bindings;
pub use config::{EvalConfig, DEFAULT_MAX_CALL_DEPTH};
pub use console::{Console, OutputBuffer};
pub use env::{Scope, ScopeError, WeakScope};
pub use evaluator::Evaluator;
pub use signal::{EvalResult, ExecResult, Signal, Unwind};
pub use value::{format_float, Closure, Fields, NativeError, NativeFn, Value};

use toyscript_types::ast::Program;
use toyscript_types::ScriptError;

/// Run `program` with default settings, reading script input from `reader`
/// and writing `print` output to `writer`.
pub fn evaluate(
    program: &Program,
    bindings: &Bindings,
    reader: impl BufRead + 'static,
    writer: impl Write + 'static,
) -> Result<Value, ScriptError> {
    Evaluator::default().run(program, bindings, Console::new(reader, writer))
}
