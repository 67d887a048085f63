//! Tree-walking evaluator.
//!
//! Statements produce a [`Signal`]; expressions produce a [`Value`] or an
//! [`Unwind`] when a call inside them raised `throw` / `exit` or failed.

use std::rc::Rc;

use toyscript_types::ast::*;
use toyscript_types::{ScriptError, Span};
use tracing::{debug, trace};

use crate::bindings::Bindings;
use crate::config::EvalConfig;
use crate::console::Console;
use crate::env::{Scope, ScopeError};
use crate::error::{
    function_reference, illegal_signal, index_out_of_bounds, member_not_found, native_error,
    op_error, runtime, scope_error, type_mismatch, uncaught_throw,
};
use crate::ops::{self, bool_cast, int_cast};
use crate::signal::{EvalResult, ExecResult, Signal, Unwind};
use crate::stack::ensure_sufficient_stack;
use crate::stdlib;
use crate::value::{Closure, Fields, Value};

/// Evaluate an expression inside statement execution, turning a `throw` or
/// `exit` raised by a nested call into the statement's signal.
macro_rules! eval_or_signal {
    ($eval:expr) => {
        match $eval {
            Ok(value) => value,
            Err(Unwind::Signal(signal)) => return Ok(signal),
            Err(Unwind::Error(err)) => return Err(err),
        }
    };
}

/// Runs programs against host bindings.
///
/// Each [`run`](Evaluator::run) builds a fresh root frame holding the
/// standard natives, layers the optional globals and the engine bindings
/// over it, and unlinks them again when it returns.
#[derive(Debug, Default)]
pub struct Evaluator {
    config: EvalConfig,
    globals: Option<Bindings>,
    call_depth: usize,
}

impl Evaluator {
    pub fn new(config: EvalConfig) -> Self {
        Self {
            config,
            globals: None,
            call_depth: 0,
        }
    }

    /// Add a host frame between the natives and the engine bindings.
    pub fn with_globals(mut self, globals: Bindings) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Execute `program` with `bindings` as its top-level scope.
    ///
    /// The result is the `exit` value if the program exits, else the value
    /// of the last statement when that is an expression statement, else
    /// `null`.
    pub fn run(
        &mut self,
        program: &Program,
        bindings: &Bindings,
        console: Console,
    ) -> Result<Value, ScriptError> {
        debug!(statements = program.stmts.len(), "evaluation start");
        let root = Scope::root();
        stdlib::install(&root, &console);
        let _layers = Layers::link(&root, self.globals.as_ref(), bindings);
        self.call_depth = 0;

        let scope = bindings.scope();
        let mut last = Value::Null;
        for stmt in &program.stmts {
            let signal = match &stmt.kind {
                StmtKind::Expr(expr) => match self.eval_expr(expr, scope) {
                    Ok(value) => {
                        last = value;
                        Signal::None
                    }
                    Err(Unwind::Signal(signal)) => signal,
                    Err(Unwind::Error(err)) => return Err(failed(err)),
                },
                _ => {
                    last = Value::Null;
                    self.exec_stmt(stmt, scope).map_err(failed)?
                }
            };
            match signal {
                Signal::None => {}
                Signal::Exit(value, _) => {
                    debug!(%value, "program exited");
                    return Ok(value);
                }
                Signal::Throw(payload, span) => {
                    return Err(failed(uncaught_throw(&payload, span)));
                }
                other => {
                    let span = other.span().unwrap_or(stmt.span);
                    return Err(failed(illegal_signal(other.keyword(), span)));
                }
            }
        }
        debug!(result = %last, "evaluation end");
        Ok(last)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    pub fn exec_stmt(&mut self, stmt: &Stmt, scope: &Scope) -> ExecResult {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt, scope))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, scope: &Scope) -> ExecResult {
        trace!(line = stmt.span.start_line, "exec");
        match &stmt.kind {
            StmtKind::VarDecl { name, init } => {
                let value = match init {
                    Some(init) => eval_or_signal!(self.eval_expr(init, scope)),
                    None => Value::Null,
                };
                scope
                    .declare(&name.name, value)
                    .map_err(|err| scope_error(err, name.span))?;
                Ok(Signal::None)
            }
            StmtKind::FunctionDecl(def) => {
                let closure = Closure {
                    def: Rc::clone(def),
                    scope: scope.downgrade(),
                };
                scope
                    .declare(&def.name.name, Value::Function(Rc::new(closure)))
                    .map_err(|err| scope_error(err, def.name.span))?;
                Ok(Signal::None)
            }
            StmtKind::Block(block) => self.exec_block(&block.stmts, &scope.child()),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = eval_or_signal!(self.eval_expr(condition, scope));
                if bool_cast(&condition) {
                    self.exec_stmt(then_branch, scope)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch, scope)
                } else {
                    Ok(Signal::None)
                }
            }
            StmtKind::While { condition, body } => self.exec_while(condition, body, scope),
            StmtKind::Break => Ok(Signal::Break(stmt.span)),
            StmtKind::Continue => Ok(Signal::Continue(stmt.span)),
            StmtKind::Return(value) => {
                let value = eval_or_signal!(self.eval_optional(value.as_ref(), scope));
                Ok(Signal::Return(value, stmt.span))
            }
            StmtKind::Exit(value) => {
                let value = eval_or_signal!(self.eval_optional(value.as_ref(), scope));
                Ok(Signal::Exit(value, stmt.span))
            }
            StmtKind::Throw(value) => {
                let value = eval_or_signal!(self.eval_optional(value.as_ref(), scope));
                Ok(Signal::Throw(value, stmt.span))
            }
            StmtKind::Try { body, catch } => self.exec_try(body, catch, scope),
            StmtKind::Expr(expr) => {
                eval_or_signal!(self.eval_expr(expr, scope));
                Ok(Signal::None)
            }
            StmtKind::Empty => Ok(Signal::None),
        }
    }

    /// Run `stmts` in `scope`, stopping at the first signal.
    fn exec_block(&mut self, stmts: &[Stmt], scope: &Scope) -> ExecResult {
        for stmt in stmts {
            let signal = self.exec_stmt(stmt, scope)?;
            if !signal.is_none() {
                return Ok(signal);
            }
        }
        Ok(Signal::None)
    }

    fn exec_while(&mut self, condition: &Expr, body: &Stmt, scope: &Scope) -> ExecResult {
        loop {
            let value = eval_or_signal!(self.eval_expr(condition, scope));
            if !bool_cast(&value) {
                return Ok(Signal::None);
            }
            match self.exec_stmt(body, scope)? {
                Signal::None | Signal::Continue(_) => {}
                Signal::Break(_) => return Ok(Signal::None),
                other => return Ok(other),
            }
        }
    }

    /// Only a script `throw` is caught; runtime errors pass straight through.
    fn exec_try(&mut self, body: &Block, catch: &CatchClause, scope: &Scope) -> ExecResult {
        match self.exec_block(&body.stmts, &scope.child())? {
            Signal::Throw(payload, span) => {
                trace!(line = span.start_line, "caught throw");
                let frame = scope.child();
                if let Some(param) = &catch.param {
                    frame
                        .declare(&param.name, payload)
                        .map_err(|err| scope_error(err, param.span))?;
                }
                self.exec_block(&catch.stmts, &frame)
            }
            other => Ok(other),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub fn eval_expr(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, scope))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::IntLit(n) => Ok(Value::Int(*n)),
            ExprKind::FloatLit(n) => Ok(Value::Float(*n)),
            ExprKind::StringLit(s) => Ok(Value::String(s.clone())),
            ExprKind::BoolLit(b) => Ok(Value::Bool(*b)),
            ExprKind::NullLit => Ok(Value::Null),

            ExprKind::Identifier(name) => {
                let value = scope.read(name).map_err(|err| scope_error(err, span))?;
                if value.is_callable() {
                    return Err(function_reference(span).into());
                }
                Ok(value)
            }
            ExprKind::Assign { target, value } => self.eval_assign(target, value, scope),
            ExprKind::IncrDecr { target, op } => self.eval_incr_decr(target, *op, scope),

            ExprKind::ArrayInit(items) => Ok(Value::array(self.eval_list(items, scope)?)),
            ExprKind::ArrayDef(size) => {
                let size = int_cast(&self.eval_expr(size, scope)?);
                if size < 0 {
                    return Err(runtime(format!("Negative array size {size}"), span).into());
                }
                Ok(Value::array(vec![Value::Null; size as usize]))
            }
            ExprKind::StructInit(fields) => {
                let mut values = Fields::with_capacity(fields.len());
                for field in fields {
                    let value = self.eval_expr(&field.value, scope)?;
                    values.insert(field.name.name.clone(), value);
                }
                Ok(Value::structure(values))
            }

            ExprKind::Index { target, index } => {
                let target = self.eval_expr(target, scope)?;
                let index = int_cast(&self.eval_expr(index, scope)?);
                read_index(&target, index, span)
            }
            ExprKind::IndexAssign {
                target,
                index,
                value,
            } => {
                let target = self.eval_expr(target, scope)?;
                let index = int_cast(&self.eval_expr(index, scope)?);
                let value = self.eval_expr(value, scope)?;
                write_index(&target, index, value, span)
            }
            ExprKind::Member { target, member } => {
                let target = self.eval_expr(target, scope)?;
                let Value::Struct(fields) = &target else {
                    return Err(type_mismatch("struct", &target, span).into());
                };
                let field = fields.borrow().get(&member.name).cloned();
                field.ok_or_else(|| Unwind::from(member_not_found(&member.name, member.span)))
            }
            ExprKind::MemberAssign {
                target,
                member,
                value,
            } => {
                let target = self.eval_expr(target, scope)?;
                let value = self.eval_expr(value, scope)?;
                let Value::Struct(fields) = &target else {
                    return Err(type_mismatch("struct", &target, span).into());
                };
                match fields.borrow_mut().get_mut(&member.name) {
                    Some(slot) => *slot = value.clone(),
                    None => return Err(member_not_found(&member.name, member.span).into()),
                }
                Ok(value)
            }

            ExprKind::Binary { left, op, right } => {
                // Both operands are always evaluated, `&&` and `||` included.
                let left = self.eval_expr(left, scope)?;
                let right = self.eval_expr(right, scope)?;
                ops::binary(*op, &left, &right).map_err(|err| Unwind::from(op_error(err, span)))
            }
            ExprKind::Unary { op, operand } => {
                let operand = self.eval_expr(operand, scope)?;
                Ok(ops::unary(*op, &operand))
            }

            ExprKind::Call { callee, args } => self.eval_call(callee, args, span, scope),
            ExprKind::Paren(inner) => self.eval_expr(inner, scope),
        }
    }

    fn eval_optional(&mut self, expr: Option<&Expr>, scope: &Scope) -> EvalResult<Value> {
        match expr {
            Some(expr) => self.eval_expr(expr, scope),
            None => Ok(Value::Null),
        }
    }

    fn eval_list(&mut self, exprs: &[Expr], scope: &Scope) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            values.push(self.eval_expr(expr, scope)?);
        }
        Ok(values)
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// The target must already be declared; the right side is not evaluated
    /// otherwise.
    fn eval_assign(&mut self, target: &Ident, value: &Expr, scope: &Scope) -> EvalResult<Value> {
        let frame = declaring_frame(scope, target)?;
        let value = self.eval_expr(value, scope)?;
        frame.set_local(&target.name, value.clone());
        Ok(value)
    }

    /// Writes `int(old) ± 1` back and yields the old value.
    fn eval_incr_decr(&mut self, target: &Ident, op: IncrOp, scope: &Scope) -> EvalResult<Value> {
        let old = scope
            .read(&target.name)
            .map_err(|err| scope_error(err, target.span))?;
        if old.is_callable() {
            return Err(function_reference(target.span).into());
        }
        let n = int_cast(&old);
        let new = match op {
            IncrOp::Incr => n.wrapping_add(1),
            IncrOp::Decr => n.wrapping_sub(1),
        };
        scope
            .write(&target.name, Value::Int(new))
            .map_err(|err| scope_error(err, target.span))?;
        Ok(old)
    }

    // ── Calls ─────────────────────────────────────────────────────────────

    fn eval_call(
        &mut self,
        callee: &Ident,
        args: &[Expr],
        span: Span,
        scope: &Scope,
    ) -> EvalResult<Value> {
        let frame = declaring_frame(scope, callee)?;
        let args = self.eval_list(args, scope)?;
        match frame.get_local(&callee.name).unwrap_or_default() {
            Value::Function(closure) => self.call_closure(&closure, args, span),
            Value::Native(native) => {
                trace!(name = %native.name, args = args.len(), "native call");
                native
                    .call(&args)
                    .map_err(|err| Unwind::from(native_error(err, span)))
            }
            other => Err(type_mismatch("function", &other, callee.span).into()),
        }
    }

    /// Invoke a script function in a fresh frame under its captured scope.
    ///
    /// `throw` and `exit` keep unwinding through the call; `break` and
    /// `continue` cannot leave a function body.
    pub fn call_closure(
        &mut self,
        closure: &Closure,
        args: Vec<Value>,
        span: Span,
    ) -> EvalResult<Value> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(runtime(
                format!(
                    "Stack overflow: call depth exceeds {}",
                    self.config.max_call_depth
                ),
                span,
            )
            .into());
        }
        let captured = closure.scope.upgrade().ok_or_else(|| {
            runtime(
                format!("Scope of function {} no longer exists", closure.name()),
                span,
            )
        })?;

        let frame = captured.child();
        let mut args = args.into_iter();
        for param in &closure.def.params {
            frame.set_local(&param.name, args.next().unwrap_or_default());
        }

        debug!(function = closure.name(), depth = self.call_depth, "call");
        self.call_depth += 1;
        let result = self.exec_block(&closure.def.body, &frame);
        self.call_depth -= 1;

        match result? {
            Signal::None => Ok(Value::Null),
            Signal::Return(value, _) => Ok(value),
            signal @ (Signal::Throw(..) | Signal::Exit(..)) => Err(Unwind::Signal(signal)),
            signal => Err(illegal_signal(signal.keyword(), span).into()),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn failed(err: ScriptError) -> ScriptError {
    debug!(error = %err, "evaluation failed");
    err
}

fn declaring_frame(scope: &Scope, name: &Ident) -> Result<Scope, ScriptError> {
    scope.resolve(&name.name).ok_or_else(|| {
        scope_error(ScopeError::NotDeclared(name.name.clone()), name.span)
    })
}

fn checked_index(index: i32, len: usize, span: Span) -> Result<usize, ScriptError> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_bounds(index, len, span))
}

fn read_index(target: &Value, index: i32, span: Span) -> EvalResult<Value> {
    match target {
        Value::Array(items) => {
            let items = items.borrow();
            let i = checked_index(index, items.len(), span)?;
            Ok(items[i].clone())
        }
        Value::String(s) => {
            let len = s.chars().count();
            let i = checked_index(index, len, span)?;
            Ok(s.chars().nth(i).map_or(Value::Null, |c| Value::String(c.to_string())))
        }
        other => Err(type_mismatch("array or string", other, span).into()),
    }
}

fn write_index(target: &Value, index: i32, value: Value, span: Span) -> EvalResult<Value> {
    let Value::Array(items) = target else {
        return Err(type_mismatch("array", target, span).into());
    };
    let mut items = items.borrow_mut();
    let i = checked_index(index, items.len(), span)?;
    items[i] = value.clone();
    Ok(value)
}

/// Restores the parent links of host frames when an evaluation ends.
struct Layers {
    saved: Vec<(Scope, Option<Scope>)>,
}

impl Layers {
    fn link(root: &Scope, globals: Option<&Bindings>, engine: &Bindings) -> Self {
        let mut frames = Vec::with_capacity(2);
        if let Some(globals) = globals {
            if !globals.scope().ptr_eq(engine.scope()) {
                frames.push(globals.scope().clone());
            }
        }
        frames.push(engine.scope().clone());

        let mut saved = Vec::with_capacity(frames.len());
        let mut parent = root.clone();
        for frame in frames {
            saved.push((frame.clone(), frame.parent()));
            frame.set_parent(Some(parent));
            parent = frame;
        }
        Self { saved }
    }
}

impl Drop for Layers {
    fn drop(&mut self) {
        for (frame, parent) in self.saved.drain(..).rev() {
            frame.set_parent(parent);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::OutputBuffer;
    use toyscript_types::ErrorKind;

    fn sp() -> Span {
        Span::point(1, 1)
    }

    fn int(n: i32) -> Expr {
        Expr::new(ExprKind::IntLit(n), sp())
    }

    fn ident(name: &str) -> Ident {
        Ident::new(name, sp())
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt::new(kind, sp())
    }

    fn program(stmts: Vec<Stmt>) -> Program {
        Program { stmts, span: sp() }
    }

    fn run(program: &Program, bindings: &Bindings) -> Result<Value, ScriptError> {
        let console = Console::new(std::io::empty(), OutputBuffer::new());
        Evaluator::default().run(program, bindings, console)
    }

    #[test]
    fn test_var_decl_lands_in_bindings() {
        let bindings = Bindings::new();
        let p = program(vec![stmt(StmtKind::VarDecl {
            name: ident("x"),
            init: Some(int(5)),
        })]);
        assert_eq!(run(&p, &bindings).unwrap(), Value::Null);
        assert_eq!(bindings.get("x"), Some(Value::Int(5)));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_last_expression_is_result() {
        let p = program(vec![stmt(StmtKind::Expr(Expr::new(
            ExprKind::Binary {
                left: Box::new(int(2)),
                op: BinOp::Mul,
                right: Box::new(int(21)),
            },
            sp(),
        )))]);
        assert_eq!(run(&p, &Bindings::new()).unwrap(), Value::Int(42));
    }

    #[test]
    fn test_break_at_top_level_is_illegal() {
        let p = program(vec![stmt(StmtKind::Break)]);
        let err = run(&p, &Bindings::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IllegalSignal);
        assert_eq!(err.message, "Token 'break' in illegal position");
    }

    #[test]
    fn test_parent_links_restored_after_run() {
        let bindings = Bindings::new();
        let globals = Bindings::new();
        let mut evaluator = Evaluator::default().with_globals(globals.clone());
        let console = Console::new(std::io::empty(), OutputBuffer::new());
        evaluator
            .run(&program(vec![]), &bindings, console)
            .unwrap();
        assert!(bindings.scope().parent().is_none());
        assert!(globals.scope().parent().is_none());
    }

    #[test]
    fn test_depth_limit() {
        // function f() { f(); } f();
        let call = || Expr::new(
            ExprKind::Call {
                callee: ident("f"),
                args: vec![],
            },
            sp(),
        );
        let def = FunctionDef {
            name: ident("f"),
            params: vec![],
            body: vec![stmt(StmtKind::Expr(call()))],
            span: sp(),
        };
        let p = program(vec![
            stmt(StmtKind::FunctionDecl(Rc::new(def))),
            stmt(StmtKind::Expr(call())),
        ]);
        let console = Console::new(std::io::empty(), OutputBuffer::new());
        let mut evaluator = Evaluator::new(EvalConfig { max_call_depth: 50 });
        let err = evaluator.run(&p, &Bindings::new(), console).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Runtime);
        assert!(err.message.contains("Stack overflow"));
    }
}
