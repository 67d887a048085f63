//! AST node types for the ToyScript language.
//!
//! Every node carries a [`Span`] for error reporting. The tree is immutable
//! once built; function definitions are reference-counted so a closure can
//! keep its body alive independently of the program that declared it.

use std::rc::Rc;

use crate::Span;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A complete script: a sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A spanned identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// `var name = init;`
    VarDecl { name: Ident, init: Option<Expr> },
    /// `function name(params) { body }`
    FunctionDecl(Rc<FunctionDef>),
    /// `{ stmts }`
    Block(Block),
    /// `if (condition) then_branch else else_branch`
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    /// `while (condition) body`
    While { condition: Expr, body: Box<Stmt> },
    Break,
    Continue,
    /// `return expr;`
    Return(Option<Expr>),
    /// `exit expr;`: terminates the whole program.
    Exit(Option<Expr>),
    /// `throw expr;`
    Throw(Option<Expr>),
    /// `try { body } catch (param) { handler }`
    Try { body: Block, catch: CatchClause },
    /// `expr;`
    Expr(Expr),
    /// A lone `;`.
    Empty,
}

/// `{ statements... }`, evaluated in its own child scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Static part of a script function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: Ident,
    pub params: Vec<Ident>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// `catch (param) { stmts }`; the statements run directly in the catch scope.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Operator chains like `0 + 1 + 1 + ...` nest one box per term, so the
/// default recursive drop could exhaust the stack. Children are detached
/// onto a work list and dropped one at a time.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.detach_children(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.kind.detach_children(&mut pending);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──────────────────────────────────────────────────────────
    IntLit(i32),
    FloatLit(f32),
    StringLit(String),
    BoolLit(bool),
    NullLit,

    /// Variable reference.
    Identifier(String),

    /// `name = value`
    Assign { target: Ident, value: Box<Expr> },
    /// `name++` / `name--`
    IncrDecr { target: Ident, op: IncrOp },

    // ── Aggregates ────────────────────────────────────────────────────────
    /// `array { a, b, c }`
    ArrayInit(Vec<Expr>),
    /// `array[size]`
    ArrayDef(Box<Expr>),
    /// `struct { a = 1; b = 2; }`
    StructInit(Vec<StructField>),

    /// `target[index]`
    Index { target: Box<Expr>, index: Box<Expr> },
    /// `target[index] = value`
    IndexAssign {
        target: Box<Expr>,
        index: Box<Expr>,
        value: Box<Expr>,
    },
    /// `target.member`
    Member { target: Box<Expr>, member: Ident },
    /// `target.member = value`
    MemberAssign {
        target: Box<Expr>,
        member: Ident,
        value: Box<Expr>,
    },

    // ── Operators ─────────────────────────────────────────────────────────
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// `callee(args)`. Functions are only callable by name.
    Call { callee: Ident, args: Vec<Expr> },

    /// `(inner)`
    Paren(Box<Expr>),
}

impl ExprKind {
    /// Move every child expression into `out`, leaving `self` a leaf.
    fn detach_children(&mut self, out: &mut Vec<Expr>) {
        match std::mem::replace(self, ExprKind::NullLit) {
            ExprKind::IntLit(_)
            | ExprKind::FloatLit(_)
            | ExprKind::StringLit(_)
            | ExprKind::BoolLit(_)
            | ExprKind::NullLit
            | ExprKind::Identifier(_)
            | ExprKind::IncrDecr { .. } => {}
            ExprKind::Assign { value, .. } => out.push(*value),
            ExprKind::ArrayInit(items) => out.extend(items),
            ExprKind::ArrayDef(size) => out.push(*size),
            ExprKind::StructInit(fields) => out.extend(fields.into_iter().map(|f| f.value)),
            ExprKind::Index { target, index } => out.extend([*target, *index]),
            ExprKind::IndexAssign {
                target,
                index,
                value,
            } => out.extend([*target, *index, *value]),
            ExprKind::Member { target, .. } => out.push(*target),
            ExprKind::MemberAssign { target, value, .. } => out.extend([*target, *value]),
            ExprKind::Binary { left, right, .. } => out.extend([*left, *right]),
            ExprKind::Unary { operand, .. } => out.push(*operand),
            ExprKind::Call { args, .. } => out.extend(args),
            ExprKind::Paren(inner) => out.push(*inner),
        }
    }
}

/// A field initializer inside a struct literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub name: Ident,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrOp {
    Incr,
    Decr,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i32) -> Expr {
        Expr::new(ExprKind::IntLit(n), Span::point(1, 1))
    }

    #[test]
    fn test_deep_left_chain_drops() {
        let mut expr = int(0);
        for n in 1..200_000 {
            expr = Expr::new(
                ExprKind::Binary {
                    left: Box::new(expr),
                    op: BinOp::Add,
                    right: Box::new(int(n)),
                },
                Span::point(1, 1),
            );
        }
        drop(expr);
    }

    #[test]
    fn test_deep_unary_and_paren_nesting_drops() {
        let mut expr = int(1);
        for n in 0..200_000 {
            let kind = if n % 2 == 0 {
                ExprKind::Paren(Box::new(expr))
            } else {
                ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(expr),
                }
            };
            expr = Expr::new(kind, Span::point(1, 1));
        }
        drop(expr);
    }
}
