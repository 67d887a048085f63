//! Expression parsing with full operator precedence.
//!
//! Precedence (lowest → highest):
//! 7. `||`
//! 6. `&&`
//! 5. `==`, `!=`
//! 4. `<`, `>`, `<=`, `>=`
//! 3. `+`, `-`
//! 2. `*`, `/`, `%`
//! 1. unary `-`, `!`
//! 0. postfix `[index]`, `.member` (each optionally followed by `= value`)
//!
//! Assignment to a name (`x = value`) is a primary expression whose value
//! extends as far right as possible, so `3 + b = b + a = 2` parses as
//! `3 + (b = (b + (a = 2)))`.

use toyscript_lexer::token::TokenKind;
use toyscript_types::ast::*;

use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;

fn binary(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.merge(right.span);
    Expr::new(
        ExprKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        ensure_sufficient_stack(|| self.parse_or())
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Precedence Chain
    // ══════════════════════════════════════════════════════════════════════════

    /// `or := and ('||' and)*`
    fn parse_or(&mut self) -> Option<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = binary(left, BinOp::Or, right);
        }
        Some(left)
    }

    /// `and := equality ('&&' equality)*`
    fn parse_and(&mut self) -> Option<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = binary(left, BinOp::And, right);
        }
        Some(left)
    }

    /// `equality := compare (('==' | '!=') compare)*`
    fn parse_equality(&mut self) -> Option<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinOp::Eq,
                TokenKind::BangEq => BinOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `compare := additive (('<' | '>' | '<=' | '>=') additive)*`
    fn parse_comparison(&mut self) -> Option<Expr> {
        let mut left = self.parse_add()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Less => BinOp::Less,
                TokenKind::Greater => BinOp::Greater,
                TokenKind::LessEq => BinOp::LessEq,
                TokenKind::GreaterEq => BinOp::GreaterEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_add()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `additive := mul (('+' | '-') mul)*`
    fn parse_add(&mut self) -> Option<Expr> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_mul()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `mul := unary (('*' | '/' | '%') unary)*`
    fn parse_mul(&mut self) -> Option<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Percent => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(left, op, right);
        }
        Some(left)
    }

    /// `unary := ('-' | '!') unary | postfix`
    fn parse_unary(&mut self) -> Option<Expr> {
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Bang => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.advance();
        self.enter_nesting()?;
        let operand = self.parse_unary();
        self.leave_nesting();
        let operand = operand?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    /// `postfix := primary ('[' expr ']' ('=' expr)? | '.' ID ('=' expr)?)*`
    fn parse_postfix(&mut self) -> Option<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                TokenKind::LBracket => {
                    self.advance(); // eat `[`
                    let index = self.parse_expression()?;
                    self.expect(&TokenKind::RBracket)?;
                    if self.eat(&TokenKind::Eq) {
                        let value = self.parse_expression()?;
                        let span = expr.span.merge(value.span);
                        return Some(Expr::new(
                            ExprKind::IndexAssign {
                                target: Box::new(expr),
                                index: Box::new(index),
                                value: Box::new(value),
                            },
                            span,
                        ));
                    }
                    let span = expr.span.merge(self.previous_span());
                    expr = Expr::new(
                        ExprKind::Index {
                            target: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                TokenKind::Dot => {
                    self.advance(); // eat `.`
                    let member = self.expect_identifier()?;
                    if self.eat(&TokenKind::Eq) {
                        let value = self.parse_expression()?;
                        let span = expr.span.merge(value.span);
                        return Some(Expr::new(
                            ExprKind::MemberAssign {
                                target: Box::new(expr),
                                member,
                                value: Box::new(value),
                            },
                            span,
                        ));
                    }
                    let span = expr.span.merge(member.span);
                    expr = Expr::new(
                        ExprKind::Member {
                            target: Box::new(expr),
                            member,
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Some(expr)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::IntLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::IntLit(n), start))
            }
            TokenKind::FloatLit(n) => {
                self.advance();
                Some(Expr::new(ExprKind::FloatLit(n), start))
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Some(Expr::new(ExprKind::StringLit(s), start))
            }
            TokenKind::True => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(true), start))
            }
            TokenKind::False => {
                self.advance();
                Some(Expr::new(ExprKind::BoolLit(false), start))
            }
            TokenKind::Null => {
                self.advance();
                Some(Expr::new(ExprKind::NullLit, start))
            }

            // ── Aggregates ──────────────────────────────────────────────
            TokenKind::Array => self.parse_array(),
            TokenKind::Struct => self.parse_struct(),

            // ── Grouping ────────────────────────────────────────────────
            TokenKind::LParen => {
                self.advance(); // eat `(`
                self.enter_nesting()?;
                let inner = self.parse_expression();
                self.leave_nesting();
                let inner = inner?;
                self.expect(&TokenKind::RParen)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::Paren(Box::new(inner)), span))
            }

            // ── Names: assignment, ++/--, call, plain reference ─────────
            TokenKind::Identifier(_) => self.parse_name_expr(),

            other => {
                self.error_at_current(format!("expected expression, got '{other}'"));
                None
            }
        }
    }

    fn parse_name_expr(&mut self) -> Option<Expr> {
        let target = self.expect_identifier()?;
        match self.peek_kind() {
            TokenKind::Eq => {
                self.advance();
                let value = self.parse_expression()?;
                let span = target.span.merge(value.span);
                Some(Expr::new(
                    ExprKind::Assign {
                        target,
                        value: Box::new(value),
                    },
                    span,
                ))
            }
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let op = if self.check(&TokenKind::PlusPlus) {
                    IncrOp::Incr
                } else {
                    IncrOp::Decr
                };
                let end = self.advance();
                let span = target.span.merge(end);
                Some(Expr::new(ExprKind::IncrDecr { target, op }, span))
            }
            TokenKind::LParen => {
                self.advance();
                let args = self.parse_expr_list(&TokenKind::RParen)?;
                let span = target.span.merge(self.previous_span());
                Some(Expr::new(
                    ExprKind::Call {
                        callee: target,
                        args,
                    },
                    span,
                ))
            }
            _ => Some(Expr::new(ExprKind::Identifier(target.name), target.span)),
        }
    }

    /// Parse a comma-separated expression list and its closing token.
    fn parse_expr_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        if !self.check(close) {
            loop {
                items.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(close)?;
        Some(items)
    }

    /// `array { a, b }` or `array[size]`
    fn parse_array(&mut self) -> Option<Expr> {
        let start = self.advance(); // eat `array`
        match self.peek_kind() {
            TokenKind::LBrace => {
                self.advance();
                let items = self.parse_expr_list(&TokenKind::RBrace)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::ArrayInit(items), span))
            }
            TokenKind::LBracket => {
                self.advance();
                let size = self.parse_expression()?;
                self.expect(&TokenKind::RBracket)?;
                let span = start.merge(self.previous_span());
                Some(Expr::new(ExprKind::ArrayDef(Box::new(size)), span))
            }
            other => {
                let message = format!("expected '{{' or '[' after 'array', got '{other}'");
                self.error_at_current(message);
                None
            }
        }
    }

    /// `struct { name = value; ... }`
    fn parse_struct(&mut self) -> Option<Expr> {
        let start = self.advance(); // eat `struct`
        self.expect(&TokenKind::LBrace)?;
        let mut fields: Vec<StructField> = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            let name = self.expect_identifier()?;
            self.expect(&TokenKind::Eq)?;
            let value = self.parse_expression()?;
            self.expect(&TokenKind::Semicolon)?;
            if fields.iter().any(|f| f.name.name == name.name) {
                self.error_at(
                    format!("duplicate field '{}' in struct literal", name.name),
                    name.span,
                );
            }
            fields.push(StructField { name, value });
        }
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Expr::new(ExprKind::StructInit(fields), span))
    }
}
