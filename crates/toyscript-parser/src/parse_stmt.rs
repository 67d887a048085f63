//! Statement parsing.

use std::rc::Rc;

use crate::parser::Parser;
use crate::stack::ensure_sufficient_stack;
use toyscript_lexer::token::TokenKind;
use toyscript_types::ast::*;

impl<'src> Parser<'src> {
    /// Parse a single statement.
    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        self.enter_nesting()?;
        let stmt = ensure_sufficient_stack(|| self.parse_statement_kind());
        self.leave_nesting();
        stmt
    }

    fn parse_statement_kind(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::Var => self.parse_var_decl(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::LBrace => self.parse_block().map(|block| {
                let span = block.span;
                Stmt::new(StmtKind::Block(block), span)
            }),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Break => self.parse_bare(StmtKind::Break),
            TokenKind::Continue => self.parse_bare(StmtKind::Continue),
            TokenKind::Return => self.parse_with_value(StmtKind::Return),
            TokenKind::Exit => self.parse_with_value(StmtKind::Exit),
            TokenKind::Throw => self.parse_with_value(StmtKind::Throw),
            TokenKind::Semicolon => {
                let span = self.advance();
                Some(Stmt::new(StmtKind::Empty, span))
            }
            _ => {
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::Semicolon)?;
                let span = expr.span.merge(self.previous_span());
                Some(Stmt::new(StmtKind::Expr(expr), span))
            }
        }
    }

    /// Parse a statement list up to (not including) the closing `}`.
    fn parse_statements_until_rbrace(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            let before = self.position();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(before),
            }
        }
        stmts
    }

    /// `{ stmts... }`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_statements_until_rbrace();
        self.expect(&TokenKind::RBrace)?;
        let span = start.merge(self.previous_span());
        Some(Block { stmts, span })
    }

    /// `var name;` or `var name = expr;`
    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let start = self.advance(); // eat `var`
        let name = self.expect_identifier()?;
        let init = if self.eat(&TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::VarDecl { name, init }, span))
    }

    /// `function name(a, b) { body }`
    fn parse_function_decl(&mut self) -> Option<Stmt> {
        let start = self.advance(); // eat `function`
        let name = self.expect_identifier()?;
        self.expect(&TokenKind::LParen)?;
        let mut params: Vec<Ident> = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param = self.expect_identifier()?;
                if params.iter().any(|p| p.name == param.name) {
                    self.error_at(
                        format!("duplicate parameter '{}'", param.name),
                        param.span,
                    );
                }
                params.push(param);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_block()?;
        let span = start.merge(self.previous_span());
        let def = FunctionDef {
            name,
            params,
            body: body.stmts,
            span,
        };
        Some(Stmt::new(StmtKind::FunctionDecl(Rc::new(def)), span))
    }

    /// `if (cond) stmt [else stmt]`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.advance(); // eat `if`
        let condition = self.parse_condition()?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat(&TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            },
            span,
        ))
    }

    /// `while (cond) stmt`
    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.advance(); // eat `while`
        let condition = self.parse_condition()?;
        let body = Box::new(self.parse_statement()?);
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::While { condition, body }, span))
    }

    /// `( expr )`
    fn parse_condition(&mut self) -> Option<Expr> {
        self.expect(&TokenKind::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RParen)?;
        Some(condition)
    }

    /// `try { ... } catch [(e)] { ... }`
    fn parse_try(&mut self) -> Option<Stmt> {
        let start = self.advance(); // eat `try`
        let body = self.parse_block()?;
        let catch_start = self.expect(&TokenKind::Catch)?;
        let param = if self.eat(&TokenKind::LParen) {
            let ident = self.expect_identifier()?;
            self.expect(&TokenKind::RParen)?;
            Some(ident)
        } else {
            None
        };
        self.expect(&TokenKind::LBrace)?;
        let stmts = self.parse_statements_until_rbrace();
        self.expect(&TokenKind::RBrace)?;
        let catch = CatchClause {
            param,
            stmts,
            span: catch_start.merge(self.previous_span()),
        };
        let span = start.merge(self.previous_span());
        Some(Stmt::new(StmtKind::Try { body, catch }, span))
    }

    /// `break;` / `continue;`
    fn parse_bare(&mut self, kind: StmtKind) -> Option<Stmt> {
        let start = self.advance();
        self.expect(&TokenKind::Semicolon)?;
        Some(Stmt::new(kind, start.merge(self.previous_span())))
    }

    /// `return [expr];`, `exit [expr];`, `throw [expr];`
    fn parse_with_value(&mut self, make: fn(Option<Expr>) -> StmtKind) -> Option<Stmt> {
        let start = self.advance();
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let span = start.merge(self.previous_span());
        Some(Stmt::new(make(value), span))
    }
}
