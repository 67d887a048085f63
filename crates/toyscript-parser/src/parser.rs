//! Core parser infrastructure: token cursor, error reporting, helpers.

use toyscript_lexer::token::{Token, TokenKind};
use toyscript_types::ast::{Ident, Program};
use toyscript_types::{ErrorKind, ScriptError, SourceFile, Span, MAX_ERRORS};

/// Deepest nesting of statements, parentheses and unary operators.
pub(crate) const MAX_NESTING: u32 = 100;

/// The ToyScript parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Collects errors and resynchronizes at statement boundaries.
pub struct Parser<'src> {
    tokens: Vec<Token>,
    /// Current index into `tokens`.
    pos: usize,
    source_file: &'src SourceFile,
    errors: Vec<ScriptError>,
    /// Current statement, grouping and unary nesting depth.
    pub(crate) depth: u32,
}

/// Result of parsing.
pub struct ParseResult {
    /// The AST; `None` whenever `errors` is non-empty.
    pub program: Option<Program>,
    pub errors: Vec<ScriptError>,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token>, source_file: &'src SourceFile) -> Self {
        Self {
            tokens,
            pos: 0,
            source_file,
            errors: Vec::new(),
            depth: 0,
        }
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).or_else(|| self.tokens.last())
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        self.peek().map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    /// Advance the cursor by one and return the consumed token's span.
    pub(crate) fn advance(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        span
    }

    pub(crate) fn previous_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.span,
            None => Span::point(1, 1),
        }
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().map(|t| t.span).unwrap_or_else(|| Span::point(1, 1))
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    /// Expect a specific token kind. Returns its span if matched, or emits an error.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Span> {
        if self.check(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(format!(
                "expected '{}', got '{}'",
                expected,
                self.peek_kind()
            ));
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<Ident> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                let span = self.advance();
                Some(Ident::new(name, span))
            }
            other => {
                self.error_at_current(format!("expected identifier, got '{other}'"));
                None
            }
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        let span = self.current_span();
        self.error_at(message, span);
    }

    pub(crate) fn error_at(&mut self, message: impl Into<String>, span: Span) {
        if self.too_many_errors() {
            return;
        }
        let source_line = self.source_file.line(span.start_line).unwrap_or("");
        let error =
            ScriptError::new(ErrorKind::Syntax, message, span).with_source_line(source_line);
        self.errors.push(error);
    }

    /// Returns `true` if we've hit the error limit and should stop.
    pub(crate) fn too_many_errors(&self) -> bool {
        self.errors.len() >= MAX_ERRORS
    }

    /// Enter one nesting level; reports an error once the limit is exceeded.
    pub(crate) fn enter_nesting(&mut self) -> Option<()> {
        if self.depth >= MAX_NESTING {
            self.error_at_current(format!("maximum nesting depth is {MAX_NESTING}"));
            return None;
        }
        self.depth += 1;
        Some(())
    }

    pub(crate) fn leave_nesting(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Skip tokens until a statement boundary: just past a `;`, or at a `}`
    /// or a keyword that starts a statement. `stmt_start` is the cursor
    /// position where the failed statement began; the cursor always moves
    /// past it so recovery cannot stall.
    pub(crate) fn synchronize(&mut self, stmt_start: usize) {
        while !self.at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                TokenKind::RBrace
                | TokenKind::Var
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Try
                | TokenKind::Throw
                | TokenKind::Return
                | TokenKind::Exit
                | TokenKind::Break
                | TokenKind::Continue
                    if self.pos > stmt_start =>
                {
                    return
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the token stream into a `Program` AST.
    pub fn parse(mut self) -> ParseResult {
        let program = self.parse_program();
        let program = if self.errors.is_empty() {
            Some(program)
        } else {
            None
        };
        ParseResult {
            program,
            errors: self.errors,
        }
    }

    fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.too_many_errors() {
                break;
            }
            if self.check(&TokenKind::RBrace) {
                self.error_at_current("unexpected '}'");
                self.advance();
                continue;
            }
            let before = self.position();
            match self.parse_statement() {
                Some(stmt) => stmts.push(stmt),
                None => self.synchronize(before),
            }
        }
        let span = start.merge(self.previous_span());
        Program { stmts, span }
    }
}
