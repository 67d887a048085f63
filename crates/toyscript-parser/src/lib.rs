//! ToyScript parser: converts a token stream into an AST.
//!
//! [`parse`] runs the lexer and the parser over a [`SourceFile`] and merges
//! their diagnostics; [`parse_source`] is the short form used by embedders
//! that only care about the first error.

mod parse_expr;
mod parse_stmt;
mod parser;
mod stack;

pub use parser::{ParseResult, Parser};

use toyscript_lexer::Lexer;
use toyscript_types::ast::Program;
use toyscript_types::{ScriptError, SourceFile, MAX_ERRORS};

/// Lex and parse a whole source file, collecting up to [`MAX_ERRORS`] errors.
pub fn parse(source_file: &SourceFile) -> ParseResult {
    let lexed = Lexer::new(source_file).lex();
    let mut result = Parser::new(lexed.tokens, source_file).parse();

    if !lexed.errors.is_empty() {
        let mut errors = lexed.errors;
        errors.append(&mut result.errors);
        errors.sort_by_key(|e| e.span.map(|s| (s.start_line, s.start_col)));
        errors.truncate(MAX_ERRORS);
        result.errors = errors;
        result.program = None;
    }

    result
}

/// Parse `source` into a [`Program`], returning the first syntax error on failure.
pub fn parse_source(name: &str, source: &str) -> Result<Program, ScriptError> {
    let source_file = SourceFile::new(name, source);
    let result = parse(&source_file);
    if let Some(first) = result.errors.into_iter().next() {
        return Err(first);
    }
    // The parser always yields a program when it reports no errors.
    Ok(result.program.unwrap_or(Program {
        stmts: Vec::new(),
        span: toyscript_types::Span::point(1, 1),
    }))
}
