//! Lexer tests: keywords, operators, literals, comments, positions and
//! error recovery.

use toyscript_lexer::{Lexer, TokenKind};
use toyscript_types::{ErrorKind, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.toys", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

fn error_count(source: &str) -> usize {
    let sf = SourceFile::new("test.toys", source);
    Lexer::new(&sf).lex().errors.len()
}

fn first_error(source: &str) -> String {
    let sf = SourceFile::new("test.toys", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_keywords() {
    let pairs = [
        ("var", TokenKind::Var),
        ("function", TokenKind::Function),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("while", TokenKind::While),
        ("break", TokenKind::Break),
        ("continue", TokenKind::Continue),
        ("return", TokenKind::Return),
        ("exit", TokenKind::Exit),
        ("throw", TokenKind::Throw),
        ("try", TokenKind::Try),
        ("catch", TokenKind::Catch),
        ("array", TokenKind::Array),
        ("struct", TokenKind::Struct),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("null", TokenKind::Null),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("x _tmp readFile var2 whilst"),
        vec![
            ident("x"),
            ident("_tmp"),
            ident("readFile"),
            ident("var2"),
            ident("whilst")
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_operators() {
    assert_eq!(
        kinds("+ - * / % ++ -- = == != ! < > <= >= && ||"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::PlusPlus,
            TokenKind::MinusMinus,
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::Bang,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEq,
            TokenKind::GreaterEq,
            TokenKind::AndAnd,
            TokenKind::OrOr,
        ]
    );
}

#[test]
fn test_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] , ; ."),
        vec![
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::RBrace,
            TokenKind::LBracket,
            TokenKind::RBracket,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Dot,
        ]
    );
}

#[test]
fn test_increment_without_spaces() {
    assert_eq!(
        kinds("x++;y--"),
        vec![
            ident("x"),
            TokenKind::PlusPlus,
            TokenKind::Semicolon,
            ident("y"),
            TokenKind::MinusMinus
        ]
    );
}

#[test]
fn test_single_ampersand_is_an_error() {
    assert_eq!(error_count("a & b"), 1);
    assert_eq!(first_error("a & b"), "Unexpected character '&'");
    assert_eq!(kinds("a & b"), vec![ident("a"), ident("b")]);
}

// ─────────────────────────────────────────────────────────────────────
// Literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_literals() {
    assert_eq!(
        kinds("0 42 2147483647"),
        vec![
            TokenKind::IntLit(0),
            TokenKind::IntLit(42),
            TokenKind::IntLit(i32::MAX)
        ]
    );
}

#[test]
fn test_integer_out_of_range() {
    assert_eq!(error_count("2147483648"), 1);
    assert_eq!(
        first_error("99999999999"),
        "Integer literal 99999999999 is out of range"
    );
}

#[test]
fn test_float_literals() {
    assert_eq!(
        kinds("3.14 0.5 1e3 2.5E-1"),
        vec![
            TokenKind::FloatLit(3.14),
            TokenKind::FloatLit(0.5),
            TokenKind::FloatLit(1000.0),
            TokenKind::FloatLit(0.25)
        ]
    );
}

#[test]
fn test_number_followed_by_member_dot() {
    // `1.` without a following digit is an int and a dot.
    assert_eq!(
        kinds("1.x"),
        vec![TokenKind::IntLit(1), TokenKind::Dot, ident("x")]
    );
}

#[test]
fn test_string_literal() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::StringLit("hello world".into())]
    );
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        kinds(r#""a\"b\\c\nd\te\r""#),
        vec![TokenKind::StringLit("a\"b\\c\nd\te\r".into())]
    );
}

#[test]
fn test_empty_string() {
    assert_eq!(kinds(r#""""#), vec![TokenKind::StringLit(String::new())]);
}

#[test]
fn test_invalid_escape() {
    assert_eq!(first_error(r#""\q""#), "Invalid escape sequence '\\q'");
}

#[test]
fn test_unterminated_string() {
    assert_eq!(first_error("\"abc"), "Unterminated string literal");
    assert_eq!(first_error("\"abc\nx"), "Unterminated string literal");
}

// ─────────────────────────────────────────────────────────────────────
// Comments
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_line_comment() {
    assert_eq!(
        kinds("var x; // a comment\nx"),
        vec![TokenKind::Var, ident("x"), TokenKind::Semicolon, ident("x")]
    );
}

#[test]
fn test_block_comment() {
    assert_eq!(
        kinds("a /* spans\nlines */ b"),
        vec![ident("a"), ident("b")]
    );
}

#[test]
fn test_comment_at_eof() {
    assert_eq!(kinds("a // trailing"), vec![ident("a")]);
    assert_eq!(error_count("a // trailing"), 0);
}

#[test]
fn test_unterminated_block_comment() {
    assert_eq!(first_error("a /* never closed"), "Unterminated block comment");
}

// ─────────────────────────────────────────────────────────────────────
// Positions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_spans_are_one_based() {
    let sf = SourceFile::new("test.toys", "var x = 10;\n  throw x;");
    let tokens = Lexer::new(&sf).lex().tokens;

    let var = &tokens[0];
    assert_eq!((var.span.start_line, var.span.start_col), (1, 1));
    assert_eq!(var.span.end_col, 3);

    let ten = &tokens[3];
    assert_eq!(ten.kind, TokenKind::IntLit(10));
    assert_eq!((ten.span.start_col, ten.span.end_col), (9, 10));

    let throw = &tokens[5];
    assert_eq!(throw.kind, TokenKind::Throw);
    assert_eq!((throw.span.start_line, throw.span.start_col), (2, 3));
}

#[test]
fn test_eof_always_last() {
    for src in ["", "   ", "x", "\"open", "/* open"] {
        let sf = SourceFile::new("test.toys", src);
        let tokens = Lexer::new(&sf).lex().tokens;
        assert_eq!(tokens.last().map(|t| t.kind.clone()), Some(TokenKind::Eof));
    }
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_errors_are_syntax_errors_with_source_line() {
    let sf = SourceFile::new("test.toys", "var a = 1;\nvar b = @;");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.len(), 1);
    let err = &result.errors[0];
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert_eq!(err.message, "Unexpected character '@'");
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(9));
    assert_eq!(err.source_line.as_deref(), Some("var b = @;"));
}

#[test]
fn test_recovery_continues_after_error() {
    assert_eq!(error_count("# $ x ~"), 3);
    assert_eq!(kinds("# $ x ~"), vec![ident("x")]);
}

#[test]
fn test_determinism() {
    let src = "function f(a, b) { return a + b * 2.5; } f(1, \"x\");";
    let first = kinds(src);
    for _ in 0..100 {
        assert_eq!(kinds(src), first);
    }
}
