//! Native library tests through script source.

use std::fs;
use std::io;
use std::path::PathBuf;

use pretty_assertions::assert_eq;
use toyscript_eval::{evaluate, Bindings, OutputBuffer, Value};
use toyscript_parser::parse_source;
use toyscript_types::{ErrorKind, ScriptError};

fn run(source: &str, bindings: &Bindings) -> Result<Value, ScriptError> {
    let program = parse_source("stdlib.toys", source).unwrap_or_else(|err| panic!("{err}"));
    evaluate(&program, bindings, io::empty(), io::sink())
}

/// A per-test path under the system temp directory.
fn temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("toyscript-{}-{name}", std::process::id()))
}

#[test]
fn test_write_then_read_file() {
    let path = temp_file("roundtrip.txt");
    let bindings = Bindings::new();
    bindings.insert("path", path.display().to_string());

    run(r#"writeFile(path, "first\r\nsecond\n");"#, &bindings).unwrap();
    let text = run("readFile(path);", &bindings).unwrap();
    // Lines are rejoined with `\n` and the trailing terminator is dropped.
    assert_eq!(text, Value::from("first\nsecond"));

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_write_file_uses_textual_form() {
    let path = temp_file("textual.txt");
    let bindings = Bindings::new();
    bindings.insert("path", path.display().to_string());

    run("writeFile(path, array { 1, 2.5, struct { k = true; } });", &bindings).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2.5, {k=true}]");

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_file_errors_are_host_errors() {
    let bindings = Bindings::new();

    let err = run("readFile(null);", &bindings).unwrap_err();
    assert_eq!(err.kind, ErrorKind::HostIo);
    assert_eq!(err.message, "Path to file cannot be null");

    let err = run(r#"writeFile("unused.txt");"#, &bindings).unwrap_err();
    assert_eq!(err.kind, ErrorKind::HostIo);
    assert_eq!(err.message, "Text to write cannot be null");

    let missing = temp_file("does-not-exist.txt");
    bindings.insert("missing", missing.display().to_string());
    let err = run("readFile(missing);", &bindings).unwrap_err();
    assert_eq!(err.kind, ErrorKind::HostIo);
}

#[test]
fn test_host_errors_are_not_catchable() {
    let err = run("try { readFile(); } catch (e) { }", &Bindings::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::HostIo);
}

#[test]
fn test_length_keys_typeof() {
    let bindings = Bindings::new();
    run(
        r#"var s = struct { x = 1; y = 2; z = 3; };
           var lens = array { length(array { 1, 2 }), length(s), length("héllo"), length(5) };
           var names = keys(s);
           var none = keys(array { 1 });
           var types = array {
               typeof(null), typeof(true), typeof(1), typeof(1.5), typeof("s"),
               typeof(array[0]), typeof(s)
           };"#,
        &bindings,
    )
    .unwrap();

    assert_eq!(
        bindings.get("lens").and_then(|v| v.to_vec()),
        Some(vec![Value::Int(2), Value::Int(3), Value::Int(5), Value::Null])
    );
    assert_eq!(
        bindings.get("names"),
        Some(Value::array(vec!["x".into(), "y".into(), "z".into()]))
    );
    assert_eq!(bindings.get("none"), Some(Value::Null));
    let types: Vec<String> = bindings
        .get("types")
        .and_then(|v| v.to_vec())
        .unwrap_or_default()
        .iter()
        .map(|v| v.to_string())
        .collect();
    assert_eq!(
        types,
        vec!["void", "boolean", "integer", "float", "string", "array", "struct"]
    );
}

#[test]
fn test_print_and_read_share_console() {
    let program = parse_source(
        "echo.toys",
        r#"var name = read(); print("Hello, " + name + "!"); print(read());"#,
    )
    .unwrap();
    let out = OutputBuffer::new();
    evaluate(
        &program,
        &Bindings::new(),
        io::Cursor::new("World\r\n"),
        out.clone(),
    )
    .unwrap();
    assert_eq!(out.contents(), "Hello, World!\nnull\n");
}
