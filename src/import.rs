// ABOUTME: File loader backing the `import` statement
// Grounded on the teacher's run_script/load_stdlib pattern in main.rs: read
// the file to a string, drive the full pipeline, and share the caller's
// interpreter instance so globals stay shared across the import.

use std::fs;

use crate::diagnostics::Reporter;
use crate::error::RuntimeError;
use crate::interpreter::Interpreter;
use crate::lexer::Lexer;
use crate::{parser, resolver};

/// Runs `path`'s top-level statements against `interpreter`, resolved
/// relative to the process working directory. Called at the point the
/// `import` statement executes, per the spec's "imports execute when run,
/// not when resolved" contract.
pub fn run_import(interpreter: &mut Interpreter, path: &str, line: usize) -> Result<(), RuntimeError> {
    let source = fs::read_to_string(path)
        .map_err(|e| RuntimeError::new(line, format!("Could not import '{}': {}", path, e)))?;

    let mut reporter = Reporter::new();
    let tokens = Lexer::new(&source).scan_tokens(&mut reporter);
    let stmts = parser::parse(tokens, &mut reporter);
    let locals = resolver::resolve(&stmts, &mut reporter);

    if reporter.had_error() {
        let first = reporter
            .errors()
            .first()
            .map(|e| e.message.clone())
            .unwrap_or_default();
        return Err(RuntimeError::new(
            line,
            format!("Error importing '{}': {}", path, first),
        ));
    }

    interpreter.add_locals(locals);
    interpreter.interpret(&stmts)
}
