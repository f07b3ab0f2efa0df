// ABOUTME: Integration tests running full programs through the public pipeline
// Drives lex -> parse -> resolve -> interpret exactly as src/import.rs and
// src/main.rs do, capturing `print` output into a buffer instead of stdout.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use nimble::diagnostics::Reporter;
use nimble::interpreter::Interpreter;
use nimble::lexer::Lexer;
use nimble::{parser, resolver};

#[derive(Clone)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn run_source(source: &str) -> Result<String, String> {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let mut reporter = Reporter::new();
    let tokens = Lexer::new(source).scan_tokens(&mut reporter);
    let stmts = parser::parse(tokens, &mut reporter);
    let locals = resolver::resolve(&stmts, &mut reporter);

    if reporter.had_error() {
        let messages: Vec<String> = reporter
            .errors()
            .iter()
            .map(|e| format!("[line {}] {}", e.line, e.message))
            .collect();
        return Err(messages.join("\n"));
    }

    let mut interpreter = Interpreter::with_output(Box::new(SharedBuf(buf.clone())));
    interpreter.add_locals(locals);
    interpreter
        .interpret(&stmts)
        .map_err(|e| format!("[line {}] {}", e.line, e.message))?;

    Ok(String::from_utf8(buf.borrow().clone()).unwrap())
}

#[test]
fn block_scoping_shadows_outer_binding() {
    let output = run_source(
        r#"
        var a = 1;
        {
            var a = 2;
            print(a);
        }
        print(a);
        "#,
    )
    .unwrap();
    assert_eq!(output, "2\n1\n");
}

#[test]
fn closures_capture_mutable_state() {
    let output = run_source(
        r#"
        fun make_counter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        var counter = make_counter();
        print(counter());
        print(counter());
        print(counter());
        "#,
    )
    .unwrap();
    assert_eq!(output, "1\n2\n3\n");
}

#[test]
fn inheritance_and_super_dispatch() {
    let output = run_source(
        r#"
        class Animal {
            speak() {
                print("...");
            }
        }
        class Dog : Animal {
            speak() {
                super.speak();
                print("Woof");
            }
        }
        var d = Dog();
        d.speak();
        "#,
    )
    .unwrap();
    assert_eq!(output, "...\nWoof\n");
}

#[test]
fn list_subscript_append_and_out_of_range_read() {
    let output = run_source(
        r#"
        var xs = [1, 2];
        xs[2] = 3;
        print(xs);
        print(xs[10]);
        "#,
    )
    .unwrap();
    assert_eq!(output, "[1, 2, 3]\nnil\n");
}

#[test]
fn break_exits_enclosing_loop_only() {
    let output = run_source(
        r#"
        var i = 0;
        while (true) {
            if (i == 3) {
                break;
            }
            print(i);
            i = i + 1;
        }
        print("done");
        "#,
    )
    .unwrap();
    assert_eq!(output, "0\n1\n2\ndone\n");
}

#[test]
fn initializer_returns_instance_regardless_of_explicit_return() {
    let output = run_source(
        r#"
        class Box {
            init(value) {
                this.value = value;
                return;
            }
        }
        var b = Box(42);
        print(b.value);
        "#,
    )
    .unwrap();
    assert_eq!(output, "42\n");
}

#[test]
fn subscript_write_out_of_range_is_a_runtime_error() {
    let result = run_source(
        r#"
        var xs = [1, 2];
        xs[10] = 1;
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn string_number_coercion_then_type_error() {
    let output = run_source(r#"print(1 + "a");"#).unwrap();
    assert_eq!(output, "1a\n");

    let result = run_source("print(true + 1);");
    assert!(result.is_err());
}

#[test]
fn logical_operators_short_circuit_and_return_operand_value() {
    let output = run_source(
        r#"
        print(false and explode());
        print(2 or explode());
        "#,
    )
    .unwrap();
    assert_eq!(output, "false\n2\n");
}

#[test]
fn for_loop_desugars_to_init_condition_increment() {
    let output = run_source(
        r#"
        for (var i = 0; i < 3; i = i + 1) {
            print(i);
        }
        "#,
    )
    .unwrap();
    assert_eq!(output, "0\n1\n2\n");
}

#[test]
fn undefined_variable_is_a_runtime_error() {
    let result = run_source("print(nonexistent);");
    assert!(result.is_err());
}

#[test]
fn lex_error_is_reported_as_compile_time_failure() {
    let result = run_source("var x = @;");
    assert!(result.is_err());
}
