//! `input` and `exit` — the two built-ins that touch process I/O directly,
//! blocking the sole execution thread per the concurrency model.

use std::io::{self, Write};
use std::rc::Rc;

use crate::env::Environment;
use crate::value::{Arity, NativeFunction, Value};

pub fn register(env: &Rc<Environment>) {
    env.define(
        "input",
        Value::Native(Rc::new(NativeFunction {
            name: "input".to_string(),
            arity: Arity::Exact(1),
            func: Box::new(|_, mut args, _| {
                let prompt = args.remove(0).to_string();
                print!("{}", prompt);
                let _ = io::stdout().flush();

                let mut line = String::new();
                io::stdin()
                    .read_line(&mut line)
                    .expect("reading a line from stdin");
                let line = line.trim_end_matches(['\n', '\r']);

                match line.parse::<f64>() {
                    Ok(n) => Ok(Value::Number(n)),
                    Err(_) => Ok(Value::String(line.to_string())),
                }
            }),
        })),
    );

    env.define(
        "exit",
        Value::Native(Rc::new(NativeFunction {
            name: "exit".to_string(),
            arity: Arity::Range(0, 1),
            func: Box::new(|_, args, _| {
                let code = match args.first() {
                    Some(Value::Number(n)) => n.floor() as i32,
                    _ => 0,
                };
                std::process::exit(code);
            }),
        })),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::token::{Literal, Token, TokenKind};

    #[test]
    fn input_parses_numeric_lines_as_numbers() {
        assert!(matches!("42".parse::<f64>(), Ok(n) if n == 42.0));
        assert!("hello".parse::<f64>().is_err());
    }

    #[test]
    fn exit_with_no_argument_registers_with_range_arity() {
        let globals = Environment::new();
        register(&globals);
        let exit = globals
            .get(&Token::new(TokenKind::Identifier, "exit", Literal::None, 1))
            .unwrap();
        match exit {
            Value::Native(native) => {
                assert!(native.arity.accepts(0));
                assert!(native.arity.accepts(1));
                assert!(!native.arity.accepts(2));
            }
            _ => panic!("expected native function"),
        }
    }

    #[test]
    fn input_builtin_is_registered_with_exact_arity_one() {
        let globals = Environment::new();
        register(&globals);
        let input = globals
            .get(&Token::new(TokenKind::Identifier, "input", Literal::None, 1))
            .unwrap();
        match input {
            Value::Native(native) => {
                assert_eq!(native.arity, Arity::Exact(1));
            }
            _ => panic!("expected native function"),
        }
    }
}
