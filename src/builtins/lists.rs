//! `len` — list length.

use std::rc::Rc;

use crate::env::Environment;
use crate::error::RuntimeError;
use crate::value::{Arity, NativeFunction, Value};

pub fn register(env: &Rc<Environment>) {
    env.define(
        "len",
        Value::Native(Rc::new(NativeFunction {
            name: "len".to_string(),
            arity: Arity::Exact(1),
            func: Box::new(|_, args, line| match &args[0] {
                Value::List(list) => Ok(Value::Number(list.borrow().len() as f64)),
                _ => Err(RuntimeError::new(line, "len expects a list argument")),
            }),
        })),
    );
}
