// ABOUTME: Environment module for managing variable bindings and scopes
// Rc-linked chain, same shape as the teacher's env.rs, generalized with
// distance-indexed accessors (ancestor/get_at/assign_at) for the resolver's
// scope-distance table, which the teacher's Lisp has no use for.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    pub fn with_parent(parent: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    pub fn define(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.bindings.borrow().get(&name.lexeme) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.get(name),
            None => Err(RuntimeError::undefined_variable(name.line, &name.lexeme)),
        }
    }

    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if self.bindings.borrow().contains_key(&name.lexeme) {
            self.bindings.borrow_mut().insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::undefined_variable(name.line, &name.lexeme)),
        }
    }

    /// Climbs exactly `distance` parents from `self`.
    pub fn ancestor(self: &Rc<Self>, distance: usize) -> Rc<Environment> {
        let mut env = Rc::clone(self);
        for _ in 0..distance {
            let parent = env
                .parent
                .clone()
                .expect("resolver distance exceeds environment chain depth");
            env = parent;
        }
        env
    }

    pub fn get_at(self: &Rc<Self>, distance: usize, name: &str) -> Value {
        self.ancestor(distance)
            .bindings
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or(Value::Nil)
    }

    pub fn assign_at(self: &Rc<Self>, distance: usize, name: &str, value: Value) {
        self.ancestor(distance)
            .bindings
            .borrow_mut()
            .insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Literal, TokenKind};

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, Literal::None, 1)
    }

    #[test]
    fn define_and_get_in_same_frame() {
        let env = Environment::new();
        env.define("a", Value::Number(1.0));
        assert!(matches!(env.get(&ident("a")), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn get_walks_parent_chain() {
        let parent = Environment::new();
        parent.define("a", Value::Number(1.0));
        let child = Environment::with_parent(parent);
        assert!(matches!(child.get(&ident("a")), Ok(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn get_unknown_is_runtime_error() {
        let env = Environment::new();
        assert!(env.get(&ident("missing")).is_err());
    }

    #[test]
    fn assign_walks_parent_chain() {
        let parent = Environment::new();
        parent.define("a", Value::Number(1.0));
        let child = Environment::with_parent(parent.clone());
        child.assign(&ident("a"), Value::Number(2.0)).unwrap();
        assert!(matches!(parent.get(&ident("a")), Ok(Value::Number(n)) if n == 2.0));
    }

    #[test]
    fn assign_unknown_is_runtime_error() {
        let env = Environment::new();
        assert!(env.assign(&ident("missing"), Value::Nil).is_err());
    }

    #[test]
    fn get_at_and_assign_at_use_distance() {
        let grandparent = Environment::new();
        grandparent.define("a", Value::Number(1.0));
        let parent = Environment::with_parent(grandparent);
        let child = Environment::with_parent(parent);
        assert!(matches!(child.get_at(1, "a"), Value::Number(n) if n == 1.0));
        child.assign_at(1, "a", Value::Number(9.0));
        assert!(matches!(child.get_at(1, "a"), Value::Number(n) if n == 9.0));
    }
}
