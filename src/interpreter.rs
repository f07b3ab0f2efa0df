// ABOUTME: Tree-walking visitor executing the resolved AST
// Grounded on the teacher's eval.rs (environment threading through a
// visitor, tail-position statement execution) and value.rs (Display drives
// stringification). Non-local exits use a Signal enum threaded through
// Result rather than panics, matching the teacher's own Result-threading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::{debug, trace};

use crate::ast::{ClassDecl, Expr, LiteralValue, NodeId, Stmt};
use crate::env::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenKind};
use crate::value::{ClassDef, FunctionDecl, InstanceData, Value};

/// The outcome of executing one statement: either it ran to completion, or
/// it's unwinding a `return` or `break` up to the frame that catches it.
pub enum Signal {
    Normal,
    Return(Value),
    Break,
}

pub struct Interpreter {
    pub globals: Rc<Environment>,
    environment: Rc<Environment>,
    locals: HashMap<NodeId, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_output(Box::new(io::stdout()))
    }

    pub fn with_output(output: Box<dyn Write>) -> Self {
        let globals = Environment::new();
        crate::builtins::register_builtins(&globals);
        Interpreter {
            globals: globals.clone(),
            environment: globals,
            locals: HashMap::new(),
            output,
        }
    }

    pub fn add_locals(&mut self, locals: HashMap<NodeId, usize>) {
        self.locals.extend(locals);
    }

    pub fn interpret(&mut self, stmts: &[Stmt]) -> Result<(), RuntimeError> {
        debug!(count = stmts.len(), "executing statements");
        for stmt in stmts {
            self.execute(stmt)?;
        }
        Ok(())
    }

    /// Evaluates a single expression, used by the REPL's "bare expression"
    /// mode to print a value without requiring a trailing `;`.
    pub fn interpret_expr(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        self.evaluate(expr)
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Signal, RuntimeError> {
        match stmt {
            Stmt::Block(stmts) => {
                let env = Environment::with_parent(self.environment.clone());
                self.execute_block(stmts, env)
            }
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                let _ = writeln!(self.output, "{}", value);
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(Signal::Normal)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    match self.execute(body)? {
                        Signal::Normal => continue,
                        Signal::Break => break,
                        Signal::Return(value) => return Ok(Signal::Return(value)),
                    }
                }
                Ok(Signal::Normal)
            }
            Stmt::Function { name, function } => {
                let decl = Rc::new(FunctionDecl {
                    name: Some(name.lexeme.clone()),
                    params: function.params.clone(),
                    body: Rc::new(function.body.clone()),
                    closure: self.environment.clone(),
                    is_initializer: false,
                });
                self.environment.define(&name.lexeme, Value::Function(decl));
                Ok(Signal::Normal)
            }
            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                Ok(Signal::Return(value))
            }
            Stmt::Break => Ok(Signal::Break),
            Stmt::Class(decl) => self.execute_class(decl),
            Stmt::Import { keyword, path } => {
                trace!(path, "resolving import");
                crate::import::run_import(self, path, keyword.line)?;
                Ok(Signal::Normal)
            }
        }
    }

    /// Executes `stmts` against `env`, restoring the previous current
    /// environment on every exit path: normal completion, a signal, or an
    /// error.
    fn execute_block(&mut self, stmts: &[Stmt], env: Rc<Environment>) -> Result<Signal, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        let mut result = Ok(Signal::Normal);
        for stmt in stmts {
            match self.execute(stmt) {
                Ok(Signal::Normal) => continue,
                Ok(other) => {
                    result = Ok(other);
                    break;
                }
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.environment = previous;
        result
    }

    fn execute_class(&mut self, decl: &ClassDecl) -> Result<Signal, RuntimeError> {
        let superclass = match &decl.superclass {
            Some(expr) => {
                let value = self.evaluate(expr)?;
                match value {
                    Value::Class(class) => Some(class),
                    _ => return Err(RuntimeError::superclass_must_be_a_class(decl.name.line)),
                }
            }
            None => None,
        };

        self.environment.define(&decl.name.lexeme, Value::Nil);

        let method_env = if let Some(superclass) = &superclass {
            let env = Environment::with_parent(self.environment.clone());
            env.define("super", Value::Class(superclass.clone()));
            env
        } else {
            self.environment.clone()
        };

        let mut methods = HashMap::new();
        for (name, function) in &decl.methods {
            let func = Rc::new(FunctionDecl {
                name: Some(name.lexeme.clone()),
                params: function.params.clone(),
                body: Rc::new(function.body.clone()),
                closure: method_env.clone(),
                is_initializer: name.lexeme == "init",
            });
            methods.insert(name.lexeme.clone(), func);
        }

        let class = Rc::new(ClassDef {
            name: decl.name.lexeme.clone(),
            superclass,
            methods,
        });
        self.environment
            .assign(&decl.name, Value::Class(class))
            .expect("class name was just defined in this environment");
        Ok(Signal::Normal)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(lit) => Ok(match lit {
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::String(s) => Value::String(s.clone()),
            }),
            Expr::Variable { id, name } => self.look_up_variable(*id, name),
            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;
                match self.locals.get(id) {
                    Some(&distance) => self.environment.assign_at(distance, &name.lexeme, value.clone()),
                    None => self.globals.assign(name, value.clone())?,
                }
                Ok(value)
            }
            Expr::Unary { op, right } => {
                let right = self.evaluate(right)?;
                match op.kind {
                    TokenKind::Minus => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::operand_must_be_number(op.line)),
                    },
                    TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
                    _ => unreachable!("parser only emits ! and - as unary operators"),
                }
            }
            Expr::Binary { left, op, right } => self.evaluate_binary(left, op, right),
            Expr::Logical { left, op, right } => {
                let left_val = self.evaluate(left)?;
                match op.kind {
                    TokenKind::Or if left_val.is_truthy() => Ok(left_val),
                    TokenKind::Or => self.evaluate(right),
                    TokenKind::And if !left_val.is_truthy() => Ok(left_val),
                    TokenKind::And => self.evaluate(right),
                    _ => unreachable!("parser only emits 'and'/'or' as logical operators"),
                }
            }
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Call { callee, paren, args } => {
                let callee_val = self.evaluate(callee)?;
                let mut arg_vals = Vec::with_capacity(args.len());
                for arg in args {
                    arg_vals.push(self.evaluate(arg)?);
                }
                self.call_value(callee_val, arg_vals, paren.line)
            }
            Expr::Function(function) => Ok(Value::Function(Rc::new(FunctionDecl {
                name: None,
                params: function.params.clone(),
                body: Rc::new(function.body.clone()),
                closure: self.environment.clone(),
                is_initializer: false,
            }))),
            Expr::Get { object, name } => {
                let obj = self.evaluate(object)?;
                match obj {
                    Value::Instance(instance) => instance.get(name),
                    _ => Err(RuntimeError::only_instances_have_properties(name.line)),
                }
            }
            Expr::Set { object, name, value } => {
                let obj = self.evaluate(object)?;
                match obj {
                    Value::Instance(instance) => {
                        let value = self.evaluate(value)?;
                        instance.set(name, value.clone());
                        Ok(value)
                    }
                    _ => Err(RuntimeError::only_instances_have_properties(name.line)),
                }
            }
            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),
            Expr::Super { id, keyword, method } => self.evaluate_super(*id, keyword, method),
            Expr::List(elements) => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.evaluate(element)?);
                }
                Ok(Value::List(Rc::new(RefCell::new(values))))
            }
            Expr::Subscript {
                target,
                bracket,
                index,
                value,
            } => self.evaluate_subscript(target, bracket, index, value.as_deref()),
        }
    }

    fn look_up_variable(&self, id: NodeId, name: &Token) -> Result<Value, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => Ok(self.environment.get_at(distance, &name.lexeme)),
            None => self.globals.get(name),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        fn numbers(left: Value, right: Value, line: usize) -> Result<(f64, f64), RuntimeError> {
            match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok((a, b)),
                _ => Err(RuntimeError::operands_must_be_numbers(line)),
            }
        }

        use TokenKind::*;
        match op.kind {
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
                (Value::Number(_), Value::String(b)) => Ok(Value::String(format!("{}{}", left, b))),
                (Value::String(a), Value::Number(_)) => Ok(Value::String(format!("{}{}", a, right))),
                _ => Err(RuntimeError::operands_must_be_numbers_or_strings(op.line)),
            },
            Minus => numbers(left, right, op.line).map(|(a, b)| Value::Number(a - b)),
            Star => numbers(left, right, op.line).map(|(a, b)| Value::Number(a * b)),
            Slash => numbers(left, right, op.line).map(|(a, b)| Value::Number(a / b)),
            Percent => numbers(left, right, op.line).map(|(a, b)| Value::Number(a % b)),
            StarStar => numbers(left, right, op.line).map(|(a, b)| Value::Number(a.powf(b))),
            Greater => numbers(left, right, op.line).map(|(a, b)| Value::Bool(a > b)),
            GreaterEqual => numbers(left, right, op.line).map(|(a, b)| Value::Bool(a >= b)),
            Less => numbers(left, right, op.line).map(|(a, b)| Value::Bool(a < b)),
            LessEqual => numbers(left, right, op.line).map(|(a, b)| Value::Bool(a <= b)),
            BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            _ => unreachable!("parser only emits binary operators here"),
        }
    }

    fn call_value(&mut self, callee: Value, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => self.call_function(&function, args, line),
            Value::Class(class) => self.call_class(&class, args, line),
            Value::Native(native) => {
                if !native.arity.accepts(args.len()) {
                    return Err(RuntimeError::arity_mismatch(
                        line,
                        native.arity.expected_for_message(args.len()),
                        args.len(),
                    ));
                }
                (native.func)(self, args, line)
            }
            _ => Err(RuntimeError::can_only_call_functions(line)),
        }
    }

    fn call_function(
        &mut self,
        function: &Rc<FunctionDecl>,
        args: Vec<Value>,
        line: usize,
    ) -> Result<Value, RuntimeError> {
        if function.params.len() != args.len() {
            return Err(RuntimeError::arity_mismatch(line, function.params.len(), args.len()));
        }
        let env = Environment::with_parent(function.closure.clone());
        for (param, arg) in function.params.iter().zip(args) {
            env.define(&param.lexeme, arg);
        }
        let signal = self.execute_block(&function.body, env)?;

        if function.is_initializer {
            return Ok(function.closure.get_at(0, "this"));
        }

        match signal {
            Signal::Return(value) => Ok(value),
            _ => Ok(Value::Nil),
        }
    }

    fn call_class(&mut self, class: &Rc<ClassDef>, args: Vec<Value>, line: usize) -> Result<Value, RuntimeError> {
        let instance = Rc::new(InstanceData {
            class: class.clone(),
            fields: RefCell::new(HashMap::new()),
        });
        match class.find_method("init") {
            Some(init) => {
                let bound = init.bind(instance.clone());
                self.call_function(&bound, args, line)?;
            }
            None if !args.is_empty() => {
                return Err(RuntimeError::arity_mismatch(line, 0, args.len()));
            }
            None => {}
        }
        Ok(Value::Instance(instance))
    }

    fn evaluate_super(&mut self, id: NodeId, keyword: &Token, method: &Token) -> Result<Value, RuntimeError> {
        let distance = *self
            .locals
            .get(&id)
            .expect("resolver always records a distance for 'super'");
        let superclass = match self.environment.get_at(distance, "super") {
            Value::Class(class) => class,
            _ => unreachable!("'super' always resolves to a class"),
        };
        let instance = match self.environment.get_at(distance - 1, "this") {
            Value::Instance(instance) => instance,
            _ => unreachable!("'this' always resolves to an instance one scope below 'super'"),
        };
        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(found.bind(instance))),
            None => Err(RuntimeError::undefined_property(keyword.line, &method.lexeme)),
        }
    }

    fn evaluate_subscript(
        &mut self,
        target: &Expr,
        bracket: &Token,
        index: &Expr,
        value: Option<&Expr>,
    ) -> Result<Value, RuntimeError> {
        let target_val = self.evaluate(target)?;
        let list = match target_val {
            Value::List(list) => list,
            _ => return Err(RuntimeError::only_lists_can_be_subscripted(bracket.line)),
        };
        let index_val = self.evaluate(index)?;
        let idx = match index_val {
            Value::Number(n) => n,
            _ => return Err(RuntimeError::index_must_be_number(bracket.line)),
        };

        match value {
            Some(value_expr) => {
                let new_value = self.evaluate(value_expr)?;
                if idx < 0.0 {
                    return Err(RuntimeError::index_out_of_range(bracket.line));
                }
                let i = idx as usize;
                let mut list_mut = list.borrow_mut();
                let len = list_mut.len();
                if i == len {
                    list_mut.push(new_value.clone());
                } else if i < len {
                    list_mut[i] = new_value.clone();
                } else {
                    return Err(RuntimeError::index_out_of_range(bracket.line));
                }
                Ok(new_value)
            }
            None => {
                if idx < 0.0 {
                    return Ok(Value::Nil);
                }
                let i = idx as usize;
                Ok(list.borrow().get(i).cloned().unwrap_or(Value::Nil))
            }
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Reporter;
    use crate::lexer::Lexer;
    use crate::{parser, resolver};
    use std::cell::RefCell as StdRefCell;
    use std::rc::Rc as StdRc;

    #[derive(Clone)]
    struct SharedBuf(StdRc<StdRefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().write(buf)
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run(src: &str) -> String {
        let mut reporter = Reporter::new();
        let tokens = Lexer::new(src).scan_tokens(&mut reporter);
        let stmts = parser::parse(tokens, &mut reporter);
        assert!(!reporter.had_error(), "parse errors: {:?}", reporter.errors());
        let locals = resolver::resolve(&stmts, &mut reporter);
        assert!(!reporter.had_error(), "resolve errors: {:?}", reporter.errors());

        let buf = StdRc::new(StdRefCell::new(Vec::new()));
        let mut interpreter = Interpreter::with_output(Box::new(SharedBuf(buf.clone())));
        interpreter.add_locals(locals);
        interpreter.interpret(&stmts).expect("runtime error");
        String::from_utf8(buf.borrow().clone()).unwrap()
    }

    #[test]
    fn block_scoping() {
        let out = run("var a=1; { var a=2; print(a); } print(a);");
        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn closures_capture_mutable_state() {
        let out = run(
            "fun mk(){var i=0; fun inc(){i=i+1; return i;} return inc;} \
             var c=mk(); print(c()); print(c()); print(c());",
        );
        assert_eq!(out, "1\n2\n3\n");
    }

    #[test]
    fn inheritance_and_super() {
        let out = run(
            "class A{f(){return \"A\";}} class B:A{f(){return \"B-\"+super.f();}} print(B().f());",
        );
        assert_eq!(out, "B-A\n");
    }

    #[test]
    fn list_subscript_append_and_oob_read() {
        let out = run("var xs=[1,2,3]; xs[3]=4; print(xs[0]); print(xs[3]); print(xs[99]);");
        assert_eq!(out, "1\n4\nnil\n");
    }

    #[test]
    fn break_exits_loop() {
        let out = run("for(var i=0;i<3;i=i+1){ if(i==2) break; print(i);}");
        assert_eq!(out, "0\n1\n");
    }

    #[test]
    fn initializer_returns_instance_regardless_of_body() {
        let out = run("class C{init(x){this.x=x;} show(){print(this.x);}} C(42).show();");
        assert_eq!(out, "42\n");
    }

    #[test]
    fn subscript_write_out_of_range_errors() {
        let mut reporter = Reporter::new();
        let tokens = Lexer::new("var xs=[1]; xs[5]=2;").scan_tokens(&mut reporter);
        let stmts = parser::parse(tokens, &mut reporter);
        let locals = resolver::resolve(&stmts, &mut reporter);
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        interpreter.add_locals(locals);
        assert!(interpreter.interpret(&stmts).is_err());
    }

    #[test]
    fn coercion_then_type_error() {
        let out = run("print(1+\"a\");");
        assert_eq!(out, "1a\n");

        let mut reporter = Reporter::new();
        let tokens = Lexer::new("print(true+1);").scan_tokens(&mut reporter);
        let stmts = parser::parse(tokens, &mut reporter);
        let locals = resolver::resolve(&stmts, &mut reporter);
        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        interpreter.add_locals(locals);
        assert!(interpreter.interpret(&stmts).is_err());
    }

    #[test]
    fn logical_operators_short_circuit_and_return_value() {
        let out = run("print(nil or 2); print(false and 3); print(1 and 2);");
        assert_eq!(out, "2\nfalse\n2\n");
    }

    #[test]
    fn same_method_object_bound_to_different_receivers() {
        let out = run(
            "class A{m(){return 1;}} class B:A{} \
             var direct = B().m; var viaSuper; \
             class C:A{g(){ viaSuper = super.m; }} C().g(); \
             print(direct()); print(viaSuper());",
        );
        assert_eq!(out, "1\n1\n");
    }
}
