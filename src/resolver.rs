// ABOUTME: Static resolution pass computing lexical scope-distances
// New module with no direct teacher analogue (the teacher's Lisp has no
// static resolution pass); grounded in structure on the teacher's
// visitor-over-tagged-variants dispatch style in eval.rs, applied here to a
// pre-execution walk instead of execution.

use std::collections::HashMap;

use crate::ast::{ClassDecl, Expr, FunctionExpr, NodeId, Stmt};
use crate::diagnostics::Reporter;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentFunction {
    None,
    Function,
    Initializer,
    Method,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CurrentClass {
    None,
    Class,
    Subclass,
}

type Scope = HashMap<String, bool>;

pub fn resolve(stmts: &[Stmt], reporter: &mut Reporter) -> HashMap<NodeId, usize> {
    let mut resolver = Resolver {
        scopes: Vec::new(),
        locals: HashMap::new(),
        current_function: CurrentFunction::None,
        current_class: CurrentClass::None,
        reporter,
    };
    resolver.resolve_stmts(stmts);
    resolver.locals
}

/// Resolves a single bare expression, used by the REPL's "single expression"
/// mode (`parser::parse_repl`'s `Expression` variant), which never goes
/// through `resolve`'s statement walk.
pub fn resolve_expr_for_repl(expr: &Expr, reporter: &mut Reporter) -> HashMap<NodeId, usize> {
    let mut resolver = Resolver {
        scopes: Vec::new(),
        locals: HashMap::new(),
        current_function: CurrentFunction::None,
        current_class: CurrentClass::None,
        reporter,
    };
    resolver.resolve_expr(expr);
    resolver.locals
}

struct Resolver<'a> {
    scopes: Vec<Scope>,
    locals: HashMap<NodeId, usize>,
    current_function: CurrentFunction,
    current_class: CurrentClass,
    reporter: &'a mut Reporter,
}

impl<'a> Resolver<'a> {
    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => {
                self.begin_scope();
                self.resolve_stmts(stmts);
                self.end_scope();
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Print(expr) => self.resolve_expr(expr),
            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                self.define(name);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
            Stmt::Function { name, function } => {
                self.declare(name);
                self.define(name);
                self.resolve_function(function, CurrentFunction::Function);
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == CurrentFunction::None {
                    self.error(keyword, "Can't return from top-level code.");
                }
                if let Some(value) = value {
                    if self.current_function == CurrentFunction::Initializer {
                        self.error(keyword, "Can't return a value from an initializer.");
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Break => {}
            Stmt::Class(decl) => self.resolve_class(decl),
            Stmt::Import { .. } => {
                // The imported file's statements are resolved transitively when
                // the interpreter loads and runs it at execution time.
            }
        }
    }

    fn resolve_class(&mut self, decl: &ClassDecl) {
        let enclosing_class = self.current_class;
        self.current_class = CurrentClass::Class;

        self.declare(&decl.name);
        self.define(&decl.name);

        if let Some(superclass) = &decl.superclass {
            self.current_class = CurrentClass::Subclass;
            self.resolve_expr(superclass);
        }

        if decl.superclass.is_some() {
            self.begin_scope();
            self.scopes.last_mut().unwrap().insert("super".to_string(), true);
        }

        self.begin_scope();
        self.scopes.last_mut().unwrap().insert("this".to_string(), true);

        for (name, function) in &decl.methods {
            let kind = if name.lexeme == "init" {
                CurrentFunction::Initializer
            } else {
                CurrentFunction::Method
            };
            self.resolve_function(function, kind);
        }

        self.end_scope();

        if decl.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, function: &FunctionExpr, kind: CurrentFunction) {
        let enclosing_function = self.current_function;
        self.current_function = kind;

        self.begin_scope();
        for param in &function.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve_stmts(&function.body);
        self.end_scope();

        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(_) => {}
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.error(name, "Can't read local variable in its own initializer.");
                    }
                }
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Unary { right, .. } => self.resolve_expr(right),
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Call { callee, args, .. } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
            Expr::Function(function) => self.resolve_function(function, CurrentFunction::Function),
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Set { object, value, .. } => {
                self.resolve_expr(value);
                self.resolve_expr(object);
            }
            Expr::This { id, keyword } => {
                if self.current_class == CurrentClass::None {
                    self.error(keyword, "Can't use 'this' outside of a class.");
                    return;
                }
                self.resolve_local(*id, "this");
            }
            Expr::Super { id, keyword, .. } => {
                match self.current_class {
                    CurrentClass::None => {
                        self.error(keyword, "Can't use 'super' outside of a class.");
                        return;
                    }
                    CurrentClass::Class => {
                        self.error(keyword, "Can't use 'super' in a class with no superclass.");
                        return;
                    }
                    CurrentClass::Subclass => {}
                }
                self.resolve_local(*id, "super");
            }
            Expr::List(elements) => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Subscript {
                target,
                index,
                value,
                ..
            } => {
                self.resolve_expr(target);
                self.resolve_expr(index);
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &str) {
        for (i, scope) in self.scopes.iter().enumerate().rev() {
            if scope.contains_key(name) {
                let distance = self.scopes.len() - 1 - i;
                self.locals.insert(id, distance);
                return;
            }
        }
        // Not found in any scope: falls back to globals at runtime.
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        if scope.contains_key(&name.lexeme) {
            self.error(name, "Already a variable with this name in this scope.");
        }
        scope.insert(name.lexeme.clone(), false);
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), true);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn error(&mut self, token: &Token, message: &str) {
        self.reporter
            .error_at(token.line, format!("at '{}'", token.lexeme), message);
    }
}
