// ABOUTME: Runtime error type raised by the interpreter
// Static (lex/parse/resolve) errors go through diagnostics::Reporter instead;
// this type is reserved for faults that occur while executing the AST.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub line: usize,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        RuntimeError {
            message: message.into(),
            line,
        }
    }

    pub fn undefined_variable(line: usize, name: &str) -> Self {
        RuntimeError::new(line, format!("Undefined variable '{}'", name))
    }

    pub fn operand_must_be_number(line: usize) -> Self {
        RuntimeError::new(line, "Operand must be a number")
    }

    pub fn operands_must_be_numbers(line: usize) -> Self {
        RuntimeError::new(line, "Operands must be numbers")
    }

    pub fn operands_must_be_numbers_or_strings(line: usize) -> Self {
        RuntimeError::new(
            line,
            "Operands must be 2 numbers, 2 strings, or 1 number and 1 string",
        )
    }

    pub fn only_instances_have_properties(line: usize) -> Self {
        RuntimeError::new(line, "Only instances have properties")
    }

    pub fn undefined_property(line: usize, name: &str) -> Self {
        RuntimeError::new(line, format!("Undefined property '{}'", name))
    }

    pub fn can_only_call_functions(line: usize) -> Self {
        RuntimeError::new(line, "Can only call functions and classes")
    }

    pub fn arity_mismatch(line: usize, expected: usize, got: usize) -> Self {
        RuntimeError::new(
            line,
            format!("Expected {} arguments but got {}", expected, got),
        )
    }

    pub fn superclass_must_be_a_class(line: usize) -> Self {
        RuntimeError::new(line, "Superclass must be a class")
    }

    pub fn only_lists_can_be_subscripted(line: usize) -> Self {
        RuntimeError::new(line, "Only lists can be subscripted")
    }

    pub fn index_must_be_number(line: usize) -> Self {
        RuntimeError::new(line, "Index should be of type int")
    }

    pub fn index_out_of_range(line: usize) -> Self {
        RuntimeError::new(line, "Index out of range")
    }
}
