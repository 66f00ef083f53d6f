//! Runtime error types for the sketch interpreter
//!
//! This module defines [`RuntimeError`], which represents every failure that can
//! occur while a program runs, and [`ErrorKind`], the stable taxonomy written
//! into `ERROR` commands.
//!
//! Most errors are recoverable: the interpreter emits one `ERROR` record where
//! a statement consumes the failing expression, the expression yields
//! [`Value::Void`](crate::memory::value::Value::Void) and execution continues.
//! Iteration limits, step/time budgets and malformed trees are fatal and end
//! the run.

use crate::tree::TreeError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error taxonomy reported in the command stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    UndefinedVariable,
    DuplicateDeclaration,
    TypeMismatch,
    DivisionByZero,
    ConstAssignment,
    OutOfBounds,
    NullDereference,
    UnknownFunction,
    CallDepthExceeded,
    IterationLimit,
    Timeout,
    MalformedTree,
}

impl ErrorKind {
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::IterationLimit | ErrorKind::Timeout | ErrorKind::MalformedTree
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("Variable '{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String },

    #[error("Type error: expected {expected}, got {got}")]
    TypeError { expected: String, got: String },

    #[error("Expression is not assignable: {what}")]
    NotAssignable { what: String },

    #[error("Struct '{struct_name}' does not have field '{field_name}'")]
    MissingStructField {
        struct_name: String,
        field_name: String,
    },

    #[error("Function '{function}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("{operation} by zero")]
    DivisionByZero { operation: String },

    #[error("Attempted to modify const variable '{var}'")]
    ConstModification { var: String },

    #[error("Index {index} out of bounds for size {size}")]
    OutOfBounds { index: i64, size: usize },

    #[error("Null pointer dereference")]
    NullDereference,

    #[error("Dangling pointer to '{target}' (storage no longer exists)")]
    DanglingPointer { target: String },

    #[error("Unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("Call depth limit of {limit} exceeded calling '{function}'")]
    CallDepthExceeded { function: String, limit: usize },

    #[error("{construct} loop exceeded {limit} iterations")]
    IterationLimit { construct: String, limit: u32 },

    #[error("Step budget of {limit} statements exhausted")]
    StepLimit { limit: u64 },

    #[error("Execution exceeded {millis} ms")]
    Timeout { millis: u64 },

    #[error("Malformed program tree: {message}")]
    MalformedTree { message: String },
}

impl RuntimeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::UndefinedVariable { .. } => ErrorKind::UndefinedVariable,
            RuntimeError::DuplicateDeclaration { .. } => ErrorKind::DuplicateDeclaration,
            RuntimeError::TypeError { .. }
            | RuntimeError::NotAssignable { .. }
            | RuntimeError::MissingStructField { .. }
            | RuntimeError::ArgumentCountMismatch { .. } => ErrorKind::TypeMismatch,
            RuntimeError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            RuntimeError::ConstModification { .. } => ErrorKind::ConstAssignment,
            RuntimeError::OutOfBounds { .. } => ErrorKind::OutOfBounds,
            RuntimeError::NullDereference | RuntimeError::DanglingPointer { .. } => {
                ErrorKind::NullDereference
            }
            RuntimeError::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            RuntimeError::CallDepthExceeded { .. } => ErrorKind::CallDepthExceeded,
            RuntimeError::IterationLimit { .. } => ErrorKind::IterationLimit,
            RuntimeError::StepLimit { .. } | RuntimeError::Timeout { .. } => ErrorKind::Timeout,
            RuntimeError::MalformedTree { .. } => ErrorKind::MalformedTree,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }

    pub(crate) fn type_error(expected: &str, got: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            got: got.into(),
        }
    }
}

impl From<TreeError> for RuntimeError {
    fn from(err: TreeError) -> Self {
        RuntimeError::MalformedTree {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(!RuntimeError::NullDereference.is_fatal());
        assert!(!RuntimeError::CallDepthExceeded {
            function: "f".to_string(),
            limit: 4
        }
        .is_fatal());
        assert!(RuntimeError::StepLimit { limit: 10 }.is_fatal());
        assert!(RuntimeError::IterationLimit {
            construct: "while".to_string(),
            limit: 1
        }
        .is_fatal());
    }

    #[test]
    fn test_kind_mapping() {
        let err = RuntimeError::MissingStructField {
            struct_name: "Point".to_string(),
            field_name: "z".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(
            err.to_string(),
            "Struct 'Point' does not have field 'z'"
        );
        let dangling = RuntimeError::DanglingPointer {
            target: "x".to_string(),
        };
        assert_eq!(dangling.kind(), ErrorKind::NullDereference);
    }
}
