//! Errors raised while generating function tables

use crate::op_set::FieldOp;
use thiserror::Error;

/// Generation result type
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can make a generation call fail. Generation is pure, so
/// retrying a failed call with the same inputs fails the same way
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The inputs of the call (dimension, field, names) cannot be used
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The requested function has no complete definition
    #[error("unsupported {kind} operation: {operation}")]
    UnsupportedOperation {
        kind: &'static str,
        operation: String,
    },

    /// A built-in template refers to something its bindings do not provide.
    /// This is a bug in a template, not in the caller's inputs
    #[error("pattern mismatch: {0}")]
    PatternMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("dimension must be at least 1, got {0}")]
    InvalidDimension(usize),

    #[error("field does not define the `{0}` operator")]
    MissingOperator(FieldOp),

    #[error("rewriting `{op}` did not reach a fixed point within {limit} nested rewrites")]
    RewriteLimitExceeded { op: FieldOp, limit: usize },

    #[error("function `{0}` is defined twice")]
    NameCollision(String),
}

impl Error {
    pub(crate) fn unsupported(kind: &'static str, operation: impl Into<String>) -> Self {
        Error::UnsupportedOperation {
            kind,
            operation: operation.into(),
        }
    }

    /// Whether the error comes from the caller's inputs
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
