//! Evaluation errors

use pathql_model::ModelError;
use thiserror::Error;

/// Result type for evaluation operations
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur during query evaluation
///
/// Every variant is fatal to the query block it occurs in; the engine never
/// returns partial results.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    /// Schema lookup failure from the object graph model
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Path root does not name a binding or a known object type
    #[error("Unknown binding: {name}")]
    UnknownBinding { name: String },

    /// Short-form path with no inferable root type
    #[error("Short-form path has no inferable root type")]
    AmbiguousShortForm,

    /// Operand types do not fit the operator
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Ill-formed path (e.g. traversal into a scalar property)
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// Single-value coercion of a set with more than one element
    #[error("Set of {count} elements used in a single-value context")]
    CardinalityViolation { count: usize },

    /// Maximum sub-query nesting depth exceeded
    #[error("Maximum query nesting depth exceeded")]
    RecursionLimit,

    /// Domain tuple budget exceeded
    #[error("Iteration domain exceeded the configured budget of {limit} tuples")]
    DomainBudgetExceeded { limit: usize },

    /// Expression form the engine does not evaluate
    #[error("Unsupported expression: {message}")]
    Unsupported { message: String },

    /// Internal invariant violation (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create an unknown binding error
    pub fn unknown_binding(name: impl Into<String>) -> Self {
        Self::UnknownBinding { name: name.into() }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported expression error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
