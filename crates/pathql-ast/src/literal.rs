//! Literal AST nodes

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in source text
///
/// `Empty` is the EMPTY literal: it denotes "no value" directly, not an
/// empty collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// EMPTY literal
    Empty,
    /// Boolean literal (TRUE/FALSE)
    Bool(bool),
    /// Integer literal (64-bit signed)
    Int(i64),
    /// String literal
    Str(String),
    /// Datetime literal (`<datetime>'...'`)
    DateTime(NaiveDateTime),
}

impl Literal {
    /// Create a string literal
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Create an integer literal
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    /// Create a boolean literal
    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }

    /// Create a datetime literal
    pub fn datetime(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "EMPTY"),
            Self::Bool(true) => write!(f, "TRUE"),
            Self::Bool(false) => write!(f, "FALSE"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::DateTime(dt) => write!(f, "<datetime>'{}'", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}
