//! Runtime values
//!
//! `Value` is the result of reading a property or traversing a link: a typed
//! scalar, an object reference, or EMPTY. EMPTY represents "no such value"
//! and is never equal, greater or less than anything, including itself —
//! that rule is enforced by the comparison layer in `pathql-eval`; the
//! derived `PartialEq` here is structural and only used for storage.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::InstanceId;

/// Scalar kinds supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Str,
    Int,
    Bool,
    DateTime,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str => write!(f, "str"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
            Self::DateTime => write!(f, "datetime"),
        }
    }
}

/// A typed scalar value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Scalar {
    Str(String),
    Int(i64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Scalar {
    /// Create a string scalar
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Create an integer scalar
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }

    /// Create a boolean scalar
    pub fn bool(value: bool) -> Self {
        Self::Bool(value)
    }

    /// Create a datetime scalar
    pub fn datetime(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }

    /// Get the kind of this scalar
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Str(_) => ScalarKind::Str,
            Self::Int(_) => ScalarKind::Int,
            Self::Bool(_) => ScalarKind::Bool,
            Self::DateTime(_) => ScalarKind::DateTime,
        }
    }

    /// Compare two scalars of the same kind
    ///
    /// Returns `None` when the kinds differ; the caller decides whether that
    /// is a type error or an unknown comparison.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Render as a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Str(s) => serde_json::Value::String(s.clone()),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::DateTime(dt) => {
                serde_json::Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "'{s}'"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

/// A runtime value: a scalar, an object reference, or EMPTY
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// A typed scalar
    Scalar(Scalar),
    /// A reference to a graph instance
    Object(InstanceId),
    /// No value ("unknown/missing")
    Empty,
}

impl Value {
    /// Create a string value
    pub fn str(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::str(value))
    }

    /// Create an integer value
    pub fn int(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }

    /// Create a boolean value
    pub fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    /// Create a datetime value
    pub fn datetime(value: NaiveDateTime) -> Self {
        Self::Scalar(Scalar::DateTime(value))
    }

    /// Create an object reference
    pub fn object(id: InstanceId) -> Self {
        Self::Object(id)
    }

    /// Check if this value is EMPTY
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Try to get as a scalar
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an object reference
    pub fn as_object(&self) -> Option<InstanceId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Try to get as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Object(id) => write!(f, "{id}"),
            Self::Empty => write!(f, "{{}}"),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}
