//! Query results
//!
//! An ordered sequence of structured rows: scalars, bare object references,
//! or shape-projected records. `to_json` renders the JSON-like structure
//! hosts and test harnesses compare against.

use indexmap::IndexMap;
use pathql_model::{InstanceId, Scalar, Value};

/// One result row
#[derive(Debug, Clone, PartialEq)]
pub enum ResultRow {
    /// A scalar value
    Scalar(Scalar),
    /// A bare object reference (no shape)
    Object(InstanceId),
    /// A shape-projected record, fields in shape order
    Record(IndexMap<String, Value>),
}

impl ResultRow {
    /// Render this row as JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Scalar(scalar) => scalar.to_json(),
            Self::Object(id) => serde_json::json!({ "id": id.to_string() }),
            Self::Record(fields) => {
                let map = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value_to_json(value)))
                    .collect::<serde_json::Map<_, _>>();
                serde_json::Value::Object(map)
            }
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Scalar(scalar) => scalar.to_json(),
        Value::Object(id) => serde_json::json!({ "id": id.to_string() }),
        Value::Empty => serde_json::Value::Null,
    }
}

/// The ordered result of one query block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    rows: Vec<ResultRow>,
}

impl ResultSet {
    pub(crate) fn new(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }

    /// The rows in result order
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the whole result as a JSON array
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.rows.iter().map(ResultRow::to_json).collect())
    }
}
