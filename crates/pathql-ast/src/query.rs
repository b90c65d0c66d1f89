//! Query block AST nodes

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::expr::Expr;
use crate::path::PathExpr;

/// One query block: WITH bindings, SELECT target, FILTER, ORDER BY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryBlock {
    /// Named top-level bindings
    pub with: Vec<WithBinding>,
    /// The SELECT target
    pub select: SelectExpr,
    /// Optional FILTER predicate
    pub filter: Option<Expr>,
    /// ORDER BY keys, chained in priority order
    pub order_by: Vec<OrderKey>,
}

impl QueryBlock {
    /// Create a query block with a SELECT target only
    pub fn new(select: impl Into<SelectExpr>) -> Self {
        Self {
            with: Vec::new(),
            select: select.into(),
            filter: None,
            order_by: Vec::new(),
        }
    }

    /// Add a WITH binding over a type extent (`U2 := User`)
    pub fn with_extent(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.with.push(WithBinding {
            name: name.into(),
            source: BindingSource::Extent(type_name.into()),
        });
        self
    }

    /// Add a WITH binding over a derived set (`I := (SELECT ...)`)
    pub fn with_derived(mut self, name: impl Into<String>, block: QueryBlock) -> Self {
        self.with.push(WithBinding {
            name: name.into(),
            source: BindingSource::Derived(Box::new(block)),
        });
        self
    }

    /// Set the FILTER predicate
    pub fn filter(mut self, predicate: impl Into<Expr>) -> Self {
        self.filter = Some(predicate.into());
        self
    }

    /// Append an ascending ORDER BY key
    pub fn order_by(mut self, key: impl Into<OrderKey>) -> Self {
        self.order_by.push(key.into());
        self
    }
}

/// A WITH clause binding: a fresh, independent root set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithBinding {
    /// Binding name
    pub name: String,
    /// What the name ranges over
    pub source: BindingSource,
}

/// The source of a WITH binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BindingSource {
    /// All instances of an object type
    Extent(String),
    /// A derived set with its own nested FILTER
    Derived(Box<QueryBlock>),
}

/// The SELECT target: an expression plus an optional shape literal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpr {
    /// Projected expression
    pub expr: Expr,
    /// Shape projection (`{field, ...}`) for object-valued targets
    pub shape: Option<SmallVec<[String; 4]>>,
}

impl SelectExpr {
    /// Select an expression without a shape
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            shape: None,
        }
    }

    /// Select an object-valued expression with a shape literal
    pub fn shaped<S: Into<String>>(
        expr: impl Into<Expr>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            expr: expr.into(),
            shape: Some(fields.into_iter().map(Into::into).collect()),
        }
    }
}

impl From<Expr> for SelectExpr {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

impl From<PathExpr> for SelectExpr {
    fn from(path: PathExpr) -> Self {
        Self::new(path)
    }
}

/// Sort direction for an ORDER BY key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderKey {
    /// Key expression, evaluated per result row
    pub expr: Expr,
    /// Sort direction
    pub direction: OrderDirection,
}

impl OrderKey {
    /// Ascending key
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Descending key
    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: OrderDirection::Desc,
        }
    }
}

impl From<Expr> for OrderKey {
    fn from(expr: Expr) -> Self {
        Self::asc(expr)
    }
}

impl From<PathExpr> for OrderKey {
    fn from(path: PathExpr) -> Self {
        Self::asc(Expr::Path(path))
    }
}
