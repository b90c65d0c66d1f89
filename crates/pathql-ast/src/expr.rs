//! Expression AST nodes
//!
//! The closed set of expression variants the evaluator dispatches over.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::literal::Literal;
use crate::path::PathExpr;
use crate::query::QueryBlock;

/// All PathQL expression types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    // === Atoms ===
    /// Literal value
    Literal(Literal),
    /// Path traversal
    Path(PathExpr),

    // === Operators ===
    /// Comparison (`=`, `!=`, `<`, `<=`, `>`, `>=`)
    Compare(CompareExpr),
    /// Addition: integer arithmetic or string concatenation
    Add(BinaryExpr),

    // === Boolean connectives ===
    /// Logical AND
    And(BinaryExpr),
    /// Logical OR
    Or(BinaryExpr),
    /// Logical NOT
    Not(UnaryExpr),

    // === Set predicates ===
    /// EXISTS: set non-emptiness, never unknown
    Exists(UnaryExpr),
    /// count(ALL ...) aggregate
    Count(CountExpr),

    // === Sub-queries ===
    /// Nested SELECT usable inside EXISTS or as a set expression
    Select(Box<QueryBlock>),
}

/// Binary operator operands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// Unary operator operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub operand: Box<Expr>,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => write!(f, "="),
            Self::Ne => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::Le => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::Ge => write!(f, ">="),
        }
    }
}

/// A comparison expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareExpr {
    pub op: CompareOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

/// A `count(ALL ...)` aggregate call
///
/// `all` suppresses correlation with the enclosing block: the argument is
/// materialized independently of the outer iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountExpr {
    pub all: bool,
    pub arg: Box<Expr>,
}

impl Expr {
    /// Comparison with an explicit operator
    pub fn compare(op: CompareOp, lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::Compare(CompareExpr {
            op,
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        })
    }

    /// `lhs = rhs`
    pub fn eq(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Eq, lhs, rhs)
    }

    /// `lhs != rhs`
    pub fn ne(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ne, lhs, rhs)
    }

    /// `lhs < rhs`
    pub fn lt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Lt, lhs, rhs)
    }

    /// `lhs <= rhs`
    pub fn le(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Le, lhs, rhs)
    }

    /// `lhs > rhs`
    pub fn gt(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Gt, lhs, rhs)
    }

    /// `lhs >= rhs`
    pub fn ge(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ge, lhs, rhs)
    }

    /// `lhs + rhs`
    pub fn add(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::Add(BinaryExpr {
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        })
    }

    /// `lhs AND rhs`
    pub fn and(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::And(BinaryExpr {
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        })
    }

    /// `lhs OR rhs`
    pub fn or(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Self {
        Self::Or(BinaryExpr {
            lhs: Box::new(lhs.into()),
            rhs: Box::new(rhs.into()),
        })
    }

    /// `NOT operand`
    pub fn not(operand: impl Into<Expr>) -> Self {
        Self::Not(UnaryExpr {
            operand: Box::new(operand.into()),
        })
    }

    /// `EXISTS operand`
    pub fn exists(operand: impl Into<Expr>) -> Self {
        Self::Exists(UnaryExpr {
            operand: Box::new(operand.into()),
        })
    }

    /// `NOT EXISTS operand`
    pub fn not_exists(operand: impl Into<Expr>) -> Self {
        Self::not(Self::exists(operand))
    }

    /// `count(ALL arg)`
    pub fn count_all(arg: impl Into<Expr>) -> Self {
        Self::Count(CountExpr {
            all: true,
            arg: Box::new(arg.into()),
        })
    }

    /// Nested `(SELECT ...)` sub-query
    pub fn select(block: QueryBlock) -> Self {
        Self::Select(Box::new(block))
    }

    /// String literal shorthand
    pub fn str(value: impl Into<String>) -> Self {
        Self::Literal(Literal::str(value))
    }

    /// Integer literal shorthand
    pub fn int(value: i64) -> Self {
        Self::Literal(Literal::int(value))
    }

    /// Boolean literal shorthand
    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::bool(value))
    }

    /// EMPTY literal shorthand
    pub fn empty() -> Self {
        Self::Literal(Literal::Empty)
    }
}

impl From<Literal> for Expr {
    fn from(literal: Literal) -> Self {
        Self::Literal(literal)
    }
}

impl From<PathExpr> for Expr {
    fn from(path: PathExpr) -> Self {
        Self::Path(path)
    }
}
