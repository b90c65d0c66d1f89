//! PathQL: a graph-path query semantics engine
//!
//! PathQL evaluates FILTER queries over a typed object graph under
//! three-valued logic (TRUE/FALSE/EMPTY), with implicit iteration-domain
//! expansion over one-to-many path traversals. The engine consumes an
//! already-parsed query block and an immutable graph snapshot and returns
//! ordered, structured results; parsing, storage and transport are separate
//! front-end concerns.
//!
//! # Example
//!
//! ```
//! use pathql::ast::{Expr, PathExpr, QueryBlock, SelectExpr};
//! use pathql::model::{GraphBuilder, ObjectType, Scalar, ScalarKind, Schema};
//! use pathql::Evaluator;
//!
//! let schema = Schema::new()
//!     .with_type(ObjectType::new("Status").with_required_property("name", ScalarKind::Str));
//! let mut builder = GraphBuilder::new(schema);
//! for name in ["Open", "Closed"] {
//!     let status = builder.insert("Status").unwrap();
//!     builder.set_property(status, "name", Scalar::str(name)).unwrap();
//! }
//! let graph = builder.build();
//!
//! // SELECT Status{name} FILTER .name = 'Open'
//! let block = QueryBlock::new(SelectExpr::shaped(PathExpr::binding("Status"), ["name"]))
//!     .filter(Expr::eq(PathExpr::short_form().property("name"), Expr::str("Open")));
//! let result = Evaluator::new(&graph).evaluate(&block).unwrap();
//! assert_eq!(result.to_json(), serde_json::json!([{ "name": "Open" }]));
//! ```

// Re-export all public APIs from internal crates
pub use pathql_ast as ast;
pub use pathql_eval as eval;
pub use pathql_model as model;

// Convenience re-exports
pub use pathql_ast::{Expr, PathExpr, QueryBlock, SelectExpr};
pub use pathql_eval::{EvalError, EvalOptions, EvalResult, Evaluator, ResultSet, Truth};
pub use pathql_model::{Graph, GraphBuilder, Schema, Value};
