//! PathQL semantics engine
//!
//! Takes a parsed query block (`pathql-ast`) and a read-only object graph
//! (`pathql-model`) and produces ordered result sequences under the
//! language's non-classical evaluation rules:
//!
//! - **Three-valued logic**: predicates evaluate to TRUE, FALSE or EMPTY
//!   (Kleene K3); FILTER keeps a tuple only on an exact TRUE.
//! - **Implicit path existence**: dereferencing a multi-cardinality path in
//!   direct context adds a join dimension to the block's iteration domain,
//!   so a source row with no related instance silently disappears.
//! - **Correlation by structural identity**: two occurrences of the same
//!   canonical path prefix share one iteration variable; a fresh WITH alias
//!   over the same type is an independent dimension.
//! - **Suppressed expansion**: EXISTS and aggregate arguments materialize
//!   into a scalar for the current tuple instead of fanning the domain out.
//!
//! # Example
//!
//! ```
//! use pathql_ast::{Expr, PathExpr, QueryBlock, SelectExpr};
//! use pathql_eval::Evaluator;
//! use pathql_model::{GraphBuilder, ObjectType, Scalar, ScalarKind, Schema};
//!
//! let schema = Schema::new()
//!     .with_type(ObjectType::new("User").with_required_property("name", ScalarKind::Str));
//! let mut builder = GraphBuilder::new(schema);
//! let user = builder.insert("User").unwrap();
//! builder.set_property(user, "name", Scalar::str("Yury")).unwrap();
//! let graph = builder.build();
//!
//! let block = QueryBlock::new(SelectExpr::shaped(PathExpr::binding("User"), ["name"]))
//!     .filter(Expr::eq(PathExpr::binding("User").property("name"), Expr::str("Yury")));
//! let result = Evaluator::new(&graph).evaluate(&block).unwrap();
//! assert_eq!(result.to_json(), serde_json::json!([{ "name": "Yury" }]));
//! ```

mod correlate;
mod domain;
mod engine;
mod error;
mod options;
mod path;
mod result;
mod scope;
mod truth;

pub use engine::Evaluator;
pub use error::{EvalError, EvalResult};
pub use options::EvalOptions;
pub use result::{ResultRow, ResultSet};
pub use truth::Truth;
