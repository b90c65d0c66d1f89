//! PathQL object graph model
//!
//! This crate provides the read-only data substrate the PathQL semantics
//! engine evaluates against:
//!
//! - **Schema metadata**: object types with scalar properties and links of
//!   declared cardinality; every forward link carries an implicit backward
//!   counterpart.
//! - **Instances**: typed objects with stable identities, property values
//!   and ordered link targets.
//! - **Values**: the runtime `Value` type, where EMPTY ("no such value") is
//!   first-class and distinct from every scalar.
//! - **Graph**: an immutable point-in-time snapshot exposing `extent`,
//!   `get_property` and `get_link`, built through a validating
//!   [`GraphBuilder`].
//!
//! The crate performs no query evaluation; all semantics live in
//! `pathql-eval`.

mod error;
mod graph;
mod instance;
mod schema;
mod value;

pub use error::{ModelError, ModelResult};
pub use graph::{Graph, GraphBuilder};
pub use instance::{Instance, InstanceId};
pub use schema::{Cardinality, Link, ObjectType, Property, Schema};
pub use value::{Scalar, ScalarKind, Value};
