//! Path resolution
//!
//! Resolves a path expression against the schema into a typed step chain,
//! computing for every step its cardinality and its canonical prefix key.
//! The prefix key of a multi-cardinality step is the path's correlation
//! identity: two occurrences that share a prefix key denote the same
//! iteration variable in a query block. Keys are canonicalized path text
//! (root binding name plus ordered steps), so correlation never depends on
//! node identity or evaluation order.

use pathql_ast::{PathExpr, PathStep};
use pathql_model::{Cardinality, ScalarKind, Schema};

use crate::error::{EvalError, EvalResult};

/// What a resolved step leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StepTarget {
    /// A scalar property value
    Scalar(ScalarKind),
    /// Instances of an object type
    Object(String),
}

/// One schema-validated traversal step
#[derive(Debug, Clone)]
pub(crate) struct ResolvedStep {
    /// The syntactic step
    pub step: PathStep,
    /// Canonical path text up to and including this step
    pub key: String,
    /// Whether this step fans out (multi link or any backward link)
    pub multi: bool,
    /// What the step leads to
    pub target: StepTarget,
}

/// A schema-validated path: root binding plus typed steps
#[derive(Debug, Clone)]
pub(crate) struct ResolvedPath {
    /// Root binding name (short form already substituted)
    pub root: String,
    /// Object type the root ranges over
    pub root_type: String,
    /// Validated steps in source order
    pub steps: Vec<ResolvedStep>,
}

impl ResolvedPath {
    /// Canonical key of the whole path
    pub fn full_key(&self) -> &str {
        self.steps.last().map_or(&self.root, |step| &step.key)
    }

    /// What the path as a whole evaluates to
    pub fn target(&self) -> StepTarget {
        self.steps
            .last()
            .map_or_else(|| StepTarget::Object(self.root_type.clone()), |s| s.target.clone())
    }
}

/// Resolve a path against the schema, given its root binding and type
pub(crate) fn resolve_path(
    path: &PathExpr,
    root: &str,
    root_type: &str,
    schema: &Schema,
) -> EvalResult<ResolvedPath> {
    let mut steps = Vec::with_capacity(path.steps.len());
    let mut current_type = root_type.to_string();
    let mut key = root.to_string();

    for (position, step) in path.steps.iter().enumerate() {
        key.push_str(&step.to_string());
        let object_type = schema.object_type(&current_type)?;

        let (multi, target) = match step {
            PathStep::Property(name) => {
                let decl = object_type.property(name).ok_or_else(|| {
                    EvalError::Model(pathql_model::ModelError::unknown_property(
                        &current_type,
                        name,
                    ))
                })?;
                if position + 1 != path.steps.len() {
                    return Err(EvalError::invalid_path(
                        path.to_string(),
                        format!("cannot traverse into scalar property '{name}'"),
                    ));
                }
                (false, StepTarget::Scalar(decl.kind))
            }
            PathStep::Link(name) => {
                let decl = object_type.link(name).ok_or_else(|| {
                    EvalError::Model(pathql_model::ModelError::unknown_link(&current_type, name))
                })?;
                let multi = decl.cardinality == Cardinality::Multi;
                current_type = decl.target.clone();
                (multi, StepTarget::Object(decl.target.clone()))
            }
            PathStep::Backlink { link, target } => {
                schema.backlink(&current_type, link, target)?;
                current_type = target.clone();
                // Backward links are always multi: many instances may point
                // at the same target.
                (true, StepTarget::Object(target.clone()))
            }
        };

        steps.push(ResolvedStep {
            step: step.clone(),
            key: key.clone(),
            multi,
            target,
        });
    }

    Ok(ResolvedPath {
        root: root.to_string(),
        root_type: root_type.to_string(),
        steps,
    })
}
