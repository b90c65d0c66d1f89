//! Bindings and evaluation scopes
//!
//! A query block's scope holds its named sets: WITH bindings (`U2 := User`,
//! `I := (SELECT ...)`) plus the implicit bindings created the first time a
//! type name is used as a path root. Two differently named bindings are
//! independent even when they range over identical instances; correlation
//! happens only through shared binding names.

use indexmap::IndexMap;
use pathql_model::InstanceId;

use crate::domain::Dimension;

/// A named set of instances a binding ranges over
#[derive(Debug, Clone)]
pub(crate) struct BindingSet {
    /// Object type of the members
    pub type_name: String,
    /// Member identities in source order
    pub ids: Vec<InstanceId>,
}

/// One query block's resolved scope: bindings plus the planned dimensions
#[derive(Debug, Default)]
pub(crate) struct BlockScope {
    /// Named sets visible in this block, in declaration/first-use order
    pub bindings: IndexMap<String, BindingSet>,
    /// Iteration dimensions in first-discovery order
    pub dims: Vec<Dimension>,
    /// Correlation key to dimension position
    pub dim_index: IndexMap<String, usize>,
    /// Root binding for short-form (`.prop`) paths, when inferable
    pub short_root: Option<String>,
}

impl BlockScope {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One domain tuple under evaluation: a scope plus the current element of
/// each dimension, chained to the enclosing block's tuple
#[derive(Debug, Clone, Copy)]
pub(crate) struct TupleCtx<'a> {
    pub scope: &'a BlockScope,
    pub elements: &'a [InstanceId],
    pub outer: Option<&'a TupleCtx<'a>>,
}

impl<'a> TupleCtx<'a> {
    /// Current element of the dimension with this correlation key, searching
    /// enclosing blocks outward
    pub fn dim_element(&self, key: &str) -> Option<InstanceId> {
        if let Some(&position) = self.scope.dim_index.get(key) {
            return Some(self.elements[position]);
        }
        self.outer.and_then(|outer| outer.dim_element(key))
    }

    /// Whether a dimension with this key exists here or in an enclosing block
    pub fn has_dim(&self, key: &str) -> bool {
        self.scope.dim_index.contains_key(key) || self.outer.is_some_and(|o| o.has_dim(key))
    }

    /// Find a binding by name, searching enclosing blocks outward
    pub fn binding(&self, name: &str) -> Option<&BindingSet> {
        self.scope
            .bindings
            .get(name)
            .or_else(|| self.outer.and_then(|outer| outer.binding(name)))
    }

    /// Short-form root of the innermost block that declares one
    pub fn short_root(&self) -> Option<&str> {
        self.scope.short_root.as_deref()
    }
}

/// Whether an enclosing tuple already carries a dimension for this key
pub(crate) fn outer_has_dim(outer: Option<&TupleCtx<'_>>, key: &str) -> bool {
    outer.is_some_and(|ctx| ctx.has_dim(key))
}

/// Find a binding in the enclosing tuple chain
pub(crate) fn outer_binding<'a>(
    outer: Option<&'a TupleCtx<'a>>,
    name: &str,
) -> Option<&'a BindingSet> {
    outer.and_then(|ctx| ctx.binding(name))
}
