//! Correlation tracking and dimension planning
//!
//! A single explicit walk over a block's expressions produces the list of
//! path occurrences, classified as *direct* (SELECT target, FILTER, ORDER
//! BY) or *suppressed* (inside EXISTS, an aggregate argument, or a nested
//! sub-query). Planning then turns occurrences into the block's dimension
//! list:
//!
//! - a root binding becomes a dimension when it has at least one direct
//!   occurrence;
//! - a multi-cardinality prefix becomes a dimension when it occurs in
//!   direct context, or when it is shared by two or more path occurrences
//!   anywhere in the block — a prefix referenced from several EXISTS
//!   arguments still denotes one related instance;
//! - prefixes already carried by an enclosing block resolve to that block's
//!   current element instead of fanning out again.
//!
//! Everything else about a suppressed path stays un-expanded and is
//! materialized later by the evaluator.

use std::collections::{HashMap, HashSet};

use pathql_ast::{Expr, OrderKey, PathExpr, PathRoot, QueryBlock};
use pathql_model::Graph;

use crate::domain::{DimBase, DimKind, Dimension};
use crate::error::{EvalError, EvalResult};
use crate::path::{ResolvedPath, ResolvedStep, resolve_path};
use crate::scope::{BindingSet, BlockScope, TupleCtx, outer_binding, outer_has_dim};

/// One syntactic occurrence of a path in a block
#[derive(Debug)]
pub(crate) struct Occurrence {
    pub path: ResolvedPath,
    pub direct: bool,
}

/// Collect every path occurrence of a block, registering implicit
/// type-name roots in the scope as they are first seen
pub(crate) fn discover(
    select: &Expr,
    filter: Option<&Expr>,
    order_by: &[OrderKey],
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
    graph: &Graph,
) -> EvalResult<Vec<Occurrence>> {
    let mut occurrences = Vec::new();
    let mut nested = Vec::new();

    collect(select, true, &mut occurrences, &mut nested, scope, outer, graph)?;
    if let Some(filter) = filter {
        collect(filter, true, &mut occurrences, &mut nested, scope, outer, graph)?;
    }
    for key in order_by {
        collect(&key.expr, true, &mut occurrences, &mut nested, scope, outer, graph)?;
    }

    // Paths inside nested sub-queries that refer to this block's bindings
    // still count as occurrences here: a shared prefix must denote the same
    // related instance across the nesting boundary.
    for block in nested {
        let mut bound = Vec::new();
        collect_free(block, &mut bound, &mut occurrences, scope, outer, graph)?;
    }

    Ok(occurrences)
}

fn collect<'b>(
    expr: &'b Expr,
    direct: bool,
    occurrences: &mut Vec<Occurrence>,
    nested: &mut Vec<&'b QueryBlock>,
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
    graph: &Graph,
) -> EvalResult<()> {
    match expr {
        Expr::Literal(_) => {}
        Expr::Path(path) => {
            let (root, root_type) = resolve_root(path, scope, outer, graph)?;
            let resolved = resolve_path(path, &root, &root_type, graph.schema())?;
            occurrences.push(Occurrence {
                path: resolved,
                direct,
            });
        }
        Expr::Compare(compare) => {
            collect(&compare.lhs, direct, occurrences, nested, scope, outer, graph)?;
            collect(&compare.rhs, direct, occurrences, nested, scope, outer, graph)?;
        }
        Expr::Add(binary) | Expr::And(binary) | Expr::Or(binary) => {
            collect(&binary.lhs, direct, occurrences, nested, scope, outer, graph)?;
            collect(&binary.rhs, direct, occurrences, nested, scope, outer, graph)?;
        }
        Expr::Not(unary) => {
            collect(&unary.operand, direct, occurrences, nested, scope, outer, graph)?;
        }
        Expr::Exists(unary) => {
            collect(&unary.operand, false, occurrences, nested, scope, outer, graph)?;
        }
        Expr::Count(count) => {
            collect(&count.arg, false, occurrences, nested, scope, outer, graph)?;
        }
        Expr::Select(block) => nested.push(block),
    }
    Ok(())
}

/// Resolve a path root to its binding name and type
///
/// Resolution order: this block's bindings, then enclosing blocks, then the
/// schema's type names (which registers a fresh implicit root binding).
pub(crate) fn resolve_root(
    path: &PathExpr,
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
    graph: &Graph,
) -> EvalResult<(String, String)> {
    let name = match &path.root {
        PathRoot::Binding(name) => name.clone(),
        PathRoot::ShortForm => scope
            .short_root
            .clone()
            .ok_or(EvalError::AmbiguousShortForm)?,
    };
    if let Some(set) = scope.bindings.get(&name) {
        let type_name = set.type_name.clone();
        return Ok((name, type_name));
    }
    if let Some(set) = outer_binding(outer, &name) {
        let type_name = set.type_name.clone();
        return Ok((name, type_name));
    }
    if graph.schema().has_type(&name) {
        let set = BindingSet {
            type_name: name.clone(),
            ids: graph.extent(&name)?.to_vec(),
        };
        scope.bindings.insert(name.clone(), set);
        let type_name = name.clone();
        return Ok((name, type_name));
    }
    Err(EvalError::unknown_binding(name))
}

/// Collect occurrences inside a nested sub-query whose roots refer to the
/// enclosing scope chain; roots bound by the sub-query itself are skipped
fn collect_free(
    block: &QueryBlock,
    bound: &mut Vec<String>,
    occurrences: &mut Vec<Occurrence>,
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
    graph: &Graph,
) -> EvalResult<()> {
    let added = block.with.len();
    for with in &block.with {
        bound.push(with.name.clone());
    }

    collect_free_expr(&block.select.expr, bound, occurrences, scope, outer, graph)?;
    if let Some(filter) = &block.filter {
        collect_free_expr(filter, bound, occurrences, scope, outer, graph)?;
    }
    for key in &block.order_by {
        collect_free_expr(&key.expr, bound, occurrences, scope, outer, graph)?;
    }

    bound.truncate(bound.len() - added);
    Ok(())
}

fn collect_free_expr(
    expr: &Expr,
    bound: &mut Vec<String>,
    occurrences: &mut Vec<Occurrence>,
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
    graph: &Graph,
) -> EvalResult<()> {
    match expr {
        Expr::Literal(_) => {}
        Expr::Path(path) => {
            // Short forms belong to the sub-query's own SELECT target.
            if let PathRoot::Binding(name) = &path.root {
                if !bound.iter().any(|b| b == name) {
                    let known = scope.bindings.get(name).map(|set| set.type_name.clone());
                    let known =
                        known.or_else(|| outer_binding(outer, name).map(|s| s.type_name.clone()));
                    if let Some(root_type) = known {
                        let resolved = resolve_path(path, name, &root_type, graph.schema())?;
                        occurrences.push(Occurrence {
                            path: resolved,
                            direct: false,
                        });
                    }
                }
            }
        }
        Expr::Compare(compare) => {
            collect_free_expr(&compare.lhs, bound, occurrences, scope, outer, graph)?;
            collect_free_expr(&compare.rhs, bound, occurrences, scope, outer, graph)?;
        }
        Expr::Add(binary) | Expr::And(binary) | Expr::Or(binary) => {
            collect_free_expr(&binary.lhs, bound, occurrences, scope, outer, graph)?;
            collect_free_expr(&binary.rhs, bound, occurrences, scope, outer, graph)?;
        }
        Expr::Not(unary) | Expr::Exists(unary) => {
            collect_free_expr(&unary.operand, bound, occurrences, scope, outer, graph)?;
        }
        Expr::Count(count) => {
            collect_free_expr(&count.arg, bound, occurrences, scope, outer, graph)?;
        }
        Expr::Select(inner) => {
            collect_free(inner, bound, occurrences, scope, outer, graph)?;
        }
    }
    Ok(())
}

/// Turn the occurrence list into the block's ordered dimension list
pub(crate) fn plan_dimensions(
    occurrences: &[Occurrence],
    scope: &mut BlockScope,
    outer: Option<&TupleCtx<'_>>,
) -> EvalResult<()> {
    let mut root_direct: HashSet<&str> = HashSet::new();
    let mut prefix_direct: HashSet<&str> = HashSet::new();
    let mut prefix_count: HashMap<&str, usize> = HashMap::new();

    for occ in occurrences {
        if occ.direct {
            root_direct.insert(&occ.path.root);
        }
        for step in occ.path.steps.iter().filter(|s| s.multi) {
            *prefix_count.entry(&step.key).or_insert(0) += 1;
            if occ.direct {
                prefix_direct.insert(&step.key);
            }
        }
    }

    for occ in occurrences {
        let root = &occ.path.root;
        let root_is_local = scope.bindings.contains_key(root);
        let root_is_outer_dim = !root_is_local && outer_has_dim(outer, root);

        if !root_is_outer_dim
            && !scope.dim_index.contains_key(root)
            && root_direct.contains(root.as_str())
        {
            let set = scope
                .bindings
                .get(root)
                .or_else(|| outer_binding(outer, root))
                .ok_or_else(|| EvalError::internal(format!("unresolved root '{root}'")))?
                .ids
                .clone();
            push_dim(scope, root.clone(), DimKind::Root { set });
        }

        let mut base = if let Some(&position) = scope.dim_index.get(root) {
            Some(DimBase::Local(position))
        } else if root_is_outer_dim {
            Some(DimBase::Outer(root.clone()))
        } else {
            None
        };

        let mut relative: Vec<ResolvedStep> = Vec::new();
        for step in &occ.path.steps {
            relative.push(step.clone());
            if !step.multi {
                continue;
            }
            if let Some(&position) = scope.dim_index.get(&step.key) {
                base = Some(DimBase::Local(position));
                relative.clear();
                continue;
            }
            if outer_has_dim(outer, &step.key) {
                base = Some(DimBase::Outer(step.key.clone()));
                relative.clear();
                continue;
            }
            let qualifies = prefix_direct.contains(step.key.as_str())
                || prefix_count.get(step.key.as_str()).copied().unwrap_or(0) >= 2;
            if qualifies {
                // A fan-out needs an anchored base; a root that never
                // appears in direct context cannot be walked, so the whole
                // path stays suppressed.
                if let Some(anchored) = base.clone() {
                    let position = push_dim(
                        scope,
                        step.key.clone(),
                        DimKind::FanOut {
                            base: anchored,
                            steps: std::mem::take(&mut relative),
                        },
                    );
                    base = Some(DimBase::Local(position));
                }
            }
        }
    }

    Ok(())
}

fn push_dim(scope: &mut BlockScope, key: String, kind: DimKind) -> usize {
    let position = scope.dims.len();
    scope.dims.push(Dimension {
        key: key.clone(),
        kind,
    });
    scope.dim_index.insert(key, position);
    position
}
