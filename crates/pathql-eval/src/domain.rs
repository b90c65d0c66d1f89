//! Iteration domain
//!
//! A query block iterates the cartesian product of its dimensions: one per
//! root binding in direct use, plus one per qualifying multi-cardinality
//! path prefix. Fan-out dimensions depend on the current element of their
//! base dimension, so the product is enumerated as a lazy odometer rather
//! than materialized: an empty factor prunes the whole branch immediately,
//! which is exactly how a missing related instance silently removes its
//! source row.

use pathql_ast::PathStep;
use pathql_model::{Graph, InstanceId};
use smallvec::SmallVec;

use crate::error::{EvalError, EvalResult};
use crate::path::ResolvedStep;
use crate::scope::TupleCtx;

/// One row of the cross product: the current element of every dimension
pub(crate) type DomainTuple = SmallVec<[InstanceId; 4]>;

/// Where a fan-out dimension starts from
#[derive(Debug, Clone)]
pub(crate) enum DimBase {
    /// An earlier dimension of the same block
    Local(usize),
    /// A dimension of an enclosing block, by correlation key
    Outer(String),
}

/// How a dimension produces its elements
#[derive(Debug, Clone)]
pub(crate) enum DimKind {
    /// A root binding's full set
    Root { set: Vec<InstanceId> },
    /// Fan-out: relative steps from the base element, ending in the
    /// multi-cardinality step that created this dimension
    FanOut {
        base: DimBase,
        steps: Vec<ResolvedStep>,
    },
}

/// One dimension of a block's iteration domain
#[derive(Debug, Clone)]
pub(crate) struct Dimension {
    /// Correlation key (canonical path text)
    pub key: String,
    pub kind: DimKind,
}

/// Lazy enumerator over the domain tuples of one block
pub(crate) struct DomainIter<'a> {
    graph: &'a Graph,
    dims: &'a [Dimension],
    outer: Option<&'a TupleCtx<'a>>,
    lists: Vec<Vec<InstanceId>>,
    cursors: Vec<usize>,
    started: bool,
    done: bool,
}

impl<'a> DomainIter<'a> {
    pub fn new(graph: &'a Graph, dims: &'a [Dimension], outer: Option<&'a TupleCtx<'a>>) -> Self {
        Self {
            graph,
            dims,
            outer,
            lists: vec![Vec::new(); dims.len()],
            cursors: vec![0; dims.len()],
            started: false,
            done: false,
        }
    }

    /// Produce the next tuple, or `None` when the domain is exhausted
    ///
    /// A domain with zero dimensions yields exactly one empty tuple.
    pub fn next_tuple(&mut self) -> EvalResult<Option<DomainTuple>> {
        if self.done {
            return Ok(None);
        }
        if self.dims.is_empty() {
            self.done = true;
            return Ok(Some(DomainTuple::new()));
        }

        let produced = if self.started {
            match self.advance(self.dims.len()) {
                Some(level) => self.settle(level + 1)?,
                None => false,
            }
        } else {
            self.started = true;
            self.settle(0)?
        };

        if produced {
            Ok(Some(self.current()))
        } else {
            self.done = true;
            Ok(None)
        }
    }

    /// Step the odometer below `from`, returning the level that moved
    fn advance(&mut self, from: usize) -> Option<usize> {
        let mut level = from;
        while level > 0 {
            level -= 1;
            self.cursors[level] += 1;
            if self.cursors[level] < self.lists[level].len() {
                return Some(level);
            }
        }
        None
    }

    /// Fill candidate lists from `level` down, backtracking over empty
    /// factors; false when the whole domain is exhausted
    fn settle(&mut self, mut level: usize) -> EvalResult<bool> {
        while level < self.dims.len() {
            self.lists[level] = self.elements_for(level)?;
            self.cursors[level] = 0;
            if !self.lists[level].is_empty() {
                level += 1;
                continue;
            }
            match self.advance(level) {
                Some(moved) => level = moved + 1,
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    fn current(&self) -> DomainTuple {
        (0..self.dims.len())
            .map(|i| self.lists[i][self.cursors[i]])
            .collect()
    }

    /// Candidate elements of one dimension given the current prefix
    fn elements_for(&self, level: usize) -> EvalResult<Vec<InstanceId>> {
        match &self.dims[level].kind {
            DimKind::Root { set } => Ok(set.clone()),
            DimKind::FanOut { base, steps } => {
                let start = match base {
                    DimBase::Local(position) => self.lists[*position][self.cursors[*position]],
                    DimBase::Outer(key) => self
                        .outer
                        .and_then(|ctx| ctx.dim_element(key))
                        .ok_or_else(|| {
                            EvalError::internal(format!("missing outer dimension '{key}'"))
                        })?,
                };
                self.expand(start, steps)
            }
        }
    }

    /// Walk relative steps from a base element: single links up to the final
    /// fan-out step
    fn expand(&self, start: InstanceId, steps: &[ResolvedStep]) -> EvalResult<Vec<InstanceId>> {
        let mut current = start;
        let (last, singles) = steps
            .split_last()
            .ok_or_else(|| EvalError::internal("fan-out dimension with no steps"))?;

        for step in singles {
            match &step.step {
                PathStep::Link(name) => {
                    let targets = self.graph.get_link(current, name)?;
                    match targets.first() {
                        Some(&target) => current = target,
                        None => return Ok(Vec::new()),
                    }
                }
                other => {
                    return Err(EvalError::internal(format!(
                        "unexpected interior step {other:?} in fan-out"
                    )));
                }
            }
        }

        match &last.step {
            PathStep::Link(name) => Ok(self.graph.get_link(current, name)?.to_vec()),
            PathStep::Backlink { link, target } => {
                Ok(self.graph.get_backlink(current, link, target)?)
            }
            PathStep::Property(name) => Err(EvalError::internal(format!(
                "fan-out dimension ends in property '{name}'"
            ))),
        }
    }
}
