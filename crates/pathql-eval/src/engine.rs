//! The semantics engine
//!
//! Evaluates one query block at a time against an immutable graph snapshot:
//!
//! 1. WITH bindings are materialized (extents and derived sub-selects).
//! 2. A discovery walk collects path occurrences and plans the block's
//!    iteration dimensions (`correlate`).
//! 3. The domain is enumerated lazily (`domain`); for every tuple the
//!    FILTER predicate is evaluated under three-valued logic and only an
//!    exact TRUE keeps the tuple.
//! 4. The SELECT target is projected per surviving tuple; a target that
//!    evaluates to EMPTY contributes no row. Object-valued rows
//!    deduplicate by instance identity (first occurrence wins), which is
//!    what turns per-tuple fan-out into existential semantics at the
//!    result level. ORDER BY then applies a stable multi-key sort; EMPTY
//!    keys sort first ascending.
//!
//! EXISTS arguments, aggregate arguments and nested SELECTs are evaluated
//! as sub-blocks against the current tuple: prefixes already carried by an
//! enclosing dimension resolve to that dimension's current element, the
//! rest expands locally, and the argument's non-EMPTY values are collected
//! into a materialized set.

use std::cmp::Ordering;
use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, trace};

use pathql_ast::{
    BindingSource, CompareOp, Expr, Literal, OrderDirection, OrderKey, PathExpr, PathRoot,
    PathStep, QueryBlock, SelectExpr, WithBinding,
};
use pathql_model::{Graph, Scalar, Value};

use crate::correlate::{discover, plan_dimensions};
use crate::domain::DomainIter;
use crate::error::{EvalError, EvalResult};
use crate::options::EvalOptions;
use crate::path::{ResolvedPath, StepTarget, resolve_path};
use crate::result::{ResultRow, ResultSet};
use crate::scope::{BindingSet, BlockScope, TupleCtx, outer_binding};
use crate::truth::Truth;

/// The PathQL evaluator
///
/// Stateless between queries; each call to [`Evaluator::evaluate`] is a
/// pure, deterministic function of the query block and the graph snapshot.
pub struct Evaluator<'g> {
    graph: &'g Graph,
    options: EvalOptions,
}

/// Per-evaluation counters backing the configured limits
#[derive(Debug, Default)]
struct EvalState {
    depth: usize,
    tuples: usize,
}

impl EvalState {
    fn enter(&mut self, options: &EvalOptions) -> EvalResult<()> {
        self.depth += 1;
        if self.depth > options.max_depth {
            return Err(EvalError::RecursionLimit);
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    fn count_tuple(&mut self, options: &EvalOptions) -> EvalResult<()> {
        self.tuples += 1;
        if let Some(limit) = options.max_tuples {
            if self.tuples > limit {
                return Err(EvalError::DomainBudgetExceeded { limit });
            }
        }
        Ok(())
    }
}

/// Evaluated output of one block: ordered values plus the static object
/// type of the SELECT target, when it has one
struct BlockOutput {
    values: Vec<Value>,
    object_type: Option<String>,
}

impl<'g> Evaluator<'g> {
    /// Create an evaluator over a graph snapshot with default options
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            options: EvalOptions::default(),
        }
    }

    /// Create an evaluator with explicit options
    pub fn with_options(graph: &'g Graph, options: EvalOptions) -> Self {
        Self { graph, options }
    }

    /// Evaluate a query block into an ordered result set
    pub fn evaluate(&self, block: &QueryBlock) -> EvalResult<ResultSet> {
        let mut state = EvalState::default();
        let output = self.eval_block(block, None, &mut state)?;

        let mut rows = Vec::with_capacity(output.values.len());
        for value in output.values {
            let row = match (&block.select.shape, value) {
                (Some(fields), Value::Object(id)) => {
                    let mut record = IndexMap::new();
                    for field in fields {
                        record.insert(field.clone(), self.graph.get_property(id, field)?);
                    }
                    ResultRow::Record(record)
                }
                (None, Value::Object(id)) => ResultRow::Object(id),
                (_, Value::Scalar(scalar)) => ResultRow::Scalar(scalar),
                (_, Value::Empty) => continue,
            };
            rows.push(row);
        }
        Ok(ResultSet::new(rows))
    }

    fn eval_block(
        &self,
        block: &QueryBlock,
        outer: Option<&TupleCtx<'_>>,
        state: &mut EvalState,
    ) -> EvalResult<BlockOutput> {
        self.run_query(
            &block.with,
            &block.select.expr,
            short_root_of(&block.select),
            block.select.shape.is_some(),
            block.filter.as_ref(),
            &block.order_by,
            outer,
            state,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn run_query(
        &self,
        with: &[WithBinding],
        select_expr: &Expr,
        short_root: Option<String>,
        has_shape: bool,
        filter: Option<&Expr>,
        order_by: &[OrderKey],
        outer: Option<&TupleCtx<'_>>,
        state: &mut EvalState,
    ) -> EvalResult<BlockOutput> {
        state.enter(&self.options)?;
        let result = self.run_query_inner(
            with, select_expr, short_root, has_shape, filter, order_by, outer, state,
        );
        state.exit();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn run_query_inner(
        &self,
        with: &[WithBinding],
        select_expr: &Expr,
        short_root: Option<String>,
        has_shape: bool,
        filter: Option<&Expr>,
        order_by: &[OrderKey],
        outer: Option<&TupleCtx<'_>>,
        state: &mut EvalState,
    ) -> EvalResult<BlockOutput> {
        let mut scope = BlockScope::new();
        scope.short_root = short_root;

        for binding in with {
            let set = match &binding.source {
                BindingSource::Extent(type_name) => BindingSet {
                    type_name: type_name.clone(),
                    ids: self.graph.extent(type_name)?.to_vec(),
                },
                BindingSource::Derived(block) => {
                    let output = self.eval_block(block, outer, state)?;
                    let type_name = output.object_type.ok_or_else(|| {
                        EvalError::type_mismatch("object set binding", "scalar set")
                    })?;
                    let ids = output.values.iter().filter_map(Value::as_object).collect();
                    BindingSet { type_name, ids }
                }
            };
            scope.bindings.insert(binding.name.clone(), set);
        }

        let occurrences = discover(select_expr, filter, order_by, &mut scope, outer, self.graph)?;
        plan_dimensions(&occurrences, &mut scope, outer)?;
        debug!(
            "block dimensions: [{}]",
            scope
                .dims
                .iter()
                .map(|d| d.key.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let object_type = self.select_object_type(select_expr, &scope, outer)?;
        if has_shape && object_type.is_none() {
            return Err(EvalError::type_mismatch(
                "object-valued SELECT target",
                "scalar expression",
            ));
        }

        let mut rows: Vec<(Value, Vec<Value>)> = Vec::new();
        let mut iter = DomainIter::new(self.graph, &scope.dims, outer);
        while let Some(elements) = iter.next_tuple()? {
            state.count_tuple(&self.options)?;
            let ctx = TupleCtx {
                scope: &scope,
                elements: &elements,
                outer,
            };
            if let Some(predicate) = filter {
                let verdict = self.truth_of(self.eval_expr(predicate, &ctx, state)?)?;
                trace!("tuple {elements:?}: filter {verdict:?}");
                if !verdict.is_true() {
                    continue;
                }
            }
            let value = self.eval_expr(select_expr, &ctx, state)?;
            if value.is_empty() {
                continue;
            }
            let mut keys = Vec::with_capacity(order_by.len());
            for key in order_by {
                keys.push(self.eval_expr(&key.expr, &ctx, state)?);
            }
            rows.push((value, keys));
        }

        // Object rows collapse to one per identity, first occurrence wins.
        let mut seen = HashSet::new();
        rows.retain(|(value, _)| match value {
            Value::Object(id) => seen.insert(*id),
            _ => true,
        });

        sort_rows(&mut rows, order_by)?;

        Ok(BlockOutput {
            values: rows.into_iter().map(|(value, _)| value).collect(),
            object_type,
        })
    }

    /// Static object type of a SELECT target, `None` for scalar targets
    fn select_object_type(
        &self,
        select_expr: &Expr,
        scope: &BlockScope,
        outer: Option<&TupleCtx<'_>>,
    ) -> EvalResult<Option<String>> {
        let Expr::Path(path) = select_expr else {
            return Ok(None);
        };
        let name = match &path.root {
            PathRoot::Binding(name) => name.clone(),
            PathRoot::ShortForm => match &scope.short_root {
                Some(root) => root.clone(),
                None => return Err(EvalError::AmbiguousShortForm),
            },
        };
        let type_name = scope
            .bindings
            .get(&name)
            .map(|set| set.type_name.clone())
            .or_else(|| outer_binding(outer, &name).map(|set| set.type_name.clone()))
            .ok_or_else(|| EvalError::unknown_binding(&name))?;
        let resolved = resolve_path(path, &name, &type_name, self.graph.schema())?;
        Ok(match resolved.target() {
            StepTarget::Object(target) => Some(target),
            StepTarget::Scalar(_) => None,
        })
    }

    /// Evaluate an expression to a single value under the current tuple
    fn eval_expr(
        &self,
        expr: &Expr,
        ctx: &TupleCtx<'_>,
        state: &mut EvalState,
    ) -> EvalResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),
            Expr::Path(path) => self.eval_path(path, ctx),
            Expr::Compare(compare) => {
                let lhs = self.eval_expr(&compare.lhs, ctx, state)?;
                let rhs = self.eval_expr(&compare.rhs, ctx, state)?;
                compare_values(compare.op, &lhs, &rhs)
            }
            Expr::Add(binary) => {
                let lhs = self.eval_expr(&binary.lhs, ctx, state)?;
                let rhs = self.eval_expr(&binary.rhs, ctx, state)?;
                add_values(&lhs, &rhs)
            }
            Expr::And(binary) => {
                let lhs = self.truth_of(self.eval_expr(&binary.lhs, ctx, state)?)?;
                let rhs = self.truth_of(self.eval_expr(&binary.rhs, ctx, state)?)?;
                Ok(truth_value(lhs.and(rhs)))
            }
            Expr::Or(binary) => {
                let lhs = self.truth_of(self.eval_expr(&binary.lhs, ctx, state)?)?;
                let rhs = self.truth_of(self.eval_expr(&binary.rhs, ctx, state)?)?;
                Ok(truth_value(lhs.or(rhs)))
            }
            Expr::Not(unary) => {
                let operand = self.truth_of(self.eval_expr(&unary.operand, ctx, state)?)?;
                Ok(truth_value(operand.not()))
            }
            Expr::Exists(unary) => {
                let set = self.materialize(&unary.operand, ctx, state)?;
                // Set emptiness is all EXISTS inspects; never EMPTY.
                Ok(Value::bool(!set.is_empty()))
            }
            Expr::Count(count) => {
                if !count.all {
                    return Err(EvalError::unsupported("count without ALL"));
                }
                let set = self.materialize(&count.arg, ctx, state)?;
                Ok(Value::int(set.len() as i64))
            }
            Expr::Select(block) => {
                // Single-value coercion of a sub-query result.
                let mut values = self.eval_block(block, Some(ctx), state)?.values;
                match values.len() {
                    0 => Ok(Value::Empty),
                    1 => Ok(values.swap_remove(0)),
                    count => Err(EvalError::CardinalityViolation { count }),
                }
            }
        }
    }

    /// Evaluate a path under the current tuple
    ///
    /// The longest prefix carried by a dimension (in this block or an
    /// enclosing one) supplies the start element; the remaining steps are
    /// single-valued, and a missing optional link or property yields EMPTY.
    fn eval_path(&self, path: &PathExpr, ctx: &TupleCtx<'_>) -> EvalResult<Value> {
        let resolved = self.resolve_for_eval(path, ctx)?;

        let mut start = None;
        let mut consumed = 0;
        for idx in (0..=resolved.steps.len()).rev() {
            let key = if idx == 0 {
                resolved.root.as_str()
            } else {
                resolved.steps[idx - 1].key.as_str()
            };
            if let Some(element) = ctx.dim_element(key) {
                start = Some(element);
                consumed = idx;
                break;
            }
        }
        let Some(mut current) = start else {
            return Err(EvalError::internal(format!(
                "path '{path}' is not anchored to any dimension"
            )));
        };

        for step in &resolved.steps[consumed..] {
            match &step.step {
                PathStep::Property(name) => return Ok(self.graph.get_property(current, name)?),
                PathStep::Link(name) if !step.multi => {
                    match self.graph.get_link(current, name)?.first() {
                        Some(&target) => current = target,
                        None => return Ok(Value::Empty),
                    }
                }
                _ => {
                    return Err(EvalError::internal(format!(
                        "unexpanded fan-out step in path '{path}'"
                    )));
                }
            }
        }
        Ok(Value::Object(current))
    }

    fn resolve_for_eval(&self, path: &PathExpr, ctx: &TupleCtx<'_>) -> EvalResult<ResolvedPath> {
        let name = match &path.root {
            PathRoot::Binding(name) => name.clone(),
            PathRoot::ShortForm => ctx
                .short_root()
                .ok_or(EvalError::AmbiguousShortForm)?
                .to_string(),
        };
        let set = ctx
            .binding(&name)
            .ok_or_else(|| EvalError::unknown_binding(&name))?;
        resolve_path(path, &name, &set.type_name, self.graph.schema())
    }

    /// Materialize a suppressed-expansion argument into its full value set
    /// for the current tuple
    fn materialize(
        &self,
        expr: &Expr,
        ctx: &TupleCtx<'_>,
        state: &mut EvalState,
    ) -> EvalResult<Vec<Value>> {
        if let Expr::Select(block) = expr {
            return Ok(self.eval_block(block, Some(ctx), state)?.values);
        }
        let output = self.run_query(&[], expr, None, false, None, &[], Some(ctx), state)?;
        Ok(output.values)
    }

    fn truth_of(&self, value: Value) -> EvalResult<Truth> {
        match value {
            Value::Empty => Ok(Truth::Empty),
            Value::Scalar(Scalar::Bool(b)) => Ok(Truth::from(b)),
            other => Err(EvalError::type_mismatch("bool", format!("{other}"))),
        }
    }
}

fn short_root_of(select: &SelectExpr) -> Option<String> {
    select.shape.as_ref()?;
    match &select.expr {
        Expr::Path(path) if path.steps.is_empty() => match &path.root {
            PathRoot::Binding(name) => Some(name.clone()),
            PathRoot::ShortForm => None,
        },
        _ => None,
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Empty => Value::Empty,
        Literal::Bool(b) => Value::bool(*b),
        Literal::Int(i) => Value::int(*i),
        Literal::Str(s) => Value::str(s.clone()),
        Literal::DateTime(dt) => Value::datetime(*dt),
    }
}

fn truth_value(truth: Truth) -> Value {
    match truth {
        Truth::True => Value::bool(true),
        Truth::False => Value::bool(false),
        Truth::Empty => Value::Empty,
    }
}

/// Comparison under three-valued logic: EMPTY on either side never resolves
/// to TRUE or FALSE
fn compare_values(op: CompareOp, lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Empty, _) | (_, Value::Empty) => Ok(Value::Empty),
        (Value::Object(a), Value::Object(b)) => match op {
            CompareOp::Eq => Ok(Value::bool(a == b)),
            CompareOp::Ne => Ok(Value::bool(a != b)),
            _ => Err(EvalError::type_mismatch("comparable scalars", "objects")),
        },
        (Value::Scalar(a), Value::Scalar(b)) => {
            let Some(ordering) = a.compare(b) else {
                return Err(EvalError::type_mismatch(
                    a.kind().to_string(),
                    b.kind().to_string(),
                ));
            };
            let result = match op {
                CompareOp::Eq => ordering == Ordering::Equal,
                CompareOp::Ne => ordering != Ordering::Equal,
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                CompareOp::Ge => ordering != Ordering::Less,
            };
            Ok(Value::bool(result))
        }
        _ => Err(EvalError::type_mismatch(
            "operands of one kind",
            "object and scalar",
        )),
    }
}

fn add_values(lhs: &Value, rhs: &Value) -> EvalResult<Value> {
    match (lhs, rhs) {
        (Value::Empty, _) | (_, Value::Empty) => Ok(Value::Empty),
        (Value::Scalar(Scalar::Int(a)), Value::Scalar(Scalar::Int(b))) => Ok(Value::int(a + b)),
        (Value::Scalar(Scalar::Str(a)), Value::Scalar(Scalar::Str(b))) => {
            Ok(Value::str(format!("{a}{b}")))
        }
        _ => Err(EvalError::type_mismatch(
            "int + int or str + str",
            format!("{lhs} + {rhs}"),
        )),
    }
}

/// Stable multi-key sort: keys applied least-significant first; EMPTY sorts
/// before any value ascending
fn sort_rows(rows: &mut [(Value, Vec<Value>)], order_by: &[OrderKey]) -> EvalResult<()> {
    for column in 0..order_by.len() {
        let mut kind = None;
        for (_, keys) in rows.iter() {
            match &keys[column] {
                Value::Empty => {}
                Value::Scalar(scalar) => match kind {
                    None => kind = Some(scalar.kind()),
                    Some(k) if k == scalar.kind() => {}
                    Some(k) => {
                        return Err(EvalError::type_mismatch(
                            k.to_string(),
                            scalar.kind().to_string(),
                        ));
                    }
                },
                Value::Object(_) => {
                    return Err(EvalError::type_mismatch("orderable scalar", "object"));
                }
            }
        }
    }
    for (column, key) in order_by.iter().enumerate().rev() {
        rows.sort_by(|(_, a), (_, b)| compare_keys(&a[column], &b[column], key.direction));
    }
    Ok(())
}

fn compare_keys(a: &Value, b: &Value, direction: OrderDirection) -> Ordering {
    let ordering = match (a, b) {
        (Value::Empty, Value::Empty) => Ordering::Equal,
        (Value::Empty, _) => Ordering::Less,
        (_, Value::Empty) => Ordering::Greater,
        (Value::Scalar(x), Value::Scalar(y)) => x.compare(y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    };
    match direction {
        OrderDirection::Asc => ordering,
        OrderDirection::Desc => ordering.reverse(),
    }
}
