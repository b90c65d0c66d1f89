//! End-to-end FILTER semantics over the issue-tracker fixture
//!
//! Each test builds one query block and checks the rendered result. The
//! interesting cases are the ones where naive boolean evaluation or
//! SQL-style NULL propagation would give a different answer: correlated
//! conjuncts over a shared backward-link prefix, NOT EXISTS against
//! partially-populated properties, and EMPTY in comparisons.

mod common;

use common::{assert_query, datetime, tracker_graph};
use serde_json::json;

use pathql::Evaluator;
use pathql::ast::{Expr, Literal, PathExpr, QueryBlock, SelectExpr};
use pathql::eval::EvalError;

fn user() -> PathExpr {
    PathExpr::binding("User")
}

fn issue() -> PathExpr {
    PathExpr::binding("Issue")
}

fn status() -> PathExpr {
    PathExpr::binding("Status")
}

/// `<root>.<owner[IS Issue]`
fn owned_issues(root: &str) -> PathExpr {
    PathExpr::binding(root).backlink("owner", "Issue")
}

fn dt(text: &str) -> Expr {
    Expr::Literal(Literal::datetime(datetime(text)))
}

fn select_users() -> SelectExpr {
    SelectExpr::shaped(user(), ["name"])
}

// === Correlated atomic conditions ===

#[test]
fn two_conditions_bind_the_same_issue() {
    // Users owning one issue with time_estimate > 9000 AND due_date set to
    // 2020/01/15 simultaneously. Elvis owns an issue satisfying each
    // condition separately, but only Yury owns one satisfying both.
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .filter(Expr::and(
            Expr::gt(owned_issues("User").property("time_estimate"), Expr::int(9000)),
            Expr::eq(owned_issues("User").property("due_date"), dt("2020/01/15")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn two_conditions_rewritten_with_guarded_exists() {
    // Same question spelled through double negation with EXISTS guards:
    // NOT (NOT (EXISTS te AND te > 9000) OR NOT (EXISTS dd AND dd = D)).
    let graph = tracker_graph();
    let te = || owned_issues("User").property("time_estimate");
    let dd = || owned_issues("User").property("due_date");
    let block = QueryBlock::new(select_users())
        .filter(Expr::not(Expr::or(
            Expr::not(Expr::and(
                Expr::exists(te()),
                Expr::gt(te(), Expr::int(9000)),
            )),
            Expr::not(Expr::and(
                Expr::exists(dd()),
                Expr::eq(dd(), dt("2020/01/15")),
            )),
        )))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn two_conditions_rewritten_as_disjunction_of_failures() {
    // NOT (NOT EXISTS te OR NOT EXISTS dd OR te <= 9000 OR dd != D).
    let graph = tracker_graph();
    let te = || owned_issues("User").property("time_estimate");
    let dd = || owned_issues("User").property("due_date");
    let block = QueryBlock::new(select_users())
        .filter(Expr::not(Expr::or(
            Expr::or(
                Expr::not_exists(te()),
                Expr::not_exists(dd()),
            ),
            Expr::or(
                Expr::le(te(), Expr::int(9000)),
                Expr::ne(dd(), dt("2020/01/15")),
            ),
        )))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn two_conditions_with_separate_roots_and_explicit_join() {
    // A fresh alias U2 := User fans out independently; the explicit
    // equality User.<owner[IS Issue] = U2.<owner[IS Issue] joins the two
    // dimensions back together.
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .with_extent("U2", "User")
        .filter(Expr::and(
            Expr::not(Expr::or(
                Expr::not_exists(Expr::gt(
                    owned_issues("User").property("time_estimate"),
                    Expr::int(9000),
                )),
                Expr::not_exists(Expr::eq(
                    owned_issues("U2").property("due_date"),
                    dt("2020/01/15"),
                )),
            )),
            Expr::eq(owned_issues("User"), owned_issues("U2")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn correlated_conjuncts_match_explicit_join() {
    // The direct correlated form and the aliased explicitly-joined form
    // answer the same question; over length-1 fan-out their results agree.
    let graph = tracker_graph();
    let direct = QueryBlock::new(select_users())
        .filter(Expr::and(
            Expr::gt(owned_issues("User").property("time_estimate"), Expr::int(9000)),
            Expr::eq(owned_issues("User").property("due_date"), dt("2020/01/15")),
        ))
        .order_by(user().property("name"));
    let joined = QueryBlock::new(select_users())
        .with_extent("U2", "User")
        .filter(Expr::and(
            Expr::and(
                Expr::gt(owned_issues("User").property("time_estimate"), Expr::int(9000)),
                Expr::eq(owned_issues("U2").property("due_date"), dt("2020/01/15")),
            ),
            Expr::eq(owned_issues("User"), owned_issues("U2")),
        ))
        .order_by(user().property("name"));

    let evaluator = Evaluator::new(&graph);
    let direct = evaluator.evaluate(&direct).unwrap();
    let joined = evaluator.evaluate(&joined).unwrap();
    assert_eq!(direct, joined);
}

// === NOT EXISTS ===

#[test]
fn not_exists_over_a_lone_path_stays_suppressed() {
    // Users with no issue carrying a time estimate at all: only Victor,
    // who owns nothing. The path occurs once, so it does not fan out.
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .filter(Expr::not_exists(
            owned_issues("User").property("time_estimate"),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Victor" }]));
}

#[test]
fn not_exists_from_the_issue_side() {
    // Owners of at least one issue without a time estimate, starting the
    // query from Issue instead of User.
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::shaped(issue().link("owner"), ["name"]))
        .filter(Expr::not_exists(issue().property("time_estimate")))
        .order_by(issue().link("owner").property("name"));
    assert_query(&graph, &block, json!([{ "name": "Elvis" }, { "name": "Yury" }]));
}

#[test]
fn not_exists_correlates_with_a_shared_prefix() {
    // Same question from the User side: the prefix User.<owner[IS Issue]
    // appears in both conjuncts, so they range over one shared issue and
    // NOT EXISTS applies per issue, not across all of a user's issues.
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .filter(Expr::and(
            Expr::not_exists(owned_issues("User").property("time_estimate")),
            Expr::exists(owned_issues("User")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Elvis" }, { "name": "Yury" }]));
}

#[test]
fn not_exists_with_separate_roots_and_explicit_join() {
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .with_extent("U2", "User")
        .filter(Expr::and(
            Expr::and(
                Expr::exists(owned_issues("User")),
                Expr::not_exists(owned_issues("U2").property("time_estimate")),
            ),
            Expr::eq(owned_issues("User"), owned_issues("U2")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Elvis" }, { "name": "Yury" }]));
}

#[test]
fn exists_double_negation_is_involutive() {
    let graph = tracker_graph();
    let exists = QueryBlock::new(select_users())
        .filter(Expr::exists(owned_issues("User").property("time_estimate")))
        .order_by(user().property("name"));
    let doubled = QueryBlock::new(select_users())
        .filter(Expr::not(Expr::not(Expr::exists(
            owned_issues("User").property("time_estimate"),
        ))))
        .order_by(user().property("name"));

    let evaluator = Evaluator::new(&graph);
    let exists = evaluator.evaluate(&exists).unwrap();
    let doubled = evaluator.evaluate(&doubled).unwrap();
    assert_eq!(exists.to_json(), json!([{ "name": "Elvis" }, { "name": "Yury" }]));
    assert_eq!(exists, doubled);
}

// === Paired EXISTS ===

#[test]
fn paired_exists_bind_the_same_issue() {
    // Users owning one issue that has both a time estimate and a due date.
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .filter(Expr::and(
            Expr::exists(owned_issues("User").property("time_estimate")),
            Expr::exists(owned_issues("User").property("due_date")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn paired_exists_rewritten_through_de_morgan() {
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .filter(Expr::not(Expr::or(
            Expr::not_exists(owned_issues("User").property("time_estimate")),
            Expr::not_exists(owned_issues("User").property("due_date")),
        )))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn paired_exists_with_separate_roots_and_explicit_join() {
    let graph = tracker_graph();
    let block = QueryBlock::new(select_users())
        .with_extent("U2", "User")
        .filter(Expr::and(
            Expr::not(Expr::or(
                Expr::not_exists(owned_issues("User").property("time_estimate")),
                Expr::not_exists(owned_issues("U2").property("due_date")),
            )),
            Expr::eq(owned_issues("User"), owned_issues("U2")),
        ))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

#[test]
fn paired_exists_with_an_explicit_sub_query() {
    // The join condition lives inside a nested sub-select; the outer
    // prefix still correlates across the nesting boundary.
    let graph = tracker_graph();
    let inner = QueryBlock::new(SelectExpr::new(owned_issues("U2").property("due_date")))
        .filter(Expr::eq(owned_issues("User"), owned_issues("U2")));
    let block = QueryBlock::new(select_users())
        .with_extent("U2", "User")
        .filter(Expr::not(Expr::or(
            Expr::not_exists(owned_issues("User").property("time_estimate")),
            Expr::not_exists(Expr::select(inner)),
        )))
        .order_by(user().property("name"));
    assert_query(&graph, &block, json!([{ "name": "Yury" }]));
}

// === Short-form paths ===

#[test]
fn short_form_resolves_against_the_shaped_select_target() {
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::shaped(status(), ["name"]))
        .filter(Expr::eq(PathExpr::short_form().property("name"), Expr::str("Open")));
    assert_query(&graph, &block, json!([{ "name": "Open" }]));
}

#[test]
fn short_form_without_a_shape_is_ambiguous() {
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::new(status()))
        .filter(Expr::eq(PathExpr::short_form().property("name"), Expr::str("Open")));
    assert_eq!(
        Evaluator::new(&graph).evaluate(&block),
        Err(EvalError::AmbiguousShortForm)
    );
}

// === Constant and unrelated filters ===

#[test]
fn constant_true_filter_keeps_every_row() {
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::new(issue().property("number")))
        .filter(Expr::bool(true))
        .order_by(issue().property("number"));
    assert_query(&graph, &block, json!(["1", "2", "3", "4"]));
}

#[test]
fn satisfiable_unrelated_filter_is_equivalent_to_true() {
    // Status is an independent dimension; 'Closed' exists, so every issue
    // survives with the matching status tuple.
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::new(issue().property("number")))
        .filter(Expr::eq(status().property("name"), Expr::str("Closed")))
        .order_by(issue().property("number"));
    assert_query(&graph, &block, json!(["1", "2", "3", "4"]));
}

#[test]
fn constant_false_filter_drops_every_row() {
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::new(issue().property("number")))
        .filter(Expr::bool(false))
        .order_by(issue().property("number"));
    assert_query(&graph, &block, json!([]));
}

#[test]
fn unsatisfiable_unrelated_filter_is_equivalent_to_false() {
    let graph = tracker_graph();
    let block = QueryBlock::new(SelectExpr::new(issue().property("number")))
        .filter(Expr::eq(status().property("name"), Expr::str("XXX")))
        .order_by(issue().property("number"));
    assert_query(&graph, &block, json!([]));
}

// === Cross products ===

#[test]
fn unrelated_roots_build_a_cross_product() {
    let graph = tracker_graph();
    let block = QueryBlock::new(Expr::add(
        issue().property("number"),
        status().property("name"),
    ))
    .order_by(issue().property("number"))
    .order_by(status().property("name"));
    assert_query(
        &graph,
        &block,
        json!(["1Closed", "1Open", "2Closed", "2Open", "3Closed", "3Open", "4Closed", "4Open"]),
    );
}

#[test]
fn filter_restricts_one_side_of_a_cross_product() {
    let graph = tracker_graph();
    let block = QueryBlock::new(Expr::add(
        issue().property("number"),
        status().property("name"),
    ))
    .filter(Expr::eq(issue().link("owner").property("name"), Expr::str("Elvis")))
    .order_by(issue().property("number"))
    .order_by(status().property("name"));
    assert_query(&graph, &block, json!(["1Closed", "1Open", "2Closed", "2Open"]));
}

#[test]
fn filter_restricts_both_sides_of_a_cross_product() {
    let graph = tracker_graph();
    let block = QueryBlock::new(Expr::add(
        issue().property("number"),
        status().property("name"),
    ))
    .filter(Expr::and(
        Expr::eq(issue().link("owner").property("name"), Expr::str("Elvis")),
        Expr::eq(status().property("name"), Expr::str("Open")),
    ))
    .order_by(issue().property("number"))
    .order_by(status().property("name"));
    assert_query(&graph, &block, json!(["1Open", "2Open"]));
}

// === EMPTY ===

#[test]
fn empty_literal_filter_never_holds() {
    let graph = tracker_graph();
    let block =
        QueryBlock::new(SelectExpr::shaped(issue(), ["number"])).filter(Expr::empty());
    assert_query(&graph, &block, json!([]));
}

#[test]
fn comparisons_with_empty_never_hold() {
    let graph = tracker_graph();

    // A present property compared to EMPTY.
    let by_number = QueryBlock::new(SelectExpr::shaped(issue(), ["number"]))
        .filter(Expr::eq(issue().property("number"), Expr::empty()));
    assert_query(&graph, &by_number, json!([]));

    // An unset optional link compared to EMPTY.
    let by_priority = QueryBlock::new(SelectExpr::shaped(issue(), ["number"]))
        .filter(Expr::eq(issue().link("priority"), Expr::empty()));
    assert_query(&graph, &by_priority, json!([]));

    // A property behind the unset link.
    let by_priority_name = QueryBlock::new(SelectExpr::shaped(issue(), ["number"]))
        .filter(Expr::eq(issue().link("priority").property("name"), Expr::empty()));
    assert_query(&graph, &by_priority_name, json!([]));
}

// === Aggregates ===

#[test]
fn count_all_over_an_extent() {
    let graph = tracker_graph();
    let block = QueryBlock::new(Expr::count_all(issue()));
    assert_query(&graph, &block, json!([4]));
}

#[test]
fn count_all_is_unaffected_by_an_unrelated_filter() {
    let graph = tracker_graph();
    let filtered = QueryBlock::new(Expr::count_all(issue()))
        .filter(Expr::eq(status().property("name"), Expr::str("Open")));
    assert_query(&graph, &filtered, json!([4]));

    let trivially_true = QueryBlock::new(Expr::count_all(issue())).filter(Expr::bool(true));
    assert_query(&graph, &trivially_true, json!([4]));
}

#[test]
fn count_all_over_a_derived_binding() {
    let graph = tracker_graph();
    let open_issues = QueryBlock::new(SelectExpr::new(issue())).filter(Expr::eq(
        issue().link("status").property("name"),
        Expr::str("Open"),
    ));
    let block = QueryBlock::new(Expr::count_all(PathExpr::binding("I")))
        .with_derived("I", open_issues);
    assert_query(&graph, &block, json!([3]));
}

#[test]
fn unsatisfiable_filter_suppresses_an_aggregate_row() {
    let graph = tracker_graph();
    let by_false = QueryBlock::new(Expr::count_all(issue())).filter(Expr::bool(false));
    assert_query(&graph, &by_false, json!([]));

    let by_empty = QueryBlock::new(Expr::count_all(issue())).filter(Expr::empty());
    assert_query(&graph, &by_empty, json!([]));
}
