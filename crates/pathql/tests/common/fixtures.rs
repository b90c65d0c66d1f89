//! The issue-tracker fixture
//!
//! A small graph designed to exercise non-trivial FILTER clauses: users
//! with and without issues, issues with and without optional properties,
//! and an unrelated Status/Priority extent for cross products.

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;

use pathql::Evaluator;
use pathql::ast::QueryBlock;
use pathql::model::{Graph, GraphBuilder, ObjectType, Scalar, ScalarKind, Schema};

/// Issue-tracker schema: Priority, Status, User and Issue
pub fn tracker_schema() -> Schema {
    Schema::new()
        .with_type(ObjectType::new("Priority").with_required_property("name", ScalarKind::Str))
        .with_type(ObjectType::new("Status").with_required_property("name", ScalarKind::Str))
        .with_type(ObjectType::new("User").with_required_property("name", ScalarKind::Str))
        .with_type(
            ObjectType::new("Issue")
                .with_required_property("number", ScalarKind::Str)
                .with_required_property("name", ScalarKind::Str)
                .with_required_property("body", ScalarKind::Str)
                .with_property("time_estimate", ScalarKind::Int)
                .with_property("due_date", ScalarKind::DateTime)
                .with_required_link("owner", "User")
                .with_required_link("status", "Status")
                .with_optional_link("priority", "Priority")
                .with_multi_link("watchers", "User"),
        )
}

/// Parse a `YYYY/MM/DD` fixture date into a datetime at midnight
pub fn datetime(text: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(text, "%Y/%m/%d")
        .expect("well-formed fixture date")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
}

/// The fixture graph: two priorities, two statuses, three users and four
/// issues
///
/// Issue 1 has a time estimate but no due date; issue 2 the reverse; issue
/// 3 has both; issue 4 has neither. Victor owns nothing.
pub fn tracker_graph() -> Graph {
    let mut builder = GraphBuilder::new(tracker_schema());

    for name in ["High", "Low"] {
        let priority = builder.insert("Priority").unwrap();
        builder.set_property(priority, "name", Scalar::str(name)).unwrap();
    }

    let mut statuses = Vec::new();
    for name in ["Open", "Closed"] {
        let status = builder.insert("Status").unwrap();
        builder.set_property(status, "name", Scalar::str(name)).unwrap();
        statuses.push(status);
    }
    let (open, closed) = (statuses[0], statuses[1]);

    let mut users = Vec::new();
    for name in ["Elvis", "Yury", "Victor"] {
        let user = builder.insert("User").unwrap();
        builder.set_property(user, "name", Scalar::str(name)).unwrap();
        users.push(user);
    }
    let (elvis, yury) = (users[0], users[1]);

    let issue1 = builder.insert("Issue").unwrap();
    builder.set_property(issue1, "number", Scalar::str("1")).unwrap();
    builder.set_property(issue1, "name", Scalar::str("Implicit path existence")).unwrap();
    builder
        .set_property(
            issue1,
            "body",
            Scalar::str("Any expression involving paths also implies paths exist."),
        )
        .unwrap();
    builder.set_property(issue1, "time_estimate", Scalar::int(9001)).unwrap();
    builder.add_link(issue1, "owner", elvis).unwrap();
    builder.add_link(issue1, "status", closed).unwrap();

    let issue2 = builder.insert("Issue").unwrap();
    builder.set_property(issue2, "number", Scalar::str("2")).unwrap();
    builder.set_property(issue2, "name", Scalar::str("NOT EXISTS problem")).unwrap();
    builder
        .set_property(
            issue2,
            "body",
            Scalar::str("Implicit path existence does not apply to NOT EXISTS."),
        )
        .unwrap();
    builder
        .set_property(issue2, "due_date", Scalar::datetime(datetime("2020/01/15")))
        .unwrap();
    builder.add_link(issue2, "owner", elvis).unwrap();
    builder.add_link(issue2, "status", open).unwrap();

    let issue3 = builder.insert("Issue").unwrap();
    builder.set_property(issue3, "number", Scalar::str("3")).unwrap();
    builder.set_property(issue3, "name", Scalar::str("Query to SQL translator")).unwrap();
    builder
        .set_property(
            issue3,
            "body",
            Scalar::str("Rewrite and refactor translation to SQL."),
        )
        .unwrap();
    builder.set_property(issue3, "time_estimate", Scalar::int(9999)).unwrap();
    builder
        .set_property(issue3, "due_date", Scalar::datetime(datetime("2020/01/15")))
        .unwrap();
    builder.add_link(issue3, "owner", yury).unwrap();
    builder.add_link(issue3, "status", open).unwrap();

    let issue4 = builder.insert("Issue").unwrap();
    builder.set_property(issue4, "number", Scalar::str("4")).unwrap();
    builder.set_property(issue4, "name", Scalar::str("Translator optimization")).unwrap();
    builder
        .set_property(
            issue4,
            "body",
            Scalar::str("At some point SQL translations should be optimized."),
        )
        .unwrap();
    builder.add_link(issue4, "owner", yury).unwrap();
    builder.add_link(issue4, "status", open).unwrap();

    builder.build()
}

/// Evaluate a block and compare its JSON rendering against the expected
/// result
#[track_caller]
pub fn assert_query(graph: &Graph, block: &QueryBlock, expected: serde_json::Value) {
    let result = Evaluator::new(graph)
        .evaluate(block)
        .expect("query evaluation failed");
    assert_eq!(result.to_json(), expected);
}
