//! Tests for the read-only query subset the parser accepts.

mod common;
use common::*;

use sqlgrade_core::ast::{CurrentValue, Expr, JoinType, Literal, SetExpr, Statement, TableRef};

#[test]
fn select_with_everything() {
    let query = parse_query(
        "SELECT u.name, COUNT(*) AS n FROM users u \
         LEFT JOIN orders o ON o.user_id = u.id \
         WHERE o.amount > 10 GROUP BY u.name HAVING COUNT(*) > 1 \
         ORDER BY n DESC LIMIT 5 OFFSET 2",
    );
    let select = query.body.first_select();
    assert_eq!(select.columns.len(), 2);
    assert!(select.where_clause.is_some());
    assert_eq!(select.group_by.len(), 1);
    assert!(select.having.is_some());
    assert_eq!(query.order_by.len(), 1);
    assert!(query.limit.is_some());
    assert!(query.offset.is_some());

    let Some(TableRef::Join { join, .. }) = &select.from else {
        panic!("expected join, got {:?}", select.from);
    };
    assert_eq!(join.join_type, JoinType::Left);
}

#[test]
fn compound_query() {
    let query = parse_query("SELECT id FROM users UNION ALL SELECT user_id FROM orders ORDER BY 1");
    assert!(matches!(query.body, SetExpr::SetOperation { all: true, .. }));
    assert_eq!(query.order_by.len(), 1);
}

#[test]
fn common_table_expression() {
    let query = parse_query(
        "WITH big(uid) AS (SELECT user_id FROM orders WHERE amount > 100) \
         SELECT name FROM users WHERE id IN (SELECT uid FROM big)",
    );
    assert_eq!(query.with.len(), 1);
    assert_eq!(query.with[0].name.key, "big");
    assert_eq!(query.with[0].columns.len(), 1);
}

#[test]
fn identifiers_are_normalized() {
    let select = parse_select("SELECT \"Name\", [Email] FROM Users");
    let Expr::Column { name, .. } = &select.columns[0].expr else {
        panic!("expected column");
    };
    assert_eq!(name.value, "Name");
    assert_eq!(name.key, "name");
    let Some(TableRef::Table { name, .. }) = &select.from else {
        panic!("expected table");
    };
    assert_eq!(name.key, "users");
}

#[test]
fn schema_qualified_table() {
    let select = parse_select("SELECT * FROM shop.users");
    let Some(TableRef::Table { schema, .. }) = &select.from else {
        panic!("expected table");
    };
    assert_eq!(schema.as_ref().map(|s| s.key.as_str()), Some("shop"));
}

#[test]
fn window_function() {
    let select = parse_select(
        "SELECT name, ROW_NUMBER() OVER (PARTITION BY name ORDER BY id) FROM users",
    );
    let Expr::Function(call) = &select.columns[1].expr else {
        panic!("expected function");
    };
    assert!(call.over.is_some());
}

#[test]
fn current_date_and_time_are_values() {
    let select = parse_select(
        "SELECT current_date, CURRENT_TIME, Current_Timestamp FROM orders \
         WHERE created_at < CURRENT_DATE",
    );
    let values: Vec<_> = select.columns.iter().map(|c| &c.expr).collect();
    assert_eq!(
        values,
        vec![
            &Expr::Literal(Literal::Current(CurrentValue::Date)),
            &Expr::Literal(Literal::Current(CurrentValue::Time)),
            &Expr::Literal(Literal::Current(CurrentValue::Timestamp)),
        ]
    );
    let Some(Expr::Binary { right, .. }) = &select.where_clause else {
        panic!("expected comparison");
    };
    assert_eq!(**right, Expr::Literal(Literal::Current(CurrentValue::Date)));
}

#[test]
fn trailing_semicolon_is_fine() {
    let _ = parse("SELECT 1;;");
}

#[test]
fn disallowed_statements_are_recognised() {
    for (sql, keyword) in [
        ("INSERT INTO users VALUES (1, 'a', 'b')", "INSERT"),
        ("update users set name = 'x'", "UPDATE"),
        ("DROP TABLE users", "DROP"),
        ("PRAGMA table_info(users)", "PRAGMA"),
        ("ATTACH 'x.db' AS other", "ATTACH"),
    ] {
        match parse(sql) {
            Statement::Disallowed { keyword: found, .. } => assert_eq!(found, keyword),
            other => panic!("expected disallowed statement for {sql}, got {other:?}"),
        }
    }
}
