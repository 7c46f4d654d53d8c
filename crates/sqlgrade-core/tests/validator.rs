//! Tests for table and column reference validation.

mod common;
use common::*;

use sqlgrade_core::{validate_sql, Schema, ValidationIssue};

#[test]
fn valid_queries_have_no_issues() {
    for sql in [
        "SELECT * FROM users",
        "SELECT id, name FROM users WHERE email LIKE '%@x.org'",
        "SELECT u.name, o.amount FROM users u JOIN orders o ON o.user_id = u.id",
        "SELECT name, COUNT(*) AS n FROM users GROUP BY name HAVING n > 1 ORDER BY n",
        "SELECT name FROM users WHERE id IN (SELECT user_id FROM orders)",
        "SELECT name FROM users u WHERE EXISTS (SELECT 1 FROM orders WHERE user_id = u.id)",
        "SELECT shop.users.name FROM shop.users",
        "SELECT rowid, name FROM users",
        "SELECT 1 + 2",
        "SELECT id FROM users UNION SELECT id FROM products ORDER BY id",
    ] {
        assert_valid(sql);
    }
}

#[test]
fn missing_table_is_reported_once() {
    let (tables, columns) = issues("SELECT id, name FROM usrs WHERE usrs.id = 1");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].table, "usrs");
    assert_eq!(tables[0].reason, "table not found in schema");
    assert_eq!(tables[0].candidates, vec!["users", "orders", "products"]);
    // Columns of an unresolved table are not second-guessed.
    assert!(columns.is_empty(), "{columns:?}");
}

#[test]
fn repeated_missing_table_is_deduplicated() {
    let (tables, _) =
        issues("SELECT * FROM usrs WHERE id IN (SELECT id FROM USRS) AND id IN (SELECT id FROM usrs)");
    assert_eq!(tables.len(), 1);
}

#[test]
fn missing_column() {
    let (tables, columns) = issues("SELECT id, nme FROM users");
    assert!(tables.is_empty());
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "nme");
    assert_eq!(columns[0].reason, "not found in any table in scope");
    assert_eq!(columns[0].candidates, vec!["id", "name", "email"]);
}

#[test]
fn missing_qualified_column() {
    let (_, columns) = issues("SELECT u.nme FROM users u");
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "u.nme");
    assert_eq!(columns[0].reason, "not found in table 'users'");
}

#[test]
fn unknown_qualifier() {
    let (_, columns) = issues("SELECT x.id FROM users u");
    assert_eq!(columns.len(), 1);
    assert_eq!(
        columns[0].reason,
        "not found: table or alias 'x' is not in scope"
    );
    assert_eq!(columns[0].candidates, vec!["u"]);
}

#[test]
fn ambiguous_column_across_join() {
    let (_, columns) = issues("SELECT id FROM users JOIN orders ON users.id = orders.user_id");
    assert_eq!(columns.len(), 1);
    assert!(columns[0].reason.starts_with("ambiguous across joined tables"));
    assert_eq!(columns[0].candidates, vec!["users", "orders"]);
}

#[test]
fn using_column_is_not_ambiguous() {
    assert_valid("SELECT id FROM users JOIN products USING (id)");
    assert_valid("SELECT id FROM users JOIN products USING (id) JOIN orders USING (id)");
}

#[test]
fn using_only_merges_the_tables_it_joins() {
    let (_, columns) = issues(
        "SELECT id FROM users JOIN products USING (id) \
         JOIN orders ON orders.user_id = users.id",
    );
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "id");
    assert_eq!(columns[0].candidates, vec!["users", "orders"]);

    let (_, columns) = issues("SELECT name FROM users JOIN products USING (id)");
    assert_eq!(columns.len(), 1);
    assert!(columns[0].reason.starts_with("ambiguous across joined tables"));
}

#[test]
fn using_column_must_exist() {
    let (_, columns) = issues("SELECT 1 FROM users JOIN orders USING (price)");
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "price");
    assert_eq!(columns[0].reason, "not found in any table in scope");
}

#[test]
fn builtin_date_values_are_not_columns() {
    assert_valid("SELECT id FROM orders WHERE created_at <= CURRENT_DATE");
    assert_valid(
        "SELECT CURRENT_TIME, current_timestamp AS now FROM users ORDER BY now",
    );
    assert_valid("SELECT date(CURRENT_TIMESTAMP, '-7 days') FROM orders");
}

#[test]
fn select_alias_only_visible_after_select_list() {
    assert_valid("SELECT amount * 2 AS doubled FROM orders ORDER BY doubled");
    let (_, columns) = issues("SELECT amount * 2 AS doubled, doubled + 1 FROM orders");
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].column, "doubled");
}

#[test]
fn identifier_case_and_quoting() {
    assert_valid("SELECT \"NAME\", [Email] FROM USERS");
    assert_valid("SELECT `id` FROM `Orders`");
}

#[test]
fn cte_columns_resolve() {
    assert_valid(
        "WITH totals AS (SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id) \
         SELECT u.name, t.total FROM users u JOIN totals t ON t.user_id = u.id",
    );
    let (tables, columns) = issues(
        "WITH totals AS (SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id) \
         SELECT t.amount FROM totals t",
    );
    assert!(tables.is_empty());
    assert_eq!(columns[0].column, "t.amount");
    assert_eq!(columns[0].reason, "not found in table 'totals'");
}

#[test]
fn recursive_cte() {
    assert_valid(
        "WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 5) \
         SELECT x FROM n",
    );
}

#[test]
fn derived_table_columns() {
    assert_valid("SELECT d.total FROM (SELECT SUM(amount) AS total FROM orders) d");
    let (_, columns) = issues("SELECT d.amount FROM (SELECT SUM(amount) AS total FROM orders) d");
    assert_eq!(columns.len(), 1);
}

#[test]
fn correlated_subquery_sees_outer_scope() {
    assert_valid(
        "SELECT name FROM users u WHERE \
         (SELECT COUNT(*) FROM orders o WHERE o.user_id = u.id) > 2",
    );
}

#[test]
fn schema_qualifier_mismatch() {
    let (tables, _) = issues("SELECT * FROM store.users");
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].table, "store.users");
    assert_eq!(
        tables[0].reason,
        "schema 'store' does not match expected schema 'shop'"
    );
}

#[test]
fn schema_qualifier_without_schema_name() {
    let schema = Schema::from_json(
        "plain",
        None,
        r#"{"tables": [{"name": "t", "columns": [{"name": "a"}]}]}"#,
    )
    .unwrap();
    let issues = validate_sql("SELECT a FROM other.t", &schema).unwrap();
    assert!(matches!(
        &issues[..],
        [ValidationIssue::InvalidTable(issue)] if issue.reason == "schema 'other' not found"
    ));
}

#[test]
fn compound_order_by_uses_result_columns() {
    let (_, columns) = issues("SELECT id FROM users UNION SELECT id FROM orders ORDER BY name");
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].reason, "not found in result columns");
}

#[test]
fn unresolved_join_silences_unqualified_columns() {
    let schema = shop_schema();
    let issues = validate_sql("SELECT nme FROM users JOIN ordrs ON 1 = 1", &schema).unwrap();
    let kinds: Vec<&str> = issues
        .iter()
        .map(|i| match i {
            ValidationIssue::InvalidTable(_) => "table",
            ValidationIssue::InvalidColumn(_) => "column",
        })
        .collect();
    assert_eq!(kinds, vec!["table"]);
}

#[test]
fn disallowed_statements_are_skipped() {
    let schema = shop_schema();
    let issues = validate_sql("DELETE FROM nowhere", &schema).unwrap();
    assert!(issues.is_empty());
}
