#![allow(dead_code)]

use sqlgrade_core::ast::{Query, SelectStatement, Statement};
use sqlgrade_core::validate::{partition_issues, ColumnIssue, TableIssue};
use sqlgrade_core::{validate_sql, ParseError, Parser, Schema};

pub fn parse(sql: &str) -> Statement {
    Parser::new(sql)
        .parse_statement()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_statement()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_query(sql: &str) -> Query {
    match parse(sql) {
        Statement::Query(q) => *q,
        other => panic!("Expected query, got {other:?}"),
    }
}

pub fn parse_select(sql: &str) -> SelectStatement {
    parse_query(sql).body.first_select().clone()
}

/// `users(id, name, email)`, `orders(id, user_id, amount, created_at)` and
/// `products(id, name, price)`, all under schema name `shop`.
pub fn shop_schema() -> Schema {
    let json = r#"{
        "tables": [
            {"name": "users", "columns": [
                {"name": "id", "type": "INTEGER", "primary": true},
                {"name": "name", "type": "TEXT"},
                {"name": "email", "type": "VARCHAR(100)"}
            ]},
            {"name": "orders", "columns": [
                {"name": "id", "type": "INTEGER", "primary": true},
                {"name": "user_id", "type": "INTEGER"},
                {"name": "amount", "type": "DECIMAL(10,2)"},
                {"name": "created_at", "type": "DATE"}
            ]},
            {"name": "products", "columns": [
                {"name": "id", "type": "INTEGER", "primary": true},
                {"name": "name", "type": "TEXT"},
                {"name": "price", "type": "REAL"}
            ]}
        ]
    }"#;
    Schema::from_json("shop", Some("shop"), json).expect("shop schema loads")
}

pub fn issues(sql: &str) -> (Vec<TableIssue>, Vec<ColumnIssue>) {
    let schema = shop_schema();
    let issues = validate_sql(sql, &schema)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"));
    partition_issues(issues)
}

pub fn assert_valid(sql: &str) {
    let (tables, columns) = issues(sql);
    assert!(
        tables.is_empty() && columns.is_empty(),
        "Expected no issues for: {sql}\nTables: {tables:?}\nColumns: {columns:?}"
    );
}
