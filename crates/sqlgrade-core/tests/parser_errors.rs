//! Tests for parser error cases.

mod common;
use common::*;

#[test]
fn error_empty_input() {
    let err = parse_err("");
    assert!(err.message.contains("unexpected end of input"), "{err}");
}

#[test]
fn error_only_semicolons() {
    let _ = parse_err(";;");
}

#[test]
fn error_missing_from_table() {
    let err = parse_err("SELECT * FROM");
    assert!(err.message.contains("end of input"), "{err}");
}

#[test]
fn error_select_list_missing() {
    let _ = parse_err("SELECT FROM users");
}

#[test]
fn error_trailing_comma_in_select() {
    let _ = parse_err("SELECT id, FROM users");
}

#[test]
fn error_unbalanced_paren() {
    let _ = parse_err("SELECT (1 + 2 FROM users");
}

#[test]
fn error_unterminated_string() {
    let err = parse_err("SELECT 'abc FROM users");
    assert!(err.message.to_lowercase().contains("unterminated"), "{err}");
}

#[test]
fn error_two_statements() {
    let _ = parse_err("SELECT 1; SELECT 2");
}

#[test]
fn error_statement_starting_with_punctuation() {
    let _ = parse_err("(SELECT 1)");
}

#[test]
fn error_where_without_condition() {
    let _ = parse_err("SELECT id FROM users WHERE");
}

#[test]
fn error_in_without_list() {
    let _ = parse_err("SELECT id FROM users WHERE id IN");
}

#[test]
fn error_between_without_and() {
    let _ = parse_err("SELECT id FROM users WHERE id BETWEEN 1");
}

#[test]
fn error_join_without_table() {
    let _ = parse_err("SELECT * FROM users JOIN ON users.id = 1");
}

#[test]
fn error_with_without_select() {
    let _ = parse_err("WITH x AS (SELECT 1)");
}

#[test]
fn error_position_is_reported() {
    let err = parse_err("SELECT id FROM users WHERE id = = 1");
    assert!(err.position() > 0);
    assert!(err.to_string().contains("at position"), "{err}");
}

#[test]
fn error_deep_nesting_is_rejected() {
    let sql = format!("SELECT {}1{}", "(".repeat(200), ")".repeat(200));
    let _ = parse_err(&sql);
}
