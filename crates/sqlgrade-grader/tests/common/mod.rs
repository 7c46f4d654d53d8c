#![allow(dead_code)]

use serde_json::json;
use sqlgrade_grader::{
    Catalog, Diagnostic, GradeReport, Grader, GraderConfig, ResultMismatch, Submission,
};

/// `users(id int primary, name text)` with Alice and Bob, and an `orders`
/// table, plus questions over them.
pub fn catalog_json() -> serde_json::Value {
    json!({
        "schemas": [{
            "schema_id": "people",
            "schema_name": "shop",
            "schema_definition": {"tables": [
                {"name": "users",
                 "columns": [{"name": "id", "type": "int", "primary": true},
                             {"name": "name", "type": "text"}],
                 "sample_data": [[1, "Alice"], [2, "Bob"]]},
                {"name": "orders",
                 "columns": [{"name": "id", "type": "int", "primary": true},
                             {"name": "user_id", "type": "int"},
                             {"name": "amount", "type": "decimal(10,2)"}],
                 "sample_data": [[10, 1, 9.99], [11, 1, 20], [12, 2, 5.5]]}
            ]}
        }],
        "questions": [
            {"question_id": "all_users", "schema_id": "people",
             "answer_sql": "SELECT id, name FROM users"},
            {"question_id": "users_in_order", "schema_id": "people", "order_sensitive": true,
             "answer_sql": "SELECT id, name FROM users ORDER BY id"},
            {"question_id": "user_totals", "schema_id": "people",
             "answer_sql": "SELECT u.name, SUM(o.amount) AS total FROM users u JOIN orders o ON o.user_id = u.id GROUP BY u.name"},
            {"question_id": "users_registered_before_today", "schema_id": "people",
             "answer_sql": "SELECT id, name FROM users WHERE date(CURRENT_TIMESTAMP) > '2000-01-01'"},
            {"question_id": "broken_reference", "schema_id": "people",
             "answer_sql": "SELECT id FROM customers"},
            {"question_id": "reference_fails_at_runtime", "schema_id": "people",
             "answer_sql": "SELECT no_such_function(id) FROM users"}
        ]
    })
}

pub fn grader() -> Grader<Catalog> {
    grader_with(GraderConfig::default())
}

pub fn grader_with(config: GraderConfig) -> Grader<Catalog> {
    let catalog = Catalog::from_json(&catalog_json().to_string())
        .unwrap_or_else(|e| panic!("catalog: {e}"));
    Grader::new(catalog, config)
}

pub async fn grade(question: &str, sql: &str) -> GradeReport {
    grader()
        .grade(&Submission::new(question, sql))
        .await
        .unwrap_or_else(|e| panic!("Grading failed for: {sql}\nError: {e:?}"))
}

pub fn diagnostic(report: &GradeReport) -> &Diagnostic {
    assert_eq!(report.detailed_errors.len(), 1, "{report:?}");
    &report.detailed_errors[0]
}

pub fn mismatch(report: &GradeReport) -> &ResultMismatch {
    match diagnostic(report) {
        Diagnostic::ResultMismatch(m) => m,
        other => panic!("Expected result mismatch, got {other:?}"),
    }
}
