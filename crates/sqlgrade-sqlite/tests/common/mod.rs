#![allow(dead_code)]

use std::time::Duration;

use sqlgrade_core::{Schema, SqlQuery};
use sqlgrade_sqlite::{Execution, ExecutionFailure, ResultSet, Sandbox, SandboxLimits};

/// `users(id, name)` with Alice and Bob, plus an empty `orders` table.
pub fn users_schema(name: Option<&str>) -> Schema {
    let json = r#"{"tables": [
        {"name": "users",
         "columns": [{"name": "id", "type": "int", "primary": true},
                     {"name": "name", "type": "text"}],
         "sample_data": [[1, "Alice"], {"id": 2, "name": "Bob"}]},
        {"name": "orders",
         "columns": [{"name": "id", "type": "int", "primary": true},
                     {"name": "user_id", "type": "int"},
                     {"name": "amount", "type": "decimal(10,2)"}]}
    ]}"#;
    Schema::from_json("users", name, json).unwrap_or_else(|e| panic!("schema: {e}"))
}

pub fn sandbox(timeout_ms: u64, max_rows: usize) -> Sandbox {
    Sandbox::new(SandboxLimits {
        timeout: Duration::from_millis(timeout_ms),
        max_rows,
    })
}

pub async fn run(sandbox: &Sandbox, schema: &Schema, sql: &str) -> Execution {
    sandbox
        .execute(&SqlQuery::student(sql), schema)
        .await
        .unwrap_or_else(|e| panic!("Sandbox fault for: {sql}\nError: {e:?}"))
}

pub async fn run_ok(sql: &str) -> ResultSet {
    run(&Sandbox::default(), &users_schema(None), sql)
        .await
        .unwrap_or_else(|f| panic!("Expected rows for: {sql}\nFailure: {f:?}"))
}

pub async fn run_err(sql: &str) -> ExecutionFailure {
    match run(&Sandbox::default(), &users_schema(None), sql).await {
        Ok(result) => panic!("Expected failure for: {sql}\nGot: {result:?}"),
        Err(failure) => failure,
    }
}
