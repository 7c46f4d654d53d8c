//! Builds the in-memory copy of a sample schema.

use std::str::FromStr;

use serde_json::Value as JsonValue;
use sqlgrade_core::schema::Table;
use sqlgrade_core::Schema;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, warn};

use crate::error::{Result, SandboxError};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Opens a fresh in-memory store holding `schema`'s tables and sample rows.
/// The store is read-only when this returns.
pub async fn open(schema: &Schema) -> Result<SqliteConnection> {
    let mut conn = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(SandboxError::Open)?
        .disable_statement_logging()
        .connect()
        .await
        .map_err(SandboxError::Open)?;

    match load(&mut conn, schema).await {
        Ok(()) => Ok(conn),
        Err(err) => {
            if let Err(close) = conn.close().await {
                warn!(error = %close, "Failed to close sandbox store after load error");
            }
            Err(err)
        }
    }
}

async fn load(conn: &mut SqliteConnection, schema: &Schema) -> Result<()> {
    // Tables of a named schema live in an attached database of that name,
    // so both `users` and `shop.users` resolve.
    let prefix = match &schema.name {
        Some(name) => {
            let attach = format!("ATTACH DATABASE ':memory:' AS {}", quote(&name.value));
            sqlx::query(&attach)
                .execute(&mut *conn)
                .await
                .map_err(SandboxError::Open)?;
            format!("{}.", quote(&name.value))
        }
        None => String::new(),
    };

    for table in &schema.tables {
        load_table(conn, &prefix, table)
            .await
            .map_err(|source| SandboxError::Load {
                table: table.name.value.clone(),
                source,
            })?;
    }

    sqlx::query("PRAGMA query_only = ON")
        .execute(&mut *conn)
        .await
        .map_err(SandboxError::Open)?;
    debug!(
        schema = %schema.id,
        tables = schema.tables.len(),
        "Sandbox store loaded"
    );
    Ok(())
}

async fn load_table(conn: &mut SqliteConnection, prefix: &str, table: &Table) -> sqlx::Result<()> {
    let ddl = create_table_sql(prefix, table);
    debug!(sql = %ddl, "Creating sample table");
    sqlx::query(&ddl).execute(&mut *conn).await?;

    if table.sample_rows.is_empty() {
        return Ok(());
    }
    let insert = insert_sql(prefix, table);
    let mut tx = conn.begin().await?;
    for row in &table.sample_rows {
        let query = row.iter().fold(sqlx::query(&insert), bind_json);
        query.execute(&mut *tx).await?;
    }
    tx.commit().await
}

fn create_table_sql(prefix: &str, table: &Table) -> String {
    let mut parts: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} {}", quote(&c.name.value), c.affinity().as_str()))
        .collect();
    let primary: Vec<String> = table.primary_key().map(|c| quote(&c.name.value)).collect();
    if !primary.is_empty() {
        parts.push(format!("PRIMARY KEY ({})", primary.join(", ")));
    }
    format!(
        "CREATE TABLE {prefix}{} ({})",
        quote(&table.name.value),
        parts.join(", ")
    )
}

fn insert_sql(prefix: &str, table: &Table) -> String {
    let placeholders = vec!["?"; table.columns.len()].join(", ");
    format!(
        "INSERT INTO {prefix}{} VALUES ({placeholders})",
        quote(&table.name.value)
    )
}

/// Binds a JSON sample value with the closest SQLite storage class.
fn bind_json<'q>(query: SqliteQuery<'q>, value: &JsonValue) -> SqliteQuery<'q> {
    match value {
        JsonValue::Null => query.bind(None::<String>),
        JsonValue::Bool(b) => query.bind(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        JsonValue::String(s) => query.bind(s.clone()),
        nested => query.bind(nested.to_string()),
    }
}

/// Quotes an identifier for SQLite.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(name: Option<&str>) -> Schema {
        let json = r#"{"tables": [{
            "name": "order items",
            "columns": [
                {"name": "order_id", "type": "int", "primary": true},
                {"name": "sku", "type": "varchar(20)", "primary": true},
                {"name": "qty", "type": "decimal(10,2)"}
            ],
            "sample_data": [[1, "A-1", 2]]
        }]}"#;
        Schema::from_json("s", name, json).unwrap()
    }

    #[test]
    fn test_create_table_sql() {
        let schema = schema(None);
        assert_eq!(
            create_table_sql("", &schema.tables[0]),
            "CREATE TABLE \"order items\" (\"order_id\" INTEGER, \"sku\" TEXT, \
             \"qty\" NUMERIC, PRIMARY KEY (\"order_id\", \"sku\"))"
        );
    }

    #[test]
    fn test_insert_sql() {
        let schema = schema(None);
        assert_eq!(
            insert_sql("\"shop\".", &schema.tables[0]),
            "INSERT INTO \"shop\".\"order items\" VALUES (?, ?, ?)"
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn test_open_named_schema() {
        let mut conn = open(&schema(Some("shop"))).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM shop.\"order items\"")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM \"order items\"")
            .fetch_one(&mut conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
        conn.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_store_is_read_only() {
        let mut conn = open(&schema(None)).await.unwrap();
        let err = sqlx::query("DELETE FROM \"order items\"")
            .execute(&mut conn)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("readonly"), "{err}");
        conn.close().await.unwrap();
    }
}
