//! Sandboxed query execution.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::TryStreamExt;
use sqlgrade_core::{parse_script, Schema, SqlQuery, Statement};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column, Connection, Executor, Row, Statement as _, TypeInfo, ValueRef};
use tracing::{debug, info, warn};

use crate::error::{Execution, ExecutionFailure, Result, SandboxError};
use crate::loader;
use crate::result::ResultSet;
use crate::value::Value;

/// SQLite virtual machine instructions between deadline checks.
const PROGRESS_INTERVAL: i32 = 1000;

/// Bounds applied to every execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLimits {
    /// Wall-clock budget for loading the store and running the query.
    pub timeout: Duration,
    /// Most rows a query may return.
    pub max_rows: usize,
}

impl Default for SandboxLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            max_rows: 1000,
        }
    }
}

/// Executes untrusted queries, each against its own throwaway store.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    limits: SandboxLimits,
}

/// Why the row loop stopped early.
enum Stop {
    RowLimit,
    Driver(sqlx::Error),
}

impl From<sqlx::Error> for Stop {
    fn from(err: sqlx::Error) -> Self {
        Self::Driver(err)
    }
}

impl Sandbox {
    /// Creates a sandbox with the given limits.
    #[must_use]
    pub const fn new(limits: SandboxLimits) -> Self {
        Self { limits }
    }

    /// Returns the limits.
    #[must_use]
    pub const fn limits(&self) -> SandboxLimits {
        self.limits
    }

    /// Runs `query` against a fresh copy of `schema`.
    ///
    /// The outer `Result` carries infrastructure faults. The inner
    /// [`Execution`] is the query's own outcome: a result set, or the reason
    /// it produced none. The store is closed before this returns, whatever
    /// the outcome.
    ///
    /// # Errors
    ///
    /// Returns a `SandboxError` if the store cannot be opened or loaded, or
    /// the SQLite worker fails.
    pub async fn execute(&self, query: &SqlQuery, schema: &Schema) -> Result<Execution> {
        let role = query.role;
        if let Err(failure) = check_allowed(&query.text) {
            warn!(%role, reason = failure.reason(), "Query rejected before execution");
            return Ok(Err(failure));
        }

        let started = Instant::now();
        let deadline = started + self.limits.timeout;
        let timeout = ExecutionFailure::Timeout {
            limit_ms: self.limits.timeout.as_millis(),
        };
        let tokio_deadline = tokio::time::Instant::from_std(deadline);

        let Ok(opened) = tokio::time::timeout_at(tokio_deadline, loader::open(schema)).await else {
            warn!(%role, "Timed out while loading sample data");
            return Ok(Err(timeout));
        };
        let mut conn = opened?;

        let interrupted = Arc::new(AtomicBool::new(false));
        if let Err(err) = install_deadline(&mut conn, deadline, Arc::clone(&interrupted)).await {
            close(conn, false).await;
            return Err(SandboxError::Open(err));
        }

        debug!(%role, sql = %query.text, "Executing query");
        let run = fetch_rows(&mut conn, &query.text, self.limits.max_rows);
        let Ok(outcome) = tokio::time::timeout_at(tokio_deadline, run).await else {
            close(conn, true).await;
            warn!(%role, reason = timeout.reason(), "Query interrupted");
            return Ok(Err(timeout));
        };
        close(conn, false).await;

        let execution = match outcome {
            Ok(result) => Ok(result),
            Err(Stop::RowLimit) => Err(ExecutionFailure::RowLimitExceeded {
                limit: self.limits.max_rows,
            }),
            Err(Stop::Driver(err)) => {
                Err(classify(err, interrupted.load(Ordering::Relaxed), timeout)?)
            }
        };

        match &execution {
            Ok(result) => info!(
                %role,
                rows = result.len(),
                columns = result.columns.len(),
                elapsed_ms = started.elapsed().as_millis(),
                "Query executed"
            ),
            Err(failure) => warn!(
                %role,
                reason = failure.reason(),
                error = %failure,
                "Query failed"
            ),
        }
        Ok(execution)
    }
}

/// Admits exactly one `SELECT`/`WITH` statement.
fn check_allowed(sql: &str) -> std::result::Result<(), ExecutionFailure> {
    let statements = parse_script(sql).map_err(|err| ExecutionFailure::Syntax {
        position: Some(err.position()),
        message: err.message,
    })?;
    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [Statement::Disallowed { keyword, .. }] => Err(ExecutionFailure::DisallowedStatement {
            detail: keyword.clone(),
        }),
        [] => Err(ExecutionFailure::Syntax {
            message: String::from("empty query"),
            position: None,
        }),
        many => Err(ExecutionFailure::DisallowedStatement {
            detail: format!("{} statements", many.len()),
        }),
    }
}

/// Makes SQLite abort whatever it is running once `deadline` passes.
async fn install_deadline(
    conn: &mut SqliteConnection,
    deadline: Instant,
    interrupted: Arc<AtomicBool>,
) -> sqlx::Result<()> {
    let mut handle = conn.lock_handle().await?;
    handle.set_progress_handler(PROGRESS_INTERVAL, move || {
        if Instant::now() < deadline {
            return true;
        }
        interrupted.store(true, Ordering::Relaxed);
        false
    });
    Ok(())
}

async fn fetch_rows(
    conn: &mut SqliteConnection,
    sql: &str,
    max_rows: usize,
) -> std::result::Result<ResultSet, Stop> {
    // Preparing first yields the column names even when no row comes back.
    let statement = (&mut *conn).prepare(sql).await?;
    let columns: Vec<String> = statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    let mut rows = Vec::new();
    let mut stream = sqlx::query(sql).fetch(&mut *conn);
    while let Some(row) = stream.try_next().await? {
        if rows.len() == max_rows {
            return Err(Stop::RowLimit);
        }
        rows.push(decode_row(&row)?);
    }
    Ok(ResultSet::new(columns, rows))
}

fn decode_row(row: &SqliteRow) -> sqlx::Result<Vec<Value>> {
    (0..row.len()).map(|index| decode_cell(row, index)).collect()
}

/// Reads a cell by its runtime storage class, not the declared column type.
fn decode_cell(row: &SqliteRow, index: usize) -> sqlx::Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let value = match raw.type_info().name() {
        "INTEGER" => Value::Integer(row.try_get_unchecked(index)?),
        "REAL" => Value::Real(row.try_get_unchecked(index)?),
        "BLOB" => Value::Blob(row.try_get_unchecked(index)?),
        _ => Value::Text(row.try_get_unchecked(index)?),
    };
    Ok(value)
}

/// Sorts a driver error into a query failure or an infrastructure fault.
fn classify(
    err: sqlx::Error,
    interrupted: bool,
    timeout: ExecutionFailure,
) -> Result<ExecutionFailure> {
    match err {
        sqlx::Error::Database(db) => {
            if interrupted {
                return Ok(timeout);
            }
            let message = db.message().to_string();
            if message.contains("syntax error") || message.contains("incomplete input") {
                Ok(ExecutionFailure::Syntax {
                    message,
                    position: None,
                })
            } else {
                Ok(ExecutionFailure::Engine { message })
            }
        }
        sqlx::Error::WorkerCrashed => Err(SandboxError::WorkerCrashed),
        other => Err(SandboxError::Store(other)),
    }
}

async fn close(conn: SqliteConnection, hard: bool) {
    let closed = if hard {
        conn.close_hard().await
    } else {
        conn.close().await
    };
    if let Err(err) = closed {
        warn!(error = %err, "Failed to close sandbox store");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_allowed() {
        assert!(check_allowed("SELECT 1").is_ok());
        assert!(check_allowed("WITH x AS (SELECT 1) SELECT * FROM x;").is_ok());

        let err = check_allowed("DELETE FROM users").unwrap_err();
        assert_eq!(err.reason(), "disallowed statement");
        assert_eq!(err.to_string(), "disallowed statement: DELETE");

        let err = check_allowed("SELECT 1; SELECT 2").unwrap_err();
        assert_eq!(err.to_string(), "disallowed statement: 2 statements");

        let err = check_allowed("SELECT FROM").unwrap_err();
        assert_eq!(err.reason(), "syntax error");

        let err = check_allowed("  ;  ").unwrap_err();
        assert_eq!(err.reason(), "syntax error");
    }

    #[test]
    fn test_classify_worker_crash() {
        let timeout = ExecutionFailure::Timeout { limit_ms: 10 };
        let err = classify(sqlx::Error::WorkerCrashed, false, timeout).unwrap_err();
        assert!(matches!(err, SandboxError::WorkerCrashed));
    }
}
