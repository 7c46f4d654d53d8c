//! Error types for sandboxed execution.

use crate::result::ResultSet;

/// Why a query produced no result. These are expected outcomes of running
/// untrusted SQL and are reported to the caller, not raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionFailure {
    /// The text is not exactly one `SELECT`/`WITH` statement.
    #[error("disallowed statement: {detail}")]
    DisallowedStatement {
        /// What was rejected, e.g. `DELETE` or `2 statements`.
        detail: String,
    },

    /// The query ran past its deadline and was interrupted.
    #[error("timeout: query did not finish within {limit_ms} ms")]
    Timeout {
        /// The deadline, in milliseconds.
        limit_ms: u128,
    },

    /// The query returned more rows than allowed.
    #[error("row limit exceeded: query returned more than {limit} rows")]
    RowLimitExceeded {
        /// The row ceiling.
        limit: usize,
    },

    /// The text does not parse.
    #[error("syntax error: {message}")]
    Syntax {
        /// Parser or engine message.
        message: String,
        /// Byte offset of the error, when known.
        position: Option<usize>,
    },

    /// SQLite rejected the query while preparing or running it.
    #[error("{message}")]
    Engine {
        /// Engine message, e.g. `no such function: MEDIAN`.
        message: String,
    },
}

impl ExecutionFailure {
    /// Returns the failure class: `disallowed statement`, `timeout`,
    /// `row limit exceeded`, `syntax error` or `engine error`.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::DisallowedStatement { .. } => "disallowed statement",
            Self::Timeout { .. } => "timeout",
            Self::RowLimitExceeded { .. } => "row limit exceeded",
            Self::Syntax { .. } => "syntax error",
            Self::Engine { .. } => "engine error",
        }
    }
}

/// Infrastructure faults. Unlike [`ExecutionFailure`], these say nothing
/// about the query and abort the grading.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The in-memory store could not be opened or configured.
    #[error("Failed to open sandbox store: {0}")]
    Open(#[source] sqlx::Error),

    /// A sample table could not be created or filled.
    #[error("Failed to load sample table '{table}': {source}")]
    Load {
        /// The table being loaded.
        table: String,
        /// Underlying error.
        #[source]
        source: sqlx::Error,
    },

    /// The SQLite worker thread died.
    #[error("Sandbox worker crashed")]
    WorkerCrashed,

    /// Any other driver-level fault.
    #[error("Sandbox store error: {0}")]
    Store(#[from] sqlx::Error),
}

/// Outcome of a query that reached the engine.
pub type Execution = std::result::Result<ResultSet, ExecutionFailure>;

/// Result type for sandbox operations.
pub type Result<T> = std::result::Result<T, SandboxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasons() {
        let failure = ExecutionFailure::RowLimitExceeded { limit: 10 };
        assert_eq!(failure.reason(), "row limit exceeded");
        assert_eq!(
            failure.to_string(),
            "row limit exceeded: query returned more than 10 rows"
        );
        let failure = ExecutionFailure::DisallowedStatement {
            detail: String::from("DELETE"),
        };
        assert_eq!(failure.to_string(), "disallowed statement: DELETE");
    }
}
