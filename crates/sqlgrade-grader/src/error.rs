//! Error types for grading.

use std::path::PathBuf;

use sqlgrade_core::SchemaError;
use sqlgrade_sqlite::SandboxError;

/// Faults that stop a grading outright. Anything wrong with the learner's
/// query is reported in the [`GradeReport`](crate::GradeReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// No question has this id.
    #[error("Unknown question '{0}'")]
    UnknownQuestion(String),

    /// No schema has this id.
    #[error("Unknown schema '{0}'")]
    UnknownSchema(String),

    /// Two catalog entries share an id.
    #[error("Duplicate {kind} id '{id}' in catalog")]
    DuplicateId {
        /// `schema` or `question`.
        kind: &'static str,
        /// The repeated id.
        id: String,
    },

    /// A schema definition is invalid.
    #[error("Invalid schema '{id}': {source}")]
    Schema {
        /// The schema id.
        id: String,
        /// What is wrong with it.
        #[source]
        source: SchemaError,
    },

    /// The sandbox failed for reasons unrelated to the query.
    #[error("Sandbox error: {0}")]
    Sandbox(#[from] SandboxError),

    /// Catalog JSON could not be read.
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] serde_json::Error),

    /// A catalog file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Result type for grading operations.
pub type Result<T> = std::result::Result<T, GradeError>;
