//! Error types for schema loading.

/// Errors raised while building a [`Schema`](super::Schema) from its
/// definition.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The definition is not valid JSON or has the wrong shape.
    #[error("Invalid schema definition: {0}")]
    Json(#[from] serde_json::Error),

    /// A table has an empty name.
    #[error("Table name must not be empty")]
    EmptyTableName,

    /// A column has an empty name.
    #[error("Table '{table}' has a column with an empty name")]
    EmptyColumnName {
        /// The table holding the column.
        table: String,
    },

    /// A table declares no columns.
    #[error("Table '{0}' has no columns")]
    NoColumns(String),

    /// Two tables share a name, ignoring case.
    #[error("Duplicate table '{0}'")]
    DuplicateTable(String),

    /// Two columns of one table share a name, ignoring case.
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// The table.
        table: String,
        /// The repeated column name.
        column: String,
    },

    /// A `schema.table` name uses a different schema than the others.
    #[error("Table '{table}' is qualified with a schema other than '{expected}'")]
    QualifierMismatch {
        /// The table as written.
        table: String,
        /// The schema name in effect.
        expected: String,
    },

    /// A sample row given as an array has the wrong number of values.
    #[error("Row {row} of table '{table}' has {found} values, expected {expected}")]
    RowArity {
        /// The table.
        table: String,
        /// 1-based row number.
        row: usize,
        /// Number of columns.
        expected: usize,
        /// Number of values in the row.
        found: usize,
    },

    /// A sample row given as an object names a column the table lacks.
    #[error("Row {row} of table '{table}' sets unknown column '{column}'")]
    UnknownRowColumn {
        /// The table.
        table: String,
        /// 1-based row number.
        row: usize,
        /// The unknown key.
        column: String,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
