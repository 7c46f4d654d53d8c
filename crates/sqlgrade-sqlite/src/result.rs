//! Query results.

use std::fmt;

use serde::Serialize;
use sqlgrade_core::Ident;

use crate::value::Value;

/// Columns and rows returned by one query.
///
/// Columns keep the engine's order. Each row holds one value per column, in
/// the same order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultSet {
    /// Result column names, normalized once on construction.
    pub columns: Vec<Ident>,
    /// The rows.
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    /// Creates a result set from engine column names and rows.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into_iter().map(Ident::unspanned).collect(),
            rows,
        }
    }

    /// Returns the column names as the engine reported them.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.value.clone()).collect()
    }

    /// Returns the position of a column by its normalized key. When a name
    /// repeats, the first occurrence wins.
    #[must_use]
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.key == key)
    }

    /// Returns the value of column `key` in row `row`.
    #[must_use]
    pub fn get(&self, row: usize, key: &str) -> Option<&Value> {
        let index = self.column_index(key)?;
        self.rows.get(row)?.get(index)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wire form: `{"columns": [...], "rows": [[...], ...]}`.
impl Serialize for ResultSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ResultSet", 2)?;
        state.serialize_field("columns", &self.column_names())?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}

/// Renders the rows as a plain-text table:
///
/// ```text
/// id | name
/// --------------
/// 1 | Alice
/// 2 | Bob
/// ```
impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return f.write_str("(empty result set)");
        }
        let header = self.column_names().join(" | ");
        writeln!(f, "{header}")?;
        writeln!(f, "{}", "-".repeat(header.chars().count() + 5))?;
        for (index, row) in self.rows.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
            f.write_str(&cells.join(" | "))?;
        }
        Ok(())
    }
}
