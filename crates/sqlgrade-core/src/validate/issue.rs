//! Validation issue types.

use serde::Serialize;

/// A table reference that does not resolve against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableIssue {
    /// The table as written in the query.
    pub table: String,
    /// Why it does not resolve.
    pub reason: String,
    /// Tables that do exist.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

/// A column reference that does not resolve to exactly one table in scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnIssue {
    /// The column as written, including any qualifier.
    pub column: String,
    /// Starts with `not found` or `ambiguous across joined tables`.
    pub reason: String,
    /// Columns that do exist, or the competing tables when ambiguous.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

/// A problem found by the semantic validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// See [`TableIssue`].
    InvalidTable(TableIssue),
    /// See [`ColumnIssue`].
    InvalidColumn(ColumnIssue),
}

impl ValidationIssue {
    pub(super) fn dedup_key(&self) -> String {
        match self {
            Self::InvalidTable(issue) => format!("table:{}", issue.table.to_lowercase()),
            Self::InvalidColumn(issue) => format!("column:{}", issue.column.to_lowercase()),
        }
    }
}

/// Splits issues into table and column issues, keeping their order.
#[must_use]
pub fn partition_issues(issues: Vec<ValidationIssue>) -> (Vec<TableIssue>, Vec<ColumnIssue>) {
    let mut tables = Vec::new();
    let mut columns = Vec::new();
    for issue in issues {
        match issue {
            ValidationIssue::InvalidTable(issue) => tables.push(issue),
            ValidationIssue::InvalidColumn(issue) => columns.push(issue),
        }
    }
    (tables, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_omits_empty_candidates() {
        let issue = ValidationIssue::InvalidTable(TableIssue {
            table: String::from("usrs"),
            reason: String::from("table not found in schema"),
            candidates: vec![],
        });
        let json = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "invalid_table",
                "table": "usrs",
                "reason": "table not found in schema"
            })
        );
    }

    #[test]
    fn test_partition_keeps_order() {
        let issues = vec![
            ValidationIssue::InvalidColumn(ColumnIssue {
                column: String::from("a"),
                reason: String::from("not found in any table in scope"),
                candidates: vec![],
            }),
            ValidationIssue::InvalidTable(TableIssue {
                table: String::from("t"),
                reason: String::from("table not found in schema"),
                candidates: vec![],
            }),
            ValidationIssue::InvalidColumn(ColumnIssue {
                column: String::from("b"),
                reason: String::from("not found in any table in scope"),
                candidates: vec![],
            }),
        ];
        let (tables, columns) = partition_issues(issues);
        assert_eq!(tables.len(), 1);
        assert_eq!(columns[0].column, "a");
        assert_eq!(columns[1].column, "b");
    }
}
