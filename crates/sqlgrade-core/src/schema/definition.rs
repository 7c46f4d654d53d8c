//! Wire format of schema definitions.
//!
//! ```json
//! {"tables": [{"name": "users",
//!              "columns": [{"name": "id", "type": "int", "primary": true},
//!                          {"name": "name", "type": "text"}],
//!              "sample_data": [{"id": 1, "name": "Alice"}, [2, "Bob"]]}]}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A schema definition as stored by the question service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// The tables.
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
}

/// One table of a [`SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name, optionally written `schema.table`.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDefinition>,
    /// Sample rows.
    #[serde(default)]
    pub sample_data: Vec<RowDefinition>,
}

/// One column of a [`TableDefinition`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Declared type, free-form.
    #[serde(rename = "type", default)]
    pub data_type: String,
    /// Whether the column is (part of) the primary key.
    #[serde(default, alias = "is_primary", alias = "primary_key")]
    pub primary: bool,
}

/// A sample row: keyed by column name, or positional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowDefinition {
    /// `{"id": 1, "name": "Alice"}`; absent columns are NULL.
    Object(Map<String, Value>),
    /// `[1, "Alice"]` in column order.
    Array(Vec<Value>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_definition() {
        let json = r#"{
            "tables": [{
                "name": "users",
                "columns": [
                    {"name": "id", "type": "int", "primary": true},
                    {"name": "name", "type": "text"}
                ],
                "sample_data": [{"id": 1, "name": "Alice"}, [2, "Bob"]]
            }]
        }"#;
        let definition: SchemaDefinition = serde_json::from_str(json).unwrap();
        let users = &definition.tables[0];
        assert!(users.columns[0].primary);
        assert!(!users.columns[1].primary);
        assert_eq!(users.columns[1].data_type, "text");
        assert!(matches!(users.sample_data[0], RowDefinition::Object(_)));
        assert!(matches!(users.sample_data[1], RowDefinition::Array(_)));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{"tables": [{"name": "t", "columns": [{"name": "a"}]}]}"#;
        let definition: SchemaDefinition = serde_json::from_str(json).unwrap();
        assert!(definition.tables[0].sample_data.is_empty());
        assert_eq!(definition.tables[0].columns[0].data_type, "");
    }
}
