//! In-memory schema model: tables, columns and sample rows.

use std::collections::HashSet;

use serde_json::Value;

use super::definition::{RowDefinition, SchemaDefinition, TableDefinition};
use super::error::{Result, SchemaError};
use crate::ast::{Affinity, DataType};
use crate::ident::{normalize, Ident};

/// A column of a sample table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name.
    pub name: Ident,
    /// Declared type as written in the definition.
    pub data_type: String,
    /// Whether the column is part of the primary key.
    pub is_primary: bool,
}

impl Column {
    /// Returns the SQLite affinity of the declared type.
    #[must_use]
    pub fn affinity(&self) -> Affinity {
        DataType::parse(&self.data_type).sqlite_affinity()
    }
}

/// A sample table and its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Simple table name, without any schema qualifier.
    pub name: Ident,
    /// Columns in declaration order.
    pub columns: Vec<Column>,
    /// Sample rows, one value per column in declaration order.
    pub sample_rows: Vec<Vec<Value>>,
}

impl Table {
    /// Looks up a column by its normalized key.
    #[must_use]
    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.key == key)
    }

    /// Returns the column names as declared.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.value.clone()).collect()
    }

    /// Returns the primary key columns.
    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary)
    }
}

/// A sample database. Immutable once built; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Identifier the question bank knows this schema by.
    pub id: String,
    /// Schema name that table references may be qualified with.
    pub name: Option<Ident>,
    /// The tables.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Builds a schema from its JSON definition text.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` if the JSON is malformed or the definition
    /// breaks a naming or row-shape rule.
    pub fn from_json(id: impl Into<String>, name: Option<&str>, json: &str) -> Result<Self> {
        let definition: SchemaDefinition = serde_json::from_str(json)?;
        Self::from_definition(id, name, definition)
    }

    /// Builds a schema from a parsed definition.
    ///
    /// A table written `shop.users` is stored as `users`. When `name` is
    /// absent, the first such qualifier becomes the schema name.
    ///
    /// # Errors
    ///
    /// Returns a `SchemaError` for empty or duplicate names, a conflicting
    /// qualifier, or a sample row that does not fit its table.
    pub fn from_definition(
        id: impl Into<String>,
        name: Option<&str>,
        definition: SchemaDefinition,
    ) -> Result<Self> {
        let explicit = name.map(str::trim).filter(|n| !n.is_empty()).map(Ident::unspanned);
        let schema_name = explicit.or_else(|| {
            definition
                .tables
                .iter()
                .find_map(|t| split_qualified(&t.name).0.map(Ident::unspanned))
        });

        let mut seen = HashSet::new();
        let mut tables = Vec::with_capacity(definition.tables.len());
        for table in definition.tables {
            let table = build_table(table, schema_name.as_ref())?;
            if !seen.insert(table.name.key.clone()) {
                return Err(SchemaError::DuplicateTable(table.name.value));
            }
            tables.push(table);
        }

        Ok(Self {
            id: id.into(),
            name: schema_name,
            tables,
        })
    }

    /// Looks up a table by its normalized key.
    #[must_use]
    pub fn table(&self, key: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.key == key)
    }

    /// Returns the table names as declared.
    #[must_use]
    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.value.clone()).collect()
    }
}

/// Splits `schema.table` into its qualifier and simple name.
fn split_qualified(name: &str) -> (Option<&str>, &str) {
    let name = name.trim();
    match name.rsplit_once('.') {
        Some((qualifier, simple)) if !qualifier.trim().is_empty() => {
            (Some(qualifier.trim()), simple.trim())
        }
        Some((_, simple)) => (None, simple.trim()),
        None => (None, name),
    }
}

fn build_table(definition: TableDefinition, schema_name: Option<&Ident>) -> Result<Table> {
    let (qualifier, simple) = split_qualified(&definition.name);
    if simple.is_empty() {
        return Err(SchemaError::EmptyTableName);
    }
    if let (Some(qualifier), Some(expected)) = (qualifier, schema_name) {
        if normalize(qualifier) != expected.key {
            return Err(SchemaError::QualifierMismatch {
                table: definition.name.clone(),
                expected: expected.value.clone(),
            });
        }
    }
    let name = Ident::unspanned(simple);

    if definition.columns.is_empty() {
        return Err(SchemaError::NoColumns(name.value));
    }
    let mut columns: Vec<Column> = Vec::with_capacity(definition.columns.len());
    for column in definition.columns {
        if column.name.trim().is_empty() {
            return Err(SchemaError::EmptyColumnName { table: name.value });
        }
        let ident = Ident::unspanned(column.name.trim());
        if columns.iter().any(|c| c.name.same_as(&ident)) {
            return Err(SchemaError::DuplicateColumn {
                table: name.value,
                column: ident.value,
            });
        }
        columns.push(Column {
            name: ident,
            data_type: column.data_type,
            is_primary: column.primary,
        });
    }

    let sample_rows = definition
        .sample_data
        .into_iter()
        .enumerate()
        .map(|(index, row)| build_row(&name, &columns, index + 1, row))
        .collect::<Result<Vec<_>>>()?;

    Ok(Table {
        name,
        columns,
        sample_rows,
    })
}

/// Lays a sample row out in column order.
fn build_row(
    table: &Ident,
    columns: &[Column],
    row_number: usize,
    row: RowDefinition,
) -> Result<Vec<Value>> {
    match row {
        RowDefinition::Array(values) => {
            if values.len() != columns.len() {
                return Err(SchemaError::RowArity {
                    table: table.value.clone(),
                    row: row_number,
                    expected: columns.len(),
                    found: values.len(),
                });
            }
            Ok(values)
        }
        RowDefinition::Object(map) => {
            let mut values = vec![Value::Null; columns.len()];
            for (key, value) in map {
                let lookup = normalize(&key);
                let Some(index) = columns.iter().position(|c| c.name.key == lookup) else {
                    return Err(SchemaError::UnknownRowColumn {
                        table: table.value.clone(),
                        row: row_number,
                        column: key,
                    });
                };
                values[index] = value;
            }
            Ok(values)
        }
    }
}
