//! Question bank: where questions and their schemas come from.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use sqlgrade_core::schema::SchemaDefinition;
use sqlgrade_core::Schema;
use tracing::debug;

use crate::error::{GradeError, Result};

/// A graded question.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    pub question_id: String,
    /// The reference answer.
    pub answer_sql: String,
    pub schema_id: String,
    /// Whether row order matters. Unset falls back to the grader's default.
    #[serde(default)]
    pub order_sensitive: Option<bool>,
}

/// Resolves question and schema ids. Implemented by whatever stores them.
pub trait QuestionBank {
    /// Looks up a question.
    fn question(&self, question_id: &str) -> Option<Question>;

    /// Looks up a schema. Schemas are shared read-only between gradings.
    fn schema(&self, schema_id: &str) -> Option<Arc<Schema>>;
}

/// An in-memory question bank.
///
/// ```json
/// {"schemas": [{"schema_id": "shop", "schema_name": "shop",
///               "schema_definition": {"tables": [...]}}],
///  "questions": [{"question_id": "q1", "answer_sql": "SELECT ...",
///                 "schema_id": "shop", "order_sensitive": true}]}
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: HashMap<String, Arc<Schema>>,
    questions: HashMap<String, Question>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    schemas: Vec<SchemaEntry>,
    #[serde(default)]
    questions: Vec<Question>,
}

#[derive(Deserialize)]
struct SchemaEntry {
    schema_id: String,
    #[serde(default)]
    schema_name: Option<String>,
    schema_definition: SchemaDefinition,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from JSON.
    ///
    /// # Errors
    ///
    /// Returns a `GradeError` if the JSON is malformed, a schema is invalid,
    /// an id repeats, or a question names a schema the catalog lacks.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for entry in file.schemas {
            let schema = Schema::from_definition(
                entry.schema_id.clone(),
                entry.schema_name.as_deref(),
                entry.schema_definition,
            )
            .map_err(|source| GradeError::Schema {
                id: entry.schema_id,
                source,
            })?;
            catalog.insert_schema(schema)?;
        }
        for question in file.questions {
            catalog.insert_question(question)?;
        }
        debug!(
            schemas = catalog.schemas.len(),
            questions = catalog.questions.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    /// Reads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns a `GradeError` if the file cannot be read or is not a valid
    /// catalog.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| GradeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Adds a schema.
    ///
    /// # Errors
    ///
    /// Returns `GradeError::DuplicateId` if the id is taken.
    pub fn insert_schema(&mut self, schema: Schema) -> Result<Arc<Schema>> {
        if self.schemas.contains_key(&schema.id) {
            return Err(GradeError::DuplicateId {
                kind: "schema",
                id: schema.id,
            });
        }
        let schema = Arc::new(schema);
        self.schemas.insert(schema.id.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Adds a question.
    ///
    /// # Errors
    ///
    /// Returns a `GradeError` if the id is taken or the schema is unknown.
    pub fn insert_question(&mut self, question: Question) -> Result<()> {
        if !self.schemas.contains_key(&question.schema_id) {
            return Err(GradeError::UnknownSchema(question.schema_id));
        }
        if self.questions.contains_key(&question.question_id) {
            return Err(GradeError::DuplicateId {
                kind: "question",
                id: question.question_id,
            });
        }
        self.questions.insert(question.question_id.clone(), question);
        Ok(())
    }
}

impl QuestionBank for Catalog {
    fn question(&self, question_id: &str) -> Option<Question> {
        self.questions.get(question_id).cloned()
    }

    fn schema(&self, schema_id: &str) -> Option<Arc<Schema>> {
        self.schemas.get(schema_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog_json() -> serde_json::Value {
        json!({
            "schemas": [{
                "schema_id": "s1",
                "schema_name": "shop",
                "schema_definition": {"tables": [
                    {"name": "users", "columns": [{"name": "id", "type": "int"}]}
                ]}
            }],
            "questions": [
                {"question_id": "q1", "answer_sql": "SELECT id FROM users", "schema_id": "s1"},
                {"question_id": "q2", "answer_sql": "SELECT 1", "schema_id": "s1", "order_sensitive": true}
            ]
        })
    }

    #[test]
    fn test_load_catalog() {
        let catalog = Catalog::from_json(&catalog_json().to_string()).unwrap();
        let q1 = catalog.question("q1").unwrap();
        assert_eq!(q1.order_sensitive, None);
        assert_eq!(catalog.question("q2").unwrap().order_sensitive, Some(true));
        let schema = catalog.schema("s1").unwrap();
        assert_eq!(schema.name.as_ref().unwrap().value, "shop");
        assert!(catalog.question("q3").is_none());
    }

    #[test]
    fn test_unknown_schema_reference() {
        let mut json = catalog_json();
        json["questions"][0]["schema_id"] = json!("nope");
        let err = Catalog::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, GradeError::UnknownSchema(id) if id == "nope"));
    }

    #[test]
    fn test_duplicate_question() {
        let mut json = catalog_json();
        json["questions"][1]["question_id"] = json!("q1");
        let err = Catalog::from_json(&json.to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Duplicate question id 'q1' in catalog");
    }

    #[test]
    fn test_invalid_schema() {
        let mut json = catalog_json();
        json["schemas"][0]["schema_definition"]["tables"][0]["columns"] = json!([]);
        let err = Catalog::from_json(&json.to_string()).unwrap_err();
        assert!(matches!(err, GradeError::Schema { ref id, .. } if id == "s1"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, catalog_json().to_string()).unwrap();
        assert!(Catalog::from_path(&path).is_ok());

        let err = Catalog::from_path(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, GradeError::Io { .. }));
    }
}
