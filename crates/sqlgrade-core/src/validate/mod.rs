//! Semantic validation of table and column references.
//!
//! The validator never executes anything. It parses the query, builds the
//! name scopes SQLite would build, and reports each reference that names a
//! missing table, a missing column or a column that exists in more than one
//! joined table. Type errors are out of reach by design of the check.

mod issue;
mod scope;
mod validator;

pub use issue::{partition_issues, ColumnIssue, TableIssue, ValidationIssue};

use crate::ast::{Query, Statement};
use crate::parser::{parse_script, ParseError};
use crate::schema::Schema;
use validator::Validator;

/// Validates one query against `schema`. Issues come back deduplicated,
/// in the order they were first met.
#[must_use]
pub fn validate_query(query: &Query, schema: &Schema) -> Vec<ValidationIssue> {
    let mut validator = Validator::new(schema);
    validator.query(query);
    validator.finish()
}

/// Validates every query in `statements`. Disallowed statements carry no
/// references and are left to the executor's allowlist.
#[must_use]
pub fn validate(statements: &[Statement], schema: &Schema) -> Vec<ValidationIssue> {
    let mut validator = Validator::new(schema);
    for query in statements.iter().filter_map(Statement::as_query) {
        validator.query(query);
    }
    validator.finish()
}

/// Parses `sql` and validates it.
///
/// # Errors
///
/// Returns a `ParseError` if `sql` does not parse.
pub fn validate_sql(sql: &str, schema: &Schema) -> Result<Vec<ValidationIssue>, ParseError> {
    let statements = parse_script(sql)?;
    Ok(validate(&statements, schema))
}
