//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt expression parsing,
//! covering the read-only query subset learners are graded on. Any other
//! statement is recognised only far enough to be rejected.

mod error;
#[allow(clippy::module_inception)]
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;

use crate::ast::Statement;

/// Parses a single statement.
///
/// # Errors
///
/// Returns a `ParseError` if `sql` is not exactly one parseable statement.
pub fn parse_statement(sql: &str) -> Result<Statement, ParseError> {
    Parser::new(sql).parse_statement()
}

/// Parses every `;`-separated statement in `sql`.
///
/// # Errors
///
/// Returns a `ParseError` for the first statement that fails to parse.
pub fn parse_script(sql: &str) -> Result<Vec<Statement>, ParseError> {
    Parser::new(sql).parse_script()
}
