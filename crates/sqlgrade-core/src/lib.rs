//! # sqlgrade-core
//!
//! SQL front end and schema model for grading learner queries.
//!
//! This crate provides:
//! - A hand-written lexer and recursive descent parser (with Pratt
//!   expression parsing) for the read-only query subset
//! - The sample [`Schema`] model and its JSON loader
//! - A semantic validator that checks table and column references against a
//!   schema without executing anything
//!
//! ```rust
//! use sqlgrade_core::{validate_sql, Schema, ValidationIssue};
//!
//! let schema = Schema::from_json(
//!     "shop",
//!     None,
//!     r#"{"tables": [{"name": "users", "columns": [{"name": "id", "type": "int"}]}]}"#,
//! )
//! .unwrap();
//!
//! let issues = validate_sql("SELECT * FROM usrs", &schema).unwrap();
//! assert!(matches!(
//!     &issues[0],
//!     ValidationIssue::InvalidTable(issue) if issue.reason == "table not found in schema"
//! ));
//! ```

pub mod ast;
pub mod ident;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod schema;
pub mod validate;

pub use ast::{Query, Statement};
pub use ident::{normalize, Ident};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{parse_script, parse_statement, ParseError, Parser};
pub use query::{QueryRole, SqlQuery};
pub use schema::{Schema, SchemaError};
pub use validate::{validate, validate_query, validate_sql, ValidationIssue};
