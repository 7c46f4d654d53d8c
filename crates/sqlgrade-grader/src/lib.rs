//! # sqlgrade-grader
//!
//! Grades a learner's SQL answer against a question's reference answer.
//!
//! The [`Grader`] validates the learner query against the question's schema,
//! runs both queries in the SQLite sandbox, compares the results, and turns
//! the outcome into a single [`Diagnostic`] inside a [`GradeReport`].
//!
//! ```rust,no_run
//! use sqlgrade_grader::{Catalog, Grader, GraderConfig, Submission};
//!
//! # async fn demo(catalog_json: &str) -> sqlgrade_grader::Result<()> {
//! let grader = Grader::new(Catalog::from_json(catalog_json)?, GraderConfig::default());
//! let report = grader
//!     .grade(&Submission::new("q1", "SELECT id, name FROM users"))
//!     .await?;
//! println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod compare;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod grader;

pub use catalog::{Catalog, Question, QuestionBank};
pub use compare::{Comparator, ComparisonOutcome};
pub use config::GraderConfig;
pub use diagnostic::{
    CellDifference, ComparisonDetail, ConfigurationFault, Diagnostic, ErrorType, GradeReport,
    ResultMismatch, RowStatus,
};
pub use error::{GradeError, Result};
pub use grader::{Grader, Stage, Submission};
