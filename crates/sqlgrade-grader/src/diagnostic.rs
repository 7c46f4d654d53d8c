//! Diagnostics: what the learner is told about a submission.
//!
//! Each grading yields exactly one [`Diagnostic`]. The builder functions
//! here are pure mappings from validator, sandbox and comparator outcomes.

use serde::Serialize;
use sqlgrade_core::validate::{partition_issues, ColumnIssue, TableIssue};
use sqlgrade_core::{ParseError, ValidationIssue};
use sqlgrade_sqlite::{ExecutionFailure, Value};

use crate::grader::Stage;

/// Shown to the learner when the reference answer itself is broken.
pub const REFERENCE_FAILURE_MESSAGE: &str =
    "The reference answer for this question could not be run, so your query could not be graded. \
     The question has been flagged for review.";

/// The failure class a diagnostic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    SyntaxError,
    SemanticError,
    ExecutionError,
    ResultMismatch,
}

/// The outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "error_type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// The query is outside the parseable subset.
    SyntaxError {
        message: String,
        position: Option<usize>,
    },
    /// The query names tables or columns the schema does not have.
    SemanticError {
        invalid_tables: Vec<TableIssue>,
        invalid_columns: Vec<ColumnIssue>,
    },
    /// The query ran but its result differs from the reference result.
    ResultMismatch(ResultMismatch),
    /// The query could not be run to completion.
    ExecutionError { message: String },
    /// The result matches the reference result.
    Correct,
}

impl Diagnostic {
    /// Returns the failure class, or `None` for [`Diagnostic::Correct`].
    #[must_use]
    pub const fn error_type(&self) -> Option<ErrorType> {
        match self {
            Self::SyntaxError { .. } => Some(ErrorType::SyntaxError),
            Self::SemanticError { .. } => Some(ErrorType::SemanticError),
            Self::ResultMismatch(_) => Some(ErrorType::ResultMismatch),
            Self::ExecutionError { .. } => Some(ErrorType::ExecutionError),
            Self::Correct => None,
        }
    }

    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }

    /// Builds a syntax diagnostic from a parse failure.
    #[must_use]
    pub fn syntax(err: &ParseError) -> Self {
        Self::SyntaxError {
            message: err.message.clone(),
            position: Some(err.position()),
        }
    }

    /// Builds a semantic diagnostic, or `None` when there are no issues.
    #[must_use]
    pub fn semantic(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() {
            return None;
        }
        let (invalid_tables, invalid_columns) = partition_issues(issues);
        Some(Self::SemanticError {
            invalid_tables,
            invalid_columns,
        })
    }

    /// Builds an execution diagnostic from a failure of the learner's query.
    #[must_use]
    pub fn execution(failure: &ExecutionFailure) -> Self {
        match failure {
            // Parse errors caught by the allowlist keep their position.
            ExecutionFailure::Syntax {
                message,
                position: Some(position),
            } => Self::SyntaxError {
                message: message.clone(),
                position: Some(*position),
            },
            other => Self::ExecutionError {
                message: other.to_string(),
            },
        }
    }

    /// Builds the diagnostic shown when the reference side fails.
    #[must_use]
    pub fn reference_failure() -> Self {
        Self::ExecutionError {
            message: String::from(REFERENCE_FAILURE_MESSAGE),
        }
    }
}

/// How a student result differs from the reference result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultMismatch {
    /// Student result columns, as returned.
    pub student_columns: Vec<String>,
    /// Reference result columns, as returned.
    pub answer_columns: Vec<String>,
    /// Student row count.
    pub student_rows: usize,
    /// Reference row count.
    pub answer_rows: usize,
    /// Reference columns the student result lacks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
    /// Student columns the reference result lacks.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_columns: Vec<String>,
    /// Whether rows were compared by position.
    pub order_sensitive: bool,
    /// Row-level differences. Empty when the columns differ.
    pub comparison_details: Vec<ComparisonDetail>,
}

/// How a row differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    /// Both sides have the row, with different cells.
    Mismatch,
    /// Only the reference has the row.
    Missing,
    /// Only the student has the row.
    Extra,
}

/// Differences found in one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonDetail {
    /// 1-based row index: positional for ordered comparisons, else the
    /// row's index on the side it came from.
    pub row: usize,
    pub status: RowStatus,
    pub differences: Vec<CellDifference>,
}

/// One differing cell. A side that has no such row omits its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDifference {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_value: Option<Value>,
}

/// Raised when the reference side of a question is broken. Attached to the
/// report so the submission service can escalate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationFault {
    pub question_id: String,
    pub stage: Stage,
    pub message: String,
}

/// The grading result returned to the submission service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub is_correct: bool,
    pub error_type: Option<ErrorType>,
    pub detailed_errors: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_fault: Option<ConfigurationFault>,
}

impl GradeReport {
    /// Wraps a diagnostic.
    #[must_use]
    pub fn new(diagnostic: Diagnostic) -> Self {
        Self {
            is_correct: diagnostic.is_correct(),
            error_type: diagnostic.error_type(),
            detailed_errors: vec![diagnostic],
            configuration_fault: None,
        }
    }

    /// Reports a broken reference answer.
    #[must_use]
    pub fn reference_fault(fault: ConfigurationFault) -> Self {
        Self {
            configuration_fault: Some(fault),
            ..Self::new(Diagnostic::reference_failure())
        }
    }

    /// Returns the single diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.detailed_errors.first()
    }
}
