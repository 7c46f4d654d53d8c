//! The grading pipeline.
//!
//! A submission moves through [`Stage::Validating`], [`Stage::Executing`]
//! and [`Stage::Comparing`] and stops at the first stage that finds a
//! problem. Learner-side problems become the report's diagnostic. Problems
//! with the reference answer become a [`ConfigurationFault`] on the report.

use std::fmt;

use serde::Serialize;
use sqlgrade_core::{parse_script, validate, Schema, SqlQuery, Statement, ValidationIssue};
use sqlgrade_sqlite::{ResultSet, Sandbox};
use tracing::{debug, error, info, warn};

use crate::catalog::{Question, QuestionBank};
use crate::compare::{Comparator, ComparisonOutcome};
use crate::config::GraderConfig;
use crate::diagnostic::{ConfigurationFault, Diagnostic, GradeReport};
use crate::error::{GradeError, Result};

/// Pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validating,
    Executing,
    Comparing,
    Done,
}

impl Stage {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Comparing => "comparing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A learner's answer to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub question_id: String,
    pub student_sql: String,
}

impl Submission {
    #[must_use]
    pub fn new(question_id: impl Into<String>, student_sql: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            student_sql: student_sql.into(),
        }
    }
}

/// Either the value a stage produced, or the report that ends the grading.
enum Step<T> {
    Continue(T),
    Finish(GradeReport),
}

/// Grades submissions against the questions of a [`QuestionBank`].
pub struct Grader<B> {
    bank: B,
    sandbox: Sandbox,
    comparator: Comparator,
    config: GraderConfig,
}

impl<B: QuestionBank> Grader<B> {
    /// Creates a grader.
    #[must_use]
    pub fn new(bank: B, config: GraderConfig) -> Self {
        Self {
            bank,
            sandbox: Sandbox::new(config.sandbox_limits()),
            comparator: Comparator::new(config.float_epsilon),
            config,
        }
    }

    /// Returns the question bank.
    #[must_use]
    pub const fn bank(&self) -> &B {
        &self.bank
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grades a submission.
    ///
    /// # Errors
    ///
    /// Returns a `GradeError` if the question or its schema is unknown, or
    /// the sandbox fails. A wrong or broken learner query is not an error.
    pub async fn grade(&self, submission: &Submission) -> Result<GradeReport> {
        let question = self
            .bank
            .question(&submission.question_id)
            .ok_or_else(|| GradeError::UnknownQuestion(submission.question_id.clone()))?;
        let schema = self
            .bank
            .schema(&question.schema_id)
            .ok_or_else(|| GradeError::UnknownSchema(question.schema_id.clone()))?;
        self.grade_question(&question, &schema, &submission.student_sql)
            .await
    }

    /// Grades `student_sql` as an answer to `question` over `schema`.
    ///
    /// # Errors
    ///
    /// Returns a `GradeError` if the sandbox fails.
    pub async fn grade_question(
        &self,
        question: &Question,
        schema: &Schema,
        student_sql: &str,
    ) -> Result<GradeReport> {
        let question_id = question.question_id.as_str();
        info!(question = question_id, schema = %schema.id, "Grading submission");

        debug!(question = question_id, stage = %Stage::Validating, "Entering stage");
        if let Some(report) = validate_submission(question, schema, student_sql) {
            return Ok(report);
        }

        debug!(question = question_id, stage = %Stage::Executing, "Entering stage");
        let (student, reference) = match self.execute(question, schema, student_sql).await? {
            Step::Continue(results) => results,
            Step::Finish(report) => return Ok(report),
        };

        debug!(question = question_id, stage = %Stage::Comparing, "Entering stage");
        let order_sensitive = question
            .order_sensitive
            .unwrap_or(self.config.default_order_sensitive);
        let diagnostic = match self.comparator.compare(&student, &reference, order_sensitive) {
            ComparisonOutcome::Correct => Diagnostic::Correct,
            ComparisonOutcome::Mismatch(mismatch) => Diagnostic::ResultMismatch(mismatch),
        };
        Ok(finish(question_id, GradeReport::new(diagnostic)))
    }

    async fn execute(
        &self,
        question: &Question,
        schema: &Schema,
        student_sql: &str,
    ) -> Result<Step<(ResultSet, ResultSet)>> {
        let question_id = question.question_id.as_str();
        let student = match self
            .sandbox
            .execute(&SqlQuery::student(student_sql), schema)
            .await?
        {
            Ok(result) => result,
            Err(failure) => {
                let report = GradeReport::new(Diagnostic::execution(&failure));
                return Ok(Step::Finish(finish(question_id, report)));
            }
        };
        let reference = match self
            .sandbox
            .execute(&SqlQuery::reference(&question.answer_sql), schema)
            .await?
        {
            Ok(result) => result,
            Err(failure) => {
                let message = format!("reference answer failed: {failure}");
                return Ok(Step::Finish(reference_fault(
                    question_id,
                    Stage::Executing,
                    message,
                )));
            }
        };
        Ok(Step::Continue((student, reference)))
    }
}

/// Parses and validates the student query, then the reference answer.
/// Returns the report that ends the grading, if any.
fn validate_submission(
    question: &Question,
    schema: &Schema,
    student_sql: &str,
) -> Option<GradeReport> {
    let question_id = question.question_id.as_str();
    let statements = match parse_script(student_sql) {
        Ok(statements) if statements.is_empty() => {
            let diagnostic = Diagnostic::SyntaxError {
                message: String::from("empty query"),
                position: None,
            };
            return Some(finish(question_id, GradeReport::new(diagnostic)));
        }
        Ok(statements) => statements,
        Err(err) => {
            warn!(question = question_id, error = %err, "Student query does not parse");
            return Some(finish(question_id, GradeReport::new(Diagnostic::syntax(&err))));
        }
    };
    if let Some(diagnostic) = Diagnostic::semantic(validate(&statements, schema)) {
        warn!(question = question_id, "Student query references unknown names");
        return Some(finish(question_id, GradeReport::new(diagnostic)));
    }

    check_reference(&question.answer_sql, schema)
        .err()
        .map(|message| reference_fault(question_id, Stage::Validating, message))
}

fn reference_fault(question_id: &str, stage: Stage, message: String) -> GradeReport {
    error!(question = question_id, %stage, error = %message, "Reference answer is broken");
    let report = GradeReport::reference_fault(ConfigurationFault {
        question_id: question_id.to_string(),
        stage,
        message,
    });
    finish(question_id, report)
}

fn finish(question_id: &str, report: GradeReport) -> GradeReport {
    debug!(question = question_id, stage = %Stage::Done, "Entering stage");
    info!(
        question = question_id,
        is_correct = report.is_correct,
        error_type = ?report.error_type,
        "Submission graded"
    );
    report
}

/// Checks that the reference answer parses, is a single query and names
/// only what the schema has.
fn check_reference(answer_sql: &str, schema: &Schema) -> std::result::Result<(), String> {
    let statements =
        parse_script(answer_sql).map_err(|err| format!("reference answer does not parse: {err}"))?;
    if !matches!(statements.as_slice(), [Statement::Query(_)]) {
        return Err(String::from(
            "reference answer is not a single SELECT statement",
        ));
    }
    let issues = validate(&statements, schema);
    if issues.is_empty() {
        return Ok(());
    }
    let names: Vec<String> = issues
        .iter()
        .map(|issue| match issue {
            ValidationIssue::InvalidTable(t) => format!("{} ({})", t.table, t.reason),
            ValidationIssue::InvalidColumn(c) => {
                format!("{} ({})", c.column, c.reason)
            }
        })
        .collect();
    Err(format!(
        "reference answer has invalid references: {}",
        names.join("; ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::from_json(
            "s",
            None,
            r#"{"tables": [{"name": "users", "columns": [{"name": "id"}]}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_check_reference() {
        assert!(check_reference("SELECT id FROM users", &schema()).is_ok());

        let err = check_reference("SELECT id FROM usrs", &schema()).unwrap_err();
        assert_eq!(
            err,
            "reference answer has invalid references: usrs (table not found in schema)"
        );

        let err = check_reference("DELETE FROM users", &schema()).unwrap_err();
        assert!(err.contains("not a single SELECT"));

        let err = check_reference("SELECT FROM", &schema()).unwrap_err();
        assert!(err.starts_with("reference answer does not parse"));
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Comparing.to_string(), "comparing");
        assert_eq!(
            serde_json::to_value(Stage::Validating).unwrap(),
            serde_json::json!("validating")
        );
    }
}
