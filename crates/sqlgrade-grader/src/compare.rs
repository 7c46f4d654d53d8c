//! Result set comparison.
//!
//! Columns are matched by normalized name, regardless of position. Rows are
//! matched by position when order matters, otherwise as multisets. Cells
//! compare by value: numbers numerically within a relative tolerance, and
//! NULL only equal to NULL.

use std::collections::HashSet;

use sqlgrade_sqlite::{ResultSet, Value};

use crate::diagnostic::{CellDifference, ComparisonDetail, ResultMismatch, RowStatus};

/// Result of comparing a student result set against the reference.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    Correct,
    Mismatch(ResultMismatch),
}

impl ComparisonOutcome {
    #[must_use]
    pub const fn is_correct(&self) -> bool {
        matches!(self, Self::Correct)
    }
}

/// Compares result sets cell by cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparator {
    epsilon: f64,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

/// A shared column: its display name and its index on each side.
struct Aligned<'a> {
    name: &'a str,
    student: usize,
    answer: usize,
}

impl Comparator {
    /// Creates a comparator with the given relative float tolerance.
    #[must_use]
    pub const fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Compares `student` against `reference`.
    #[must_use]
    pub fn compare(
        &self,
        student: &ResultSet,
        reference: &ResultSet,
        order_sensitive: bool,
    ) -> ComparisonOutcome {
        let mut mismatch = ResultMismatch {
            student_columns: student.column_names(),
            answer_columns: reference.column_names(),
            student_rows: student.len(),
            answer_rows: reference.len(),
            missing_columns: missing_from(student, reference),
            extra_columns: missing_from(reference, student),
            order_sensitive,
            comparison_details: Vec::new(),
        };
        if !mismatch.missing_columns.is_empty() || !mismatch.extra_columns.is_empty() {
            return ComparisonOutcome::Mismatch(mismatch);
        }

        let columns = align_columns(student, reference);
        mismatch.comparison_details = if order_sensitive {
            self.compare_ordered(student, reference, &columns)
        } else {
            self.compare_unordered(student, reference, &columns)
        };

        if mismatch.comparison_details.is_empty() && student.len() == reference.len() {
            ComparisonOutcome::Correct
        } else {
            ComparisonOutcome::Mismatch(mismatch)
        }
    }

    fn compare_ordered(
        &self,
        student: &ResultSet,
        reference: &ResultSet,
        columns: &[Aligned<'_>],
    ) -> Vec<ComparisonDetail> {
        let mut details = Vec::new();
        for (index, (s, a)) in student.rows.iter().zip(&reference.rows).enumerate() {
            let differences: Vec<CellDifference> = columns
                .iter()
                .filter(|c| !self.values_equal(&s[c.student], &a[c.answer]))
                .map(|c| CellDifference {
                    column: c.name.to_string(),
                    student_value: Some(s[c.student].clone()),
                    answer_value: Some(a[c.answer].clone()),
                })
                .collect();
            if !differences.is_empty() {
                details.push(ComparisonDetail {
                    row: index + 1,
                    status: RowStatus::Mismatch,
                    differences,
                });
            }
        }

        let overlap = student.len().min(reference.len());
        for (index, row) in reference.rows.iter().enumerate().skip(overlap) {
            details.push(whole_row(index, row, RowStatus::Missing, columns));
        }
        for (index, row) in student.rows.iter().enumerate().skip(overlap) {
            details.push(whole_row(index, row, RowStatus::Extra, columns));
        }
        details
    }

    fn compare_unordered(
        &self,
        student: &ResultSet,
        reference: &ResultSet,
        columns: &[Aligned<'_>],
    ) -> Vec<ComparisonDetail> {
        let owner = self.match_rows(student, reference, columns);
        let mut matched = vec![false; reference.len()];
        for answer in owner.iter().flatten() {
            matched[*answer] = true;
        }

        let mut details = Vec::new();
        for (index, row) in reference.rows.iter().enumerate() {
            if !matched[index] {
                details.push(whole_row(index, row, RowStatus::Missing, columns));
            }
        }
        for (index, row) in student.rows.iter().enumerate() {
            if owner[index].is_none() {
                details.push(whole_row(index, row, RowStatus::Extra, columns));
            }
        }
        details
    }

    /// Pairs as many reference rows as possible with equal student rows
    /// (maximum bipartite matching). Tolerant equality is not transitive,
    /// so the pairing may not depend on row order.
    ///
    /// Returns, for each student row, the reference row it is paired with.
    fn match_rows(
        &self,
        student: &ResultSet,
        reference: &ResultSet,
        columns: &[Aligned<'_>],
    ) -> Vec<Option<usize>> {
        let candidates: Vec<Vec<usize>> = reference
            .rows
            .iter()
            .map(|answer_row| {
                student
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, student_row)| self.rows_equal(student_row, answer_row, columns))
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();

        let mut owner = vec![None; student.len()];
        let mut visited = vec![false; student.len()];
        for answer in 0..reference.len() {
            visited.fill(false);
            augment(answer, &candidates, &mut owner, &mut visited);
        }
        owner
    }

    fn rows_equal(&self, student: &[Value], answer: &[Value], columns: &[Aligned<'_>]) -> bool {
        columns
            .iter()
            .all(|c| self.values_equal(&student[c.student], &answer[c.answer]))
    }

    /// Type-aware cell equality.
    #[must_use]
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Integer(x), Value::Integer(y)) => x == y,
            (Value::Blob(x), Value::Blob(y)) => x == y,
            (Value::Text(x), Value::Text(y)) if x == y => true,
            _ => match (a.as_number(), b.as_number()) {
                (Some(x), Some(y)) => self.numbers_equal(x, y),
                _ => false,
            },
        }
    }

    fn numbers_equal(&self, x: f64, y: f64) -> bool {
        let scale = 1f64.max(x.abs()).max(y.abs());
        (x - y).abs() <= self.epsilon * scale
    }
}

/// Finds a student row for reference row `answer`, moving earlier pairings
/// to other candidates when that frees one up.
fn augment(
    answer: usize,
    candidates: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &student in &candidates[answer] {
        if visited[student] {
            continue;
        }
        visited[student] = true;
        let free = match owner[student] {
            None => true,
            Some(other) => augment(other, candidates, owner, visited),
        };
        if free {
            owner[student] = Some(answer);
            return true;
        }
    }
    false
}

/// Display names of `b`'s columns that `a` lacks, deduplicated.
fn missing_from(a: &ResultSet, b: &ResultSet) -> Vec<String> {
    let present: HashSet<&str> = a.columns.iter().map(|c| c.key.as_str()).collect();
    let mut seen = HashSet::new();
    b.columns
        .iter()
        .filter(|c| !present.contains(c.key.as_str()) && seen.insert(c.key.as_str()))
        .map(|c| c.value.clone())
        .collect()
}

/// Pairs each distinct reference column with the same-named student
/// column. Assumes the two sides have the same column names.
fn align_columns<'a>(student: &ResultSet, reference: &'a ResultSet) -> Vec<Aligned<'a>> {
    let mut seen = HashSet::new();
    reference
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| seen.insert(c.key.as_str()))
        .filter_map(|(answer, c)| {
            student.column_index(&c.key).map(|student| Aligned {
                name: &c.value,
                student,
                answer,
            })
        })
        .collect()
}

fn whole_row(
    index: usize,
    row: &[Value],
    status: RowStatus,
    columns: &[Aligned<'_>],
) -> ComparisonDetail {
    let differences = columns
        .iter()
        .map(|c| match status {
            RowStatus::Extra => CellDifference {
                column: c.name.to_string(),
                student_value: Some(row[c.student].clone()),
                answer_value: None,
            },
            RowStatus::Missing | RowStatus::Mismatch => CellDifference {
                column: c.name.to_string(),
                student_value: None,
                answer_value: Some(row[c.answer].clone()),
            },
        })
        .collect();
    ComparisonDetail {
        row: index + 1,
        status,
        differences,
    }
}
