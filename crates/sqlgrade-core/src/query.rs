//! Submitted query text.

use std::fmt;

/// Which side of a grading a query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryRole {
    /// The learner's answer.
    Student,
    /// The question's reference answer.
    Reference,
}

impl QueryRole {
    /// Returns the role name used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for QueryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw SQL text tagged with its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlQuery {
    /// The SQL text as submitted.
    pub text: String,
    /// Student or reference.
    pub role: QueryRole,
}

impl SqlQuery {
    /// Creates a learner query.
    #[must_use]
    pub fn student(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: QueryRole::Student,
        }
    }

    /// Creates a reference query.
    #[must_use]
    pub fn reference(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role: QueryRole::Reference,
        }
    }
}
