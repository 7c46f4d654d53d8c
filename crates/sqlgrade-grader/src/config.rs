//! Grader settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlgrade_sqlite::SandboxLimits;

/// Limits and comparison policy for a grading run.
///
/// Every field has a default, so a partial JSON object such as
/// `{"timeout_ms": 2000}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    /// Per-query execution budget in milliseconds.
    pub timeout_ms: u64,
    /// Most rows a single query may return.
    pub max_rows: usize,
    /// Relative tolerance for numeric cells, scaled by `max(1, |a|, |b|)`.
    pub float_epsilon: f64,
    /// Order policy for questions that do not set one.
    pub default_order_sensitive: bool,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_rows: 1000,
            float_epsilon: 1e-6,
            default_order_sensitive: false,
        }
    }
}

impl GraderConfig {
    /// Returns the sandbox limits these settings imply.
    #[must_use]
    pub const fn sandbox_limits(&self) -> SandboxLimits {
        SandboxLimits {
            timeout: Duration::from_millis(self.timeout_ms),
            max_rows: self.max_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraderConfig::default();
        assert_eq!(config.sandbox_limits(), SandboxLimits::default());
        assert!(!config.default_order_sensitive);
    }

    #[test]
    fn test_partial_json() {
        let config: GraderConfig =
            serde_json::from_str(r#"{"timeout_ms": 250, "default_order_sensitive": true}"#)
                .unwrap();
        assert_eq!(config.timeout_ms, 250);
        assert_eq!(config.max_rows, 1000);
        assert!(config.default_order_sensitive);
        assert_eq!(config.sandbox_limits().timeout, Duration::from_millis(250));
    }
}
