//! Failure classification and the crate's error types.
//!
//! Conditions report failures as [`ConditionError`] values. A [`TransientSet`]
//! decides which of them mean "not ready yet"; the [`ErrorDetector`] turns raw
//! collaborator text into a category. [`WaitError`] is what a wait returns
//! once it has been converted into a `Result`.

pub mod classification;
pub mod detector;

use std::time::Duration;

use thiserror::Error;

// Re-export main types for convenient access
pub use classification::{ConditionError, ErrorCategory, TransientSet};
pub use detector::{ErrorDetector, ErrorPattern};

/// Terminal failure of a wait.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The deadline elapsed without the condition being satisfied.
    #[error("timed out after {elapsed:?} ({attempts} attempts){}", describe(.message, .last_error))]
    Timeout {
        /// Time spent polling.
        elapsed: Duration,
        /// Number of condition evaluations performed.
        attempts: u32,
        /// Caller-supplied message, if any.
        message: Option<String>,
        /// The last transient failure swallowed before giving up.
        last_error: Option<ConditionError>,
    },

    /// The condition raised a failure outside the transient set.
    #[error("condition failed: {0}")]
    Fatal(#[source] ConditionError),

    /// The wait was cancelled through its token.
    #[error("wait cancelled after {elapsed:?} ({attempts} attempts)")]
    Cancelled {
        /// Time spent polling.
        elapsed: Duration,
        /// Number of condition evaluations performed.
        attempts: u32,
    },
}

impl WaitError {
    /// Returns true for [`WaitError::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    /// Returns true for [`WaitError::Fatal`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, WaitError::Fatal(_))
    }

    /// Returns true for [`WaitError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }
}

fn describe(message: &Option<String>, last_error: &Option<ConditionError>) -> String {
    let mut out = String::new();
    if let Some(message) = message {
        out.push_str(": ");
        out.push_str(message);
    }
    if let Some(error) = last_error {
        out.push_str(&format!(" (last error: {})", error));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_includes_message_and_last_error() {
        let err = WaitError::Timeout {
            elapsed: Duration::from_secs(2),
            attempts: 5,
            message: Some("waiting for #submit".to_string()),
            last_error: Some(ConditionError::not_found("no match")),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("timed out after 2s (5 attempts): waiting for #submit"));
        assert!(rendered.ends_with("(last error: not_found: no match)"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_fatal_exposes_source() {
        use std::error::Error as _;
        let err = WaitError::Fatal(ConditionError::permission_denied("403"));
        assert!(err.is_fatal());
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "condition failed: permission_denied: 403");
    }

    #[test]
    fn test_cancelled() {
        let err = WaitError::Cancelled {
            elapsed: Duration::ZERO,
            attempts: 1,
        };
        assert!(err.is_cancelled());
        assert!(!err.is_timeout());
    }
}
