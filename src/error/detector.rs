//! Regex-based failure detector.
//!
//! Lookup collaborators often surface failures as plain text (driver error
//! strings, HTTP status lines). The detector maps that text onto an
//! [`ErrorCategory`] so the poller can classify it like any other failure.

use regex::Regex;
use std::sync::OnceLock;

use super::{ConditionError, ErrorCategory};

/// A pattern for matching failure text.
#[derive(Debug)]
pub struct ErrorPattern {
    /// The compiled regex pattern.
    regex: Regex,
    /// The category to assign when this pattern matches.
    category: ErrorCategory,
    /// A human-readable description of what this pattern detects.
    description: String,
}

impl ErrorPattern {
    /// Creates a new error pattern.
    ///
    /// # Panics
    /// Panics if the regex pattern is invalid.
    pub fn new(pattern: &str, category: ErrorCategory, description: impl Into<String>) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex pattern"),
            category,
            description: description.into(),
        }
    }

    /// Creates a new error pattern with a pre-compiled regex.
    pub fn with_regex(regex: Regex, category: ErrorCategory, description: impl Into<String>) -> Self {
        Self {
            regex,
            category,
            description: description.into(),
        }
    }

    /// Returns the category assigned on match.
    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    /// Returns the description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Checks if this pattern matches the given text.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Finds the first match in the text and returns the matched string.
    pub fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.regex.find(text).map(|m| m.as_str())
    }
}

/// Maps raw failure text onto error categories, first match wins.
#[derive(Debug)]
pub struct ErrorDetector {
    patterns: Vec<ErrorPattern>,
}

impl Default for ErrorDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorDetector {
    /// Creates a detector with the built-in patterns.
    pub fn new() -> Self {
        Self {
            patterns: Self::default_patterns(),
        }
    }

    /// Creates a detector with custom patterns.
    pub fn with_patterns(patterns: Vec<ErrorPattern>) -> Self {
        Self { patterns }
    }

    /// Process-wide detector with the built-in patterns.
    pub fn shared() -> &'static ErrorDetector {
        static SHARED: OnceLock<ErrorDetector> = OnceLock::new();
        SHARED.get_or_init(ErrorDetector::new)
    }

    fn default_patterns() -> Vec<ErrorPattern> {
        vec![
            // Stale before not-found: "stale element reference ... not found in cache"
            ErrorPattern::new(
                r"(?i)\bstale\b|\bdetached\b|no longer attached",
                ErrorCategory::Stale,
                "Stale handle",
            ),
            ErrorPattern::new(
                r"(?i)no\s+such\s+(element|resource)|\bnot\s+found\b|unable\s+to\s+locate|\b404\b",
                ErrorCategory::NotFound,
                "Lookup matched nothing",
            ),
            ErrorPattern::new(
                r"(?i)not\s+interactable|click\s+intercepted|element\s+is\s+disabled|obscured",
                ErrorCategory::NotInteractable,
                "Resource refuses interaction",
            ),
            ErrorPattern::new(
                r"(?i)\b403\b|\b401\b|permission\s+denied|forbidden|unauthori[sz]ed",
                ErrorCategory::PermissionDenied,
                "Access denied",
            ),
            ErrorPattern::new(
                r"(?i)\b503\b|\b502\b|service\s+unavailable|bad\s+gateway|temporarily\s+unavailable",
                ErrorCategory::Unavailable,
                "Remote side unavailable",
            ),
            ErrorPattern::new(
                r"(?i)connection\s+(reset|refused|closed|aborted)|broken\s+pipe",
                ErrorCategory::ConnectionReset,
                "Connection dropped",
            ),
            ErrorPattern::new(
                r"(?i)invalid\s+(selector|query|locator)|syntax\s+error|\b400\b",
                ErrorCategory::InvalidQuery,
                "Malformed lookup",
            ),
            ErrorPattern::new(
                r"(?i)not\s+supported|unsupported|not\s+implemented|\b501\b",
                ErrorCategory::Unsupported,
                "Unsupported operation",
            ),
        ]
    }

    /// Adds a custom pattern, checked after the existing ones.
    pub fn add_pattern(&mut self, pattern: ErrorPattern) {
        self.patterns.push(pattern);
    }

    /// Returns the number of patterns configured.
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the category of the first matching pattern, if any.
    pub fn detect(&self, text: &str) -> Option<ErrorCategory> {
        self.patterns
            .iter()
            .find(|p| p.matches(text))
            .map(|p| p.category)
    }

    /// Like [`detect`](Self::detect) but falls back to [`ErrorCategory::Internal`].
    pub fn categorize(&self, text: &str) -> ErrorCategory {
        self.detect(text).unwrap_or(ErrorCategory::Internal)
    }

    /// Builds a [`ConditionError`] from text, recording which pattern matched.
    pub fn classify(&self, text: &str) -> ConditionError {
        for pattern in &self.patterns {
            if let Some(matched) = pattern.find(text) {
                return ConditionError::new(pattern.category, text)
                    .add_context("matched_pattern", matched)
                    .add_context("detected", pattern.description());
            }
        }
        ConditionError::new(ErrorCategory::Internal, text)
    }
}
