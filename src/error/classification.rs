//! Failure classification types for condition evaluation.
//!
//! A condition that cannot reach its resource reports a [`ConditionError`]
//! tagged with an [`ErrorCategory`]. The poller never looks at the message;
//! it asks a [`TransientSet`] whether the category (or a custom predicate)
//! means "not ready yet" or "stop now".

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// The category of a failure raised while evaluating a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The lookup matched nothing.
    NotFound,
    /// A previously obtained handle no longer refers to a live resource.
    Stale,
    /// The resource exists but refuses interaction (covered, disabled, busy).
    NotInteractable,
    /// The remote side is temporarily unavailable (HTTP 503 and friends).
    Unavailable,
    /// The connection to the remote side was reset or dropped.
    ConnectionReset,
    /// The caller is not allowed to observe the resource.
    PermissionDenied,
    /// The lookup itself is malformed.
    InvalidQuery,
    /// The collaborator does not support the requested operation.
    Unsupported,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// Categories a lookup raises while a resource is still settling.
    pub const LOOKUP_FAILURES: [ErrorCategory; 3] = [
        ErrorCategory::NotFound,
        ErrorCategory::Stale,
        ErrorCategory::NotInteractable,
    ];

    /// Short machine-friendly name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Stale => "stale",
            ErrorCategory::NotInteractable => "not_interactable",
            ErrorCategory::Unavailable => "unavailable",
            ErrorCategory::ConnectionReset => "connection_reset",
            ErrorCategory::PermissionDenied => "permission_denied",
            ErrorCategory::InvalidQuery => "invalid_query",
            ErrorCategory::Unsupported => "unsupported",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure raised by a condition, with category, message and context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConditionError {
    /// The category of the failure.
    pub category: ErrorCategory,
    /// Human-readable failure message.
    pub message: String,
    /// Additional context as key-value pairs (query, attribute name, ...).
    pub context: HashMap<String, String>,
}

impl ConditionError {
    /// Creates a new condition error.
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            context: HashMap::new(),
        }
    }

    /// Shorthand for a [`ErrorCategory::NotFound`] failure.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::NotFound, message)
    }

    /// Shorthand for a [`ErrorCategory::Stale`] failure.
    pub fn stale(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Stale, message)
    }

    /// Shorthand for a [`ErrorCategory::PermissionDenied`] failure.
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::PermissionDenied, message)
    }

    /// Builds an error from raw collaborator output, using the default
    /// [`ErrorDetector`](super::ErrorDetector) to pick the category.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let category = super::ErrorDetector::shared().categorize(&message);
        Self::new(category, message)
    }

    /// Adds a context key-value pair to the error.
    pub fn add_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Returns true if the lookup matched nothing.
    pub fn is_not_found(&self) -> bool {
        self.category == ErrorCategory::NotFound
    }

    /// Returns true if the handle went stale.
    pub fn is_stale(&self) -> bool {
        self.category == ErrorCategory::Stale
    }
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)
    }
}

impl std::error::Error for ConditionError {}

type TransientPredicate = Arc<dyn Fn(&ConditionError) -> bool + Send + Sync>;

/// The set of failures a poll loop swallows and retries.
///
/// A failure is transient when its category is in the set, or when any
/// registered predicate accepts it. Everything else is fatal.
#[derive(Clone)]
pub struct TransientSet {
    categories: HashSet<ErrorCategory>,
    predicates: Vec<TransientPredicate>,
}

impl Default for TransientSet {
    /// The conventional set: only "resource not found" is retried.
    fn default() -> Self {
        Self::of([ErrorCategory::NotFound])
    }
}

impl TransientSet {
    /// An empty set: every failure is fatal.
    pub fn none() -> Self {
        Self {
            categories: HashSet::new(),
            predicates: Vec::new(),
        }
    }

    /// A set containing exactly the given categories.
    pub fn of(categories: impl IntoIterator<Item = ErrorCategory>) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            predicates: Vec::new(),
        }
    }

    /// Every category a lookup raises while the resource settles.
    pub fn lookup_failures() -> Self {
        Self::of(ErrorCategory::LOOKUP_FAILURES)
    }

    /// Adds a category.
    pub fn with(mut self, category: ErrorCategory) -> Self {
        self.categories.insert(category);
        self
    }

    /// Removes a category.
    pub fn without(mut self, category: ErrorCategory) -> Self {
        self.categories.remove(&category);
        self
    }

    /// Adds a predicate that can mark additional failures as transient.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ConditionError) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Returns true if the category is retried by this set.
    pub fn contains(&self, category: ErrorCategory) -> bool {
        self.categories.contains(&category)
    }

    /// Returns true if `error` should be swallowed and retried.
    pub fn is_transient(&self, error: &ConditionError) -> bool {
        self.categories.contains(&error.category) || self.predicates.iter().any(|p| p(error))
    }

    /// Returns true if `error` must end the poll loop.
    pub fn is_fatal(&self, error: &ConditionError) -> bool {
        !self.is_transient(error)
    }
}

impl fmt::Debug for TransientSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: Vec<_> = self.categories.iter().map(|c| c.as_str()).collect();
        categories.sort_unstable();
        f.debug_struct("TransientSet")
            .field("categories", &categories)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
