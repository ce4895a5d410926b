//! Deadline-bounded condition polling.
//!
//! A condition is any re-invocable closure returning an [`Evaluation`]. The
//! poll loop evaluates it, sleeps `min(interval, remaining)` between attempts
//! and ends with exactly one [`Outcome`]:
//!
//! - the condition is checked before the deadline on every iteration, so a
//!   condition that becomes satisfied right at the deadline still succeeds;
//! - at least one evaluation happens even with a zero deadline;
//! - a failure outside the [`TransientSet`] ends the loop immediately.
//!
//! Two entry points share one loop: the explicit [`wait_until`] (fixed
//! interval, only "not found" retried) and the fluent [`Poller`] builder.

mod async_poll;
mod fluent;

use std::time::Duration;

use crate::error::{ConditionError, TransientSet, WaitError};

pub use fluent::Poller;

/// Interval used when the caller does not pick one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Timeout used by a [`Poller`] built without one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Smallest interval the loop will sleep for; zero intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Result of evaluating a condition once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation<T> {
    /// The condition holds; the value is handed back to the caller.
    Satisfied(T),
    /// The condition does not hold yet.
    NotYetSatisfied,
    /// Evaluating the condition failed.
    Failed(ConditionError),
}

impl<T> Evaluation<T> {
    /// `Some(v)` is satisfied, `None` is not yet.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Evaluation::Satisfied(value),
            None => Evaluation::NotYetSatisfied,
        }
    }

    /// Lifts a fallible lookup returning an optional value.
    pub fn from_result(result: Result<Option<T>, ConditionError>) -> Self {
        match result {
            Ok(value) => Self::from_option(value),
            Err(error) => Evaluation::Failed(error),
        }
    }

    /// Transforms the satisfied value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Evaluation<U> {
        match self {
            Evaluation::Satisfied(value) => Evaluation::Satisfied(f(value)),
            Evaluation::NotYetSatisfied => Evaluation::NotYetSatisfied,
            Evaluation::Failed(error) => Evaluation::Failed(error),
        }
    }

    /// Returns true for [`Evaluation::Satisfied`].
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Evaluation::Satisfied(_))
    }
}

impl Evaluation<()> {
    /// `true` is satisfied, `false` is not yet.
    pub fn from_bool(holds: bool) -> Self {
        if holds {
            Evaluation::Satisfied(())
        } else {
            Evaluation::NotYetSatisfied
        }
    }
}

impl<T> From<Option<T>> for Evaluation<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

impl<T> From<Result<Option<T>, ConditionError>> for Evaluation<T> {
    fn from(result: Result<Option<T>, ConditionError>) -> Self {
        Self::from_result(result)
    }
}

impl From<bool> for Evaluation<()> {
    fn from(holds: bool) -> Self {
        Self::from_bool(holds)
    }
}

/// Why a wait gave up at its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutReport {
    /// Configured deadline.
    pub timeout: Duration,
    /// Time actually spent polling.
    pub elapsed: Duration,
    /// Number of condition evaluations.
    pub attempts: u32,
    /// Caller-supplied message.
    pub message: Option<String>,
    /// Last transient failure swallowed, if the last attempts failed.
    pub last_error: Option<ConditionError>,
}

/// How far a cancelled wait got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelReport {
    /// Time spent polling before the cancel was observed.
    pub elapsed: Duration,
    /// Number of condition evaluations.
    pub attempts: u32,
}

/// Terminal result of one poll invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The condition was satisfied.
    Success(T),
    /// The deadline passed first.
    TimedOut(TimeoutReport),
    /// The condition raised a non-transient failure.
    Fatal(ConditionError),
    /// The caller's cancellation token fired.
    Cancelled(CancelReport),
}

impl<T> Outcome<T> {
    /// Returns true for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns true for [`Outcome::TimedOut`].
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Outcome::TimedOut(_))
    }

    /// Returns true for [`Outcome::Fatal`].
    pub fn is_fatal(&self) -> bool {
        matches!(self, Outcome::Fatal(_))
    }

    /// Returns true for [`Outcome::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled(_))
    }

    /// The satisfied value, discarding failure details.
    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Transforms the satisfied value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::TimedOut(report) => Outcome::TimedOut(report),
            Outcome::Fatal(error) => Outcome::Fatal(error),
            Outcome::Cancelled(report) => Outcome::Cancelled(report),
        }
    }

    /// Converts into a `Result`, keeping timeout and fatal failures distinct.
    pub fn into_result(self) -> Result<T, WaitError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::TimedOut(report) => Err(WaitError::Timeout {
                elapsed: report.elapsed,
                attempts: report.attempts,
                message: report.message,
                last_error: report.last_error,
            }),
            Outcome::Fatal(error) => Err(WaitError::Fatal(error)),
            Outcome::Cancelled(report) => Err(WaitError::Cancelled {
                elapsed: report.elapsed,
                attempts: report.attempts,
            }),
        }
    }
}

/// Polls `condition` until it is satisfied, fails fatally, or `deadline` passes.
///
/// `interval` is the pause between evaluations and `transient` decides which
/// failures are retried.
pub fn poll<T, F>(
    condition: F,
    deadline: Duration,
    interval: Duration,
    transient: &TransientSet,
) -> Outcome<T>
where
    F: FnMut() -> Evaluation<T>,
{
    Poller::new(deadline)
        .polling_every(interval)
        .ignoring(transient.clone())
        .until(condition)
}

/// Polls with [`DEFAULT_POLL_INTERVAL`], retrying only "not found" failures.
pub fn wait_until<T, F>(condition: F, timeout: Duration) -> Outcome<T>
where
    F: FnMut() -> Evaluation<T>,
{
    poll(
        condition,
        timeout,
        DEFAULT_POLL_INTERVAL,
        &TransientSet::default(),
    )
}
