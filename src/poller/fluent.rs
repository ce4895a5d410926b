//! The configurable poller.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::{
    CancelReport, Evaluation, Outcome, TimeoutReport, DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT,
    MIN_POLL_INTERVAL,
};
use crate::cancel::CancellationToken;
use crate::clock::{Clock, SystemClock};
use crate::error::{ConditionError, ErrorCategory, TransientSet};

/// Builder-style poller: timeout, interval, retried failures and time source
/// are all caller-supplied.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use waitron::error::ErrorCategory;
/// use waitron::poller::{Evaluation, Poller};
///
/// let mut calls = 0;
/// let outcome = Poller::new(Duration::from_secs(1))
///     .polling_every(Duration::from_millis(5))
///     .ignoring_category(ErrorCategory::Stale)
///     .until(|| {
///         calls += 1;
///         if calls < 3 {
///             Evaluation::NotYetSatisfied
///         } else {
///             Evaluation::Satisfied(calls)
///         }
///     });
/// assert_eq!(outcome.success(), Some(3));
/// ```
#[derive(Clone)]
pub struct Poller {
    timeout: Duration,
    interval: Duration,
    transient: TransientSet,
    message: Option<String>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Per-invocation bookkeeping; never outlives one call.
#[derive(Default)]
pub(super) struct LoopState {
    pub(super) attempts: u32,
    last_error: Option<ConditionError>,
}

pub(super) enum Step<T> {
    Done(Outcome<T>),
    Sleep(Duration),
}

impl Poller {
    /// A poller with the given timeout, [`DEFAULT_POLL_INTERVAL`] and the
    /// default transient set.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
            transient: TransientSet::default(),
            message: None,
            clock: Arc::new(SystemClock),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the deadline, measured from the start of each wait.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the pause between evaluations. Zero is raised to [`MIN_POLL_INTERVAL`].
    pub fn polling_every(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            warn!(min = ?MIN_POLL_INTERVAL, "zero poll interval requested, clamping");
            self.interval = MIN_POLL_INTERVAL;
        } else {
            self.interval = interval;
        }
        self
    }

    /// Replaces the transient set.
    pub fn ignoring(mut self, transient: TransientSet) -> Self {
        self.transient = transient;
        self
    }

    /// Adds one category to the transient set.
    pub fn ignoring_category(mut self, category: ErrorCategory) -> Self {
        self.transient = self.transient.with(category);
        self
    }

    /// Adds several categories to the transient set.
    pub fn ignoring_all(mut self, categories: impl IntoIterator<Item = ErrorCategory>) -> Self {
        for category in categories {
            self.transient = self.transient.with(category);
        }
        self
    }

    /// Message carried by the timeout report.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lets `token` abort the wait early.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// The configured deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The configured transient set.
    pub fn transient(&self) -> &TransientSet {
        &self.transient
    }

    /// Polls until `condition` is satisfied.
    pub fn until<T, F>(&self, mut condition: F) -> Outcome<T>
    where
        F: FnMut() -> Evaluation<T>,
    {
        debug!(timeout = ?self.timeout, interval = ?self.interval, "starting wait");
        let started = self.clock.now();
        let mut state = LoopState::default();

        loop {
            state.attempts += 1;
            let evaluation = condition();
            let elapsed = self.clock.now().saturating_duration_since(started);

            match self.step(&mut state, evaluation, elapsed) {
                Step::Done(outcome) => return outcome,
                Step::Sleep(pause) => {
                    if self.clock.sleep(pause, &self.cancel) {
                        let elapsed = self.clock.now().saturating_duration_since(started);
                        return self.cancelled(&state, elapsed);
                    }
                }
            }
        }
    }

    /// Polls until `condition` stops holding.
    ///
    /// `NotYetSatisfied` and transient failures count as success; a fatal
    /// failure still ends the wait.
    pub fn until_not<T, F>(&self, mut condition: F) -> Outcome<()>
    where
        F: FnMut() -> Evaluation<T>,
    {
        let transient = &self.transient;
        self.until(move || match condition() {
            Evaluation::Satisfied(_) => Evaluation::NotYetSatisfied,
            Evaluation::NotYetSatisfied => Evaluation::Satisfied(()),
            Evaluation::Failed(error) if transient.is_transient(&error) => {
                Evaluation::Satisfied(())
            }
            Evaluation::Failed(error) => Evaluation::Failed(error),
        })
    }

    /// Polls a plain boolean predicate.
    pub fn until_true<F>(&self, mut predicate: F) -> Outcome<()>
    where
        F: FnMut() -> bool,
    {
        self.until(move || Evaluation::from_bool(predicate()))
    }

    /// Decides what follows one evaluation that finished `elapsed` after start.
    pub(super) fn step<T>(
        &self,
        state: &mut LoopState,
        evaluation: Evaluation<T>,
        elapsed: Duration,
    ) -> Step<T> {
        match evaluation {
            Evaluation::Satisfied(value) => {
                debug!(attempts = state.attempts, ?elapsed, "condition satisfied");
                return Step::Done(Outcome::Success(value));
            }
            Evaluation::Failed(error) if self.transient.is_fatal(&error) => {
                debug!(attempts = state.attempts, %error, "condition failed fatally");
                return Step::Done(Outcome::Fatal(error));
            }
            Evaluation::Failed(error) => {
                trace!(attempt = state.attempts, %error, "transient failure");
                state.last_error = Some(error);
            }
            Evaluation::NotYetSatisfied => {
                trace!(attempt = state.attempts, "not yet satisfied");
                state.last_error = None;
            }
        }

        if elapsed >= self.timeout {
            debug!(attempts = state.attempts, ?elapsed, "wait timed out");
            return Step::Done(Outcome::TimedOut(TimeoutReport {
                timeout: self.timeout,
                elapsed,
                attempts: state.attempts,
                message: self.message.clone(),
                last_error: state.last_error.take(),
            }));
        }
        if self.cancel.is_cancelled() {
            return Step::Done(self.cancelled(state, elapsed));
        }

        Step::Sleep(self.interval.min(self.timeout - elapsed))
    }

    pub(super) fn cancelled<T>(&self, state: &LoopState, elapsed: Duration) -> Outcome<T> {
        debug!(attempts = state.attempts, ?elapsed, "wait cancelled");
        Outcome::Cancelled(CancelReport {
            elapsed,
            attempts: state.attempts,
        })
    }

    pub(super) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("timeout", &self.timeout)
            .field("interval", &self.interval)
            .field("transient", &self.transient)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}
