//! Cooperative cancellation for poll loops.
//!
//! A poll loop only ever blocks inside its inter-evaluation sleep, so the
//! token is a flag plus a condition variable for blocking sleepers and a
//! `Notify` for async ones. Cancelling wakes both immediately instead of
//! letting them wait out the interval.

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    cancelled: Mutex<bool>,
    wake: Condvar,
    notify: Notify,
}

/// Clonable cancellation flag shared between a waiter and whoever may abort it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

impl CancellationToken {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the token and wakes every thread sleeping on it.
    pub fn cancel(&self) {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *cancelled = true;
        self.inner.wake.notify_all();
        self.inner.notify.notify_waiters();
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        *self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for up to `timeout`, returning early if the token is cancelled.
    ///
    /// Returns true if the token was cancelled. A timeout too large to
    /// represent as an `Instant` waits for cancellation only.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let mut cancelled = self
            .inner
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !*cancelled {
                cancelled = self
                    .inner
                    .wake
                    .wait(cancelled)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            return true;
        };
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let (guard, _) = self
                .inner
                .wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            cancelled = guard;
        }
        *cancelled
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Cancels this token when the process receives Ctrl+C.
    ///
    /// Only one handler can be installed per process; a second call returns
    /// the `ctrlc` error.
    pub fn install_interrupt_handler(&self) -> Result<(), ctrlc::Error> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            tracing::debug!("interrupt received, cancelling pending waits");
            token.cancel();
        })
    }
}
