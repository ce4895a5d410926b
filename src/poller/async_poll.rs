//! Async flavour of the poll loop, for conditions that are themselves futures.
//!
//! Timing comes from `tokio::time`, so paused-time tests drive it
//! deterministically. Each sleep races the cancellation token, so a cancel
//! ends the wait as soon as it fires, matching the blocking loop.

use std::future::Future;

use tokio::time::Instant;
use tracing::debug;

use super::fluent::{LoopState, Step};
use super::{Evaluation, Outcome, Poller};

impl Poller {
    /// Polls an async condition until it is satisfied.
    ///
    /// Same contract as [`Poller::until`]; the configured clock is not used.
    pub async fn until_async<T, F, Fut>(&self, mut condition: F) -> Outcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Evaluation<T>>,
    {
        debug!(timeout = ?self.timeout(), interval = ?self.interval(), "starting async wait");
        let started = Instant::now();
        let mut state = LoopState::default();

        loop {
            state.attempts += 1;
            let evaluation = condition().await;
            let elapsed = started.elapsed();

            match self.step(&mut state, evaluation, elapsed) {
                Step::Done(outcome) => return outcome,
                Step::Sleep(pause) => {
                    tokio::select! {
                        _ = self.cancel_token().cancelled() => {
                            return self.cancelled(&state, started.elapsed());
                        }
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
            }
        }
    }
}
