//! Waitron - deadline-bounded condition polling
//!
//! Synchronizes a caller with an external resource whose state changes on
//! its own schedule: evaluate a condition, sleep, repeat, until it holds, a
//! non-retriable failure shows up, or the deadline passes.
//!
//! ```
//! use std::time::Duration;
//! use waitron::poller::{poll, Evaluation, Outcome};
//! use waitron::TransientSet;
//!
//! let mut remaining = 2;
//! let outcome = poll(
//!     || {
//!         if remaining == 0 {
//!             Evaluation::Satisfied("ready")
//!         } else {
//!             remaining -= 1;
//!             Evaluation::NotYetSatisfied
//!         }
//!     },
//!     Duration::from_secs(1),
//!     Duration::from_millis(10),
//!     &TransientSet::default(),
//! );
//! assert_eq!(outcome, Outcome::Success("ready"));
//! ```

pub mod cancel;
pub mod clock;
pub mod conditions;
pub mod config;
pub mod error;
pub mod logging;
pub mod poller;
pub mod session;

pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use crate::config::{WaitConfig, WaitConfigError};
pub use error::{ConditionError, ErrorCategory, TransientSet, WaitError};
pub use poller::{poll, wait_until, Evaluation, Outcome, Poller};
pub use session::{AmbientTimeout, Session};
