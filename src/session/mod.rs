//! Session-scoped implicit lookups and the ambient default timeout.
//!
//! A [`Session`] wraps a [`Locator`] and carries one piece of shared mutable
//! state: the [`AmbientTimeout`]. Every implicit lookup ([`Session::find`],
//! [`Session::find_all`]) behaves as a presence wait bounded by that value.
//! Changing it changes every later implicit lookup made through the session
//! or any of its clones, and nothing records which callers rely on it.
//!
//! Prefer explicit waits ([`Session::wait`]) where the deadline is visible at
//! the call site. Sessions built with [`Session::with_config`] at least make
//! the initial ambient value traceable to a configuration value.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::debug;

use crate::conditions::{presence_of, Locator};
use crate::config::WaitConfig;
use crate::error::{ErrorCategory, WaitError};
use crate::poller::{Evaluation, Outcome, Poller};

/// State of the ambient default timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbientTimeout {
    /// Implicit lookups fail on the first miss.
    #[default]
    Unset,
    /// Implicit lookups poll for up to this long.
    Set(Duration),
}

impl AmbientTimeout {
    /// The deadline an implicit lookup runs with.
    pub fn deadline(&self) -> Duration {
        match self {
            AmbientTimeout::Unset => Duration::ZERO,
            AmbientTimeout::Set(timeout) => *timeout,
        }
    }

    /// Returns true in the `Set` state.
    pub fn is_set(&self) -> bool {
        matches!(self, AmbientTimeout::Set(_))
    }
}

impl From<Option<Duration>> for AmbientTimeout {
    fn from(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(timeout) => AmbientTimeout::Set(timeout),
            None => AmbientTimeout::Unset,
        }
    }
}

/// A locator plus the session-wide wait settings.
///
/// Clones share the ambient timeout.
#[derive(Clone)]
pub struct Session<L> {
    locator: L,
    ambient: Arc<RwLock<AmbientTimeout>>,
    template: Poller,
}

impl<L: Locator> Session<L> {
    /// A session in the `Unset` state with default polling settings.
    pub fn new(locator: L) -> Self {
        Self {
            locator,
            ambient: Arc::new(RwLock::new(AmbientTimeout::Unset)),
            template: Poller::default(),
        }
    }

    /// A session whose polling settings and initial ambient timeout come from `config`.
    pub fn with_config(locator: L, config: &WaitConfig) -> Self {
        Self {
            locator,
            ambient: Arc::new(RwLock::new(config.implicit_timeout().into())),
            template: config.poller(),
        }
    }

    /// Replaces the poller used as template for every wait (interval,
    /// transient set, clock, cancellation).
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.template = poller;
        self
    }

    /// The wrapped locator.
    pub fn locator(&self) -> &L {
        &self.locator
    }

    /// Moves the ambient timeout to `Set(timeout)`.
    pub fn set_ambient_timeout(&self, timeout: Duration) {
        let mut ambient = self.ambient.write().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*ambient, to = ?timeout, "ambient timeout changed");
        *ambient = AmbientTimeout::Set(timeout);
    }

    /// Returns the ambient timeout to `Unset`.
    pub fn clear_ambient_timeout(&self) {
        let mut ambient = self.ambient.write().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*ambient, "ambient timeout cleared");
        *ambient = AmbientTimeout::Unset;
    }

    /// The current ambient timeout.
    pub fn ambient_timeout(&self) -> AmbientTimeout {
        *self.ambient.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// A poller with an explicit deadline and the session's other settings.
    pub fn wait(&self, timeout: Duration) -> Poller {
        self.template.clone().with_timeout(timeout)
    }

    /// Implicit lookup of one resource, bounded by the ambient timeout.
    pub fn find(&self, query: &L::Query) -> Result<L::Handle, WaitError>
    where
        L::Query: fmt::Debug,
    {
        self.implicit(query)
            .until(presence_of(&self.locator, query))
            .into_result()
    }

    /// Implicit lookup of every match.
    ///
    /// Waits for at least one match up to the ambient timeout; when none
    /// shows up the result is an empty vector rather than an error.
    pub fn find_all(&self, query: &L::Query) -> Result<Vec<L::Handle>, WaitError>
    where
        L::Query: fmt::Debug,
    {
        let locator = &self.locator;
        let outcome = self.implicit(query).until(|| match locator.find_all(query) {
            Ok(found) if found.is_empty() => Evaluation::NotYetSatisfied,
            Ok(found) => Evaluation::Satisfied(found),
            Err(error) => Evaluation::Failed(error),
        });
        match outcome {
            Outcome::TimedOut(_) => Ok(Vec::new()),
            other => other.into_result(),
        }
    }

    /// Implicit lookups are presence waits: a not-found miss is always
    /// retried, whatever transient set the template carries.
    fn implicit(&self, query: &L::Query) -> Poller
    where
        L::Query: fmt::Debug,
    {
        let ambient = self.ambient_timeout();
        self.template
            .clone()
            .with_timeout(ambient.deadline())
            .ignoring_category(ErrorCategory::NotFound)
            .with_message(format!("no resource matched {:?}", query))
    }
}

impl<L: fmt::Debug> fmt::Debug for Session<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("locator", &self.locator)
            .field(
                "ambient",
                &*self.ambient.read().unwrap_or_else(PoisonError::into_inner),
            )
            .field("template", &self.template)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::conditions::fake::{FakeNode, ScriptedLocator};
    use crate::error::{ConditionError, TransientSet};

    fn session(script: Vec<Result<Vec<FakeNode>, ConditionError>>) -> (Session<ScriptedLocator>, ManualClock) {
        let clock = ManualClock::new();
        let session = Session::new(ScriptedLocator::new(script)).with_poller(
            Poller::default()
                .polling_every(Duration::from_millis(100))
                .with_clock(Arc::new(clock.clone())),
        );
        (session, clock)
    }

    #[test]
    fn test_starts_unset() {
        let (session, _) = session(vec![Ok(vec![])]);
        assert_eq!(session.ambient_timeout(), AmbientTimeout::Unset);
        assert_eq!(session.ambient_timeout().deadline(), Duration::ZERO);
    }

    #[test]
    fn test_transitions() {
        let (session, _) = session(vec![Ok(vec![])]);
        session.set_ambient_timeout(Duration::from_secs(5));
        assert_eq!(
            session.ambient_timeout(),
            AmbientTimeout::Set(Duration::from_secs(5))
        );
        session.set_ambient_timeout(Duration::from_secs(1));
        assert_eq!(
            session.ambient_timeout(),
            AmbientTimeout::Set(Duration::from_secs(1))
        );
        session.clear_ambient_timeout();
        assert!(!session.ambient_timeout().is_set());
    }

    #[test]
    fn test_clones_share_ambient_state() {
        let (session, _) = session(vec![Ok(vec![])]);
        let clone = session.clone();
        clone.set_ambient_timeout(Duration::from_secs(2));
        assert!(session.ambient_timeout().is_set());
    }

    #[test]
    fn test_unset_find_makes_one_attempt() {
        let (session, clock) = session(vec![Ok(vec![])]);
        let err = session.find(&"#late").unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(*session.locator().calls.borrow(), 1);
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(err.to_string().contains("no resource matched \"#late\""));
    }

    #[test]
    fn test_set_find_polls() {
        let (session, clock) = session(vec![Ok(vec![]), Ok(vec![]), Ok(vec![FakeNode::visible()])]);
        session.set_ambient_timeout(Duration::from_secs(5));
        assert!(session.find(&"#late").is_ok());
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
    }

    #[test]
    fn test_find_retries_not_found_under_narrow_transient_set() {
        let (session, clock) = session(vec![
            Err(ConditionError::not_found("no such element")),
            Err(ConditionError::not_found("no such element")),
            Ok(vec![FakeNode::visible()]),
        ]);
        let session = session.with_poller(
            Poller::default()
                .polling_every(Duration::from_millis(100))
                .ignoring(TransientSet::of([ErrorCategory::Stale]))
                .with_clock(Arc::new(clock.clone())),
        );
        session.set_ambient_timeout(Duration::from_secs(5));

        assert!(session.find(&"#late").is_ok());
        assert_eq!(clock.elapsed(), Duration::from_millis(200));
        // Explicit waits keep the caller's set untouched.
        assert!(!session
            .wait(Duration::from_secs(1))
            .transient()
            .contains(ErrorCategory::NotFound));
    }

    #[test]
    fn test_find_fatal_error_surfaces() {
        let (session, _) = session(vec![Err(ConditionError::permission_denied("403"))]);
        session.set_ambient_timeout(Duration::from_secs(5));
        assert!(session.find(&"#secret").unwrap_err().is_fatal());
    }

    #[test]
    fn test_find_all_returns_empty_on_timeout() {
        let (session, _) = session(vec![Ok(vec![])]);
        session.set_ambient_timeout(Duration::from_millis(300));
        assert!(session.find_all(&"li").unwrap().is_empty());
        assert_eq!(*session.locator().calls.borrow(), 4);
    }

    #[test]
    fn test_explicit_wait_ignores_ambient() {
        let (session, _) = session(vec![Ok(vec![])]);
        session.set_ambient_timeout(Duration::from_secs(30));
        let poller = session.wait(Duration::from_secs(1));
        assert_eq!(poller.timeout(), Duration::from_secs(1));
        assert_eq!(poller.interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_ambient_from_option() {
        assert_eq!(AmbientTimeout::from(None), AmbientTimeout::Unset);
        assert_eq!(
            AmbientTimeout::from(Some(Duration::from_secs(3))),
            AmbientTimeout::Set(Duration::from_secs(3))
        );
    }
}
