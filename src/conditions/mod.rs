//! Reusable conditions over a resource-lookup collaborator.
//!
//! Every factory here closes over a [`Locator`] and a query and returns an
//! ordinary `FnMut() -> Evaluation<T>`, so the result plugs straight into
//! [`Poller::until`](crate::poller::Poller::until) or [`poll`](crate::poller::poll).
//!
//! Lookups report "no match" as an empty vector; that is `NotYetSatisfied`
//! for the positive conditions. Failures raised by the collaborator are passed
//! through as `Failed` and left to the poller's transient set, except in the
//! absence conditions, where "not found" means the wait is over.

mod absence;
mod cardinality;
mod matching;
mod state;

pub use absence::{absence_of, invisibility_of};
pub use cardinality::{count_at_least, count_is};
pub use matching::{property_matches, text_matches, TextMatch};
pub use state::{interactable, presence_of, visibility_of};

use crate::error::ConditionError;

/// A handle to one matched resource.
pub trait Resource {
    /// Whether the resource is currently rendered/observable.
    fn is_displayed(&self) -> Result<bool, ConditionError>;

    /// Whether the resource currently accepts interaction.
    fn is_enabled(&self) -> Result<bool, ConditionError>;

    /// A named property (attribute) of the resource, if it has one.
    fn property(&self, name: &str) -> Result<Option<String>, ConditionError>;

    /// The resource's visible text.
    fn text(&self) -> Result<String, ConditionError>;
}

/// The primitive lookup the condition library is built on.
pub trait Locator {
    /// How a resource is described (selector, path, id, ...).
    type Query;
    /// What a successful lookup hands back.
    type Handle: Resource;

    /// Every resource currently matching `query`; empty when nothing matches.
    fn find_all(&self, query: &Self::Query) -> Result<Vec<Self::Handle>, ConditionError>;
}

impl<L: Locator + ?Sized> Locator for &L {
    type Query = L::Query;
    type Handle = L::Handle;

    fn find_all(&self, query: &Self::Query) -> Result<Vec<Self::Handle>, ConditionError> {
        (**self).find_all(query)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory locator shared by the condition tests.

    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::{Locator, Resource};
    use crate::error::ConditionError;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct FakeNode {
        pub displayed: bool,
        pub enabled: bool,
        pub text: String,
        pub properties: HashMap<String, String>,
        pub stale: bool,
    }

    impl FakeNode {
        pub fn visible() -> Self {
            Self {
                displayed: true,
                enabled: true,
                ..Self::default()
            }
        }

        pub fn hidden() -> Self {
            Self::default()
        }

        pub fn with_property(mut self, name: &str, value: &str) -> Self {
            self.properties.insert(name.to_string(), value.to_string());
            self
        }

        pub fn with_text(mut self, text: &str) -> Self {
            self.text = text.to_string();
            self
        }
    }

    impl Resource for FakeNode {
        fn is_displayed(&self) -> Result<bool, ConditionError> {
            if self.stale {
                return Err(ConditionError::stale("node detached"));
            }
            Ok(self.displayed)
        }

        fn is_enabled(&self) -> Result<bool, ConditionError> {
            if self.stale {
                return Err(ConditionError::stale("node detached"));
            }
            Ok(self.enabled)
        }

        fn property(&self, name: &str) -> Result<Option<String>, ConditionError> {
            Ok(self.properties.get(name).cloned())
        }

        fn text(&self) -> Result<String, ConditionError> {
            Ok(self.text.clone())
        }
    }

    /// Replays one scripted lookup result per call, repeating the last.
    #[derive(Debug, Clone, Default)]
    pub struct ScriptedLocator {
        script: RefCell<Vec<Result<Vec<FakeNode>, ConditionError>>>,
        pub calls: RefCell<u32>,
    }

    impl ScriptedLocator {
        pub fn new(script: Vec<Result<Vec<FakeNode>, ConditionError>>) -> Self {
            Self {
                script: RefCell::new(script),
                calls: RefCell::new(0),
            }
        }
    }

    impl Locator for ScriptedLocator {
        type Query = &'static str;
        type Handle = FakeNode;

        fn find_all(&self, _query: &Self::Query) -> Result<Vec<FakeNode>, ConditionError> {
            *self.calls.borrow_mut() += 1;
            let mut script = self.script.borrow_mut();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script
                    .first()
                    .cloned()
                    .unwrap_or_else(|| Ok(Vec::new()))
            }
        }
    }
}
