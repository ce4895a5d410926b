//! Property and text matching.

use super::{Locator, Resource};
use crate::error::ConditionError;
use crate::poller::Evaluation;

/// How an observed value is compared with the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// The value equals the target exactly.
    Equals(String),
    /// The value contains the target as a substring.
    Contains(String),
}

impl TextMatch {
    /// Exact match.
    pub fn equals(target: impl Into<String>) -> Self {
        TextMatch::Equals(target.into())
    }

    /// Substring match.
    pub fn contains(target: impl Into<String>) -> Self {
        TextMatch::Contains(target.into())
    }

    /// Returns true if `value` satisfies this match.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            TextMatch::Equals(target) => value == target,
            TextMatch::Contains(target) => value.contains(target.as_str()),
        }
    }
}

/// Satisfied with the property value once property `name` of the first match
/// satisfies `expected`.
///
/// No match, or a match without the property, is `NotYetSatisfied`.
pub fn property_matches<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
    name: &'a str,
    expected: TextMatch,
) -> impl FnMut() -> Evaluation<String> + 'a
where
    L: Locator + ?Sized,
{
    move || match_first(locator, query, &expected, |handle| handle.property(name))
}

/// Satisfied with the text once the first match's text satisfies `expected`.
pub fn text_matches<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
    expected: TextMatch,
) -> impl FnMut() -> Evaluation<String> + 'a
where
    L: Locator + ?Sized,
{
    move || match_first(locator, query, &expected, |handle| handle.text().map(Some))
}

fn match_first<L, R>(
    locator: &L,
    query: &L::Query,
    expected: &TextMatch,
    read: R,
) -> Evaluation<String>
where
    L: Locator + ?Sized,
    R: Fn(&L::Handle) -> Result<Option<String>, ConditionError>,
{
    let handle = match locator.find_all(query) {
        Ok(found) => match found.into_iter().next() {
            Some(handle) => handle,
            None => return Evaluation::NotYetSatisfied,
        },
        Err(error) => return Evaluation::Failed(error),
    };
    match read(&handle) {
        Ok(Some(value)) if expected.matches(&value) => Evaluation::Satisfied(value),
        Ok(_) => Evaluation::NotYetSatisfied,
        Err(error) => Evaluation::Failed(error),
    }
}
