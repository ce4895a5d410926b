//! Presence, visibility and interactivity.

use super::{Locator, Resource};
use crate::poller::Evaluation;

/// Satisfied with the first match once the lookup finds anything.
pub fn presence_of<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
) -> impl FnMut() -> Evaluation<L::Handle> + 'a
where
    L: Locator + ?Sized,
{
    move || match locator.find_all(query) {
        Ok(found) => Evaluation::from_option(found.into_iter().next()),
        Err(error) => Evaluation::Failed(error),
    }
}

/// Satisfied with the first match once it is present and displayed.
///
/// A present but hidden resource is `NotYetSatisfied`, never a failure.
pub fn visibility_of<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
) -> impl FnMut() -> Evaluation<L::Handle> + 'a
where
    L: Locator + ?Sized,
{
    move || first_where(locator, query, |handle| handle.is_displayed())
}

/// Satisfied with the first match once it is displayed and enabled.
pub fn interactable<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
) -> impl FnMut() -> Evaluation<L::Handle> + 'a
where
    L: Locator + ?Sized,
{
    move || {
        first_where(locator, query, |handle| {
            Ok(handle.is_displayed()? && handle.is_enabled()?)
        })
    }
}

fn first_where<L, P>(locator: &L, query: &L::Query, check: P) -> Evaluation<L::Handle>
where
    L: Locator + ?Sized,
    P: Fn(&L::Handle) -> Result<bool, crate::error::ConditionError>,
{
    let first = match locator.find_all(query) {
        Ok(found) => found.into_iter().next(),
        Err(error) => return Evaluation::Failed(error),
    };
    let Some(handle) = first else {
        return Evaluation::NotYetSatisfied;
    };
    match check(&handle) {
        Ok(true) => Evaluation::Satisfied(handle),
        Ok(false) => Evaluation::NotYetSatisfied,
        Err(error) => Evaluation::Failed(error),
    }
}
