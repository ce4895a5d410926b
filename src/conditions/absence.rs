//! Absence and invisibility.
//!
//! These invert the usual lookup treatment: a "not found" failure from the
//! collaborator means the resource is gone, which is exactly what the caller
//! is waiting for. The conditions cannot tell "never existed" from "existed
//! and was removed"; both satisfy.

use super::{Locator, Resource};
use crate::error::ConditionError;
use crate::poller::Evaluation;

/// Satisfied once the lookup matches nothing.
pub fn absence_of<'a, L>(locator: &'a L, query: &'a L::Query) -> impl FnMut() -> Evaluation<()> + 'a
where
    L: Locator + ?Sized,
{
    move || match locator.find_all(query) {
        Ok(found) if found.is_empty() => Evaluation::Satisfied(()),
        Ok(_) => Evaluation::NotYetSatisfied,
        Err(error) if error.is_not_found() => Evaluation::Satisfied(()),
        Err(error) => Evaluation::Failed(error),
    }
}

/// Satisfied once every match is hidden, or nothing matches.
///
/// A handle that goes stale while being checked counts as hidden.
pub fn invisibility_of<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
) -> impl FnMut() -> Evaluation<()> + 'a
where
    L: Locator + ?Sized,
{
    move || {
        let found = match locator.find_all(query) {
            Ok(found) => found,
            Err(error) if gone(&error) => return Evaluation::Satisfied(()),
            Err(error) => return Evaluation::Failed(error),
        };
        for handle in &found {
            match handle.is_displayed() {
                Ok(true) => return Evaluation::NotYetSatisfied,
                Ok(false) => {}
                Err(error) if gone(&error) => {}
                Err(error) => return Evaluation::Failed(error),
            }
        }
        Evaluation::Satisfied(())
    }
}

fn gone(error: &ConditionError) -> bool {
    error.is_not_found() || error.is_stale()
}
