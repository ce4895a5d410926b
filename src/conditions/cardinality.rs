//! Match-count conditions.

use super::Locator;
use crate::poller::Evaluation;

/// Satisfied with every match once the lookup returns exactly `expected` matches.
pub fn count_is<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
    expected: usize,
) -> impl FnMut() -> Evaluation<Vec<L::Handle>> + 'a
where
    L: Locator + ?Sized,
{
    move || count_where(locator, query, |count| count == expected)
}

/// Satisfied with every match once the lookup returns at least `minimum` matches.
pub fn count_at_least<'a, L>(
    locator: &'a L,
    query: &'a L::Query,
    minimum: usize,
) -> impl FnMut() -> Evaluation<Vec<L::Handle>> + 'a
where
    L: Locator + ?Sized,
{
    move || count_where(locator, query, |count| count >= minimum)
}

fn count_where<L>(
    locator: &L,
    query: &L::Query,
    accept: impl Fn(usize) -> bool,
) -> Evaluation<Vec<L::Handle>>
where
    L: Locator + ?Sized,
{
    match locator.find_all(query) {
        Ok(found) if accept(found.len()) => Evaluation::Satisfied(found),
        Ok(_) => Evaluation::NotYetSatisfied,
        // A locator that raises instead of returning nothing still has zero matches.
        Err(error) if error.is_not_found() && accept(0) => Evaluation::Satisfied(Vec::new()),
        Err(error) => Evaluation::Failed(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::fake::{FakeNode, ScriptedLocator};
    use crate::error::ConditionError;

    fn nodes(n: usize) -> Vec<FakeNode> {
        (0..n).map(|_| FakeNode::visible()).collect()
    }

    #[test]
    fn test_count_is_exact() {
        let locator = ScriptedLocator::new(vec![Ok(nodes(2)), Ok(nodes(4)), Ok(nodes(3))]);
        let mut condition = count_is(&locator, &"tr", 3);
        assert_eq!(condition(), Evaluation::NotYetSatisfied);
        assert_eq!(condition(), Evaluation::NotYetSatisfied);
        assert!(matches!(condition(), Evaluation::Satisfied(found) if found.len() == 3));
    }

    #[test]
    fn test_count_is_zero_on_empty() {
        let locator = ScriptedLocator::new(vec![Ok(vec![])]);
        let mut condition = count_is(&locator, &"tr", 0);
        assert_eq!(condition(), Evaluation::Satisfied(Vec::new()));
    }

    #[test]
    fn test_count_at_least_reaches_target() {
        let locator = ScriptedLocator::new(vec![Ok(nodes(1)), Ok(nodes(5))]);
        let mut condition = count_at_least(&locator, &"tr", 3);
        assert_eq!(condition(), Evaluation::NotYetSatisfied);
        assert!(matches!(condition(), Evaluation::Satisfied(found) if found.len() == 5));
    }

    #[test]
    fn test_count_is_zero_when_lookup_raises_not_found() {
        let locator = ScriptedLocator::new(vec![Err(ConditionError::not_found("no rows"))]);
        let mut condition = count_is(&locator, &"tr", 0);
        assert_eq!(condition(), Evaluation::Satisfied(Vec::new()));
    }

    #[test]
    fn test_not_found_stays_a_failure_for_positive_counts() {
        let locator = ScriptedLocator::new(vec![Err(ConditionError::not_found("no rows"))]);
        let mut condition = count_at_least(&locator, &"tr", 1);
        assert!(matches!(condition(), Evaluation::Failed(error) if error.is_not_found()));
    }
}
