//! Guard predicates for blocking waits.
//!
//! A guard names the condition a waiter is blocked on. Waiters re-evaluate
//! it after every wake-up, so it must be cheap and free of side effects.

use std::fmt;
use std::marker::PhantomData;

/// Pure predicate over an observed value.
///
/// # Example
///
/// ```rust
/// use stoplight::{Guard, Phase};
///
/// let go = Guard::new(|phase: &Phase| phase.is_green());
///
/// assert!(go.check(&Phase::Green));
/// assert!(!go.check(&Phase::Red));
/// ```
pub struct Guard<S> {
    predicate: Box<dyn Fn(&S) -> bool + Send + Sync>,
    _phantom: PhantomData<fn(&S)>,
}

impl<S> Guard<S> {
    /// Create a guard from a predicate.
    ///
    /// The predicate must be deterministic and thread-safe, since it is
    /// evaluated under the waiter's lock, possibly many times.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
            _phantom: PhantomData,
        }
    }

    /// Check if the guard is satisfied by this value.
    pub fn check(&self, value: &S) -> bool {
        (self.predicate)(value)
    }
}

impl<S> fmt::Debug for Guard<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Phase;

    #[test]
    fn guard_allows_matching_phase() {
        let guard = Guard::new(|p: &Phase| matches!(p, Phase::Green));

        assert!(guard.check(&Phase::Green));
        assert!(!guard.check(&Phase::Red));
    }

    #[test]
    fn guard_is_deterministic() {
        let guard = Guard::new(|p: &Phase| p.is_green());

        let result1 = guard.check(&Phase::Red);
        let result2 = guard.check(&Phase::Red);

        assert_eq!(result1, result2);
    }

    #[test]
    fn guard_can_capture_state() {
        let wanted = Phase::Red;
        let guard = Guard::new(move |p: &Phase| *p == wanted);

        assert!(guard.check(&Phase::Red));
        assert!(!guard.check(&Phase::Green));
    }

    #[test]
    fn guard_works_over_other_types() {
        let guard = Guard::new(|n: &u64| *n >= 3);

        assert!(!guard.check(&2));
        assert!(guard.check(&3));
    }
}
