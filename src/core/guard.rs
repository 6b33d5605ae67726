//! Guard predicates for controlling state transitions.
//!
//! Guards are pure boolean functions over the current context and the
//! incoming event. A transition whose guard rejects is skipped and the next
//! candidate is tried.

use super::state::{Context, Event};

/// Pure predicate that determines if a transition can execute.
///
/// # Example
///
/// ```rust
/// use machine_binder::core::Guard;
///
/// let under_limit = Guard::new(|count: &u32, _event: &&'static str| *count < 3);
///
/// assert!(under_limit.check(&2, &"INC"));
/// assert!(!under_limit.check(&3, &"INC"));
/// ```
pub struct Guard<C: Context, E: Event> {
    predicate: Box<dyn Fn(&C, &E) -> bool + Send + Sync>,
}

impl<C: Context, E: Event> Guard<C, E> {
    /// Create a guard from a pure predicate function.
    ///
    /// The predicate must be deterministic and thread-safe (Send + Sync).
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Check if the guard allows the transition for this context and event.
    pub fn check(&self, context: &C, event: &E) -> bool {
        (self.predicate)(context, event)
    }
}

impl<C: Context, E: Event> std::fmt::Debug for Guard<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Guard(..)")
    }
}
