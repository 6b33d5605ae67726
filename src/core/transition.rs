//! Event-driven transitions between state values.

use super::guard::Guard;
use super::state::{Context, Event, State};

/// Context assignment run when a transition is taken.
pub type Assign<C, E> = Box<dyn Fn(&C, &E) -> C + Send + Sync>;

/// A transition taken from `from` when an event named `event` arrives.
///
/// A transition without `target` stays in the current value and only runs
/// its assignment (a targetless transition).
pub struct Transition<S: State, C: Context, E: Event> {
    pub from: S,
    pub event: String,
    pub target: Option<S>,
    pub guard: Option<Guard<C, E>>,
    pub assign: Option<Assign<C, E>>,
}

impl<S: State, C: Context, E: Event> Transition<S, C, E> {
    /// Check if this transition handles `event` in `value` with `context` (pure)
    pub fn can_execute(&self, value: &S, context: &C, event: &E) -> bool {
        if *value != self.from || self.event != event.name() {
            return false;
        }

        self.guard.as_ref().is_none_or(|g| g.check(context, event))
    }

    /// Compute the value and context this transition produces (pure)
    pub fn apply(&self, value: &S, context: &C, event: &E) -> (S, C) {
        let next_value = self.target.clone().unwrap_or_else(|| value.clone());
        let next_context = match &self.assign {
            Some(assign) => assign(context, event),
            None => context.clone(),
        };
        (next_value, next_context)
    }
}

impl<S: State, C: Context, E: Event> std::fmt::Debug for Transition<S, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("from", &self.from)
            .field("event", &self.event)
            .field("target", &self.target)
            .field("guarded", &self.guard.is_some())
            .field("assigns", &self.assign.is_some())
            .finish()
    }
}
