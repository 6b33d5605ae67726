//! Builder API for ergonomic machine definition construction.
//!
//! This module provides fluent builders and macros for creating machine
//! definitions with minimal boilerplate while maintaining type safety.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Context, Event, State, Transition};

/// Create a simple unconditional transition.
///
/// # Example
///
/// ```
/// use machine_binder::builder::simple_transition;
/// use machine_binder::state_enum;
///
/// state_enum! {
///     enum Switch {
///         Off,
///         On,
///     }
/// }
///
/// let transition = simple_transition::<Switch, (), &'static str>(Switch::Off, "FLIP", Switch::On);
/// assert!(transition.can_execute(&Switch::Off, &(), &"FLIP"));
/// ```
pub fn simple_transition<S, C, E>(from: S, event: &str, to: S) -> Transition<S, C, E>
where
    S: State,
    C: Context,
    E: Event,
{
    Transition {
        from,
        event: event.to_string(),
        target: Some(to),
        guard: None,
        assign: None,
    }
}

/// Create a transition with a guard predicate.
pub fn guarded_transition<S, C, E, F>(from: S, event: &str, to: S, guard: F) -> Transition<S, C, E>
where
    S: State,
    C: Context,
    E: Event,
    F: Fn(&C, &E) -> bool + Send + Sync + 'static,
{
    Transition {
        guard: Some(crate::core::Guard::new(guard)),
        ..simple_transition(from, event, to)
    }
}
