//! Declarative machine definitions and the pure transition function.

use super::snapshot::Snapshot;
use super::state::{Context, Event, State};
use super::transition::Transition;
use chrono::Utc;

/// Immutable description of one machine: identifier, initial value,
/// initial context and the ordered list of transitions.
///
/// Definitions are built with [`crate::builder::MachineBuilder`] and shared
/// behind an `Arc` between the binder and its interpreter.
pub struct MachineDefinition<S: State, C: Context, E: Event> {
    id: String,
    initial: S,
    context: C,
    transitions: Vec<Transition<S, C, E>>,
}

impl<S: State, C: Context, E: Event> MachineDefinition<S, C, E> {
    pub(crate) fn new(
        id: String,
        initial: S,
        context: C,
        transitions: Vec<Transition<S, C, E>>,
    ) -> Self {
        Self {
            id,
            initial,
            context,
            transitions,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn initial_value(&self) -> &S {
        &self.initial
    }

    pub fn initial_context(&self) -> &C {
        &self.context
    }

    pub fn transitions(&self) -> &[Transition<S, C, E>] {
        &self.transitions
    }

    /// Snapshot the machine starts from when nothing was restored.
    pub fn initial_state(&self) -> Snapshot<S, C> {
        Snapshot::initial(self.initial.clone(), self.context.clone())
    }

    /// Check if a value is part of this definition: the initial value or the
    /// source or target of some transition.
    pub fn is_known(&self, value: &S) -> bool {
        *value == self.initial
            || self
                .transitions
                .iter()
                .any(|t| t.from == *value || t.target.as_ref() == Some(value))
    }

    /// Normalize a snapshot against this definition.
    ///
    /// Snapshots whose value is no longer part of the definition resolve to
    /// the initial state. Resolved snapshots never report a change.
    pub fn resolve_state(&self, snapshot: Snapshot<S, C>) -> Snapshot<S, C> {
        if !self.is_known(&snapshot.value) {
            tracing::debug!(
                machine = %self.id,
                value = snapshot.value.name(),
                "Dropping unknown state value, resolving to initial state"
            );
            return self.initial_state();
        }

        Snapshot {
            changed: false,
            ..snapshot
        }
    }

    /// Compute the snapshot that follows `current` when `event` arrives (pure).
    ///
    /// The first transition that matches the current value, the event name
    /// and its guard is taken. Final values and unhandled events produce an
    /// unchanged copy of `current`.
    pub fn transition(&self, current: &Snapshot<S, C>, event: &E) -> Snapshot<S, C> {
        if current.is_done() {
            return current.unchanged(event.name());
        }

        let selected = self
            .transitions
            .iter()
            .find(|t| t.can_execute(&current.value, &current.context, event));

        let Some(transition) = selected else {
            return current.unchanged(event.name());
        };

        let (value, context) = transition.apply(&current.value, &current.context, event);
        let changed = value != current.value || context != current.context;

        Snapshot {
            value,
            context,
            event: event.name().to_string(),
            changed,
            timestamp: Utc::now(),
        }
    }
}

impl<S: State, C: Context, E: Event> std::fmt::Debug for MachineDefinition<S, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("id", &self.id)
            .field("initial", &self.initial)
            .field("context", &self.context)
            .field("transitions", &self.transitions)
            .finish()
    }
}
