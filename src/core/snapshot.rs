//! Immutable snapshots of a running machine.

use super::state::{Context, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name recorded on snapshots that were not produced by an event.
pub const INIT_EVENT: &str = "machine.init";

/// Full state of a machine at one point in time.
///
/// `changed` is set by the interpreter: it is `true` only when the event
/// that produced this snapshot selected a transition and the value or the
/// context differs from the previous snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Snapshot<S: State, C: Context> {
    /// Current state value
    pub value: S,
    /// Extended data carried with the value
    pub context: C,
    /// Name of the event that produced this snapshot
    pub event: String,
    /// Whether this snapshot differs from its predecessor
    pub changed: bool,
    /// When the snapshot was produced
    pub timestamp: DateTime<Utc>,
}

impl<S: State, C: Context> Snapshot<S, C> {
    /// Snapshot for a machine that has not processed any event.
    pub fn initial(value: S, context: C) -> Self {
        Self {
            value,
            context,
            event: INIT_EVENT.to_string(),
            changed: false,
            timestamp: Utc::now(),
        }
    }

    /// Check whether the machine is in the given state value.
    pub fn matches(&self, value: &S) -> bool {
        self.value == *value
    }

    /// Check whether the machine reached a final state value.
    pub fn is_done(&self) -> bool {
        self.value.is_final()
    }

    /// Value and context equality, ignoring event and timing metadata.
    pub fn same_state(&self, other: &Self) -> bool {
        self.value == other.value && self.context == other.context
    }

    /// Copy of this snapshot that reports no change for `event`.
    pub(crate) fn unchanged(&self, event: &str) -> Self {
        Self {
            value: self.value.clone(),
            context: self.context.clone(),
            event: event.to_string(),
            changed: false,
            timestamp: Utc::now(),
        }
    }
}
