//! Core state machine types and logic.
//!
//! This module contains the pure part of the crate:
//! - State values, contexts and events via the `State`, `Context` and `Event` traits
//! - Guard predicates for transition control
//! - Immutable snapshots
//! - Machine definitions and their pure transition function
//!
//! Nothing in this module performs I/O or holds interior mutability.

mod definition;
mod guard;
mod snapshot;
mod state;
mod transition;

pub use definition::MachineDefinition;
pub use guard::Guard;
pub use snapshot::{Snapshot, INIT_EVENT};
pub use state::{Context, Event, State};
pub use transition::{Assign, Transition};
