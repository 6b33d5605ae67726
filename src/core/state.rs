//! Traits for the values a machine carries: state values, context and events.
//!
//! State values and contexts must be serializable so hosts can persist the
//! last changed snapshot and restore it at startup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine state values.
///
/// # Required Traits
///
/// - `Clone`: snapshots are handed out by value and by `Arc`
/// - `PartialEq`: transitions match on the current value
/// - `Debug`: values appear in diagnostics
/// - `Serialize` + `Deserialize`: values are persisted
///
/// # Example
///
/// ```rust
/// use machine_binder::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Light {
///     Green,
///     Yellow,
///     Red,
///     Broken,
/// }
///
/// impl State for Light {
///     fn name(&self) -> &str {
///         match self {
///             Self::Green => "Green",
///             Self::Yellow => "Yellow",
///             Self::Red => "Red",
///             Self::Broken => "Broken",
///         }
///     }
///
///     fn is_final(&self) -> bool {
///         matches!(self, Self::Broken)
///     }
/// }
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;

    /// Check if this is a final (terminal) state.
    ///
    /// An interpreter that reaches a final state stops and ignores further
    /// events. Default implementation returns `false`.
    fn is_final(&self) -> bool {
        false
    }
}

/// Extended data carried alongside the state value.
///
/// Blanket-implemented for every type meeting the bounds, so `()`,
/// `serde_json::Value` and plain derived structs all qualify.
pub trait Context:
    Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Context for T where
    T: Clone + PartialEq + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Events injected into a machine through `send`.
///
/// Transitions are keyed by event name; the event value itself is passed to
/// guards and context assignments.
pub trait Event: Clone + Debug + Send + Sync + 'static {
    /// Name used to select transitions.
    fn name(&self) -> &str;
}

impl Event for String {
    fn name(&self) -> &str {
        self
    }
}

impl Event for &'static str {
    fn name(&self) -> &str {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum TestState {
        Idle,
        Running,
        Done,
    }

    impl State for TestState {
        fn name(&self) -> &str {
            match self {
                Self::Idle => "Idle",
                Self::Running => "Running",
                Self::Done => "Done",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Done)
        }
    }

    #[derive(Clone, Debug)]
    enum TestEvent {
        Begin,
        Progress(u32),
    }

    impl Event for TestEvent {
        fn name(&self) -> &str {
            match self {
                Self::Begin => "BEGIN",
                Self::Progress(_) => "PROGRESS",
            }
        }
    }

    fn assert_context<C: Context>(_: &C) {}

    #[test]
    fn state_name_returns_correct_value() {
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Running.name(), "Running");
        assert_eq!(TestState::Done.name(), "Done");
    }

    #[test]
    fn is_final_identifies_terminal_states() {
        assert!(!TestState::Idle.is_final());
        assert!(!TestState::Running.is_final());
        assert!(TestState::Done.is_final());
    }

    #[test]
    fn string_events_are_named_by_their_content() {
        assert_eq!("FLIP".name(), "FLIP");
        assert_eq!(String::from("RESET").name(), "RESET");
    }

    #[test]
    fn payload_events_use_variant_name() {
        assert_eq!(TestEvent::Begin.name(), "BEGIN");
        assert_eq!(TestEvent::Progress(3).name(), "PROGRESS");
    }

    #[test]
    fn common_types_qualify_as_context() {
        assert_context(&());
        assert_context(&serde_json::json!({ "count": 1 }));
        assert_context(&vec![1u8, 2, 3]);
    }

    #[test]
    fn state_serializes_correctly() {
        let state = TestState::Running;
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: TestState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
