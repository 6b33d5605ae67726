//! Builder for constructing state transitions.

use crate::builder::error::BuildError;
use crate::core::{Assign, Context, Event, Guard, State, Transition};

/// Builder for constructing transitions with a fluent API.
pub struct TransitionBuilder<S: State, C: Context, E: Event> {
    from: Option<S>,
    event: Option<String>,
    target: Option<S>,
    guard: Option<Guard<C, E>>,
    assign: Option<Assign<C, E>>,
}

impl<S: State, C: Context, E: Event> TransitionBuilder<S, C, E> {
    /// Create a new transition builder.
    pub fn new() -> Self {
        Self {
            from: None,
            event: None,
            target: None,
            guard: None,
            assign: None,
        }
    }

    /// Set the source state (required).
    pub fn from(mut self, state: S) -> Self {
        self.from = Some(state);
        self
    }

    /// Set the event name that triggers the transition (required).
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Set the target state. Without a target the transition only assigns.
    pub fn to(mut self, state: S) -> Self {
        self.target = Some(state);
        self
    }

    /// Add a guard (optional).
    pub fn guard(mut self, guard: Guard<C, E>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&C, &E) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    /// Compute the next context when the transition is taken (optional).
    pub fn assign<F>(mut self, assign: F) -> Self
    where
        F: Fn(&C, &E) -> C + Send + Sync + 'static,
    {
        self.assign = Some(Box::new(assign));
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<S, C, E>, BuildError> {
        let from = self.from.ok_or(BuildError::MissingFromState)?;
        let event = self.event.ok_or(BuildError::MissingEvent)?;

        Ok(Transition {
            from,
            event,
            target: self.target,
            guard: self.guard,
            assign: self.assign,
        })
    }
}

impl<S: State, C: Context, E: Event> Default for TransitionBuilder<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Draft,
        Review,
    }

    impl State for Phase {
        fn name(&self) -> &str {
            match self {
                Self::Draft => "Draft",
                Self::Review => "Review",
            }
        }
    }

    type Builder = TransitionBuilder<Phase, u32, &'static str>;

    #[test]
    fn builder_requires_from_state() {
        let result = Builder::new().on("SUBMIT").to(Phase::Review).build();

        assert!(matches!(result, Err(BuildError::MissingFromState)));
    }

    #[test]
    fn builder_requires_event() {
        let result = Builder::new().from(Phase::Draft).to(Phase::Review).build();

        assert!(matches!(result, Err(BuildError::MissingEvent)));
    }

    #[test]
    fn builder_creates_transition() {
        let transition = Builder::new()
            .from(Phase::Draft)
            .on("SUBMIT")
            .to(Phase::Review)
            .when(|revisions, _| *revisions > 0)
            .assign(|revisions, _| revisions + 1)
            .build()
            .unwrap();

        assert_eq!(transition.from, Phase::Draft);
        assert_eq!(transition.event, "SUBMIT");
        assert_eq!(transition.target, Some(Phase::Review));
        assert!(!transition.can_execute(&Phase::Draft, &0, &"SUBMIT"));
        assert!(transition.can_execute(&Phase::Draft, &1, &"SUBMIT"));
        assert_eq!(transition.apply(&Phase::Draft, &1, &"SUBMIT").1, 2);
    }

    #[test]
    fn builder_allows_targetless_transition() {
        let transition = Builder::new()
            .from(Phase::Review)
            .on("COMMENT")
            .assign(|comments, _| comments + 1)
            .build()
            .unwrap();

        assert!(transition.target.is_none());
    }
}
