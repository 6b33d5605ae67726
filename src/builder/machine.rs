//! Builder for constructing machine definitions.

use crate::builder::error::BuildError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Context, Event, MachineDefinition, State, Transition};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Builder for constructing machine definitions with a fluent API.
///
/// `build()` reports every missing or invalid field at once instead of
/// stopping at the first one.
pub struct MachineBuilder<S: State, C: Context, E: Event> {
    id: Option<String>,
    initial: Option<S>,
    context: Option<C>,
    transitions: Vec<Transition<S, C, E>>,
}

impl<S: State, C: Context, E: Event> MachineBuilder<S, C, E> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            id: None,
            initial: None,
            context: None,
            transitions: Vec::new(),
        }
    }

    /// Set the machine identifier (required).
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the initial state (required).
    pub fn initial(mut self, state: S) -> Self {
        self.initial = Some(state);
        self
    }

    /// Set the initial context (required).
    pub fn context(mut self, context: C) -> Self {
        self.context = Some(context);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(
        mut self,
        builder: TransitionBuilder<S, C, E>,
    ) -> Result<Self, BuildError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<S, C, E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<S, C, E>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Shorthand for an unguarded transition from `from` to `to` on `event`.
    pub fn on(self, from: S, event: impl Into<String>, to: S) -> Self {
        self.add_transition(Transition {
            from,
            event: event.into(),
            target: Some(to),
            guard: None,
            assign: None,
        })
    }

    fn validate(&self) -> Validation<(), NonEmptyVec<BuildError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<BuildError>>> = Vec::new();

        let id_check: Validation<(), NonEmptyVec<BuildError>> = match &self.id {
            None => Validation::fail(BuildError::MissingId),
            Some(id) if !is_valid_id(id) => Validation::fail(BuildError::InvalidId { id: id.clone() }),
            Some(_) => Validation::success(()),
        };
        checks.push(id_check);

        if self.initial.is_none() {
            checks.push(Validation::fail(BuildError::MissingInitialState));
        }

        if self.context.is_none() {
            checks.push(Validation::fail(BuildError::MissingContext));
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Build the machine definition.
    /// Returns every validation problem if required fields are missing.
    pub fn build(self) -> Result<MachineDefinition<S, C, E>, BuildError> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(BuildError::from_all(errors.iter().cloned().collect()));
        }

        let id = self.id.ok_or(BuildError::MissingId)?;
        let initial = self.initial.ok_or(BuildError::MissingInitialState)?;
        let context = self.context.ok_or(BuildError::MissingContext)?;

        Ok(MachineDefinition::new(id, initial, context, self.transitions))
    }
}

impl<S: State, C: Context, E: Event> Default for MachineBuilder<S, C, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Ids end up in persistence keys and handle names, so keep them plain.
fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
