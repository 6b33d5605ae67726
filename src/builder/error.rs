//! Build errors for machine definition and transition builders.

use thiserror::Error;

/// Errors that can occur when building machine definitions and transitions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Machine id not specified. Call .id(name) before .build()")]
    MissingId,

    #[error("Machine id '{id}' is invalid: use ASCII letters, digits, '_' or '-'")]
    InvalidId { id: String },

    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Initial context not specified. Call .context(value) before .build()")]
    MissingContext,

    #[error("Transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("Transition event not specified. Call .on(event)")]
    MissingEvent,

    #[error("{}", join_messages(.0))]
    Multiple(Vec<BuildError>),
}

impl BuildError {
    /// Collapse accumulated errors into one value.
    pub(crate) fn from_all(mut errors: Vec<BuildError>) -> Self {
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            BuildError::Multiple(errors)
        }
    }

    /// Flattened view of every problem this error reports.
    pub fn errors(&self) -> Vec<&BuildError> {
        match self {
            BuildError::Multiple(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}

fn join_messages(errors: &[BuildError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
