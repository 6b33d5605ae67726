//! Handle naming and development diagnostics.

use crate::core::{Context, State};

/// Conventional handle name of a machine: `$<id>Machine`.
pub fn handle_name(machine_id: &str) -> String {
    format!("${machine_id}Machine")
}

/// Machine id encoded in a handle name, `None` if `handle` does not follow
/// the `$<id>Machine` convention.
pub fn machine_id_from_handle(handle: &str) -> Option<&str> {
    handle
        .strip_prefix('$')?
        .strip_suffix("Machine")
        .filter(|id| !id.is_empty())
}

pub(crate) fn log_state<S: State>(machine_id: &str, value: &S) {
    tracing::info!(
        target: "machine_binder::diagnostics",
        machine = machine_id,
        state = value.name(),
        "[ {} STATE ] {}",
        machine_id.to_uppercase(),
        value.name()
    );
}

pub(crate) fn log_context<C: Context>(machine_id: &str, context: &C) {
    let rendered = serde_json::to_string(context).unwrap_or_else(|_| format!("{context:?}"));
    tracing::info!(
        target: "machine_binder::diagnostics",
        machine = machine_id,
        "[ {} CONTEXT ] {}",
        machine_id.to_uppercase(),
        rendered
    );
}
