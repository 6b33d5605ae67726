//! Binder configuration: global defaults and per-machine overrides.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global options applied to every machine in an installation batch.
///
/// Deserializes from JSON with every field optional:
///
/// ```rust
/// use machine_binder::binder::BinderOptions;
///
/// let options = BinderOptions::from_json(r#"{ "persist": true, "origin": "app" }"#).unwrap();
/// assert!(options.persist);
/// assert!(!options.log_state);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderOptions {
    /// Log the state value after every change
    pub log_state: bool,

    /// Log the context after every change
    pub log_context: bool,

    /// Persist the last changed snapshot and restore it at startup
    pub persist: bool,

    /// Diagnostics are only emitted in development mode
    pub dev_mode: bool,

    /// Discriminator mixed into persistence keys. Defaults to the host name
    /// from the environment (see [`default_origin`]); set it explicitly when
    /// several applications share one storage backend.
    pub origin: String,

    /// Directory for file-backed persistence when no storage is supplied
    pub storage_dir: Option<PathBuf>,
}

impl Default for BinderOptions {
    fn default() -> Self {
        Self {
            log_state: false,
            log_context: false,
            persist: false,
            dev_mode: cfg!(debug_assertions),
            origin: default_origin(),
            storage_dir: None,
        }
    }
}

/// Host name taken from `HOSTNAME` or `COMPUTERNAME`, `"localhost"` when
/// neither is set.
pub fn default_origin() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

impl BinderOptions {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Effective options for one machine.
    pub fn resolve(&self, overrides: &MachineOptions) -> HostOptions {
        HostOptions {
            log_state: overrides.log_state.unwrap_or(self.log_state),
            log_context: overrides.log_context.unwrap_or(self.log_context),
            persist: overrides.persist.unwrap_or(self.persist),
            dev_mode: self.dev_mode,
            origin: self.origin.clone(),
        }
    }
}

/// Per-machine overrides; unset fields fall back to [`BinderOptions`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineOptions {
    pub log_state: Option<bool>,
    pub log_context: Option<bool>,
    pub persist: Option<bool>,
}

impl MachineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_state(mut self, enabled: bool) -> Self {
        self.log_state = Some(enabled);
        self
    }

    pub fn log_context(mut self, enabled: bool) -> Self {
        self.log_context = Some(enabled);
        self
    }

    pub fn persist(mut self, enabled: bool) -> Self {
        self.persist = Some(enabled);
        self
    }
}

/// Options a single host runs with.
#[derive(Clone, Debug, PartialEq)]
pub struct HostOptions {
    pub log_state: bool,
    pub log_context: bool,
    pub persist: bool,
    pub dev_mode: bool,
    pub origin: String,
}

impl Default for HostOptions {
    fn default() -> Self {
        BinderOptions::default().resolve(&MachineOptions::default())
    }
}
