//! Machine binder: installs one observable host per machine definition.
//!
//! [`install`] takes a [`BinderConfig`] (machine definitions, global options
//! and an optional storage backend) and returns a [`Registry`] with one
//! running [`MachineHost`] per definition. Hosts mirror every changed
//! snapshot their interpreter reports into `current`/`context`, optionally
//! persist it, log it in development mode and notify subscribers.
//!
//! # Example
//!
//! ```rust
//! use machine_binder::binder::{install, BinderConfig, BinderOptions};
//! use machine_binder::builder::MachineBuilder;
//! use machine_binder::state_enum;
//!
//! state_enum! {
//!     enum Toggle {
//!         Off,
//!         On,
//!     }
//! }
//!
//! let toggle = MachineBuilder::<Toggle, (), &'static str>::new()
//!     .id("toggle")
//!     .initial(Toggle::Off)
//!     .context(())
//!     .on(Toggle::Off, "FLIP", Toggle::On)
//!     .on(Toggle::On, "FLIP", Toggle::Off)
//!     .build()
//!     .unwrap();
//!
//! let registry = install(BinderConfig::new(BinderOptions::default()).machine(toggle));
//! let machine = registry
//!     .by_handle::<Toggle, (), &'static str>("$toggleMachine")
//!     .unwrap();
//!
//! machine.send("FLIP");
//! assert_eq!(machine.current().value, Toggle::On);
//! ```

mod diagnostics;
mod host;
mod options;
mod registry;

pub use diagnostics::{handle_name, machine_id_from_handle};
pub use host::{ChangeListener, HostStatus, MachineHost, SubscriptionId};
pub use options::{default_origin, BinderOptions, HostOptions, MachineOptions};
pub use registry::{ErasedHost, Registry};

use crate::core::{Context, Event, MachineDefinition, State};
use crate::persistence::{FileStorage, StateStorage};
use std::sync::Arc;

/// One machine waiting to be installed.
trait Install: Send {
    fn install(
        self: Box<Self>,
        options: &BinderOptions,
        storage: Option<Arc<dyn StateStorage>>,
    ) -> Arc<dyn ErasedHost>;
}

struct MachineEntry<S: State, C: Context, E: Event> {
    definition: Arc<MachineDefinition<S, C, E>>,
    options: MachineOptions,
}

impl<S: State, C: Context, E: Event> Install for MachineEntry<S, C, E> {
    fn install(
        self: Box<Self>,
        options: &BinderOptions,
        storage: Option<Arc<dyn StateStorage>>,
    ) -> Arc<dyn ErasedHost> {
        let host = MachineHost::new(self.definition, options.resolve(&self.options), storage);
        host.start();
        host
    }
}

/// Everything `install` needs: the machines, global options and storage.
pub struct BinderConfig {
    machines: Vec<Box<dyn Install>>,
    options: BinderOptions,
    storage: Option<Arc<dyn StateStorage>>,
}

impl BinderConfig {
    pub fn new(options: BinderOptions) -> Self {
        Self {
            machines: Vec::new(),
            options,
            storage: None,
        }
    }

    /// Add a machine that uses the global options.
    pub fn machine<S: State, C: Context, E: Event>(
        self,
        definition: MachineDefinition<S, C, E>,
    ) -> Self {
        self.machine_with(definition, MachineOptions::default())
    }

    /// Add a machine with per-machine overrides.
    pub fn machine_with<S: State, C: Context, E: Event>(
        self,
        definition: MachineDefinition<S, C, E>,
        options: MachineOptions,
    ) -> Self {
        self.shared_machine(Arc::new(definition), options)
    }

    /// Add a machine whose definition is shared with other code.
    pub fn shared_machine<S: State, C: Context, E: Event>(
        mut self,
        definition: Arc<MachineDefinition<S, C, E>>,
        options: MachineOptions,
    ) -> Self {
        self.machines.push(Box::new(MachineEntry {
            definition,
            options,
        }));
        self
    }

    /// Storage backend for persisted state. Takes precedence over
    /// `BinderOptions::storage_dir`.
    pub fn storage(mut self, storage: Arc<dyn StateStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    fn resolve_storage(&self) -> Option<Arc<dyn StateStorage>> {
        if let Some(storage) = &self.storage {
            return Some(Arc::clone(storage));
        }

        let dir = self.options.storage_dir.as_ref()?;
        match FileStorage::new(dir) {
            Ok(storage) => Some(Arc::new(storage)),
            Err(error) => {
                tracing::warn!(
                    dir = %dir.display(),
                    %error,
                    "Cannot open storage directory, persistence disabled"
                );
                None
            }
        }
    }
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::new(BinderOptions::default())
    }
}

impl Registry {
    /// Install every machine of `config`, replacing hosts with the same id.
    pub fn install(&mut self, config: BinderConfig) {
        let storage = config.resolve_storage();
        let count = config.machines.len();

        for entry in config.machines {
            let host = entry.install(&config.options, storage.clone());
            self.bind(host);
        }

        tracing::debug!(
            machines = count,
            installed = self.len(),
            "Installed machine batch"
        );
    }
}

/// Install a batch of machines into a fresh registry.
pub fn install(config: BinderConfig) -> Registry {
    let mut registry = Registry::new();
    registry.install(config);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MachineBuilder;
    use crate::persistence::MemoryStorage;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Door {
        Closed,
        Open,
    }

    impl State for Door {
        fn name(&self) -> &str {
            match self {
                Self::Closed => "closed",
                Self::Open => "open",
            }
        }
    }

    fn door(id: &str) -> MachineDefinition<Door, (), &'static str> {
        MachineBuilder::new()
            .id(id)
            .initial(Door::Closed)
            .context(())
            .on(Door::Closed, "OPEN", Door::Open)
            .on(Door::Open, "CLOSE", Door::Closed)
            .build()
            .unwrap()
    }

    type DoorHost = MachineHost<Door, (), &'static str>;

    #[test]
    fn install_starts_every_machine() {
        let registry = install(
            BinderConfig::default()
                .machine(door("front"))
                .machine(door("back")),
        );

        assert_eq!(registry.ids(), vec!["back", "front"]);
        for id in ["front", "back"] {
            let host = registry.get::<Door, (), &'static str>(id).unwrap();
            assert_eq!(host.status(), HostStatus::Running);
        }
    }

    #[test]
    fn later_install_overwrites_same_id() {
        let mut registry = install(BinderConfig::default().machine(door("front")));
        let original = registry.get::<Door, (), &'static str>("front").unwrap();
        original.send("OPEN");

        registry.install(BinderConfig::default().machine(door("front")));

        let replaced = registry.get::<Door, (), &'static str>("front").unwrap();
        assert!(!Arc::ptr_eq(&original, &replaced));
        assert!(replaced.matches(&Door::Closed));
    }

    #[test]
    fn machine_options_override_globals() {
        let storage = Arc::new(MemoryStorage::new());
        let options = BinderOptions {
            persist: true,
            ..BinderOptions::default()
        };
        let registry = install(
            BinderConfig::new(options)
                .storage(storage.clone())
                .machine(door("front"))
                .machine_with(door("back"), MachineOptions::new().persist(false)),
        );

        let front: Arc<DoorHost> = registry.get("front").unwrap();
        let back: Arc<DoorHost> = registry.get("back").unwrap();

        assert!(front.persistence_key().is_some());
        assert!(back.persistence_key().is_none());

        front.send("OPEN");
        back.send("OPEN");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn storage_dir_enables_file_persistence() {
        let dir = TempDir::new().unwrap();
        let options = BinderOptions {
            persist: true,
            origin: "desk".to_string(),
            storage_dir: Some(dir.path().join("machines")),
            ..BinderOptions::default()
        };

        let registry = install(BinderConfig::new(options.clone()).machine(door("front")));
        let front: Arc<DoorHost> = registry.get("front").unwrap();
        front.send("OPEN");

        let reloaded = install(BinderConfig::new(options).machine(door("front")));
        let front: Arc<DoorHost> = reloaded.get("front").unwrap();
        assert!(front.matches(&Door::Open));
    }

    #[test]
    fn file_persistence_keeps_similar_origins_apart() {
        let dir = TempDir::new().unwrap();
        let options = |origin: &str| BinderOptions {
            persist: true,
            origin: origin.to_string(),
            storage_dir: Some(dir.path().to_path_buf()),
            ..BinderOptions::default()
        };

        let registry = install(BinderConfig::new(options("https://a.example")).machine(door("front")));
        let front: Arc<DoorHost> = registry.get("front").unwrap();
        front.send("OPEN");

        let other = install(BinderConfig::new(options("https_//a.example")).machine(door("front")));
        let front: Arc<DoorHost> = other.get("front").unwrap();
        assert!(front.matches(&Door::Closed));

        let same = install(BinderConfig::new(options("https://a.example")).machine(door("front")));
        let front: Arc<DoorHost> = same.get("front").unwrap();
        assert!(front.matches(&Door::Open));
    }

    #[test]
    fn shared_definitions_are_accepted() {
        let definition = Arc::new(door("front"));
        let registry = install(
            BinderConfig::default().shared_machine(Arc::clone(&definition), MachineOptions::new()),
        );

        assert!(registry.contains("front"));
        assert_eq!(Arc::strong_count(&definition), 2);
    }

    #[test]
    fn empty_config_installs_nothing() {
        let config = BinderConfig::default();
        assert!(config.is_empty());

        let registry = install(config);

        assert!(registry.is_empty());
    }
}
