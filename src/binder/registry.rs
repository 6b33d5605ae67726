//! Registry of installed machine hosts.

use super::diagnostics::{handle_name, machine_id_from_handle};
use super::host::{HostStatus, MachineHost};
use crate::core::{Context, Event, State};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Type-erased view of a host, used to store machines of different types
/// in one registry.
pub trait ErasedHost: Send + Sync {
    fn id(&self) -> &str;

    fn status(&self) -> HostStatus;

    /// Name of the current state value.
    fn value_name(&self) -> String;

    /// Current snapshot as JSON.
    fn snapshot_json(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<S: State, C: Context, E: Event> ErasedHost for MachineHost<S, C, E> {
    fn id(&self) -> &str {
        MachineHost::id(self)
    }

    fn status(&self) -> HostStatus {
        MachineHost::status(self)
    }

    fn value_name(&self) -> String {
        self.current().value.name().to_string()
    }

    fn snapshot_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&*self.current())
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Machine hosts keyed by machine id.
///
/// Constructed once at startup by [`crate::binder::install`] and passed to
/// the code that needs the machines. Installing a machine whose id is
/// already present replaces the earlier host.
#[derive(Default)]
pub struct Registry {
    hosts: HashMap<String, Arc<dyn ErasedHost>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bind(&mut self, host: Arc<dyn ErasedHost>) {
        let id = host.id().to_string();
        if self.hosts.insert(id.clone(), host).is_some() {
            tracing::debug!(machine = %id, "Replaced previously installed machine");
        }
    }

    /// Typed host for `id`, `None` if absent or installed with other types.
    pub fn get<S: State, C: Context, E: Event>(&self, id: &str) -> Option<Arc<MachineHost<S, C, E>>> {
        let host = Arc::clone(self.hosts.get(id)?);
        host.into_any().downcast::<MachineHost<S, C, E>>().ok()
    }

    /// Typed host for a `$<id>Machine` handle name.
    pub fn by_handle<S: State, C: Context, E: Event>(
        &self,
        handle: &str,
    ) -> Option<Arc<MachineHost<S, C, E>>> {
        self.get(machine_id_from_handle(handle)?)
    }

    pub fn get_erased(&self, id: &str) -> Option<Arc<dyn ErasedHost>> {
        self.hosts.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.hosts.contains_key(id)
    }

    /// Installed machine ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.hosts.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Handle names of installed machines, sorted by id.
    pub fn handles(&self) -> Vec<String> {
        self.ids().into_iter().map(handle_name).collect()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("machines", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::options::HostOptions;
    use crate::builder::MachineBuilder;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Lamp {
        Dark,
        Lit,
    }

    impl State for Lamp {
        fn name(&self) -> &str {
            match self {
                Self::Dark => "dark",
                Self::Lit => "lit",
            }
        }
    }

    fn lamp(id: &str) -> Arc<MachineHost<Lamp, (), &'static str>> {
        let definition = MachineBuilder::new()
            .id(id)
            .initial(Lamp::Dark)
            .context(())
            .on(Lamp::Dark, "SWITCH", Lamp::Lit)
            .build()
            .unwrap();
        let host = MachineHost::new(Arc::new(definition), HostOptions::default(), None);
        host.start();
        host
    }

    #[test]
    fn typed_lookup_returns_bound_host() {
        let mut registry = Registry::new();
        registry.bind(lamp("hall"));

        let host = registry.get::<Lamp, (), &'static str>("hall").unwrap();
        host.send("SWITCH");

        assert!(host.matches(&Lamp::Lit));
        assert_eq!(registry.get_erased("hall").unwrap().value_name(), "lit");
    }

    #[test]
    fn lookup_with_wrong_types_is_none() {
        let mut registry = Registry::new();
        registry.bind(lamp("hall"));

        assert!(registry.get::<Lamp, u32, &'static str>("hall").is_none());
        assert!(registry.get::<Lamp, (), String>("hall").is_none());
    }

    #[test]
    fn handle_lookup_uses_naming_convention() {
        let mut registry = Registry::new();
        registry.bind(lamp("porch"));

        assert!(registry
            .by_handle::<Lamp, (), &'static str>("$porchMachine")
            .is_some());
        assert!(registry
            .by_handle::<Lamp, (), &'static str>("porchMachine")
            .is_none());
        assert_eq!(registry.handles(), vec!["$porchMachine".to_string()]);
    }

    #[test]
    fn rebinding_an_id_replaces_host() {
        let mut registry = Registry::new();
        let first = lamp("hall");
        first.send("SWITCH");
        registry.bind(first);

        registry.bind(lamp("hall"));

        assert_eq!(registry.len(), 1);
        let host = registry.get::<Lamp, (), &'static str>("hall").unwrap();
        assert!(host.matches(&Lamp::Dark));
    }

    #[test]
    fn erased_snapshot_is_json() {
        let mut registry = Registry::new();
        registry.bind(lamp("hall"));

        let json = registry.get_erased("hall").unwrap().snapshot_json().unwrap();

        assert_eq!(json["value"], "Dark");
        assert_eq!(json["changed"], false);
    }

    #[test]
    fn ids_are_sorted() {
        let mut registry = Registry::new();
        registry.bind(lamp("b"));
        registry.bind(lamp("a"));

        assert_eq!(registry.ids(), vec!["a", "b"]);
        assert!(registry.contains("a"));
        assert!(!registry.is_empty());
    }
}
