//! Observable host wrapping one running interpreter.

use super::diagnostics;
use super::options::HostOptions;
use crate::core::{Context, Event, MachineDefinition, Snapshot, State};
use crate::interpreter::Service;
use crate::persistence::{self, PersistError, StateStorage};
use crate::sync::{lock, read, write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use uuid::Uuid;

/// Lifecycle of a host. The only transition is `Uninitialized -> Running`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostStatus {
    /// Fields hold the resolved starting snapshot, interpreter not started
    Uninitialized,
    /// Interpreter started, changes are mirrored
    Running,
}

/// Callback invoked with every changed snapshot a host mirrors.
pub type ChangeListener<S, C> = Arc<dyn Fn(&Snapshot<S, C>) + Send + Sync>;

/// Handle returned by [`MachineHost::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Fields<S: State, C: Context> {
    current: Arc<Snapshot<S, C>>,
    context: Arc<C>,
}

struct Persistence {
    storage: Arc<dyn StateStorage>,
    key: String,
}

impl Persistence {
    fn restore<S: State, C: Context>(&self, machine_id: &str) -> Option<Snapshot<S, C>> {
        match persistence::load_snapshot(self.storage.as_ref(), &self.key, machine_id) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(
                    machine = machine_id,
                    key = %self.key,
                    %error,
                    "Ignoring unreadable persisted state"
                );
                None
            }
        }
    }
}

/// Per-machine host exposing the latest snapshot, its context and `send`.
///
/// `current` and `context` change only when the interpreter reports a
/// changed snapshot; both are replaced together. Between changes they stay
/// the very same `Arc`s.
pub struct MachineHost<S: State, C: Context, E: Event> {
    id: String,
    service: Service<S, C, E>,
    options: HostOptions,
    persistence: Option<Persistence>,
    fields: RwLock<Fields<S, C>>,
    status: Mutex<HostStatus>,
    subscribers: Mutex<Vec<(SubscriptionId, ChangeListener<S, C>)>>,
    next_subscription: AtomicU64,
}

impl<S: State, C: Context, E: Event> MachineHost<S, C, E> {
    /// Create an uninitialized host.
    ///
    /// With persistence enabled the stored snapshot (if any) seeds the
    /// starting state; unreadable records are logged and ignored. The
    /// starting snapshot is resolved against the definition.
    pub fn new(
        definition: Arc<MachineDefinition<S, C, E>>,
        options: HostOptions,
        storage: Option<Arc<dyn StateStorage>>,
    ) -> Arc<Self> {
        let id = definition.id().to_string();

        let persistence = match (options.persist, storage) {
            (true, Some(storage)) => Some(Persistence {
                storage,
                key: persistence::persisted_key(&id, &options.origin),
            }),
            (true, None) => {
                tracing::warn!(
                    machine = %id,
                    "Persistence requested but no storage configured, continuing without it"
                );
                None
            }
            (false, _) => None,
        };

        let restored = persistence.as_ref().and_then(|p| p.restore::<S, C>(&id));
        let start =
            definition.resolve_state(restored.unwrap_or_else(|| definition.initial_state()));

        let fields = Fields {
            context: Arc::new(start.context.clone()),
            current: Arc::new(start),
        };

        Arc::new(Self {
            id,
            service: Service::new(definition),
            options,
            persistence,
            fields: RwLock::new(fields),
            status: Mutex::new(HostStatus::Uninitialized),
            subscribers: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        })
    }

    /// Register the transition listener and start the interpreter from the
    /// resolved starting snapshot. Later calls do nothing.
    pub fn start(self: &Arc<Self>) {
        {
            let mut status = lock(&self.status);
            if *status == HostStatus::Running {
                return;
            }
            *status = HostStatus::Running;
        }

        let host = Arc::downgrade(self);
        self.service.on_transition(move |snapshot| {
            if let Some(host) = host.upgrade() {
                host.mirror(snapshot);
            }
        });

        let from = Snapshot::clone(&read(&self.fields).current);
        tracing::info!(
            machine = %self.id,
            session = %self.service.session_id(),
            value = from.value.name(),
            persistent = self.persistence.is_some(),
            "Machine host running"
        );
        self.service.start(Some(from));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> HostStatus {
        *lock(&self.status)
    }

    pub fn options(&self) -> &HostOptions {
        &self.options
    }

    /// Session id of the underlying interpreter.
    pub fn session_id(&self) -> Uuid {
        self.service.session_id()
    }

    /// Latest changed snapshot (or the starting snapshot).
    pub fn current(&self) -> Arc<Snapshot<S, C>> {
        Arc::clone(&read(&self.fields).current)
    }

    /// Context of the latest changed snapshot.
    pub fn context(&self) -> Arc<C> {
        Arc::clone(&read(&self.fields).context)
    }

    /// Check whether the current value equals `value`.
    pub fn matches(&self, value: &S) -> bool {
        read(&self.fields).current.matches(value)
    }

    /// Key the host persists under, `None` when persistence is off.
    pub fn persistence_key(&self) -> Option<&str> {
        self.persistence.as_ref().map(|p| p.key.as_str())
    }

    /// Forward an event to the interpreter.
    pub fn send(&self, event: E) {
        self.service.send(event);
    }

    /// Call `listener` with every changed snapshot from now on.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Snapshot<S, C>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        lock(&self.subscribers).push((id, Arc::new(listener)));
        id
    }

    /// Remove a subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }

    fn mirror(&self, snapshot: &Snapshot<S, C>) {
        if !snapshot.changed {
            return;
        }

        let current = Arc::new(snapshot.clone());
        {
            let mut fields = write(&self.fields);
            fields.current = Arc::clone(&current);
            fields.context = Arc::new(snapshot.context.clone());
        }

        if let Err(error) = self.persist(&current) {
            tracing::warn!(
                machine = %self.id,
                %error,
                "Failed to persist machine state"
            );
        }

        if self.options.dev_mode {
            if self.options.log_state {
                diagnostics::log_state(&self.id, &current.value);
            }
            if self.options.log_context {
                diagnostics::log_context(&self.id, &current.context);
            }
        }

        let subscribers: Vec<ChangeListener<S, C>> = lock(&self.subscribers)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in &subscribers {
            listener(&current);
        }
    }

    fn persist(&self, snapshot: &Snapshot<S, C>) -> Result<(), PersistError> {
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };
        persistence::save_snapshot(persistence.storage.as_ref(), &persistence.key, &self.id, snapshot)
    }
}
