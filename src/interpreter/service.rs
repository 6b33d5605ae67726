//! Running interpreter for one machine definition.

use crate::core::{Context, Event, MachineDefinition, Snapshot, State};
use crate::sync::lock;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Lifecycle of a service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceStatus {
    /// Created, events are deferred until `start`
    NotStarted,
    /// Processing events
    Running,
    /// Stopped explicitly or by reaching a final state; events are dropped
    Stopped,
}

/// Callback invoked with every snapshot the service produces.
pub type TransitionListener<S, C> = Arc<dyn Fn(&Snapshot<S, C>) + Send + Sync>;

struct Inner<S: State, C: Context> {
    status: ServiceStatus,
    state: Snapshot<S, C>,
}

/// Interpreter that drives a [`MachineDefinition`] with events.
///
/// Events are processed run-to-completion: each event is fully applied and
/// its listeners notified before the next one is taken from the queue.
/// Listeners may call `send` themselves; such events are queued and
/// processed once the current one completes.
pub struct Service<S: State, C: Context, E: Event> {
    definition: Arc<MachineDefinition<S, C, E>>,
    session_id: Uuid,
    inner: Mutex<Inner<S, C>>,
    queue: Mutex<VecDeque<E>>,
    processing: AtomicBool,
    listeners: Mutex<Vec<TransitionListener<S, C>>>,
}

/// Clears the processing flag even if a listener panics.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: State, C: Context, E: Event> Service<S, C, E> {
    /// Create a service in the `NotStarted` state, holding the definition's
    /// initial snapshot.
    pub fn new(definition: Arc<MachineDefinition<S, C, E>>) -> Self {
        let state = definition.initial_state();
        Self {
            definition,
            session_id: Uuid::new_v4(),
            inner: Mutex::new(Inner {
                status: ServiceStatus::NotStarted,
                state,
            }),
            queue: Mutex::new(VecDeque::new()),
            processing: AtomicBool::new(false),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn definition(&self) -> &Arc<MachineDefinition<S, C, E>> {
        &self.definition
    }

    /// Unique id of this interpreter instance.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn status(&self) -> ServiceStatus {
        lock(&self.inner).status
    }

    /// Latest snapshot.
    pub fn state(&self) -> Snapshot<S, C> {
        lock(&self.inner).state.clone()
    }

    /// Register a listener called after every processed event.
    pub fn on_transition<F>(&self, listener: F) -> &Self
    where
        F: Fn(&Snapshot<S, C>) + Send + Sync + 'static,
    {
        lock(&self.listeners).push(Arc::new(listener));
        self
    }

    /// Start the service from `from` (resolved against the definition) or
    /// from the initial state.
    ///
    /// Listeners are notified once with the starting snapshot, then events
    /// deferred before the start are processed. Starting twice is a no-op.
    pub fn start(&self, from: Option<Snapshot<S, C>>) -> &Self {
        let snapshot = {
            let mut inner = lock(&self.inner);
            if inner.status != ServiceStatus::NotStarted {
                tracing::warn!(
                    machine = %self.definition.id(),
                    session = %self.session_id,
                    status = ?inner.status,
                    "Service already started"
                );
                return self;
            }

            let start = match from {
                Some(snapshot) => self.definition.resolve_state(snapshot),
                None => self.definition.initial_state(),
            };
            inner.state = start.clone();
            inner.status = if start.is_done() {
                ServiceStatus::Stopped
            } else {
                ServiceStatus::Running
            };
            start
        };

        tracing::debug!(
            machine = %self.definition.id(),
            session = %self.session_id,
            value = snapshot.value.name(),
            "Service started"
        );

        self.notify(&snapshot);
        self.drain();
        self
    }

    /// Send an event to the service.
    ///
    /// Before `start` the event is deferred; after a stop it is dropped.
    pub fn send(&self, event: E) {
        if self.status() == ServiceStatus::Stopped {
            tracing::warn!(
                machine = %self.definition.id(),
                session = %self.session_id,
                event = event.name(),
                "Event sent to stopped service was dropped"
            );
            return;
        }

        lock(&self.queue).push_back(event);

        if self.status() == ServiceStatus::Running {
            self.drain();
        } else {
            tracing::debug!(
                machine = %self.definition.id(),
                session = %self.session_id,
                "Event deferred until service starts"
            );
        }
    }

    /// Stop the service and discard queued events.
    pub fn stop(&self) {
        lock(&self.inner).status = ServiceStatus::Stopped;
        let discarded = {
            let mut queue = lock(&self.queue);
            let count = queue.len();
            queue.clear();
            count
        };

        tracing::debug!(
            machine = %self.definition.id(),
            session = %self.session_id,
            discarded,
            "Service stopped"
        );
    }

    fn drain(&self) {
        loop {
            if self
                .processing
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                // Another turn is draining; it will pick up our event.
                return;
            }

            {
                let _guard = ProcessingGuard(&self.processing);
                loop {
                    let next = lock(&self.queue).pop_front();
                    let Some(event) = next else { break };
                    self.process(event);
                }
            }

            // An event may have been queued after our last pop but before
            // the flag was cleared.
            if lock(&self.queue).is_empty() {
                return;
            }
        }
    }

    fn process(&self, event: E) {
        let snapshot = {
            let mut inner = lock(&self.inner);
            if inner.status != ServiceStatus::Running {
                tracing::debug!(
                    machine = %self.definition.id(),
                    session = %self.session_id,
                    event = event.name(),
                    "Dropping event, service is not running"
                );
                return;
            }

            let next = self.definition.transition(&inner.state, &event);
            if next.is_done() {
                inner.status = ServiceStatus::Stopped;
            }
            inner.state = next.clone();
            next
        };

        if snapshot.is_done() {
            tracing::debug!(
                machine = %self.definition.id(),
                session = %self.session_id,
                value = snapshot.value.name(),
                "Service reached final state"
            );
        }

        self.notify(&snapshot);
    }

    fn notify(&self, snapshot: &Snapshot<S, C>) {
        let listeners: Vec<TransitionListener<S, C>> = lock(&self.listeners).clone();
        for listener in &listeners {
            listener(snapshot);
        }
    }
}
