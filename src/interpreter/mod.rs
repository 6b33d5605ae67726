//! Interpreter that runs machine definitions.
//!
//! This module is the imperative shell around the pure core: a [`Service`]
//! owns the current snapshot, queues events, applies the definition's
//! transition function and notifies listeners synchronously.
//!
//! # Key Concepts
//!
//! - **Deferred events**: events sent before `start` are processed on start
//! - **Run-to-completion**: one event is fully processed before the next
//! - **Final states**: reaching one stops the service

mod service;

pub use service::{Service, ServiceStatus, TransitionListener};
