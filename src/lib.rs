//! Machine Binder: observable hosts for state machine interpreters
//!
//! Each machine definition handed to [`binder::install`] gets one running
//! interpreter wrapped in a [`binder::MachineHost`]. The host mirrors every
//! changed snapshot into its `current`/`context` fields, can persist the last
//! changed snapshot and restore it on the next start, and forwards events to
//! the interpreter through `send`. Hosts live in an explicitly passed
//! [`binder::Registry`] keyed by machine id.
//!
//! # Modules
//!
//! - [`core`]: state/context/event traits, guards, snapshots, definitions
//! - [`builder`]: fluent definition builders and the `state_enum!` macro
//! - [`interpreter`]: the [`interpreter::Service`] that runs a definition
//! - [`persistence`]: persisted state records and storage backends
//! - [`binder`]: hosts, options, registry and installation
//!
//! # Example
//!
//! ```rust
//! use machine_binder::binder::{install, BinderConfig};
//! use machine_binder::builder::MachineBuilder;
//! use machine_binder::state_enum;
//!
//! state_enum! {
//!     enum Fetch {
//!         Idle,
//!         Loading,
//!     }
//! }
//!
//! let fetch = MachineBuilder::<Fetch, u32, &'static str>::new()
//!     .id("fetch")
//!     .initial(Fetch::Idle)
//!     .context(0)
//!     .on(Fetch::Idle, "FETCH", Fetch::Loading)
//!     .build()
//!     .unwrap();
//!
//! let registry = install(BinderConfig::default().machine(fetch));
//! let host = registry.get::<Fetch, u32, &'static str>("fetch").unwrap();
//!
//! host.subscribe(|snapshot| println!("fetch is now {:?}", snapshot.value));
//! host.send("FETCH");
//! assert!(host.matches(&Fetch::Loading));
//! ```

pub mod binder;
pub mod builder;
pub mod core;
pub mod interpreter;
pub mod persistence;
mod sync;

// Re-export commonly used types
pub use binder::{install, BinderConfig, BinderOptions, MachineHost, MachineOptions, Registry};
pub use builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use core::{Context, Event, Guard, MachineDefinition, Snapshot, State};
pub use interpreter::{Service, ServiceStatus};
pub use persistence::{FileStorage, MemoryStorage, PersistError, StateStorage, StorageError};
