//! Vigil: staleness monitoring for stored artifacts
//!
//! A small alerting pipeline with two halves:
//!
//! - **Checks**: HTTP-triggered freshness checks that compare a stored
//!   object's last-modified time against a staleness threshold and, when the
//!   object is too old, publish exactly one alert event to the event bus.
//! - **Relay**: an event-triggered forwarder that turns a published alert
//!   event into an authenticated push notification (ntfy).
//!
//! The pipeline is stateless: every entity lives and dies within a single
//! invocation. Storage, broker, and the push endpoint are external
//! collaborators reached through the traits in [`storage`] and [`broker`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vigil::api::{build_router, AppState};
//! use vigil::broker::MemoryBus;
//! use vigil::config::ConfigSource;
//! use vigil::relay::Forwarder;
//! use vigil::storage::MemoryObjectStore;
//!
//! let store = Arc::new(MemoryObjectStore::new());
//! let bus = Arc::new(MemoryBus::new());
//! let state = Arc::new(AppState {
//!     store,
//!     bus,
//!     forwarder: Forwarder::new(),
//!     config: ConfigSource::Env,
//! });
//! let app = build_router(state);
//! ```

pub mod api;
pub mod broker;
pub mod config;
pub mod event;
pub mod monitor;
pub mod relay;
pub mod storage;

// Re-export commonly used types
pub use config::{ConfigError, ConfigSource};
pub use event::AlertEvent;
pub use monitor::{run_check, CheckError, CheckKind, CheckReport};
pub use relay::{Forwarder, RelayOutcome};
pub use storage::{ObjectMetadata, ObjectStore};
