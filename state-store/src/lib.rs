//! Endpoint State Store
//!
//! Per-endpoint state management for the MythTV Alexa bridge.
//!
//! # Features
//!
//! - **Field Storage**: namespace -> field -> last-known JSON value
//! - **Change Detection**: `set` reports whether the value actually changed
//! - **Capability Descriptors**: fixed per-namespace capability description
//! - **Change Stream**: broadcast of every write for diagnostics
//! - **State Monitors**: one-shot await-with-timeout on a namespace
//!
//! # Architecture
//!
//! ```text
//! EndpointStateStore
//!     │
//!     ├── state: HashMap<Namespace, FieldMap>
//!     ├── capabilities: HashMap<Namespace, CapabilityDescriptor>
//!     ├── watchers: HashMap<Namespace, Vec<Watcher>>   (one-shot)
//!     └── changes: broadcast::Sender<StateChange>
//!
//! StateMonitor ── watch() ──> StateWatch ── wait() ──> Option<StateSlice>
//! ```

pub mod event;
pub mod monitor;
pub mod store;

pub use event::StateChange;
pub use monitor::{StateMonitor, StateWatch, DEFAULT_MONITOR_TIMEOUT};
pub use store::{EndpointStateStore, FieldMap, Registration, WatchId};
