//! Endpoint state storage
//!
//! This module provides the storage primitives for one endpoint:
//! - `FieldMap`: last-known value of each field of a namespace
//! - `EndpointStateStore`: namespace -> fields, capability descriptors, and
//!   the one-shot watcher registry the monitor builds on

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, Namespace, StateSlice};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};

use crate::event::StateChange;

/// Last-known value of each field of one namespace
pub type FieldMap = BTreeMap<String, Value>;

const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// Identifies a registered watcher so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

/// Outcome of registering a watcher
#[derive(Debug)]
pub enum Registration {
    /// The expected value is already stored; nothing was registered
    Satisfied,
    /// Listening; the receiver fires on the first matching write
    Pending {
        id: WatchId,
        receiver: oneshot::Receiver<StateSlice>,
    },
}

// ============================================================================
// Watcher - one-shot listener on a namespace
// ============================================================================

struct Watcher {
    id: WatchId,
    expected: Option<(String, Value)>,
    sender: oneshot::Sender<StateSlice>,
}

impl Watcher {
    fn matches(&self, field: &str, value: &Value) -> bool {
        match &self.expected {
            Some((expected_field, expected_value)) => {
                expected_field == field && expected_value == value
            }
            None => true,
        }
    }
}

#[derive(Default)]
struct Inner {
    state: HashMap<Namespace, FieldMap>,
    capabilities: HashMap<Namespace, CapabilityDescriptor>,
    watchers: HashMap<Namespace, Vec<Watcher>>,
}

// ============================================================================
// EndpointStateStore
// ============================================================================

/// State store for a single endpoint
///
/// Each field is written by the handler owning its namespace and may be read
/// by any handler. Writes notify watchers synchronously, before `set`
/// returns, so a watcher registered before a write always observes it.
///
/// Cloning is cheap; clones share the same storage.
///
/// # Example
///
/// ```rust,ignore
/// use alexa_types::Namespace;
/// use serde_json::json;
/// use state_store::EndpointStateStore;
///
/// let store = EndpointStateStore::new();
/// assert!(store.set(Namespace::Power, "powerState", json!("ON")));
/// assert!(!store.set(Namespace::Power, "powerState", json!("ON")));
/// assert_eq!(store.get_field(Namespace::Power, "powerState"), Some(json!("ON")));
/// ```
#[derive(Clone)]
pub struct EndpointStateStore {
    inner: Arc<Mutex<Inner>>,
    changes_tx: broadcast::Sender<StateChange>,
    next_watch: Arc<AtomicU64>,
}

impl EndpointStateStore {
    pub fn new() -> Self {
        let (changes_tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            changes_tx,
            next_watch: Arc::new(AtomicU64::new(1)),
        }
    }

    /// All fields of a namespace, if any were written
    pub fn get(&self, namespace: Namespace) -> Option<FieldMap> {
        self.inner.lock().state.get(&namespace).cloned()
    }

    /// One field of a namespace
    pub fn get_field(&self, namespace: Namespace, field: &str) -> Option<Value> {
        self.inner
            .lock()
            .state
            .get(&namespace)
            .and_then(|fields| fields.get(field))
            .cloned()
    }

    /// Overwrite one field, returning whether the value changed
    ///
    /// Watchers on the namespace whose expectation matches are resolved
    /// before this returns. Watchers expecting a different value stay
    /// registered.
    pub fn set(&self, namespace: Namespace, field: &str, value: Value) -> bool {
        let (changed, ready) = {
            let mut inner = self.inner.lock();
            let fields = inner.state.entry(namespace).or_default();
            let changed = fields.get(field) != Some(&value);
            fields.insert(field.to_string(), value.clone());

            let mut ready = Vec::new();
            if let Some(watchers) = inner.watchers.get_mut(&namespace) {
                let mut index = 0;
                while index < watchers.len() {
                    if watchers[index].sender.is_closed() {
                        watchers.swap_remove(index);
                    } else if watchers[index].matches(field, &value) {
                        ready.push(watchers.swap_remove(index));
                    } else {
                        index += 1;
                    }
                }
                if watchers.is_empty() {
                    inner.watchers.remove(&namespace);
                }
            }
            (changed, ready)
        };

        tracing::trace!(%namespace, field, changed, watchers = ready.len(), "state set");

        for watcher in ready {
            let slice = StateSlice::single(namespace, field, value.clone());
            // Receiver may have timed out in between; nothing to do then
            let _ = watcher.sender.send(slice);
        }

        let _ = self
            .changes_tx
            .send(StateChange::new(namespace, field, value, changed));

        changed
    }

    /// Record the fixed capability description of a namespace
    ///
    /// Returns whether the descriptor changed.
    pub fn describe_capability(&self, namespace: Namespace, descriptor: CapabilityDescriptor) -> bool {
        let mut inner = self.inner.lock();
        let changed = inner.capabilities.get(&namespace) != Some(&descriptor);
        inner.capabilities.insert(namespace, descriptor);
        changed
    }

    /// Capability description of a namespace, if recorded
    pub fn capability(&self, namespace: Namespace) -> Option<CapabilityDescriptor> {
        self.inner.lock().capabilities.get(&namespace).cloned()
    }

    /// Every stored field as a slice
    pub fn snapshot(&self) -> StateSlice {
        let inner = self.inner.lock();
        let mut slice = StateSlice::new();
        for (namespace, fields) in &inner.state {
            for (field, value) in fields {
                slice.insert(*namespace, field.clone(), value.clone());
            }
        }
        slice
    }

    /// Subscribe to every write on this store
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes_tx.subscribe()
    }

    /// Register a one-shot watcher on a namespace
    ///
    /// The satisfaction check and the registration happen under one lock,
    /// so no write can slip in between them.
    pub fn register_watch(
        &self,
        namespace: Namespace,
        expected: Option<(String, Value)>,
    ) -> Registration {
        let mut inner = self.inner.lock();

        if let Some((field, value)) = &expected {
            let current = inner
                .state
                .get(&namespace)
                .and_then(|fields| fields.get(field.as_str()));
            if current == Some(value) {
                return Registration::Satisfied;
            }
        }

        let id = WatchId(self.next_watch.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = oneshot::channel();
        inner.watchers.entry(namespace).or_default().push(Watcher {
            id,
            expected,
            sender,
        });
        Registration::Pending { id, receiver }
    }

    /// Remove a watcher, returning whether it was still registered
    pub fn cancel_watch(&self, namespace: Namespace, id: WatchId) -> bool {
        let mut inner = self.inner.lock();
        let Some(watchers) = inner.watchers.get_mut(&namespace) else {
            return false;
        };
        let before = watchers.len();
        watchers.retain(|w| w.id != id);
        let removed = watchers.len() != before;
        if watchers.is_empty() {
            inner.watchers.remove(&namespace);
        }
        removed
    }

    /// Number of watchers currently registered on a namespace
    pub fn watcher_count(&self, namespace: Namespace) -> usize {
        self.inner
            .lock()
            .watchers
            .get(&namespace)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

impl Default for EndpointStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EndpointStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("EndpointStateStore")
            .field("namespaces", &inner.state.len())
            .field("capabilities", &inner.capabilities.len())
            .field("watchers", &inner.watchers.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}
