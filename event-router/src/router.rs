//! Per-endpoint event router
//!
//! Handlers subscribe to `(source, kind)` pairs. Each emission allocates one
//! `DeltaId`, hands it to every handler, then runs the post hooks with the
//! same id so the endpoint can complete the delta once all handlers ran.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alexa_types::DeltaId;
use dashmap::DashMap;
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use tokio::sync::oneshot;

use crate::event::{EventKind, EventSource, MythEvent};

/// Callback invoked for each matching event
pub type EventHandler = Arc<dyn Fn(&MythEvent, DeltaId) + Send + Sync>;

/// Callback invoked after all handlers of an emission ran
pub type PostHandler = Arc<dyn Fn(EventSource, &MythEvent, DeltaId) + Send + Sync>;

/// Identifies a subscription for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Routes frontend and backend events to subscribed handlers
///
/// Emissions are serialized, so every handler sees events in the order they
/// were emitted, across both sources. Handlers run synchronously inside
/// `emit`; state they write is visible to anyone awaiting it as soon as the
/// handler returns. Long-running work should be spawned and tracked under
/// the delta id passed in.
pub struct EventRouter {
    subscriptions: DashMap<(EventSource, EventKind), Vec<(SubscriptionId, EventHandler)>>,
    once: Mutex<HashMap<(EventSource, EventKind), Vec<oneshot::Sender<MythEvent>>>>,
    post: RwLock<Vec<PostHandler>>,
    emit_lock: ReentrantMutex<()>,
    next_id: AtomicU64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self {
            subscriptions: DashMap::new(),
            once: Mutex::new(HashMap::new()),
            post: RwLock::new(Vec::new()),
            emit_lock: ReentrantMutex::new(()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Subscribe a handler to one event kind on one source
    pub fn on<F>(&self, source: EventSource, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&MythEvent, DeltaId) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .entry((source, kind))
            .or_default()
            .push((id, Arc::new(handler)));
        tracing::trace!(%source, %kind, "handler subscribed");
        id
    }

    /// Remove a subscription, returning whether it existed
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut removed = false;
        for mut entry in self.subscriptions.iter_mut() {
            let before = entry.value().len();
            entry.value_mut().retain(|(sub, _)| *sub != id);
            removed |= entry.value().len() != before;
        }
        removed
    }

    /// Resolve on the next event of a kind, then unsubscribe
    ///
    /// Waiters whose receiver was dropped are discarded here.
    pub fn once(&self, source: EventSource, kind: EventKind) -> oneshot::Receiver<MythEvent> {
        let (tx, rx) = oneshot::channel();
        let mut once = self.once.lock();
        once.retain(|_, waiters| {
            waiters.retain(|waiter| !waiter.is_closed());
            !waiters.is_empty()
        });
        once.entry((source, kind)).or_default().push(tx);
        rx
    }

    /// Number of `once` waiters still registered for a kind
    pub fn pending_once(&self, source: EventSource, kind: EventKind) -> usize {
        self.once
            .lock()
            .get(&(source, kind))
            .map(|waiters| waiters.len())
            .unwrap_or(0)
    }

    /// Register a hook that runs after every emission
    pub fn on_post<F>(&self, hook: F)
    where
        F: Fn(EventSource, &MythEvent, DeltaId) + Send + Sync + 'static,
    {
        self.post.write().push(Arc::new(hook));
    }

    /// Number of handlers subscribed to a kind on a source
    pub fn handler_count(&self, source: EventSource, kind: EventKind) -> usize {
        self.subscriptions
            .get(&(source, kind))
            .map(|handlers| handlers.len())
            .unwrap_or(0)
    }

    /// Deliver an event to every interested handler
    ///
    /// Returns the delta id allocated for this emission.
    pub fn emit(&self, source: EventSource, event: MythEvent) -> DeltaId {
        let _serialized = self.emit_lock.lock();
        let delta = DeltaId::next();

        // Clone out so handlers may subscribe or unsubscribe while running
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .get(&(source, event.kind))
            .map(|entry| entry.value().iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();

        tracing::debug!(
            %source,
            kind = %event.kind,
            %delta,
            handlers = handlers.len(),
            "routing event"
        );

        for handler in &handlers {
            handler(&event, delta);
        }

        let waiters = self.once.lock().remove(&(source, event.kind));
        for waiter in waiters.into_iter().flatten() {
            let _ = waiter.send(event.clone());
        }

        let hooks: Vec<PostHandler> = self.post.read().clone();
        for hook in &hooks {
            hook(source, &event, delta);
        }

        delta
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("subscriptions", &self.subscriptions.len())
            .field("post_hooks", &self.post.read().len())
            .finish()
    }
}
