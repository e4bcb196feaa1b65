//! Endpoint composition
//!
//! One `Endpoint` per registered frontend. It holds named handles to every
//! part a capability handler needs: the device clients, the state store and
//! its monitor, the event router and the delta coordinator.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, DeltaId, EndpointId, EndpointInfo, Namespace, StateUpdate};
use event_router::EventRouter;
use parking_lot::Mutex;
use state_store::{EndpointStateStore, StateMonitor, StateWatch};

use crate::activity::FrontendActivity;
use crate::client::{BackendClient, FrontendClient, ShadowPublisher};
use crate::config::BridgeConfig;
use crate::delta::DeltaCoordinator;
use crate::error::ClientError;

/// A frontend as seen by its capability handlers
pub struct Endpoint {
    id: EndpointId,
    hostname: String,
    config: BridgeConfig,
    frontend: Arc<dyn FrontendClient>,
    backend: Arc<dyn BackendClient>,
    publisher: Arc<dyn ShadowPublisher>,
    store: EndpointStateStore,
    monitor: StateMonitor,
    events: Arc<EventRouter>,
    deltas: Arc<DeltaCoordinator>,
    activity: FrontendActivity,
    info: Mutex<Option<EndpointInfo>>,
}

impl Endpoint {
    /// Assemble the endpoint of one frontend
    ///
    /// Activity tracking is subscribed here, ahead of any capability handler.
    pub fn new(
        config: BridgeConfig,
        frontend: Arc<dyn FrontendClient>,
        backend: Arc<dyn BackendClient>,
        publisher: Arc<dyn ShadowPublisher>,
    ) -> Self {
        let hostname = frontend.hostname().to_string();
        let id = EndpointId::new(&config.manufacturer_name, &hostname);
        let store = EndpointStateStore::new();
        let monitor = StateMonitor::with_timeout(store.clone(), config.monitor_timeout);
        let events = Arc::new(EventRouter::new());
        let activity = FrontendActivity::new();
        activity.subscribe(&events);

        Self {
            id,
            hostname,
            config,
            frontend,
            backend,
            publisher,
            store,
            monitor,
            events,
            deltas: Arc::new(DeltaCoordinator::new()),
            activity,
            info: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &EndpointId {
        &self.id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn frontend(&self) -> &Arc<dyn FrontendClient> {
        &self.frontend
    }

    pub fn backend(&self) -> &Arc<dyn BackendClient> {
        &self.backend
    }

    pub fn publisher(&self) -> &Arc<dyn ShadowPublisher> {
        &self.publisher
    }

    pub fn store(&self) -> &EndpointStateStore {
        &self.store
    }

    pub fn events(&self) -> &Arc<EventRouter> {
        &self.events
    }

    pub fn deltas(&self) -> &Arc<DeltaCoordinator> {
        &self.deltas
    }

    pub fn activity(&self) -> &FrontendActivity {
        &self.activity
    }

    // ========================================================================
    // Publication
    // ========================================================================

    /// Write a state field and publish it if the value changed
    ///
    /// The store write (and any watcher it resolves) happens before this
    /// returns; the publication is tracked under `delta`.
    pub fn update_state(&self, update: StateUpdate, delta: DeltaId) -> bool {
        let namespace = update.namespace();
        let field = update.field();
        let value = update.value();

        let changed = self.store.set(namespace, field, value.clone());
        if changed {
            tracing::debug!(endpoint = %self.id, %namespace, field, %value, %delta, "state changed");
            let publisher = Arc::clone(&self.publisher);
            let id = self.id.clone();
            self.deltas.track(delta, async move {
                publisher.update_state(&id, namespace, field, value, delta).await
            });
        }
        changed
    }

    /// Record a capability description and publish it if it changed
    pub fn update_capability(
        &self,
        namespace: Namespace,
        descriptor: CapabilityDescriptor,
        delta: DeltaId,
    ) -> bool {
        let changed = self.store.describe_capability(namespace, descriptor.clone());
        if changed {
            tracing::debug!(endpoint = %self.id, %namespace, ?descriptor, %delta, "capability changed");
            let publisher = Arc::clone(&self.publisher);
            let id = self.id.clone();
            self.deltas.track(delta, async move {
                publisher
                    .update_capability(&id, namespace, &descriptor, delta)
                    .await
            });
        }
        changed
    }

    /// Publish endpoint metadata if it differs from the last publication
    pub fn update_info(&self, info: EndpointInfo, delta: DeltaId) -> bool {
        {
            let mut last = self.info.lock();
            if last.as_ref() == Some(&info) {
                return false;
            }
            *last = Some(info.clone());
        }

        let publisher = Arc::clone(&self.publisher);
        let id = self.id.clone();
        self.deltas.track(delta, async move {
            publisher.update_info(&id, &info, delta).await
        });
        true
    }

    /// Track follow-up work spawned on behalf of `delta`
    pub fn watch_delta<F, E>(&self, delta: DeltaId, work: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.deltas.track(delta, work);
    }

    // ========================================================================
    // Device interaction
    // ========================================================================

    /// Watch for a state field to take the value in `update`
    pub fn monitor(&self, update: &StateUpdate) -> StateWatch {
        let (field, value) = update.expectation();
        self.monitor.watch(update.namespace(), Some((field, value)))
    }

    /// Watch for the next write of any field in `namespace`
    pub fn monitor_any(&self, namespace: Namespace) -> StateWatch {
        self.monitor.watch(namespace, None)
    }

    pub async fn send_action(&self, action: &str) -> Result<(), ClientError> {
        tracing::debug!(endpoint = %self.id, action, "sending action");
        self.frontend.send_action(action).await
    }

    /// Look up a host setting of this frontend
    pub async fn setting(&self, key: &str, default: Option<&str>) -> Result<Option<String>, ClientError> {
        self.backend.get_setting(key, &self.hostname, default).await
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("id", &self.id)
            .field("connected", &self.activity.is_connected())
            .field("watching", &self.activity.is_watching())
            .finish()
    }
}
