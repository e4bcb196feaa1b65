//! Endpoint Lifecycle Manager
//!
//! Turns discovered frontends into endpoints: checks the per-host feature
//! flag, builds and registers every capability handler, and runs the
//! initial full publication.

use std::collections::HashMap;
use std::sync::Arc;

use alexa_types::{DeltaId, DirectiveRequest, DirectiveResponse, EndpointId};
use event_router::{EventSource, MythEvent};
use futures::future::join_all;
use parking_lot::RwLock;

use crate::client::{BackendClient, FrontendClient, ShadowPublisher};
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;
use crate::endpoint::Endpoint;
use crate::error::{BridgeError, Result};
use crate::handlers::build_handlers;
use crate::mac::{ArpMacResolver, MacResolver};

/// Owns every endpoint of the bridge
pub struct EndpointManager {
    config: BridgeConfig,
    backend: Arc<dyn BackendClient>,
    publisher: Arc<dyn ShadowPublisher>,
    mac_resolver: Arc<dyn MacResolver>,
    endpoints: RwLock<HashMap<EndpointId, Arc<Dispatcher>>>,
}

impl EndpointManager {
    /// Create a manager, rejecting an invalid configuration
    pub fn new(
        config: BridgeConfig,
        backend: Arc<dyn BackendClient>,
        publisher: Arc<dyn ShadowPublisher>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            backend,
            publisher,
            mac_resolver: Arc::new(ArpMacResolver::new()),
            endpoints: RwLock::new(HashMap::new()),
        })
    }

    /// Replace the ARP-based MAC lookup
    pub fn with_mac_resolver(mut self, resolver: Arc<dyn MacResolver>) -> Self {
        self.mac_resolver = resolver;
        self
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Register every enabled frontend, then publish each endpoint in full
    ///
    /// A frontend that fails to register is logged and skipped; the others
    /// still come up. Returns the ids of the endpoints created.
    pub async fn register_frontends(&self, frontends: Vec<Arc<dyn FrontendClient>>) -> Vec<EndpointId> {
        let results = join_all(frontends.into_iter().map(|frontend| async move {
            let hostname = frontend.hostname().to_string();
            (hostname, self.build_endpoint(frontend).await)
        }))
        .await;

        let mut created = Vec::new();
        for (hostname, result) in results {
            match result {
                Ok(Some(dispatcher)) => created.push(dispatcher),
                Ok(None) => tracing::info!(hostname = %hostname, "Alexa disabled for frontend"),
                Err(e) => tracing::error!(hostname = %hostname, "failed to register frontend: {}", e),
            }
        }

        // Every handler is registered before the first refresh
        join_all(created.iter().map(|dispatcher| self.refresh_endpoint(dispatcher))).await;

        created
            .iter()
            .map(|dispatcher| dispatcher.endpoint().id().clone())
            .collect()
    }

    /// Register one frontend and publish it
    ///
    /// Returns `Ok(None)` when the frontend's feature flag is off.
    pub async fn register_frontend(&self, frontend: Arc<dyn FrontendClient>) -> Result<Option<EndpointId>> {
        let Some(dispatcher) = self.build_endpoint(frontend).await? else {
            return Ok(None);
        };
        self.refresh_endpoint(&dispatcher).await;
        Ok(Some(dispatcher.endpoint().id().clone()))
    }

    async fn is_enabled(&self, hostname: &str) -> Result<bool> {
        let value = self
            .backend
            .get_setting(
                &self.config.enabled_setting_key,
                hostname,
                Some(self.config.enabled_default.as_str()),
            )
            .await?;
        Ok(value.as_deref() == Some("true"))
    }

    async fn build_endpoint(&self, frontend: Arc<dyn FrontendClient>) -> Result<Option<Arc<Dispatcher>>> {
        let hostname = frontend.hostname().to_string();
        if !self.is_enabled(&hostname).await? {
            return Ok(None);
        }

        let id = EndpointId::new(&self.config.manufacturer_name, &hostname);
        if self.endpoints.read().contains_key(&id) {
            return Err(BridgeError::DuplicateEndpoint(id));
        }

        let endpoint = Arc::new(Endpoint::new(
            self.config.clone(),
            frontend,
            Arc::clone(&self.backend),
            Arc::clone(&self.publisher),
        ));

        match endpoint.frontend().status().await {
            Ok(status) => endpoint.activity().seed(Some(&status)),
            Err(e) => {
                tracing::warn!(endpoint = %id, "frontend unreachable at registration: {}", e);
                endpoint.activity().seed(None);
            }
        }

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&endpoint)));
        for handler in build_handlers(&endpoint, &self.mac_resolver) {
            dispatcher.register(handler).await?;
        }

        install_completion_hook(&endpoint);

        {
            let mut endpoints = self.endpoints.write();
            if endpoints.contains_key(&id) {
                return Err(BridgeError::DuplicateEndpoint(id));
            }
            endpoints.insert(id.clone(), Arc::clone(&dispatcher));
        }

        tracing::info!(endpoint = %id, handlers = dispatcher.handler_count(), "endpoint registered");
        Ok(Some(dispatcher))
    }

    /// One full capability, state and metadata publication
    async fn refresh_endpoint(&self, dispatcher: &Dispatcher) -> DeltaId {
        let endpoint = dispatcher.endpoint();
        let delta = endpoint.deltas().new_delta_id();
        dispatcher.refresh(delta);
        endpoint.deltas().settle(delta).await;
        if let Err(e) = endpoint.publisher().complete_delta(endpoint.id(), delta).await {
            tracing::warn!(endpoint = %endpoint.id(), %delta, "failed to complete delta: {}", e);
        }
        tracing::debug!(endpoint = %endpoint.id(), %delta, "refresh complete");
        delta
    }

    /// Recompute an endpoint and publish what changed, returning the delta used
    pub async fn refresh(&self, id: &EndpointId) -> Result<DeltaId> {
        let dispatcher = self.require(id)?;
        Ok(self.refresh_endpoint(&dispatcher).await)
    }

    /// Route a directive to an endpoint and publish the response
    pub async fn dispatch(&self, id: &EndpointId, request: DirectiveRequest) -> Result<DirectiveResponse> {
        let dispatcher = self.require(id)?;
        Ok(dispatcher.dispatch(request).await)
    }

    pub fn endpoint(&self, id: &EndpointId) -> Option<Arc<Endpoint>> {
        self.endpoints
            .read()
            .get(id)
            .map(|dispatcher| Arc::clone(dispatcher.endpoint()))
    }

    pub fn dispatcher(&self, id: &EndpointId) -> Option<Arc<Dispatcher>> {
        self.endpoints.read().get(id).cloned()
    }

    /// Ids of every registered endpoint, sorted
    pub fn endpoints(&self) -> Vec<EndpointId> {
        let mut ids: Vec<EndpointId> = self.endpoints.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn require(&self, id: &EndpointId) -> Result<Arc<Dispatcher>> {
        self.dispatcher(id)
            .ok_or_else(|| BridgeError::UnknownEndpoint(id.clone()))
    }
}

/// Complete each event's delta once the work its handlers spawned settles
fn install_completion_hook(endpoint: &Arc<Endpoint>) {
    let weak = Arc::downgrade(endpoint);
    endpoint
        .events()
        .on_post(move |source: EventSource, event: &MythEvent, delta: DeltaId| {
            let Some(endpoint) = weak.upgrade() else {
                return;
            };
            let kind = event.kind;
            tokio::spawn(async move {
                endpoint.deltas().settle(delta).await;
                if let Err(e) = endpoint.publisher().complete_delta(endpoint.id(), delta).await {
                    tracing::warn!(endpoint = %endpoint.id(), %source, %kind, %delta, "failed to complete delta: {}", e);
                }
            });
        });
}

impl std::fmt::Debug for EndpointManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointManager")
            .field("config", &self.config)
            .field("endpoints", &self.endpoints())
            .finish()
    }
}
