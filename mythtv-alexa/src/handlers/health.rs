//! `Alexa.EndpointHealth`

use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, Connectivity, DeltaId, Namespace, StateUpdate};
use async_trait::async_trait;
use event_router::{EventKind, EventRouter, EventSource};

use crate::endpoint::Endpoint;
use crate::handler::{on_events, CapabilityHandler};

/// Mirrors the frontend connection as `OK` / `UNREACHABLE`
pub struct HealthHandler {
    endpoint: Arc<Endpoint>,
}

impl HealthHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }

    fn set(&self, connected: bool, delta: DeltaId) {
        let connectivity = if connected {
            Connectivity::Ok
        } else {
            Connectivity::Unreachable
        };
        self.endpoint
            .update_state(StateUpdate::Connectivity(connectivity), delta);
    }
}

#[async_trait]
impl CapabilityHandler for HealthHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Health
    }

    fn subscribe(self: Arc<Self>, events: &EventRouter) {
        on_events(&self, events, EventSource::Frontend, &[EventKind::ClientConnected], |h, _, delta| {
            h.set(true, delta)
        });
        on_events(&self, events, EventSource::Frontend, &[EventKind::ClientDisconnected], |h, _, delta| {
            h.set(false, delta)
        });
    }

    fn refresh_state(self: Arc<Self>, delta: DeltaId) {
        self.set(self.endpoint.activity().is_connected(), delta);
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::Health,
            CapabilityDescriptor::properties(Namespace::Health.state_fields()),
            delta,
        );
    }
}
