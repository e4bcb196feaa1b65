//! `Alexa.PowerController`
//!
//! Reporting only. A frontend that is connected is on.

use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, DeltaId, Namespace, PowerState, StateUpdate};
use async_trait::async_trait;
use event_router::{EventKind, EventRouter, EventSource};

use crate::endpoint::Endpoint;
use crate::handler::{on_events, CapabilityHandler};

pub struct PowerHandler {
    endpoint: Arc<Endpoint>,
}

impl PowerHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }

    fn set(&self, on: bool, delta: DeltaId) {
        let state = if on { PowerState::On } else { PowerState::Off };
        self.endpoint.update_state(StateUpdate::Power(state), delta);
    }
}

#[async_trait]
impl CapabilityHandler for PowerHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Power
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
            Namespace::Power,
            CapabilityDescriptor::properties(Namespace::Power.state_fields()),
            delta,
        );
    }
}
