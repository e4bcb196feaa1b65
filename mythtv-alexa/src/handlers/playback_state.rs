//! `Alexa.PlaybackStateReporter`

use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, DeltaId, Namespace, PlaybackState, StateUpdate};
use async_trait::async_trait;
use event_router::{EventKind, EventRouter, EventSource};

use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::handler::{on_events, CapabilityHandler};

pub struct PlaybackStateHandler {
    endpoint: Arc<Endpoint>,
}

impl PlaybackStateHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }

    /// Derive the playback state from activity and play speed
    async fn current_state(&self) -> Result<PlaybackState, ClientError> {
        if !self.endpoint.activity().is_watching() {
            return Ok(PlaybackState::Stopped);
        }
        let status = self.endpoint.frontend().status().await?;
        Ok(if status.is_paused() {
            PlaybackState::Paused
        } else {
            PlaybackState::Playing
        })
    }

    fn set(&self, state: PlaybackState, delta: DeltaId) {
        self.endpoint
            .update_state(StateUpdate::PlaybackState(state), delta);
    }
}

#[async_trait]
impl CapabilityHandler for PlaybackStateHandler {
    fn namespace(&self) -> Namespace {
        Namespace::PlaybackState
    }

    fn subscribe(self: Arc<Self>, events: &EventRouter) {
        on_events(
            &self,
            events,
            EventSource::Frontend,
            &[EventKind::PlayStarted, EventKind::PlayChanged, EventKind::PlayUnpaused],
            |handler, _, delta| handler.set(PlaybackState::Playing, delta),
        );
        on_events(
            &self,
            events,
            EventSource::Frontend,
            &[EventKind::PlayPaused],
            |handler, _, delta| handler.set(PlaybackState::Paused, delta),
        );
        on_events(
            &self,
            events,
            EventSource::Frontend,
            &[EventKind::PlayStopped],
            |handler, _, delta| handler.set(PlaybackState::Stopped, delta),
        );
    }

    fn refresh_state(self: Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(&self);
        self.endpoint.watch_delta(delta, async move {
            let state = this.current_state().await?;
            this.set(state, delta);
            Ok::<(), ClientError>(())
        });
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::PlaybackState,
            CapabilityDescriptor::properties(Namespace::PlaybackState.state_fields()),
            delta,
        );
    }
}
