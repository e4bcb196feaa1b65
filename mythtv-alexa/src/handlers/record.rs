//! `Alexa.RecordController`
//!
//! Follows the program on screen as `(channel, start time)` and asks the
//! backend whether that program is being recorded. The live TV buffer is a
//! recording too, in the `LiveTV` group, and does not count.

use std::sync::Arc;

use alexa_types::directive::RecordDirective;
use alexa_types::{
    CapabilityDescriptor, DeltaId, HandlerResponse, Namespace, RecordingState, StateSlice,
    StateUpdate,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use event_router::{EventKind, EventRouter, EventSource, MythEvent};
use parking_lot::Mutex;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::{ClientError, HandlerResult};
use crate::handler::{on_events, CapabilityHandler};

/// Identifies the program being watched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramKey {
    pub chan_id: String,
    pub start_time: DateTime<Utc>,
}

pub struct RecordHandler {
    endpoint: Arc<Endpoint>,
    program: Mutex<Option<ProgramKey>>,
}

impl RecordHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self {
            endpoint,
            program: Mutex::new(None),
        }
    }

    pub fn program(&self) -> Option<ProgramKey> {
        self.program.lock().clone()
    }

    fn on_play_changed(self: &Arc<Self>, event: &MythEvent, delta: DeltaId) {
        let key = event
            .message
            .chan_id()
            .zip(event.message.start_time())
            .map(|(chan_id, start_time)| ProgramKey {
                chan_id: chan_id.to_string(),
                start_time,
            });
        *self.program.lock() = key;
        self.refresh_recording(delta);
    }

    /// A recording started on the backend; follow its start time if it is ours
    fn on_rec_started(self: &Arc<Self>, event: &MythEvent, delta: DeltaId) {
        let (Some(chan_id), Some(start_time)) = (event.message.chan_id(), event.message.start_time())
        else {
            return;
        };
        let updated = {
            let mut program = self.program.lock();
            match program.as_mut() {
                Some(key) if key.chan_id == chan_id => {
                    key.start_time = start_time;
                    true
                }
                _ => false,
            }
        };
        if updated {
            self.refresh_recording(delta);
        }
    }

    fn on_live_tv_ended(&self, delta: DeltaId) {
        *self.program.lock() = None;
        self.endpoint
            .update_state(StateUpdate::Recording(RecordingState::NotRecording), delta);
    }

    async fn recording_state(&self) -> Result<RecordingState, ClientError> {
        let Some(key) = self.program() else {
            return Ok(RecordingState::NotRecording);
        };
        let program = self
            .endpoint
            .backend()
            .get_recorded(&key.chan_id, key.start_time)
            .await?;
        Ok(program
            .and_then(|program| program.recording)
            .map(|recording| RecordingState::from_rec_group(&recording.rec_group))
            .unwrap_or(RecordingState::NotRecording))
    }

    fn refresh_recording(self: &Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(self);
        self.endpoint.watch_delta(delta, async move {
            let state = this.recording_state().await?;
            this.endpoint.update_state(StateUpdate::Recording(state), delta);
            Ok::<(), ClientError>(())
        });
    }

    /// Pick up the program on screen when no event has told us yet
    async fn seed_program(&self) -> Result<(), ClientError> {
        if !self.endpoint.activity().is_watching_tv() || self.program().is_some() {
            return Ok(());
        }
        let status = self.endpoint.frontend().status().await?;
        if let (Some(chan_id), Some(start_time)) = (status.chan_id, status.start_time) {
            *self.program.lock() = Some(ProgramKey { chan_id, start_time });
        }
        Ok(())
    }
}

#[async_trait]
impl CapabilityHandler for RecordHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Record
    }

    fn subscribe(self: Arc<Self>, events: &EventRouter) {
        on_events(&self, events, EventSource::Frontend, &[EventKind::PlayChanged], |h, event, delta| {
            h.on_play_changed(event, delta)
        });
        on_events(&self, events, EventSource::Frontend, &[EventKind::LiveTvEnded], |h, _, delta| {
            h.on_live_tv_ended(delta)
        });
        on_events(&self, events, EventSource::Backend, &[EventKind::RecStarted], |h, event, delta| {
            h.on_rec_started(event, delta)
        });
        on_events(&self, events, EventSource::Backend, &[EventKind::SchedulerRan], |h, _, delta| {
            h.refresh_recording(delta)
        });
    }

    async fn handle(&self, operation: &str, _payload: Value) -> HandlerResult<HandlerResponse> {
        let expected = match RecordDirective::parse(operation)? {
            RecordDirective::StartRecording => RecordingState::Recording,
            RecordDirective::StopRecording => RecordingState::NotRecording,
        };
        let update = StateUpdate::Recording(expected);

        // Toggling while already in the requested state would undo it
        let watch = self.endpoint.monitor(&update);
        if watch.is_satisfied() {
            tracing::debug!(endpoint = %self.endpoint.id(), ?expected, "already in requested recording state");
            return Ok(HandlerResponse::empty().with_state(Some(StateSlice::from(&update))));
        }

        self.endpoint.send_action("TOGGLERECORD").await?;
        let observed = watch.wait().await?;
        Ok(HandlerResponse::empty().with_state(Some(observed.unwrap_or_else(|| StateSlice::from(&update)))))
    }

    fn refresh_state(self: Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(&self);
        self.endpoint.watch_delta(delta, async move {
            this.seed_program().await?;
            let state = this.recording_state().await?;
            this.endpoint.update_state(StateUpdate::Recording(state), delta);
            Ok::<(), ClientError>(())
        });
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::Record,
            CapabilityDescriptor::properties(Namespace::Record.state_fields()),
            delta,
        );
    }
}
