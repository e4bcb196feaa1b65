//! `Alexa.ChannelController`

use std::sync::Arc;

use alexa_types::directive::{ChannelDirective, ChangeChannelRequest};
use alexa_types::{
    CapabilityDescriptor, ChannelState, DeltaId, DirectiveError, HandlerResponse, Namespace,
    PlaybackState, StateSlice, StateUpdate,
};
use async_trait::async_trait;
use event_router::{EventKind, EventRouter, EventSource};
use parking_lot::RwLock;
use serde_json::Value;

use crate::channels::ChannelDirectory;
use crate::endpoint::Endpoint;
use crate::error::{ClientError, HandlerResult};
use crate::handler::{on_events, CapabilityHandler};
use crate::model::ChannelInfo;

pub struct ChannelHandler {
    endpoint: Arc<Endpoint>,
    directory: RwLock<ChannelDirectory>,
}

/// Reported state of a tuned channel
fn channel_state(info: &ChannelInfo) -> ChannelState {
    let state = ChannelState::new(info.chan_num.clone());
    if info.call_sign.is_empty() {
        state
    } else {
        state.with_affiliate_call_sign(info.call_sign.clone())
    }
}

impl ChannelHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self {
            endpoint,
            directory: RwLock::new(ChannelDirectory::default()),
        }
    }

    /// Reload the channel directory from the backend
    pub async fn reload_directory(&self) -> Result<usize, ClientError> {
        let channels = self.endpoint.backend().channel_directory().await?;
        let directory = ChannelDirectory::new(channels);
        let count = directory.len();
        *self.directory.write() = directory;
        tracing::debug!(endpoint = %self.endpoint.id(), channels = count, "channel directory loaded");
        Ok(count)
    }

    /// Channel currently tuned, if watching live TV
    async fn current_channel(&self) -> Result<Option<ChannelState>, ClientError> {
        if !self.endpoint.activity().is_watching_tv() {
            return Ok(None);
        }
        let status = self.endpoint.frontend().status().await?;
        let Some(chan_id) = status.chan_id.filter(|id| !id.is_empty()) else {
            return Ok(None);
        };
        let info = self.endpoint.backend().channel_info(&chan_id).await?;
        Ok(info.as_ref().map(channel_state))
    }

    /// Last reported channel, falling back to asking the frontend
    async fn reported_channel(&self) -> Result<Option<ChannelState>, ClientError> {
        let stored = self
            .endpoint
            .store()
            .get_field(Namespace::Channel, "channel")
            .and_then(|value| serde_json::from_value::<Option<ChannelState>>(value).ok())
            .flatten();
        match stored {
            Some(channel) => Ok(Some(channel)),
            None => self.current_channel().await,
        }
    }

    fn refresh_channel(self: &Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(self);
        self.endpoint.watch_delta(delta, async move {
            let channel = this.current_channel().await?;
            this.endpoint.update_state(StateUpdate::Channel(channel), delta);
            Ok::<(), ClientError>(())
        });
    }

    async fn change_channel(&self, request: ChangeChannelRequest) -> HandlerResult<HandlerResponse> {
        let empty = self.directory.read().is_empty();
        if empty {
            self.reload_directory().await?;
        }
        let chan_num = self
            .directory
            .read()
            .resolve(&request)
            .ok_or_else(|| DirectiveError::not_subscribed("Invalid Channel"))?;
        self.tune(&chan_num).await
    }

    async fn skip_channels(&self, count: i64) -> HandlerResult<HandlerResponse> {
        if !self.endpoint.activity().is_watching_tv() {
            return Err(DirectiveError::not_supported_in_current_mode("Not Watching TV").into());
        }
        let current = self
            .reported_channel()
            .await?
            .ok_or_else(|| DirectiveError::not_supported_in_current_mode("Not Watching TV"))?;
        let chan_num = self
            .directory
            .read()
            .skip(&current.number, count)
            .map(str::to_string)
            .ok_or_else(|| DirectiveError::not_subscribed("Invalid Channel"))?;
        self.tune(&chan_num).await
    }

    /// Switch the frontend to `chan_num` and wait until it reports it
    async fn tune(&self, chan_num: &str) -> HandlerResult<HandlerResponse> {
        let target = self
            .directory
            .read()
            .get(chan_num)
            .map(channel_state)
            .unwrap_or_else(|| ChannelState::new(chan_num));
        let expected = StateUpdate::Channel(Some(target));
        let mut state = StateSlice::new();

        if !self.endpoint.activity().is_watching_tv() {
            // Register both before sending so a fast switch is not missed
            let channel_watch = self.endpoint.monitor_any(Namespace::Channel);
            let playing_watch = self
                .endpoint
                .monitor(&StateUpdate::PlaybackState(PlaybackState::Playing));
            self.endpoint.send_action("Live TV").await?;
            let (channel, playing) = tokio::try_join!(channel_watch.wait(), playing_watch.wait())?;
            state.merge(channel.unwrap_or_default());
            state.merge(playing.unwrap_or_default());

            if self.endpoint.store().get_field(Namespace::Channel, "channel") == Some(expected.value()) {
                tracing::debug!(endpoint = %self.endpoint.id(), chan_num, "live TV started on target channel");
                state.merge(StateSlice::from(&expected));
                return Ok(HandlerResponse::empty().with_state(Some(state)));
            }
        }

        let watch = self.endpoint.monitor(&expected);
        for digit in chan_num.chars() {
            self.endpoint.send_action(&digit.to_string()).await?;
        }
        self.endpoint.send_action("SELECT").await?;
        let observed = watch.wait().await?;

        state.merge(observed.unwrap_or_else(|| StateSlice::from(&expected)));
        Ok(HandlerResponse::empty().with_state(Some(state)))
    }
}

#[async_trait]
impl CapabilityHandler for ChannelHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Channel
    }

    async fn initialize(&self) -> HandlerResult<()> {
        if let Err(e) = self.reload_directory().await {
            tracing::warn!(endpoint = %self.endpoint.id(), "channel directory unavailable: {}", e);
        }
        Ok(())
    }

    fn subscribe(self: Arc<Self>, events: &EventRouter) {
        on_events(
            &self,
            events,
            EventSource::Frontend,
            &[EventKind::PlayChanged, EventKind::LiveTvStarted],
            |handler, _, delta| handler.refresh_channel(delta),
        );
        on_events(
            &self,
            events,
            EventSource::Frontend,
            &[EventKind::LiveTvEnded, EventKind::PlayStopped],
            |handler, _, delta| {
                handler.endpoint.update_state(StateUpdate::Channel(None), delta);
            },
        );
    }

    async fn handle(&self, operation: &str, payload: Value) -> HandlerResult<HandlerResponse> {
        match ChannelDirective::parse(operation, payload)? {
            ChannelDirective::ChangeChannel(request) => self.change_channel(request).await,
            ChannelDirective::SkipChannels(request) => self.skip_channels(request.channel_count).await,
        }
    }

    fn refresh_state(self: Arc<Self>, delta: DeltaId) {
        self.refresh_channel(delta);
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::Channel,
            CapabilityDescriptor::properties(Namespace::Channel.state_fields()),
            delta,
        );
    }
}
