//! `Alexa.PlaybackController`

use std::sync::Arc;

use alexa_types::directive::PlaybackDirective;
use alexa_types::{
    CapabilityDescriptor, DeltaId, HandlerResponse, Namespace, PlaybackState, StateUpdate,
};
use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::handler::CapabilityHandler;

pub struct PlaybackHandler {
    endpoint: Arc<Endpoint>,
}

impl PlaybackHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }
}

/// Frontend action sent for a transport operation
fn action(directive: PlaybackDirective) -> &'static str {
    match directive {
        PlaybackDirective::Play => "PLAY",
        PlaybackDirective::Pause => "PAUSE",
        PlaybackDirective::Stop => "STOPPLAYBACK",
        PlaybackDirective::FastForward => "SEEKFFWD",
        PlaybackDirective::Rewind => "SEEKRWND",
        PlaybackDirective::Next => "SKIPCOMMERCIAL",
        PlaybackDirective::Previous => "SKIPCOMMBACK",
        PlaybackDirective::StartOver => "JUMPSTART",
    }
}

/// Playback state the operation ends in
fn expected_state(directive: PlaybackDirective) -> PlaybackState {
    match directive {
        PlaybackDirective::Stop => PlaybackState::Stopped,
        PlaybackDirective::Pause => PlaybackState::Paused,
        _ => PlaybackState::Playing,
    }
}

#[async_trait]
impl CapabilityHandler for PlaybackHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Playback
    }

    async fn handle(&self, operation: &str, _payload: Value) -> HandlerResult<HandlerResponse> {
        let directive = PlaybackDirective::parse(operation)?;

        let playback_watch = self
            .endpoint
            .monitor(&StateUpdate::PlaybackState(expected_state(directive)));
        // Stopping live TV also clears the tuned channel
        let channel_watch = (directive == PlaybackDirective::Stop
            && self.endpoint.activity().is_watching_tv())
        .then(|| self.endpoint.monitor(&StateUpdate::Channel(None)));

        self.endpoint.send_action(action(directive)).await?;

        let channel_wait = async {
            match channel_watch {
                Some(watch) => watch.wait().await,
                None => Ok(None),
            }
        };
        let (playback, channel) = tokio::try_join!(playback_watch.wait(), channel_wait)?;

        Ok(HandlerResponse::empty().with_state(playback).with_state(channel))
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::Playback,
            CapabilityDescriptor::operations(self.supported_operations()),
            delta,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Play", "PLAY", PlaybackState::Playing)]
    #[case("Pause", "PAUSE", PlaybackState::Paused)]
    #[case("Stop", "STOPPLAYBACK", PlaybackState::Stopped)]
    #[case("FastForward", "SEEKFFWD", PlaybackState::Playing)]
    #[case("Rewind", "SEEKRWND", PlaybackState::Playing)]
    #[case("Next", "SKIPCOMMERCIAL", PlaybackState::Playing)]
    #[case("Previous", "SKIPCOMMBACK", PlaybackState::Playing)]
    #[case("StartOver", "JUMPSTART", PlaybackState::Playing)]
    fn test_operation_mapping(#[case] operation: &str, #[case] sent: &str, #[case] state: PlaybackState) {
        let directive = PlaybackDirective::parse(operation).unwrap();
        assert_eq!(action(directive), sent);
        assert_eq!(expected_state(directive), state);
    }
}
