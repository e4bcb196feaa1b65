//! Collaborator interfaces
//!
//! The bridge core talks to the outside world only through these traits:
//! the frontend's HTTP services, the master backend's services, and the
//! device-shadow transport. Implementations live outside this crate.

use alexa_types::{
    CapabilityDescriptor, DeltaId, DirectiveResponse, EndpointId, EndpointInfo, Namespace,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::ClientError;
use crate::model::{ChannelInfo, FrontendStatus, Program, VideoMetadata};

/// Control and status interface of one MythTV frontend
#[async_trait]
pub trait FrontendClient: Send + Sync {
    /// Hostname the frontend is registered under
    fn hostname(&self) -> &str;

    /// Send a named action (`PLAY`, `Live TV`, a digit, ...)
    async fn send_action(&self, action: &str) -> Result<(), ClientError>;

    /// Current status, possibly cached by the client
    async fn status(&self) -> Result<FrontendStatus, ClientError>;

    /// Status fetched fresh from the frontend
    async fn refreshed_status(&self) -> Result<FrontendStatus, ClientError> {
        self.status().await
    }

    async fn play_recording(&self, recorded_id: &str) -> Result<(), ClientError>;

    async fn play_video(&self, id: &str, use_bookmark: bool) -> Result<(), ClientError>;
}

/// Master backend services
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Look up a host setting, falling back to `default` when unset
    async fn get_setting(
        &self,
        key: &str,
        host: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ClientError>;

    /// Every channel of every video source
    async fn channel_directory(&self) -> Result<Vec<ChannelInfo>, ClientError>;

    async fn channel_info(&self, chan_id: &str) -> Result<Option<ChannelInfo>, ClientError>;

    /// Recorded program for a channel and start time
    async fn get_recorded(
        &self,
        chan_id: &str,
        start_time: DateTime<Utc>,
    ) -> Result<Option<Program>, ClientError>;

    /// Recordings whose title matches a regular expression
    async fn recorded_list(&self, title_regex: &str) -> Result<Vec<Program>, ClientError>;

    async fn video_list(&self) -> Result<Vec<VideoMetadata>, ClientError>;
}

/// Outbound device-shadow transport
///
/// Calls are fire-and-forget from the core's perspective; the endpoint
/// tracks each one under its delta id.
#[async_trait]
pub trait ShadowPublisher: Send + Sync {
    async fn update_state(
        &self,
        endpoint: &EndpointId,
        namespace: Namespace,
        field: &str,
        value: Value,
        delta: DeltaId,
    ) -> Result<(), ClientError>;

    async fn update_capability(
        &self,
        endpoint: &EndpointId,
        namespace: Namespace,
        descriptor: &CapabilityDescriptor,
        delta: DeltaId,
    ) -> Result<(), ClientError>;

    async fn update_info(
        &self,
        endpoint: &EndpointId,
        info: &EndpointInfo,
        delta: DeltaId,
    ) -> Result<(), ClientError>;

    /// Publish a directive response under its correlation token
    async fn publish_response(
        &self,
        endpoint: &EndpointId,
        reply_to: &str,
        response: &DirectiveResponse,
    ) -> Result<(), ClientError>;

    /// All updates of a delta have been published
    async fn complete_delta(&self, _endpoint: &EndpointId, _delta: DeltaId) -> Result<(), ClientError> {
        Ok(())
    }
}
