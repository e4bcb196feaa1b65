//! `Alexa.SeekController`
//!
//! Seeking goes through the frontend's network control socket rather than
//! the action API, so the capability is offered only when network control
//! is enabled on the host.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alexa_types::directive::SeekDirective;
use alexa_types::{CapabilityDescriptor, DeltaId, HandlerResponse, Namespace};
use async_trait::async_trait;
use network_control::{Command, NetworkControlClient};
use serde_json::{json, Value};

use crate::endpoint::Endpoint;
use crate::error::{ClientError, HandlerResult};
use crate::handler::CapabilityHandler;
use crate::model::FrontendStatus;

const ENABLED_SETTING: &str = "NetworkControlEnabled";
const PORT_SETTING: &str = "NetworkControlPort";

pub struct SeekHandler {
    endpoint: Arc<Endpoint>,
    port: AtomicU16,
}

impl SeekHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        let port = endpoint.config().network_control_port;
        Self {
            endpoint,
            port: AtomicU16::new(port),
        }
    }

    pub fn port(&self) -> u16 {
        self.port.load(Ordering::SeqCst)
    }

    /// Whether network control is enabled; also picks up the configured port
    async fn verify(&self) -> Result<bool, ClientError> {
        let enabled = self.endpoint.setting(ENABLED_SETTING, None).await?;
        if enabled.as_deref() != Some("1") {
            tracing::debug!(endpoint = %self.endpoint.id(), "network control not enabled");
            return Ok(false);
        }

        let default_port = self.port().to_string();
        let port = self
            .endpoint
            .setting(PORT_SETTING, Some(default_port.as_str()))
            .await?
            .unwrap_or_else(|| default_port.clone());
        match port.trim().parse::<u16>() {
            Ok(port) => {
                self.port.store(port, Ordering::SeqCst);
                Ok(true)
            }
            Err(_) => {
                tracing::warn!(endpoint = %self.endpoint.id(), port = %port, "invalid network control port");
                Ok(false)
            }
        }
    }

    fn client(&self) -> NetworkControlClient {
        NetworkControlClient::new(self.endpoint.hostname(), self.port())
            .with_timeout(self.endpoint.config().network_control_timeout)
    }

    async fn adjust(&self, delta_millis: i64) -> HandlerResult<HandlerResponse> {
        let status = self.endpoint.frontend().refreshed_status().await?;
        let target = seek_target(&status, delta_millis);

        self.client().send(&Command::PlaySeek(target)).await?;

        let status = self.endpoint.frontend().refreshed_status().await?;
        let position = (status.seconds_played * 1000.0).round() as i64;
        Ok(HandlerResponse::with_payload(json!({
            "properties": [{
                "name": "positionMilliseconds",
                "value": position,
            }]
        })))
    }
}

/// Absolute position after moving `delta_millis`, clamped to the program
fn seek_target(status: &FrontendStatus, delta_millis: i64) -> Duration {
    let played = (status.seconds_played * 1000.0).round() as i64;
    let total = ((status.total_seconds * 1000.0).round() as i64).max(0);
    let target = played.saturating_add(delta_millis).clamp(0, total);
    Duration::from_millis(target as u64)
}

#[async_trait]
impl CapabilityHandler for SeekHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Seek
    }

    async fn handle(&self, operation: &str, payload: Value) -> HandlerResult<HandlerResponse> {
        match SeekDirective::parse(operation, payload)? {
            SeekDirective::AdjustSeekPosition(request) => {
                self.adjust(request.delta_position_milliseconds).await
            }
        }
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(&self);
        self.endpoint.watch_delta(delta, async move {
            let descriptor = match this.verify().await {
                Ok(true) => CapabilityDescriptor::Enabled,
                Ok(false) => CapabilityDescriptor::Withheld,
                Err(e) => {
                    tracing::warn!(endpoint = %this.endpoint.id(), "network control check failed: {}", e);
                    CapabilityDescriptor::Withheld
                }
            };
            this.endpoint.update_capability(Namespace::Seek, descriptor, delta);
            Ok::<(), ClientError>(())
        });
    }
}
