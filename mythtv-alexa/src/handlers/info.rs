//! `Alexa.EndpointInfo`

use std::sync::Arc;

use alexa_types::{DeltaId, EndpointInfo, Namespace};
use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::handler::CapabilityHandler;

/// Publishes the discovery metadata of the endpoint
pub struct InfoHandler {
    endpoint: Arc<Endpoint>,
}

impl InfoHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }

    async fn endpoint_info(&self) -> Result<EndpointInfo, ClientError> {
        let hostname = self.endpoint.hostname();
        let config = self.endpoint.config();
        let friendly_name = self
            .endpoint
            .setting(&config.friendly_name_setting_key, Some(hostname))
            .await?
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| hostname.to_string());

        Ok(EndpointInfo {
            manufacturer_name: config.manufacturer_name.clone(),
            description: format!("{} Frontend {}", config.manufacturer_name, hostname),
            friendly_name,
            display_categories: vec!["TV".to_string()],
            endpoint_id: self.endpoint.id().clone(),
        })
    }
}

#[async_trait]
impl CapabilityHandler for InfoHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Info
    }

    fn refresh_info(self: Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(&self);
        self.endpoint.watch_delta(delta, async move {
            let info = this.endpoint_info().await?;
            this.endpoint.update_info(info, delta);
            Ok::<(), ClientError>(())
        });
    }
}
