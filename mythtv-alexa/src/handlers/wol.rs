//! `Alexa.WakeOnLANController`
//!
//! Advertisement only. The capability carries the frontend's MAC address and
//! is withheld whenever the address cannot be found.

use std::sync::Arc;

use alexa_types::{CapabilityDescriptor, DeltaId, Namespace};
use async_trait::async_trait;

use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::handler::CapabilityHandler;
use crate::mac::MacResolver;

pub struct WakeOnLanHandler {
    endpoint: Arc<Endpoint>,
    resolver: Arc<dyn MacResolver>,
}

impl WakeOnLanHandler {
    pub fn new(endpoint: Arc<Endpoint>, resolver: Arc<dyn MacResolver>) -> Self {
        Self { endpoint, resolver }
    }

    async fn descriptor(&self) -> CapabilityDescriptor {
        let hostname = self.endpoint.hostname();
        match self.resolver.resolve_mac(hostname).await {
            Ok(Some(mac)) => CapabilityDescriptor::MacAddresses(vec![mac]),
            Ok(None) => {
                tracing::info!(hostname, "no MAC address found, Wake-on-LAN withheld");
                CapabilityDescriptor::Withheld
            }
            Err(e) => {
                tracing::warn!(hostname, "MAC lookup failed, Wake-on-LAN withheld: {}", e);
                CapabilityDescriptor::Withheld
            }
        }
    }
}

#[async_trait]
impl CapabilityHandler for WakeOnLanHandler {
    fn namespace(&self) -> Namespace {
        Namespace::WakeOnLan
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        let this = Arc::clone(&self);
        self.endpoint.watch_delta(delta, async move {
            let descriptor = this.descriptor().await;
            this.endpoint
                .update_capability(Namespace::WakeOnLan, descriptor, delta);
            Ok::<(), ClientError>(())
        });
    }
}
