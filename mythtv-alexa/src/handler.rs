//! Capability handler contract
//!
//! One handler per capability namespace. A handler may accept directives,
//! follow device events, and republish its state and capability on refresh.
//! Every method has a default so each handler implements only what its
//! namespace needs.

use std::sync::Arc;

use alexa_types::{DeltaId, DirectiveError, HandlerResponse, Namespace};
use async_trait::async_trait;
use event_router::{EventKind, EventRouter, EventSource, MythEvent, SubscriptionId};
use serde_json::Value;

use crate::error::HandlerResult;

#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    fn namespace(&self) -> Namespace;

    /// Directive operations this handler accepts
    fn supported_operations(&self) -> &'static [&'static str] {
        self.namespace().supported_operations()
    }

    /// One-time setup before the endpoint accepts directives
    async fn initialize(&self) -> HandlerResult<()> {
        Ok(())
    }

    /// Attach event subscriptions to the endpoint's router
    fn subscribe(self: Arc<Self>, _events: &EventRouter) {}

    /// Run one directive operation
    async fn handle(&self, operation: &str, _payload: Value) -> HandlerResult<HandlerResponse> {
        Err(DirectiveError::invalid_directive(format!(
            "{} does not support {}",
            self.namespace(),
            operation
        ))
        .into())
    }

    /// Recompute and publish current state under `delta`
    fn refresh_state(self: Arc<Self>, _delta: DeltaId) {}

    /// Publish the capability description under `delta`
    fn refresh_capability(self: Arc<Self>, _delta: DeltaId) {}

    /// Publish endpoint metadata under `delta`
    fn refresh_info(self: Arc<Self>, _delta: DeltaId) {}
}

/// Subscribe `handler` to several event kinds without keeping it alive
///
/// The router is owned by the endpoint the handler points at, so holding
/// a strong reference here would leak both.
pub(crate) fn on_events<H, F>(
    handler: &Arc<H>,
    events: &EventRouter,
    source: EventSource,
    kinds: &[EventKind],
    callback: F,
) -> Vec<SubscriptionId>
where
    H: Send + Sync + 'static,
    F: Fn(&Arc<H>, &MythEvent, DeltaId) + Send + Sync + Clone + 'static,
{
    kinds
        .iter()
        .map(|&kind| {
            let weak = Arc::downgrade(handler);
            let callback = callback.clone();
            events.on(source, kind, move |event, delta| {
                if let Some(handler) = weak.upgrade() {
                    callback(&handler, event, delta);
                }
            })
        })
        .collect()
}
