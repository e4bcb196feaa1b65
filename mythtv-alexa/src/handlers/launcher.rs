//! `Alexa.Launcher`
//!
//! Maps Alexa shortcut targets to frontend jump points.

use std::sync::Arc;

use alexa_types::directive::LauncherDirective;
use alexa_types::{CapabilityDescriptor, DeltaId, HandlerResponse, Namespace};
use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::handler::CapabilityHandler;

const SHORTCUT_PREFIX: &str = "amzn1.alexa-ask-target.shortcut.";

const SHORTCUTS: &[(&str, &str)] = &[
    ("69247", "TV Recording Playback"),
    ("52304", "TV Recording Playback"),
    ("68228", "Program Guide"),
    ("33122", "Main Menu"),
    ("82117", "INFO"),
    ("84333", "Live TV"),
    ("06715", "TOGGLEPIPMODE"),
    ("48625", "Manage Recordings / Fix Conflicts"),
    ("82307", "Video Default"),
];

/// Overrides while live TV is on screen
const WATCHING_TV_SHORTCUTS: &[(&str, &str)] = &[("68228", "GUIDE")];

fn lookup(table: &[(&str, &'static str)], identifier: &str) -> Option<&'static str> {
    let shortcut = identifier.strip_prefix(SHORTCUT_PREFIX)?;
    table
        .iter()
        .find(|(id, _)| *id == shortcut)
        .map(|(_, action)| *action)
}

/// Frontend action for a launch target
fn target_action(identifier: &str, watching_tv: bool) -> Option<&'static str> {
    watching_tv
        .then(|| lookup(WATCHING_TV_SHORTCUTS, identifier))
        .flatten()
        .or_else(|| lookup(SHORTCUTS, identifier))
}

pub struct LauncherHandler {
    endpoint: Arc<Endpoint>,
}

impl LauncherHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl CapabilityHandler for LauncherHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Launcher
    }

    async fn handle(&self, operation: &str, payload: Value) -> HandlerResult<HandlerResponse> {
        let LauncherDirective::LaunchTarget(target) = LauncherDirective::parse(operation, payload)?;
        match target_action(&target.identifier, self.endpoint.activity().is_watching_tv()) {
            Some(action) => self.endpoint.send_action(action).await?,
            None => {
                tracing::debug!(endpoint = %self.endpoint.id(), identifier = %target.identifier, "no action for launch target");
            }
        }
        Ok(HandlerResponse::empty())
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint
            .update_capability(Namespace::Launcher, CapabilityDescriptor::Enabled, delta);
    }
}
