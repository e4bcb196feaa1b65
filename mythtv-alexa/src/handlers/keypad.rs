//! `Alexa.KeypadController`

use std::sync::Arc;

use alexa_types::directive::KeypadDirective;
use alexa_types::{CapabilityDescriptor, DeltaId, HandlerResponse, Key, Namespace};
use async_trait::async_trait;
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::handler::CapabilityHandler;

pub struct KeypadHandler {
    endpoint: Arc<Endpoint>,
}

impl KeypadHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }
}

/// Frontend action for a keystroke
fn key_action(key: Key) -> &'static str {
    match key {
        Key::Up => "UP",
        Key::Down => "DOWN",
        Key::Left => "LEFT",
        Key::Right => "RIGHT",
        Key::Select => "SELECT",
        Key::PageUp => "PAGEUP",
        Key::PageDown => "PAGEDOWN",
        Key::PageLeft => "PAGELEFT",
        Key::PageRight => "PAGERIGHT",
        Key::Info => "INFO",
        Key::More => "DETAILS",
    }
}

#[async_trait]
impl CapabilityHandler for KeypadHandler {
    fn namespace(&self) -> Namespace {
        Namespace::Keypad
    }

    async fn handle(&self, operation: &str, payload: Value) -> HandlerResult<HandlerResponse> {
        match KeypadDirective::parse(operation, payload)? {
            KeypadDirective::SendKeystroke(request) => {
                self.endpoint.send_action(key_action(request.keystroke)).await?;
                Ok(HandlerResponse::empty())
            }
        }
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint.update_capability(
            Namespace::Keypad,
            CapabilityDescriptor::Keys(Key::ALL.to_vec()),
            delta,
        );
    }
}
