//! Directive envelopes and typed per-namespace operations

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DirectiveError;
use crate::namespace::Namespace;
use crate::state::StateSlice;

// ============================================================================
// Envelopes
// ============================================================================

/// Inbound directive addressed to one namespace/operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveRequest {
    pub namespace: Namespace,
    pub operation: String,
    #[serde(default)]
    pub payload: Value,
    /// Correlation token the response is published under
    pub reply_to: String,
}

impl DirectiveRequest {
    pub fn new(
        namespace: Namespace,
        operation: impl Into<String>,
        payload: Value,
        reply_to: impl Into<String>,
    ) -> Self {
        Self {
            namespace,
            operation: operation.into(),
            payload,
            reply_to: reply_to.into(),
        }
    }
}

/// Outbound response for a directive
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveResponse {
    pub error: bool,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_change: Option<StateSlice>,
}

impl DirectiveResponse {
    pub fn success(payload: Value, state_change: Option<StateSlice>) -> Self {
        Self {
            error: false,
            payload,
            state_change: state_change.filter(|slice| !slice.is_empty()),
        }
    }

    pub fn failure(error: &DirectiveError) -> Self {
        Self {
            error: true,
            payload: serde_json::to_value(error).unwrap_or(Value::Null),
            state_change: None,
        }
    }
}

/// Result of a handler operation before it is wrapped in an envelope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandlerResponse {
    pub payload: Value,
    pub state: Option<StateSlice>,
}

impl HandlerResponse {
    /// Empty object payload, no state
    pub fn empty() -> Self {
        Self {
            payload: Value::Object(Default::default()),
            state: None,
        }
    }

    pub fn with_payload(payload: Value) -> Self {
        Self {
            payload,
            state: None,
        }
    }

    pub fn with_state(mut self, state: Option<StateSlice>) -> Self {
        self.state = match (self.state.take(), state) {
            (Some(mut current), Some(extra)) => {
                current.merge(extra);
                Some(current)
            }
            (current, extra) => current.or(extra),
        };
        self
    }
}

fn parse_payload<T: DeserializeOwned>(operation: &str, payload: Value) -> Result<T, DirectiveError> {
    serde_json::from_value(payload).map_err(|e| {
        DirectiveError::invalid_directive(format!("Malformed {operation} payload: {e}"))
    })
}

fn unsupported(namespace: Namespace, operation: &str) -> DirectiveError {
    DirectiveError::invalid_directive(format!("{namespace} does not support {operation}"))
}

// ============================================================================
// Alexa.ChannelController
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRequest {
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub call_sign: Option<String>,
    #[serde(default)]
    pub affiliate_call_sign: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChannelMetadata {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeChannelRequest {
    #[serde(default)]
    pub channel: ChannelRequest,
    #[serde(default)]
    pub channel_metadata: Option<ChannelMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipChannelsRequest {
    pub channel_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelDirective {
    ChangeChannel(ChangeChannelRequest),
    SkipChannels(SkipChannelsRequest),
}

impl ChannelDirective {
    pub fn parse(operation: &str, payload: Value) -> Result<Self, DirectiveError> {
        match operation {
            "ChangeChannel" => Ok(Self::ChangeChannel(parse_payload(operation, payload)?)),
            "SkipChannels" => Ok(Self::SkipChannels(parse_payload(operation, payload)?)),
            _ => Err(unsupported(Namespace::Channel, operation)),
        }
    }
}

// ============================================================================
// Alexa.PlaybackController
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackDirective {
    Play,
    Pause,
    Stop,
    FastForward,
    Rewind,
    Next,
    Previous,
    StartOver,
}

impl PlaybackDirective {
    pub fn parse(operation: &str) -> Result<Self, DirectiveError> {
        match operation {
            "Play" => Ok(Self::Play),
            "Pause" => Ok(Self::Pause),
            "Stop" => Ok(Self::Stop),
            "FastForward" => Ok(Self::FastForward),
            "Rewind" => Ok(Self::Rewind),
            "Next" => Ok(Self::Next),
            "Previous" => Ok(Self::Previous),
            "StartOver" => Ok(Self::StartOver),
            _ => Err(unsupported(Namespace::Playback, operation)),
        }
    }
}

// ============================================================================
// Alexa.RecordController
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordDirective {
    StartRecording,
    StopRecording,
}

impl RecordDirective {
    pub fn parse(operation: &str) -> Result<Self, DirectiveError> {
        match operation {
            "StartRecording" => Ok(Self::StartRecording),
            "StopRecording" => Ok(Self::StopRecording),
            _ => Err(unsupported(Namespace::Record, operation)),
        }
    }
}

// ============================================================================
// Alexa.SeekController
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustSeekPositionRequest {
    pub delta_position_milliseconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeekDirective {
    AdjustSeekPosition(AdjustSeekPositionRequest),
}

impl SeekDirective {
    pub fn parse(operation: &str, payload: Value) -> Result<Self, DirectiveError> {
        match operation {
            "AdjustSeekPosition" => Ok(Self::AdjustSeekPosition(parse_payload(operation, payload)?)),
            _ => Err(unsupported(Namespace::Seek, operation)),
        }
    }
}

// ============================================================================
// Alexa.KeypadController
// ============================================================================

/// Keys accepted by `SendKeystroke`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Select,
    PageUp,
    PageDown,
    PageLeft,
    PageRight,
    Info,
    More,
}

impl Key {
    pub const ALL: [Key; 11] = [
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Select,
        Key::PageUp,
        Key::PageDown,
        Key::PageLeft,
        Key::PageRight,
        Key::Info,
        Key::More,
    ];

    /// Wire name, e.g. `PAGE_UP`
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::Up => "UP",
            Key::Down => "DOWN",
            Key::Left => "LEFT",
            Key::Right => "RIGHT",
            Key::Select => "SELECT",
            Key::PageUp => "PAGE_UP",
            Key::PageDown => "PAGE_DOWN",
            Key::PageLeft => "PAGE_LEFT",
            Key::PageRight => "PAGE_RIGHT",
            Key::Info => "INFO",
            Key::More => "MORE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendKeystrokeRequest {
    pub keystroke: Key,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeypadDirective {
    SendKeystroke(SendKeystrokeRequest),
}

impl KeypadDirective {
    pub fn parse(operation: &str, payload: Value) -> Result<Self, DirectiveError> {
        match operation {
            "SendKeystroke" => Ok(Self::SendKeystroke(parse_payload(operation, payload)?)),
            _ => Err(unsupported(Namespace::Keypad, operation)),
        }
    }
}

// ============================================================================
// Alexa.Launcher
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LaunchTargetRequest {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LauncherDirective {
    LaunchTarget(LaunchTargetRequest),
}

impl LauncherDirective {
    pub fn parse(operation: &str, payload: Value) -> Result<Self, DirectiveError> {
        match operation {
            "LaunchTarget" => Ok(Self::LaunchTarget(parse_payload(operation, payload)?)),
            _ => Err(unsupported(Namespace::Launcher, operation)),
        }
    }
}

// ============================================================================
// Alexa.RemoteVideoPlayer
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchEntity {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchAndPlayRequest {
    #[serde(default)]
    pub entities: Vec<SearchEntity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoPlayerDirective {
    SearchAndPlay(SearchAndPlayRequest),
}

impl VideoPlayerDirective {
    pub fn parse(operation: &str, payload: Value) -> Result<Self, DirectiveError> {
        match operation {
            "SearchAndPlay" => Ok(Self::SearchAndPlay(parse_payload(operation, payload)?)),
            _ => Err(unsupported(Namespace::VideoPlayer, operation)),
        }
    }
}
