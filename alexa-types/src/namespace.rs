use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DirectiveError;

/// Capability namespaces exposed by a MythTV frontend endpoint
///
/// Each namespace groups a fixed set of directive operations and the state
/// fields it may report. The wire name is the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// Channel changes and channel state reporting
    #[serde(rename = "Alexa.ChannelController")]
    Channel,

    /// Transport controls (play, pause, stop, ...)
    #[serde(rename = "Alexa.PlaybackController")]
    Playback,

    /// Reported playback state, event driven
    #[serde(rename = "Alexa.PlaybackStateReporter")]
    PlaybackState,

    /// Power state derived from connectivity
    #[serde(rename = "Alexa.PowerController")]
    Power,

    /// Toggle recording of the current program
    #[serde(rename = "Alexa.RecordController")]
    Record,

    /// Relative seeking over the network control socket
    #[serde(rename = "Alexa.SeekController")]
    Seek,

    /// Endpoint connectivity
    #[serde(rename = "Alexa.EndpointHealth")]
    Health,

    /// Endpoint metadata (friendly name, description, ...)
    #[serde(rename = "Alexa.EndpointInfo")]
    Info,

    /// Remote-control keystrokes
    #[serde(rename = "Alexa.KeypadController")]
    Keypad,

    /// Shortcut targets (guide, recordings, menu, ...)
    #[serde(rename = "Alexa.Launcher")]
    Launcher,

    /// Search-and-play over recordings and videos
    #[serde(rename = "Alexa.RemoteVideoPlayer")]
    VideoPlayer,

    /// Wake-on-LAN advertisement
    #[serde(rename = "Alexa.WakeOnLANController")]
    WakeOnLan,
}

impl Namespace {
    /// Every namespace, in registration order
    pub const ALL: [Namespace; 12] = [
        Namespace::Playback,
        Namespace::Record,
        Namespace::Channel,
        Namespace::Power,
        Namespace::Seek,
        Namespace::PlaybackState,
        Namespace::WakeOnLan,
        Namespace::Health,
        Namespace::VideoPlayer,
        Namespace::Launcher,
        Namespace::Keypad,
        Namespace::Info,
    ];

    /// Wire name of this namespace
    pub fn name(&self) -> &'static str {
        match self {
            Namespace::Channel => "Alexa.ChannelController",
            Namespace::Playback => "Alexa.PlaybackController",
            Namespace::PlaybackState => "Alexa.PlaybackStateReporter",
            Namespace::Power => "Alexa.PowerController",
            Namespace::Record => "Alexa.RecordController",
            Namespace::Seek => "Alexa.SeekController",
            Namespace::Health => "Alexa.EndpointHealth",
            Namespace::Info => "Alexa.EndpointInfo",
            Namespace::Keypad => "Alexa.KeypadController",
            Namespace::Launcher => "Alexa.Launcher",
            Namespace::VideoPlayer => "Alexa.RemoteVideoPlayer",
            Namespace::WakeOnLan => "Alexa.WakeOnLANController",
        }
    }

    /// Directive operations this namespace accepts
    ///
    /// Empty for namespaces that only report state or capability.
    pub fn supported_operations(&self) -> &'static [&'static str] {
        match self {
            Namespace::Channel => &["ChangeChannel", "SkipChannels"],
            Namespace::Playback => &[
                "FastForward",
                "Rewind",
                "Next",
                "Pause",
                "Play",
                "Previous",
                "StartOver",
                "Stop",
            ],
            Namespace::Record => &["StartRecording", "StopRecording"],
            Namespace::Seek => &["AdjustSeekPosition"],
            Namespace::Keypad => &["SendKeystroke"],
            Namespace::Launcher => &["LaunchTarget"],
            Namespace::VideoPlayer => &["SearchAndPlay"],
            Namespace::PlaybackState
            | Namespace::Power
            | Namespace::Health
            | Namespace::Info
            | Namespace::WakeOnLan => &[],
        }
    }

    /// State fields this namespace may report
    pub fn state_fields(&self) -> &'static [&'static str] {
        match self {
            Namespace::Channel => &["channel"],
            Namespace::PlaybackState => &["playbackState"],
            Namespace::Power => &["powerState"],
            Namespace::Record => &["RecordingState"],
            Namespace::Health => &["connectivity"],
            _ => &[],
        }
    }

    /// Whether `operation` is one of this namespace's directives
    pub fn supports(&self, operation: &str) -> bool {
        self.supported_operations().contains(&operation)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Namespace {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .iter()
            .copied()
            .find(|ns| ns.name() == s)
            .ok_or_else(|| DirectiveError::invalid_directive(format!("Unknown namespace {s}")))
    }
}
