//! Data returned by the frontend and backend services
//!
//! Field names follow the MythTV services API so collaborators can
//! deserialize responses straight into these types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Frontend status as reported by `GetStatus`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontendStatus {
    /// Frontend state, e.g. `WatchingLiveTV`, `WatchingPreRecorded`, `idle`
    pub state: String,
    #[serde(default, rename = "chanid")]
    pub chan_id: Option<String>,
    #[serde(default, rename = "starttime")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, rename = "programid")]
    pub program_id: Option<String>,
    #[serde(default, rename = "playspeed")]
    pub play_speed: Option<String>,
    #[serde(default, rename = "secondsplayed")]
    pub seconds_played: f64,
    #[serde(default, rename = "totalseconds")]
    pub total_seconds: f64,
}

impl FrontendStatus {
    /// Any playback in progress (live TV, recording or video)
    pub fn is_watching(&self) -> bool {
        self.state.starts_with("Watching")
    }

    pub fn is_watching_live_tv(&self) -> bool {
        self.state == "WatchingLiveTV"
    }

    /// Playback speed of zero
    pub fn is_paused(&self) -> bool {
        self.play_speed
            .as_deref()
            .and_then(|speed| speed.trim().parse::<f64>().ok())
            .map(|speed| speed == 0.0)
            .unwrap_or(false)
    }
}

/// One channel of the channel directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChannelInfo {
    pub chan_id: String,
    pub chan_num: String,
    #[serde(default)]
    pub call_sign: String,
    #[serde(default)]
    pub channel_name: String,
    #[serde(default, rename = "ATSCMajorChan")]
    pub atsc_major_chan: u32,
    #[serde(default, rename = "ATSCMinorChan")]
    pub atsc_minor_chan: u32,
    #[serde(default = "visible_default")]
    pub visible: bool,
}

fn visible_default() -> bool {
    true
}

/// Recording details attached to a program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingInfo {
    #[serde(default)]
    pub recorded_id: String,
    #[serde(default)]
    pub rec_group: String,
}

/// A program from the recording library or guide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Program {
    pub title: String,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
    #[serde(default)]
    pub airdate: Option<NaiveDate>,
    #[serde(default)]
    pub recording: Option<RecordingInfo>,
}

/// An entry of the video library
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub season: Option<u32>,
    #[serde(default)]
    pub episode: Option<u32>,
}
