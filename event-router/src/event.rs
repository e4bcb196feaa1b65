//! MythTV event vocabulary and payloads

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Which stream an event arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    /// Events originating at the controlled frontend
    Frontend,
    /// Events originating at the master backend
    Backend,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Frontend => f.write_str("frontend"),
            EventSource::Backend => f.write_str("backend"),
        }
    }
}

/// Closed set of event kinds the bridge reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PlayChanged,
    PlayStarted,
    PlayUnpaused,
    PlayPaused,
    PlayStopped,
    #[serde(rename = "LIVETV_STARTED")]
    LiveTvStarted,
    #[serde(rename = "LIVETV_ENDED")]
    LiveTvEnded,
    ClientConnected,
    ClientDisconnected,
    RecStarted,
    SchedulerRan,
}

impl EventKind {
    pub const ALL: [EventKind; 11] = [
        EventKind::PlayChanged,
        EventKind::PlayStarted,
        EventKind::PlayUnpaused,
        EventKind::PlayPaused,
        EventKind::PlayStopped,
        EventKind::LiveTvStarted,
        EventKind::LiveTvEnded,
        EventKind::ClientConnected,
        EventKind::ClientDisconnected,
        EventKind::RecStarted,
        EventKind::SchedulerRan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PlayChanged => "PLAY_CHANGED",
            EventKind::PlayStarted => "PLAY_STARTED",
            EventKind::PlayUnpaused => "PLAY_UNPAUSED",
            EventKind::PlayPaused => "PLAY_PAUSED",
            EventKind::PlayStopped => "PLAY_STOPPED",
            EventKind::LiveTvStarted => "LIVETV_STARTED",
            EventKind::LiveTvEnded => "LIVETV_ENDED",
            EventKind::ClientConnected => "CLIENT_CONNECTED",
            EventKind::ClientDisconnected => "CLIENT_DISCONNECTED",
            EventKind::RecStarted => "REC_STARTED",
            EventKind::SchedulerRan => "SCHEDULER_RAN",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| RouterError::UnknownEventKind(s.to_string()))
    }
}

/// Loosely typed key/value payload of an event
///
/// Values are strings on the wire; numeric and date fields are parsed on
/// access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMessage(BTreeMap<String, String>);

impl EventMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// `SENDER` host of the event
    pub fn sender(&self) -> Option<&str> {
        self.get("SENDER")
    }

    /// `CHANID` as sent
    pub fn chan_id(&self) -> Option<&str> {
        self.get("CHANID").filter(|id| !id.is_empty())
    }

    /// `STARTTIME`, accepting RFC 3339 or a bare `YYYY-MM-DDTHH:MM:SS` in UTC
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.get("STARTTIME").and_then(parse_event_time)
    }

    /// `PLAYSPEED` as a float
    pub fn play_speed(&self) -> Option<f64> {
        self.get("PLAYSPEED").and_then(|s| s.trim().parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EventMessage {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn parse_event_time(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// An event as delivered to handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MythEvent {
    pub kind: EventKind,
    pub message: EventMessage,
}

impl MythEvent {
    pub fn new(kind: EventKind, message: EventMessage) -> Self {
        Self { kind, message }
    }

    /// Event with an empty payload
    pub fn bare(kind: EventKind) -> Self {
        Self::new(kind, EventMessage::new())
    }
}

/// An event as received from a transport, before vocabulary checking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub message: EventMessage,
}

impl TryFrom<RawEvent> for MythEvent {
    type Error = RouterError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        Ok(MythEvent::new(raw.name.parse()?, raw.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[test]
    fn test_kind_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(kind.as_str().parse::<EventKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_rejected() {
        assert_eq!(
            "VIDEO_LIST_CHANGE".parse::<EventKind>(),
            Err(RouterError::UnknownEventKind("VIDEO_LIST_CHANGE".into()))
        );
    }

    #[rstest]
    #[case("2020-01-10T01:00:10Z")]
    #[case("2020-01-10T01:00:10")]
    #[case("2020-01-10 01:00:10")]
    #[case("2020-01-10T02:00:10+01:00")]
    fn test_start_time_formats(#[case] raw: &str) {
        let message = EventMessage::new().with("STARTTIME", raw);
        assert_eq!(
            message.start_time(),
            Some(Utc.with_ymd_and_hms(2020, 1, 10, 1, 0, 10).unwrap())
        );
    }

    #[test]
    fn test_typed_accessors() {
        let message: EventMessage = [("CHANID", "201"), ("PLAYSPEED", "0"), ("SENDER", "fe1")]
            .into_iter()
            .collect();
        assert_eq!(message.chan_id(), Some("201"));
        assert_eq!(message.play_speed(), Some(0.0));
        assert_eq!(message.sender(), Some("fe1"));
        assert_eq!(EventMessage::new().with("CHANID", "").chan_id(), None);
    }

    #[test]
    fn test_raw_event_conversion() {
        let raw = RawEvent {
            name: "LIVETV_STARTED".into(),
            message: EventMessage::new(),
        };
        let event = MythEvent::try_from(raw).unwrap();
        assert_eq!(event.kind, EventKind::LiveTvStarted);
    }
}
