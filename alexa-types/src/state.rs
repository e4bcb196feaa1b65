//! Reported state values
//!
//! Every state field a namespace reports has a typed value here. `StateUpdate`
//! ties a value to the namespace and field that own it, so handlers never
//! write a field by string name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::namespace::Namespace;

/// Playback state reported by `Alexa.PlaybackStateReporter`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

/// Recording state reported by `Alexa.RecordController`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingState {
    Recording,
    NotRecording,
}

impl RecordingState {
    /// Classify a recording group; `LiveTV` is the live buffer, not a recording
    pub fn from_rec_group(rec_group: &str) -> Self {
        if rec_group == "LiveTV" {
            RecordingState::NotRecording
        } else {
            RecordingState::Recording
        }
    }
}

/// Connectivity reported by `Alexa.EndpointHealth`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Connectivity {
    Ok,
    Unreachable,
}

/// Power state reported by `Alexa.PowerController`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    On,
    Off,
}

/// Channel currently tuned, as reported by `Alexa.ChannelController`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelState {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliate_call_sign: Option<String>,
}

impl ChannelState {
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            call_sign: None,
            affiliate_call_sign: None,
        }
    }

    pub fn with_affiliate_call_sign(mut self, call_sign: impl Into<String>) -> Self {
        self.affiliate_call_sign = Some(call_sign.into());
        self
    }
}

/// A typed write to one state field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    /// `None` clears the channel (nothing tuned)
    Channel(Option<ChannelState>),
    PlaybackState(PlaybackState),
    Recording(RecordingState),
    Connectivity(Connectivity),
    Power(PowerState),
}

impl StateUpdate {
    /// Namespace that owns the field
    pub fn namespace(&self) -> Namespace {
        match self {
            StateUpdate::Channel(_) => Namespace::Channel,
            StateUpdate::PlaybackState(_) => Namespace::PlaybackState,
            StateUpdate::Recording(_) => Namespace::Record,
            StateUpdate::Connectivity(_) => Namespace::Health,
            StateUpdate::Power(_) => Namespace::Power,
        }
    }

    /// Field name within the namespace
    pub fn field(&self) -> &'static str {
        match self {
            StateUpdate::Channel(_) => "channel",
            StateUpdate::PlaybackState(_) => "playbackState",
            StateUpdate::Recording(_) => "RecordingState",
            StateUpdate::Connectivity(_) => "connectivity",
            StateUpdate::Power(_) => "powerState",
        }
    }

    /// JSON value stored and published for the field
    ///
    /// Playback state is reported wrapped as `{"state": ...}`.
    pub fn value(&self) -> Value {
        let value = match self {
            StateUpdate::Channel(channel) => serde_json::to_value(channel),
            StateUpdate::PlaybackState(state) => {
                serde_json::to_value(state).map(|state| serde_json::json!({ "state": state }))
            }
            StateUpdate::Recording(state) => serde_json::to_value(state),
            StateUpdate::Connectivity(state) => serde_json::to_value(state),
            StateUpdate::Power(state) => serde_json::to_value(state),
        };
        // Plain enums and string structs always serialize
        value.unwrap_or(Value::Null)
    }

    /// `(field, value)` pair used as a monitor expectation
    pub fn expectation(&self) -> (&'static str, Value) {
        (self.field(), self.value())
    }
}

/// Namespace -> field -> value, as carried in a directive response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateSlice(BTreeMap<Namespace, BTreeMap<String, Value>>);

impl StateSlice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice holding a single field
    pub fn single(namespace: Namespace, field: impl Into<String>, value: Value) -> Self {
        let mut slice = Self::new();
        slice.insert(namespace, field, value);
        slice
    }

    pub fn insert(&mut self, namespace: Namespace, field: impl Into<String>, value: Value) {
        self.0
            .entry(namespace)
            .or_default()
            .insert(field.into(), value);
    }

    /// Merge another slice in; fields in `other` win
    pub fn merge(&mut self, other: StateSlice) {
        for (namespace, fields) in other.0 {
            self.0.entry(namespace).or_default().extend(fields);
        }
    }

    pub fn get(&self, namespace: Namespace, field: &str) -> Option<&Value> {
        self.0.get(&namespace).and_then(|fields| fields.get(field))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&StateUpdate> for StateSlice {
    fn from(update: &StateUpdate) -> Self {
        StateSlice::single(update.namespace(), update.field(), update.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("LiveTV", RecordingState::NotRecording)]
    #[case("Default", RecordingState::Recording)]
    #[case("Movies", RecordingState::Recording)]
    #[case("", RecordingState::Recording)]
    fn test_rec_group_classification(#[case] group: &str, #[case] expected: RecordingState) {
        assert_eq!(RecordingState::from_rec_group(group), expected);
    }

    #[test]
    fn test_state_update_values() {
        assert_eq!(
            StateUpdate::PlaybackState(PlaybackState::Playing).value(),
            json!({ "state": "PLAYING" })
        );
        assert_eq!(
            StateUpdate::Recording(RecordingState::NotRecording).value(),
            json!("NOT_RECORDING")
        );
        assert_eq!(StateUpdate::Channel(None).value(), Value::Null);
        assert_eq!(
            StateUpdate::Channel(Some(ChannelState::new("155").with_affiliate_call_sign("WCBDT")))
                .value(),
            json!({ "number": "155", "affiliateCallSign": "WCBDT" })
        );
    }

    #[test]
    fn test_slice_serializes_by_wire_name() {
        let slice = StateSlice::from(&StateUpdate::Connectivity(Connectivity::Ok));
        assert_eq!(
            serde_json::to_value(&slice).unwrap(),
            json!({ "Alexa.EndpointHealth": { "connectivity": "OK" } })
        );
    }

    #[test]
    fn test_slice_merge_overwrites_fields() {
        let mut slice = StateSlice::single(Namespace::Power, "powerState", json!("OFF"));
        slice.merge(StateSlice::single(Namespace::Power, "powerState", json!("ON")));
        slice.merge(StateSlice::single(Namespace::Health, "connectivity", json!("OK")));
        assert_eq!(slice.get(Namespace::Power, "powerState"), Some(&json!("ON")));
        assert_eq!(slice.namespaces().count(), 2);
    }
}
