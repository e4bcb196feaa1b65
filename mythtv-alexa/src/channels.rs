//! Channel directory
//!
//! Visible channels of every video source, ordered the way the guide lists
//! them (ATSC major, then minor). Resolves directive channel requests to a
//! channel number and does the index arithmetic for channel skipping.

use std::collections::HashMap;

use alexa_types::directive::ChangeChannelRequest;

use crate::model::ChannelInfo;

/// Call-sign suffixes tried by `search_call_sign`, in preference order
const CALL_SIGN_SUFFIXES: [&str; 3] = ["HD", "DT", ""];

/// Ordered lookup table over the backend channel list
#[derive(Debug, Clone, Default)]
pub struct ChannelDirectory {
    channels: Vec<ChannelInfo>,
    index: HashMap<String, usize>,
}

impl ChannelDirectory {
    /// Build from a raw channel list; hidden channels are dropped
    pub fn new(channels: impl IntoIterator<Item = ChannelInfo>) -> Self {
        let mut channels: Vec<ChannelInfo> = channels.into_iter().filter(|c| c.visible).collect();
        channels.sort_by_key(|c| (c.atsc_major_chan, c.atsc_minor_chan));

        let index = channels
            .iter()
            .enumerate()
            .map(|(i, c)| (c.chan_num.clone(), i))
            .collect();

        Self { channels, index }
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channels(&self) -> &[ChannelInfo] {
        &self.channels
    }

    pub fn is_valid(&self, chan_num: &str) -> bool {
        self.index.contains_key(chan_num)
    }

    pub fn get(&self, chan_num: &str) -> Option<&ChannelInfo> {
        self.index.get(chan_num).map(|&i| &self.channels[i])
    }

    /// Channel number for a call sign, preferring the HD then DT variant
    ///
    /// `WAB` resolves to `WABHD` when both exist, and to `WABDT` when there is
    /// no HD variant. Matching is case-insensitive.
    pub fn search_call_sign(&self, call_sign: &str) -> Option<&str> {
        let call_sign = call_sign.trim();
        if call_sign.is_empty() {
            return None;
        }
        CALL_SIGN_SUFFIXES.iter().find_map(|suffix| {
            let candidate = format!("{call_sign}{suffix}");
            self.channels
                .iter()
                .find(|c| c.call_sign.eq_ignore_ascii_case(&candidate))
                .map(|c| c.chan_num.as_str())
        })
    }

    /// Best channel for a free-text name
    ///
    /// Scores each channel by how many query words appear in its name or
    /// call sign; an exact name match wins outright. Ties keep guide order.
    pub fn search_name(&self, name: &str) -> Option<&str> {
        let query = normalize(name);
        if query.is_empty() {
            return None;
        }

        if let Some(channel) = self
            .channels
            .iter()
            .find(|c| normalize(&c.channel_name) == query || normalize(&c.call_sign) == query)
        {
            return Some(&channel.chan_num);
        }

        let words: Vec<&str> = query.split(' ').collect();
        let mut best: Option<(usize, &ChannelInfo)> = None;
        for channel in &self.channels {
            let haystack = format!("{} {}", normalize(&channel.channel_name), normalize(&channel.call_sign));
            let tokens: Vec<&str> = haystack.split(' ').collect();
            let score = words
                .iter()
                .filter(|w| tokens.iter().any(|t| t.starts_with(*w)))
                .count();
            if score > 0 && best.map_or(true, |(top, _)| score > top) {
                best = Some((score, channel));
            }
        }
        best.map(|(_, c)| c.chan_num.as_str())
    }

    /// Channel number `count` positions away from `chan_num`, wrapping
    pub fn skip(&self, chan_num: &str, count: i64) -> Option<&str> {
        let current = *self.index.get(chan_num)?;
        let len = self.channels.len() as i64;
        let next = (current as i64 + count.rem_euclid(len)).rem_euclid(len) as usize;
        Some(&self.channels[next].chan_num)
    }

    /// Resolve a `ChangeChannel` request to a channel number
    ///
    /// A valid explicit number wins, then the call sign, then the affiliate
    /// call sign, then the channel metadata name.
    pub fn resolve(&self, request: &ChangeChannelRequest) -> Option<String> {
        let channel = &request.channel;

        if let Some(number) = channel.number.as_deref().filter(|n| self.is_valid(n)) {
            return Some(number.to_string());
        }

        [channel.call_sign.as_deref(), channel.affiliate_call_sign.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|call_sign| self.search_call_sign(call_sign))
            .or_else(|| {
                request
                    .channel_metadata
                    .as_ref()
                    .and_then(|meta| meta.name.as_deref())
                    .and_then(|name| self.search_name(name))
            })
            .map(str::to_string)
    }
}

fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
