//! `Alexa.RemoteVideoPlayer`
//!
//! Search-and-play over the recording library first, then the video
//! library.

use std::sync::Arc;

use alexa_types::directive::{SearchEntity, VideoPlayerDirective};
use alexa_types::{CapabilityDescriptor, DeltaId, DirectiveError, HandlerResponse, Namespace};
use async_trait::async_trait;
use event_router::{EventKind, EventSource};
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::HandlerResult;
use crate::handler::CapabilityHandler;
use crate::model::{Program, VideoMetadata};

/// Requested titles, seasons and episodes, each deduplicated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub titles: Vec<String>,
    pub seasons: Vec<u32>,
    pub episodes: Vec<u32>,
}

impl SearchCriteria {
    pub fn from_entities(entities: &[SearchEntity]) -> Self {
        let mut criteria = Self::default();
        for entity in entities {
            let value = entity.value.trim();
            match entity.entity_type.as_str() {
                "Video" => push_unique(&mut criteria.titles, value.to_string()),
                "Season" => {
                    if let Ok(season) = value.parse() {
                        push_unique(&mut criteria.seasons, season);
                    }
                }
                "Episode" => {
                    if let Ok(episode) = value.parse() {
                        push_unique(&mut criteria.episodes, episode);
                    }
                }
                other => tracing::trace!(entity_type = other, "ignoring search entity"),
            }
        }
        criteria
    }

    /// Title pattern for the recorded-program search
    pub fn title_regex(&self) -> String {
        self.titles.join("|")
    }

    fn matches_numbers(&self, season: Option<u32>, episode: Option<u32>) -> bool {
        let season_ok = self.seasons.is_empty() || season.is_some_and(|s| self.seasons.contains(&s));
        let episode_ok =
            self.episodes.is_empty() || episode.is_some_and(|e| self.episodes.contains(&e));
        season_ok && episode_ok
    }

    /// First recording in season, episode, air date order that matches
    pub fn best_recording<'a>(&self, programs: &'a [Program]) -> Option<&'a Program> {
        let mut candidates: Vec<&Program> = programs
            .iter()
            .filter(|p| p.recording.is_some())
            .filter(|p| self.matches_numbers(p.season, p.episode))
            .collect();
        candidates.sort_by_key(|p| (p.season, p.episode, p.airdate));
        candidates.into_iter().next()
    }

    /// First video whose title was requested and whose numbers match
    pub fn best_video<'a>(&self, videos: &'a [VideoMetadata]) -> Option<&'a VideoMetadata> {
        videos.iter().find(|video| {
            self.titles.iter().any(|t| t == &video.title)
                && self.matches_numbers(video.season, video.episode)
        })
    }
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

enum Content {
    Recording(String),
    Video(String),
}

pub struct VideoPlayerHandler {
    endpoint: Arc<Endpoint>,
}

impl VideoPlayerHandler {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self { endpoint }
    }

    async fn find_content(&self, criteria: &SearchCriteria) -> HandlerResult<Option<Content>> {
        let backend = self.endpoint.backend();

        if !criteria.titles.is_empty() {
            let programs = backend.recorded_list(&criteria.title_regex()).await?;
            if let Some(recording) = criteria
                .best_recording(&programs)
                .and_then(|p| p.recording.as_ref())
            {
                return Ok(Some(Content::Recording(recording.recorded_id.clone())));
            }
        }

        let videos = backend.video_list().await?;
        Ok(criteria
            .best_video(&videos)
            .map(|video| Content::Video(video.id.clone())))
    }

    /// Stop current playback and wait for the frontend to confirm
    async fn stop_playback(&self) -> HandlerResult<()> {
        let stopped = self
            .endpoint
            .events()
            .once(EventSource::Frontend, EventKind::PlayStopped);
        self.endpoint.send_action("STOPPLAYBACK").await?;

        match tokio::time::timeout(self.endpoint.config().stop_timeout, stopped).await {
            Ok(Ok(_)) => Ok(()),
            _ => Err(DirectiveError::endpoint_busy("Failed to stop").into()),
        }
    }

    async fn search_and_play(&self, entities: &[SearchEntity]) -> HandlerResult<HandlerResponse> {
        let criteria = SearchCriteria::from_entities(entities);
        let content = self
            .find_content(&criteria)
            .await?
            .ok_or_else(|| DirectiveError::not_subscribed("No matching content"))?;

        if self.endpoint.activity().is_watching() {
            self.stop_playback().await?;
        }

        let frontend = self.endpoint.frontend();
        match content {
            Content::Recording(recorded_id) => {
                tracing::info!(endpoint = %self.endpoint.id(), recorded_id = %recorded_id, "playing recording");
                frontend.play_recording(&recorded_id).await?;
            }
            Content::Video(id) => {
                tracing::info!(endpoint = %self.endpoint.id(), video_id = %id, "playing video");
                frontend.play_video(&id, false).await?;
            }
        }
        Ok(HandlerResponse::empty())
    }
}

#[async_trait]
impl CapabilityHandler for VideoPlayerHandler {
    fn namespace(&self) -> Namespace {
        Namespace::VideoPlayer
    }

    async fn handle(&self, operation: &str, payload: Value) -> HandlerResult<HandlerResponse> {
        match VideoPlayerDirective::parse(operation, payload)? {
            VideoPlayerDirective::SearchAndPlay(request) => self.search_and_play(&request.entities).await,
        }
    }

    fn refresh_capability(self: Arc<Self>, delta: DeltaId) {
        self.endpoint
            .update_capability(Namespace::VideoPlayer, CapabilityDescriptor::Enabled, delta);
    }
}
