//! Mock collaborators shared by the integration suites
//!
//! The mock frontend records every action it receives and can be scripted
//! to react to an action the way a real frontend would: change its status
//! and emit events on the endpoint's router.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use mythtv_alexa::alexa_types::{
    CapabilityDescriptor, DeltaId, DirectiveRequest, DirectiveResponse, EndpointId, EndpointInfo,
    Namespace,
};
use mythtv_alexa::event_router::{EventKind, EventMessage, EventRouter, EventSource, MythEvent};
use mythtv_alexa::{
    BackendClient, BridgeConfig, ChannelInfo, ClientError, Endpoint, EndpointManager,
    FrontendClient, FrontendStatus, MacResolver, Program, RecordingInfo, ShadowPublisher,
    VideoMetadata,
};

pub const HOSTNAME: &str = "livingroom";

// ============================================================================
// Frontend
// ============================================================================

type Reaction = Arc<dyn Fn(&MockFrontend) + Send + Sync>;

pub struct MockFrontend {
    hostname: String,
    actions: Mutex<Vec<String>>,
    plays: Mutex<Vec<String>>,
    status: Mutex<FrontendStatus>,
    unreachable: AtomicBool,
    reactions: Mutex<HashMap<String, Reaction>>,
    router: Mutex<Option<Weak<EventRouter>>>,
}

impl MockFrontend {
    pub fn new(status: FrontendStatus) -> Arc<Self> {
        Self::on_host(HOSTNAME, status)
    }

    pub fn on_host(hostname: &str, status: FrontendStatus) -> Arc<Self> {
        Arc::new(Self {
            hostname: hostname.to_string(),
            actions: Mutex::new(Vec::new()),
            plays: Mutex::new(Vec::new()),
            status: Mutex::new(status),
            unreachable: AtomicBool::new(false),
            reactions: Mutex::new(HashMap::new()),
            router: Mutex::new(None),
        })
    }

    pub fn idle() -> Arc<Self> {
        Self::new(status("idle", None))
    }

    pub fn watching_live_tv(chan_id: &str) -> Arc<Self> {
        Self::new(status("WatchingLiveTV", Some(chan_id)))
    }

    /// Route emitted events to an endpoint
    pub fn attach(&self, router: &Arc<EventRouter>) {
        *self.router.lock().unwrap() = Some(Arc::downgrade(router));
    }

    /// Run `reaction` every time `action` is sent
    pub fn on_action<F>(&self, action: &str, reaction: F)
    where
        F: Fn(&MockFrontend) + Send + Sync + 'static,
    {
        self.reactions
            .lock()
            .unwrap()
            .insert(action.to_string(), Arc::new(reaction));
    }

    pub fn emit(&self, kind: EventKind, message: EventMessage) {
        self.emit_from(EventSource::Frontend, kind, message);
    }

    pub fn emit_from(&self, source: EventSource, kind: EventKind, message: EventMessage) {
        let router = self.router.lock().unwrap().as_ref().and_then(Weak::upgrade);
        if let Some(router) = router {
            router.emit(source, MythEvent::new(kind, message));
        }
    }

    pub fn set_status(&self, status: FrontendStatus) {
        *self.status.lock().unwrap() = status;
    }

    pub fn update_status(&self, update: impl FnOnce(&mut FrontendStatus)) {
        update(&mut self.status.lock().unwrap());
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn clear_actions(&self) {
        self.actions.lock().unwrap().clear();
    }

    pub fn plays(&self) -> Vec<String> {
        self.plays.lock().unwrap().clone()
    }

    fn check_reachable(&self) -> Result<(), ClientError> {
        if self.unreachable.load(Ordering::SeqCst) {
            Err(ClientError::Frontend("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl FrontendClient for MockFrontend {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn send_action(&self, action: &str) -> Result<(), ClientError> {
        self.check_reachable()?;
        self.actions.lock().unwrap().push(action.to_string());
        let reaction = self.reactions.lock().unwrap().get(action).cloned();
        if let Some(reaction) = reaction {
            reaction(self);
        }
        Ok(())
    }

    async fn status(&self) -> Result<FrontendStatus, ClientError> {
        self.check_reachable()?;
        Ok(self.status.lock().unwrap().clone())
    }

    async fn play_recording(&self, recorded_id: &str) -> Result<(), ClientError> {
        self.check_reachable()?;
        self.plays.lock().unwrap().push(format!("recording:{recorded_id}"));
        Ok(())
    }

    async fn play_video(&self, id: &str, use_bookmark: bool) -> Result<(), ClientError> {
        self.check_reachable()?;
        self.plays
            .lock()
            .unwrap()
            .push(format!("video:{id}:{use_bookmark}"));
        Ok(())
    }
}

pub fn status(state: &str, chan_id: Option<&str>) -> FrontendStatus {
    FrontendStatus {
        state: state.to_string(),
        chan_id: chan_id.map(str::to_string),
        play_speed: Some("1".to_string()),
        ..Default::default()
    }
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Default)]
pub struct MockBackend {
    settings: Mutex<HashMap<String, String>>,
    failing_settings: AtomicBool,
    channels: Mutex<Vec<ChannelInfo>>,
    recorded: Mutex<HashMap<(String, DateTime<Utc>), Program>>,
    library: Mutex<Vec<Program>>,
    videos: Mutex<Vec<VideoMetadata>>,
    title_queries: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_channels(channels: Vec<ChannelInfo>) -> Arc<Self> {
        let backend = Self::default();
        *backend.channels.lock().unwrap() = channels;
        Arc::new(backend)
    }

    pub fn set_setting(&self, key: &str, value: &str) {
        self.settings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn fail_settings(&self, fail: bool) {
        self.failing_settings.store(fail, Ordering::SeqCst);
    }

    pub fn set_recorded(&self, chan_id: &str, start_time: DateTime<Utc>, program: Program) {
        self.recorded
            .lock()
            .unwrap()
            .insert((chan_id.to_string(), start_time), program);
    }

    pub fn set_library(&self, programs: Vec<Program>) {
        *self.library.lock().unwrap() = programs;
    }

    pub fn set_videos(&self, videos: Vec<VideoMetadata>) {
        *self.videos.lock().unwrap() = videos;
    }

    pub fn title_queries(&self) -> Vec<String> {
        self.title_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn get_setting(
        &self,
        key: &str,
        _host: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, ClientError> {
        if self.failing_settings.load(Ordering::SeqCst) {
            return Err(ClientError::Backend("settings unavailable".into()));
        }
        Ok(self
            .settings
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .or_else(|| default.map(str::to_string)))
    }

    async fn channel_directory(&self) -> Result<Vec<ChannelInfo>, ClientError> {
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn channel_info(&self, chan_id: &str) -> Result<Option<ChannelInfo>, ClientError> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.chan_id == chan_id)
            .cloned())
    }

    async fn get_recorded(
        &self,
        chan_id: &str,
        start_time: DateTime<Utc>,
    ) -> Result<Option<Program>, ClientError> {
        Ok(self
            .recorded
            .lock()
            .unwrap()
            .get(&(chan_id.to_string(), start_time))
            .cloned())
    }

    /// Only plain `a|b` alternations are understood
    async fn recorded_list(&self, title_regex: &str) -> Result<Vec<Program>, ClientError> {
        self.title_queries
            .lock()
            .unwrap()
            .push(title_regex.to_string());
        let titles: Vec<&str> = title_regex.split('|').collect();
        Ok(self
            .library
            .lock()
            .unwrap()
            .iter()
            .filter(|p| titles.contains(&p.title.as_str()))
            .cloned()
            .collect())
    }

    async fn video_list(&self) -> Result<Vec<VideoMetadata>, ClientError> {
        Ok(self.videos.lock().unwrap().clone())
    }
}

/// Directory used across the channel scenarios
pub fn sample_channels() -> Vec<ChannelInfo> {
    [("100", "WAB", 10), ("110", "WABHD", 11), ("150", "WCB", 15), ("155", "WCBDT", 16)]
        .into_iter()
        .map(|(num, call_sign, major)| ChannelInfo {
            chan_id: format!("1{num}"),
            chan_num: num.to_string(),
            call_sign: call_sign.to_string(),
            channel_name: format!("{call_sign} Channel"),
            atsc_major_chan: major,
            atsc_minor_chan: 0,
            visible: true,
        })
        .collect()
}

/// A recorded program in `rec_group`
pub fn recording(title: &str, recorded_id: &str, rec_group: &str) -> Program {
    Program {
        title: title.to_string(),
        recording: Some(RecordingInfo {
            recorded_id: recorded_id.to_string(),
            rec_group: rec_group.to_string(),
        }),
        ..Default::default()
    }
}

// ============================================================================
// Shadow publisher
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedState {
    pub namespace: Namespace,
    pub field: String,
    pub value: Value,
    pub delta: DeltaId,
}

#[derive(Default)]
pub struct RecordingPublisher {
    states: Mutex<Vec<PublishedState>>,
    capabilities: Mutex<Vec<(Namespace, CapabilityDescriptor, DeltaId)>>,
    infos: Mutex<Vec<EndpointInfo>>,
    responses: Mutex<Vec<(String, DirectiveResponse)>>,
    completed: Mutex<Vec<DeltaId>>,
    fail_states: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_states(&self, fail: bool) {
        self.fail_states.store(fail, Ordering::SeqCst);
    }

    pub fn states(&self) -> Vec<PublishedState> {
        self.states.lock().unwrap().clone()
    }

    /// Values published for one field, in order
    pub fn values(&self, namespace: Namespace, field: &str) -> Vec<Value> {
        self.states()
            .into_iter()
            .filter(|s| s.namespace == namespace && s.field == field)
            .map(|s| s.value)
            .collect()
    }

    /// Last descriptor published for a namespace
    pub fn capability(&self, namespace: Namespace) -> Option<CapabilityDescriptor> {
        self.capabilities
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(ns, _, _)| *ns == namespace)
            .map(|(_, descriptor, _)| descriptor.clone())
    }

    pub fn infos(&self) -> Vec<EndpointInfo> {
        self.infos.lock().unwrap().clone()
    }

    pub fn responses(&self) -> Vec<(String, DirectiveResponse)> {
        self.responses.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<DeltaId> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShadowPublisher for RecordingPublisher {
    async fn update_state(
        &self,
        _endpoint: &EndpointId,
        namespace: Namespace,
        field: &str,
        value: Value,
        delta: DeltaId,
    ) -> Result<(), ClientError> {
        if self.fail_states.load(Ordering::SeqCst) {
            return Err(ClientError::Publish("shadow rejected update".into()));
        }
        self.states.lock().unwrap().push(PublishedState {
            namespace,
            field: field.to_string(),
            value,
            delta,
        });
        Ok(())
    }

    async fn update_capability(
        &self,
        _endpoint: &EndpointId,
        namespace: Namespace,
        descriptor: &CapabilityDescriptor,
        delta: DeltaId,
    ) -> Result<(), ClientError> {
        self.capabilities
            .lock()
            .unwrap()
            .push((namespace, descriptor.clone(), delta));
        Ok(())
    }

    async fn update_info(
        &self,
        _endpoint: &EndpointId,
        info: &EndpointInfo,
        _delta: DeltaId,
    ) -> Result<(), ClientError> {
        self.infos.lock().unwrap().push(info.clone());
        Ok(())
    }

    async fn publish_response(
        &self,
        _endpoint: &EndpointId,
        reply_to: &str,
        response: &DirectiveResponse,
    ) -> Result<(), ClientError> {
        self.responses
            .lock()
            .unwrap()
            .push((reply_to.to_string(), response.clone()));
        Ok(())
    }

    async fn complete_delta(&self, _endpoint: &EndpointId, delta: DeltaId) -> Result<(), ClientError> {
        self.completed.lock().unwrap().push(delta);
        Ok(())
    }
}

// ============================================================================
// MAC resolver
// ============================================================================

pub struct MockMacResolver {
    mac: Option<String>,
}

impl MockMacResolver {
    pub fn found(mac: &str) -> Arc<Self> {
        Arc::new(Self {
            mac: Some(mac.to_string()),
        })
    }

    pub fn missing() -> Arc<Self> {
        Arc::new(Self { mac: None })
    }
}

#[async_trait]
impl MacResolver for MockMacResolver {
    async fn resolve_mac(&self, _hostname: &str) -> Result<Option<String>, ClientError> {
        Ok(self.mac.clone())
    }
}

// ============================================================================
// Harness
// ============================================================================

/// A registered endpoint wired to mocks
pub struct Harness {
    pub manager: EndpointManager,
    pub frontend: Arc<MockFrontend>,
    pub backend: Arc<MockBackend>,
    pub publisher: Arc<RecordingPublisher>,
    pub id: EndpointId,
    pub endpoint: Arc<Endpoint>,
}

impl Harness {
    pub async fn start(frontend: Arc<MockFrontend>, backend: Arc<MockBackend>) -> Self {
        let publisher = RecordingPublisher::new();
        let manager = EndpointManager::new(
            BridgeConfig::fast_tests(),
            backend.clone(),
            publisher.clone(),
        )
        .expect("invalid config")
        .with_mac_resolver(MockMacResolver::found("00:11:22:33:44:55"));

        let id = manager
            .register_frontend(frontend.clone())
            .await
            .expect("registration failed")
            .expect("frontend disabled");
        let endpoint = manager.endpoint(&id).expect("endpoint missing");
        frontend.attach(endpoint.events());

        Self {
            manager,
            frontend,
            backend,
            publisher,
            id,
            endpoint,
        }
    }

    pub async fn directive(&self, namespace: Namespace, operation: &str, payload: Value) -> DirectiveResponse {
        let request = DirectiveRequest::new(namespace, operation, payload, format!("reply-{operation}"));
        self.manager
            .dispatch(&self.id, request)
            .await
            .expect("unknown endpoint")
    }

    /// Wait for everything an event spawned to be published
    pub async fn settle(&self, delta: DeltaId) {
        self.endpoint.deltas().settle(delta).await;
    }

    pub fn emit(&self, source: EventSource, kind: EventKind, message: EventMessage) -> DeltaId {
        self.endpoint.events().emit(source, MythEvent::new(kind, message))
    }
}

/// Error type and message of a failed response
pub fn error_of(response: &DirectiveResponse) -> (String, String, String) {
    assert!(response.error, "expected an error response, got {response:?}");
    let payload = &response.payload;
    (
        payload["errorType"].as_str().unwrap_or_default().to_string(),
        payload["errorPayload"]["type"].as_str().unwrap_or_default().to_string(),
        payload["errorPayload"]["message"].as_str().unwrap_or_default().to_string(),
    )
}

/// Poll until `condition` holds, failing after two seconds
pub async fn eventually<F: Fn() -> bool>(what: &str, condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Start time of the program used in recording scenarios
pub fn program_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 20, 0, 0).unwrap()
}
