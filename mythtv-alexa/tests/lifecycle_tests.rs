//! Endpoint registration, full publication and delta completion

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use mythtv_alexa::alexa_types::{CapabilityDescriptor, EndpointId, Key, Namespace};
use mythtv_alexa::event_router::{EventKind, EventMessage, EventSource};
use mythtv_alexa::{BridgeConfig, BridgeError, EndpointManager, FrontendClient};
use serde_json::json;

fn manager(backend: &Arc<MockBackend>, publisher: &Arc<RecordingPublisher>) -> EndpointManager {
    EndpointManager::new(BridgeConfig::fast_tests(), backend.clone(), publisher.clone())
        .unwrap()
        .with_mac_resolver(MockMacResolver::found("00:11:22:33:44:55"))
}

#[test]
fn test_zero_monitor_timeout_is_rejected() {
    let config = BridgeConfig::fast_tests().with_monitor_timeout(Duration::ZERO);
    let result = EndpointManager::new(config, MockBackend::new(), RecordingPublisher::new());
    assert!(matches!(
        result,
        Err(BridgeError::InvalidSetting { ref key, .. }) if key == "monitor_timeout"
    ));
}

#[tokio::test]
async fn test_disabled_frontend_is_skipped() {
    let backend = MockBackend::new();
    backend.set_setting("AlexaEnabled", "false");
    let publisher = RecordingPublisher::new();
    let manager = manager(&backend, &publisher);

    let registered = manager.register_frontend(MockFrontend::idle()).await.unwrap();

    assert_eq!(registered, None);
    assert!(manager.endpoints().is_empty());
    assert!(publisher.states().is_empty());
    assert!(publisher.completed().is_empty());
}

#[tokio::test]
async fn test_unreadable_flag_fails_registration() {
    let backend = MockBackend::new();
    backend.fail_settings(true);
    let publisher = RecordingPublisher::new();

    let err = manager(&backend, &publisher)
        .register_frontend(MockFrontend::idle())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Client(_)));
}

#[tokio::test]
async fn test_initial_publication_covers_every_capability() {
    let backend = MockBackend::with_channels(sample_channels());
    backend.set_setting("AlexaFriendlyName", "Living Room TV");
    let h = Harness::start(MockFrontend::watching_live_tv("1150"), backend).await;
    let p = &h.publisher;

    assert_eq!(
        p.capability(Namespace::Channel),
        Some(CapabilityDescriptor::properties(&["channel"]))
    );
    assert_eq!(
        p.capability(Namespace::Playback),
        Some(CapabilityDescriptor::operations(Namespace::Playback.supported_operations()))
    );
    assert_eq!(p.capability(Namespace::Keypad), Some(CapabilityDescriptor::Keys(Key::ALL.to_vec())));
    assert_eq!(p.capability(Namespace::Launcher), Some(CapabilityDescriptor::Enabled));
    assert_eq!(p.capability(Namespace::VideoPlayer), Some(CapabilityDescriptor::Enabled));
    assert_eq!(
        p.capability(Namespace::WakeOnLan),
        Some(CapabilityDescriptor::MacAddresses(vec!["00:11:22:33:44:55".into()]))
    );

    assert_eq!(
        p.values(Namespace::Channel, "channel"),
        vec![json!({ "number": "150", "affiliateCallSign": "WCB" })]
    );
    assert_eq!(
        p.values(Namespace::PlaybackState, "playbackState"),
        vec![json!({ "state": "PLAYING" })]
    );
    assert_eq!(p.values(Namespace::Health, "connectivity"), vec![json!("OK")]);
    assert_eq!(p.values(Namespace::Power, "powerState"), vec![json!("ON")]);

    let infos = p.infos();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].friendly_name, "Living Room TV");
    assert_eq!(infos[0].description, "MythTV Frontend livingroom");
    assert_eq!(infos[0].display_categories, vec!["TV"]);
    assert_eq!(infos[0].endpoint_id, EndpointId::new("MythTV", HOSTNAME));

    // One delta for the whole initial publication
    let completed = p.completed();
    assert_eq!(completed.len(), 1);
    assert!(p.states().iter().all(|s| s.delta == completed[0]));
}

#[tokio::test]
async fn test_refresh_republishes_only_changes() {
    let h = Harness::start(MockFrontend::idle(), MockBackend::with_channels(sample_channels())).await;
    let states_before = h.publisher.states().len();

    let delta = h.manager.refresh(&h.id).await.unwrap();

    assert_eq!(h.publisher.states().len(), states_before);
    assert_eq!(h.publisher.infos().len(), 1);
    assert_eq!(h.publisher.completed().last(), Some(&delta));
}

#[tokio::test]
async fn test_wake_on_lan_withheld_without_mac() {
    let backend = MockBackend::new();
    let publisher = RecordingPublisher::new();
    let manager = EndpointManager::new(BridgeConfig::fast_tests(), backend, publisher.clone())
        .unwrap()
        .with_mac_resolver(MockMacResolver::missing());

    manager.register_frontend(MockFrontend::idle()).await.unwrap();

    assert_eq!(
        publisher.capability(Namespace::WakeOnLan),
        Some(CapabilityDescriptor::Withheld)
    );
}

#[tokio::test]
async fn test_unreachable_frontend_registers_as_off() {
    let frontend = MockFrontend::idle();
    frontend.set_unreachable(true);
    let h = Harness::start(frontend, MockBackend::new()).await;

    assert_eq!(h.publisher.values(Namespace::Health, "connectivity"), vec![json!("UNREACHABLE")]);
    assert_eq!(h.publisher.values(Namespace::Power, "powerState"), vec![json!("OFF")]);
}

#[tokio::test]
async fn test_connectivity_events_complete_their_delta() {
    let h = Harness::start(MockFrontend::idle(), MockBackend::new()).await;

    let delta = h.emit(EventSource::Frontend, EventKind::ClientDisconnected, EventMessage::new());

    let publisher = h.publisher.clone();
    eventually("disconnect delta completed", move || publisher.completed().contains(&delta)).await;
    assert_eq!(
        h.publisher.values(Namespace::Health, "connectivity"),
        vec![json!("OK"), json!("UNREACHABLE")]
    );
    assert_eq!(
        h.publisher.values(Namespace::Power, "powerState"),
        vec![json!("ON"), json!("OFF")]
    );
    assert!(!h.endpoint.activity().is_connected());
}

#[tokio::test]
async fn test_delta_completes_despite_publish_failures() {
    let h = Harness::start(MockFrontend::idle(), MockBackend::new()).await;
    h.publisher.fail_states(true);

    let delta = h.emit(EventSource::Frontend, EventKind::ClientDisconnected, EventMessage::new());

    let publisher = h.publisher.clone();
    eventually("delta completed", move || publisher.completed().contains(&delta)).await;
    assert_eq!(
        h.endpoint.store().get_field(Namespace::Health, "connectivity"),
        Some(json!("UNREACHABLE"))
    );
}

#[tokio::test]
async fn test_register_many_skips_duplicates() {
    let backend = MockBackend::new();
    let publisher = RecordingPublisher::new();
    let manager = manager(&backend, &publisher);

    let frontends: Vec<Arc<dyn FrontendClient>> = vec![
        MockFrontend::on_host("livingroom", status("idle", None)),
        MockFrontend::on_host("bedroom", status("idle", None)),
        MockFrontend::on_host("bedroom", status("idle", None)),
    ];
    let registered = manager.register_frontends(frontends).await;

    assert_eq!(registered.len(), 2);
    assert_eq!(
        manager.endpoints(),
        vec![EndpointId::new("MythTV", "bedroom"), EndpointId::new("MythTV", "livingroom")]
    );
    assert_eq!(publisher.completed().len(), 2);
}

#[tokio::test]
async fn test_second_registration_of_host_is_duplicate() {
    let h = Harness::start(MockFrontend::idle(), MockBackend::new()).await;

    let err = h
        .manager
        .register_frontend(MockFrontend::idle())
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::DuplicateEndpoint(id) if id == h.id));
}
