//! Seeking through the network control socket

mod common;

use std::sync::Arc;

use common::*;
use mythtv_alexa::alexa_types::{CapabilityDescriptor, Namespace};
use mythtv_alexa::FrontendStatus;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

fn playing_recording(played: f64) -> FrontendStatus {
    FrontendStatus {
        state: "WatchingPreRecorded".into(),
        seconds_played: played,
        total_seconds: 600.0,
        play_speed: Some("1".into()),
        ..Default::default()
    }
}

/// Network control socket that applies `play seek` to the frontend status
async fn control_socket(
    frontend: Arc<MockFrontend>,
    reply: &'static str,
) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        write
            .write_all(b"MythFrontend Network Control\r\n# ")
            .await
            .unwrap();
        let command = BufReader::new(read)
            .lines()
            .next_line()
            .await
            .unwrap()
            .unwrap_or_default();

        if reply.starts_with("OK") {
            if let Some(position) = command.strip_prefix("play seek ") {
                let seconds: f64 = position
                    .split(':')
                    .map(|part| part.parse::<f64>().unwrap())
                    .fold(0.0, |total, part| total * 60.0 + part);
                frontend.update_status(|s| s.seconds_played = seconds);
            }
        }
        write.write_all(reply.as_bytes()).await.unwrap();
        command
    });
    (port, handle)
}

async fn with_control_socket(reply: &'static str) -> (Harness, JoinHandle<String>) {
    let frontend = MockFrontend::on_host("127.0.0.1", playing_recording(60.0));
    let (port, server) = control_socket(Arc::clone(&frontend), reply).await;
    let backend = MockBackend::new();
    backend.set_setting("NetworkControlEnabled", "1");
    backend.set_setting("NetworkControlPort", &port.to_string());
    (Harness::start(frontend, backend).await, server)
}

#[tokio::test]
async fn test_adjust_reports_new_position() {
    let (h, server) = with_control_socket("OK\r\n# ").await;
    assert_eq!(h.publisher.capability(Namespace::Seek), Some(CapabilityDescriptor::Enabled));

    let response = h
        .directive(
            Namespace::Seek,
            "AdjustSeekPosition",
            json!({ "deltaPositionMilliseconds": 30000 }),
        )
        .await;

    assert!(!response.error, "{response:?}");
    assert_eq!(server.await.unwrap(), "play seek 00:01:30");
    assert_eq!(
        response.payload,
        json!({ "properties": [{ "name": "positionMilliseconds", "value": 90000 }] })
    );
}

#[tokio::test]
async fn test_seek_before_start_clamps_to_zero() {
    let (h, server) = with_control_socket("OK\r\n# ").await;

    let response = h
        .directive(
            Namespace::Seek,
            "AdjustSeekPosition",
            json!({ "deltaPositionMilliseconds": -120000 }),
        )
        .await;

    assert!(!response.error, "{response:?}");
    assert_eq!(server.await.unwrap(), "play seek 00:00:00");
}

#[tokio::test]
async fn test_rejected_seek_keeps_frontend_text() {
    let (h, server) = with_control_socket("ERROR: See 'help play' for usage\r\n").await;

    let response = h
        .directive(
            Namespace::Seek,
            "AdjustSeekPosition",
            json!({ "deltaPositionMilliseconds": 10000 }),
        )
        .await;
    server.await.unwrap();

    let (_, kind, message) = error_of(&response);
    assert_eq!(kind, "ENDPOINT_BUSY");
    assert_eq!(message, "ERROR: See 'help play' for usage");
}

#[tokio::test]
async fn test_seek_withheld_without_network_control() {
    let h = Harness::start(MockFrontend::new(playing_recording(0.0)), MockBackend::new()).await;
    assert_eq!(
        h.publisher.capability(Namespace::Seek),
        Some(CapabilityDescriptor::Withheld)
    );
}

#[tokio::test]
async fn test_seek_withheld_on_invalid_port() {
    let backend = MockBackend::new();
    backend.set_setting("NetworkControlEnabled", "1");
    backend.set_setting("NetworkControlPort", "not-a-port");

    let h = Harness::start(MockFrontend::new(playing_recording(0.0)), backend).await;
    assert_eq!(
        h.publisher.capability(Namespace::Seek),
        Some(CapabilityDescriptor::Withheld)
    );
}
