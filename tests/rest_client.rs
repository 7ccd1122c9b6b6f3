// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jesof

// RouterOS REST client against wiremock devices.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mikrotik_webui::{
    ClientError, Credentials, DeviceApi, DeviceEndpoint, DeviceTarget, MikroTikClient, RetryPolicy,
};

// ── Helpers ─────────────────────────────────────────────────────────

const MAX_RETRIES: u32 = 2;

fn client(timeout: Duration) -> MikroTikClient {
    let http = reqwest::Client::builder().timeout(timeout).build().unwrap();
    MikroTikClient::with_http(
        http,
        RetryPolicy::new(MAX_RETRIES, Duration::from_millis(5)),
    )
}

fn target(server: &MockServer) -> DeviceTarget {
    let addr = server.address();
    DeviceTarget {
        endpoint: DeviceEndpoint::new(addr.ip().to_string(), addr.port()),
        credentials: Credentials::new("admin", "secret"),
    }
}

async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/rest/system/identity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "core-rtr" })))
        .mount(server)
        .await;
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_resource_decodes_records() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    let body = json!([
        { ".id": "*1", "address": "192.168.88.1/24", "interface": "bridge", "dynamic": false },
        { ".id": "*2", "address": "10.0.0.1/30", "interface": "ether1", "dynamic": true }
    ]);
    Mock::given(method("GET"))
        .and(path("/rest/ip/address"))
        .and(header("authorization", "Basic YWRtaW46c2VjcmV0"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let resource = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "/ip/address/")
        .await
        .unwrap();

    assert_eq!(resource.path, "ip/address");
    assert_eq!(resource.records.len(), 2);
    assert_eq!(resource.records[0]["address"], "192.168.88.1/24");
    assert_eq!(resource.records[1]["dynamic"], "true");
    assert_eq!(resource.columns()[0], ".id");
}

#[tokio::test]
async fn test_snapshot_reads_system_and_interfaces() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uptime": "2d3h",
            "cpu-load": "4",
            "free-memory": "805306368",
            "total-memory": "1073741824",
            "version": "7.16.1 (stable)",
            "board-name": "RB5009UG+S+",
            "architecture-name": "arm64"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "name": "ether1", "type": "ether", "running": "true", "disabled": "false",
              "rx-byte": "1000", "tx-byte": "2000" },
            { "name": "wlan1", "type": "wlan", "running": "false", "disabled": "true" }
        ])))
        .mount(&server)
        .await;

    let snapshot = client(Duration::from_secs(5))
        .fetch_snapshot(&target(&server))
        .await
        .unwrap();

    assert_eq!(snapshot.identity.as_deref(), Some("core-rtr"));
    assert_eq!(snapshot.system.board_name, "RB5009UG+S+");
    assert_eq!(snapshot.system.cpu_load, 4);
    assert_eq!(snapshot.interfaces.len(), 2);
    assert!(snapshot.interfaces[0].running);
    assert_eq!(snapshot.interfaces[0].tx_bytes, 2000);
    assert!(snapshot.interfaces[1].disabled);
}

#[tokio::test]
async fn test_probe_reports_identity() {
    let server = MockServer::start().await;
    mount_identity(&server).await;
    Mock::given(method("GET"))
        .and(path("/rest/system/resource"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "7.15" })))
        .mount(&server)
        .await;

    let report = client(Duration::from_secs(5))
        .probe(&target(&server))
        .await
        .unwrap();

    assert_eq!(report.identity.as_deref(), Some("core-rtr"));
    assert_eq!(report.system.version, "7.15");
}

// ── Failure tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_is_auth_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "interface")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Auth { status: 401, .. }), "got {err:?}");
    assert!(!err.user_message().contains("secret"));
}

#[tokio::test]
async fn test_timeout_is_retried_then_surfaces_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "slow" }))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(u64::from(MAX_RETRIES) + 1)
        .mount(&server)
        .await;

    let err = client(Duration::from_millis(100))
        .fetch_resource(&target(&server), "interface")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Connection { .. }), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_service_unavailable_is_retried() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "ether1" }])))
        .expect(1)
        .mount(&server)
        .await;

    let resource = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "interface")
        .await
        .unwrap();

    assert_eq!(resource.records[0]["name"], "ether1");
}

#[tokio::test]
async fn test_device_error_payload_is_not_retried() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/ip/nonsense"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 400,
            "message": "Bad Request",
            "detail": "no such command or directory (nonsense)"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "ip/nonsense")
        .await
        .unwrap_err();

    match err {
        ClientError::Device {
            status,
            message,
            detail,
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Bad Request");
            assert_eq!(
                detail.as_deref(),
                Some("no such command or directory (nonsense)")
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let server = MockServer::start().await;
    mount_identity(&server).await;

    Mock::given(method("GET"))
        .and(path("/rest/interface"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>webfig</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "interface")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Protocol { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_invalid_path_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(Duration::from_secs(5))
        .fetch_resource(&target(&server), "../../etc/passwd")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::InvalidPath { .. }), "got {err:?}");
}

/// Device that announces a 200-byte JSON body, sends 8 bytes and hangs up
async fn spawn_truncating_device() -> (std::net::SocketAddr, Arc<AtomicUsize>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = accepted.clone();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                      Content-Length: 200\r\n\r\n{\"name\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, accepted)
}

#[tokio::test]
async fn test_truncated_body_is_retried_as_connection_error() {
    let (addr, accepted) = spawn_truncating_device().await;
    let target = DeviceTarget {
        endpoint: DeviceEndpoint::new(addr.ip().to_string(), addr.port()),
        credentials: Credentials::new("admin", "secret"),
    };

    let err = client(Duration::from_secs(5))
        .fetch_resource(&target, "interface")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Connection { .. }), "got {err:?}");
    assert!(err.is_transient());
    assert_eq!(
        accepted.load(Ordering::SeqCst),
        usize::try_from(MAX_RETRIES).unwrap() + 1
    );
}

#[tokio::test]
async fn test_refused_connection_is_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let target = DeviceTarget {
        endpoint: DeviceEndpoint::new("127.0.0.1", port),
        credentials: Credentials::new("admin", "secret"),
    };
    let err = client(Duration::from_secs(2))
        .probe(&target)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Connection { .. }), "got {err:?}");
}
