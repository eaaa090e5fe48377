#![allow(clippy::unwrap_used)]
// End-to-end tests for the Hub polling lifecycle against wiremock.

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use veluxa_core::{ConnectionState, CoreError, DeviceId, DeviceKind, HomeId, Hub, HubConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> HubConfig {
    HubConfig {
        api_url: Url::parse(&server.uri()).unwrap(),
        refresh_interval_secs: 0, // tests drive refresh() directly
        ..HubConfig::new("user@example.com", SecretString::from("hunter2".to_owned()))
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok", "refresh_token": "ref", "expires_in": 10_800,
        })))
        .mount(server)
        .await;
}

async fn mount_homes(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/gethomedata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"homes": [{"id": "h1", "name": "Chata"}]},
            "status": "ok",
        })))
        .mount(server)
        .await;
}

fn status_body() -> serde_json::Value {
    json!({
        "body": {"home": {"id": "h1", "modules": [
            {"id": "gw", "type": "NXG", "locked": true, "is_raining": false},
            {"id": "win", "type": "NXO", "velux_type": "window",
             "current_position": 0, "rain_position": 0},
            {"id": "sh", "type": "NXO", "velux_type": "shutter",
             "current_position": 100},
            {"id": "sw", "type": "NXS", "battery_percent": 90},
            {"id": "mystery", "type": "NXO", "velux_type": "awning"},
        ]}},
        "status": "ok",
    })
}

async fn mount_status(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/homestatus"))
        .and(body_string_contains("home_id=h1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .mount(server)
        .await;
}

// ── Lifecycle tests ─────────────────────────────────────────────────

#[tokio::test]
async fn connect_publishes_initial_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_homes(&server).await;
    mount_status(&server).await;

    let hub = Hub::new(config(&server)).unwrap();
    hub.connect().await.unwrap();

    assert_eq!(*hub.connection_state().borrow(), ConnectionState::Connected);

    let snap = hub.snapshot();
    assert_eq!(snap.home_count(), 1);
    assert_eq!(snap.homes[0].name, "Chata");

    // Four known kinds mapped; the unknown velux_type is dropped silently.
    let home = HomeId::from("h1");
    let devices = snap.devices_for(&home);
    assert_eq!(devices.len(), 4);

    let kinds: Vec<DeviceKind> = devices.iter().map(veluxa_core::Device::kind).collect();
    assert!(kinds.contains(&DeviceKind::Gateway));
    assert!(kinds.contains(&DeviceKind::Window));
    assert!(kinds.contains(&DeviceKind::Shutter));
    assert!(kinds.contains(&DeviceKind::Switch));
    assert!(snap.device_by_id(&DeviceId::from("mystery")).is_none());

    // Every device back-references its owning home.
    assert!(devices.iter().all(|d| d.home() == &home));

    assert!(hub.store().last_refresh().is_some());
    hub.disconnect().await;
    assert_eq!(
        *hub.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn bad_credentials_fail_connect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let hub = Hub::new(config(&server)).unwrap();
    let result = hub.connect().await;

    assert!(matches!(
        result,
        Err(CoreError::AuthenticationFailed { .. })
    ));
    assert_eq!(
        *hub.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn refresh_requires_connect() {
    let server = MockServer::start().await;
    let hub = Hub::new(config(&server)).unwrap();

    assert!(matches!(hub.refresh().await, Err(CoreError::Disconnected)));
}

// ── Cycle failure tests ─────────────────────────────────────────────

#[tokio::test]
async fn failed_cycle_retains_previous_snapshot() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_homes(&server).await;

    // First status fetch succeeds, everything after that breaks.
    Mock::given(method("POST"))
        .and(path("/api/homestatus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/homestatus"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let hub = Hub::new(config(&server)).unwrap();
    hub.connect().await.unwrap();
    let before = hub.snapshot();
    let refreshed_at = hub.store().last_refresh();

    // The whole cycle fails -- no partial aggregation, transient error.
    let result = hub.refresh().await;
    let err = result.unwrap_err();
    assert!(matches!(err, CoreError::UpdateFailed { .. }));
    assert!(err.is_transient());

    let after = hub.snapshot();
    assert_eq!(after.device_count(), before.device_count());
    assert_eq!(hub.store().last_refresh(), refreshed_at);
}

#[tokio::test]
async fn auth_failure_mid_poll_reauthenticates() {
    let server = MockServer::start().await;

    // The token endpoint must be hit twice: connect + re-auth.
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok", "refresh_token": "ref", "expires_in": 10_800,
        })))
        .expect(2)
        .mount(&server)
        .await;

    mount_status(&server).await;

    // Home list succeeds once (initial refresh), then rejects the token.
    Mock::given(method("POST"))
        .and(path("/api/gethomedata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"homes": [{"id": "h1", "name": "Chata"}]},
            "status": "ok",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/gethomedata"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let hub = Hub::new(config(&server)).unwrap();
    hub.connect().await.unwrap();

    let result = hub.refresh().await;
    assert!(matches!(result, Err(CoreError::UpdateFailed { .. })));

    // Previous snapshot survives the failed cycle.
    assert_eq!(hub.snapshot().home_count(), 1);
}

// ── Background polling ──────────────────────────────────────────────

#[tokio::test]
async fn background_task_polls_on_interval() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_status(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/gethomedata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "body": {"homes": [{"id": "h1", "name": "Chata"}]},
            "status": "ok",
        })))
        .expect(2..)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.refresh_interval_secs = 1;

    let hub = Hub::new(cfg).unwrap();
    hub.connect().await.unwrap();

    let mut updates = hub.subscribe();
    updates.mark_unchanged();
    // The next publish comes from the background task, not connect().
    tokio::time::timeout(std::time::Duration::from_secs(3), updates.changed())
        .await
        .expect("background refresh within interval")
        .unwrap();

    hub.disconnect().await;
}
