// Integration tests for `BackendClient` using wiremock.
#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use silowatch_api::models::LocationRecord;
use silowatch_api::{BackendClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let client = BackendClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn ts(raw: &str) -> DateTime<Utc> {
    raw.parse().unwrap()
}

// ── Alerts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_alerts_newest_first() {
    let (server, client) = setup().await;

    let body = json!({
        "data": [
            {
                "id": "a2",
                "type": "temperature_high",
                "severity": "high",
                "status": "active",
                "title": "Bin 3 hot",
                "message": "Temperature above 30C",
                "farmId": "F1",
                "value": 31.5,
                "threshold": 30.0,
                "unit": "C",
                "createdAt": "2025-03-01T12:00:00Z"
            },
            {
                "id": "a1",
                "type": "battery_low",
                "severity": "low",
                "status": "resolved",
                "title": "Battery",
                "message": "Battery at 10%",
                "createdAt": "2025-03-01T10:00:00Z",
                "resolvedAt": "2025-03-01T11:00:00Z",
                "resolvedBy": "u1"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .and(query_param("orderBy", "createdAt"))
        .and(query_param("direction", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let alerts: Vec<_> = client
        .list_alerts()
        .await
        .unwrap()
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[0].id, "a2");
    assert_eq!(alerts[0].alert_type, "temperature_high");
    assert_eq!(alerts[0].value, Some(31.5));
    assert_eq!(alerts[1].resolved_by.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_list_alerts_isolates_malformed_documents() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "a1", "type": "battery_low", "metadata": null, "title": null },
                { "id": "a2", "value": "very hot" },
                "not an object"
            ]
        })))
        .mount(&server)
        .await;

    let alerts = client.list_alerts().await.unwrap();

    assert_eq!(alerts.len(), 3);
    let first = alerts[0].as_ref().unwrap();
    assert_eq!(first.id, "a1");
    assert!(first.metadata.is_empty());
    assert_eq!(alerts[1].as_ref().unwrap_err().id.as_deref(), Some("a2"));
    assert_eq!(alerts[2].as_ref().unwrap_err().id, None);
}

#[tokio::test]
async fn test_acknowledge_alert_posts_actor_and_time() {
    let (server, client) = setup().await;
    let at = ts("2025-03-01T12:05:00Z");

    Mock::given(method("POST"))
        .and(path("/v1/alerts/a2/acknowledge"))
        .and(body_json(json!({ "actor": "u1", "at": "2025-03-01T12:05:00Z" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a2",
            "type": "temperature_high",
            "severity": "high",
            "status": "acknowledged",
            "acknowledgedAt": "2025-03-01T12:05:00Z",
            "acknowledgedBy": "u1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = client.acknowledge_alert("a2", "u1", at).await.unwrap();

    assert_eq!(record.status, "acknowledged");
    assert_eq!(record.acknowledged_at, Some(at));
    assert_eq!(record.acknowledged_by.as_deref(), Some("u1"));
}

#[tokio::test]
async fn test_delete_alert() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/alerts/a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_alert("a1").await.unwrap();
}

// ── Registration codes ──────────────────────────────────────────────

#[tokio::test]
async fn test_generate_registration_code() {
    let (server, client) = setup().await;
    let expires_at = ts("2025-03-02T10:00:00Z");
    let location = LocationRecord {
        name: "North bin".into(),
        coordinates: None,
    };

    Mock::given(method("POST"))
        .and(path("/v1/registration-codes"))
        .and(body_json(json!({
            "farmId": "F1",
            "deviceName": "Field A Sensor",
            "location": { "name": "North bin", "coordinates": null },
            "expiresAt": "2025-03-02T10:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "registrationCode": "AB12CD34",
            "expiresAt": "2025-03-02T10:00:00Z",
            "deviceName": "Field A Sensor",
            "farmName": "Home Farm"
        })))
        .mount(&server)
        .await;

    let resp = client
        .generate_registration_code("F1", "Field A Sensor", Some(&location), expires_at)
        .await
        .unwrap();

    assert_eq!(resp.registration_code, "AB12CD34");
    assert_eq!(resp.expires_at, expires_at);
    assert_eq!(resp.farm_name.as_deref(), Some("Home Farm"));
}

#[tokio::test]
async fn test_list_active_registration_codes_filters_server_side() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/registration-codes"))
        .and(query_param("used", "false"))
        .and(query_param("expiresAfter", "2025-03-01T10:00:00.000Z"))
        .and(query_param("orderBy", "expires_at"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "c1",
                "code": "AB12CD34",
                "device_name": "Field A Sensor",
                "farm_id": "F1",
                "expires_at": "2025-03-02T10:00:00Z",
                "used": false
            }]
        })))
        .mount(&server)
        .await;

    let codes = client
        .list_active_registration_codes(ts("2025-03-01T10:00:00Z"))
        .await
        .unwrap();

    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].as_ref().unwrap().code, "AB12CD34");
}

#[tokio::test]
async fn test_revoke_registration_code_marks_used() {
    let (server, client) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/v1/registration-codes/c1"))
        .and(body_json(json!({
            "used": true,
            "revoked_at": "2025-03-01T10:30:00Z"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .revoke_registration_code("c1", ts("2025-03-01T10:30:00Z"))
        .await
        .unwrap();
}

// ── Auth & errors ───────────────────────────────────────────────────

#[tokio::test]
async fn test_api_key_sent_as_bearer() {
    let server = MockServer::start().await;
    let key = SecretString::from("k-123".to_owned());
    let client =
        BackendClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .and(header("authorization", "Bearer k-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let alerts = client.list_alerts().await.unwrap();
    assert!(alerts.is_empty());
}

#[tokio::test]
async fn test_timeout_reports_configured_limit() {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        timeout: std::time::Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let client =
        BackendClient::from_api_key(&server.uri(), &SecretString::from("k"), &transport).unwrap();

    Mock::given(method("GET"))
        .and(path("/v1/alerts/a1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "id": "a1" }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client.get_alert("a1").await.unwrap_err();
    assert!(matches!(err, Error::Timeout { timeout_secs: 1 }), "got {err:?}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client.list_alerts().await.unwrap_err();
    assert!(matches!(err, Error::InvalidApiKey), "got {err:?}");
}

#[tokio::test]
async fn test_structured_backend_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "alert not found",
            "code": "alerts.not_found"
        })))
        .mount(&server)
        .await;

    let err = client.get_alert("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.api_error_code(), Some("alerts.not_found"));
    match err {
        Error::Backend {
            status, message, ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(message, "alert not found");
        }
        other => panic!("expected Backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client.get_alert("a1").await.unwrap_err();
    match err {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got {other:?}"),
    }
}
