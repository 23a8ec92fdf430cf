// End-to-end tests for `Controller` over HTTP, backed by wiremock.
#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use silowatch_core::{
    AlertStatus, Command, CommandResult, ControllerConfig, Controller, CoreError, EntityId,
};

fn config(server: &MockServer) -> ControllerConfig {
    ControllerConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("sw-test-key"),
        "Jane Doe",
    )
}

fn alert_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": "humidity_high",
        "severity": "critical",
        "status": status,
        "title": "Bin 2 humidity",
        "message": "Humidity at 19%",
        "farmId": "F1",
        "createdAt": "2025-03-01T10:00:00Z",
        "updatedAt": "2025-03-01T10:00:00Z"
    })
}

async fn mount_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .and(header("authorization", "Bearer sw-test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [alert_json("a1", "active"), json!({ "id": "" })]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/registration-codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": "c1",
                "code": "K7P2QX",
                "device_name": "Field A Sensor",
                "farm_id": "F1",
                "expires_at": "2099-01-01T00:00:00Z",
                "used": false
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn oneshot_loads_snapshots_and_skips_invalid_records() {
    let server = MockServer::start().await;
    mount_lists(&server).await;

    let (alerts, codes) = Controller::oneshot(config(&server), |ctrl| async move {
        Ok((ctrl.alerts_snapshot(), ctrl.registration_codes_snapshot()))
    })
    .await
    .unwrap();

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].status, AlertStatus::Active);
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].code, "K7P2QX");
}

#[tokio::test]
async fn malformed_documents_do_not_sink_the_snapshot() {
    let server = MockServer::start().await;

    let mut null_metadata = alert_json("a2", "acknowledged");
    null_metadata["metadata"] = json!(null);
    null_metadata["title"] = json!(null);
    let mut bad_value = alert_json("a3", "active");
    bad_value["value"] = json!("very hot");
    let mut no_id = alert_json("", "active");
    no_id.as_object_mut().unwrap().remove("id");

    Mock::given(method("GET"))
        .and(path("/v1/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [alert_json("a1", "active"), null_metadata, bad_value, no_id]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/registration-codes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "c1", "code": "K7P2QX", "used": null, "expires_at": "2099-01-01T00:00:00Z" },
                { "id": "c2", "code": "Q9R8ST", "used": "no", "expires_at": "2099-01-01T00:00:00Z" }
            ]
        })))
        .mount(&server)
        .await;

    let (alerts, codes) = Controller::oneshot(config(&server), |ctrl| async move {
        Ok((ctrl.alerts_snapshot(), ctrl.registration_codes_snapshot()))
    })
    .await
    .unwrap();

    let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a1", "a2"]);
    assert!(alerts[1].metadata.is_empty());
    assert_eq!(alerts[1].title, "");
    assert_eq!(codes.len(), 1);
    assert!(!codes[0].used);
}

#[tokio::test]
async fn acknowledge_unknown_alert_is_not_found() {
    let server = MockServer::start().await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "not_found",
            "message": "alert not found"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/alerts/missing/acknowledge"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = Controller::oneshot(config(&server), |ctrl| async move {
        ctrl.execute(Command::AcknowledgeAlert {
            id: EntityId::from("missing"),
        })
        .await
    })
    .await
    .unwrap_err();

    assert!(
        matches!(&err, CoreError::NotFound { identifier, .. } if identifier == "missing"),
        "got {err:?}"
    );
    assert!(err.is_remote_failure());
}

#[tokio::test]
async fn acknowledge_goes_through_backend() {
    let server = MockServer::start().await;
    mount_lists(&server).await;

    Mock::given(method("GET"))
        .and(path("/v1/alerts/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alert_json("a1", "active")))
        .mount(&server)
        .await;

    let mut acknowledged = alert_json("a1", "acknowledged");
    acknowledged["acknowledgedBy"] = json!("Jane Doe");
    acknowledged["acknowledgedAt"] = json!("2025-03-01T10:05:00Z");
    Mock::given(method("POST"))
        .and(path("/v1/alerts/a1/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acknowledged))
        .expect(1)
        .mount(&server)
        .await;

    let result = Controller::oneshot(config(&server), |ctrl| async move {
        ctrl.execute(Command::AcknowledgeAlert {
            id: EntityId::from("a1"),
        })
        .await
    })
    .await
    .unwrap();

    let CommandResult::Alert(alert) = result else {
        panic!("expected alert result");
    };
    assert_eq!(alert.status, AlertStatus::Acknowledged);
    assert_eq!(alert.acknowledged_by.as_deref(), Some("Jane Doe"));
}

#[tokio::test]
async fn slow_backend_reports_configured_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.timeout = std::time::Duration::from_secs(1);
    let err = Controller::oneshot(cfg, |_ctrl| async move { Ok(()) })
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Timeout { timeout_secs: 1 }), "got {err:?}");
    assert!(err.to_string().contains("after 1s"), "{err}");
    assert!(err.is_transient());
}

#[tokio::test]
async fn unauthorized_backend_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = Controller::oneshot(config(&server), |_ctrl| async move { Ok(()) })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
}
