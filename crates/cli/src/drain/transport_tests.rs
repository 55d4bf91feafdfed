// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use crate::drain::test_helpers::{location, unit_status, StubServer};
use unitq_core::Payload;

fn ok(_path: &str) -> u16 {
    200
}

fn reject_status(path: &str) -> u16 {
    if path.ends_with("SaveUnitStatus") {
        500
    } else {
        200
    }
}

fn api(url: String, token: Option<&str>) -> ApiConfig {
    ApiConfig {
        url,
        token: token.map(str::to_string),
        timeout_secs: 5,
    }
}

fn queued<P: Payload>(payload: &P) -> QueuedEvent {
    QueuedEvent::new(
        "evt-0000abcd".into(),
        P::EVENT_TYPE,
        payload.to_data().unwrap(),
        3,
        1_000,
    )
}

#[test]
fn unit_status_without_fix_blanks_gps() {
    let mut data = unit_status("U1");
    data.latitude = Some("39.7".into());
    let body = SaveUnitStatusInput::from(&data);

    assert_eq!(body.id, "U1");
    assert_eq!(body.status_type, "2");
    assert_eq!(body.responding_to, "0");
    assert_eq!(body.note, "");
    for field in [
        &body.latitude,
        &body.longitude,
        &body.accuracy,
        &body.altitude,
        &body.altitude_accuracy,
        &body.speed,
        &body.heading,
    ] {
        assert_eq!(field, "");
    }
}

#[test]
fn unit_status_with_fix_defaults_missing_to_zero() {
    let mut data = unit_status("U1");
    data.latitude = Some("39.7".into());
    data.longitude = Some("-104.9".into());
    data.speed = Some("12".into());
    data.responding_to = Some("CALL-9".into());
    let body = SaveUnitStatusInput::from(&data);

    assert_eq!(body.latitude, "39.7");
    assert_eq!(body.longitude, "-104.9");
    assert_eq!(body.speed, "12");
    assert_eq!(body.accuracy, "0");
    assert_eq!(body.altitude, "0");
    assert_eq!(body.altitude_accuracy, "0");
    assert_eq!(body.heading, "0");
    assert_eq!(body.responding_to, "CALL-9");
}

#[test]
fn unit_status_serializes_pascal_case_with_roles() {
    let mut data = unit_status("U1");
    data.roles = Some(vec![RoleAssignment {
        role_id: "R1".into(),
        user_id: "user-7".into(),
    }]);
    let json = serde_json::to_value(SaveUnitStatusInput::from(&data)).unwrap();

    assert_eq!(json["Id"], "U1");
    assert_eq!(json["Type"], "2");
    assert_eq!(json["TimestampUtc"], "Tue, 14 Nov 2023 22:13:20 GMT");
    assert_eq!(json["Roles"][0]["RoleId"], "R1");
    assert_eq!(json["Roles"][0]["UserId"], "user-7");
}

#[test]
fn location_sends_strings_and_blanks_missing() {
    let body = SaveUnitLocationInput::from(&location("U2"));

    assert_eq!(body.unit_id, "U2");
    assert_eq!(body.latitude, "39.7392");
    assert_eq!(body.longitude, "-104.9903");
    assert_eq!(body.accuracy, "5");
    assert_eq!(body.heading, "");
    assert_eq!(body.speed, "");
}

#[test]
fn call_file_encodes_contents() {
    let data = CallImageUploadData {
        call_id: "C1".into(),
        user_id: "user-1".into(),
        note: "front door".into(),
        name: "door.jpg".into(),
        latitude: Some(1.5),
        longitude: None,
        file_path: "/tmp/door.jpg".into(),
    };
    let body = SaveCallFileInput::new(&data, b"hello");

    assert_eq!(body.data, "aGVsbG8=");
    assert_eq!(body.file_type, 2);
    let json = serde_json::to_value(&body).unwrap();
    assert_eq!(json["Type"], 2);
    assert_eq!(json["Latitude"], 1.5);
    assert!(json["Longitude"].is_null());
}

#[test]
fn endpoint_joins_without_double_slash() {
    let deliverer = HttpDeliverer::new(&api("http://host/api/v4/".into(), None)).unwrap();
    assert_eq!(
        deliverer.endpoint(SAVE_UNIT_STATUS_PATH),
        "http://host/api/v4/UnitStatus/SaveUnitStatus"
    );
}

#[tokio::test]
async fn delivers_unit_status_with_bearer_token() {
    let server = StubServer::start(ok).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), Some("t0k3n"))).unwrap();

    deliverer.deliver(&queued(&unit_status("U1"))).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/api/v4/UnitStatus/SaveUnitStatus");
    assert_eq!(
        requests[0].headers.get("authorization").map(String::as_str),
        Some("Bearer t0k3n")
    );
    assert_eq!(requests[0].json()["Id"], "U1");
}

#[tokio::test]
async fn delivers_location_to_location_endpoint() {
    let server = StubServer::start(ok).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), None)).unwrap();

    deliverer.deliver(&queued(&location("U2"))).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/v4/UnitLocation/SetUnitLocation");
    assert!(!requests[0].headers.contains_key("authorization"));
    assert_eq!(requests[0].json()["Latitude"], "39.7392");
}

#[tokio::test]
async fn delivers_call_image_from_file() {
    let server = StubServer::start(ok).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), None)).unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scene.jpg");
    std::fs::write(&path, b"hello").unwrap();

    let data = CallImageUploadData {
        call_id: "C1".into(),
        user_id: "user-1".into(),
        note: String::new(),
        name: "scene.jpg".into(),
        latitude: None,
        longitude: None,
        file_path: path.display().to_string(),
    };
    deliverer.deliver(&queued(&data)).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests[0].path, "/api/v4/CallFiles/SaveCallFile");
    assert_eq!(requests[0].json()["Data"], "aGVsbG8=");
    assert_eq!(requests[0].json()["CallId"], "C1");
}

#[tokio::test]
async fn missing_image_file_fails_without_request() {
    let server = StubServer::start(ok).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), None)).unwrap();
    let data = CallImageUploadData {
        call_id: "C1".into(),
        user_id: "user-1".into(),
        note: String::new(),
        name: "gone.jpg".into(),
        latitude: None,
        longitude: None,
        file_path: "/nonexistent/gone.jpg".into(),
    };

    let err = deliverer.deliver(&queued(&data)).await.unwrap_err();
    assert!(matches!(err, DeliveryError::File { .. }));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let server = StubServer::start(reject_status).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), None)).unwrap();

    let err = deliverer
        .deliver(&queued(&unit_status("U1")))
        .await
        .unwrap_err();
    match err {
        DeliveryError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn mismatched_data_is_invalid_payload() {
    let server = StubServer::start(ok).await;
    let deliverer = HttpDeliverer::new(&api(server.url(), None)).unwrap();
    let mut event = queued(&unit_status("U1"));
    event.data.remove("unitId");

    let err = deliverer.deliver(&event).await.unwrap_err();
    assert!(matches!(err, DeliveryError::InvalidPayload(_)));
}

#[tokio::test]
async fn unreachable_server_is_request_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let deliverer = HttpDeliverer::new(&api(format!("http://{addr}/api"), None)).unwrap();

    let err = deliverer
        .deliver(&queued(&location("U2")))
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Request(_)));
}
