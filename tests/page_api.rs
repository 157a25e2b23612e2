//! HTTP tests for the console page and JSON API.
//!
//! Requests are sent straight to the router with `oneshot`, no socket.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use review_console_lib::commands::review::demo_requests;
use review_console_lib::models::Instructor;
use review_console_lib::services::console_server::{build_router, ConsoleState};
use review_console_lib::services::{ConsoleSession, MemoryRequestStore, TransitionPolicy};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn router(policy: TransitionPolicy) -> (Router, ConsoleState) {
    let store = Arc::new(MemoryRequestStore::with_requests(demo_requests()));
    let session = ConsoleSession::open(store, Instructor::new("jdoe", "Dr. Doe"), policy)
        .await
        .into_shared();
    let state = ConsoleState::new(session);
    (build_router(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, text) = send(app, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn test_list_requests() {
    let (app, _) = router(TransitionPolicy::default()).await;
    let (status, body) = send_json(&app, Method::GET, "/api/requests", None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["label"], "Alice Johnson (S101) - pending");
    assert_eq!(rows[2]["request"]["id"], "S103");
    assert_eq!(rows[1]["approve"]["decision"], "approve");
    assert_eq!(body["policy"], "last_write_wins");
}

#[tokio::test]
async fn test_approve_and_deny_via_api() {
    let (app, _) = router(TransitionPolicy::default()).await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/requests/S101/approve",
        Some(json!({"note": "ok"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["instructorNote"], "ok");

    let (status, _) = send_json(
        &app,
        Method::PUT,
        "/api/requests/S102/note",
        Some(json!({"note": "insufficient"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send_json(&app, Method::POST, "/api/requests/S102/deny", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "denied");
    assert_eq!(body["instructorNote"], "insufficient");

    let (_, body) = send_json(&app, Method::GET, "/api/requests", None).await;
    assert_eq!(body["rows"][2]["label"], "Charlie Lee (S103) - pending");
}

#[tokio::test]
async fn test_decision_without_body_uses_note_input() {
    let (app, _) = router(TransitionPolicy::default()).await;

    send_json(
        &app,
        Method::PUT,
        "/api/requests/S103/note",
        Some(json!({"note": "welcome aboard"})),
    )
    .await;

    let (status, body) = send_json(&app, Method::POST, "/api/requests/S103/approve", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");
    assert_eq!(body["instructorNote"], "welcome aboard");
}

#[tokio::test]
async fn test_error_status_codes() {
    let (app, _) = router(TransitionPolicy::FinalDecision).await;

    let (status, body) =
        send_json(&app, Method::POST, "/api/requests/S999/approve", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/requests/S101/approve",
        Some(json!({"expectedStatus": "archived"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    send_json(&app, Method::POST, "/api/requests/S101/approve", Some(json!({}))).await;
    let (status, body) =
        send_json(&app, Method::POST, "/api/requests/S101/deny", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, body) = send_json(&app, Method::GET, "/api/unknown", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_console_page_and_form_post() {
    let (app, _) = router(TransitionPolicy::default()).await;

    let (status, html) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Hello, Dr. Doe!"));
    assert_eq!(html.matches("<li class=\"row").count(), 3);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/requests/S102/deny")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("note=not+yet"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let (_, html) = send(&app, Method::GET, "/", None).await;
    assert!(html.contains("Bob Smith (S102) - denied"));
    assert!(html.contains("Note: not yet"));
}

#[tokio::test]
async fn test_home_and_navigation() {
    let (app, state) = router(TransitionPolicy::default()).await;
    let mut events = state.navigator.subscribe();

    let (status, body) = send_json(&app, Method::GET, "/api/home", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["greeting"], "Hello, Dr. Doe!");
    assert_eq!(body["menu"].as_array().unwrap().len(), 5);

    let (status, body) = send_json(&app, Method::POST, "/api/navigate/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["target"], "logout");
    assert_eq!(body["username"], "jdoe");

    let event = events.recv().await.unwrap();
    assert_eq!(event.target.as_str(), "logout");

    let (status, _) = send_json(&app, Method::POST, "/api/navigate/settings", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, html) = send(&app, Method::POST, "/navigate/qa-page", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"data-target="qa-page""#));
}
