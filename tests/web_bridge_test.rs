//! Agent 桥接 HTTP 接口测试（需 web feature）

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use canvas::backend::RecordingBackend;
use canvas::config::AppConfig;
use canvas::{server, Canvas, Resource};
use serde_json::{json, Value};
use tower::ServiceExt;

fn setup() -> (Arc<Canvas>, Router) {
    let (backend, _calls) = RecordingBackend::new();
    let canvas = Arc::new(Canvas::new(&AppConfig::default(), Arc::new(backend)));
    let app = server::router(Arc::clone(&canvas));
    (canvas, app)
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let (_canvas, app) = setup();
    let (status, body) = call(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Healthy");
}

#[tokio::test]
async fn test_agent_state_push_is_visible_to_canvas() {
    let (canvas, app) = setup();
    let state = json!({
        "model": "openai",
        "research_question": "Why do premiums vary?",
        "resources": [{ "url": "https://a.example", "title": "A", "description": "" }],
        "report": null,
        "logs": [{ "message": "Searching", "done": false }]
    });
    let (status, _) = call(&app, "PUT", "/api/state", Some(state)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(canvas.state().research_question.as_deref(), Some("Why do premiums vary?"));

    let (status, _) = call(&app, "POST", "/api/state/logs", Some(json!({ "message": "Done", "done": true }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(canvas.progress().unwrap().completed(), 1);

    let (status, body) = call(&app, "GET", "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"], "research_agent");
    assert_eq!(body["state"]["logs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_state_push_without_model_keeps_session_model() {
    let (canvas, app) = setup();
    let (status, _) = call(&app, "PUT", "/api/state", Some(json!({ "report": "x" }))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(canvas.state().model_identifier, "openai");
    assert_eq!(canvas.state().report.as_deref(), Some("x"));

    let (_, body) = call(&app, "GET", "/api/state", None).await;
    assert_eq!(body["state"]["model"], "openai");
}

#[tokio::test]
async fn test_builtin_action_name_is_reserved() {
    let (canvas, app) = setup();
    let (status, _) = call(&app, "POST", "/api/actions", Some(json!({ "name": "DeleteResources" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    canvas.resources().add(&Resource::new("a", "A", ""));
    let _pending = tokio::spawn({
        let app = app.clone();
        async move { call(&app, "POST", "/api/actions/DeleteResources/propose", Some(json!({ "urls": ["a"] }))).await }
    });
    while !canvas.gate().is_pending().await {
        tokio::task::yield_now().await;
    }
    let (_, view) = call(&app, "POST", "/api/proposal/present", None).await;
    assert_eq!(view["title"], "Delete these resources?");
    assert_eq!(view["resources"][0]["url"], "a");
}

#[tokio::test]
async fn test_null_urls_proposal_is_accepted() {
    let (canvas, app) = setup();
    let pending = tokio::spawn({
        let app = app.clone();
        async move { call(&app, "POST", "/api/actions/DeleteResources/propose", Some(json!({ "urls": null }))).await }
    });
    while !canvas.gate().is_pending().await {
        tokio::task::yield_now().await;
    }
    call(&app, "POST", "/api/proposal/present", None).await;
    call(&app, "POST", "/api/proposal/resolve", Some(json!({ "decision": "NO" }))).await;

    let (status, body) = pending.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "NO");
}

#[tokio::test]
async fn test_register_and_list_actions() {
    let (_canvas, app) = setup();
    let (status, _) = call(
        &app,
        "POST",
        "/api/actions",
        Some(json!({ "name": "PublishReport", "description": "Publish the draft" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = call(&app, "GET", "/api/actions", None).await;
    let names: Vec<_> = body.as_array().unwrap().iter().map(|a| a["name"].clone()).collect();
    assert_eq!(names, [json!("DeleteResources"), json!("PublishReport")]);
}

#[tokio::test]
async fn test_propose_unknown_action_is_not_found() {
    let (_canvas, app) = setup();
    let (status, _) = call(&app, "POST", "/api/actions/Nope/propose", Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_propose_blocks_until_resolved() {
    let (canvas, app) = setup();
    canvas.resources().add(&Resource::new("a", "A", ""));

    let pending = tokio::spawn({
        let app = app.clone();
        async move { call(&app, "POST", "/api/actions/DeleteResources/propose", Some(json!({ "urls": ["a"] }))).await }
    });
    while !canvas.gate().is_pending().await {
        tokio::task::yield_now().await;
    }

    let (status, _) = call(&app, "POST", "/api/proposal/resolve", Some(json!({ "decision": "NO" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // GET 只查看，不推进状态
    let (status, view) = call(&app, "GET", "/api/proposal", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "proposed");
    let (_, view) = call(&app, "GET", "/api/proposal", None).await;
    assert_eq!(view["status"], "proposed");

    let (status, view) = call(&app, "POST", "/api/proposal/present", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "executing");
    assert_eq!(view["affordances"][1]["decision"], "YES");

    let (status, view) = call(&app, "POST", "/api/proposal/resolve", Some(json!({ "decision": "NO" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["status"], "resolved");

    let (status, body) = pending.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["decision"], "NO");
    assert_eq!(canvas.state().resources.len(), 1);

    let (status, _) = call(&app, "GET", "/api/proposal", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
