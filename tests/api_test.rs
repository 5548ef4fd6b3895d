mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{many_payments_fixture, yoga_fixture};
use serde_json::{json, Value};
use tower::ServiceExt;
use trainhub::{
    api,
    config::Settings,
    notify::Notifier,
    service::ServiceContext,
    store::{DocumentStore, MemoryStore},
};

async fn app(data: Value) -> anyhow::Result<(Router, Arc<ServiceContext>)> {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::with_data(data));
    let settings = Settings::default();
    let ctx = Arc::new(ServiceContext::new(store, Notifier::new(), settings.pagination.clone()));
    ctx.start().await;
    ctx.payments.wait_loaded().await;
    ctx.classes.wait_loaded().await;
    ctx.participants.wait_loaded().await;
    Ok((api::create_app(ctx.clone(), Arc::new(settings)), ctx))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(serde_json::to_vec(&body)?),
            None => Body::empty(),
        })?;

    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

#[tokio::test]
async fn test_health() -> anyhow::Result<()> {
    let (app, _ctx) = app(yoga_fixture()).await?;
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loaded"]["payments"], json!(true));
    Ok(())
}

#[tokio::test]
async fn test_payment_list_is_paginated_with_details() -> anyhow::Result<()> {
    let (app, _ctx) = app(many_payments_fixture(17)).await?;

    let (status, body) = send(&app, "GET", "/api/payments?page=3", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], json!(3));
    assert_eq!(body["total_pages"], json!(3));
    assert_eq!(body["total"], json!(17));
    assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    assert_eq!(body["rows"][0]["detail"]["participant"]["name"], json!("Participant 16"));
    assert_eq!(body["rows"][0]["detail"]["class"]["name"], json!("Yoga"));
    assert_eq!(body["links"][2], json!({"kind": "page", "number": 3, "active": true}));

    // Out-of-range pages stay on the first page
    let (_, body) = send(&app, "GET", "/api/payments?page=9", None).await?;
    assert_eq!(body["page"], json!(1));

    let (_, body) = send(&app, "GET", "/api/payments?verified=true", None).await?;
    assert_eq!(body["total"], json!(9));
    Ok(())
}

#[tokio::test]
async fn test_payment_detail_endpoint() -> anyhow::Result<()> {
    let (app, _ctx) = app(yoga_fixture()).await?;

    let (status, body) = send(&app, "GET", "/api/payments/p1/detail", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["participant"]["name"], json!("Alice"));
    assert_eq!(body["class"]["name"], json!("Yoga"));

    let (status, _) = send(&app, "GET", "/api/payments/nope/detail", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_verify_payment_accepts_participant() -> anyhow::Result<()> {
    let (app, ctx) = app(yoga_fixture()).await?;

    let (status, body) = send(&app, "PUT", "/api/payments/p1", Some(json!({
        "participantId": "u1",
        "filePath": "https://storage.example.com/receipts/alice.jpg",
        "verified": true,
        "verificationStatus": "verified"
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verificationStatus"], json!("verified"));

    assert_eq!(ctx.store.get("participants/u1/status").await?, Some(json!("accepted")));
    Ok(())
}

#[tokio::test]
async fn test_create_and_delete_payment() -> anyhow::Result<()> {
    let (app, ctx) = app(yoga_fixture()).await?;

    let (status, created) = send(&app, "POST", "/api/payments", Some(json!({
        "participantId": "u1",
        "filePath": "receipts/second.jpg"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, "POST", "/api/payments", Some(json!({
        "participantId": "",
        "filePath": "receipts/x.jpg"
    }))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    send(&app, "GET", &format!("/api/payments/{}/detail", id), None).await?;
    let (status, _) = send(&app, "DELETE", &format!("/api/payments/{}", id), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!ctx.detail_cache.contains(&id));

    let (status, _) = send(&app, "GET", &format!("/api/payments/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_class_endpoints() -> anyhow::Result<()> {
    let (app, ctx) = app(yoga_fixture()).await?;

    let (status, created) = send(&app, "POST", "/api/classes", Some(json!({
        "name": "Web Development",
        "description": "HTML, CSS and a little JavaScript",
        "category": "Programming",
        "type": "private",
        "startDate": 1_700_000_000_000i64,
        "endDate": 1_705_000_000_000i64,
        "price": 500000,
        "status": "upcoming"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], json!("private"));

    let mut changes = ctx.classes.changes();
    while ctx.classes.items().await.len() < 2 {
        changes.changed().await?;
    }

    let (_, body) = send(&app, "GET", "/api/classes?q=health", None).await?;
    assert_eq!(body["total"], json!(1));
    let (_, body) = send(&app, "GET", "/api/classes?status=upcoming", None).await?;
    assert_eq!(body["classes"][0]["name"], json!("Web Development"));
    let (_, body) = send(&app, "GET", "/api/classes?status=all", None).await?;
    assert_eq!(body["total"], json!(2));

    let (status, _) = send(&app, "GET", "/api/classes?status=bogus", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_participant_endpoints() -> anyhow::Result<()> {
    let (app, _ctx) = app(yoga_fixture()).await?;

    let (_, body) = send(&app, "GET", "/api/participants?class_id=c1&q=alice", None).await?;
    assert_eq!(body["total"], json!(1));

    let (status, _) = send(&app, "PUT", "/api/participants/u1/status", Some(json!({"status": "rejected"}))).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/api/participants/u1", None).await?;
    assert_eq!(body["status"], json!("rejected"));

    let (status, _) = send(&app, "PUT", "/api/participants/ghost/status", Some(json!({"status": "accepted"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
