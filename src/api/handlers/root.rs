use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Trainhub Admin API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Administration of classes, participants and payment verification",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "payments": "/api/payments",
            "classes": "/api/classes",
            "participants": "/api/participants"
        }
    }))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let ctx = &state.service_context;
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "loaded": {
            "payments": ctx.payments.loaded().await,
            "classes": ctx.classes.loaded().await,
            "participants": ctx.participants.loaded().await,
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
