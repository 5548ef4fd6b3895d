pub mod handlers;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put, delete},
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::Settings,
    service::ServiceContext,
};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes())

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/payments", payment_routes())
        .nest("/classes", class_routes())
        .nest("/participants", participant_routes())
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::payments::list))
        .route("/", post(handlers::payments::create))
        .route("/:id", get(handlers::payments::get))
        .route("/:id", put(handlers::payments::update))
        .route("/:id", delete(handlers::payments::delete))
        .route("/:id/detail", get(handlers::payments::detail))
}

fn class_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::classes::list))
        .route("/", post(handlers::classes::create))
        .route("/:id", get(handlers::classes::get))
        .route("/:id", put(handlers::classes::update))
        .route("/:id", delete(handlers::classes::delete))
}

fn participant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::participants::list))
        .route("/:id", get(handlers::participants::get))
        .route("/:id/status", put(handlers::participants::set_status))
}
