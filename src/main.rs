use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trainhub::{
    api,
    config::Settings,
    notify::Notifier,
    service::ServiceContext,
    store,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trainhub=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Trainhub admin on {}:{}", settings.server.host, settings.server.port);

    // Initialize the document store; failures leave a disconnected store
    let notifier = Notifier::new();
    let store = store::open(&settings.store, &notifier);

    // Create service context and start live subscriptions
    let service_context = Arc::new(ServiceContext::new(
        store,
        notifier,
        settings.pagination.clone(),
    ));
    service_context.start().await;

    let app = api::create_app(service_context.clone(), Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    service_context.stop();

    Ok(())
}
