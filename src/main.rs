use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use webhook_events::config::Config;
use webhook_events::server::{AppState, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webhook_events=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    let store = config
        .store
        .build()
        .with_context(|| format!("failed to open event store ({})", config.store))?;
    tracing::info!(store = %config.store, "Event store ready");

    let app = build_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!("listening on {}", config.listen_addr);
    tracing::info!("  POST /webhook/receiver - GitHub webhook deliveries");
    tracing::info!("  GET  /webhook/events   - stored events, newest first");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
