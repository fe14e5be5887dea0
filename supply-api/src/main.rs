use std::net::SocketAddr;
use std::sync::Arc;

use supply_api::{app, AppState};
use supply_core::{spawn_observer, EventLogObserver};
use supply_engine::SupplyChainEngine;
use supply_store::Config;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "supply_api=debug,supply_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting supply chain engine on port {}", config.server.port);

    let engine = SupplyChainEngine::builder(config.clone()).build()?;
    engine.start();

    let shutdown = CancellationToken::new();
    let observer = spawn_observer(
        &engine.context().bus,
        Arc::new(EventLogObserver),
        shutdown.clone(),
    );

    let app = app(AppState::new(engine.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    engine.shutdown();
    shutdown.cancel();
    if let Err(e) = observer.await {
        tracing::warn!("Event log observer ended abnormally: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
