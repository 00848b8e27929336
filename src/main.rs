// src/main.rs
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use products_relay::{
    config,
    metrics::{start_metrics_server, MetricsRegistry},
    relay::ProductsRelay,
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("products_relay=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration; only the implicit default path may be absent
    let config = match std::env::args().nth(1) {
        Some(path) => {
            info!("Loading configuration from: {}", path);
            config::load_config(&path).await?
        }
        None => {
            info!("Loading configuration from: {}", config::DEFAULT_CONFIG_PATH);
            config::load_config_or_default(config::DEFAULT_CONFIG_PATH).await?
        }
    };

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let metrics = metrics_registry.collector();

    let relay = Arc::new(ProductsRelay::new(&config.upstream, metrics)?);
    info!(
        upstream = %relay.upstream(),
        timeout_secs = config.upstream.timeout_secs,
        "Products relay ready"
    );

    if config.metrics.enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone()).await?;
    }

    let handler = RequestHandler::new(relay, &config.server.mount_path);

    info!(
        "Serving products on {}{}",
        config.server.bind_address, config.server.mount_path
    );

    if let Err(e) = ServerBuilder::new(config.server.bind_address)
        .with_handler(handler)
        .with_shutdown(shutdown_signal())
        .serve()
        .await
    {
        error!("Server error: {:#}", e);
        return Err(e);
    }

    info!("Shutdown complete");
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
