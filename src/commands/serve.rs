use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::config::AppConfig;
use crate::web::{self, AppState};

pub fn run(args: ServeArgs) -> Result<()> {
    let config = AppConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration {}", args.config.display()))?;
    let listen = args.listen.unwrap_or(config.listen);

    if !config.database.exists() {
        warn!(path = %config.database.display(), "database file missing; searches will fail until it exists");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    runtime.block_on(serve(config, listen))
}

async fn serve(config: AppConfig, listen: SocketAddr) -> Result<()> {
    let app = web::router(AppState::from_config(&config));

    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;

    info!(
        listen = %listen,
        database = %config.database.display(),
        archive_dir = %config.archive_dir.display(),
        query_timeout_ms = config.query_timeout.as_millis() as u64,
        "serving shard firsts search"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server stopped with an error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
