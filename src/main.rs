use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use agri_copilot::config::Config;
use agri_copilot::engine::AdvisoryEngine;
use agri_copilot::handlers;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load();
    tracing::info!(
        name = %config.server.name,
        version = %config.server.version,
        "starting advisory service"
    );

    let engine = Arc::new(AdvisoryEngine::new(&config).context("failed to build engine")?);
    let router = handlers::router(engine);

    let bind: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind))?;

    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "listening");

    axum::serve(listener, router).await?;
    Ok(())
}
