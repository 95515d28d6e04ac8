use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wfm_core::PortalConfig;
use wfm_portal::{AppState, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = PortalConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config));
    state.uploads.ensure_dir().await?;

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("wfm-portal listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
