//! Prediwin Backend Web Server
//!
//! HTTP surface for the prediction workflow: placing and reading bets,
//! elimination status, re-entry, participation history, and referrals.

use anyhow::Result;
use prediwin_backend::api::{create_app, AppState};
use prediwin_backend::Config;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging. Override with RUST_LOG, e.g. RUST_LOG=debug
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let listen_addr = config.listen_addr.clone();

    info!("Initializing application state...");
    let state = AppState::new(config).await?;

    let app = create_app(state);

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Prediwin backend listening on {}", listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
