//! Runs the entries service.
//!
//! Reads `.env`, then the config file named by `LUBAN_CONFIG` (default
//! `luban.json`). Log filtering follows `RUST_LOG`.

use std::path::PathBuf;

use luban::config::DEFAULT_CONFIG_FILENAME;
use luban::{Server, ServiceConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var("LUBAN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILENAME));
    let config = ServiceConfig::load(&config_path)?;

    let mut server = Server::new(config).await?;
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    server.shutdown()?;
    Ok(())
}
