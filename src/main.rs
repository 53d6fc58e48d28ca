use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use hotel_booking_service::{serve, Config, SqlReservationStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "BOOKING_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config()?;

    let store = SqlReservationStore::connect(&config.database.url)
        .await
        .with_context(|| format!("failed to open database {}", config.database.url))?;
    info!(url = %config.database.url, "Connected to database");

    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Booking API listening");

    serve(listener, Arc::new(store)).await?;
    Ok(())
}

fn load_config() -> anyhow::Result<Config> {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!(%path, "Config file not found, using defaults");
        return Ok(Config::default());
    }
    Config::load(&path).with_context(|| format!("failed to load config from {}", path))
}
