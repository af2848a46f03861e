//! Websocket relay binary.

use sync_server::config::Config;
use sync_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    info!(
        addr = %config.socket_addr_string(),
        max_screen_instances = config.max_screen_instances,
        max_connections = config.max_connections,
        origins = ?config.allowed_origins,
        "Starting sync-relay"
    );

    server::run(config).await
}
