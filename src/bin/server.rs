//! Development backend for Query Copilot.
//! Serves the mock generator on `/api/generate-sql` and `/api/validate-sql`.

use anyhow::Result;
use query_copilot::{server, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting Query Copilot dev backend on http://{}", config.bind_addr);
    info!("Point clients at: http://{}/api", config.bind_addr);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    server::serve(listener).await?;
    Ok(())
}
