use clap::Parser;
use tracing_subscriber::EnvFilter;
use zodiac::{DEFAULT_LOG_FILTER, ServerConfig, ZodiacError, ZodiacServer};

#[tokio::main]
async fn main() -> Result<(), ZodiacError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .init();

    let config = ServerConfig::parse();

    let server = ZodiacServer::builder().config(&config).build().await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "zodiac listening");
    }
    server.run().await
}
