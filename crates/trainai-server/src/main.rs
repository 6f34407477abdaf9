use anyhow::{Context, Result};
use trainai_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment variables and optional config file
    let config = ServerConfig::load()
        .context("Failed to load configuration")?;

    // Run the server using the library's run function
    trainai_server::run(config).await
        .context("Server error")?;

    Ok(())
}
