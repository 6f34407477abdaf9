//!
//! Train.ai Server - HTTP API for recording UI automation flows
//!
//! This module exports all the components of the Train.ai server.

use std::sync::Arc;

use trainai_core::{FlowRepository, MockDiscoveryService};
use trainai_state_inmemory::InMemoryFlowRepository;
use trainai_state_postgres::{PostgresConfig, PostgresConnection, PostgresFlowRepository};
use trainai_state_rest::{RestFlowRepository, RestTableConfig};

/// API module
pub mod api;

/// Server module
pub mod server;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

// Re-export key types
pub use config::{ServerConfig, StoreBackend};
pub use error::{ServerError, ServerResult};
pub use server::{PersistFlowResponse, ToolServer};

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Initialize logging
    init_logging(&config);

    // Create dependencies
    let flow_store = create_flow_store(&config).await?;
    let discovery = Arc::new(MockDiscoveryService::new());

    // Create and run server
    let server = ToolServer::new(config, flow_store, discovery);
    server.run().await
}

/// Initialize logging
pub fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "json" {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt().with_env_filter(filter).with_target(true).init();
    }
}

/// Create the flow store named by `store_url`
pub async fn create_flow_store(config: &ServerConfig) -> ServerResult<Arc<dyn FlowRepository>> {
    match config.store_backend()? {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory flow store");
            Ok(Arc::new(InMemoryFlowRepository::new()))
        }
        StoreBackend::Postgres => {
            tracing::info!("Using PostgreSQL flow store");
            let pg_config = PostgresConfig {
                connection_string: config.store_url.clone(),
                max_connections: config.store_max_connections,
                run_migrations: config.store_run_migrations,
                ..Default::default()
            };
            let connection = PostgresConnection::new(&pg_config).await?;
            Ok(Arc::new(PostgresFlowRepository::new(connection)))
        }
        StoreBackend::Rest => {
            tracing::info!("Using hosted flow table at {}", config.store_url);
            let service_key = config.store_service_key.clone().ok_or_else(|| {
                ServerError::ConfigError("A service key is required for a hosted flow store".to_string())
            })?;
            let store = RestFlowRepository::new(RestTableConfig::new(config.store_url.clone(), service_key))?;
            Ok(Arc::new(store))
        }
    }
}
