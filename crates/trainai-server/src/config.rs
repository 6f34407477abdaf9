//! Configuration for the Train.ai server
//!
//! Values come from built-in defaults, an optional file named by
//! `TRAINAI_CONFIG`, and `TRAINAI_*` environment variables, in that order.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};

/// Prefix of environment variables read into the configuration
pub const ENV_PREFIX: &str = "TRAINAI";

/// Environment variable naming an optional configuration file
pub const CONFIG_FILE_VAR: &str = "TRAINAI_CONFIG";

const LEGACY_URL_VAR: &str = "SUPABASE_URL";
const LEGACY_KEY_VAR: &str = "SUPABASE_SERVICE_KEY";

/// Flow store backend selected by the `store_url` scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// `memory://`
    Memory,
    /// `postgres://` or `postgresql://`
    Postgres,
    /// `http://` or `https://` hosted table
    Rest,
}

impl StoreBackend {
    pub fn from_url(url: &str) -> ServerResult<Self> {
        if url.starts_with("memory://") {
            Ok(StoreBackend::Memory)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreBackend::Postgres)
        } else if url.starts_with("http://") || url.starts_with("https://") {
            Ok(StoreBackend::Rest)
        } else {
            Err(ServerError::ConfigError(format!("Unsupported flow store URL: {}", url)))
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Flow store location; the scheme selects the backend
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Service key for the hosted table backend
    #[serde(default)]
    pub store_service_key: Option<String>,

    /// Maximum pooled connections for the PostgreSQL backend
    #[serde(default = "default_max_connections")]
    pub store_max_connections: u32,

    /// Create the flows table on startup (PostgreSQL backend)
    #[serde(default = "default_true")]
    pub store_run_migrations: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `text` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Path prefix the service is mounted under, used for links in the banner
    #[serde(default)]
    pub public_prefix: String,

    /// Answer unknown flow ids with HTTP 200 instead of 404, for older clients
    #[serde(default)]
    pub not_found_compat: bool,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_store_url() -> String {
    "memory://local".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            store_url: default_store_url(),
            store_service_key: None,
            store_max_connections: default_max_connections(),
            store_run_migrations: true,
            log_level: default_log_level(),
            log_format: default_log_format(),
            public_prefix: String::new(),
            not_found_compat: false,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment and optional config file
    pub fn load() -> ServerResult<Self> {
        Self::from_vars(env::vars().collect())
    }

    /// Load configuration from an explicit set of environment variables
    pub fn from_vars(vars: HashMap<String, String>) -> ServerResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = vars.get(CONFIG_FILE_VAR) {
            info!(%path, "Reading configuration file");
            builder = builder.add_source(File::with_name(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(vars.clone())),
        );

        let mut config: ServerConfig = builder.build()?.try_deserialize()?;

        // Older deployments configured the hosted table directly
        if config.store_url == default_store_url() {
            if let Some(url) = vars.get(LEGACY_URL_VAR) {
                warn!("Using {} for the flow store; prefer {}_STORE_URL", LEGACY_URL_VAR, ENV_PREFIX);
                config.store_url = url.clone();
            }
        }
        if config.store_service_key.is_none() {
            config.store_service_key = vars.get(LEGACY_KEY_VAR).cloned();
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> ServerResult<()> {
        let backend = self.store_backend()?;

        if backend == StoreBackend::Rest
            && self.store_service_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(ServerError::ConfigError(
                "A service key is required for a hosted flow store".to_string(),
            ));
        }

        if !matches!(self.log_format.as_str(), "text" | "json") {
            return Err(ServerError::ConfigError(format!(
                "Unsupported log format: {}",
                self.log_format
            )));
        }

        if backend == StoreBackend::Memory {
            warn!("Flows are kept in memory and will be lost on restart");
        }

        Ok(())
    }

    /// Backend named by `store_url`
    pub fn store_backend(&self) -> ServerResult<StoreBackend> {
        StoreBackend::from_url(&self.store_url)
    }

    /// Public path for `route`, honouring the deployment prefix
    pub fn public_path(&self, route: &str) -> String {
        format!("{}{}", self.public_prefix.trim_end_matches('/'), route)
    }
}
