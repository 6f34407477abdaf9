//! Hosted table implementation of FlowRepository
//!
//! Talks to a PostgREST-compatible API (as exposed by hosted Postgres
//! providers) at `{base_url}/rest/v1/{table}`, authenticating with a service key.
//! The table is expected to have the columns of a flow plus a server-side
//! `created_at` default.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};

use trainai_core::{CoreError, Flow, FlowId, FlowInput, FlowRepository, FlowSummary};

/// Inserts retried with a fresh id after a primary key conflict
const MAX_INSERT_ATTEMPTS: usize = 3;

/// Connection settings for the hosted table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestTableConfig {
    /// Project URL, e.g. `https://project.example.co`
    pub base_url: String,

    /// Service key, sent as `apikey` and bearer token
    pub service_key: String,

    /// Table name
    pub table: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RestTableConfig {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            table: "flows".to_string(),
            timeout_secs: 30,
        }
    }
}

/// FlowRepository over a PostgREST-style HTTP table
#[derive(Debug, Clone)]
pub struct RestFlowRepository {
    config: RestTableConfig,
    client: Client,
}

impl RestFlowRepository {
    /// Create a new RestFlowRepository
    pub fn new(config: RestTableConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CoreError::ConfigurationError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Endpoint of the flows table
    fn table_endpoint(&self) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.table
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .header("Authorization", format!("Bearer {}", self.config.service_key))
    }

    async fn send(&self, request: RequestBuilder, context: &str) -> Result<reqwest::Response, CoreError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| CoreError::StorageUnavailable(format!("{}: {}", context, e)))
    }

    async fn failure(response: reqwest::Response, context: &str) -> CoreError {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        error!(%status, "{}: {}", context, error_text);
        CoreError::StorageUnavailable(format!("{}: Status {}, Error: {}", context, status, error_text))
    }
}

#[async_trait]
impl FlowRepository for RestFlowRepository {
    async fn persist(&self, flow: FlowInput) -> Result<FlowId, CoreError> {
        let mut record = Flow::new(FlowId::generate(), flow);

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            debug!(id = %record.id, attempt, "Inserting flow");

            let request = self
                .client
                .post(self.table_endpoint())
                .header("Prefer", "return=minimal")
                .json(&record);
            let response = self.send(request, "Failed to store flow").await?;

            match response.status() {
                status if status.is_success() => return Ok(record.id),
                StatusCode::CONFLICT => {
                    warn!(id = %record.id, "Flow id already taken, retrying with a new one");
                    record.id = FlowId::generate();
                }
                _ => return Err(Self::failure(response, "Failed to store flow").await),
            }
        }

        Err(CoreError::StorageUnavailable(format!(
            "Failed to store flow: id conflict after {} attempts",
            MAX_INSERT_ATTEMPTS
        )))
    }

    async fn list(&self) -> Result<Vec<FlowSummary>, CoreError> {
        let request = self
            .client
            .get(self.table_endpoint())
            .query(&[("select", "id,app,task,confidence"), ("order", "created_at.desc")]);
        let response = self.send(request, "Failed to list flows").await?;

        if !response.status().is_success() {
            return Err(Self::failure(response, "Failed to list flows").await);
        }

        response
            .json::<Vec<FlowSummary>>()
            .await
            .map_err(|e| CoreError::SerializationError(format!("Invalid flow listing: {}", e)))
    }

    async fn find_by_id(&self, id: &FlowId) -> Result<Option<Flow>, CoreError> {
        let filter = format!("eq.{}", id.0);
        let request = self
            .client
            .get(self.table_endpoint())
            .query(&[("select", "*"), ("id", filter.as_str())]);
        let response = self.send(request, "Failed to load flow").await?;

        if !response.status().is_success() {
            return Err(Self::failure(response, "Failed to load flow").await);
        }

        let mut rows = response
            .json::<Vec<Flow>>()
            .await
            .map_err(|e| CoreError::SerializationError(format!("Invalid flow record: {}", e)))?;

        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    fn backend_name(&self) -> &'static str {
        "rest"
    }

    async fn health_check(&self) -> Result<bool, CoreError> {
        let request = self
            .client
            .get(self.table_endpoint())
            .query(&[("select", "id"), ("limit", "1")]);
        let response = self.send(request, "Health check failed").await?;

        if !response.status().is_success() {
            return Err(Self::failure(response, "Health check failed").await);
        }
        Ok(true)
    }
}
