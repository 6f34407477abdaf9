//! Repository traits for flow storage
//!
//! Store backends (in-memory, PostgreSQL, hosted REST table) implement
//! [`FlowRepository`] so the HTTP layer can swap them by configuration.

use async_trait::async_trait;

use super::flow::{Flow, FlowId, FlowInput, FlowSummary};
use crate::CoreError;

/// Persistence contract for flows
#[async_trait]
pub trait FlowRepository: Send + Sync {
    /// Store a new flow under a freshly generated identifier and return it
    async fn persist(&self, flow: FlowInput) -> Result<FlowId, CoreError>;

    /// Summaries of every stored flow, most recent first
    async fn list(&self) -> Result<Vec<FlowSummary>, CoreError>;

    /// Find a flow by ID
    async fn find_by_id(&self, id: &FlowId) -> Result<Option<Flow>, CoreError>;

    /// Get a flow by ID, failing with `FlowNotFound` when it is absent
    async fn get(&self, id: &FlowId) -> Result<Flow, CoreError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::FlowNotFound(id.0.clone()))
    }

    /// Short name of the backend, reported by health checks
    fn backend_name(&self) -> &'static str;

    /// Health check
    async fn health_check(&self) -> Result<bool, CoreError> {
        Ok(true)
    }
}
