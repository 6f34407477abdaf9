//! Main Train.ai server implementation
//!
//! This module contains the ToolServer, which owns the flow store and the
//! discovery service and hands them to request handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use trainai_core::{
    CrawlResult, DiscoveryService, DocChunk, Evaluation, Flow, FlowId, FlowInput, FlowRepository,
    FlowSummary,
};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Response for a persisted flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistFlowResponse {
    pub status: String,
    pub id: FlowId,
    pub task: String,
}

/// Main server implementation
#[derive(Clone)]
pub struct ToolServer {
    /// Configuration
    pub config: ServerConfig,

    /// Flow store
    flow_store: Arc<dyn FlowRepository>,

    /// Crawl, search and evaluation provider
    discovery: Arc<dyn DiscoveryService>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl fmt::Debug for ToolServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolServer")
            .field("config", &self.config)
            .field("flow_store", &self.flow_store.backend_name())
            .finish()
    }
}

impl ToolServer {
    /// Create a new ToolServer
    pub fn new(
        config: ServerConfig,
        flow_store: Arc<dyn FlowRepository>,
        discovery: Arc<dyn DiscoveryService>,
    ) -> Self {
        Self {
            config,
            flow_store,
            discovery,
        }
    }

    /// Run the server until a shutdown signal arrives
    pub async fn run(self) -> ServerResult<()> {
        info!("Starting Train.ai tool server");

        let address = format!("{}:{}", self.config.bind_address, self.config.port);
        let app = crate::api::build_router(Arc::new(self));

        let listener = TcpListener::bind(&address).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// Validate and store a flow
    pub async fn persist_flow(&self, mut flow: FlowInput) -> ServerResult<PersistFlowResponse> {
        flow.validate()?;
        flow.dedup_roles();

        let task = flow.task.clone();
        let id = self.flow_store.persist(flow).await?;
        info!(%id, %task, "Persisted flow");

        Ok(PersistFlowResponse {
            status: "ok".to_string(),
            id,
            task,
        })
    }

    /// List stored flows, most recent first
    pub async fn list_flows(&self) -> ServerResult<Vec<FlowSummary>> {
        let flows = self.flow_store.list().await?;
        debug!(count = flows.len(), "Listed flows");
        Ok(flows)
    }

    /// Get a stored flow by ID
    pub async fn get_flow(&self, id: &FlowId) -> ServerResult<Flow> {
        Ok(self.flow_store.get(id).await?)
    }

    pub fn crawl(&self, url: &str, depth: i64) -> CrawlResult {
        self.discovery.crawl(url, depth)
    }

    pub fn doc_search(&self, query: &str) -> Vec<DocChunk> {
        self.discovery.doc_search(query)
    }

    pub fn evaluate(&self, selector: &str, route: Option<&str>) -> Evaluation {
        self.discovery.evaluate(selector, route)
    }

    /// Backend name of the flow store
    pub fn flow_store_backend(&self) -> &'static str {
        self.flow_store.backend_name()
    }

    /// Check the flow store
    pub async fn check_flow_store_health(&self) -> ServerResult<bool> {
        Ok(self.flow_store.health_check().await?)
    }
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
