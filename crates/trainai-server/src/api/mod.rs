//! API module for the Train.ai server
//!
//! This module contains the API routes and handlers.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod discovery;
pub mod errors;
pub mod flows;
pub mod health;

use crate::server::ToolServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<ToolServer>) -> Router {
    Router::new()
        .route("/", get(health::home))

        // Discovery (crawl, docs, selector checks)
        .route("/crawl", post(discovery::crawl_handler))
        .route("/doc_search", get(discovery::doc_search_handler))
        .route("/evaluate", get(discovery::evaluate_handler))

        // Flow capture
        .route("/persist_flow", post(flows::persist_flow_handler))
        .route("/flows", get(flows::list_flows_handler))
        .route("/flows/:flow_id", get(flows::get_flow_handler))

        // Health check
        .route("/health", get(health::health_check))

        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

pub use errors::api_error_response;
