//! Health check and service banner endpoints

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

use crate::server::ToolServer;

/// Service banner with links to the main endpoints
pub async fn home(State(server): State<Arc<ToolServer>>) -> impl IntoResponse {
    let config = &server.config;

    Json(json!({
        "message": "Train.ai tool API running",
        "flows": config.public_path("/flows"),
        "persist_flow": config.public_path("/persist_flow"),
        "health": config.public_path("/health"),
    }))
}

/// Health check handler
///
/// Reports the flow store as a dependency and answers 503 unless it is up.
pub async fn health_check(State(server): State<Arc<ToolServer>>) -> impl IntoResponse {
    info!("Health check requested");

    let flow_store_status = match server.check_flow_store_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(err) => {
            warn!(%err, "Flow store health check failed");
            "DOWN"
        }
    };

    let is_up = flow_store_status == "UP";
    let overall_status = if is_up { "UP" } else { "DOWN" };

    let response = json!({
        "status": overall_status,
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "flowStore": {
                "status": flow_store_status,
                "backend": server.flow_store_backend(),
            }
        },
    });

    let status = if is_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
