//! Flow capture API
//!
//! Handlers for persisting, listing and fetching flows.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use trainai_core::{FlowId, FlowInput};

use crate::api::errors::{api_error_response, not_found_response};
use crate::error::ServerError;
use crate::server::ToolServer;

/// Handler for persisting a flow
pub async fn persist_flow_handler(
    State(server): State<Arc<ToolServer>>,
    payload: Result<Json<FlowInput>, JsonRejection>,
) -> Response {
    let Json(flow) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            let err = ServerError::from(rejection);
            warn!(%err, "Rejected flow payload");
            return api_error_response(&err);
        }
    };

    info!(app = %flow.app, task = %flow.task, "Persisting flow");

    match server.persist_flow(flow).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            error!(?err, "Failed to persist flow");
            api_error_response(&err)
        }
    }
}

/// Handler for listing flows
pub async fn list_flows_handler(State(server): State<Arc<ToolServer>>) -> Response {
    info!("Listing all flows");

    match server.list_flows().await {
        Ok(flows) => (StatusCode::OK, Json(flows)).into_response(),
        Err(err) => {
            error!(?err, "Failed to list flows");
            api_error_response(&err)
        }
    }
}

/// Handler for getting a flow by ID
pub async fn get_flow_handler(
    State(server): State<Arc<ToolServer>>,
    Path(flow_id): Path<String>,
) -> Response {
    info!(%flow_id, "Getting flow");

    match server.get_flow(&FlowId(flow_id.clone())).await {
        Ok(flow) => (StatusCode::OK, Json(flow)).into_response(),
        Err(err) if err.is_not_found() => {
            let status = if server.config.not_found_compat {
                StatusCode::OK
            } else {
                StatusCode::NOT_FOUND
            };
            not_found_response(&err, status)
        }
        Err(err) => {
            error!(?err, %flow_id, "Failed to get flow");
            api_error_response(&err)
        }
    }
}
