//! Crawl, document search and selector evaluation endpoints

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use trainai_core::DocChunk;

use crate::api::errors::api_error_response;
use crate::error::ServerError;
use crate::server::ToolServer;

/// Query parameters for a crawl
#[derive(Debug, Serialize, Deserialize)]
pub struct CrawlQuery {
    pub url: String,
    #[serde(default = "default_depth")]
    pub depth: i64,
}

fn default_depth() -> i64 {
    1
}

/// Query parameters for a document search
#[derive(Debug, Serialize, Deserialize)]
pub struct DocSearchQuery {
    pub query: String,
}

/// Response for a document search
#[derive(Debug, Serialize, Deserialize)]
pub struct DocSearchResponse {
    pub results: Vec<DocChunk>,
}

/// Query parameters for a selector evaluation
#[derive(Debug, Serialize, Deserialize)]
pub struct EvaluateQuery {
    pub selector: String,
    #[serde(default)]
    pub route: Option<String>,
}

fn rejected(rejection: QueryRejection) -> Response {
    let err = ServerError::from(rejection);
    warn!(%err, "Rejected query parameters");
    api_error_response(&err)
}

/// Handler for crawling a target application
pub async fn crawl_handler(
    State(server): State<Arc<ToolServer>>,
    params: Result<Query<CrawlQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejected(rejection),
    };

    info!(url = %params.url, depth = params.depth, "Crawling");
    (StatusCode::OK, Json(server.crawl(&params.url, params.depth))).into_response()
}

/// Handler for searching reference documentation
pub async fn doc_search_handler(
    State(server): State<Arc<ToolServer>>,
    params: Result<Query<DocSearchQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejected(rejection),
    };

    info!(query = %params.query, "Searching documents");
    let results = server.doc_search(&params.query);
    (StatusCode::OK, Json(DocSearchResponse { results })).into_response()
}

/// Handler for evaluating a selector
pub async fn evaluate_handler(
    State(server): State<Arc<ToolServer>>,
    params: Result<Query<EvaluateQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return rejected(rejection),
    };

    info!(selector = %params.selector, route = ?params.route, "Evaluating selector");
    let evaluation = server.evaluate(&params.selector, params.route.as_deref());
    (StatusCode::OK, Json(evaluation)).into_response()
}
