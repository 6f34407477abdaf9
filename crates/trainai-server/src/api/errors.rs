//! Error handling for the Train.ai server API
//!
//! This module contains standardized error handling for the API.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ServerError;

/// Status, error code and short message for a server error
fn classify(err: &ServerError) -> (StatusCode, &'static str, String) {
    match err {
        ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "ERR_NOT_FOUND", "not found".to_string()),
        ServerError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "ERR_VALIDATION_ERROR", msg.clone()),
        ServerError::StorageUnavailable(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "ERR_STORAGE_UNAVAILABLE",
            msg.clone(),
        ),
        ServerError::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "ERR_CONFIG_ERROR", msg.clone()),
        ServerError::InternalError(msg) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "ERR_INTERNAL_SERVER_ERROR",
            msg.clone(),
        ),
    }
}

/// Standard error envelope for a server error
pub fn api_error_response(err: &ServerError) -> Response {
    let (status, error_code, message) = classify(err);
    error_body(status, error_code, &message, &err.to_string())
}

/// Not-found envelope with a caller-chosen status, for legacy clients
pub fn not_found_response(err: &ServerError, status: StatusCode) -> Response {
    let (_, error_code, message) = classify(err);
    error_body(status, error_code, &message, &err.to_string())
}

fn error_body(status: StatusCode, error_code: &str, error: &str, detail: &str) -> Response {
    let body = Json(json!({
        "error": error,
        "errorDetails": {
            "errorCode": error_code,
            "errorMessage": detail,
        }
    }));

    (status, body).into_response()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        api_error_response(&self)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(rejection: QueryRejection) -> Self {
        ServerError::ValidationError(rejection.body_text())
    }
}
