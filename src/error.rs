// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::services::ProjectError;

/// HTTP API error with client-safe messages. Resource handler failures are
/// surfaced uniformly as a short static message in an `{"error": ...}` body.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request (resource failures, including ownership mismatches)
    BadRequest(String),

    // 401 Unauthorized (auth collaborator rejections)
    Unauthorized(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.message() })
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Every service failure maps to a 400 with the operation's fixed message.
// The underlying store error is logged here, never sent to the client.
impl From<ProjectError> for ApiError {
    fn from(err: ProjectError) -> Self {
        use std::error::Error as _;

        if let Some(source) = err.source() {
            tracing::error!("store operation failed: {}", source);
        }
        ApiError::bad_request(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProjectError;

    #[test]
    fn ownership_failure_maps_to_bad_request() {
        let api_error = ApiError::from(ProjectError::InvalidUser);
        assert_eq!(api_error.status_code(), 400);
        assert_eq!(api_error.message(), "Invalid user ID");
        assert_eq!(api_error.to_json(), json!({ "error": "Invalid user ID" }));
    }
}
