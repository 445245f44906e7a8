use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sandbox_core::error::{self, ApiError};

use crate::fixtures::FixtureError;

/// Internal error type that converts to structured API responses
#[derive(Debug)]
pub enum AppError {
    /// Required fixture file is absent for the active scenario (404)
    FixtureNotFound { path: String },
    /// No tool is served under the requested name (404)
    UnknownTool { path: String },
    /// Tool request body could not be buffered within the size limit (413)
    PayloadTooLarge { limit: usize },
    /// Fixture exists but is unreadable or has the wrong shape (500)
    InvalidFixture { path: String, reason: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::now_v7().to_string();

        let (status, api_error) = match self {
            AppError::FixtureNotFound { path } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("Fixture not found: {path}"),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: Some(
                        "The active scenario has no data for this tool. \
                         Check the scenario name passed to /set_scenario."
                            .to_string(),
                    ),
                },
            ),
            AppError::UnknownTool { path } => (
                StatusCode::NOT_FOUND,
                ApiError {
                    error: error::codes::NOT_FOUND.to_string(),
                    message: format!("No tool is served at {path}"),
                    field: None,
                    received: Some(serde_json::Value::String(path)),
                    request_id,
                    docs_hint: Some("GET /tools lists the available tools.".to_string()),
                },
            ),
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ApiError {
                    error: error::codes::PAYLOAD_TOO_LARGE.to_string(),
                    message: format!("Request body exceeds {limit} bytes"),
                    field: None,
                    received: None,
                    request_id,
                    docs_hint: Some("Send tool arguments as a small JSON object.".to_string()),
                },
            ),
            AppError::InvalidFixture { path, reason } => {
                tracing::error!(path = %path, reason = %reason, "Invalid fixture");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError {
                        error: error::codes::INTERNAL_ERROR.to_string(),
                        message: format!("Fixture {path} could not be loaded"),
                        field: None,
                        received: None,
                        request_id,
                        docs_hint: None,
                    },
                )
            }
        };

        (status, Json(api_error)).into_response()
    }
}

impl From<FixtureError> for AppError {
    fn from(err: FixtureError) -> Self {
        match err {
            FixtureError::NotFound { path } => AppError::FixtureNotFound {
                path: path.display().to_string(),
            },
            FixtureError::Io { ref path, .. } | FixtureError::Parse { ref path, .. } => {
                AppError::InvalidFixture {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
