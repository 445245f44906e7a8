//! Tool argument extraction.
//!
//! Tool handlers never reject a request because of its body. Whatever the
//! agent sent is turned into a JSON value: empty bodies become `{}`, and
//! bodies that are not JSON become `{"_raw": "<text>"}` so the literal input
//! survives into the logs.

use std::convert::Infallible;

use axum::extract::{FromRequest, Request};
use serde_json::{Value, json};

/// Upper bound on a buffered tool request body.
pub const MAX_TOOL_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Body parsed by the request-logging layer, stored in request extensions so
/// the handler sees exactly what was logged.
#[derive(Debug, Clone)]
pub struct ParsedBody(pub Option<Value>);

/// Parse a raw tool request body.
///
/// Returns `None` for an empty body, the parsed value for valid JSON, and a
/// `{"_raw": ...}` capture (lossy UTF-8) for anything else.
pub fn parse_tool_body(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(json!({ "_raw": String::from_utf8_lossy(bytes) })),
    }
}

/// Tool arguments as a JSON value. Never rejects.
#[derive(Debug)]
pub struct ToolArgs(pub Value);

impl<S> FromRequest<S> for ToolArgs
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ParsedBody(body)) = req.extensions().get::<ParsedBody>() {
            return Ok(ToolArgs(body.clone().unwrap_or_else(|| json!({}))));
        }
        let bytes = axum::body::to_bytes(req.into_body(), MAX_TOOL_BODY_BYTES)
            .await
            .unwrap_or_default();
        Ok(ToolArgs(parse_tool_body(&bytes).unwrap_or_else(|| json!({}))))
    }
}
