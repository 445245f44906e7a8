use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum length (in characters) of a tool call's result summary.
pub const RESULT_SUMMARY_MAX_CHARS: usize = 200;

/// A successful, logged invocation of one of the mock tools.
/// Immutable once appended; lives until the next scenario reset.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ToolCallRecord {
    pub ts: DateTime<Utc>,
    /// Tool name, e.g. "inbox.list"
    pub tool: String,
    /// Arguments as the handler understood them (may embed the raw input)
    pub args: serde_json::Value,
    /// Compact JSON summary of the result, truncated
    pub result_summary: String,
}

impl ToolCallRecord {
    pub fn new(tool: &str, args: serde_json::Value, result: &serde_json::Value) -> Self {
        Self {
            ts: Utc::now(),
            tool: tool.to_string(),
            args,
            result_summary: truncate_chars(&result.to_string(), RESULT_SUMMARY_MAX_CHARS)
                .to_string(),
        }
    }
}

/// Every request to a tool path, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct RequestRecord {
    pub ts: DateTime<Utc>,
    pub tool: String,
    /// Parsed body; null when empty, `{"_raw": ...}` when it was not JSON
    pub request_body: Option<serde_json::Value>,
    pub status_code: u16,
    pub success: bool,
}

impl RequestRecord {
    pub fn new(tool: &str, request_body: Option<serde_json::Value>, status_code: u16) -> Self {
        Self {
            ts: Utc::now(),
            tool: tool.to_string(),
            request_body,
            status_code,
            success: (200..300).contains(&status_code),
        }
    }
}

/// Counts over the request log. `total == success + failed` always.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RequestSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

impl RequestSummary {
    pub fn from_records(records: &[RequestRecord]) -> Self {
        let success = records.iter().filter(|r| r.success).count();
        Self {
            total: records.len(),
            success,
            failed: records.len() - success,
        }
    }
}

/// Response for GET /tool_calls
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ToolCallsResponse {
    #[serde(default)]
    pub calls: Vec<ToolCallRecord>,
}

/// Response for GET /all_requests
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AllRequestsResponse {
    #[serde(default)]
    pub requests: Vec<RequestRecord>,
    #[serde(default)]
    pub summary: RequestSummary,
}

impl AllRequestsResponse {
    pub fn new(requests: Vec<RequestRecord>) -> Self {
        let summary = RequestSummary::from_records(&requests);
        Self { requests, summary }
    }
}

/// Returns the prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
