use std::fmt::Write as _;
use std::path::Path;

use sandbox_core::records::{RequestRecord, RequestSummary, ToolCallRecord, truncate_chars};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Phrases in the assistant reply that suggest a tool failure upstream.
/// Matched case-insensitively as substrings.
pub const ERROR_HINT_PATTERNS: &[&str] = &[
    "technical issue",
    "encountered an error",
    "unable to",
    "couldn't",
    "failed to",
    "try again",
];

const RESPONSE_PREVIEW_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything observed during one episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub scenario: String,
    pub input_message: String,
    /// Assistant reply text, empty if the gateway gave none
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub all_requests: Vec<RequestRecord>,
    pub request_summary: RequestSummary,
    pub failed_requests: Vec<RequestRecord>,
    pub response_has_error_hints: bool,
    pub raw_response: Value,
}

/// `choices[0].message.content` of a chat-completions response, or "".
pub fn extract_assistant_message(response: &Value) -> String {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn has_error_hints(reply: &str) -> bool {
    let lowered = reply.to_lowercase();
    ERROR_HINT_PATTERNS.iter().any(|p| lowered.contains(p))
}

/// Human-readable episode summary.
pub fn render_summary(report: &EpisodeReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let summary = &report.request_summary;

    let _ = writeln!(out, "{rule}\nEPISODE RESULTS\n{rule}");
    let _ = writeln!(
        out,
        "\nRequests: {} total, {} succeeded, {} failed",
        summary.total, summary.success, summary.failed
    );

    let _ = writeln!(out, "\nSuccessful Tool Calls ({}):", report.tool_calls.len());
    for call in &report.tool_calls {
        let _ = writeln!(out, "  + {}: {}", call.tool, call.args);
    }

    if !report.failed_requests.is_empty() {
        let _ = writeln!(out, "\nFailed Requests ({}):", report.failed_requests.len());
        for req in &report.failed_requests {
            let body = req
                .request_body
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_else(|| "null".to_string());
            let _ = writeln!(
                out,
                "  ! {} (HTTP {}): body={}",
                req.tool, req.status_code, body
            );
        }
    }

    if report.response_has_error_hints {
        let _ = writeln!(
            out,
            "\n** WARNING: Assistant response contains error language, agent may have hit tool failures **"
        );
    }

    let _ = writeln!(out, "\nAssistant Response:");
    let _ = writeln!(
        out,
        "  {}...",
        truncate_chars(&report.response, RESPONSE_PREVIEW_CHARS)
    );
    out
}

/// Write the full report as pretty JSON, creating parent directories.
pub fn write_report(path: &Path, report: &EpisodeReport) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(report)?;
    std::fs::write(path, data)?;
    Ok(())
}
