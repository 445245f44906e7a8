use std::path::{Path, PathBuf};

use sandbox_core::records::{RequestRecord, ToolCallRecord};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::fixtures::is_plain_segment;

/// In-memory call/request logs for the active scenario, mirrored to
/// per-scenario JSONL files under `log_dir`.
///
/// The scenario and both logs sit behind one lock, so a reset is observed
/// either entirely or not at all.
pub struct SessionLog {
    inner: RwLock<Session>,
    log_dir: PathBuf,
}

struct Session {
    scenario: String,
    tool_calls: Vec<ToolCallRecord>,
    requests: Vec<RequestRecord>,
}

impl SessionLog {
    pub fn new(scenario: &str, log_dir: PathBuf) -> Self {
        Self {
            inner: RwLock::new(Session {
                scenario: scenario.to_string(),
                tool_calls: Vec::new(),
                requests: Vec::new(),
            }),
            log_dir,
        }
    }

    pub async fn scenario(&self) -> String {
        self.inner.read().await.scenario.clone()
    }

    /// Switch the active scenario and clear both logs. JSONL files are left
    /// untouched.
    pub async fn reset(&self, scenario: &str) {
        let mut session = self.inner.write().await;
        session.scenario = scenario.to_string();
        session.tool_calls.clear();
        session.requests.clear();
    }

    pub async fn record_tool_call(&self, record: ToolCallRecord) {
        let scenario = {
            let mut session = self.inner.write().await;
            session.tool_calls.push(record.clone());
            session.scenario.clone()
        };
        if let Some(path) = self.log_file(&scenario, "calls") {
            append_jsonl(&path, &record).await;
        }
    }

    pub async fn record_request(&self, record: RequestRecord) {
        let scenario = {
            let mut session = self.inner.write().await;
            session.requests.push(record.clone());
            session.scenario.clone()
        };
        if let Some(path) = self.log_file(&scenario, "all_requests") {
            append_jsonl(&path, &record).await;
        }
    }

    /// `{log_dir}/{scenario}_{kind}.jsonl`. Scenario names that would place
    /// the file outside `log_dir` get no file; the in-memory log still holds
    /// the record.
    fn log_file(&self, scenario: &str, kind: &str) -> Option<PathBuf> {
        if !is_plain_segment(scenario) {
            tracing::warn!(scenario = %scenario, "Skipping JSONL append for unsafe scenario name");
            return None;
        }
        Some(self.log_dir.join(format!("{scenario}_{kind}.jsonl")))
    }

    pub async fn tool_calls(&self) -> Vec<ToolCallRecord> {
        self.inner.read().await.tool_calls.clone()
    }

    pub async fn requests(&self) -> Vec<RequestRecord> {
        self.inner.read().await.requests.clone()
    }
}

/// Append one JSON line. Open, write, close; failures are logged and dropped.
async fn append_jsonl<T: Serialize>(path: &Path, record: &T) {
    let mut line = match serde_json::to_string(record) {
        Ok(line) => line,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize log record");
            return;
        }
    };
    line.push('\n');

    let result: std::io::Result<()> = async {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = result {
        tracing::warn!(error = %e, path = %path.display(), "Failed to append log line");
    }
}
