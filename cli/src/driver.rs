use std::time::{Duration, Instant};

use sandbox_core::records::{AllRequestsResponse, ToolCallRecord, ToolCallsResponse};
use serde_json::{Value, json};

use crate::report::{EpisodeReport, extract_assistant_message, has_error_hints};

pub const DEFAULT_TOOLS_URL: &str = "http://localhost:3001";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:18790";
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4-5-20250929";

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Where the driver talks to and how long it waits.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub tools_url: String,
    pub gateway_url: String,
    /// Sent as `Authorization: Bearer <token>` to the gateway
    pub gateway_token: Option<String>,
    pub model: String,
    /// Per-attempt timeout for health polling
    pub health_timeout: Duration,
    /// Delay between health polls
    pub poll_interval: Duration,
    /// Timeout for log queries and scenario resets
    pub tools_timeout: Duration,
    /// Timeout for the chat completion; agent reasoning can be slow
    pub chat_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tools_url: DEFAULT_TOOLS_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_token: None,
            model: DEFAULT_MODEL.to_string(),
            health_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_secs(1),
            tools_timeout: Duration::from_secs(5),
            chat_timeout: Duration::from_secs(120),
        }
    }
}

/// Runs one "ask the agent, observe the tools" cycle at a time.
///
/// Every call is sequential. Apart from [`EpisodeDriver::wait_for_services`]
/// returning `false`, no failure escapes: network errors degrade to empty or
/// error-shaped values so a report can always be assembled.
pub struct EpisodeDriver {
    client: reqwest::Client,
    config: DriverConfig,
}

impl EpisodeDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn tools_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.tools_url.trim_end_matches('/'))
    }

    /// Poll the tool server's health endpoint until it answers 200 or
    /// `timeout` elapses. The gateway's readiness is assumed.
    pub async fn wait_for_services(&self, timeout: Duration) -> bool {
        tracing::info!("Waiting for services...");
        let start = Instant::now();
        let url = self.tools_url("/health");

        while start.elapsed() < timeout {
            match self
                .client
                .get(&url)
                .timeout(self.config.health_timeout)
                .send()
                .await
            {
                Ok(resp) if resp.status() == reqwest::StatusCode::OK => {
                    tracing::info!("Mock tools: OK");
                    tracing::info!("Agent gateway: assuming ready");
                    return true;
                }
                Ok(resp) => {
                    tracing::debug!(status = resp.status().as_u16(), "Mock tools not healthy yet");
                }
                Err(e) => tracing::debug!(error = %e, "Mock tools not reachable yet"),
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
        false
    }

    /// Switch the tool server to `scenario`. `false` on any failure.
    pub async fn reset_scenario(&self, scenario: &str) -> bool {
        let result = self
            .client
            .post(self.tools_url(&format!("/set_scenario/{scenario}")))
            .timeout(self.config.tools_timeout)
            .send()
            .await;
        match result {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::warn!(error = %e, scenario, "Could not reset scenario");
                false
            }
        }
    }

    /// Send one user message to the gateway's chat-completions endpoint.
    ///
    /// Non-2xx answers come back as `{error, status}`, transport failures as
    /// `{error}`.
    pub async fn send_message(&self, message: &str) -> Value {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.gateway_url.trim_end_matches('/')
        );
        tracing::info!(url = %url, message = %preview(message, 100), "Sending message to agent gateway");

        match self.chat_completion(&url, message).await {
            Ok(body) => body,
            Err(DriverError::Status { status, body }) => {
                tracing::warn!(status, body = %preview(&body, 500), "Agent gateway returned an error");
                json!({ "error": body, "status": status })
            }
            Err(e) => {
                tracing::warn!(error = %e, "Agent gateway request failed");
                json!({ "error": e.to_string() })
            }
        }
    }

    async fn chat_completion(&self, url: &str, message: &str) -> Result<Value, DriverError> {
        let payload = json!({
            "model": self.config.model,
            "messages": [{ "role": "user", "content": message }],
            "stream": false,
        });

        let mut req = self
            .client
            .post(url)
            .timeout(self.config.chat_timeout)
            .json(&payload);
        if let Some(token) = &self.config.gateway_token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DriverError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, DriverError> {
        let resp = self
            .client
            .get(self.tools_url(path))
            .timeout(self.config.tools_timeout)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DriverError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Successful tool calls logged by the tool server; empty on failure.
    pub async fn get_tool_calls(&self) -> Vec<ToolCallRecord> {
        match self.fetch_json::<ToolCallsResponse>("/tool_calls").await {
            Ok(resp) => resp.calls,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch tool calls");
                Vec::new()
            }
        }
    }

    /// Every tool request logged by the tool server; empty on failure.
    pub async fn get_all_requests(&self) -> AllRequestsResponse {
        match self.fetch_json::<AllRequestsResponse>("/all_requests").await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch request log");
                AllRequestsResponse::default()
            }
        }
    }

    /// Reset, send, collect. Always produces a report.
    pub async fn run_episode(&self, message: &str, scenario: &str) -> EpisodeReport {
        tracing::info!(scenario, "Resetting scenario");
        if !self.reset_scenario(scenario).await {
            tracing::warn!(scenario, "Could not reset scenario; continuing");
        }

        let raw_response = self.send_message(message).await;
        let tool_calls = self.get_tool_calls().await;
        let all_requests = self.get_all_requests().await;

        let response = extract_assistant_message(&raw_response);
        let failed_requests = all_requests
            .requests
            .iter()
            .filter(|r| !r.success)
            .cloned()
            .collect();

        EpisodeReport {
            scenario: scenario.to_string(),
            input_message: message.to_string(),
            response_has_error_hints: has_error_hints(&response),
            response,
            tool_calls,
            all_requests: all_requests.requests,
            request_summary: all_requests.summary,
            failed_requests,
            raw_response,
        }
    }
}

fn preview(text: &str, max: usize) -> &str {
    sandbox_core::records::truncate_chars(text, max)
}
