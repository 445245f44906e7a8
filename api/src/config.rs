use std::path::PathBuf;

const DEFAULT_FIXTURES_PATH: &str = "./fixtures";
const DEFAULT_LOG_PATH: &str = "./logs";
const DEFAULT_SCENARIO: &str = "inbox_triage";
const DEFAULT_PORT: u16 = 3001;

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Root directory holding one subdirectory per scenario
    pub fixtures_path: PathBuf,
    /// Directory for the per-scenario JSONL logs
    pub log_path: PathBuf,
    /// Scenario active until the first reset
    pub default_scenario: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            fixtures_path: non_empty("FIXTURES_PATH")
                .unwrap_or_else(|| DEFAULT_FIXTURES_PATH.to_string())
                .into(),
            log_path: non_empty("LOG_PATH")
                .unwrap_or_else(|| DEFAULT_LOG_PATH.to_string())
                .into(),
            default_scenario: non_empty("SCENARIO").unwrap_or_else(|| DEFAULT_SCENARIO.to_string()),
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }
}
