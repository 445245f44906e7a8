use std::sync::Arc;

use crate::config::ServerConfig;
use crate::fixtures::FixtureStore;
use crate::store::SessionLog;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SessionLog>,
    pub fixtures: Arc<FixtureStore>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            session: Arc::new(SessionLog::new(
                &config.default_scenario,
                config.log_path.clone(),
            )),
            fixtures: Arc::new(FixtureStore::new(config.fixtures_path.clone())),
        }
    }
}
