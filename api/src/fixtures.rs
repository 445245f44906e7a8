use std::path::{Component, Path, PathBuf};

use serde::de::DeserializeOwned;

pub const INBOX_FIXTURE: &str = "inbox.json";
pub const CALENDAR_FIXTURE: &str = "calendar.json";
const MEMORY_DIR: &str = "memory";

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Fixture not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read fixture {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid fixture {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// True when `name` can be joined onto a directory without leaving it: a
/// single normal path component, no separators, no `.` or `..`.
pub fn is_plain_segment(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Read-only view over `{root}/{scenario}/...` fixture files.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// `{root}/{scenario}`, or `None` when the scenario name would resolve
    /// outside `root`.
    fn scenario_dir(&self, scenario: &str) -> Option<PathBuf> {
        is_plain_segment(scenario).then(|| self.root.join(scenario))
    }

    /// Load and deserialize a scenario's JSON fixture.
    ///
    /// A scenario name that is not a plain directory name is reported as
    /// `NotFound` without touching the filesystem.
    pub async fn load<T: DeserializeOwned>(
        &self,
        scenario: &str,
        filename: &str,
    ) -> Result<T, FixtureError> {
        let Some(dir) = self.scenario_dir(scenario) else {
            tracing::warn!(scenario = %scenario, "Refusing fixture lookup for unsafe scenario name");
            return Err(FixtureError::NotFound {
                path: PathBuf::from(scenario).join(filename),
            });
        };
        let path = dir.join(filename);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FixtureError::NotFound { path });
            }
            Err(source) => return Err(FixtureError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| FixtureError::Parse { path, source })
    }

    /// Read `{root}/{scenario}/memory/{relative}` as text.
    ///
    /// Returns `None` for anything that is not a readable file inside the
    /// memory directory: missing files, directories, I/O errors, invalid
    /// UTF-8, absolute paths, `..` segments and unsafe scenario names.
    pub async fn read_memory(&self, scenario: &str, relative: &str) -> Option<String> {
        let dir = self.scenario_dir(scenario)?;
        let relative = Path::new(relative);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if relative.as_os_str().is_empty() || !contained {
            return None;
        }
        let path = dir.join(MEMORY_DIR).join(relative);
        tokio::fs::read_to_string(&path).await.ok()
    }
}
