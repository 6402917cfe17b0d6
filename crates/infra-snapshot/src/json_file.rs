// JSON file adapters
// reason: the remote account API is out of scope; a snapshot file stands in for it
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use xywow_core::domain::{AccountSnapshot, PlayLog};
use xywow_core::port::{ProviderError, StandingProvider};

/// Reads the member's account snapshot from a JSON file on every fetch
///
/// The file holds one object in the remote API's shape, e.g.
/// `{"userId":"10001","enterTimestamp":1700000000000,"consumption":120,"discount":0.9}`.
/// Rewriting the file (or nulling `enterTimestamp`) is picked up on the next poll.
pub struct JsonFileStandingProvider {
    path: PathBuf,
}

impl JsonFileStandingProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StandingProvider for JsonFileStandingProvider {
    async fn fetch(&self) -> Result<AccountSnapshot, ProviderError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ProviderError::Unavailable(format!("{}: {}", self.path.display(), e))
        })?;
        let snapshot: AccountSnapshot = serde_json::from_str(&raw).map_err(|e| {
            ProviderError::Malformed(format!("{}: {}", self.path.display(), e))
        })?;

        debug!(
            path = %self.path.display(),
            user_id = ?snapshot.user_id,
            "Loaded standing snapshot"
        );
        Ok(snapshot)
    }
}

/// Load a play-log export (a JSON array of visits)
pub async fn read_play_logs(path: impl AsRef<Path>) -> Result<Vec<PlayLog>, ProviderError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ProviderError::Unavailable(format!("{}: {}", path.display(), e)))?;
    let logs: Vec<PlayLog> = serde_json::from_str(&raw)
        .map_err(|e| ProviderError::Malformed(format!("{}: {}", path.display(), e)))?;

    debug!(path = %path.display(), count = logs.len(), "Loaded play logs");
    Ok(logs)
}
