//! Append-only dataset sink
//!
//! The actor's only persistence operation is "append record". Two
//! implementations: the platform dataset API when a token is configured,
//! and a local JSONL file otherwise so development runs work offline.
//! One attempt per append, no retry - failures surface with context and
//! are scoped by the caller (request-scoped in standby, fatal in batch).

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::PlatformConfig;
use crate::platform::PlatformClient;
use crate::{Error, Result};

/// Append-only record sink
#[async_trait]
pub trait DatasetSink: Send + Sync {
    /// Append one record
    async fn append(&self, record: &serde_json::Value) -> Result<()>;
}

/// Platform dataset API sink
pub struct RemoteDataset {
    platform: Arc<PlatformClient>,
    dataset: String,
}

impl RemoteDataset {
    /// Sink appending to the named platform dataset
    #[must_use]
    pub fn new(platform: Arc<PlatformClient>, dataset: impl Into<String>) -> Self {
        Self {
            platform,
            dataset: dataset.into(),
        }
    }
}

#[async_trait]
impl DatasetSink for RemoteDataset {
    async fn append(&self, record: &serde_json::Value) -> Result<()> {
        let url = self
            .platform
            .api_url(&format!("v2/datasets/{}/items", self.dataset));

        // The items endpoint takes an array; one-element array per append.
        let response = self
            .platform
            .http()
            .post(&url)
            .bearer_auth(self.platform.token())
            .json(&[record])
            .send()
            .await
            .map_err(|e| Error::Dataset(format!("dataset {}: {e}", self.dataset)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Dataset(format!(
                "dataset {}: status {status}",
                self.dataset
            )));
        }

        debug!(dataset = %self.dataset, "Record appended");
        Ok(())
    }
}

/// Local JSONL file sink for offline runs
pub struct LocalDataset {
    path: PathBuf,
}

impl LocalDataset {
    /// Sink appending to `<storage_dir>/datasets/<name>.jsonl`
    #[must_use]
    pub fn new(storage_dir: &str, dataset: &str) -> Self {
        let path = PathBuf::from(storage_dir)
            .join("datasets")
            .join(format!("{dataset}.jsonl"));
        Self { path }
    }

    /// Where records land
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl DatasetSink for LocalDataset {
    async fn append(&self, record: &serde_json::Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Dataset(format!("{}: {e}", self.path.display())))?;
        }

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::Dataset(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Error::Dataset(format!("{}: {e}", self.path.display())))?;

        debug!(path = %self.path.display(), "Record appended");
        Ok(())
    }
}

/// Pick the sink from configuration: remote when a token is present,
/// local JSONL otherwise.
pub fn from_config(config: &PlatformConfig) -> Result<Arc<dyn DatasetSink>> {
    if config.token.as_deref().is_some_and(|t| !t.is_empty()) {
        let platform = Arc::new(PlatformClient::init(config)?);
        Ok(Arc::new(RemoteDataset::new(platform, config.dataset.clone())))
    } else {
        Ok(Arc::new(LocalDataset::new(
            &config.storage_dir,
            &config.dataset,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn local_sink_appends_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LocalDataset::new(dir.path().to_str().unwrap(), "default");

        sink.append(&serde_json::json!({"n": 1})).await.unwrap();
        sink.append(&serde_json::json!({"n": 2})).await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"n":1}"#);
        assert_eq!(lines[1], r#"{"n":2}"#);
    }

    #[test]
    fn config_without_token_selects_local_storage() {
        let config = PlatformConfig::default();
        assert!(from_config(&config).is_ok());
    }
}
