use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::sink::SnapshotSink;
use crate::state::counters::EventRecord;

/// Event log snapshot stored as one JSON array in a file.
///
/// Each overwrite goes to a sibling temp file first and is renamed into
/// place, so readers see either the previous snapshot or the new one.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotSink for JsonFileSink {
    async fn overwrite(&self, records: &[EventRecord]) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(records).map_err(AppError::from)?;
        let tmp = self.tmp_path();

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(AppError::from)
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(AppError::from)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        debug!(
            target: "sink",
            path = %self.path.display(),
            records = records.len(),
            bytes = bytes.len(),
            "snapshot written"
        );
        Ok(())
    }

    async fn load(&self) -> Vec<EventRecord> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(target: "sink", path = %self.path.display(), error = %e, "snapshot unreadable");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(records) => records,
            Err(e) => {
                warn!(target: "sink", path = %self.path.display(), error = %e, "snapshot malformed");
                Vec::new()
            }
        }
    }
}
