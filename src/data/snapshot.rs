//! Timestamped CSV snapshot writer

use super::Tabular;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Format shared by every file written during one run
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Run timestamp used in snapshot file names
pub fn run_timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Writes `{prefix}_{timestamp}.csv` files into one directory
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    /// Create a writer; the directory is created on first write
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Get output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path of the snapshot for `prefix` in the run stamped `timestamp`
    pub fn file_path(&self, prefix: &str, timestamp: &str) -> PathBuf {
        self.output_dir.join(format!("{}_{}.csv", prefix, timestamp))
    }

    /// Write `rows` with a header row and no index column
    pub fn write<T: Tabular>(
        &self,
        rows: &[T],
        prefix: &str,
        timestamp: &str,
    ) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = self.file_path(prefix, timestamp);

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(T::HEADERS)?;
        for row in rows {
            writer.write_record(row.record())?;
        }
        writer.flush()?;

        Ok(path)
    }

    /// Like [`write`](Self::write) but a failure is logged instead of returned
    pub fn save<T: Tabular>(&self, rows: &[T], prefix: &str, timestamp: &str) -> Option<PathBuf> {
        match self.write(rows, prefix, timestamp) {
            Ok(path) => {
                tracing::info!(
                    artifact = prefix,
                    rows = rows.len(),
                    path = %path.display(),
                    "Saved snapshot"
                );
                Some(path)
            }
            Err(e) => {
                tracing::error!(artifact = prefix, error = %e, "Failed to save snapshot");
                None
            }
        }
    }
}
