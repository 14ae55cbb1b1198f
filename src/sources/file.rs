// Local-file dataset source.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::csv_table::parse_csv;
use super::traits::DatasetSource;
use crate::records::models::RawRow;

/// Reads CSV files, resolving relative locations against `base_dir`.
pub struct FileSource {
    base_dir: PathBuf,
}

impl FileSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn resolve(&self, location: &str) -> PathBuf {
        let path = Path::new(location);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[async_trait]
impl DatasetSource for FileSource {
    async fn fetch_rows(&self, location: &str) -> Result<Vec<RawRow>> {
        let path = self.resolve(location);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let rows = parse_csv(bytes.as_slice())
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), rows = rows.len(), "Read CSV file");
        Ok(rows)
    }
}
