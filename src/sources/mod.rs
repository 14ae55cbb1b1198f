// Dataset sources — local CSV files and HTTP(S) URLs behind one trait.

pub mod csv_table;
pub mod file;
pub mod http;
pub mod loader;
pub mod traits;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::records::models::RawRow;
use file::FileSource;
use http::HttpSource;
use traits::DatasetSource;

/// Routes `http://` and `https://` locations to `HttpSource` and
/// everything else to `FileSource`.
pub struct RoutedSource {
    files: FileSource,
    http: HttpSource,
}

impl RoutedSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            files: FileSource::new(base_dir),
            http: HttpSource::new(),
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl DatasetSource for RoutedSource {
    async fn fetch_rows(&self, location: &str) -> Result<Vec<RawRow>> {
        if is_remote(location) {
            self.http.fetch_rows(location.trim()).await
        } else {
            self.files.fetch_rows(location).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.org/roster.csv"));
        assert!(is_remote("HTTP://example.org/x.csv"));
        assert!(!is_remote("data/roster.csv"));
        assert!(!is_remote("/abs/https.csv"));
    }
}
