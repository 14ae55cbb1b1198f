// HTTP(S) dataset source.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::csv_table::parse_csv;
use super::traits::DatasetSource;
use crate::records::models::RawRow;

/// Fetches CSV tables over HTTP. Non-2xx responses are errors.
pub struct HttpSource {
    client: Client,
}

impl HttpSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatasetSource for HttpSource {
    async fn fetch_rows(&self, location: &str) -> Result<Vec<RawRow>> {
        let response = self
            .client
            .get(location)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {location}"))?;

        if !response.status().is_success() {
            anyhow::bail!("CSV not found: {} returned {}", location, response.status());
        }

        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {location}"))?;
        let rows = parse_csv(body.as_ref()).with_context(|| format!("Failed to parse {location}"))?;
        debug!(url = location, rows = rows.len(), "Fetched CSV");
        Ok(rows)
    }
}
