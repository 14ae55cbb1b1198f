// Dataset source trait — where tabular exports come from.
//
// The loader only needs "location in, rows out". Local files and HTTP(S)
// URLs both implement this; tests plug in an in-memory source.

use anyhow::Result;
use async_trait::async_trait;

use crate::records::models::RawRow;

/// Trait for fetching one CSV table. Implementations are async because
/// remote sources need HTTP calls.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch and parse the table at `location`, one map per data row.
    async fn fetch_rows(&self, location: &str) -> Result<Vec<RawRow>>;
}
