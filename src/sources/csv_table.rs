// CSV parsing into header-keyed rows.

use std::io::Read;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::records::models::RawRow;

/// Parse a headed CSV table. Ragged rows are tolerated: missing trailing
/// cells are simply absent from the row, extra cells are ignored.
pub fn parse_csv<R: Read>(input: R) -> Result<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers: Vec<String> = reader
        .headers()
        .context("Unable to read CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", line + 1))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(h, _)| !h.is_empty())
            .map(|(h, cell)| (h.clone(), cell.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
