// Roster normalization — raw personnel rows into one Author per canonical id.
//
// Roster exports are hand-maintained and routinely list the same person more
// than once (a row per appointment, a stale row with no name). Rows are
// grouped by canonical id and reduced with an explicit comparator over a
// completeness score; encounter order only breaks ties.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use super::ids::normalize_id;
use super::models::{Author, RawRow, Side};

/// Column names for a roster export. Defaults match the roster CSVs
/// produced by the single-institution pipeline.
#[derive(Debug, Clone)]
pub struct RosterColumns {
    pub id: String,
    pub display_name: String,
    pub alternate_name: String,
    pub contact: String,
    pub appointment: String,
    pub category: String,
    pub level: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            id: "OpenAlexID".to_string(),
            display_name: "Display_name".to_string(),
            alternate_name: "Name".to_string(),
            contact: "Email".to_string(),
            appointment: "Appointment".to_string(),
            category: "Category".to_string(),
            level: "Level".to_string(),
        }
    }
}

/// Read a trimmed cell, defaulting to "" when the column is missing.
pub(crate) fn cell<'a>(row: &'a RawRow, column: &str) -> &'a str {
    row.get(column).map(|v| v.trim()).unwrap_or("")
}

/// Number of non-empty identity fields: display name, alternate name, contact.
pub fn completeness_score(row: &RawRow, columns: &RosterColumns) -> usize {
    [&columns.display_name, &columns.alternate_name, &columns.contact]
        .iter()
        .filter(|col| !cell(row, col).is_empty())
        .count()
}

/// Comparator used to merge duplicate rows. `Greater` means `candidate`
/// should replace `current`; equal scores keep the first-seen row.
pub fn prefer_row(current: &RawRow, candidate: &RawRow, columns: &RosterColumns) -> Ordering {
    completeness_score(candidate, columns).cmp(&completeness_score(current, columns))
}

/// Normalize raw roster rows into authors on the given side.
///
/// Rows whose id doesn't canonicalize are dropped. Output order is the
/// first-seen order of each canonical id.
pub fn normalize_roster(rows: &[RawRow], columns: &RosterColumns, side: Side) -> Vec<Author> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, &RawRow> = HashMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let id = normalize_id(cell(row, &columns.id));
        if id.is_empty() {
            dropped += 1;
            continue;
        }
        let replace = match best.get(&id) {
            Some(current) => prefer_row(current, row, columns) == Ordering::Greater,
            None => {
                order.push(id.clone());
                true
            }
        };
        if replace {
            best.insert(id, row);
        }
    }

    debug!(
        rows = rows.len(),
        authors = order.len(),
        dropped,
        side = side.as_str(),
        "Normalized roster"
    );

    order
        .into_iter()
        .filter_map(|id| {
            let row = best.get(&id)?;
            Some(author_from_row(id, row, columns, side))
        })
        .collect()
}

fn author_from_row(id: String, row: &RawRow, columns: &RosterColumns, side: Side) -> Author {
    let display_name = [
        cell(row, &columns.display_name),
        cell(row, &columns.alternate_name),
    ]
    .into_iter()
    .find(|name| !name.is_empty())
    .map(str::to_string)
    .unwrap_or_else(|| id.clone());

    Author {
        display_name,
        appointment_type: cell(row, &columns.appointment).to_string(),
        category: cell(row, &columns.category).to_string(),
        level: cell(row, &columns.level).to_string(),
        institution: side,
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn drops_unresolvable_ids() {
        let rows = vec![
            row(&[("OpenAlexID", ""), ("Name", "Nobody")]),
            row(&[("OpenAlexID", "not an id"), ("Name", "Also nobody")]),
            row(&[("OpenAlexID", "A1"), ("Name", "Someone")]),
        ];
        let authors = normalize_roster(&rows, &RosterColumns::default(), Side::A);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].id, "A1");
    }

    #[test]
    fn merges_duplicates_preferring_complete_row() {
        let rows = vec![
            row(&[("OpenAlexID", "A1"), ("Appointment", "Part-time")]),
            row(&[
                ("OpenAlexID", "https://openalex.org/A1"),
                ("Display_name", "Dr. One"),
                ("Email", "one@example.edu"),
                ("Appointment", " Full-time "),
            ]),
        ];
        let authors = normalize_roster(&rows, &RosterColumns::default(), Side::B);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].display_name, "Dr. One");
        assert_eq!(authors[0].appointment_type, "Full-time");
        assert_eq!(authors[0].institution, Side::B);
    }

    #[test]
    fn ties_keep_first_seen() {
        let rows = vec![
            row(&[("OpenAlexID", "A1"), ("Name", "First")]),
            row(&[("OpenAlexID", "A1"), ("Name", "Second")]),
        ];
        let authors = normalize_roster(&rows, &RosterColumns::default(), Side::A);
        assert_eq!(authors[0].display_name, "First");
    }

    #[test]
    fn display_name_falls_back_to_id() {
        let rows = vec![row(&[("OpenAlexID", "A9")])];
        let authors = normalize_roster(&rows, &RosterColumns::default(), Side::A);
        assert_eq!(authors[0].display_name, "A9");
        assert_eq!(authors[0].category, "");
    }
}
