// Publication normalization — raw export rows into typed Publication records.
//
// Malformed cells never fail a row: a non-numeric year becomes 0, an unknown
// type passes through lowercased, unresolvable author ids are dropped. These
// defaults are deterministic because they feed directly into the reported
// statistics (a year-0 row falls outside every window, an id-less row
// matches no roster).

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use super::ids::{normalize_doi, normalize_id, normalize_title, normalize_work_id};
use super::models::{Publication, RawRow};
use super::roster::cell;

/// Delimiters accepted inside multi-valued author id cells.
const AUTHOR_ID_DELIMITERS: [char; 3] = ['|', ';', ','];

/// Delimiters accepted inside concept list cells.
const CONCEPT_DELIMITERS: [char; 2] = [';', '|'];

/// Where to find a publication's author ids.
///
/// Strategies are tried in priority order and the first one that yields at
/// least one canonical id wins. Results are never merged across strategies.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorIdSource {
    /// A column listing every author of the work, delimited by `|`, `;` or `,`.
    Combined(String),
    /// A column holding the single author a per-author export row is about.
    Single(String),
}

impl AuthorIdSource {
    /// Canonical ids this strategy finds in the row (may be empty).
    pub fn extract(&self, row: &RawRow) -> Vec<String> {
        match self {
            AuthorIdSource::Combined(column) => cell(row, column)
                .split(AUTHOR_ID_DELIMITERS)
                .map(normalize_id)
                .filter(|id| !id.is_empty())
                .collect(),
            AuthorIdSource::Single(column) => {
                let id = normalize_id(cell(row, column));
                if id.is_empty() {
                    Vec::new()
                } else {
                    vec![id]
                }
            }
        }
    }
}

/// Column names for a publication export. Defaults match OpenAlex
/// flattened exports.
#[derive(Debug, Clone)]
pub struct PublicationColumns {
    /// Work id / URL columns, first non-empty wins.
    pub work_id: Vec<String>,
    pub doi: String,
    pub title: String,
    pub year: Vec<String>,
    pub pub_type: Vec<String>,
    pub author_ids: Vec<AuthorIdSource>,
    /// Each non-empty column contributes one topic label.
    pub topics: Vec<String>,
    pub concepts: String,
    pub cited_by_count: String,
}

impl Default for PublicationColumns {
    fn default() -> Self {
        Self {
            work_id: vec!["id".to_string(), "work_id".to_string()],
            doi: "doi".to_string(),
            title: "display_name".to_string(),
            year: vec!["publication_year".to_string(), "year".to_string()],
            pub_type: vec!["type".to_string(), "display_type".to_string()],
            author_ids: vec![
                AuthorIdSource::Combined("authorships__author__id".to_string()),
                AuthorIdSource::Single("author_openalex_id".to_string()),
                AuthorIdSource::Single("OpenAlexID".to_string()),
                AuthorIdSource::Single("author_id".to_string()),
            ],
            topics: vec!["primary_topic__display_name".to_string()],
            concepts: "concepts_list".to_string(),
            cited_by_count: "cited_by_count".to_string(),
        }
    }
}

/// Map a raw type label onto the canonical vocabulary.
pub fn normalize_type(raw: &str) -> String {
    let s = raw.trim().to_lowercase();
    match s.as_str() {
        "journal-article" | "journal article" => "article".to_string(),
        "review-article" | "review article" => "review".to_string(),
        _ => s,
    }
}

/// Parse a year cell. Non-numeric or non-finite input yields 0; fractional
/// values are rounded.
pub fn parse_year(raw: &str) -> i32 {
    match raw.trim().parse::<f64>() {
        Ok(y) if y.is_finite() => y.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32,
        _ => 0,
    }
}

/// Run the author id strategies in order; first non-empty result wins.
pub fn extract_author_ids(row: &RawRow, strategies: &[AuthorIdSource]) -> Vec<String> {
    let ids = strategies
        .iter()
        .map(|strategy| strategy.extract(row))
        .find(|ids| !ids.is_empty())
        .unwrap_or_default();

    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Derive the synthetic work id: work URL/id, then DOI, then title.
pub fn synthetic_work_id(row: &RawRow, columns: &PublicationColumns) -> Option<String> {
    let from_id = columns
        .work_id
        .iter()
        .map(|col| normalize_work_id(cell(row, col)))
        .find(|id| !id.is_empty());
    if from_id.is_some() {
        return from_id;
    }

    let doi = normalize_doi(cell(row, &columns.doi));
    if !doi.is_empty() {
        return Some(format!("doi:{doi}"));
    }

    let title = normalize_title(cell(row, &columns.title));
    if !title.is_empty() {
        return Some(format!("title:{title}"));
    }

    None
}

fn first_non_empty<'a>(row: &'a RawRow, columns: &[String]) -> &'a str {
    columns
        .iter()
        .map(|col| cell(row, col))
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

fn topic_terms(row: &RawRow, columns: &PublicationColumns) -> BTreeSet<String> {
    columns
        .topics
        .iter()
        .map(|col| cell(row, col).to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn concept_terms(row: &RawRow, columns: &PublicationColumns) -> BTreeSet<String> {
    cell(row, &columns.concepts)
        .split(CONCEPT_DELIMITERS)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Normalize a single publication row.
pub fn normalize_publication(row: &RawRow, columns: &PublicationColumns) -> Publication {
    Publication {
        work_id: synthetic_work_id(row, columns),
        year: parse_year(first_non_empty(row, &columns.year)),
        pub_type: normalize_type(first_non_empty(row, &columns.pub_type)),
        author_ids: extract_author_ids(row, &columns.author_ids),
        topic_terms: topic_terms(row, columns),
        concept_terms: concept_terms(row, columns),
        title: cell(row, &columns.title).to_string(),
        doi: cell(row, &columns.doi).to_string(),
        cited_by_count: cell(row, &columns.cited_by_count).parse().unwrap_or(0),
    }
}

/// Normalize every row of a publication export.
pub fn normalize_publications(rows: &[RawRow], columns: &PublicationColumns) -> Vec<Publication> {
    let pubs: Vec<Publication> = rows
        .iter()
        .map(|row| normalize_publication(row, columns))
        .collect();

    let without_authors = pubs.iter().filter(|p| p.author_ids.is_empty()).count();
    let without_year = pubs.iter().filter(|p| p.year == 0).count();
    debug!(
        rows = pubs.len(),
        without_authors, without_year, "Normalized publications"
    );

    pubs
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
    fn type_synonyms() {
        assert_eq!(normalize_type("Journal Article"), "article");
        assert_eq!(normalize_type("journal-article"), "article");
        assert_eq!(normalize_type(" review article "), "review");
        assert_eq!(normalize_type("Book-Chapter"), "book-chapter");
        assert_eq!(normalize_type(""), "");
    }

    #[test]
    fn year_parsing_defaults_to_zero() {
        assert_eq!(parse_year("2022"), 2022);
        assert_eq!(parse_year(" 2021.6 "), 2022);
        assert_eq!(parse_year("n/a"), 0);
        assert_eq!(parse_year(""), 0);
        assert_eq!(parse_year("NaN"), 0);
        assert_eq!(parse_year("inf"), 0);
    }

    #[test]
    fn combined_column_wins_over_single() {
        let r = row(&[
            (
                "authorships__author__id",
                "https://openalex.org/A1|https://openalex.org/A2;A1, A3",
            ),
            ("author_openalex_id", "A9"),
        ]);
        let ids = extract_author_ids(&r, &PublicationColumns::default().author_ids);
        assert_eq!(ids, vec!["A1", "A2", "A3"]);
    }

    #[test]
    fn falls_back_to_single_author_column() {
        let r = row(&[
            ("authorships__author__id", " | junk value | "),
            ("author_openalex_id", ""),
            ("OpenAlexID", "https://openalex.org/A7"),
        ]);
        let ids = extract_author_ids(&r, &PublicationColumns::default().author_ids);
        assert_eq!(ids, vec!["A7"]);
    }

    #[test]
    fn work_id_fallback_chain() {
        let cols = PublicationColumns::default();
        let with_id = row(&[("id", "https://openalex.org/W1"), ("doi", "10.1/x")]);
        assert_eq!(synthetic_work_id(&with_id, &cols).as_deref(), Some("W1"));

        let with_doi = row(&[("doi", "https://doi.org/10.1/X"), ("display_name", "T")]);
        assert_eq!(
            synthetic_work_id(&with_doi, &cols).as_deref(),
            Some("doi:10.1/x")
        );

        let with_title = row(&[("display_name", " Some   Title ")]);
        assert_eq!(
            synthetic_work_id(&with_title, &cols).as_deref(),
            Some("title:some title")
        );

        assert_eq!(synthetic_work_id(&row(&[]), &cols), None);
    }

    #[test]
    fn term_haystacks_are_lowercased_and_deduplicated() {
        let r = row(&[
            ("primary_topic__display_name", " Virology "),
            ("concepts_list", "Biology; Medicine|biology;; "),
        ]);
        let p = normalize_publication(&r, &PublicationColumns::default());
        assert_eq!(p.topic_terms, ["virology".to_string()].into());
        assert_eq!(
            p.concept_terms,
            ["biology".to_string(), "medicine".to_string()].into()
        );
    }
}
