// Institution loader — fetch, parse and normalize one data package.
//
// A package is three tables: roster, deduplicated publications and an
// optional per-author publication export. All three are fetched
// concurrently. Roster and publications are required; the per-author table
// is best-effort and degrades to empty with a warning.

use tracing::{info, warn};

use super::traits::DatasetSource;
use crate::config::InstitutionConfig;
use crate::error::{DatasetKind, LoadError};
use crate::records::models::{Author, Publication, Side};
use crate::records::publications::{normalize_publications, PublicationColumns};
use crate::records::roster::{normalize_roster, RosterColumns};

/// Everything loaded for one institution. Immutable once built.
#[derive(Debug, Clone)]
pub struct InstitutionData {
    pub key: String,
    pub label: String,
    pub color: Option<String>,
    /// Normalized roster, tagged as side A. Use `roster_for` to re-tag.
    pub roster: Vec<Author>,
    /// Deduplicated publications.
    pub publications: Vec<Publication>,
    /// Per-author publications; empty when the export is absent or failed.
    pub per_author: Vec<Publication>,
    /// Why a configured per-author export could not be used, if it failed.
    pub per_author_issue: Option<LoadError>,
}

impl InstitutionData {
    /// The roster with every author tagged as `side`.
    pub fn roster_for(&self, side: Side) -> Vec<Author> {
        self.roster
            .iter()
            .cloned()
            .map(|mut a| {
                a.institution = side;
                a
            })
            .collect()
    }

    /// Publications to build author term sets from: the per-author export
    /// when it has rows, else the deduplicated one.
    pub fn embedding_publications(&self) -> &[Publication] {
        if self.per_author.is_empty() {
            &self.publications
        } else {
            &self.per_author
        }
    }
}

/// Loads institution packages through a `DatasetSource`.
pub struct InstitutionLoader<S: DatasetSource> {
    source: S,
    roster_columns: RosterColumns,
    publication_columns: PublicationColumns,
}

impl<S: DatasetSource> InstitutionLoader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            roster_columns: RosterColumns::default(),
            publication_columns: PublicationColumns::default(),
        }
    }

    /// Load one institution's package.
    pub async fn load(&self, key: &str, institution: &InstitutionConfig) -> Result<InstitutionData, LoadError> {
        let per_author_fetch = async {
            match &institution.per_author {
                Some(location) if !location.trim().is_empty() => {
                    Some(self.source.fetch_rows(location).await)
                }
                _ => None,
            }
        };

        let (roster_rows, publication_rows, per_author_rows) = futures::join!(
            self.source.fetch_rows(&institution.roster),
            self.source.fetch_rows(&institution.dedup),
            per_author_fetch,
        );

        let roster_rows =
            roster_rows.map_err(|e| LoadError::unavailable(key, DatasetKind::Roster, &e))?;
        let publication_rows = publication_rows
            .map_err(|e| LoadError::unavailable(key, DatasetKind::Publications, &e))?;
        let (per_author_rows, per_author_issue) = match per_author_rows {
            Some(Ok(rows)) => (rows, None),
            Some(Err(e)) => {
                let issue = LoadError::unavailable(key, DatasetKind::PerAuthor, &e);
                warn!(error = %issue, "Falling back to deduplicated publications");
                (Vec::new(), Some(issue))
            }
            None => (Vec::new(), None),
        };

        let roster = normalize_roster(&roster_rows, &self.roster_columns, Side::A);
        let publications = normalize_publications(&publication_rows, &self.publication_columns);
        let per_author = normalize_publications(&per_author_rows, &self.publication_columns);

        info!(
            institution = key,
            authors = roster.len(),
            publications = publications.len(),
            per_author = per_author.len(),
            "Loaded institution"
        );

        Ok(InstitutionData {
            key: key.to_string(),
            label: institution.label.clone(),
            color: institution.color.clone(),
            roster,
            publications,
            per_author,
            per_author_issue,
        })
    }
}
