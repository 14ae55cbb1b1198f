// Typed errors for failures callers need to tell apart.
//
// Everything else flows through anyhow. Loading is the one place where the
// caller (the session, the CLI) wants to know *which* dataset was missing
// so it can refuse to compute on partial data and say so.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The three files that make up an institution's data package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Roster,
    /// Deduplicated publication export.
    Publications,
    /// Optional per-author publication export.
    PerAuthor,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Roster => "roster",
            DatasetKind::Publications => "publications",
            DatasetKind::PerAuthor => "per-author publications",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    /// A dataset could not be fetched or parsed.
    #[error("{institution}: {dataset} unavailable: {reason}")]
    SourceUnavailable {
        institution: String,
        dataset: DatasetKind,
        reason: String,
    },

    #[error("unknown institution '{0}'")]
    UnknownInstitution(String),
}

impl LoadError {
    pub fn unavailable(institution: &str, dataset: DatasetKind, err: &anyhow::Error) -> Self {
        LoadError::SourceUnavailable {
            institution: institution.to_string(),
            dataset,
            // {:#} keeps the whole context chain on one line
            reason: format!("{err:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_institution_and_dataset() {
        let err = LoadError::unavailable(
            "north",
            DatasetKind::Roster,
            &anyhow::anyhow!("file not found"),
        );
        assert_eq!(err.to_string(), "north: roster unavailable: file not found");
    }
}
