// Data models — the typed records every analysis stage consumes.
//
// Raw tabular rows are turned into these by the roster and publication
// normalizers. They're kept separate from the normalizers so analysis code
// can depend on the types without pulling in column mappings.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// One parsed CSV row: column name -> raw cell value.
pub type RawRow = HashMap<String, String>;

/// Which side of the comparison a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A roster member. Identity is `id`, the canonical author id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub display_name: String,
    pub appointment_type: String,
    pub category: String,
    pub level: String,
    pub institution: Side,
}

/// A normalized publication row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Synthetic dedup key; `None` when the row had no id, DOI or title.
    pub work_id: Option<String>,
    pub year: i32,
    pub pub_type: String,
    /// Canonical author ids, deduplicated, in source order.
    pub author_ids: Vec<String>,
    pub topic_terms: BTreeSet<String>,
    pub concept_terms: BTreeSet<String>,
    pub title: String,
    pub doi: String,
    pub cited_by_count: u32,
}

impl Publication {
    /// The term set for the given source.
    pub fn terms(&self, source: TermSource) -> &BTreeSet<String> {
        match source {
            TermSource::Topics => &self.topic_terms,
            TermSource::Concepts => &self.concept_terms,
        }
    }
}

/// Which term haystack to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSource {
    Topics,
    Concepts,
}

impl TermSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermSource::Topics => "topics",
            TermSource::Concepts => "concepts",
        }
    }
}

impl fmt::Display for TermSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_selects_haystack() {
        let p = Publication {
            work_id: None,
            year: 2022,
            pub_type: "article".to_string(),
            author_ids: vec![],
            topic_terms: ["virology".to_string()].into(),
            concept_terms: ["biology".to_string(), "medicine".to_string()].into(),
            title: String::new(),
            doi: String::new(),
            cited_by_count: 0,
        };
        assert_eq!(p.terms(TermSource::Topics).len(), 1);
        assert_eq!(p.terms(TermSource::Concepts).len(), 2);
    }
}
