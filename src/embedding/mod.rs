// Author embedding — 2-D projections of per-author term sets.
//
// Every author who appears on a filtered publication gets the union of that
// publication's terms. Institution A's authors come first, then B's; an
// author on both rosters gets one point per side. PCA and classical MDS sit
// behind the `Embedder` trait.

pub mod highlight;
pub mod linalg;
pub mod mds;
pub mod pca;
pub mod traits;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::models::{Author, Publication, Side, TermSource};
use mds::MdsEmbedder;
use pca::PcaEmbedder;
use traits::Embedder;

/// Fewer authors than this and no projection is attempted.
pub const MIN_AUTHORS: usize = 3;

/// Which projection to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMethod {
    #[default]
    Pca,
    Mds,
}

impl EmbeddingMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingMethod::Pca => "pca",
            EmbeddingMethod::Mds => "mds",
        }
    }

    fn embedder(&self) -> Box<dyn Embedder> {
        match self {
            EmbeddingMethod::Pca => Box::new(PcaEmbedder),
            EmbeddingMethod::Mds => Box::new(MdsEmbedder),
        }
    }
}

impl fmt::Display for EmbeddingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmbeddingMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pca" => Ok(EmbeddingMethod::Pca),
            "mds" => Ok(EmbeddingMethod::Mds),
            other => bail!("unknown embedding method '{other}' (expected pca or mds)"),
        }
    }
}

/// Knobs for `compute_embedding`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmbeddingOptions {
    pub method: EmbeddingMethod,
    /// Fixed seed for reproducible output; `None` draws from the OS.
    pub seed: Option<u64>,
}

/// One author's term set, ready to project.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorTermSet {
    pub author_id: String,
    pub label: String,
    pub terms: BTreeSet<String>,
}

/// A projected author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingPoint {
    pub author_id: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub institution: Side,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    /// All of A's points, then all of B's.
    pub points: Vec<EmbeddingPoint>,
    pub count_a: usize,
    pub count_b: usize,
    pub vocabulary_size: usize,
    pub method: EmbeddingMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmbeddingOutcome {
    Computed(EmbeddingResult),
    /// Too few authors to project; `authors` is how many were available.
    InsufficientData { authors: usize },
}

impl EmbeddingOutcome {
    pub fn result(&self) -> Option<&EmbeddingResult> {
        match self {
            EmbeddingOutcome::Computed(r) => Some(r),
            EmbeddingOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Union of terms per roster author across `publications`, in first-seen
/// author order. Terms are lowercased like the document-frequency counts.
pub fn author_term_sets(
    publications: &[Publication],
    roster: &[Author],
    source: TermSource,
) -> Vec<AuthorTermSet> {
    let names: HashMap<&str, &str> = roster
        .iter()
        .filter(|a| !a.id.is_empty())
        .map(|a| (a.id.as_str(), a.display_name.as_str()))
        .collect();

    let mut order: Vec<AuthorTermSet> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut seen_in_work: HashSet<&str> = HashSet::new();

    for publication in publications {
        seen_in_work.clear();
        let terms: BTreeSet<String> = publication
            .terms(source)
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        for id in &publication.author_ids {
            let Some(&label) = names.get(id.as_str()) else {
                continue;
            };
            if !seen_in_work.insert(id.as_str()) {
                continue;
            }
            let slot = match position.get(id) {
                Some(&i) => i,
                None => {
                    position.insert(id.clone(), order.len());
                    order.push(AuthorTermSet {
                        author_id: id.clone(),
                        label: label.to_string(),
                        terms: BTreeSet::new(),
                    });
                    order.len() - 1
                }
            };
            order[slot].terms.extend(terms.iter().cloned());
        }
    }

    order
}

/// Project both institutions' authors into a shared 2-D space.
pub fn compute_embedding(
    authors_a: &[AuthorTermSet],
    authors_b: &[AuthorTermSet],
    options: &EmbeddingOptions,
) -> EmbeddingOutcome {
    let total = authors_a.len() + authors_b.len();
    if total < MIN_AUTHORS {
        debug!(authors = total, "Too few authors to embed");
        return EmbeddingOutcome::InsufficientData { authors: total };
    }

    let term_sets: Vec<&BTreeSet<String>> = authors_a
        .iter()
        .chain(authors_b)
        .map(|a| &a.terms)
        .collect();

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let projection = options.method.embedder().project(&term_sets, &mut rng);

    let points = authors_a
        .iter()
        .map(|a| (a, Side::A))
        .chain(authors_b.iter().map(|b| (b, Side::B)))
        .zip(projection.coords)
        .map(|((author, side), (x, y))| EmbeddingPoint {
            author_id: author.author_id.clone(),
            label: author.label.clone(),
            x,
            y,
            institution: side,
        })
        .collect();

    debug!(
        method = %options.method,
        authors = total,
        terms = projection.vocabulary_size,
        "Computed embedding"
    );

    EmbeddingOutcome::Computed(EmbeddingResult {
        points,
        count_a: authors_a.len(),
        count_b: authors_b.len(),
        vocabulary_size: projection.vocabulary_size,
        method: options.method,
    })
}
