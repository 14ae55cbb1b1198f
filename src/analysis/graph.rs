// Cross-institution co-authorship graph.
//
// The same work usually appears in both institutions' exports (once in each
// file, often with slightly different author lists). Rows are grouped by
// synthetic work id first and the roster memberships unioned across every
// row of the group, so a work shared by both files counts once.
//
// A work is cross-institutional when the union has at least one A-roster
// author and at least one B-roster author. Every (a, b) combination on such a
// work is one incidence for the unordered pair {a, b}; an author on both
// rosters never pairs with themself.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::filter::roster_ids;
use crate::records::models::{Author, Publication, Side};

/// Order-independent pair identity: `(x, y)` and `(y, x)` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PairKey(String, String);

impl PairKey {
    pub fn new(x: &str, y: &str) -> Self {
        if x <= y {
            PairKey(x.to_string(), y.to_string())
        } else {
            PairKey(y.to_string(), x.to_string())
        }
    }
}

/// A work with co-authors from both institutions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossWork {
    /// Representative row (the first one seen for this work id).
    pub publication: Publication,
    /// A-roster authors unioned across every row of the work.
    pub ids_a: Vec<String>,
    /// B-roster authors unioned across every row of the work.
    pub ids_b: Vec<String>,
}

/// Aggregated collaboration between one A author and one B author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossInstitutionPair {
    /// Member of roster A when the pair was first seen.
    pub author_a: String,
    /// Member of roster B when the pair was first seen.
    pub author_b: String,
    pub joint_publication_count: usize,
    /// Indices into `CrossInstitutionGraph::works`.
    pub works: Vec<usize>,
}

impl CrossInstitutionPair {
    pub fn key(&self) -> PairKey {
        PairKey::new(&self.author_a, &self.author_b)
    }
}

/// Result of `build_cross_institution_graph`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossInstitutionGraph {
    /// Sorted by count descending, first-seen order on ties.
    pub pairs: Vec<CrossInstitutionPair>,
    /// Authors in at least one pair, once per (id, side).
    pub nodes: Vec<Author>,
    /// Qualifying works, deduplicated by work id.
    pub works: Vec<CrossWork>,
}

struct WorkGroup<'a> {
    sample: &'a Publication,
    ids_a: Vec<String>,
    ids_b: Vec<String>,
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

/// Build the co-authorship graph between two institutions' filtered
/// publication sets.
pub fn build_cross_institution_graph(
    pubs_a: &[Publication],
    pubs_b: &[Publication],
    roster_a: &[Author],
    roster_b: &[Author],
) -> CrossInstitutionGraph {
    let members_a = roster_ids(roster_a);
    let members_b = roster_ids(roster_b);

    // Group every row by work id, keeping first-seen order.
    let mut groups: Vec<WorkGroup> = Vec::new();
    let mut group_index: HashMap<&str, usize> = HashMap::new();

    for publication in pubs_a.iter().chain(pubs_b.iter()) {
        let idx = match publication.work_id.as_deref() {
            Some(key) => *group_index.entry(key).or_insert_with(|| {
                groups.push(WorkGroup {
                    sample: publication,
                    ids_a: Vec::new(),
                    ids_b: Vec::new(),
                });
                groups.len() - 1
            }),
            None => {
                groups.push(WorkGroup {
                    sample: publication,
                    ids_a: Vec::new(),
                    ids_b: Vec::new(),
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[idx];
        for id in &publication.author_ids {
            if members_a.contains(id.as_str()) {
                push_unique(&mut group.ids_a, id);
            }
            if members_b.contains(id.as_str()) {
                push_unique(&mut group.ids_b, id);
            }
        }
    }

    let works: Vec<CrossWork> = groups
        .into_iter()
        .filter(|g| !g.ids_a.is_empty() && !g.ids_b.is_empty())
        .map(|g| CrossWork {
            publication: g.sample.clone(),
            ids_a: g.ids_a,
            ids_b: g.ids_b,
        })
        .collect();

    // Aggregate incidences; each unordered pair counts at most once per work.
    let mut pairs: Vec<CrossInstitutionPair> = Vec::new();
    let mut pair_index: HashMap<PairKey, usize> = HashMap::new();

    for (work_idx, work) in works.iter().enumerate() {
        let mut seen_in_work: HashSet<PairKey> = HashSet::new();
        for a in &work.ids_a {
            for b in &work.ids_b {
                if a == b {
                    continue;
                }
                let key = PairKey::new(a, b);
                if !seen_in_work.insert(key.clone()) {
                    continue;
                }
                match pair_index.get(&key) {
                    Some(&i) => {
                        pairs[i].joint_publication_count += 1;
                        pairs[i].works.push(work_idx);
                    }
                    None => {
                        pair_index.insert(key, pairs.len());
                        pairs.push(CrossInstitutionPair {
                            author_a: a.clone(),
                            author_b: b.clone(),
                            joint_publication_count: 1,
                            works: vec![work_idx],
                        });
                    }
                }
            }
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    pairs.sort_by(|x, y| y.joint_publication_count.cmp(&x.joint_publication_count));

    let nodes = collect_nodes(&pairs, roster_a, roster_b);

    debug!(
        works = works.len(),
        pairs = pairs.len(),
        nodes = nodes.len(),
        "Built cross-institution graph"
    );

    CrossInstitutionGraph {
        pairs,
        nodes,
        works,
    }
}

fn collect_nodes(
    pairs: &[CrossInstitutionPair],
    roster_a: &[Author],
    roster_b: &[Author],
) -> Vec<Author> {
    let by_id_a: HashMap<&str, &Author> = roster_a.iter().map(|a| (a.id.as_str(), a)).collect();
    let by_id_b: HashMap<&str, &Author> = roster_b.iter().map(|a| (a.id.as_str(), a)).collect();

    let mut seen: HashSet<(&str, Side)> = HashSet::new();
    let mut nodes = Vec::new();

    for pair in pairs {
        for (id, side, lookup) in [
            (pair.author_a.as_str(), Side::A, &by_id_a),
            (pair.author_b.as_str(), Side::B, &by_id_b),
        ] {
            if !seen.insert((id, side)) {
                continue;
            }
            if let Some(author) = lookup.get(id) {
                let mut node = (*author).clone();
                node.institution = side;
                nodes.push(node);
            }
        }
    }

    nodes
}

impl CrossInstitutionGraph {
    /// Number of distinct cross-institution works.
    pub fn work_count(&self) -> usize {
        self.works.len()
    }

    /// Find a pair regardless of argument order.
    pub fn find_pair(&self, x: &str, y: &str) -> Option<&CrossInstitutionPair> {
        let key = PairKey::new(x, y);
        self.pairs.iter().find(|p| p.key() == key)
    }

    /// Joint publications behind a pair, newest first, then most cited.
    pub fn works_for_pair(&self, pair: &CrossInstitutionPair) -> Vec<&Publication> {
        let mut pubs: Vec<&Publication> = pair
            .works
            .iter()
            .filter_map(|&i| self.works.get(i))
            .map(|w| &w.publication)
            .collect();
        pubs.sort_by(|x, y| {
            y.year
                .cmp(&x.year)
                .then_with(|| y.cited_by_count.cmp(&x.cited_by_count))
        });
        pubs
    }

    /// Display name for an author id in this graph, falling back to the id.
    pub fn name_of<'a>(&'a self, id: &'a str) -> &'a str {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .map(|n| n.display_name.as_str())
            .unwrap_or(id)
    }

    /// One-line summary of the top pairs: "Name ↔ Name (n); ...", or "—".
    pub fn pair_summary(&self, limit: usize) -> String {
        let parts: Vec<String> = self
            .pairs
            .iter()
            .take(limit)
            .map(|p| {
                format!(
                    "{} \u{2194} {} ({})",
                    self.name_of(&p.author_a),
                    self.name_of(&p.author_b),
                    p.joint_publication_count
                )
            })
            .collect();
        if parts.is_empty() {
            "\u{2014}".to_string()
        } else {
            parts.join("; ")
        }
    }
}
