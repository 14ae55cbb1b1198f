// Term statistics — document frequencies, presence overlap, fold-change.
//
// Document frequency counts publications, not occurrences: a term listed on
// a paper counts once for that paper no matter how many of the
// institution's authors wrote it.
//
// Overlap is Jaccard over presence sets (magnitude-blind). Enrichment
// compares per-capita rates with a log2 fold-change:
//
//   log2((rate_a + EPSILON) / (rate_b + EPSILON))
//
// Positive values favor institution A.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::records::models::{Publication, Side, TermSource};

/// term -> number of publications containing it.
pub type TermFrequencyMap = BTreeMap<String, usize>;

/// Added to both rates so absent terms don't divide by zero.
pub const FOLD_CHANGE_EPSILON: f64 = 1e-9;

/// Default cap for the "top distinct" lists.
pub const DEFAULT_DISTINCT_LIMIT: usize = 10;

/// Default cap for the "shared" list.
pub const DEFAULT_SHARED_LIMIT: usize = 15;

/// One term's comparison between the two institutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRow {
    pub term: String,
    pub per_capita_a: f64,
    pub per_capita_b: f64,
    pub log2_fold_change: f64,
}

impl EnrichmentRow {
    pub fn combined_rate(&self) -> f64 {
        self.per_capita_a + self.per_capita_b
    }

    /// Which side the term leans toward, if any.
    pub fn favors(&self) -> Option<Side> {
        if self.log2_fold_change > 0.0 {
            Some(Side::A)
        } else if self.log2_fold_change < 0.0 {
            Some(Side::B)
        } else {
            None
        }
    }
}

/// Count, per term, how many publications contain it.
pub fn term_document_frequency(publications: &[Publication], source: TermSource) -> TermFrequencyMap {
    let mut df = TermFrequencyMap::new();
    for publication in publications {
        // Term sets are already deduplicated per publication.
        for term in publication.terms(source) {
            let key = term.to_lowercase();
            if key.is_empty() {
                continue;
            }
            *df.entry(key).or_insert(0) += 1;
        }
    }
    df
}

fn present(df: &TermFrequencyMap) -> BTreeSet<&str> {
    df.iter()
        .filter(|&(_, &count)| count > 0)
        .map(|(term, _)| term.as_str())
        .collect()
}

/// Jaccard index over the terms each side uses at all. 0.0 when neither
/// side has any terms.
pub fn overlap(df_a: &TermFrequencyMap, df_b: &TermFrequencyMap) -> f64 {
    let a = present(df_a);
    let b = present(df_b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Per-capita rates and log2 fold-change for every term either side uses.
///
/// A scale of 0 or below is treated as 1. Rows come back sorted by combined
/// rate descending, alphabetically on ties.
pub fn compute_enrichment(
    df_a: &TermFrequencyMap,
    df_b: &TermFrequencyMap,
    scale_a: f64,
    scale_b: f64,
) -> Vec<EnrichmentRow> {
    let scale_a = if scale_a > 0.0 { scale_a } else { 1.0 };
    let scale_b = if scale_b > 0.0 { scale_b } else { 1.0 };

    let terms: BTreeSet<&String> = df_a.keys().chain(df_b.keys()).collect();

    let mut rows: Vec<EnrichmentRow> = terms
        .into_iter()
        .map(|term| {
            let a = df_a.get(term).copied().unwrap_or(0) as f64 / scale_a;
            let b = df_b.get(term).copied().unwrap_or(0) as f64 / scale_b;
            EnrichmentRow {
                term: term.clone(),
                per_capita_a: a,
                per_capita_b: b,
                log2_fold_change: ((a + FOLD_CHANGE_EPSILON) / (b + FOLD_CHANGE_EPSILON)).log2(),
            }
        })
        .collect();

    // Terms are visited alphabetically, so a stable sort keeps that order on ties.
    rows.sort_by(|x, y| y.combined_rate().total_cmp(&x.combined_rate()));
    rows
}

/// Terms most distinctive for `side`: fold-change sign matches the side,
/// combined rate at least `min_combined_rate`, sorted by |log2FC|
/// descending, capped at `limit`.
pub fn top_distinct(
    rows: &[EnrichmentRow],
    side: Side,
    limit: usize,
    min_combined_rate: f64,
) -> Vec<EnrichmentRow> {
    let mut picked: Vec<EnrichmentRow> = rows
        .iter()
        .filter(|r| r.favors() == Some(side))
        .filter(|r| r.combined_rate() >= min_combined_rate)
        .cloned()
        .collect();
    picked.sort_by(|x, y| {
        y.log2_fold_change
            .abs()
            .total_cmp(&x.log2_fold_change.abs())
    });
    picked.truncate(limit);
    picked
}

/// Highest combined-rate terms across both sides. `rows` must already be
/// in `compute_enrichment` order.
pub fn top_shared(rows: &[EnrichmentRow], limit: usize) -> Vec<EnrichmentRow> {
    rows.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn df(pairs: &[(&str, usize)]) -> TermFrequencyMap {
        pairs.iter().map(|(t, n)| (t.to_string(), *n)).collect()
    }

    #[test]
    fn overlap_bounds() {
        let a = df(&[("virology", 3), ("genomics", 1)]);
        let b = df(&[("virology", 1), ("ecology", 2)]);
        let empty = TermFrequencyMap::new();

        assert!((overlap(&a, &a) - 1.0).abs() < 1e-12);
        assert_eq!(overlap(&a, &empty), 0.0);
        assert_eq!(overlap(&empty, &empty), 0.0);
        assert!((overlap(&a, &b) - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn overlap_ignores_zero_counts() {
        let a = df(&[("virology", 2), ("ghost", 0)]);
        let b = df(&[("virology", 5)]);
        assert!((overlap(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn fold_change_sign_convention() {
        let a = df(&[("virology", 4)]);
        let b = df(&[("virology", 1), ("ecology", 3)]);
        let rows = compute_enrichment(&a, &b, 1.0, 1.0);

        let virology = rows.iter().find(|r| r.term == "virology").unwrap();
        assert!((virology.log2_fold_change - 2.0).abs() < 1e-6);
        assert_eq!(virology.favors(), Some(Side::A));

        let ecology = rows.iter().find(|r| r.term == "ecology").unwrap();
        assert!(ecology.log2_fold_change < -20.0, "absent on A should be strongly negative");
        assert!(ecology.log2_fold_change.is_finite());
    }

    #[test]
    fn per_capita_scales_and_zero_scale() {
        let a = df(&[("t", 2)]);
        let b = df(&[("t", 2)]);
        let rows = compute_enrichment(&a, &b, 2.0, 0.0);
        assert!((rows[0].per_capita_a - 1.0).abs() < 1e-12);
        assert!((rows[0].per_capita_b - 2.0).abs() < 1e-12);
    }

    #[test]
    fn rows_sorted_by_combined_rate() {
        let a = df(&[("x", 1), ("y", 5), ("z", 1)]);
        let b = df(&[("w", 1)]);
        let rows = compute_enrichment(&a, &b, 1.0, 1.0);
        let terms: Vec<&str> = rows.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn top_distinct_filters_sorts_and_caps() {
        let a = df(&[("a-only", 3), ("lean-a", 4), ("even", 2)]);
        let b = df(&[("lean-a", 2), ("even", 2), ("b-only", 1)]);
        let rows = compute_enrichment(&a, &b, 1.0, 1.0);

        let for_a = top_distinct(&rows, Side::A, 10, 0.0);
        let terms: Vec<&str> = for_a.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["a-only", "lean-a"]);

        let for_b = top_distinct(&rows, Side::B, 10, 0.0);
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].term, "b-only");

        assert_eq!(top_distinct(&rows, Side::A, 1, 0.0).len(), 1);
        assert!(top_distinct(&rows, Side::B, 10, 2.0).is_empty());
    }

    #[test]
    fn shared_ranks_by_combined_rate() {
        let a = df(&[("both", 1), ("a-only", 9)]);
        let b = df(&[("both", 1), ("b-only", 1)]);
        let rows = compute_enrichment(&a, &b, 1.0, 1.0);

        let shared = top_shared(&rows, DEFAULT_SHARED_LIMIT);
        let terms: Vec<&str> = shared.iter().map(|r| r.term.as_str()).collect();
        assert_eq!(terms, vec!["a-only", "both", "b-only"]);

        assert_eq!(top_shared(&rows, 1).len(), 1);
    }
}
