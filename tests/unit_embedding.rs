// Embedding tests — author term sets, PCA/MDS projections and search
// highlighting.

use std::collections::BTreeSet;

use tandem::embedding::highlight::{
    highlight, BASE_OPACITY, BASE_SIZE, HIGHLIGHT_OUTLINE, HIGHLIGHT_SIZE, MUTED_OPACITY,
};
use tandem::embedding::mds::distance_matrix;
use tandem::embedding::{
    author_term_sets, compute_embedding, AuthorTermSet, EmbeddingMethod, EmbeddingOptions,
    EmbeddingOutcome, EmbeddingResult,
};
use tandem::records::models::{Author, Publication, Side, TermSource};

fn term_set(id: &str, label: &str, terms: &[&str]) -> AuthorTermSet {
    AuthorTermSet {
        author_id: id.to_string(),
        label: label.to_string(),
        terms: terms.iter().map(|t| t.to_string()).collect(),
    }
}

fn seeded(method: EmbeddingMethod, seed: u64) -> EmbeddingOptions {
    EmbeddingOptions {
        method,
        seed: Some(seed),
    }
}

fn computed(outcome: EmbeddingOutcome) -> EmbeddingResult {
    match outcome {
        EmbeddingOutcome::Computed(result) => result,
        other => panic!("expected an embedding, got {other:?}"),
    }
}

fn sample() -> (Vec<AuthorTermSet>, Vec<AuthorTermSet>) {
    let a = vec![
        term_set("a1", "Ada Lovelace", &["virology", "immunology"]),
        term_set("a2", "Alan Turing", &["computation", "biology"]),
        term_set("a3", "Grace Hopper", &["computation", "compilers"]),
    ];
    let b = vec![
        term_set("b1", "Barbara Liskov", &["compilers", "abstraction"]),
        term_set("b2", "Rosalind Franklin", &["virology", "crystallography"]),
    ];
    (a, b)
}

// ============================================================
// Author term sets
// ============================================================

#[test]
fn term_sets_union_per_roster_author() {
    let roster = vec![Author {
        id: "a1".to_string(),
        display_name: "Ada".to_string(),
        appointment_type: String::new(),
        category: String::new(),
        level: String::new(),
        institution: Side::A,
    }];
    let make = |topics: &[&str], authors: &[&str]| Publication {
        work_id: None,
        year: 2022,
        pub_type: "article".to_string(),
        author_ids: authors.iter().map(|a| a.to_string()).collect(),
        topic_terms: topics.iter().map(|t| t.to_string()).collect(),
        concept_terms: BTreeSet::new(),
        title: String::new(),
        doi: String::new(),
        cited_by_count: 0,
    };
    let pubs = vec![
        make(&["Virology"], &["a1", "stranger"]),
        make(&["immunology"], &["a1"]),
        make(&["ecology"], &["stranger"]),
    ];

    let sets = author_term_sets(&pubs, &roster, TermSource::Topics);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].label, "Ada");
    let terms: Vec<&str> = sets[0].terms.iter().map(String::as_str).collect();
    assert_eq!(terms, vec!["immunology", "virology"]);
}

// ============================================================
// Preconditions and layout
// ============================================================

#[test]
fn fewer_than_three_authors_is_insufficient() {
    let a = vec![term_set("a1", "A", &["x"]), term_set("a2", "B", &["y"])];
    for method in [EmbeddingMethod::Pca, EmbeddingMethod::Mds] {
        let outcome = compute_embedding(&a, &[], &seeded(method, 1));
        assert_eq!(outcome, EmbeddingOutcome::InsufficientData { authors: 2 });
    }
    let outcome = compute_embedding(&[], &[], &EmbeddingOptions::default());
    assert_eq!(outcome, EmbeddingOutcome::InsufficientData { authors: 0 });
}

#[test]
fn a_points_come_before_b_points() {
    let (a, b) = sample();
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Pca, 9)));
    assert_eq!(result.points.len(), 5);
    assert_eq!((result.count_a, result.count_b), (3, 2));
    assert!(result.points[..3].iter().all(|p| p.institution == Side::A));
    assert!(result.points[3..].iter().all(|p| p.institution == Side::B));
    assert_eq!(result.vocabulary_size, 7);
    assert!(result.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
}

#[test]
fn same_seed_same_coordinates() {
    let (a, b) = sample();
    for method in [EmbeddingMethod::Pca, EmbeddingMethod::Mds] {
        let first = computed(compute_embedding(&a, &b, &seeded(method, 42)));
        let second = computed(compute_embedding(&a, &b, &seeded(method, 42)));
        assert_eq!(first, second, "{method} should be reproducible");
    }
}

#[test]
fn mds_preserves_distances_for_planar_configurations() {
    // Jaccard distances 0.5 / 0.5 / 1.0 lie on a line.
    let a = vec![term_set("a1", "One", &["x"]), term_set("a2", "Two", &["x", "y"])];
    let b = vec![term_set("b1", "Three", &["y"])];
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Mds, 3)));

    let sets: Vec<&BTreeSet<String>> = a.iter().chain(&b).map(|s| &s.terms).collect();
    let d = distance_matrix(&sets);
    for i in 0..3 {
        for j in 0..3 {
            let (pi, pj) = (&result.points[i], &result.points[j]);
            let e = ((pi.x - pj.x).powi(2) + (pi.y - pj.y).powi(2)).sqrt();
            assert!((e - d[[i, j]]).abs() < 1e-6);
        }
    }
}

#[test]
fn pca_points_with_identical_terms_coincide() {
    let a = vec![
        term_set("a1", "One", &["x", "y"]),
        term_set("a2", "Two", &["x", "y"]),
    ];
    let b = vec![term_set("b1", "Three", &["z"])];
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Pca, 5)));
    assert!((result.points[0].x - result.points[1].x).abs() < 1e-9);
    assert!((result.points[0].y - result.points[1].y).abs() < 1e-9);
}

// ============================================================
// Highlighting
// ============================================================

#[test]
fn highlight_never_moves_points() {
    let (a, b) = sample();
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Mds, 7)));
    let before: Vec<(f64, f64)> = result.points.iter().map(|p| (p.x, p.y)).collect();

    for query in ["ada", "", "nobody", "  GRACE "] {
        let _ = highlight(&result, query);
    }

    let after: Vec<(f64, f64)> = result.points.iter().map(|p| (p.x, p.y)).collect();
    assert_eq!(before, after);
}

#[test]
fn highlight_styles_matches_and_mutes_the_rest() {
    let (a, b) = sample();
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Pca, 7)));

    let overlay = highlight(&result, "  LOVELACE ");
    assert_eq!(overlay.styles.len(), result.points.len());
    assert_eq!(overlay.match_count(), 1);
    assert_eq!(overlay.matched_indices(), vec![0]);
    assert_eq!(overlay.styles[0].size, HIGHLIGHT_SIZE);
    assert_eq!(overlay.styles[0].outline_width, HIGHLIGHT_OUTLINE);
    assert_eq!(overlay.styles[1].opacity, MUTED_OPACITY);
    assert!((overlay.styles[1].size - 7.2).abs() < 1e-12);
}

#[test]
fn empty_query_restores_base_style() {
    let (a, b) = sample();
    let result = computed(compute_embedding(&a, &b, &seeded(EmbeddingMethod::Pca, 7)));
    let overlay = highlight(&result, "   ");
    assert_eq!(overlay.match_count(), 0);
    assert!(overlay
        .styles
        .iter()
        .all(|s| s.size == BASE_SIZE && s.opacity == BASE_OPACITY && s.outline_width == 0.0));
}
