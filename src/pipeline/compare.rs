// Comparison pipeline — one full recompute for a parameter set.
//
// Pure and synchronous: takes two loaded packages and the query, returns
// every derived structure in one report. The session runs this on a
// blocking thread so the explore loop stays responsive.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analysis::filter::{filter_to_roster, headcount, per_capita_scale};
use crate::analysis::graph::{build_cross_institution_graph, CrossInstitutionGraph};
use crate::analysis::terms::{
    compute_enrichment, overlap, term_document_frequency, top_distinct, top_shared,
    EnrichmentRow, DEFAULT_DISTINCT_LIMIT, DEFAULT_SHARED_LIMIT,
};
use crate::analysis::trends::{publications_by_year, YearBar};
use crate::config::{DEFAULT_COLOR_A, DEFAULT_COLOR_B};
use crate::embedding::{author_term_sets, compute_embedding, EmbeddingOptions, EmbeddingOutcome};
use crate::records::models::Side;
use crate::session::QueryParams;
use crate::sources::loader::InstitutionData;

/// How many pairs the one-line pair summary shows.
pub const PAIR_SUMMARY_LIMIT: usize = 8;

/// Per-institution figures.
#[derive(Debug, Clone, Serialize)]
pub struct InstitutionSummary {
    pub key: String,
    pub label: String,
    pub color: String,
    /// Per-capita denominator.
    pub headcount: usize,
    /// What counts were divided by (1.0 unless per-capita is on).
    pub scale: f64,
    /// Publications left after roster, window and type filtering.
    pub publications: usize,
    pub year_bars: Vec<YearBar>,
    /// Distinct terms used.
    pub vocabulary: usize,
    /// Set when the per-author export failed and embeddings fell back to
    /// the deduplicated publications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_author_issue: Option<String>,
}

/// Cross-institution headline numbers.
#[derive(Debug, Clone, Serialize)]
pub struct CrossSummary {
    pub joint_publications: usize,
    pub pairs: usize,
    pub authors_a: usize,
    pub authors_b: usize,
    pub top_pairs: String,
}

/// Everything derived for one parameter set.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub params: QueryParams,
    pub a: InstitutionSummary,
    pub b: InstitutionSummary,
    pub cross: CrossSummary,
    pub graph: CrossInstitutionGraph,
    /// Jaccard overlap of the two term vocabularies.
    pub overlap: f64,
    pub distinct_a: Vec<EnrichmentRow>,
    pub distinct_b: Vec<EnrichmentRow>,
    pub shared: Vec<EnrichmentRow>,
    pub embedding: EmbeddingOutcome,
}

impl ComparisonReport {
    /// Run every analysis for `params` over two loaded packages.
    pub fn compute(a: &InstitutionData, b: &InstitutionData, params: &QueryParams) -> Self {
        let roster_a = a.roster_for(Side::A);
        let roster_b = b.roster_for(Side::B);
        let types = params.allowed_types();

        let headcount_a = headcount(&roster_a, params.full_time_only);
        let headcount_b = headcount(&roster_b, params.full_time_only);
        let (scale_a, scale_b) = if params.per_capita {
            (per_capita_scale(headcount_a), per_capita_scale(headcount_b))
        } else {
            (1.0, 1.0)
        };

        let (year_min, year_max) = (params.year_min, params.year_max);
        let filtered_a = filter_to_roster(&a.publications, &roster_a, year_min, year_max, types.as_ref());
        let filtered_b = filter_to_roster(&b.publications, &roster_b, year_min, year_max, types.as_ref());

        let graph = build_cross_institution_graph(&filtered_a, &filtered_b, &roster_a, &roster_b);
        let cross = CrossSummary {
            joint_publications: graph.work_count(),
            pairs: graph.pairs.len(),
            authors_a: graph.nodes.iter().filter(|n| n.institution == Side::A).count(),
            authors_b: graph.nodes.iter().filter(|n| n.institution == Side::B).count(),
            top_pairs: graph.pair_summary(PAIR_SUMMARY_LIMIT),
        };

        let df_a = term_document_frequency(&filtered_a, params.term_source);
        let df_b = term_document_frequency(&filtered_b, params.term_source);
        let rows = compute_enrichment(&df_a, &df_b, scale_a, scale_b);

        // Author term sets follow the year window only, never the type toggle.
        let embed_a = filter_to_roster(a.embedding_publications(), &roster_a, year_min, year_max, None);
        let embed_b = filter_to_roster(b.embedding_publications(), &roster_b, year_min, year_max, None);
        let embedding = compute_embedding(
            &author_term_sets(&embed_a, &roster_a, params.term_source),
            &author_term_sets(&embed_b, &roster_b, params.term_source),
            &EmbeddingOptions {
                method: params.method,
                seed: params.seed,
            },
        );

        info!(
            a = %a.key,
            b = %b.key,
            publications_a = filtered_a.len(),
            publications_b = filtered_b.len(),
            joint = cross.joint_publications,
            "Comparison computed"
        );

        Self {
            generated_at: Utc::now(),
            params: params.clone(),
            a: InstitutionSummary {
                key: a.key.clone(),
                label: a.label.clone(),
                color: a.color.clone().unwrap_or_else(|| DEFAULT_COLOR_A.to_string()),
                headcount: headcount_a,
                scale: scale_a,
                publications: filtered_a.len(),
                year_bars: publications_by_year(&filtered_a, year_min, year_max, scale_a),
                vocabulary: df_a.len(),
                per_author_issue: a.per_author_issue.as_ref().map(|e| e.to_string()),
            },
            b: InstitutionSummary {
                key: b.key.clone(),
                label: b.label.clone(),
                color: b.color.clone().unwrap_or_else(|| DEFAULT_COLOR_B.to_string()),
                headcount: headcount_b,
                scale: scale_b,
                publications: filtered_b.len(),
                year_bars: publications_by_year(&filtered_b, year_min, year_max, scale_b),
                vocabulary: df_b.len(),
                per_author_issue: b.per_author_issue.as_ref().map(|e| e.to_string()),
            },
            cross,
            graph,
            overlap: overlap(&df_a, &df_b),
            distinct_a: top_distinct(&rows, Side::A, DEFAULT_DISTINCT_LIMIT, 0.0),
            distinct_b: top_distinct(&rows, Side::B, DEFAULT_DISTINCT_LIMIT, 0.0),
            shared: top_shared(&rows, DEFAULT_SHARED_LIMIT),
            embedding,
        }
    }
}
