// Markdown and JSON report files.
//
// The markdown report mirrors the terminal report as tables so it can be
// pasted into a document or pull request. The JSON report is the full
// serialized `ComparisonReport`, embedding coordinates included.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::analysis::terms::EnrichmentRow;
use crate::embedding::EmbeddingOutcome;
use crate::pipeline::compare::ComparisonReport;

/// Render a report as a markdown document.
pub fn render_report(report: &ComparisonReport) -> String {
    let (a, b) = (&report.a, &report.b);
    let p = &report.params;
    let mut md = String::new();

    let _ = writeln!(md, "# {} vs {}\n", a.label, b.label);
    let _ = writeln!(
        md,
        "*Generated {}. Years {}–{}, terms: {}, per-capita: {}, full-time only: {}, types: {}.*\n",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        p.year_min,
        p.year_max,
        p.term_source,
        yes_no(p.per_capita),
        yes_no(p.full_time_only),
        if p.normalize_types { "default" } else { "all" },
    );

    let _ = writeln!(md, "## Overview\n");
    let _ = writeln!(md, "| | {} | {} |", a.label, b.label);
    let _ = writeln!(md, "|---|---:|---:|");
    let _ = writeln!(md, "| Headcount | {} | {} |", a.headcount, b.headcount);
    let _ = writeln!(md, "| Publications | {} | {} |", a.publications, b.publications);
    let _ = writeln!(md, "| Distinct terms | {} | {} |\n", a.vocabulary, b.vocabulary);
    for issue in [a, b].into_iter().filter_map(|s| s.per_author_issue.as_deref()) {
        let _ = writeln!(md, "> Note: {issue}; embedding uses deduplicated publications.\n");
    }

    let unit = if p.per_capita { " (per capita)" } else { "" };
    let _ = writeln!(md, "## Publications by year{unit}\n");
    let _ = writeln!(md, "| Year | {} | {} |", a.label, b.label);
    let _ = writeln!(md, "|---|---:|---:|");
    for (bar_a, bar_b) in a.year_bars.iter().zip(&b.year_bars) {
        let _ = writeln!(md, "| {} | {:.2} | {:.2} |", bar_a.year, bar_a.value, bar_b.value);
    }
    md.push('\n');

    let _ = writeln!(md, "## Cross-institution collaboration\n");
    let _ = writeln!(md, "- Joint publications: **{}**", report.cross.joint_publications);
    let _ = writeln!(md, "- Collaborating pairs: {}", report.cross.pairs);
    let _ = writeln!(
        md,
        "- Authors involved: {} ({}), {} ({})",
        report.cross.authors_a, a.label, report.cross.authors_b, b.label
    );
    let _ = writeln!(md, "- Top pairs: {}\n", report.cross.top_pairs);

    if !report.graph.pairs.is_empty() {
        let _ = writeln!(md, "| {} | {} | Joint |", a.label, b.label);
        let _ = writeln!(md, "|---|---|---:|");
        for pair in &report.graph.pairs {
            let _ = writeln!(
                md,
                "| {} | {} | {} |",
                escape_cell(report.graph.name_of(&pair.author_a)),
                escape_cell(report.graph.name_of(&pair.author_b)),
                pair.joint_publication_count
            );
        }
        md.push('\n');
    }

    let _ = writeln!(md, "## Research focus\n");
    let _ = writeln!(md, "Term overlap (Jaccard): **{:.2}**\n", report.overlap);
    enrichment_table(&mut md, &format!("More {}", a.label), &report.distinct_a);
    enrichment_table(&mut md, &format!("More {}", b.label), &report.distinct_b);
    enrichment_table(&mut md, "Shared", &report.shared);

    let _ = writeln!(md, "## Author embedding\n");
    match &report.embedding {
        EmbeddingOutcome::Computed(result) => {
            let _ = writeln!(
                md,
                "{} over {} authors ({} / {}) and {} terms. Coordinates are in the JSON report.\n",
                result.method.to_string().to_uppercase(),
                result.points.len(),
                result.count_a,
                result.count_b,
                result.vocabulary_size
            );
        }
        EmbeddingOutcome::InsufficientData { authors } => {
            let _ = writeln!(md, "Not enough authors to embed ({authors} found).\n");
        }
    }

    md
}

fn enrichment_table(md: &mut String, title: &str, rows: &[EnrichmentRow]) {
    let _ = writeln!(md, "### {title}\n");
    if rows.is_empty() {
        let _ = writeln!(md, "\u{2014}\n");
        return;
    }
    let _ = writeln!(md, "| Term | A | B | log2 FC |");
    let _ = writeln!(md, "|---|---:|---:|---:|");
    for row in rows {
        let _ = writeln!(
            md,
            "| {} | {:.2} | {:.2} | {:+.2} |",
            escape_cell(&row.term),
            row.per_capita_a,
            row.per_capita_b,
            row.log2_fold_change
        );
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

/// Write the markdown report to `output_path`, creating parent directories.
/// Returns the path written.
pub fn generate_report(report: &ComparisonReport, output_path: &Path) -> Result<String> {
    ensure_parent(output_path)?;
    std::fs::write(output_path, render_report(report))
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(output_path.display().to_string())
}

/// Write the report as pretty JSON to `output_path`.
pub fn write_json(report: &ComparisonReport, output_path: &Path) -> Result<String> {
    ensure_parent(output_path)?;
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    Ok(output_path.display().to_string())
}
