// Colored terminal output for comparison reports.
//
// This module handles all terminal-specific formatting: colors, tables,
// text bar charts. The CLI and the explore loop delegate here.

use colored::Colorize;

use crate::analysis::graph::{CrossInstitutionGraph, CrossInstitutionPair};
use crate::analysis::terms::EnrichmentRow;
use crate::analysis::trends::YearBar;
use crate::config::CompareConfig;
use crate::embedding::highlight::StyleOverlay;
use crate::embedding::{EmbeddingOutcome, EmbeddingResult};
use crate::pipeline::compare::ComparisonReport;
use crate::records::models::Side;
use crate::session::QueryParams;

/// Width of the longest bar in the year chart.
const BAR_WIDTH: usize = 30;

/// List configured institutions and the default selection.
pub fn display_institutions(config: &CompareConfig) {
    println!("\n{}", "=== Institutions ===".bold());
    println!();
    for (key, institution) in config.institutions() {
        let per_author = if institution.per_author.is_some() {
            "per-author".green().to_string()
        } else {
            "dedup only".dimmed().to_string()
        };
        println!("  {:<16} {:<36} {}", key.bold(), institution.label, per_author);
    }
    let d = &config.defaults;
    println!(
        "\n  Defaults: {} vs {}, {}–{}",
        d.a.cyan(),
        d.b.cyan(),
        d.year_min,
        d.year_max
    );
}

/// Show the current query parameters.
pub fn display_params(params: &QueryParams) {
    println!(
        "  {} vs {} | {}–{} | per-capita: {} | full-time only: {} | terms: {} | types: {} | method: {} | seed: {}",
        params.a.bold(),
        params.b.bold(),
        params.year_min,
        params.year_max,
        on_off(params.per_capita),
        on_off(params.full_time_only),
        params.term_source,
        if params.normalize_types { "default" } else { "all" },
        params.method,
        params
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "random".to_string()),
    );
}

fn on_off(flag: bool) -> colored::ColoredString {
    if flag {
        "on".green()
    } else {
        "off".dimmed()
    }
}

/// Display a full comparison report.
pub fn display_report(report: &ComparisonReport) {
    let (a, b) = (&report.a, &report.b);
    println!(
        "\n{}",
        format!("=== {} vs {} ===", a.label, b.label).bold()
    );
    display_params(&report.params);
    println!();

    println!(
        "  {:<28} {:>10} {:>14}",
        "".dimmed(),
        "Headcount".dimmed(),
        "Publications".dimmed()
    );
    for summary in [a, b] {
        println!(
            "  {:<28} {:>10} {:>14}",
            super::truncate_chars(&summary.label, 28),
            summary.headcount,
            summary.publications
        );
    }
    for issue in [a, b].into_iter().filter_map(|s| s.per_author_issue.as_deref()) {
        println!("  {}", format!("{issue}; embedding uses deduplicated publications").yellow());
    }

    display_year_bars(&a.label, &a.year_bars, &b.label, &b.year_bars, report.params.per_capita);

    println!("\n{}", "--- Cross-institution collaboration ---".bold());
    println!(
        "  Joint publications: {}   Pairs: {}   Authors: {} / {}",
        report.cross.joint_publications.to_string().cyan(),
        report.cross.pairs,
        report.cross.authors_a,
        report.cross.authors_b
    );
    println!("  Top pairs: {}", report.cross.top_pairs);

    println!("\n{}", "--- Research focus ---".bold());
    println!(
        "  Term overlap (Jaccard, {}): {:.2}",
        report.params.term_source,
        report.overlap
    );
    display_enrichment(&format!("More {}", a.label), &report.distinct_a);
    display_enrichment(&format!("More {}", b.label), &report.distinct_b);
    display_enrichment("Shared", &report.shared);

    println!("\n{}", "--- Author embedding ---".bold());
    match &report.embedding {
        EmbeddingOutcome::Computed(result) => println!(
            "  {}: {} authors ({} / {}), {} terms",
            result.method.to_string().to_uppercase(),
            result.points.len(),
            result.count_a,
            result.count_b,
            result.vocabulary_size
        ),
        EmbeddingOutcome::InsufficientData { authors } => println!(
            "  {}",
            format!("Not enough authors to embed ({authors} found, need 3).").yellow()
        ),
    }
    println!();
}

fn display_year_bars(label_a: &str, bars_a: &[YearBar], label_b: &str, bars_b: &[YearBar], per_capita: bool) {
    if bars_a.is_empty() {
        return;
    }
    let unit = if per_capita { "per capita" } else { "publications" };
    println!("\n{}", format!("--- Publications by year ({unit}) ---").bold());
    println!("  {} {}   {} {}", "■".blue(), label_a, "■".green(), label_b);

    let max = bars_a
        .iter()
        .chain(bars_b)
        .map(|bar| bar.value)
        .fold(0.0_f64, f64::max);

    for (bar_a, bar_b) in bars_a.iter().zip(bars_b) {
        println!(
            "  {}  {} {}",
            bar_a.year,
            bar(bar_a.value, max).blue(),
            format_value(bar_a.value, per_capita)
        );
        println!(
            "        {} {}",
            bar(bar_b.value, max).green(),
            format_value(bar_b.value, per_capita)
        );
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len)
}

fn format_value(value: f64, per_capita: bool) -> String {
    if per_capita {
        format!("{value:.2}")
    } else {
        format!("{value:.0}")
    }
}

fn display_enrichment(title: &str, rows: &[EnrichmentRow]) {
    println!("\n  {}", title.underline());
    if rows.is_empty() {
        println!("    {}", "\u{2014}".dimmed());
        return;
    }
    for row in rows {
        println!(
            "    {:<44} {:>7.2} {:>7.2}  {}",
            super::truncate_chars(&row.term, 44),
            row.per_capita_a,
            row.per_capita_b,
            colorize_fold_change(row.log2_fold_change)
        );
    }
}

/// Colorize a log2 fold-change by which side it favors.
fn colorize_fold_change(value: f64) -> colored::ColoredString {
    let text = if value.abs() >= 20.0 {
        // One side has no publications with the term.
        if value > 0.0 { "only A".to_string() } else { "only B".to_string() }
    } else {
        format!("{value:+.2}")
    };
    if value > 0.0 {
        text.blue()
    } else if value < 0.0 {
        text.green()
    } else {
        text.dimmed()
    }
}

/// Ranked list of collaborating pairs.
pub fn display_pairs(graph: &CrossInstitutionGraph, limit: usize) {
    if graph.pairs.is_empty() {
        println!("No cross-institution co-authorship in this window.");
        return;
    }
    println!(
        "\n{}",
        format!("=== Collaborating pairs ({} total) ===", graph.pairs.len()).bold()
    );
    println!();
    for (i, pair) in graph.pairs.iter().take(limit).enumerate() {
        println!(
            "  {:>4}. {:<30} \u{2194} {:<30} {:>4}",
            i + 1,
            super::truncate_chars(graph.name_of(&pair.author_a), 30),
            super::truncate_chars(graph.name_of(&pair.author_b), 30),
            pair.joint_publication_count
        );
    }
}

/// Joint publications for one pair, newest first.
pub fn display_pair_works(graph: &CrossInstitutionGraph, pair: &CrossInstitutionPair) {
    println!(
        "\n{}",
        format!(
            "=== {} \u{2194} {} ({} joint) ===",
            graph.name_of(&pair.author_a),
            graph.name_of(&pair.author_b),
            pair.joint_publication_count
        )
        .bold()
    );
    let works = graph.works_for_pair(pair);
    if works.is_empty() {
        println!("  {}", "No titles available.".dimmed());
        return;
    }
    for work in works {
        let title = if work.title.is_empty() { "(untitled)" } else { work.title.as_str() };
        println!(
            "  {}  {}  {}",
            work.year,
            super::truncate_chars(title, 90),
            format!("[{} cites]", work.cited_by_count).dimmed()
        );
    }
}

/// Matched authors for a search over the last embedding.
pub fn display_search(embedding: &EmbeddingResult, overlay: &StyleOverlay) {
    if overlay.query.is_empty() {
        println!("  {}", "Search cleared.".dimmed());
        return;
    }
    println!(
        "  {} match(es) for \"{}\"",
        overlay.match_count().to_string().bold(),
        overlay.query
    );
    for i in overlay.matched_indices() {
        let point = &embedding.points[i];
        let side = match point.institution {
            Side::A => "A".blue(),
            Side::B => "B".green(),
        };
        println!("    [{}] {:<36} ({:+.3}, {:+.3})", side, point.label, point.x, point.y);
    }
}
