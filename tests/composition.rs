// Composition tests — verifying that the pure stages chain together.
//
// These tests exercise the data flow between modules:
//   CSV text -> normalization -> ComparisonReport -> markdown / JSON
// without any network calls. Report files are written to a temp dir.

use tandem::analysis::filter::DEFAULT_TYPES;
use tandem::config::CompareDefaults;
use tandem::embedding::EmbeddingOutcome;
use tandem::output::markdown::{generate_report, render_report, write_json};
use tandem::pipeline::compare::ComparisonReport;
use tandem::records::models::Side;
use tandem::records::publications::{normalize_publications, PublicationColumns};
use tandem::records::roster::{normalize_roster, RosterColumns};
use tandem::session::QueryParams;
use tandem::sources::csv_table::parse_csv;
use tandem::sources::loader::InstitutionData;

const ROSTER_A: &str = "\
OpenAlexID,Display_name,Appointment
https://openalex.org/A1,Ada Lovelace,Full-time
https://openalex.org/A2,Alan Turing,Full-time
https://openalex.org/A3,Grace Hopper,Part-time
";

const ROSTER_B: &str = "\
OpenAlexID,Display_name,Appointment
https://openalex.org/B1,Barbara Liskov,Full-time
https://openalex.org/B2,Rosalind Franklin,full time
";

const PUBS_A: &str = "\
id,publication_year,type,authorships__author__id,primary_topic__display_name,concepts_list,display_name,cited_by_count
https://openalex.org/W1,2022,journal-article,https://openalex.org/A1|https://openalex.org/B1,Virology,Biology;Virus,Joint paper,10
https://openalex.org/W2,2023,article,https://openalex.org/A2,Computation,Mathematics,Solo A,3
https://openalex.org/W3,2023,article,https://openalex.org/A3|https://openalex.org/A2,Compilers,Computer science,Team A,1
https://openalex.org/W9,2015,article,https://openalex.org/A1,Old topic,History,Too old,0
";

const PUBS_B: &str = "\
id,publication_year,type,authorships__author__id,primary_topic__display_name,concepts_list,display_name,cited_by_count
https://openalex.org/W1,2022,article,https://openalex.org/B1,Virology,Biology,Joint paper,10
https://openalex.org/W4,2024,review-article,https://openalex.org/B2,Crystallography,Chemistry,Solo B,5
https://openalex.org/W5,2024,dataset,https://openalex.org/B2,Crystallography,Chemistry,A dataset,0
";

fn package(key: &str, label: &str, roster: &str, pubs: &str) -> InstitutionData {
    let roster_rows = parse_csv(roster.as_bytes()).unwrap();
    let pub_rows = parse_csv(pubs.as_bytes()).unwrap();
    InstitutionData {
        key: key.to_string(),
        label: label.to_string(),
        color: None,
        roster: normalize_roster(&roster_rows, &RosterColumns::default(), Side::A),
        publications: normalize_publications(&pub_rows, &PublicationColumns::default()),
        per_author: Vec::new(),
        per_author_issue: None,
    }
}

fn params() -> QueryParams {
    let mut p = QueryParams::from_defaults(&CompareDefaults {
        a: "north".to_string(),
        b: "south".to_string(),
        year_min: 2021,
        year_max: 2025,
    });
    p.per_capita = true;
    p.seed = Some(17);
    p
}

// ============================================================
// Chain: CSV -> normalize -> report
// ============================================================

#[test]
fn report_combines_every_stage() {
    let a = package("north", "North", ROSTER_A, PUBS_A);
    let b = package("south", "South", ROSTER_B, PUBS_B);
    let report = ComparisonReport::compute(&a, &b, &params());

    // Full-time only: A1, A2 at North; both South authors match.
    assert_eq!(report.a.headcount, 2);
    assert_eq!(report.b.headcount, 2);

    // W9 is outside the window, W5 is a dataset.
    assert_eq!(report.a.publications, 3);
    assert_eq!(report.b.publications, 2);

    assert_eq!(report.cross.joint_publications, 1);
    assert_eq!(report.cross.pairs, 1);
    assert_eq!(report.cross.top_pairs, "Ada Lovelace \u{2194} Barbara Liskov (1)");

    let bar_2022 = report.a.year_bars.iter().find(|b| b.year == 2022).unwrap();
    assert!((bar_2022.value - 0.5).abs() < 1e-12);
    assert_eq!(report.a.year_bars.len(), 5);

    assert!(report.shared.iter().any(|r| r.term == "virology"));
    assert!(report.distinct_b.iter().any(|r| r.term == "crystallography"));
    assert!(report.overlap > 0.0 && report.overlap < 1.0);

    match &report.embedding {
        EmbeddingOutcome::Computed(result) => {
            assert_eq!(result.count_a, 3);
            assert_eq!(result.count_b, 2);
        }
        other => panic!("expected an embedding, got {other:?}"),
    }
}

#[test]
fn swapping_sides_swaps_summaries() {
    let a = package("north", "North", ROSTER_A, PUBS_A);
    let b = package("south", "South", ROSTER_B, PUBS_B);
    let forward = ComparisonReport::compute(&a, &b, &params());
    let backward = ComparisonReport::compute(&b, &a, &params().swapped());

    assert_eq!(forward.a.publications, backward.b.publications);
    assert_eq!(forward.cross.joint_publications, backward.cross.joint_publications);
    assert!((forward.overlap - backward.overlap).abs() < 1e-12);
}

#[test]
fn type_filter_toggle_keeps_datasets() {
    let a = package("north", "North", ROSTER_A, PUBS_A);
    let b = package("south", "South", ROSTER_B, PUBS_B);
    let mut p = params();
    p.normalize_types = false;
    let report = ComparisonReport::compute(&a, &b, &p);
    assert_eq!(report.b.publications, 3);
    assert!(!DEFAULT_TYPES.contains(&"dataset"));
}

// ============================================================
// Chain: report -> markdown / JSON files
// ============================================================

#[test]
fn markdown_and_json_reports_are_written() {
    let a = package("north", "North", ROSTER_A, PUBS_A);
    let b = package("south", "South", ROSTER_B, PUBS_B);
    let report = ComparisonReport::compute(&a, &b, &params());

    let md = render_report(&report);
    assert!(md.starts_with("# North vs South"));
    assert!(md.contains("| Headcount | 2 | 2 |"));
    assert!(md.contains("Joint publications: **1**"));
    assert!(md.contains("### Shared"));

    let dir = tempfile::tempdir().unwrap();
    let md_path = dir.path().join("reports/north-vs-south.md");
    let written = generate_report(&report, &md_path).unwrap();
    assert!(std::path::Path::new(&written).exists());

    let json_path = dir.path().join("north-vs-south.json");
    write_json(&report, &json_path).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed["a"]["label"], "North");
    assert_eq!(parsed["embedding"]["status"], "computed");
    assert_eq!(parsed["params"]["term_source"], "topics");
}
