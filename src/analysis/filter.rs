// Roster-scoped filtering and headcount denominators.
//
// A publication "belongs" to an institution for this comparison when at
// least one of its authors is on that institution's roster. Membership is
// always checked on canonical ids, never raw cells.

use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::records::models::{Author, Publication};

/// Lowest year accepted by the window.
pub const YEAR_FLOOR: i32 = 1990;
/// Highest year accepted by the window.
pub const YEAR_CEILING: i32 = 2100;
/// Default lower bound of the year window.
pub const DEFAULT_YEAR_MIN: i32 = 2021;
/// Default upper bound of the year window.
pub const DEFAULT_YEAR_MAX: i32 = 2025;

/// Publication types kept when type normalization is enabled.
pub const DEFAULT_TYPES: [&str; 4] = ["article", "review", "book", "book-chapter"];

/// What `headcount` falls back to when the full-time filter matches nobody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadcountFallback {
    /// Use the full roster size.
    TotalRoster,
    /// Report zero; `per_capita_scale` then divides by 1 (raw counts).
    RawCounts,
}

/// Policy applied by `headcount` when no appointment matches full-time.
pub const HEADCOUNT_FALLBACK: HeadcountFallback = HeadcountFallback::TotalRoster;

static FULL_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^full\s*-?\s*time").expect("valid regex"));

/// The default allowed type set as owned strings.
pub fn default_types() -> BTreeSet<String> {
    DEFAULT_TYPES.iter().map(|t| t.to_string()).collect()
}

/// Clamp a raw year bound into `[YEAR_FLOOR, YEAR_CEILING]`.
///
/// Zero, NaN and infinities are treated as "not supplied" and yield
/// `default`, mirroring how an empty year box behaves.
pub fn clamp_year(raw: f64, default: i32) -> i32 {
    if !raw.is_finite() || raw == 0.0 {
        return default;
    }
    (raw.round() as i64).clamp(YEAR_FLOOR as i64, YEAR_CEILING as i64) as i32
}

/// Whether an appointment string denotes a full-time position.
pub fn is_full_time(appointment: &str) -> bool {
    FULL_TIME.is_match(appointment.trim())
}

/// Number of authors used as the per-capita denominator.
///
/// With `full_time_only`, counts full-time appointments; if that is zero the
/// `HEADCOUNT_FALLBACK` policy applies.
pub fn headcount(roster: &[Author], full_time_only: bool) -> usize {
    if !full_time_only {
        return roster.len();
    }
    let full_time = roster
        .iter()
        .filter(|a| is_full_time(&a.appointment_type))
        .count();
    match (full_time, HEADCOUNT_FALLBACK) {
        (0, HeadcountFallback::TotalRoster) => roster.len(),
        (n, _) => n,
    }
}

/// Divisor for per-capita rates. Never zero: an empty headcount yields 1,
/// so rates fall back to raw counts.
pub fn per_capita_scale(headcount: usize) -> f64 {
    if headcount == 0 {
        1.0
    } else {
        headcount as f64
    }
}

/// Canonical-id membership set for a roster. Empty ids are never members.
pub fn roster_ids(roster: &[Author]) -> HashSet<&str> {
    roster
        .iter()
        .map(|a| a.id.as_str())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Keep publications inside the year window, of an allowed type, with at
/// least one author on the roster.
pub fn filter_to_roster(
    publications: &[Publication],
    roster: &[Author],
    year_min: i32,
    year_max: i32,
    allowed_types: Option<&BTreeSet<String>>,
) -> Vec<Publication> {
    let members = roster_ids(roster);

    publications
        .iter()
        .filter(|p| p.year >= year_min && p.year <= year_max)
        .filter(|p| allowed_types.map_or(true, |types| types.contains(&p.pub_type)))
        .filter(|p| p.author_ids.iter().any(|id| members.contains(id.as_str())))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::models::Side;

    fn author(id: &str, appointment: &str) -> Author {
        Author {
            id: id.to_string(),
            display_name: id.to_string(),
            appointment_type: appointment.to_string(),
            category: String::new(),
            level: String::new(),
            institution: Side::A,
        }
    }

    fn publication(year: i32, pub_type: &str, authors: &[&str]) -> Publication {
        Publication {
            work_id: None,
            year,
            pub_type: pub_type.to_string(),
            author_ids: authors.iter().map(|a| a.to_string()).collect(),
            topic_terms: Default::default(),
            concept_terms: Default::default(),
            title: String::new(),
            doi: String::new(),
            cited_by_count: 0,
        }
    }

    #[test]
    fn clamp_year_bounds_and_defaults() {
        assert_eq!(clamp_year(2022.0, 2021), 2022);
        assert_eq!(clamp_year(1800.0, 2021), 1990);
        assert_eq!(clamp_year(3000.0, 2021), 2100);
        assert_eq!(clamp_year(0.0, 2021), 2021);
        assert_eq!(clamp_year(f64::NAN, 2025), 2025);
        assert_eq!(clamp_year(f64::INFINITY, 2021), 2021);
    }

    #[test]
    fn full_time_matching() {
        assert!(is_full_time("Full-time"));
        assert!(is_full_time("full time faculty"));
        assert!(is_full_time("FULLTIME"));
        assert!(!is_full_time("Part-time"));
        assert!(!is_full_time("Adjunct (full-time equivalent)"));
    }

    #[test]
    fn headcount_counts_full_time() {
        let roster = vec![author("a1", "Full-time"), author("a2", "Part-time")];
        assert_eq!(headcount(&roster, true), 1);
        assert_eq!(headcount(&roster, false), 2);
    }

    #[test]
    fn headcount_falls_back_to_roster_size() {
        let roster = vec![author("a1", ""), author("a2", "Adjunct")];
        assert_eq!(headcount(&roster, true), 2);
    }

    #[test]
    fn empty_roster_scale_is_one() {
        assert_eq!(headcount(&[], true), 0);
        assert_eq!(per_capita_scale(headcount(&[], true)), 1.0);
        assert_eq!(per_capita_scale(4), 4.0);
    }

    #[test]
    fn filter_applies_window_type_and_membership() {
        let roster = vec![author("a1", "Full-time")];
        let pubs = vec![
            publication(2022, "article", &["a1"]),
            publication(2019, "article", &["a1"]),
            publication(2022, "dataset", &["a1"]),
            publication(2022, "article", &["zz"]),
            publication(2022, "article", &[]),
        ];
        let types = default_types();
        let kept = filter_to_roster(&pubs, &roster, 2021, 2023, Some(&types));
        assert_eq!(kept.len(), 1);

        let any_type = filter_to_roster(&pubs, &roster, 2021, 2023, None);
        assert_eq!(any_type.len(), 2);
    }
}
