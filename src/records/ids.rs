// Identifier canonicalization — the single join key across every dataset.
//
// Roster exports carry bare ids ("A5023888391"), publication exports carry
// full URLs ("https://openalex.org/A5023888391" or ".../authors/A50..."), and
// hand-edited rosters carry whatever someone typed. Everything is reduced to
// the bare token here so set membership works across sources.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Known URL prefixes for author ids, stripped case-insensitively.
static AUTHOR_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?openalex\.org/(?:authors/)?").expect("valid regex")
});

/// Known URL prefixes for work ids.
static WORK_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://(?:www\.)?openalex\.org/(?:works/)?").expect("valid regex")
});

/// Known URL prefixes for DOIs.
static DOI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:https?://(?:dx\.)?doi\.org/|doi:)").expect("valid regex")
});

/// Canonicalize a raw author identifier.
///
/// Returns the bare id token, or an empty string when the input is empty or
/// not a recognizable id (e.g. an ORCID URL, or free text with spaces).
/// Case of the remaining token is preserved. Idempotent.
pub fn normalize_id(raw: &str) -> String {
    canonical_token(&AUTHOR_PREFIX, raw)
}

/// Canonicalize a work id / URL the same way author ids are handled.
pub fn normalize_work_id(raw: &str) -> String {
    canonical_token(&WORK_PREFIX, raw)
}

/// Lowercase a DOI and strip resolver prefixes. Empty when nothing remains.
pub fn normalize_doi(raw: &str) -> String {
    let trimmed = raw.trim();
    DOI_PREFIX.replace(trimmed, "").trim().to_lowercase()
}

/// Lowercase a title and collapse internal whitespace.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn canonical_token(prefix: &Regex, raw: &str) -> String {
    let trimmed = raw.trim();
    let stripped = prefix.replace(trimmed, "");
    let token = stripped.trim();
    if is_id_token(token) {
        token.to_string()
    } else {
        String::new()
    }
}

/// A canonical token is non-empty and made only of ASCII alphanumerics,
/// `-`, `_` and `.`; such a token never matches a URL prefix.
fn is_id_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
