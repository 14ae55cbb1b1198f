// Output formatting — terminal display and report files.

pub mod markdown;
pub mod terminal;

/// Shorten an author name or title to `max_chars` characters for a table
/// column, appending "..." when cut. Counts chars, not bytes.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("Zoë Müller", 3), "Zoë...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
