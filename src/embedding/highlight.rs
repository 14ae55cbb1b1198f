// Search highlighting over an existing embedding.
//
// Highlighting only restyles points. Coordinates are never touched, so a
// search can run on every keystroke without recomputing the projection.

use serde::{Deserialize, Serialize};

use super::EmbeddingResult;

pub const BASE_SIZE: f64 = 9.0;
pub const BASE_OPACITY: f64 = 0.55;
pub const HIGHLIGHT_SIZE: f64 = 15.0;
pub const HIGHLIGHT_OPACITY: f64 = 1.0;
pub const HIGHLIGHT_OUTLINE: f64 = 2.5;
pub const MUTED_OPACITY: f64 = 0.15;
pub const MUTED_SIZE_FACTOR: f64 = 0.8;
pub const MUTED_MIN_SIZE: f64 = 6.0;

/// Marker style for one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointStyle {
    pub size: f64,
    pub opacity: f64,
    pub outline_width: f64,
    pub matched: bool,
}

impl PointStyle {
    pub fn base() -> Self {
        Self {
            size: BASE_SIZE,
            opacity: BASE_OPACITY,
            outline_width: 0.0,
            matched: false,
        }
    }

    pub fn highlighted() -> Self {
        Self {
            size: HIGHLIGHT_SIZE,
            opacity: HIGHLIGHT_OPACITY,
            outline_width: HIGHLIGHT_OUTLINE,
            matched: true,
        }
    }

    pub fn muted() -> Self {
        Self {
            size: (BASE_SIZE * MUTED_SIZE_FACTOR).max(MUTED_MIN_SIZE),
            opacity: MUTED_OPACITY,
            outline_width: 0.0,
            matched: false,
        }
    }
}

/// Per-point styles, parallel to `EmbeddingResult::points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleOverlay {
    pub query: String,
    pub styles: Vec<PointStyle>,
}

impl StyleOverlay {
    pub fn match_count(&self) -> usize {
        self.styles.iter().filter(|s| s.matched).count()
    }

    /// Indices of matched points.
    pub fn matched_indices(&self) -> Vec<usize> {
        self.styles
            .iter()
            .enumerate()
            .filter(|(_, s)| s.matched)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Style every point against a case-insensitive substring query on its
/// label. An empty (or whitespace-only) query restores base styling.
pub fn highlight(embedding: &EmbeddingResult, query: &str) -> StyleOverlay {
    let needle = query.trim().to_lowercase();

    let styles = embedding
        .points
        .iter()
        .map(|point| {
            if needle.is_empty() {
                PointStyle::base()
            } else if point.label.to_lowercase().contains(&needle) {
                PointStyle::highlighted()
            } else {
                PointStyle::muted()
            }
        })
        .collect();

    StyleOverlay {
        query: query.trim().to_string(),
        styles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muted_size_respects_floor() {
        assert!((PointStyle::muted().size - 7.2).abs() < 1e-12);
        assert!(PointStyle::muted().size >= MUTED_MIN_SIZE);
    }

    #[test]
    fn base_has_no_outline() {
        let s = PointStyle::base();
        assert_eq!(s.outline_width, 0.0);
        assert!(!s.matched);
    }
}
