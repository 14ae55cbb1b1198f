// Publications-by-year series, optionally per capita.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::records::models::Publication;

/// One bar of the year chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBar {
    pub year: i32,
    /// Raw number of publications in that year.
    pub count: usize,
    /// `count / scale`
    pub value: f64,
}

/// Count publications per year across `[year_min, year_max]`, dividing by
/// `scale` (a scale of 0 or below is treated as 1). Every year in the window
/// gets a bar, including empty ones.
pub fn publications_by_year(
    publications: &[Publication],
    year_min: i32,
    year_max: i32,
    scale: f64,
) -> Vec<YearBar> {
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let mut counts: HashMap<i32, usize> = HashMap::new();
    for p in publications {
        *counts.entry(p.year).or_insert(0) += 1;
    }

    (year_min..=year_max)
        .map(|year| {
            let count = counts.get(&year).copied().unwrap_or(0);
            YearBar {
                year,
                count,
                value: count as f64 / scale,
            }
        })
        .collect()
}
