//! Per-mead summaries of the ratings table.

use crate::table::{Category, TastingRow};
use crate::{TokenCounts, split_tokens};

/// Everything shown on one mead's page.
#[derive(Debug, Clone, PartialEq)]
pub struct MeadSummary {
    pub id: i64,
    /// Raw values of [`Category::SCALES`], one vector per column, in row order.
    pub scales: [(Category, Vec<f64>); 3],
    pub notes: TokenCounts,
    pub off_flavors: TokenCounts,
    /// Remarks in row order then token order, not deduplicated.
    pub other: Vec<String>,
}

impl MeadSummary {
    /// True when there is no text to put in an annotation panel.
    pub fn has_no_text(&self) -> bool {
        self.notes.is_empty() && self.off_flavors.is_empty() && self.other.is_empty()
    }
}

/// Collects the scale columns and the text remarks of all rows with `id`.
///
/// An id without rows gives empty columns and empty text groups.
pub fn summarize(rows: &[TastingRow], id: i64) -> MeadSummary {
    let matching: Vec<&TastingRow> = rows.iter().filter(|row| row.id == id).collect();

    let scales = Category::SCALES.map(|category| {
        let values = matching.iter().map(|row| category.value(row)).collect();
        (category, values)
    });

    let notes = TokenCounts::from_tokens(
        matching
            .iter()
            .flat_map(|row| split_tokens(row.notes.as_deref())),
    );
    let off_flavors = TokenCounts::from_tokens(
        matching
            .iter()
            .flat_map(|row| split_tokens(row.off_flavors.as_deref())),
    );
    let other = matching
        .iter()
        .flat_map(|row| split_tokens(row.other.as_deref()))
        .collect();

    MeadSummary {
        id,
        scales,
        notes,
        off_flavors,
        other,
    }
}

/// Mean with a sample standard deviation (n - 1 denominator).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub mean: f64,
    /// `None` for a single observation.
    pub sd: Option<f64>,
}

impl Estimate {
    /// `None` for an empty column.
    pub fn of(values: &[f64]) -> Option<Estimate> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let sd = (values.len() > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });
        Some(Estimate { mean, sd })
    }
}
