#![forbid(unsafe_code)]
//! # mead_report
//!
//! Turns mead tasting-score tables into one PDF report per tasting instance.
//!
//! Every instance folder under the instances root holds a ratings table named after the folder
//! and an `id_name_map.csv`. The report contains a title page, one point plot per rated mead
//! (annotated with its tasting notes, off-flavors and other remarks) and one comparison plot per
//! rating category.
//!
//! The crate is split into small layers:
//! - [`split_tokens`] / [`TokenCounts`]: free-text normalization and counting.
//! - [`names`]: id to display-name resolution.
//! - [`table`]: typed CSV loading.
//! - [`aggregate`]: per-mead summaries.
//! - [`figure`]: backend-neutral page composition.
//! - [`pdf`]: drawing figures and paginating them into a document.
//! - [`report`]: the per-instance driver.

use indexmap::IndexMap;

pub mod aggregate;
pub mod error;
pub mod figure;
pub mod names;
pub mod pdf;
pub mod report;
pub mod table;

pub use aggregate::{Estimate, MeadSummary, summarize};
pub use error::ReportError;
pub use figure::{Figure, compose_category, compose_mead, title_page};
pub use names::{IdNameMap, Lookup};
pub use report::{
    FigureBook, InstancePaths, ReportOptions, RunSummary, discover_instances, print_failed_instances,
    render_instance, run,
};
pub use table::{Category, TastingRow, read_name_table, read_tasting_rows};

/// Splits a `;`-delimited free-text field into normalized tokens.
///
/// Whitespace runs inside a token collapse to one space and the ends are trimmed. A missing
/// field (an empty CSV cell) yields no tokens, while an empty string yields one empty token.
///
/// # Example
/// ```
/// use mead_report::split_tokens;
/// assert_eq!(split_tokens(Some("hej;  Hej; haj")), vec!["hej", "Hej", "haj"]);
/// assert!(split_tokens(None).is_empty());
/// ```
pub fn split_tokens(field: Option<&str>) -> Vec<String> {
    match field {
        Some(text) => text
            .split(';')
            .map(|piece| piece.split_whitespace().collect::<Vec<_>>().join(" "))
            .collect(),
        None => Vec::new(),
    }
}

/// Occurrence count per distinct token, kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounts {
    entries: IndexMap<String, u32>,
}

impl TokenCounts {
    /// Counts every token of the iterator.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut entries: IndexMap<String, u32> = IndexMap::new();
        for token in tokens {
            *entries.entry(token).or_insert(0) += 1;
        }
        TokenCounts { entries }
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.entries.get(token).copied()
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }
}

///Takes &[String] and counts the quantity of each token.
/// # Example
/// ```
/// use mead_report::count_tokens;
/// let tokens = vec!["honung".to_string(), "citrus".to_string(), "honung".to_string()];
/// let counted = count_tokens(&tokens);
/// assert_eq!(counted.get("honung"), Some(2));
/// assert_eq!(counted.get("citrus"), Some(1));
/// assert_eq!(counted.len(), 2);
/// ```
pub fn count_tokens(tokens: &[String]) -> TokenCounts {
    TokenCounts::from_tokens(tokens.iter().cloned())
}
