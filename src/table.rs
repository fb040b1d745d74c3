//! Typed loading of the two per-instance tables.

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;

use crate::error::ReportError;
use crate::names::IdNameMap;

/// One tasting record: a single taster's scores and remarks for one mead.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TastingRow {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Sötma")]
    pub sweetness: f64,
    #[serde(rename = "Syrlighet")]
    pub acidity: f64,
    #[serde(rename = "Fyllighet")]
    pub body: f64,
    #[serde(rename = "Helhetsbetyg")]
    pub overall: f64,
    #[serde(rename = "Smaknoter")]
    pub notes: Option<String>,
    #[serde(rename = "Bismaker")]
    pub off_flavors: Option<String>,
    #[serde(rename = "Övrigt")]
    pub other: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    #[serde(rename = "Id")]
    id: i64,
    #[serde(rename = "Namn")]
    name: String,
}

/// Rating dimensions compared across all meads of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Sweetness,
    Acidity,
    Body,
    Overall,
}

impl Category {
    /// Comparison pages are emitted in this order.
    pub const ALL: [Category; 4] = [
        Category::Sweetness,
        Category::Acidity,
        Category::Body,
        Category::Overall,
    ];

    /// The columns shown on a mead's own page.
    pub const SCALES: [Category; 3] = [Category::Sweetness, Category::Acidity, Category::Body];

    /// Header of the column in the ratings table.
    pub fn column(self) -> &'static str {
        match self {
            Category::Sweetness => "Sötma",
            Category::Acidity => "Syrlighet",
            Category::Body => "Fyllighet",
            Category::Overall => "Helhetsbetyg",
        }
    }

    pub fn value(self, row: &TastingRow) -> f64 {
        match self {
            Category::Sweetness => row.sweetness,
            Category::Acidity => row.acidity,
            Category::Body => row.body,
            Category::Overall => row.overall,
        }
    }
}

fn open_trimmed(path: &Path) -> Result<csv::Reader<std::fs::File>, ReportError> {
    if !path.is_file() {
        return Err(ReportError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

/// Reads the ratings table. Any row that fails to parse aborts the load.
pub fn read_tasting_rows(path: &Path) -> Result<Vec<TastingRow>, ReportError> {
    let mut reader = open_trimmed(path)?;
    reader
        .deserialize::<TastingRow>()
        .map(|row| {
            row.map_err(|source| ReportError::Csv {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Reads `id_name_map.csv`. A repeated id keeps the last name.
pub fn read_name_table(path: &Path) -> Result<IdNameMap, ReportError> {
    let mut reader = open_trimmed(path)?;
    let mut pairs = Vec::new();
    for row in reader.deserialize::<NameRow>() {
        let row = row.map_err(|source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        pairs.push((row.id, row.name));
    }
    Ok(pairs.into_iter().collect())
}
