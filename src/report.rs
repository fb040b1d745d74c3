//! Per-instance report driver.
//!
//! For every instance folder: load both tables, build the name map, compose the cover page, one
//! page per mead and one comparison page per category, then paginate everything into
//! `<instance>.pdf`. Figures are collected in an explicit [`FigureBook`] that is emptied at every
//! instance boundary, whether the instance succeeded or not.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::aggregate::summarize;
use crate::error::ReportError;
use crate::figure::{DEFAULT_DPI, Figure, compose_category, compose_mead, title_page};
use crate::names::Lookup;
use crate::pdf::write_document;
use crate::table::{Category, read_name_table, read_tasting_rows};

pub const DEFAULT_INSTANCES_DIR: &str = "data/instances";
pub const NAME_TABLE_FILE: &str = "id_name_map.csv";

/// Where to read from, where to write to and how to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub instances_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dpi: f64,
    /// Stop at the first failed instance instead of carrying on with the rest.
    pub fail_fast: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            instances_dir: PathBuf::from(DEFAULT_INSTANCES_DIR),
            output_dir: PathBuf::from("."),
            dpi: DEFAULT_DPI,
            fail_fast: false,
        }
    }
}

/// The two input tables of one instance folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstancePaths {
    pub name: String,
    pub dir: PathBuf,
    pub ratings: PathBuf,
    pub names: PathBuf,
}

impl InstancePaths {
    pub fn new(dir: &Path, name: &str) -> Self {
        InstancePaths {
            name: name.to_string(),
            dir: dir.to_path_buf(),
            ratings: dir.join(format!("{name}.csv")),
            names: dir.join(NAME_TABLE_FILE),
        }
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.pdf", self.name))
    }
}

/// Figures of the instance being rendered, in creation order.
#[derive(Debug, Default)]
pub struct FigureBook {
    figures: Vec<Figure>,
}

impl FigureBook {
    pub fn new() -> Self {
        FigureBook::default()
    }

    pub fn push(&mut self, figure: Figure) {
        self.figures.push(figure);
    }

    pub fn len(&self) -> usize {
        self.figures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }

    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn clear(&mut self) {
        self.figures.clear();
    }

    /// Writes every figure as one page to `path`. The book is empty afterwards, also when
    /// writing fails.
    pub fn flush_to_pdf(&mut self, path: &Path, title: &str) -> Result<usize, ReportError> {
        let figures = std::mem::take(&mut self.figures);
        write_document(&figures, path, title)
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, ReportError)>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Lists the instance folders under `root`, sorted by name. Plain files are ignored.
pub fn discover_instances(root: &Path) -> Result<Vec<InstancePaths>, ReportError> {
    let mut instances = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ReportError::Discover {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            warn!("skipping {}: not a directory", entry.path().display());
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => instances.push(InstancePaths::new(entry.path(), name)),
            None => warn!(
                "skipping {}: folder name is not valid UTF-8",
                entry.path().display()
            ),
        }
    }
    Ok(instances)
}

fn fill_book(
    instance: &InstancePaths,
    book: &mut FigureBook,
    dpi: f64,
) -> Result<(), ReportError> {
    let name = instance.name.as_str();
    let rows = read_tasting_rows(&instance.ratings)
        .map_err(|e| e.in_instance(name, &instance.ratings))?;
    let names =
        read_name_table(&instance.names).map_err(|e| e.in_instance(name, &instance.names))?;
    debug!(
        "{name}: {} tasting rows, {} named meads",
        rows.len(),
        names.len()
    );

    book.push(title_page(name, dpi));

    let ids: BTreeSet<i64> = rows.iter().map(|row| row.id).collect();
    for id in ids {
        let summary = summarize(&rows, id);
        let figure =
            compose_mead(&summary, &names, dpi).map_err(|e| e.in_instance(name, &instance.names))?;
        debug!("{name}: composed page for mead {id}");
        book.push(figure);
    }

    for category in Category::ALL {
        let figure = compose_category(&rows, category, &names, dpi)
            .map_err(|e| e.in_instance(name, &instance.names))?;
        debug!("{name}: composed comparison of {}", category.column());
        book.push(figure);
    }
    Ok(())
}

/// Renders one instance into `<output_dir>/<name>.pdf` and returns that path.
///
/// `book` is empty when this returns. On failure no document is written.
pub fn render_instance(
    instance: &InstancePaths,
    book: &mut FigureBook,
    options: &ReportOptions,
) -> Result<PathBuf, ReportError> {
    info!("rendering instance {}", instance.name);
    book.clear();
    let result = fill_book(instance, book, options.dpi).and_then(|()| {
        let output = instance.output_path(&options.output_dir);
        let pages = book
            .flush_to_pdf(&output, &instance.name)
            .map_err(|e| e.in_instance(&instance.name, &output))?;
        info!("wrote {} ({pages} pages)", output.display());
        Ok(output)
    });
    book.clear();
    result
}

/// Renders every instance under `options.instances_dir`.
///
/// A failed instance is recorded and the run moves on, unless `fail_fast` is set. Only a
/// failure to list the instances themselves is returned as an error.
pub fn run(options: &ReportOptions) -> Result<RunSummary, ReportError> {
    let instances = discover_instances(&options.instances_dir)?;
    if instances.is_empty() {
        warn!(
            "no instance folders found under {}",
            options.instances_dir.display()
        );
    }

    let mut book = FigureBook::new();
    let mut summary = RunSummary::default();
    for instance in &instances {
        match render_instance(instance, &mut book, options) {
            Ok(path) => summary.written.push(path),
            Err(err) => {
                error!("{err}");
                summary.failed.push((instance.name.clone(), err));
                if options.fail_fast {
                    break;
                }
            }
        }
    }
    Ok(summary)
}

///Print instances that could not be rendered.
pub fn print_failed_instances(failed: &[(String, ReportError)]) {
    eprintln!("\nFailed instances:");
    for (name, err) in failed {
        eprintln!("  {name}: {err}");
    }
}
