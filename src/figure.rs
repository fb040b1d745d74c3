//! Page composition.
//!
//! A [`Figure`] is a plain description of one page: an optional point plot, the rectangle it
//! occupies and a set of positioned texts. Positions are fractions of the page with the origin
//! in the lower-left corner and font sizes are in points. Nothing here draws; see [`crate::pdf`].

use std::collections::BTreeMap;

use crate::TokenCounts;
use crate::aggregate::{Estimate, MeadSummary};
use crate::error::ReportError;
use crate::names::Lookup;
use crate::table::{Category, TastingRow};

pub const DEFAULT_DPI: f64 = 100.0;

/// Every page is this many pixels at the figure's dpi.
pub const PAGE_PIXELS: (u32, u32) = (1920, 1080);

/// Fixed vertical axis of every point plot.
pub const RATING_RANGE: (f64, f64) = (1.0, 9.0);

const PANEL_X: f64 = 0.72;
const PANEL_TOP: f64 = 0.85;
const LINE_STEP: f64 = 0.04;
const GROUP_STEP: f64 = 0.06;
const HEADING_PT: f64 = 14.0;
const LINE_PT: f64 = 10.0;
const SUPTITLE_PT: f64 = 16.0;
const COVER_PT: f64 = 24.0;

pub const NOTES_HEADING: &str = "Smaknoter";
pub const OFF_FLAVORS_HEADING: &str = "Bismaker";
pub const OTHER_HEADING: &str = "Övrigt";

/// Axes rectangle in page fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl PlotArea {
    /// A mead page without remarks.
    pub const FULL: PlotArea = PlotArea {
        left: 0.1,
        right: 0.9,
        top: 0.9,
        bottom: 0.1,
    };

    /// A mead page whose right side holds the annotation panel.
    pub const BESIDE_PANEL: PlotArea = PlotArea {
        left: 0.1,
        right: 0.7,
        top: 0.9,
        bottom: 0.1,
    };

    /// Comparison pages.
    pub const COMPARISON: PlotArea = PlotArea {
        left: 0.125,
        right: 0.9,
        top: 0.88,
        bottom: 0.11,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Which part of the text sits on `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Baseline,
    Top,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureText {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f64,
    pub align: Align,
    pub valign: VAlign,
}

impl FigureText {
    fn left(x: f64, y: f64, text: impl Into<String>, size: f64) -> Self {
        FigureText {
            x,
            y,
            text: text.into(),
            size,
            align: Align::Left,
            valign: VAlign::Baseline,
        }
    }

    fn centered(x: f64, y: f64, text: impl Into<String>, size: f64) -> Self {
        FigureText {
            x,
            y,
            text: text.into(),
            size,
            align: Align::Center,
            valign: VAlign::Baseline,
        }
    }

    /// Hangs the text below `y` instead of standing on it.
    fn hanging(self) -> Self {
        FigureText {
            valign: VAlign::Top,
            ..self
        }
    }
}

/// One x position of a point plot.
#[derive(Debug, Clone, PartialEq)]
pub struct PointColumn {
    pub label: String,
    /// `None` when the column has no values; nothing is drawn for it.
    pub estimate: Option<Estimate>,
}

impl PointColumn {
    fn new(label: impl Into<String>, values: &[f64]) -> Self {
        PointColumn {
            label: label.into(),
            estimate: Estimate::of(values),
        }
    }
}

/// Mean markers with ±1 sd bars, no connecting lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPlot {
    pub title: Option<String>,
    pub columns: Vec<PointColumn>,
    pub y_range: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub plot: Option<PointPlot>,
    pub plot_area: PlotArea,
    pub texts: Vec<FigureText>,
    /// Lines of the annotation panel, top to bottom.
    pub panel: Vec<FigureText>,
    pub dpi: f64,
}

impl Figure {
    pub fn has_panel(&self) -> bool {
        !self.panel.is_empty()
    }

    /// Page size in PDF points.
    pub fn page_points(&self) -> (f64, f64) {
        let scale = 72.0 / self.dpi;
        (
            f64::from(PAGE_PIXELS.0) * scale,
            f64::from(PAGE_PIXELS.1) * scale,
        )
    }

    /// Converts a font size in points to page pixels.
    pub fn points_to_pixels(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

/// Running cursor of the annotation panel.
struct Panel {
    x: f64,
    y: f64,
    lines: Vec<FigureText>,
}

impl Panel {
    fn new() -> Self {
        Panel {
            x: PANEL_X,
            y: PANEL_TOP,
            lines: Vec::new(),
        }
    }

    fn heading(&mut self, title: &str) {
        self.lines
            .push(FigureText::left(self.x, self.y, title, HEADING_PT));
    }

    fn line(&mut self, text: String) {
        self.y -= LINE_STEP;
        self.lines.push(FigureText::left(self.x, self.y, text, LINE_PT));
    }

    fn write_counts(&mut self, title: &str, counts: &TokenCounts) {
        self.heading(title);
        for (token, count) in counts.iter() {
            self.line(format!("({count}) {token}"));
        }
        self.y -= GROUP_STEP;
    }

    fn write_list(&mut self, title: &str, items: &[String]) {
        self.heading(title);
        for item in items {
            self.line(item.clone());
        }
        self.y -= GROUP_STEP;
    }
}

/// Builds the cover page: the instance name, large and centred.
pub fn title_page(instance: &str, dpi: f64) -> Figure {
    Figure {
        plot: None,
        plot_area: PlotArea::FULL,
        texts: vec![FigureText::centered(0.5, 0.5, instance, COVER_PT)],
        panel: Vec::new(),
        dpi,
    }
}

/// Builds one mead's page from its summary.
///
/// The plot shows the three scale columns. Notes, off-flavors and other remarks go into a
/// panel on the right, in that order, skipping empty groups; without any remarks the plot
/// keeps the full width.
pub fn compose_mead(
    summary: &MeadSummary,
    names: &dyn Lookup,
    dpi: f64,
) -> Result<Figure, ReportError> {
    let title = names.resolve(summary.id)?;
    let columns = summary
        .scales
        .iter()
        .map(|(category, values)| PointColumn::new(category.column(), values))
        .collect();

    let mut panel = Panel::new();
    if !summary.notes.is_empty() {
        panel.write_counts(NOTES_HEADING, &summary.notes);
    }
    if !summary.off_flavors.is_empty() {
        panel.write_counts(OFF_FLAVORS_HEADING, &summary.off_flavors);
    }
    if !summary.other.is_empty() {
        panel.write_list(OTHER_HEADING, &summary.other);
    }

    let plot_area = if panel.lines.is_empty() {
        PlotArea::FULL
    } else {
        PlotArea::BESIDE_PANEL
    };

    Ok(Figure {
        plot: Some(PointPlot {
            title: None,
            columns,
            y_range: RATING_RANGE,
        }),
        plot_area,
        texts: vec![FigureText::centered(0.5, 0.95, title, SUPTITLE_PT).hanging()],
        panel: panel.lines,
        dpi,
    })
}

/// Builds the comparison page of one category: one column per mead id, ascending.
pub fn compose_category(
    rows: &[TastingRow],
    category: Category,
    names: &dyn Lookup,
    dpi: f64,
) -> Result<Figure, ReportError> {
    let mut by_id: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
    for row in rows {
        by_id.entry(row.id).or_default().push(category.value(row));
    }

    let columns = by_id
        .iter()
        .map(|(id, values)| Ok(PointColumn::new(names.resolve(*id)?, values)))
        .collect::<Result<Vec<_>, ReportError>>()?;

    Ok(Figure {
        plot: Some(PointPlot {
            title: Some(category.column().to_string()),
            columns,
            y_range: RATING_RANGE,
        }),
        plot_area: PlotArea::COMPARISON,
        texts: Vec::new(),
        panel: Vec::new(),
        dpi,
    })
}
