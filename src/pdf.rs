//! Drawing figures and paginating them into a PDF.
//!
//! Charts are laid out by `plotters` on a [`PageBackend`], which records PDF content-stream
//! operations instead of pixels. Each page works in a 1920x1080 pixel space, flipped and scaled
//! onto the PDF page by a single `cm` operation, so the document stays vector-only and needs no
//! embedded fonts (text uses the standard Helvetica with WinAnsi encoding).

use std::convert::Infallible;
use std::path::Path;

use chrono::Local;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_backend::text_anchor::{HPos, Pos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};

use crate::aggregate::Estimate;
use crate::error::ReportError;
use crate::figure::{Align, Figure, FigureText, PAGE_PIXELS, PointPlot, VAlign};

const FIGURE_BG: RGBColor = RGBColor(0xFD, 0xF6, 0xE3);
const AXES_BG: RGBColor = RGBColor(0xEE, 0xE8, 0xD5);
const MARKER: RGBColor = RGBColor(0x26, 0x8B, 0xD2);
const TEXT: RGBColor = RGBColor(0x65, 0x7B, 0x83);

const TICK_PT: f64 = 10.0;
const AXES_TITLE_PT: f64 = 12.0;
const X_LABEL_AREA: i32 = 50;
const Y_LABEL_AREA: i32 = 60;
const MARKER_PX: i32 = 9;
const ERRORBAR_PX: u32 = 3;

/// Average Helvetica advance width as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.55;
const FONT_NAME: &str = "F1";

/// A plotters backend that appends PDF operations to a borrowed buffer.
///
/// Coordinates are page pixels with y pointing down; the page transform set up by
/// [`page_operations`] maps them onto PDF user space.
pub struct PageBackend<'a> {
    size: (u32, u32),
    ops: &'a mut Vec<Operation>,
}

impl<'a> PageBackend<'a> {
    pub fn new(size: (u32, u32), ops: &'a mut Vec<Operation>) -> Self {
        PageBackend { size, ops }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.ops.push(Operation::new(operator, operands));
    }

    fn set_fill(&mut self, color: BackendColor) {
        self.push("rg", rgb(color));
    }

    /// Returns false for fully transparent styles, which draw nothing.
    fn set_stroke<S: BackendStyle>(&mut self, style: &S) -> bool {
        let color = style.color();
        if color.alpha == 0.0 {
            return false;
        }
        self.push("RG", rgb(color));
        self.push("w", vec![Object::Integer(i64::from(style.stroke_width()))]);
        true
    }

    fn move_to(&mut self, (x, y): BackendCoord) {
        self.push("m", vec![Object::Integer(x.into()), Object::Integer(y.into())]);
    }

    fn line_to(&mut self, (x, y): BackendCoord) {
        self.push("l", vec![Object::Integer(x.into()), Object::Integer(y.into())]);
    }

    fn circle_path(&mut self, (cx, cy): BackendCoord, radius: u32) {
        let (cx, cy, r) = (f64::from(cx), f64::from(cy), f64::from(radius));
        let k = 0.552_284_75 * r;
        self.push("m", vec![real(cx + r), real(cy)]);
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for quarter in quarters {
            self.push("c", quarter.iter().map(|v| real(*v)).collect());
        }
    }
}

impl DrawingBackend for PageBackend<'_> {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Infallible>> {
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if color.alpha > 0.0 {
            self.set_fill(color);
            self.push(
                "re",
                vec![
                    Object::Integer(point.0.into()),
                    Object::Integer(point.1.into()),
                    Object::Integer(1),
                    Object::Integer(1),
                ],
            );
            self.push("f", vec![]);
        }
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if self.set_stroke(style) {
            self.move_to(from);
            self.line_to(to);
            self.push("S", vec![]);
        }
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let color = style.color();
        if color.alpha == 0.0 {
            return Ok(());
        }
        let rect = vec![
            Object::Integer(upper_left.0.into()),
            Object::Integer(upper_left.1.into()),
            Object::Integer(i64::from(bottom_right.0) - i64::from(upper_left.0)),
            Object::Integer(i64::from(bottom_right.1) - i64::from(upper_left.1)),
        ];
        if fill {
            self.set_fill(color);
            self.push("re", rect);
            self.push("f", vec![]);
        } else if self.set_stroke(style) {
            self.push("re", rect);
            self.push("S", vec![]);
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        if !self.set_stroke(style) {
            return Ok(());
        }
        let mut points = path.into_iter();
        if let Some(first) = points.next() {
            self.move_to(first);
            for point in points {
                self.line_to(point);
            }
            self.push("S", vec![]);
        }
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let color = style.color();
        if color.alpha == 0.0 {
            return Ok(());
        }
        if fill {
            self.set_fill(color);
            self.circle_path(center, radius);
            self.push("f", vec![]);
        } else if self.set_stroke(style) {
            self.circle_path(center, radius);
            self.push("S", vec![]);
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let color = style.color();
        if color.alpha == 0.0 {
            return Ok(());
        }
        let mut points = vert.into_iter();
        if let Some(first) = points.next() {
            self.set_fill(color);
            self.move_to(first);
            for point in points {
                self.line_to(point);
            }
            self.push("f", vec![]);
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Infallible>> {
        let size = style.size();
        let (width, _) = text_extent(text, size);
        let anchor = style.anchor();
        let x = f64::from(pos.0)
            - match anchor.h_pos {
                HPos::Left => 0.0,
                HPos::Center => width / 2.0,
                HPos::Right => width,
            };
        // baseline sits below the anchor point for top and centre alignment
        let y = f64::from(pos.1)
            + match anchor.v_pos {
                VPos::Top => size * 0.8,
                VPos::Center => size * 0.35,
                VPos::Bottom => 0.0,
            };

        self.set_fill(style.color());
        self.push("BT", vec![]);
        self.push("Tf", vec![Object::from(FONT_NAME), real(size)]);
        self.push(
            "Tm",
            vec![real(1.0), real(0.0), real(0.0), real(-1.0), real(x), real(y)],
        );
        self.push(
            "Tj",
            vec![Object::String(win_ansi(text), StringFormat::Literal)],
        );
        self.push("ET", vec![]);
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let (w, h) = text_extent(text, style.size());
        Ok((w.ceil() as u32, h.ceil() as u32))
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn rgb(color: BackendColor) -> Vec<Object> {
    let (r, g, b) = color.rgb;
    [r, g, b]
        .iter()
        .map(|c| real(f64::from(*c) / 255.0))
        .collect()
}

fn text_extent(text: &str, size: f64) -> (f64, f64) {
    (text.chars().count() as f64 * size * GLYPH_WIDTH, size)
}

/// Encodes text for a WinAnsi Type1 font. Characters WinAnsi has no code for become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match u32::from(c) {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => win_ansi_extra(c).unwrap_or(b'?'),
        })
        .collect()
}

/// The 0x80-0x9F block, where WinAnsi departs from Latin-1.
fn win_ansi_extra(c: char) -> Option<u8> {
    let code = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(code)
}

fn render_error<E: std::fmt::Display>(err: E) -> ReportError {
    ReportError::Render(err.to_string())
}

/// Content-stream operations of one page.
pub fn page_operations(figure: &Figure) -> Result<Vec<Operation>, ReportError> {
    let (width_pt, height_pt) = figure.page_points();
    let scale = width_pt / f64::from(PAGE_PIXELS.0);
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                real(scale),
                real(0.0),
                real(0.0),
                real(-scale),
                real(0.0),
                real(height_pt),
            ],
        ),
    ];
    paint(figure, &mut ops)?;
    ops.push(Operation::new("Q", vec![]));
    Ok(ops)
}

fn paint(figure: &Figure, ops: &mut Vec<Operation>) -> Result<(), ReportError> {
    let root = PageBackend::new(PAGE_PIXELS, ops).into_drawing_area();
    root.fill(&FIGURE_BG).map_err(render_error)?;
    if let Some(plot) = &figure.plot {
        draw_plot(&root, figure, plot)?;
    }
    for text in figure.texts.iter().chain(&figure.panel) {
        draw_figure_text(&root, figure, text)?;
    }
    root.present().map_err(render_error)
}

fn draw_plot(
    root: &DrawingArea<PageBackend<'_>, Shift>,
    figure: &Figure,
    plot: &PointPlot,
) -> Result<(), ReportError> {
    let (w, h) = (f64::from(PAGE_PIXELS.0), f64::from(PAGE_PIXELS.1));
    let area = figure.plot_area;
    let caption_px = figure.points_to_pixels(AXES_TITLE_PT);
    let caption_room = if plot.title.is_some() {
        (caption_px * 1.5) as i32
    } else {
        0
    };

    // label areas and the caption live inside the margin, so carve them out of it
    let axes = root.margin(
        (((1.0 - area.top) * h) as i32 - caption_room).max(0),
        ((area.bottom * h) as i32 - X_LABEL_AREA).max(0),
        ((area.left * w) as i32 - Y_LABEL_AREA).max(0),
        ((1.0 - area.right) * w) as i32,
    );

    let label_style = ("sans-serif", figure.points_to_pixels(TICK_PT))
        .into_font()
        .color(&TEXT);
    let slots = plot.columns.len().max(1) as i32;

    let mut builder = ChartBuilder::on(&axes);
    builder
        .x_label_area_size(X_LABEL_AREA)
        .y_label_area_size(Y_LABEL_AREA);
    if let Some(title) = &plot.title {
        builder.caption(title, ("sans-serif", caption_px).into_font().color(&TEXT));
    }
    let mut chart = builder
        .build_cartesian_2d((0..slots).into_segmented(), plot.y_range.0..plot.y_range.1)
        .map_err(render_error)?;

    chart.plotting_area().fill(&AXES_BG).map_err(render_error)?;

    let labels: Vec<&str> = plot.columns.iter().map(|c| c.label.as_str()).collect();
    let column_label = |value: &SegmentValue<i32>| match value {
        SegmentValue::CenterOf(i) => usize::try_from(*i)
            .ok()
            .and_then(|i| labels.get(i))
            .map(|label| label.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(plot.columns.len() + 1)
        .x_label_formatter(&column_label)
        .y_labels(9)
        .light_line_style(&TRANSPARENT)
        .bold_line_style(Color::stroke_width(&FIGURE_BG, 2))
        .axis_style(Color::stroke_width(&TEXT, 1))
        .label_style(label_style)
        .draw()
        .map_err(render_error)?;

    let points: Vec<(i32, Estimate)> = plot
        .columns
        .iter()
        .enumerate()
        .filter_map(|(i, column)| column.estimate.map(|e| (i as i32, e)))
        .collect();

    chart
        .draw_series(points.iter().filter_map(|(i, e)| {
            e.sd.map(|sd| {
                ErrorBar::new_vertical(
                    SegmentValue::CenterOf(*i),
                    e.mean - sd,
                    e.mean,
                    e.mean + sd,
                    Color::stroke_width(&MARKER, ERRORBAR_PX),
                    0,
                )
            })
        }))
        .map_err(render_error)?;
    chart
        .draw_series(points.iter().map(|(i, e)| {
            Circle::new(
                (SegmentValue::CenterOf(*i), e.mean),
                MARKER_PX,
                MARKER.filled(),
            )
        }))
        .map_err(render_error)?;
    Ok(())
}

fn draw_figure_text(
    root: &DrawingArea<PageBackend<'_>, Shift>,
    figure: &Figure,
    text: &FigureText,
) -> Result<(), ReportError> {
    let h_pos = match text.align {
        Align::Left => HPos::Left,
        Align::Center => HPos::Center,
    };
    let v_pos = match text.valign {
        VAlign::Baseline => VPos::Bottom,
        VAlign::Top => VPos::Top,
    };
    let style = ("sans-serif", figure.points_to_pixels(text.size))
        .into_font()
        .color(&TEXT)
        .pos(Pos::new(h_pos, v_pos));
    let x = (text.x * f64::from(PAGE_PIXELS.0)).round() as i32;
    let y = ((1.0 - text.y) * f64::from(PAGE_PIXELS.1)).round() as i32;
    root.draw_text(&text.text, &style, (x, y))
        .map_err(render_error)
}

/// Writes `figures` as one page each, in order, to `path`.
///
/// The document is assembled in a temporary file next to `path` and renamed into place only
/// once it has been written completely. Returns the number of pages.
pub fn write_document(figures: &[Figure], path: &Path, title: &str) -> Result<usize, ReportError> {
    let pdf_error = |err: &dyn std::fmt::Display| ReportError::PdfWrite {
        path: path.to_path_buf(),
        reason: err.to_string(),
    };

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { FONT_NAME => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(figures.len());
    for figure in figures {
        let operations = page_operations(figure)?;
        let content = Content { operations }
            .encode()
            .map_err(|e| pdf_error(&e))?;
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content));
        let (width_pt, height_pt) = figure.page_points();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(width_pt),
                real(height_pt),
            ],
        });
        kids.push(page_id.into());
    }

    let count = kids.len();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count as i64),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal(concat!("mead_report ", env!("CARGO_PKG_VERSION"))),
        "CreationDate" => Object::string_literal(Local::now().format("D:%Y%m%d%H%M%S").to_string()),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staging = tempfile::Builder::new()
        .prefix(".mead_report")
        .suffix(".pdf.part")
        .tempfile_in(dir)
        .map_err(|source| ReportError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    doc.save_to(&mut staging).map_err(|e| pdf_error(&e))?;
    staging.persist(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize;
    use crate::figure::{DEFAULT_DPI, compose_category, compose_mead, title_page};
    use crate::names::IdNameMap;
    use crate::table::{Category, TastingRow};
    use lopdf::ObjectId;
    use tempfile::tempdir;

    fn tasting(id: i64, score: f64) -> TastingRow {
        TastingRow {
            id,
            sweetness: score,
            acidity: score,
            body: score,
            overall: score,
            notes: Some("honung".to_string()),
            off_flavors: None,
            other: None,
        }
    }

    fn names() -> IdNameMap {
        [(1, "Vildhonung".to_string()), (2, "Ljung".to_string())]
            .into_iter()
            .collect()
    }

    fn count_ops(ops: &[Operation], operator: &str) -> usize {
        ops.iter().filter(|op| op.operator == operator).count()
    }

    /// Stroke colour changes to the marker colour, which only error bars use.
    fn error_bar_strokes(ops: &[Operation]) -> usize {
        let close = |obj: &Object, channel: u8| {
            matches!(obj, Object::Real(v) if (f64::from(*v) - f64::from(channel) / 255.0).abs() < 1e-3)
        };
        ops.iter()
            .filter(|op| {
                op.operator == "RG"
                    && close(&op.operands[0], MARKER.0)
                    && close(&op.operands[1], MARKER.1)
                    && close(&op.operands[2], MARKER.2)
            })
            .count()
    }

    fn texts_of(ops: &[Operation]) -> Vec<Vec<u8>> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    fn shown_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn win_ansi_keeps_latin1() {
        assert_eq!(win_ansi("Övrigt"), b"\xD6vrigt".to_vec());
        assert_eq!(win_ansi("sötma"), b"s\xF6tma".to_vec());
        assert_eq!(
            win_ansi("sött \u{2013} \u{201C}fint\u{201D}"),
            b"s\xF6tt \x96 \x93fint\x94".to_vec()
        );
        assert_eq!(
            win_ansi("\u{20AC}12\u{2026} \u{2014} \u{2018}x\u{2019} \u{0153}\u{0178}"),
            b"\x8012\x85 \x97 \x91x\x92 \x9C\x9F".to_vec()
        );
        assert_eq!(win_ansi("a\u{2192}b \u{1F36F}"), b"a?b ?".to_vec());
    }

    #[test]
    fn circle_is_four_curves() {
        let mut ops = Vec::new();
        let mut backend = PageBackend::new((100, 100), &mut ops);
        backend
            .draw_circle((50, 50), 10, &BLACK.filled(), true)
            .unwrap();
        let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
        assert_eq!(operators, vec!["rg", "m", "c", "c", "c", "c", "f"]);
    }

    #[test]
    fn centered_text_is_shifted_by_half_its_width() {
        let mut ops = Vec::new();
        let mut backend = PageBackend::new((100, 100), &mut ops);
        let style = ("sans-serif", 20.0)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        backend.draw_text("abcd", &style, (50, 60)).unwrap();

        let tm = ops.iter().find(|op| op.operator == "Tm").unwrap();
        // 4 glyphs * 20 px * 0.55 = 44 px wide
        assert!(matches!(tm.operands[4], Object::Real(x) if (x - 28.0).abs() < 1e-3));
        assert!(matches!(tm.operands[5], Object::Real(y) if (y - 60.0).abs() < 1e-3));
    }

    #[test]
    fn page_is_wrapped_in_flip_transform() {
        let ops = page_operations(&title_page("mead2024", DEFAULT_DPI)).unwrap();
        assert_eq!(ops.first().unwrap().operator, "q");
        assert_eq!(ops[1].operator, "cm");
        assert_eq!(ops.last().unwrap().operator, "Q");
        assert!(ops.iter().any(|op| op.operator == "Tj"
            && matches!(op.operands.first(), Some(Object::String(bytes, _)) if bytes == b"mead2024")));
    }

    #[test]
    fn mead_page_draws_one_marker_per_column() {
        let rows = vec![tasting(1, 4.0)];
        let figure = compose_mead(&summarize(&rows, 1), &names(), DEFAULT_DPI).unwrap();
        let ops = page_operations(&figure).unwrap();

        // three columns, four curve segments per circle
        assert_eq!(count_ops(&ops, "c"), 12);
        // a single tasting has no deviation
        assert_eq!(error_bar_strokes(&ops), 0);

        let texts = texts_of(&ops);
        assert!(texts.contains(&win_ansi("(1) Vildhonung")));
        assert!(texts.contains(&win_ansi("Sötma")));
        assert!(texts.contains(&b"(1) honung".to_vec()));
    }

    #[test]
    fn mead_page_draws_error_bars_with_deviation() {
        let rows = vec![tasting(1, 4.0), tasting(1, 6.0), tasting(2, 3.0)];
        let figure = compose_mead(&summarize(&rows, 1), &names(), DEFAULT_DPI).unwrap();
        let ops = page_operations(&figure).unwrap();

        assert_eq!(count_ops(&ops, "c"), 12);
        assert!(error_bar_strokes(&ops) >= 3);
    }

    #[test]
    fn category_page_has_caption_and_column_labels() {
        let rows = vec![tasting(2, 7.0), tasting(1, 5.0), tasting(1, 3.0)];
        let figure = compose_category(&rows, Category::Acidity, &names(), DEFAULT_DPI).unwrap();
        let ops = page_operations(&figure).unwrap();

        assert_eq!(count_ops(&ops, "c"), 8);
        assert!(error_bar_strokes(&ops) >= 1);
        let texts = texts_of(&ops);
        assert!(texts.contains(&b"Syrlighet".to_vec()));
        assert!(texts.contains(&b"(1) Vildhonung".to_vec()));
        assert!(texts.contains(&b"(2) Ljung".to_vec()));
    }

    #[test]
    fn category_page_renders_for_many_meads() {
        let names: IdNameMap = (1..=12).map(|id| (id, format!("Mjöd {id}"))).collect();
        let rows: Vec<TastingRow> = (1..=12)
            .flat_map(|id| [tasting(id, 3.0), tasting(id, 7.0)])
            .collect();
        for category in Category::ALL {
            let figure = compose_category(&rows, category, &names, DEFAULT_DPI).unwrap();
            let ops = page_operations(&figure).unwrap();
            assert_eq!(count_ops(&ops, "c"), 12 * 4);
        }
    }

    #[test]
    fn header_only_table_renders_empty_plots() {
        let rows: Vec<TastingRow> = Vec::new();
        let figure = compose_category(&rows, Category::Sweetness, &names(), DEFAULT_DPI).unwrap();
        assert!(figure.plot.as_ref().unwrap().columns.is_empty());
        let ops = page_operations(&figure).unwrap();
        assert_eq!(count_ops(&ops, "c"), 0);
        assert!(texts_of(&ops).contains(&win_ansi("Sötma")));

        let figure = compose_mead(&summarize(&rows, 1), &names(), DEFAULT_DPI).unwrap();
        let ops = page_operations(&figure).unwrap();
        assert_eq!(count_ops(&ops, "c"), 0);
        assert_eq!(error_bar_strokes(&ops), 0);
    }

    #[test]
    fn mead_title_hangs_from_its_anchor() {
        let rows = vec![tasting(1, 4.0)];
        let figure = compose_mead(&summarize(&rows, 1), &names(), DEFAULT_DPI).unwrap();
        let ops = page_operations(&figure).unwrap();

        let title = win_ansi("(1) Vildhonung");
        let tj = ops
            .iter()
            .position(|op| {
                op.operator == "Tj"
                    && matches!(op.operands.first(), Some(Object::String(bytes, _)) if *bytes == title)
            })
            .unwrap();
        let tm = &ops[tj - 1];
        assert_eq!(tm.operator, "Tm");
        // anchor at 5% from the top, baseline one cap height lower
        let anchor = 0.05 * f64::from(PAGE_PIXELS.1);
        let size = figure.points_to_pixels(16.0);
        assert!(matches!(tm.operands[5], Object::Real(y) if (f64::from(y) - (anchor + size * 0.8)).abs() < 1e-2));
    }

    #[test]
    fn writes_one_page_per_figure_in_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.pdf");
        let figures: Vec<Figure> = ["first", "second", "third"]
            .iter()
            .map(|name| title_page(name, DEFAULT_DPI))
            .collect();

        let pages = write_document(&figures, &path, "order").unwrap();
        assert_eq!(pages, 3);

        let doc = Document::load(&path).unwrap();
        let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
        assert_eq!(page_ids.len(), 3);
        for (page_id, expected) in page_ids.iter().zip(["first", "second", "third"]) {
            assert_eq!(shown_strings(&doc, *page_id), vec![expected.as_bytes().to_vec()]);
        }

        // no staging file is left next to the output
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn info_dictionary_carries_title_and_dates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("höst.pdf");
        write_document(&[title_page("höst", DEFAULT_DPI)], &path, "höst").unwrap();

        let doc = Document::load(&path).unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert!(matches!(info.get(b"Title"), Ok(Object::String(bytes, _)) if *bytes == win_ansi("höst")));
        assert!(matches!(info.get(b"Producer"), Ok(Object::String(bytes, _)) if bytes.starts_with(b"mead_report ")));
        assert!(matches!(info.get(b"CreationDate"), Ok(Object::String(bytes, _)) if bytes.starts_with(b"D:")));
    }
}
