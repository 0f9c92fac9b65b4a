//! Rendering: draw computed geometry to **SVG** or **PNG**.
//!
//! The renderer has full-replace semantics: [`Renderer::clear`] wipes the
//! surface, [`Renderer::draw`] paints axes, data paths, and the legend from a
//! [`Geometry`]. There is no incremental patching; every state change redraws
//! from scratch. Loading and error states render a short text message in
//! place of the chart ([`Renderer::draw_status`]); an empty result renders a
//! bare frame with no paths and no legend ([`Renderer::draw_empty`]).

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::{DEFAULT_LEGEND_MODE, LegendMode};

use crate::layout::{Geometry, LayoutConfig, ParallelGeometry, StreamGeometry};
use crate::pipeline::ChartStatus;
use anyhow::Result;
use num_format::Locale;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use legend::draw_legend_panel;
use util::{format_tick, format_year, map_locale};

/// One-time registration for a fallback "sans-serif" font when using the
/// `ab_glyph` text path. Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    // Safe to call many times; only runs once.
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const AXIS_COLOR: RGBColor = RGBColor(110, 110, 110);
const GRID_COLOR: RGBColor = RGBColor(222, 222, 222);

/// Per-render presentation choices, orthogonal to the geometry.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub legend: LegendMode,
    /// Locale tag for tick labels (`30,000` vs `30.000`).
    pub locale: String,
    /// Label each series next to its path end, in addition to the legend.
    pub label_series: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: String::new(),
            legend: DEFAULT_LEGEND_MODE,
            locale: "en".into(),
            label_series: false,
        }
    }
}

/// A layout whose margins reserve the gutter the chosen legend placement
/// draws into.
pub fn layout_for(width: u32, height: u32, legend: LegendMode) -> LayoutConfig {
    let mut cfg = LayoutConfig::with_size(width, height);
    match legend {
        LegendMode::Right => cfg.margin_right = 190.0,
        LegendMode::Bottom => cfg.margin_bottom = 104.0,
        LegendMode::Inside => {}
    }
    cfg
}

#[inline]
fn px(v: f64) -> i32 {
    v.round() as i32
}

fn text_style(font_px: u32, anchor: Pos) -> TextStyle<'static> {
    TextStyle::from((FontFamily::SansSerif, font_px).into_font())
        .color(&BLACK)
        .pos(anchor)
}

/// Draws one chart onto a plotters drawing area.
pub struct Renderer<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    opts: RenderOptions,
    locale: &'static Locale,
}

impl<'a, DB: DrawingBackend> Renderer<'a, DB> {
    pub fn new(area: &'a DrawingArea<DB, Shift>, opts: RenderOptions) -> Self {
        ensure_fonts_registered();
        let locale = map_locale(&opts.locale);
        Self { area, opts, locale }
    }

    /// Wipe the surface to white. Always called before `draw`; kept separate
    /// so a test can assert the cleared state.
    pub fn clear(&self) -> Result<()> {
        self.area
            .fill(&WHITE)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }

    pub fn draw(&self, geometry: &Geometry) -> Result<()> {
        match geometry {
            Geometry::Parallel(g) => self.draw_parallel(g),
            Geometry::Stream(g) => self.draw_stream(g),
        }
    }

    /// Replace the chart area with a short centered message (loading/error).
    pub fn draw_status(&self, message: &str) -> Result<()> {
        let (w, h) = self.area.dim_in_pixel();
        self.area
            .draw(&Text::new(
                message.to_string(),
                (w as i32 / 2, h as i32 / 2),
                text_style(16, Pos::new(HPos::Center, VPos::Center)),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }

    /// An empty chart frame: border only, no axes, no paths, no legend.
    pub fn draw_empty(&self) -> Result<()> {
        let (w, h) = self.area.dim_in_pixel();
        let config = LayoutConfig::with_size(w, h);
        let frame = Rectangle::new(
            [
                (px(config.margin_left), px(config.margin_top)),
                (
                    px(config.width as f64 - config.margin_right),
                    px(config.height as f64 - config.margin_bottom),
                ),
            ],
            GRID_COLOR.stroke_width(1),
        );
        self.area
            .draw(&frame)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }

    fn draw_title(&self, config: &LayoutConfig) -> Result<()> {
        if self.opts.title.trim().is_empty() {
            return Ok(());
        }
        self.area
            .draw(&Text::new(
                self.opts.title.clone(),
                (config.width as i32 / 2, px(config.margin_top / 2.0)),
                text_style(18, Pos::new(HPos::Center, VPos::Center)),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        Ok(())
    }

    fn draw_parallel(&self, g: &ParallelGeometry) -> Result<()> {
        self.draw_title(&g.config)?;

        // One horizontal axis per metric: name on the left, round-valued
        // ticks along the line.
        for axis in &g.axes {
            let y = px(axis.y);
            let (x0, x1) = axis.scale.range;
            self.area
                .draw(&PathElement::new(
                    vec![(px(x0), y), (px(x1), y)],
                    AXIS_COLOR.stroke_width(1),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            self.area
                .draw(&Text::new(
                    axis.key.clone(),
                    (px(x0) - 14, y),
                    text_style(14, Pos::new(HPos::Right, VPos::Center)),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            for tick in axis.scale.ticks(6) {
                let x = px(axis.scale.scale(tick));
                self.area
                    .draw(&PathElement::new(
                        vec![(x, y - 3), (x, y + 3)],
                        AXIS_COLOR.stroke_width(1),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
                self.area
                    .draw(&Text::new(
                        format_tick(tick, self.locale),
                        (x, y + 6),
                        text_style(12, Pos::new(HPos::Center, VPos::Top)),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }

        // Data polylines in the precomputed draw order, markers on vertices.
        for line in &g.lines {
            let pts: Vec<(i32, i32)> = line.points.iter().map(|&(x, y)| (px(x), px(y))).collect();
            self.area
                .draw(&PathElement::new(pts.clone(), line.color.stroke_width(2)))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            for &p in &pts {
                self.area
                    .draw(&Circle::new(p, 3, line.color.filled()))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
            if self.opts.label_series
                && let Some(&last) = pts.last()
            {
                self.area
                    .draw(&Text::new(
                        line.name.clone(),
                        (last.0 + 8, last.1),
                        text_style(12, Pos::new(HPos::Left, VPos::Center)),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }

        draw_legend_panel(self.area, &g.legend, self.opts.legend, &g.config)
    }

    fn draw_stream(&self, g: &StreamGeometry) -> Result<()> {
        self.draw_title(&g.config)?;

        let (x0, x1) = g.x.range;
        let (y_bottom, y_top) = g.y.range;

        // Horizontal gridlines and value labels.
        for tick in g.y.ticks(8) {
            let y = px(g.y.scale(tick));
            self.area
                .draw(&PathElement::new(
                    vec![(px(x0), y), (px(x1), y)],
                    GRID_COLOR.stroke_width(1),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            self.area
                .draw(&Text::new(
                    format_tick(tick, self.locale),
                    (px(x0) - 8, y),
                    text_style(12, Pos::new(HPos::Right, VPos::Center)),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        // Bands under the axes strokes, translucent fill plus top outline.
        for shape in &g.shapes {
            let poly: Vec<(i32, i32)> =
                shape.polygon.iter().map(|&(x, y)| (px(x), px(y))).collect();
            self.area
                .draw(&Polygon::new(poly, shape.color.mix(0.35).filled()))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            let top: Vec<(i32, i32)> = shape.top.iter().map(|&(x, y)| (px(x), px(y))).collect();
            self.area
                .draw(&PathElement::new(top, shape.color.stroke_width(1)))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            if self.opts.label_series
                && let Some(&(lx, ly)) = shape.top.last()
            {
                self.area
                    .draw(&Text::new(
                        shape.country.clone(),
                        (px(lx) + 8, px(ly)),
                        text_style(12, Pos::new(HPos::Left, VPos::Center)),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }

        // Axis lines on top of the bands.
        self.area
            .draw(&PathElement::new(
                vec![(px(x0), px(y_top)), (px(x0), px(y_bottom))],
                AXIS_COLOR.stroke_width(1),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        self.area
            .draw(&PathElement::new(
                vec![(px(x0), px(y_bottom)), (px(x1), px(y_bottom))],
                AXIS_COLOR.stroke_width(1),
            ))
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;

        // Year ticks.
        let span = (g.x.domain.1 - g.x.domain.0).abs() as usize;
        for tick in g.x.ticks(span.clamp(1, 12)) {
            let x = px(g.x.scale(tick));
            self.area
                .draw(&PathElement::new(
                    vec![(x, px(y_bottom)), (x, px(y_bottom) + 4)],
                    AXIS_COLOR.stroke_width(1),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            self.area
                .draw(&Text::new(
                    format_year(tick),
                    (x, px(y_bottom) + 8),
                    text_style(12, Pos::new(HPos::Center, VPos::Top)),
                ))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        }

        draw_legend_panel(self.area, &g.legend, self.opts.legend, &g.config)
    }
}

/// Clear, then paint the given pipeline outcome: a chart for `Ready`, a bare
/// frame for `Empty`, a text message for `Loading`/`Failed`.
pub fn draw_on<DB>(
    area: &DrawingArea<DB, Shift>,
    status: &ChartStatus,
    opts: &RenderOptions,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let renderer = Renderer::new(area, opts.clone());
    renderer.clear()?;
    match status {
        ChartStatus::Loading => renderer.draw_status("loading data…"),
        ChartStatus::Failed => renderer.draw_status("data fetch failed"),
        ChartStatus::Empty => renderer.draw_empty(),
        ChartStatus::Ready(geometry) => renderer.draw(geometry),
    }
}

/// Render to a file; the backend is chosen by extension (`.svg` vectors,
/// anything else via the bitmap backend).
pub fn render_chart<P: AsRef<Path>>(
    status: &ChartStatus,
    out_path: P,
    width: u32,
    height: u32,
    opts: &RenderOptions,
) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_on(&root, status, opts)?;
        root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_on(&root, status, opts)?;
        root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    Ok(())
}

/// Render to an in-memory SVG string. Used by tests and embedders that
/// want the markup rather than a file.
pub fn render_to_svg_string(
    status: &ChartStatus,
    size: (u32, u32),
    opts: &RenderOptions,
) -> Result<String> {
    ensure_fonts_registered();
    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, size).into_drawing_area();
        draw_on(&root, status, opts)?;
        root.present().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    }
    Ok(buffer)
}
