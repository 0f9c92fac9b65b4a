//! Geometry computation: scales, stacking, and paths.
//!
//! The layout stage turns normalized structures from [`crate::transform`]
//! into pixel-space geometry plus the scales and legend entries the renderer
//! needs. Like the transformer it is total: empty input produces an empty
//! geometry, never an error.

use crate::models::{BandPoint, SeriesPoint, StackedBand, YearSeries};
use crate::viz::util::series_color;
use plotters::style::RGBColor;
use std::collections::VecDeque;

/// Canvas dimensions and gutters, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub width: u32,
    pub height: u32,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            margin_left: 90.0,
            margin_right: 28.0,
            margin_top: 44.0,
            margin_bottom: 52.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    fn x_range(&self) -> (f64, f64) {
        (self.margin_left, self.width as f64 - self.margin_right)
    }

    /// Pixel Y grows downward, so the range is inverted.
    fn y_range(&self) -> (f64, f64) {
        (self.height as f64 - self.margin_bottom, self.margin_top)
    }
}

/// Linear domain → range mapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    /// A degenerate domain (`min == max`) is widened by ±1 so every value
    /// maps to the middle of the range instead of dividing by zero.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if (domain.1 - domain.0).abs() < f64::EPSILON {
            (domain.0 - 1.0, domain.1 + 1.0)
        } else {
            domain
        };
        Self { domain, range }
    }

    pub fn scale(&self, v: f64) -> f64 {
        let t = (v - self.domain.0) / (self.domain.1 - self.domain.0);
        self.range.0 + t * (self.range.1 - self.range.0)
    }

    /// Round tick values inside the domain with a 1/2/5 step, about
    /// `target` of them.
    pub fn ticks(&self, target: usize) -> Vec<f64> {
        nice_ticks(self.domain.0, self.domain.1, target)
    }
}

/// Ordinal keys spread evenly across a range (first key at `range.0`,
/// last at `range.1`).
#[derive(Debug, Clone, PartialEq)]
pub struct PointScale {
    pub keys: Vec<String>,
    pub range: (f64, f64),
}

impl PointScale {
    pub fn new(keys: Vec<String>, range: (f64, f64)) -> Self {
        Self { keys, range }
    }

    pub fn position(&self, key: &str) -> Option<f64> {
        let i = self.keys.iter().position(|k| k == key)?;
        Some(self.position_of_index(i))
    }

    fn position_of_index(&self, i: usize) -> f64 {
        let n = self.keys.len();
        if n <= 1 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        let t = i as f64 / (n - 1) as f64;
        self.range.0 + t * (self.range.1 - self.range.0)
    }
}

/// Generate round tick values covering `[min, max]` with a 1/2/5 step.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }
    let raw_step = (max - min) / target as f64;
    let mag = 10f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let mut out = Vec::new();
    let mut t = (min / step).ceil() * step;
    while t <= max + step * 1e-9 {
        // Snap near-zero artifacts of the ceil/multiply dance.
        out.push(if t.abs() < step * 1e-9 { 0.0 } else { t });
        t += step;
    }
    out
}

/// Deterministic category → color assignment: a fixed ordered palette cycled
/// by first-seen order, so the same key always gets the same color as long as
/// the category set is unchanged.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    order: Vec<String>,
}

impl ColorMap {
    pub fn color_of(&mut self, key: &str) -> RGBColor {
        let idx = match self.order.iter().position(|k| k == key) {
            Some(i) => i,
            None => {
                self.order.push(key.to_string());
                self.order.len() - 1
            }
        };
        series_color(idx)
    }

    /// Legend entries in assignment order.
    pub fn entries(&self) -> Vec<LegendEntry> {
        self.order
            .iter()
            .enumerate()
            .map(|(i, k)| LegendEntry {
                label: k.clone(),
                color: series_color(i),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
}

/// One horizontal metric axis of the parallel chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricAxis {
    pub key: String,
    /// Vertical pixel position of the axis line.
    pub y: f64,
    /// Value → horizontal pixel position, over this metric's own extent.
    pub scale: LinearScale,
}

/// A polyline through all metric axes for one country, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub name: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParallelGeometry {
    pub config: LayoutConfig,
    pub axes: Vec<MetricAxis>,
    /// Draw order: ascending by the primary metric, so overlapping strokes
    /// layer deterministically.
    pub lines: Vec<Polyline>,
    pub legend: Vec<LegendEntry>,
}

/// One filled band of the stream graph, in pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BandShape {
    pub country: String,
    pub color: RGBColor,
    /// Closed polygon: lower edge forward, upper edge reversed.
    pub polygon: Vec<(f64, f64)>,
    /// The upper edge alone, for the outline stroke.
    pub top: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamGeometry {
    pub config: LayoutConfig,
    /// Year → horizontal pixel position.
    pub x: LinearScale,
    /// Stacked value → vertical pixel position, over the global min/max of
    /// all accumulated bounds.
    pub y: LinearScale,
    /// Data-space bands in stacking order (bottom first).
    pub bands: Vec<StackedBand>,
    /// Pixel-space shapes, same order as `bands`.
    pub shapes: Vec<BandShape>,
    pub legend: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Parallel(ParallelGeometry),
    Stream(StreamGeometry),
}

impl Geometry {
    pub fn legend(&self) -> &[LegendEntry] {
        match self {
            Geometry::Parallel(g) => &g.legend,
            Geometry::Stream(g) => &g.legend,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Parallel(g) => g.lines.is_empty(),
            Geometry::Stream(g) => g.bands.is_empty(),
        }
    }
}

/// Lay out the multi-axis line chart.
///
/// One horizontal axis per metric key (top to bottom in declared order), each
/// with an independent linear scale over that metric's own extent across all
/// series. Each series becomes a polyline connecting its scaled value on
/// every axis.
pub fn parallel_layout(
    series: &[SeriesPoint],
    metric_keys: &[String],
    primary_metric: &str,
    config: &LayoutConfig,
) -> ParallelGeometry {
    let axis_pos = PointScale::new(metric_keys.to_vec(), {
        let (lo, hi) = config.y_range();
        // Top-to-bottom in declared metric order.
        (hi, lo)
    });

    let axes: Vec<MetricAxis> = metric_keys
        .iter()
        .map(|key| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            for s in series {
                let v = s.value(key);
                min = min.min(v);
                max = max.max(v);
            }
            if !min.is_finite() {
                (min, max) = (0.0, 1.0);
            }
            MetricAxis {
                key: key.clone(),
                y: axis_pos.position(key).unwrap_or(0.0),
                scale: LinearScale::new((min, max), config.x_range()),
            }
        })
        .collect();

    // Colors and legend follow first-seen input order; draw order sorts by
    // the primary metric ascending.
    let mut colors = ColorMap::default();
    let line_colors: Vec<RGBColor> = series.iter().map(|s| colors.color_of(&s.name)).collect();

    let mut draw_order: Vec<usize> = (0..series.len()).collect();
    draw_order.sort_by(|&a, &b| {
        series[a]
            .value(primary_metric)
            .partial_cmp(&series[b].value(primary_metric))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let lines = draw_order
        .into_iter()
        .map(|i| {
            let s = &series[i];
            let points = axes
                .iter()
                .map(|axis| (axis.scale.scale(s.value(&axis.key)), axis.y))
                .collect();
            Polyline {
                name: s.name.clone(),
                color: line_colors[i],
                points,
            }
        })
        .collect();

    ParallelGeometry {
        config: *config,
        axes,
        lines,
        legend: colors.entries(),
    }
}

/// Inside-out stacking order: sort by total magnitude descending, then
/// alternate insertion at the two ends of the band list so the largest
/// series end up toward the visual center. Returns indices into `series`,
/// bottom band first.
pub fn inside_out_order(series: &[YearSeries]) -> Vec<usize> {
    let mut by_total: Vec<usize> = (0..series.len()).collect();
    by_total.sort_by(|&a, &b| {
        series[b]
            .total()
            .partial_cmp(&series[a].total())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(series.len());
    for (rank, idx) in by_total.into_iter().enumerate() {
        if rank % 2 == 0 {
            deque.push_front(idx);
        } else {
            deque.push_back(idx);
        }
    }
    deque.into_iter().collect()
}

/// Wiggle-minimizing baseline: at each step the baseline shifts against the
/// thickness-weighted mean slope of the bands, which keeps the stack's
/// visual center steady.
fn wiggle_baseline(values: &[Vec<f64>], order: &[usize], n_years: usize) -> Vec<f64> {
    let mut base = vec![0.0; n_years];
    for j in 1..n_years {
        let mut total = 0.0;
        let mut weighted = 0.0;
        let mut below = 0.0;
        for &i in order {
            let h1 = values[i][j];
            let h0 = values[i][j - 1];
            let d = h1 - h0;
            weighted += h1 * (below + d / 2.0);
            total += h1;
            below += d;
        }
        let shift = if total > 0.0 { weighted / total } else { 0.0 };
        base[j] = base[j - 1] - shift;
    }
    base
}

/// Lay out the stacked stream graph.
///
/// Bands stack in inside-out order above a wiggle-minimizing baseline; for
/// every year the bands partition the interval from the baseline to the
/// cumulative top with no gaps and no overlaps.
pub fn stream_layout(series: &[YearSeries], config: &LayoutConfig) -> StreamGeometry {
    let years: Vec<i32> = series
        .first()
        .map(|s| s.points.iter().map(|(y, _)| *y).collect())
        .unwrap_or_default();
    let n_years = years.len();

    if n_years == 0 {
        let x = LinearScale::new((0.0, 1.0), config.x_range());
        let y = LinearScale::new((0.0, 1.0), config.y_range());
        return StreamGeometry {
            config: *config,
            x,
            y,
            bands: Vec::new(),
            shapes: Vec::new(),
            legend: Vec::new(),
        };
    }

    // Negative values cannot stack; clamp like any area accumulation must.
    let values: Vec<Vec<f64>> = series
        .iter()
        .map(|s| s.points.iter().map(|(_, v)| v.max(0.0)).collect())
        .collect();

    let order = inside_out_order(series);
    let base = wiggle_baseline(&values, &order, n_years);

    let mut cum = base.clone();
    let mut bands: Vec<StackedBand> = Vec::with_capacity(order.len());
    for &i in &order {
        let mut points = Vec::with_capacity(n_years);
        for j in 0..n_years {
            let lower = cum[j];
            cum[j] += values[i][j];
            points.push(BandPoint {
                year: years[j],
                lower,
                upper: cum[j],
            });
        }
        bands.push(StackedBand {
            country: series[i].country.clone(),
            points,
        });
    }

    let min_bound = base.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_bound = cum.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let x = LinearScale::new(
        (years[0] as f64, years[n_years - 1] as f64),
        config.x_range(),
    );
    let y = LinearScale::new((min_bound, max_bound), config.y_range());

    // Colors in first-seen input order, independent of stacking order.
    let mut colors = ColorMap::default();
    let band_colors: Vec<RGBColor> = series.iter().map(|s| colors.color_of(&s.country)).collect();

    let shapes = order
        .iter()
        .zip(&bands)
        .map(|(&i, band)| {
            let top: Vec<(f64, f64)> = band
                .points
                .iter()
                .map(|p| (x.scale(p.year as f64), y.scale(p.upper)))
                .collect();
            let mut polygon: Vec<(f64, f64)> = band
                .points
                .iter()
                .map(|p| (x.scale(p.year as f64), y.scale(p.lower)))
                .collect();
            polygon.extend(top.iter().rev().copied());
            BandShape {
                country: band.country.clone(),
                color: band_colors[i],
                polygon,
                top,
            }
        })
        .collect();

    StreamGeometry {
        config: *config,
        x,
        y,
        bands,
        shapes,
        legend: colors.entries(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_are_round_and_cover() {
        let t = nice_ticks(0.0, 100.0, 5);
        assert_eq!(t, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert!(nice_ticks(5.0, 5.0, 5).is_empty());
    }

    #[test]
    fn degenerate_domain_maps_to_midpoint() {
        let s = LinearScale::new((7.0, 7.0), (0.0, 100.0));
        assert!((s.scale(7.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn point_scale_spreads_keys() {
        let p = PointScale::new(vec!["a".into(), "b".into(), "c".into()], (0.0, 100.0));
        assert_eq!(p.position("a"), Some(0.0));
        assert_eq!(p.position("b"), Some(50.0));
        assert_eq!(p.position("c"), Some(100.0));
        assert_eq!(p.position("d"), None);
    }

    #[test]
    fn inside_out_puts_largest_toward_center() {
        let mk = |name: &str, v: f64| YearSeries {
            country: name.into(),
            points: vec![(2020, v), (2021, v)],
        };
        let series = vec![mk("a", 40.0), mk("b", 30.0), mk("c", 20.0), mk("d", 10.0)];
        let order = inside_out_order(&series);
        // Sorted desc: a,b,c,d -> alternate front/back: [c, a, b, d]
        assert_eq!(order, vec![2, 0, 1, 3]);
    }
}
