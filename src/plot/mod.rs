//! Per-chart-family plotters.
//!
//! Each plotter turns one series plus the frozen X/Y axes into draw calls on
//! a [`RenderEngine`] and hit shapes in the shared [`HitIndex`]. A render
//! pass drives every plotter through `clear → load → adjust_limits →
//! plot_series → unload`.

mod area;
mod bar;
mod boxplot;
mod finance;
mod funnel;
mod geometry;
mod line;
mod stack;
mod volume;

pub use area::AreaPlotter;
pub use bar::{BarPlotter, BarSlot};
pub use boxplot::BoxPlotter;
pub use finance::FinancePlotter;
pub use funnel::{FunnelPlotter, funnel_total_area};
pub use geometry::{Projector, WidthSpec, clip_to_plot, inside_plot};
pub use line::LinePlotter;
pub use stack::{StackFamily, StackRegistry, StackState, StackedValue, stack_input};
pub use volume::VolumeConversion;

use crate::api::ChartOptions;
use crate::core::{Axis, ChartType, DataAggregator, DataPoint, Point, Rect, Series, SeriesStyle, Stacking};
use crate::interaction::{HitArea, HitIndex, HitShape, HitTestResult, SliceLabels};
use crate::render::{Palette, Pen, RenderEngine};

/// Plotter family; series of one family on one axis pair share a plotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlotterKind {
    Bar,
    Area,
    Line,
    Finance,
    Funnel,
    BoxPlot,
}

impl PlotterKind {
    #[must_use]
    pub fn of(chart_type: ChartType) -> Self {
        match chart_type {
            ChartType::Column | ChartType::Bar => Self::Bar,
            ChartType::Area | ChartType::SplineArea => Self::Area,
            ChartType::Scatter
            | ChartType::Line
            | ChartType::LineSymbols
            | ChartType::Spline
            | ChartType::SplineSymbols => Self::Line,
            ChartType::HighLowOpenClose
            | ChartType::Candlestick
            | ChartType::CandleVolume
            | ChartType::EquiVolume
            | ChartType::ArmsCandleVolume => Self::Finance,
            ChartType::Funnel => Self::Funnel,
            ChartType::BoxWhisker => Self::BoxPlot,
        }
    }
}

/// Position of a series among the series handled by one plotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesOrdinal {
    /// Index of the series in the chart.
    pub series_index: usize,
    /// Index among the series of the same plotter.
    pub ordinal: usize,
    /// Number of series handled by the plotter.
    pub count: usize,
    /// Effective chart type of the series.
    pub chart_type: ChartType,
}

/// Per-point rendering override.
///
/// Called for every symbol with the engine, the resolved data point and the
/// default rendering; implementations may change the pen and then either
/// call `default_render` or draw something else. The pen is restored after
/// the call.
pub trait ItemFormatter {
    fn format(
        &self,
        engine: &mut dyn RenderEngine,
        hit: &HitTestResult<'_>,
        default_render: &mut dyn FnMut(&mut dyn RenderEngine),
    );
}

impl<F> ItemFormatter for F
where
    F: Fn(&mut dyn RenderEngine, &HitTestResult<'_>, &mut dyn FnMut(&mut dyn RenderEngine)),
{
    fn format(
        &self,
        engine: &mut dyn RenderEngine,
        hit: &HitTestResult<'_>,
        default_render: &mut dyn FnMut(&mut dyn RenderEngine),
    ) {
        self(engine, hit, default_render);
    }
}

/// Render-pass state shared by every `plot_series` call of one axis pair.
pub struct PlotContext<'a> {
    pub plot_rect: Rect,
    pub axis_x: &'a Axis,
    pub axis_y: &'a Axis,
    pub rotated: bool,
    pub stacking: Stacking,
    pub interpolate_nulls: bool,
    pub palette: &'a Palette,
    pub data: &'a DataAggregator,
    pub stacks: &'a mut StackRegistry,
    pub hits: &'a mut HitIndex,
    pub slices: &'a mut SliceLabels,
    pub item_formatter: Option<&'a dyn ItemFormatter>,
}

impl<'a> PlotContext<'a> {
    #[must_use]
    pub fn projector(&self) -> Projector<'a> {
        Projector::new(self.axis_x, self.axis_y, self.rotated)
    }

    /// Primary and alternate pens of a series, palette-resolved.
    #[must_use]
    pub fn series_pens(&self, series: &Series, series_index: usize) -> (Pen, Pen) {
        let base = self.palette.color(series_index);
        let primary = series.style.resolved(base);
        let alt = series.alt_style.map_or(primary, |style| style.resolved(base));
        (style_pen(primary), style_pen(alt))
    }

    pub fn add_hit(&mut self, shape: HitShape, tag: DataPoint) {
        self.hits.add(HitArea::new(shape, tag), tag.series_index);
    }

    /// Draws one symbol through the item formatter when one is installed.
    pub fn render_symbol(
        &self,
        engine: &mut dyn RenderEngine,
        series: &Series,
        tag: DataPoint,
        draw: &mut dyn FnMut(&mut dyn RenderEngine),
    ) {
        self.format_symbol(engine, series, tag, None, draw);
    }

    /// Like `render_symbol`, but the formatter sees the slice name and value
    /// recorded for `tag.point_index`.
    pub fn render_slice_symbol(
        &self,
        engine: &mut dyn RenderEngine,
        series: &Series,
        tag: DataPoint,
        draw: &mut dyn FnMut(&mut dyn RenderEngine),
    ) {
        self.format_symbol(engine, series, tag, Some(&*self.slices), draw);
    }

    fn format_symbol(
        &self,
        engine: &mut dyn RenderEngine,
        series: &Series,
        tag: DataPoint,
        slices: Option<&SliceLabels>,
        draw: &mut dyn FnMut(&mut dyn RenderEngine),
    ) {
        match self.item_formatter {
            Some(formatter) => {
                let saved = engine.pen();
                let hit = HitTestResult::new(series, self.axis_x, self.axis_y, tag, 0.0);
                let hit = match slices {
                    Some(slices) => hit.with_slices(slices),
                    None => hit,
                };
                formatter.format(engine, &hit, draw);
                engine.set_pen(saved);
            }
            None => draw(engine),
        }
    }
}

/// Shared plotter contract.
pub trait Plotter {
    fn kind(&self) -> PlotterKind;

    /// Resets per-pass plotter state.
    fn clear(&mut self) {}

    /// Installs per-pass axis customisations. Must be undone by `unload`.
    fn load(&mut self, _axis_x: &mut Axis, _axis_y: &mut Axis, _series: &[&Series]) {}

    fn unload(&mut self, _axis_x: &mut Axis, _axis_y: &mut Axis) {}

    /// Data-space bounds proposed for this plotter's series: `left`/`right`
    /// span the X dimension and `top`/`bottom` the Y dimension (top holds the
    /// smaller value). `None` when the series contribute no range.
    fn adjust_limits(&self, data: &DataAggregator, plot_rect: Rect, axis_y: &Axis) -> Option<Rect>;

    fn plot_series(
        &mut self,
        ctx: &mut PlotContext<'_>,
        engine: &mut dyn RenderEngine,
        series: &Series,
        ordinal: SeriesOrdinal,
    );
}

/// Builds the plotter handling `chart_type`.
#[must_use]
pub fn plotter_for(chart_type: ChartType, options: &ChartOptions) -> Box<dyn Plotter> {
    match PlotterKind::of(chart_type) {
        PlotterKind::Bar => Box::new(BarPlotter::new(options)),
        PlotterKind::Area => Box::new(AreaPlotter::new(chart_type, options)),
        PlotterKind::Line => Box::new(LinePlotter::new(options)),
        PlotterKind::Finance => Box::new(FinancePlotter::new(chart_type, options)),
        PlotterKind::Funnel => Box::new(FunnelPlotter::new(options)),
        PlotterKind::BoxPlot => Box::new(BoxPlotter::new(options)),
    }
}

#[must_use]
pub(crate) fn style_pen(style: SeriesStyle) -> Pen {
    Pen {
        fill: style.fill,
        stroke: style.stroke,
        stroke_width: style.stroke_width,
    }
}

/// Data-space bounds rectangle from X and Y extents.
#[must_use]
pub(crate) fn data_bounds(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Option<Rect> {
    let values = [min_x, max_x, min_y, max_y];
    values
        .iter()
        .all(|v| v.is_finite())
        .then(|| Rect::from_corners(min_x, min_y, max_x, max_y))
}

/// Baseline usable on `axis`: log axes replace non-positive values with the
/// visible minimum.
#[must_use]
pub(crate) fn baseline_value(axis: &Axis, value: f64) -> f64 {
    if axis.log_base().is_some() && value <= 0.0 {
        axis.actual_min()
    } else {
        value
    }
}

/// Splits a series into drawable runs of `(point index, screen point)`.
///
/// A point is drawable when `point_at` yields a finite screen point. Runs
/// break at undrawable points unless `interpolate` is set, in which case
/// those points are skipped and the run continues across the gap.
pub(crate) fn point_runs(
    len: usize,
    interpolate: bool,
    mut point_at: impl FnMut(usize) -> Option<Point>,
) -> Vec<Vec<(usize, Point)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for index in 0..len {
        match point_at(index).filter(|point| point.is_finite()) {
            Some(point) => current.push((index, point)),
            None if interpolate => {}
            None => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Round point marker of diameter `size`.
pub(crate) fn draw_marker(engine: &mut dyn RenderEngine, center: Point, size: f64) {
    let radius = 0.5 * size;
    engine.draw_ellipse(center, radius, radius);
}
