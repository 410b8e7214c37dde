use tracing::trace;

use crate::api::ChartOptions;
use crate::core::spline::smooth;
use crate::core::{Axis, ChartType, DataAggregator, DataPoint, Point, Rect, Series, is_valid};
use crate::interaction::HitShape;
use crate::render::{Pen, RenderEngine};

use super::geometry::inside_plot;
use super::stack::{StackFamily, stack_input};
use super::{
    PlotContext, Plotter, PlotterKind, SeriesOrdinal, baseline_value, data_bounds, point_runs,
};

/// Share of the Y span added to spline-area ranges against overshoot.
const SPLINE_PADDING: f64 = 0.1;

/// Area and spline-area plotter.
#[derive(Debug, Clone)]
pub struct AreaPlotter {
    spline: bool,
    symbol_size: f64,
}

impl AreaPlotter {
    #[must_use]
    pub fn new(chart_type: ChartType, options: &ChartOptions) -> Self {
        Self {
            spline: chart_type.is_spline(),
            symbol_size: options.symbol_size,
        }
    }

    fn fill_and_stroke(engine: &mut dyn RenderEngine, pen: Pen, polygon: &[Point], line: &[Point]) {
        engine.set_pen(Pen {
            stroke: None,
            ..pen
        });
        engine.draw_polygon(polygon);
        engine.set_pen(Pen { fill: None, ..pen });
        engine.draw_lines(line);
    }

    fn plot_independent(
        &self,
        ctx: &mut PlotContext<'_>,
        engine: &mut dyn RenderEngine,
        series: &Series,
        ordinal: SeriesOrdinal,
        pen: Pen,
    ) -> usize {
        let projector = ctx.projector();
        let values = series.y_values();
        let floor = projector.clamp_y(baseline_value(ctx.axis_y, 0.0));
        let spline = ordinal.chart_type.is_spline();

        let runs = point_runs(series.len(), ctx.interpolate_nulls, |index| {
            let x = series.x_at(index);
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            (is_valid(x) && is_valid(y)).then(|| projector.point(x, y))
        });

        for run in &runs {
            let knots: Vec<Point> = run.iter().map(|(_, point)| *point).collect();
            let line = if spline { smooth(&knots) } else { knots };
            let (first_index, _) = run[0];
            let (last_index, _) = run[run.len() - 1];
            let mut polygon = line.clone();
            polygon.push(projector.point(series.x_at(last_index), floor));
            polygon.push(projector.point(series.x_at(first_index), floor));

            Self::fill_and_stroke(engine, pen, &polygon, &line);
            self.add_point_hits(ctx, series, ordinal, run, &line);
        }
        runs.len()
    }

    fn plot_stacked(
        &self,
        ctx: &mut PlotContext<'_>,
        engine: &mut dyn RenderEngine,
        series: &Series,
        ordinal: SeriesOrdinal,
        pen: Pen,
    ) -> usize {
        let projector = ctx.projector();
        let values = series.y_values();
        let (axis_x, axis_y) = (ctx.axis_x.id(), ctx.axis_y.id());
        let spline = ordinal.chart_type.is_spline();

        let mut run = Vec::new();
        let mut lower = Vec::new();
        for index in 0..series.len() {
            let x = series.x_at(index);
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            if !is_valid(x) || !is_valid(y) {
                continue;
            }
            let value = stack_input(ctx.stacking, ctx.data, x, y);
            let span = ctx.stacks.state(StackFamily::Area, axis_x, axis_y).push(x, value);
            let top = projector.point(x, span.upper);
            let bottom = projector.point(x, baseline_value(ctx.axis_y, span.lower));
            if top.is_finite() && bottom.is_finite() {
                run.push((index, top));
                lower.push(bottom);
            }
        }
        if run.is_empty() {
            return 0;
        }

        let knots: Vec<Point> = run.iter().map(|(_, point)| *point).collect();
        let upper = if spline { smooth(&knots) } else { knots };
        let state = ctx.stacks.state(StackFamily::Area, axis_x, axis_y);
        let floor = match state.boundary() {
            Some(previous) => previous.to_vec(),
            None if spline => smooth(&lower),
            None => lower,
        };
        state.set_boundary(upper.clone());

        let mut polygon = upper.clone();
        polygon.extend(floor.iter().rev().copied());
        Self::fill_and_stroke(engine, pen, &polygon, &upper);
        self.add_point_hits(ctx, series, ordinal, &run, &upper);
        1
    }

    fn add_point_hits(
        &self,
        ctx: &mut PlotContext<'_>,
        series: &Series,
        ordinal: SeriesOrdinal,
        run: &[(usize, Point)],
        line: &[Point],
    ) {
        let series_index = ordinal.series_index;
        let radius = 0.5 * series.symbol_size.unwrap_or(self.symbol_size);
        let values = series.y_values();
        let tag_of = |index: usize| {
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            DataPoint::new(series_index, index, series.x_at(index), y)
        };

        if line.len() > 1 {
            let visible: Vec<Point> = line
                .iter()
                .copied()
                .filter(|point| inside_plot(ctx.plot_rect, *point))
                .collect();
            if visible.len() > 1 {
                ctx.add_hit(HitShape::Polyline(visible), tag_of(run[0].0));
            }
        }
        for (index, center) in run {
            if inside_plot(ctx.plot_rect, *center) {
                ctx.add_hit(HitShape::Circle { center: *center, radius }, tag_of(*index));
            }
        }
    }
}

impl Plotter for AreaPlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::Area
    }

    fn adjust_limits(&self, data: &DataAggregator, _plot_rect: Rect, axis_y: &Axis) -> Option<Rect> {
        let (mut min_y, mut max_y) = (data.min_y(), data.max_y());
        if self.spline && min_y.is_finite() {
            let pad = SPLINE_PADDING * (max_y - min_y);
            if axis_y.log_base().is_some() {
                max_y += pad;
            } else {
                if min_y != 0.0 {
                    min_y -= pad;
                }
                if max_y != 0.0 {
                    max_y += pad;
                }
            }
        }
        data_bounds(data.min_x(), data.max_x(), min_y, max_y)
    }

    fn plot_series(
        &mut self,
        ctx: &mut PlotContext<'_>,
        engine: &mut dyn RenderEngine,
        series: &Series,
        ordinal: SeriesOrdinal,
    ) {
        let series_index = ordinal.series_index;
        ctx.hits.clear_series(series_index);
        let (pen, _) = ctx.series_pens(series, series_index);

        let runs = if ctx.stacking.is_stacked() {
            self.plot_stacked(ctx, engine, series, ordinal, pen)
        } else {
            self.plot_independent(ctx, engine, series, ordinal, pen)
        };
        trace!(series = series_index, runs, "plot area series");
    }
}
