use tracing::trace;

use crate::api::ChartOptions;
use crate::core::spline::smooth;
use crate::core::{Axis, ChartType, DataAggregator, DataPoint, Point, Rect, Series, is_valid};
use crate::interaction::HitShape;
use crate::render::{Pen, RenderEngine};

use super::geometry::inside_plot;
use super::stack::{StackFamily, stack_input};
use super::{
    PlotContext, Plotter, PlotterKind, SeriesOrdinal, data_bounds, draw_marker, point_runs,
};

/// Line, spline and scatter plotter.
#[derive(Debug, Clone)]
pub struct LinePlotter {
    symbol_size: f64,
}

impl LinePlotter {
    #[must_use]
    pub fn new(options: &ChartOptions) -> Self {
        Self {
            symbol_size: options.symbol_size,
        }
    }

    /// Screen runs of a series; stacked series never interpolate but skip
    /// invalid points without resetting the running sum.
    fn runs(
        ctx: &mut PlotContext<'_>,
        series: &Series,
        stack_lines: bool,
    ) -> Vec<Vec<(usize, Point)>> {
        let projector = ctx.projector();
        let values = series.y_values();
        if !stack_lines {
            return point_runs(series.len(), ctx.interpolate_nulls, |index| {
                let x = series.x_at(index);
                let y = values.get(index).copied().unwrap_or(f64::NAN);
                (is_valid(x) && is_valid(y)).then(|| projector.point(x, y))
            });
        }

        let (axis_x, axis_y) = (ctx.axis_x.id(), ctx.axis_y.id());
        let mut run = Vec::new();
        for index in 0..series.len() {
            let x = series.x_at(index);
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            if !is_valid(x) || !is_valid(y) {
                continue;
            }
            let value = stack_input(ctx.stacking, ctx.data, x, y);
            let span = ctx.stacks.state(StackFamily::Line, axis_x, axis_y).push(x, value);
            let point = projector.point(x, span.upper);
            if point.is_finite() {
                run.push((index, point));
            }
        }
        if run.is_empty() { Vec::new() } else { vec![run] }
    }
}

impl Plotter for LinePlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::Line
    }

    fn adjust_limits(&self, data: &DataAggregator, _plot_rect: Rect, _axis_y: &Axis) -> Option<Rect> {
        data_bounds(data.min_x(), data.max_x(), data.min_y(), data.max_y())
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

        let chart_type = ordinal.chart_type;
        let draws_lines = chart_type != ChartType::Scatter;
        let draws_symbols = matches!(
            chart_type,
            ChartType::Scatter | ChartType::LineSymbols | ChartType::SplineSymbols
        );
        let stack_lines = draws_lines && ctx.stacking.is_stacked();
        let size = series.symbol_size.unwrap_or(self.symbol_size);
        let (pen, _) = ctx.series_pens(series, series_index);
        let values = series.y_values();
        let tag_of = |index: usize| {
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            DataPoint::new(series_index, index, series.x_at(index), y)
        };

        let runs = Self::runs(ctx, series, stack_lines);
        for run in &runs {
            let knots: Vec<Point> = run.iter().map(|(_, point)| *point).collect();
            if draws_lines && knots.len() > 1 {
                let line = if chart_type.is_spline() { smooth(&knots) } else { knots };
                engine.set_pen(Pen { fill: None, ..pen });
                engine.draw_lines(&line);
                let visible: Vec<Point> = line
                    .into_iter()
                    .filter(|point| inside_plot(ctx.plot_rect, *point))
                    .collect();
                if visible.len() > 1 {
                    ctx.add_hit(HitShape::Polyline(visible), tag_of(run[0].0));
                }
            }

            let lone_point = run.len() == 1;
            for &(index, center) in run {
                if draws_symbols || lone_point {
                    let tag = tag_of(index);
                    engine.set_pen(pen);
                    ctx.render_symbol(engine, series, tag, &mut |engine| {
                        draw_marker(engine, center, size);
                    });
                }
                if inside_plot(ctx.plot_rect, center) {
                    ctx.add_hit(
                        HitShape::Circle {
                            center,
                            radius: 0.5 * size,
                        },
                        tag_of(index),
                    );
                }
            }
        }

        trace!(series = series_index, runs = runs.len(), ?chart_type, "plot line series");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stacking;

    #[test]
    fn limits_cover_data_without_padding() {
        let series = Series::new("s", vec![2.0, 8.0, 4.0]);
        let data = DataAggregator::analyse(&[(&series, ChartType::Line)], Stacking::None);
        let rect = LinePlotter::new(&ChartOptions::default())
            .adjust_limits(&data, Rect::new(0.0, 0.0, 10.0, 10.0), &Axis::vertical(1))
            .expect("bounds");
        assert_eq!((rect.left, rect.right(), rect.top, rect.bottom()), (0.0, 2.0, 2.0, 8.0));
    }
}
