use tracing::trace;

use crate::api::ChartOptions;
use crate::core::stats::compute_all;
use crate::core::{Axis, BoxStats, DataAggregator, DataPoint, Point, QuartileMethod, Rect, Series, is_valid};
use crate::interaction::HitShape;
use crate::render::{Pen, RenderEngine};

use super::bar::{BarSlot, GroupLayout};
use super::geometry::{Projector, clip_to_plot, inside_plot};
use super::{PlotContext, Plotter, PlotterKind, SeriesOrdinal, data_bounds, draw_marker};

/// Box-and-whisker plotter; boxes share the bar group layout.
#[derive(Debug, Clone)]
pub struct BoxPlotter {
    layout: GroupLayout,
    quartile_method: QuartileMethod,
    show_outliers: bool,
    show_mean_line: bool,
    show_mean_marker: bool,
    whisker_cap_ratio: f64,
    symbol_size: f64,
}

impl BoxPlotter {
    #[must_use]
    pub fn new(options: &ChartOptions) -> Self {
        let box_plot = options.box_plot;
        Self {
            layout: GroupLayout::from_options(options),
            quartile_method: box_plot.quartile_method,
            show_outliers: box_plot.show_outliers,
            show_mean_line: box_plot.show_mean_line,
            show_mean_marker: box_plot.show_mean_marker,
            whisker_cap_ratio: box_plot.whisker_cap_ratio.max(0.0),
            symbol_size: options.symbol_size,
        }
    }

    /// Box, whiskers, caps and median line of one point.
    fn draw_box(
        &self,
        engine: &mut dyn RenderEngine,
        projector: Projector<'_>,
        slot: BarSlot,
        stats: &BoxStats,
    ) {
        let center = slot.center();
        let cap = 0.5 * slot.width() * self.whisker_cap_ratio;

        data_line(engine, projector, (center, stats.third_quartile), (center, stats.max));
        data_line(engine, projector, (center, stats.first_quartile), (center, stats.min));
        if cap > 0.0 {
            data_line(engine, projector, (center - cap, stats.max), (center + cap, stats.max));
            data_line(engine, projector, (center - cap, stats.min), (center + cap, stats.min));
        }
        engine.draw_rect(projector.rect(
            slot.start,
            slot.end,
            stats.first_quartile,
            stats.third_quartile,
        ));
        data_line(engine, projector, (slot.start, stats.median), (slot.end, stats.median));
    }
}

fn data_line(
    engine: &mut dyn RenderEngine,
    projector: Projector<'_>,
    (x0, y0): (f64, f64),
    (x1, y1): (f64, f64),
) {
    engine.draw_line(projector.point(x0, y0), projector.point(x1, y1));
}

/// Mean marker: a cross rotated by 45 degrees.
fn draw_rotated_cross(engine: &mut dyn RenderEngine, center: Point, size: f64) {
    let half = 0.5 * size;
    engine.draw_line(
        Point::new(center.x - half, center.y - half),
        Point::new(center.x + half, center.y + half),
    );
    engine.draw_line(
        Point::new(center.x - half, center.y + half),
        Point::new(center.x + half, center.y - half),
    );
}

impl Plotter for BoxPlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::BoxPlot
    }

    fn adjust_limits(&self, data: &DataAggregator, _plot_rect: Rect, _axis_y: &Axis) -> Option<Rect> {
        let half = 0.5 * data.delta_x_or_unit();
        data_bounds(data.min_x() - half, data.max_x() + half, data.min_y(), data.max_y())
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
        let Some(samples) = series.samples() else {
            return;
        };

        let all_stats = compute_all(samples, self.quartile_method, self.show_outliers);
        let (pen, _) = ctx.series_pens(series, series_index);
        let projector = ctx.projector();
        let (group, gap) = self.layout.resolve(ctx.data, ctx.axis_x);
        let size = series.symbol_size.unwrap_or(self.symbol_size);
        let mut means = Vec::new();

        for (index, stats) in all_stats.iter().enumerate() {
            let x = series.x_at(index);
            let Some(stats) = stats.as_ref().filter(|_| is_valid(x)) else {
                continue;
            };
            let slot = BarSlot::compute(x, group, gap, ordinal.ordinal, ordinal.count, false);
            let bounds = projector.rect(slot.start, slot.end, stats.min, stats.max);
            let Some(visible) = clip_to_plot(ctx.plot_rect, bounds) else {
                continue;
            };

            engine.set_pen(pen);
            let tag = DataPoint::new(series_index, index, x, stats.median);
            ctx.render_symbol(engine, series, tag, &mut |engine| {
                self.draw_box(engine, projector, slot, stats);
            });
            ctx.add_hit(HitShape::Rect(visible), tag);

            let mean = projector.point(slot.center(), stats.mean);
            if mean.is_finite() {
                means.push(mean);
                if self.show_mean_marker {
                    engine.set_pen(Pen { fill: None, ..pen });
                    draw_rotated_cross(engine, mean, size);
                }
            }

            for &outlier in &stats.outliers {
                let center = projector.point(slot.center(), outlier);
                if !center.is_finite() {
                    continue;
                }
                engine.set_pen(pen);
                draw_marker(engine, center, 0.5 * size);
                if inside_plot(ctx.plot_rect, center) {
                    ctx.add_hit(
                        HitShape::Circle {
                            center,
                            radius: 0.25 * size,
                        },
                        DataPoint::new(series_index, index, x, outlier),
                    );
                }
            }
        }

        if self.show_mean_line && means.len() > 1 {
            engine.set_pen(Pen { fill: None, ..pen });
            engine.draw_lines(&means);
        }

        trace!(series = series_index, boxes = all_stats.len(), "plot box series");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ChartType, Stacking};

    #[test]
    fn limits_include_every_sample() {
        let series = Series::box_samples("b", vec![vec![1.0, 2.0, 30.0], vec![-4.0, 5.0]]);
        let data = DataAggregator::analyse(&[(&series, ChartType::BoxWhisker)], Stacking::None);
        let rect = BoxPlotter::new(&ChartOptions::default())
            .adjust_limits(&data, Rect::new(0.0, 0.0, 10.0, 10.0), &Axis::vertical(1))
            .expect("bounds");
        assert_eq!((rect.top, rect.bottom()), (-4.0, 30.0));
        assert_eq!((rect.left, rect.right()), (-0.5, 1.5));
    }
}
