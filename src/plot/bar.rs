use tracing::trace;

use crate::api::ChartOptions;
use crate::core::{Axis, DataAggregator, DataPoint, Rect, Series, is_valid};
use crate::interaction::HitShape;
use crate::render::RenderEngine;

use super::geometry::{WidthSpec, clip_to_plot};
use super::stack::{StackFamily, stack_input};
use super::{
    PlotContext, Plotter, PlotterKind, SeriesOrdinal, baseline_value, data_bounds,
};

/// Group width used when no `group_width` option is set, as a share of the
/// minimum x gap.
pub(crate) const DEFAULT_GROUP_RATIO: f64 = 0.7;

/// X-dimension span of one bar in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSlot {
    pub start: f64,
    pub end: f64,
}

impl BarSlot {
    /// Slot of series `ordinal` of `count` inside the group centered on `x`.
    ///
    /// `group` is the whole group width, `gap` the space between adjacent
    /// slots. A single or stacked series spans the full group.
    #[must_use]
    pub fn compute(x: f64, group: f64, gap: f64, ordinal: usize, count: usize, full: bool) -> Self {
        let group = group.max(0.0);
        let left = x - 0.5 * group;
        if full || count <= 1 {
            return Self {
                start: left,
                end: left + group,
            };
        }
        let gaps = (count - 1) as f64;
        let gap = gap.clamp(0.0, group / gaps);
        let width = ((group - gap * gaps) / count as f64).max(0.0);
        let start = left + ordinal as f64 * (width + gap);
        Self {
            start,
            end: start + width,
        }
    }

    #[must_use]
    pub fn center(self) -> f64 {
        0.5 * (self.start + self.end)
    }

    #[must_use]
    pub fn width(self) -> f64 {
        self.end - self.start
    }
}

/// Group/gap sizing shared by bar-like plotters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct GroupLayout {
    pub group_width: Option<WidthSpec>,
    pub gap_width: Option<WidthSpec>,
}

impl GroupLayout {
    pub fn from_options(options: &ChartOptions) -> Self {
        Self {
            group_width: options.group_width,
            gap_width: options.gap_width,
        }
    }

    /// Resolved `(group, gap)` widths in data units for the current axes.
    pub fn resolve(&self, data: &DataAggregator, axis_x: &Axis) -> (f64, f64) {
        let delta = data.delta_x_or_unit();
        let pixels_per_unit = axis_x.length_in_pixels(1.0);
        let group = self
            .group_width
            .map_or(DEFAULT_GROUP_RATIO * delta, |spec| spec.to_data_units(delta, pixels_per_unit));
        let gap = self
            .gap_width
            .map_or(0.0, |spec| spec.to_data_units(group, pixels_per_unit));
        (group, gap)
    }
}

/// Column (vertical) and bar (rotated) plotter.
#[derive(Debug, Clone)]
pub struct BarPlotter {
    layout: GroupLayout,
    origin: f64,
}

impl BarPlotter {
    #[must_use]
    pub fn new(options: &ChartOptions) -> Self {
        Self {
            layout: GroupLayout::from_options(options),
            origin: options.bar_origin,
        }
    }
}

impl Plotter for BarPlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::Bar
    }

    fn adjust_limits(&self, data: &DataAggregator, _plot_rect: Rect, axis_y: &Axis) -> Option<Rect> {
        let half = 0.5 * data.delta_x_or_unit();
        let (mut min_y, mut max_y) = (data.min_y(), data.max_y());
        if axis_y.log_base().is_none() && min_y.is_finite() {
            min_y = min_y.min(self.origin);
            max_y = max_y.max(self.origin);
        }
        data_bounds(data.min_x() - half, data.max_x() + half, min_y, max_y)
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

        let stacked = ctx.stacking.is_stacked();
        let (pen, alt_pen) = ctx.series_pens(series, series_index);
        let projector = ctx.projector();
        let (group, gap) = self.layout.resolve(ctx.data, ctx.axis_x);
        let origin = baseline_value(ctx.axis_y, self.origin);
        let (axis_x, axis_y) = (ctx.axis_x.id(), ctx.axis_y.id());
        let values = series.y_values();

        let mut drawn = 0_usize;
        for index in 0..series.len() {
            let x = series.x_at(index);
            let y = values.get(index).copied().unwrap_or(f64::NAN);
            if !is_valid(x) || !is_valid(y) {
                continue;
            }

            let (lower, upper) = if stacked {
                let value = stack_input(ctx.stacking, ctx.data, x, y);
                let span = ctx.stacks.state(StackFamily::Bar, axis_x, axis_y).push(x, value);
                (baseline_value(ctx.axis_y, span.lower), span.upper)
            } else {
                (origin, y)
            };

            let slot = BarSlot::compute(x, group, gap, ordinal.ordinal, ordinal.count, stacked);
            let rect = projector.rect(slot.start, slot.end, lower, upper);
            let Some(visible) = clip_to_plot(ctx.plot_rect, rect) else {
                continue;
            };

            let tag = DataPoint::new(series_index, index, x, y);
            engine.set_pen(if y < 0.0 { alt_pen } else { pen });
            ctx.render_symbol(engine, series, tag, &mut |engine| engine.draw_rect(visible));
            ctx.add_hit(HitShape::Rect(visible), tag);
            drawn += 1;
        }

        trace!(series = series_index, drawn, stacked, "plot bar series");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_partition_the_group() {
        let first = BarSlot::compute(2.0, 0.6, 0.0, 0, 3, false);
        let last = BarSlot::compute(2.0, 0.6, 0.0, 2, 3, false);
        assert!((first.start - 1.7).abs() <= 1e-12);
        assert!((last.end - 2.3).abs() <= 1e-12);
        assert!((first.width() - 0.2).abs() <= 1e-12);
    }

    #[test]
    fn gaps_narrow_each_slot() {
        let first = BarSlot::compute(0.0, 1.0, 0.2, 0, 2, false);
        let second = BarSlot::compute(0.0, 1.0, 0.2, 1, 2, false);
        assert!((first.width() - 0.4).abs() <= 1e-12);
        assert!((second.start - first.end - 0.2).abs() <= 1e-12);
    }

    #[test]
    fn stacked_and_single_series_span_the_group() {
        let stacked = BarSlot::compute(1.0, 0.7, 0.1, 1, 3, true);
        assert_eq!(stacked.center(), 1.0);
        assert!((stacked.width() - 0.7).abs() <= 1e-12);
        let single = BarSlot::compute(1.0, 0.7, 0.1, 0, 1, false);
        assert_eq!(single, stacked);
    }

    #[test]
    fn origin_is_folded_into_the_range() {
        let series = Series::new("s", vec![3.0, 5.0]);
        let data = DataAggregator::analyse(
            &[(&series, crate::core::ChartType::Column)],
            crate::core::Stacking::None,
        );
        let plotter = BarPlotter::new(&ChartOptions::default());
        let rect = plotter
            .adjust_limits(&data, Rect::new(0.0, 0.0, 100.0, 100.0), &Axis::vertical(1))
            .expect("bounds");
        assert_eq!(rect.top, 0.0);
        assert_eq!(rect.bottom(), 5.0);
        assert_eq!((rect.left, rect.right()), (-0.5, 1.5));
    }
}
