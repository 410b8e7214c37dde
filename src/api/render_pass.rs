use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{Axis, AxisId, AxisPosition, ChartType, DataAggregator, Rect, Series};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{HitIndex, SliceLabels};
use crate::plot::{ItemFormatter, PlotContext, Plotter, PlotterKind, SeriesOrdinal, StackRegistry, plotter_for};
use crate::render::{Palette, RenderEngine};

use super::chart::{Chart, PRIMARY_X, PRIMARY_Y};
use super::options::ChartOptions;

/// Series sharing one plotter: same family on the same axis pair.
#[derive(Debug, Clone)]
pub struct PlotGroup {
    pub kind: PlotterKind,
    pub axis_x: AxisId,
    pub axis_y: AxisId,
    /// Effective chart type of the first series; selects the plotter.
    pub chart_type: ChartType,
    /// Chart indices of the member series, in z-order.
    pub series: Vec<usize>,
    /// Data summary the group was laid out and stacked with.
    pub data: DataAggregator,
}

struct GroupPass {
    plotter: Box<dyn Plotter>,
    kind: PlotterKind,
    axis_x: AxisId,
    axis_y: AxisId,
    chart_type: ChartType,
    members: Vec<usize>,
}

/// Borrowed chart state for one pass.
struct PassScene<'a> {
    options: &'a ChartOptions,
    series: &'a [Series],
    axes: &'a mut [Axis],
    palette: &'a Palette,
    plot_rect: Rect,
    hits: &'a mut HitIndex,
    slices: &'a mut SliceLabels,
    stacks: &'a mut StackRegistry,
    item_formatter: Option<&'a dyn ItemFormatter>,
}

/// Runs `clear → load → adjust_limits → layout → plot → unload` over every
/// plot group. Axis customisations made in `load` are undone even when
/// layout fails.
pub(super) fn run_render_pass<E: RenderEngine>(chart: &mut Chart<E>) -> ChartResult<()> {
    let plot_rect = chart.plot_rect.validate_plot_area()?;
    let Chart {
        engine,
        options,
        series,
        axes,
        palette,
        hits,
        slices,
        stacks,
        groups,
        item_formatter,
        ..
    } = chart;

    let rotated = options.is_rotated();
    debug!(series = series.len(), axes = axes.len(), rotated, "render pass start");

    hits.clear();
    slices.clear();
    stacks.clear();
    groups.clear();

    let mut scene = PassScene {
        options,
        series,
        axes,
        palette,
        plot_rect,
        hits,
        slices,
        stacks,
        item_formatter: item_formatter.as_deref(),
    };

    let mut passes = scene.group_series()?;
    scene.orient_axes(&passes, rotated);
    scene.load(&mut passes);
    let outcome = scene.resolve_axes(&passes);
    if let Ok(data) = &outcome {
        scene.plot(&mut *engine, &mut passes, data, rotated);
    }
    scene.unload(&mut passes);
    let data = outcome?;

    groups.extend(passes.into_iter().zip(data).map(|(pass, data)| PlotGroup {
        kind: pass.kind,
        axis_x: pass.axis_x,
        axis_y: pass.axis_y,
        chart_type: pass.chart_type,
        series: pass.members,
        data,
    }));
    debug!(groups = groups.len(), hits = scene.hits.len(), "render pass complete");
    Ok(())
}

impl PassScene<'_> {
    fn effective_type(&self, series: &Series) -> ChartType {
        series.chart_type.unwrap_or(self.options.chart_type)
    }

    /// Buckets visible series by plotter family and axis pair, keeping the
    /// order in which groups first appear.
    fn group_series(&self) -> ChartResult<Vec<GroupPass>> {
        let mut keyed: IndexMap<(PlotterKind, AxisId, AxisId), Vec<usize>> = IndexMap::new();
        let mut roles: Vec<Option<bool>> = vec![None; self.axes.len()];

        for (index, series) in self.series.iter().enumerate() {
            if !series.visible {
                continue;
            }
            let axis_x = series.axis_x.unwrap_or(PRIMARY_X);
            let axis_y = series.axis_y.unwrap_or(PRIMARY_Y);
            if axis_x == axis_y {
                return Err(ChartError::InvalidOption(format!(
                    "series {index} binds axis {} as both X and Y",
                    axis_x.0
                )));
            }
            for (axis, is_x) in [(axis_x, true), (axis_y, false)] {
                let role = roles.get_mut(axis.0).ok_or_else(|| {
                    ChartError::InvalidOption(format!("series {index} binds unknown axis {}", axis.0))
                })?;
                match *role {
                    Some(existing) if existing != is_x => {
                        return Err(ChartError::InvalidOption(format!(
                            "axis {} is used as both X and Y",
                            axis.0
                        )));
                    }
                    _ => *role = Some(is_x),
                }
            }
            let kind = PlotterKind::of(self.effective_type(series));
            keyed.entry((kind, axis_x, axis_y)).or_default().push(index);
        }

        Ok(keyed
            .into_iter()
            .filter_map(|((kind, axis_x, axis_y), members)| {
                let first = self.series.get(*members.first()?)?;
                let chart_type = self.effective_type(first);
                Some(GroupPass {
                    plotter: plotter_for(chart_type, self.options),
                    kind,
                    axis_x,
                    axis_y,
                    chart_type,
                    members,
                })
            })
            .collect())
    }

    /// Rotated charts swap screen directions: X axes run vertically.
    fn orient_axes(&mut self, passes: &[GroupPass], rotated: bool) {
        let (x_position, y_position) = if rotated {
            (AxisPosition::Vertical, AxisPosition::Horizontal)
        } else {
            (AxisPosition::Horizontal, AxisPosition::Vertical)
        };
        for pass in passes {
            if let Some(axis) = self.axes.get_mut(pass.axis_x.0) {
                axis.set_position(x_position);
            }
            if let Some(axis) = self.axes.get_mut(pass.axis_y.0) {
                axis.set_position(y_position);
            }
        }
    }

    fn load(&mut self, passes: &mut [GroupPass]) {
        for pass in passes.iter_mut() {
            pass.plotter.clear();
            let members: Vec<&Series> = pass.members.iter().filter_map(|&i| self.series.get(i)).collect();
            if let Some((axis_x, axis_y)) = axis_pair_mut(self.axes, pass.axis_x, pass.axis_y) {
                pass.plotter.load(axis_x, axis_y, &members);
            }
        }
    }

    fn unload(&mut self, passes: &mut [GroupPass]) {
        for pass in passes.iter_mut().rev() {
            if let Some((axis_x, axis_y)) = axis_pair_mut(self.axes, pass.axis_x, pass.axis_y) {
                pass.plotter.unload(axis_x, axis_y);
            }
        }
    }

    /// Analyses each group, unions the proposed limits per axis and lays out
    /// every axis against the plot rectangle.
    fn resolve_axes(&mut self, passes: &[GroupPass]) -> ChartResult<Vec<DataAggregator>> {
        let mut ranges: Vec<Option<(f64, f64)>> = vec![None; self.axes.len()];
        let mut data_sets = Vec::with_capacity(passes.len());

        for pass in passes {
            let typed: Vec<(&Series, ChartType)> = pass
                .members
                .iter()
                .filter_map(|&i| self.series.get(i))
                .map(|series| (series, self.effective_type(series)))
                .collect();
            let data = DataAggregator::analyse(&typed, self.options.stacking);
            let limits = self
                .axes
                .get(pass.axis_y.0)
                .and_then(|axis_y| pass.plotter.adjust_limits(&data, self.plot_rect, axis_y));
            if let Some(limits) = limits {
                if let Some(range) = ranges.get_mut(pass.axis_x.0) {
                    widen(range, limits.left, limits.right());
                }
                if let Some(range) = ranges.get_mut(pass.axis_y.0) {
                    widen(range, limits.top, limits.bottom());
                }
            }
            trace!(kind = ?pass.kind, series = pass.members.len(), ?limits, "group limits");
            data_sets.push(data);
        }

        for (axis, range) in self.axes.iter_mut().zip(&ranges) {
            let (min, max) = range.unwrap_or((f64::NAN, f64::NAN));
            axis.resolve_range(min, max);
            axis.layout(self.plot_rect)?;
            trace!(axis = axis.id().0, min = axis.actual_min(), max = axis.actual_max(), "axis resolved");
        }
        Ok(data_sets)
    }

    /// Plots every series in chart order so later series draw on top.
    fn plot(
        &mut self,
        engine: &mut dyn RenderEngine,
        passes: &mut [GroupPass],
        data: &[DataAggregator],
        rotated: bool,
    ) {
        let mut order: Vec<(usize, usize, usize)> = passes
            .iter()
            .enumerate()
            .flat_map(|(group, pass)| {
                pass.members
                    .iter()
                    .enumerate()
                    .map(move |(ordinal, &series_index)| (series_index, group, ordinal))
            })
            .collect();
        order.sort_unstable_by_key(|&(series_index, _, _)| series_index);

        engine.start_group(Some("plot-area"), Some(self.plot_rect));
        for (series_index, group, ordinal) in order {
            let (Some(pass), Some(data), Some(series)) =
                (passes.get_mut(group), data.get(group), self.series.get(series_index))
            else {
                continue;
            };
            let (Some(axis_x), Some(axis_y)) = (self.axes.get(pass.axis_x.0), self.axes.get(pass.axis_y.0))
            else {
                continue;
            };
            let mut ctx = PlotContext {
                plot_rect: self.plot_rect,
                axis_x,
                axis_y,
                rotated,
                stacking: self.options.stacking,
                interpolate_nulls: self.options.interpolate_nulls,
                palette: self.palette,
                data,
                stacks: &mut *self.stacks,
                hits: &mut *self.hits,
                slices: &mut *self.slices,
                item_formatter: self.item_formatter,
            };
            let ordinal = SeriesOrdinal {
                series_index,
                ordinal,
                count: pass.members.len(),
                chart_type: series.chart_type.unwrap_or(self.options.chart_type),
            };
            engine.start_group(Some("series"), None);
            pass.plotter.plot_series(&mut ctx, engine, series, ordinal);
            engine.end_group();
        }
        engine.end_group();
    }
}

/// Two distinct axes borrowed mutably at once.
fn axis_pair_mut(axes: &mut [Axis], x: AxisId, y: AxisId) -> Option<(&mut Axis, &mut Axis)> {
    if x.0 == y.0 || x.0 >= axes.len() || y.0 >= axes.len() {
        return None;
    }
    if x.0 < y.0 {
        let (head, tail) = axes.split_at_mut(y.0);
        Some((&mut head[x.0], &mut tail[0]))
    } else {
        let (head, tail) = axes.split_at_mut(x.0);
        Some((&mut tail[0], &mut head[y.0]))
    }
}

fn widen(range: &mut Option<(f64, f64)>, a: f64, b: f64) {
    let (low, high) = (a.min(b), a.max(b));
    if !low.is_finite() || !high.is_finite() {
        return;
    }
    *range = Some(match *range {
        Some((min, max)) => (min.min(low), max.max(high)),
        None => (low, high),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_pairs_borrow_in_either_order() {
        let mut axes = vec![Axis::horizontal(0), Axis::vertical(1), Axis::vertical(2)];
        let (x, y) = axis_pair_mut(&mut axes, AxisId(2), AxisId(0)).expect("pair");
        assert_eq!((x.id(), y.id()), (AxisId(2), AxisId(0)));
        assert!(axis_pair_mut(&mut axes, AxisId(1), AxisId(1)).is_none());
        assert!(axis_pair_mut(&mut axes, AxisId(0), AxisId(3)).is_none());
    }

    #[test]
    fn widen_ignores_non_finite_bounds() {
        let mut range = None;
        widen(&mut range, 3.0, 1.0);
        widen(&mut range, f64::NAN, 10.0);
        widen(&mut range, -2.0, 0.0);
        assert_eq!(range, Some((-2.0, 3.0)));
    }
}
