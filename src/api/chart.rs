use tracing::debug;

use crate::core::{Axis, AxisId, AxisPosition, ChartType, Point, Rect, Series};
use crate::error::{ChartError, ChartResult};
use crate::interaction::{DistanceMode, HitIndex, HitTestResult, SliceLabels};
use crate::plot::{ItemFormatter, StackRegistry};
use crate::render::{Palette, RenderEngine};

use super::invalidation::Invalidation;
use super::options::ChartOptions;
use super::render_pass::{PlotGroup, run_render_pass};

/// Id of the primary X axis created with every chart.
pub const PRIMARY_X: AxisId = AxisId(0);
/// Id of the primary Y axis created with every chart.
pub const PRIMARY_Y: AxisId = AxisId(1);

/// Chart facade consumed by host applications.
///
/// `Chart` owns the series, axes and render engine, and drives the
/// `clear → load → adjust_limits → plot → unload` pass over its plotters.
pub struct Chart<E: RenderEngine> {
    pub(super) engine: E,
    pub(super) options: ChartOptions,
    pub(super) series: Vec<Series>,
    pub(super) axes: Vec<Axis>,
    pub(super) palette: Palette,
    pub(super) plot_rect: Rect,
    pub(super) hits: HitIndex,
    pub(super) slices: SliceLabels,
    pub(super) stacks: StackRegistry,
    pub(super) groups: Vec<PlotGroup>,
    pub(super) item_formatter: Option<Box<dyn ItemFormatter>>,
    pub(super) invalidation: Invalidation,
}

impl<E: RenderEngine> Chart<E> {
    /// Creates a chart with primary X/Y axes drawing into `plot_rect`.
    pub fn new(engine: E, plot_rect: Rect, options: ChartOptions) -> ChartResult<Self> {
        let plot_rect = plot_rect.validate_plot_area()?;
        options.validate()?;
        debug!(
            width = plot_rect.width,
            height = plot_rect.height,
            chart_type = ?options.chart_type,
            "create chart"
        );
        Ok(Self {
            engine,
            options,
            series: Vec::new(),
            axes: vec![Axis::new(PRIMARY_X, AxisPosition::Horizontal), Axis::new(PRIMARY_Y, AxisPosition::Vertical)],
            palette: Palette::default(),
            plot_rect,
            hits: HitIndex::new(),
            slices: SliceLabels::default(),
            stacks: StackRegistry::new(),
            groups: Vec::new(),
            item_formatter: None,
            invalidation: Invalidation::default(),
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ChartOptions) -> ChartResult<()> {
        options.validate()?;
        self.options = options;
        self.invalidate();
        Ok(())
    }

    pub fn plot_rect(&self) -> Rect {
        self.plot_rect
    }

    pub fn set_plot_rect(&mut self, plot_rect: Rect) -> ChartResult<()> {
        self.plot_rect = plot_rect.validate_plot_area()?;
        self.invalidate();
        Ok(())
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        self.invalidate();
    }

    /// Adds a secondary axis and returns its id.
    pub fn add_axis(&mut self, mut axis: Axis) -> AxisId {
        let id = AxisId(self.axes.len());
        axis.set_id(id);
        self.axes.push(axis);
        self.invalidate();
        id
    }

    #[must_use]
    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.axes.get(id.0)
    }

    /// Mutable axis access; invalidates the chart.
    pub fn axis_mut(&mut self, id: AxisId) -> ChartResult<&mut Axis> {
        self.invalidation.request();
        self.axes
            .get_mut(id.0)
            .ok_or_else(|| ChartError::InvalidOption(format!("unknown axis {}", id.0)))
    }

    /// Replaces an axis in place, keeping its id.
    pub fn set_axis(&mut self, id: AxisId, axis: Axis) -> ChartResult<()> {
        let slot = self
            .axes
            .get_mut(id.0)
            .ok_or_else(|| ChartError::InvalidOption(format!("unknown axis {}", id.0)))?;
        let mut axis = axis;
        axis.set_id(id);
        *slot = axis;
        self.invalidate();
        Ok(())
    }

    /// Appends a series and returns its index.
    pub fn add_series(&mut self, series: Series) -> usize {
        self.series.push(series);
        self.invalidate();
        self.series.len() - 1
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Mutable series access; data changes schedule the next pass.
    pub fn series_mut(&mut self, index: usize) -> ChartResult<&mut Series> {
        let len = self.series.len();
        let series = self
            .series
            .get_mut(index)
            .ok_or(ChartError::UnknownSeries(index))?;
        self.invalidation.request();
        debug!(index, len, "series invalidated");
        Ok(series)
    }

    pub fn remove_series(&mut self, index: usize) -> ChartResult<Series> {
        if index >= self.series.len() {
            return Err(ChartError::UnknownSeries(index));
        }
        let removed = self.series.remove(index);
        self.invalidate();
        Ok(removed)
    }

    /// Effective chart type of a series.
    #[must_use]
    pub fn chart_type_of(&self, series: &Series) -> ChartType {
        series.chart_type.unwrap_or(self.options.chart_type)
    }

    pub fn set_item_formatter(&mut self, formatter: impl ItemFormatter + 'static) {
        self.item_formatter = Some(Box::new(formatter));
        self.invalidate();
    }

    pub fn clear_item_formatter(&mut self) {
        self.item_formatter = None;
        self.invalidate();
    }

    /// Requests a render pass; repeated requests coalesce.
    pub fn invalidate(&mut self) {
        self.invalidation.request();
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidation.is_pending()
    }

    /// Number of completed render passes.
    pub fn render_count(&self) -> u64 {
        self.invalidation.passes()
    }

    /// Runs one pass when invalidated; returns whether a pass ran.
    pub fn render_if_invalidated(&mut self) -> ChartResult<bool> {
        if !self.invalidation.take() {
            return Ok(false);
        }
        if let Err(err) = run_render_pass(self) {
            self.invalidation.restore();
            return Err(err);
        }
        self.invalidation.mark_rendered();
        Ok(true)
    }

    /// Runs a full render pass unconditionally.
    pub fn render(&mut self) -> ChartResult<()> {
        run_render_pass(self)?;
        self.invalidation.mark_rendered();
        Ok(())
    }

    /// Plot groups and their data summaries from the last pass.
    pub fn plot_groups(&self) -> &[PlotGroup] {
        &self.groups
    }

    pub fn hit_index(&self) -> &HitIndex {
        &self.hits
    }

    pub fn slice_labels(&self) -> &SliceLabels {
        &self.slices
    }

    /// Nearest plotted data point to `point`, lines included.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<HitTestResult<'_>> {
        self.hit_test_with(point, DistanceMode::Xy, true)
    }

    #[must_use]
    pub fn hit_test_with(
        &self,
        point: Point,
        mode: DistanceMode,
        include_lines: bool,
    ) -> Option<HitTestResult<'_>> {
        let candidate = self.hits.nearest(point, mode, include_lines)?;
        let tag = candidate.area.tag;
        let series = self.series.get(tag.series_index)?;
        let axis_x = self.axis(series.axis_x.unwrap_or(PRIMARY_X))?;
        let axis_y = self.axis(series.axis_y.unwrap_or(PRIMARY_Y))?;
        let result = HitTestResult::new(series, axis_x, axis_y, tag, candidate.distance);
        Some(if self.chart_type_of(series) == ChartType::Funnel {
            result.with_slices(&self.slices)
        } else {
            result
        })
    }
}
