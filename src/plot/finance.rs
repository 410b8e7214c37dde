use std::sync::Arc;

use tracing::{debug, trace};

use crate::api::ChartOptions;
use crate::core::{
    Axis, AxisConversion, ChartType, DataAggregator, DataPoint, Rect, Series, is_valid,
};
use crate::interaction::HitShape;
use crate::render::{Pen, RenderEngine};

use super::bar::DEFAULT_GROUP_RATIO;
use super::geometry::{Projector, WidthSpec, clip_to_plot};
use super::volume::VolumeConversion;
use super::{PlotContext, Plotter, PlotterKind, SeriesOrdinal, data_bounds};

/// Open/high/low/close of one point.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quote {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Quote {
    fn at(series: &Series, index: usize) -> Option<Self> {
        let columns = series.ohlc_columns()?;
        let quote = Self {
            open: *columns.open.get(index)?,
            high: *columns.high.get(index)?,
            low: *columns.low.get(index)?,
            close: *columns.close.get(index)?,
        };
        [quote.open, quote.high, quote.low, quote.close]
            .iter()
            .all(|v| is_valid(*v))
            .then_some(quote)
    }
}

/// High-low-open-close, candlestick, equivolume and Arms plotter.
///
/// Volume-driven types remap the X axis between `load` and `unload` so that
/// each symbol is as wide as its share of the traded volume.
pub struct FinancePlotter {
    chart_type: ChartType,
    symbol_width: Option<WidthSpec>,
    volume: Option<Arc<VolumeConversion>>,
    previous_conversion: Option<Option<Arc<dyn AxisConversion>>>,
}

impl FinancePlotter {
    #[must_use]
    pub fn new(chart_type: ChartType, options: &ChartOptions) -> Self {
        Self {
            chart_type,
            symbol_width: options.finance.symbol_width,
            volume: None,
            previous_conversion: None,
        }
    }

    /// Volume mapping installed by `load`, if any.
    #[must_use]
    pub fn volume_conversion(&self) -> Option<&VolumeConversion> {
        self.volume.as_deref()
    }

    fn symbol_span(&self, ctx: &PlotContext<'_>, chart_type: ChartType, x: f64) -> (f64, f64) {
        if chart_type.uses_volume_axis() {
            if let Some(span) = self.volume.as_ref().and_then(|volume| volume.interval(x)) {
                return span;
            }
        }
        let delta = ctx.data.delta_x_or_unit();
        let width = self.symbol_width.map_or(DEFAULT_GROUP_RATIO * delta, |spec| {
            spec.to_data_units(delta, ctx.axis_x.length_in_pixels(1.0))
        });
        (x - 0.5 * width, x + 0.5 * width)
    }
}

/// Draws one symbol in data space.
fn draw_quote(
    engine: &mut dyn RenderEngine,
    projector: Projector<'_>,
    chart_type: ChartType,
    x: f64,
    (x0, x1): (f64, f64),
    quote: Quote,
) {
    let body_low = quote.open.min(quote.close);
    let body_high = quote.open.max(quote.close);
    match chart_type {
        ChartType::HighLowOpenClose => {
            engine.draw_line(projector.point(x, quote.low), projector.point(x, quote.high));
            engine.draw_line(projector.point(x0, quote.open), projector.point(x, quote.open));
            engine.draw_line(projector.point(x, quote.close), projector.point(x1, quote.close));
        }
        ChartType::EquiVolume => {
            engine.draw_rect(projector.rect(x0, x1, quote.low, quote.high));
        }
        ChartType::ArmsCandleVolume => {
            let pen = engine.pen();
            engine.set_fill(None);
            engine.draw_rect(projector.rect(x0, x1, quote.low, quote.high));
            engine.set_fill(pen.fill);
            engine.draw_rect(projector.rect(x0, x1, body_low, body_high));
        }
        _ => {
            engine.draw_line(projector.point(x, quote.low), projector.point(x, quote.high));
            engine.draw_rect(projector.rect(x0, x1, body_low, body_high));
        }
    }
}

impl Plotter for FinancePlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::Finance
    }

    fn clear(&mut self) {
        self.volume = None;
    }

    fn load(&mut self, axis_x: &mut Axis, _axis_y: &mut Axis, series: &[&Series]) {
        let source = series.iter().find(|series| {
            series.chart_type.unwrap_or(self.chart_type).uses_volume_axis()
                && series.ohlc_columns().is_some_and(|ohlc| ohlc.volume.is_some())
        });
        let Some(source) = source else {
            return;
        };
        let Some(ohlc) = source.ohlc_columns() else {
            return;
        };
        let x: Vec<f64> = (0..source.len()).map(|index| source.x_at(index)).collect();
        let volume = ohlc.volume.as_deref().unwrap_or_default();
        let Some(conversion) = VolumeConversion::new(&x, volume).map(Arc::new) else {
            debug!(series = %source.name, "volume axis skipped: no positive volume");
            return;
        };

        let total = conversion.total_volume();
        let installed: Arc<dyn AxisConversion> = conversion.clone();
        self.previous_conversion = Some(axis_x.replace_conversion(Some(installed)));
        self.volume = Some(conversion);
        debug!(series = %source.name, total, "volume axis loaded");
    }

    fn unload(&mut self, axis_x: &mut Axis, _axis_y: &mut Axis) {
        if let Some(previous) = self.previous_conversion.take() {
            axis_x.replace_conversion(previous);
            debug!("volume axis restored");
        }
        self.volume = None;
    }

    fn adjust_limits(&self, data: &DataAggregator, _plot_rect: Rect, _axis_y: &Axis) -> Option<Rect> {
        let (min_x, max_x) = match &self.volume {
            Some(volume) => volume.bounds(),
            None => {
                let half = 0.5 * data.delta_x_or_unit();
                (data.min_x() - half, data.max_x() + half)
            }
        };
        data_bounds(min_x, max_x, data.min_y(), data.max_y())
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
        let (rising, falling) = ctx.series_pens(series, series_index);
        let projector = ctx.projector();

        let mut previous_close: Option<f64> = None;
        let mut up = true;
        let mut drawn = 0_usize;
        for index in 0..series.len() {
            let x = series.x_at(index);
            let Some(quote) = Quote::at(series, index) else {
                continue;
            };
            if !is_valid(x) {
                continue;
            }

            up = match (chart_type, previous_close) {
                (ChartType::EquiVolume, Some(previous)) if quote.close == previous => up,
                (ChartType::EquiVolume, Some(previous)) => quote.close > previous,
                _ => quote.close >= quote.open,
            };
            previous_close = Some(quote.close);

            let span = self.symbol_span(ctx, chart_type, x);
            let bounds = projector.rect(span.0, span.1, quote.low, quote.high);
            let Some(visible) = clip_to_plot(ctx.plot_rect, bounds) else {
                continue;
            };

            let pen: Pen = if up { rising } else { falling };
            engine.set_pen(pen);
            let tag = DataPoint::new(series_index, index, x, quote.close);
            ctx.render_symbol(engine, series, tag, &mut |engine| {
                draw_quote(engine, projector, chart_type, x, span, quote);
            });
            ctx.add_hit(HitShape::Rect(visible), tag);
            drawn += 1;
        }

        trace!(series = series_index, drawn, ?chart_type, "plot finance series");
    }
}
