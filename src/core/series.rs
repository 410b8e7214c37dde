use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::axis::AxisId;
use crate::core::primitives::decimal_to_f64;
use crate::error::{ChartError, ChartResult};
use crate::render::Color;

/// Chart family selector used to pick a plotter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ChartType {
    #[default]
    Column,
    /// Column chart with swapped axis roles.
    Bar,
    Scatter,
    Line,
    LineSymbols,
    Spline,
    SplineSymbols,
    Area,
    SplineArea,
    HighLowOpenClose,
    Candlestick,
    CandleVolume,
    EquiVolume,
    ArmsCandleVolume,
    Funnel,
    BoxWhisker,
}

impl ChartType {
    /// Bar charts imply a rotated plot area.
    pub fn implies_rotation(self) -> bool {
        matches!(self, Self::Bar)
    }

    pub fn is_spline(self) -> bool {
        matches!(self, Self::Spline | Self::SplineSymbols | Self::SplineArea)
    }

    pub fn is_finance(self) -> bool {
        matches!(
            self,
            Self::HighLowOpenClose
                | Self::Candlestick
                | Self::CandleVolume
                | Self::EquiVolume
                | Self::ArmsCandleVolume
        )
    }

    /// Finance types whose X spacing depends on traded volume.
    pub fn uses_volume_axis(self) -> bool {
        matches!(
            self,
            Self::CandleVolume | Self::EquiVolume | Self::ArmsCandleVolume
        )
    }
}

/// Pen settings applied before a series' shapes are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: None,
            stroke_width: 1.0,
        }
    }
}

impl SeriesStyle {
    #[must_use]
    pub fn filled(color: Color) -> Self {
        Self {
            fill: Some(color),
            stroke: Some(color),
            stroke_width: 1.0,
        }
    }

    /// Fills unset colors from a palette color.
    #[must_use]
    pub fn resolved(self, palette_color: Color) -> Self {
        Self {
            fill: Some(self.fill.unwrap_or(palette_color)),
            stroke: Some(self.stroke.unwrap_or(palette_color)),
            stroke_width: self.stroke_width,
        }
    }
}

/// Open/high/low/close columns for finance series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OhlcColumns {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Option<Vec<f64>>,
}

impl OhlcColumns {
    pub fn len(&self) -> usize {
        self.open
            .len()
            .min(self.high.len())
            .min(self.low.len())
            .min(self.close.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Value dimension selector for `Series::values`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Y,
    X,
}

/// One bound data series.
///
/// Y values are plain numbers for most chart types; box plots carry one
/// sample array per point and finance series carry OHLC columns (their
/// plain Y dimension is the close column).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    y: Vec<f64>,
    x: Option<Vec<f64>>,
    samples: Option<Vec<Vec<f64>>>,
    ohlc: Option<OhlcColumns>,
    pub chart_type: Option<ChartType>,
    pub style: SeriesStyle,
    pub alt_style: Option<SeriesStyle>,
    pub symbol_size: Option<f64>,
    pub axis_x: Option<AxisId>,
    pub axis_y: Option<AxisId>,
    items: Option<Vec<Value>>,
    pub visible: bool,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, y: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            y,
            visible: true,
            ..Self::default()
        }
    }

    /// Series with explicit X values; the shorter column bounds the length.
    #[must_use]
    pub fn with_xy(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        let mut series = Self::new(name, y);
        series.x = Some(x);
        series
    }

    /// Box-plot series: one sample array per point.
    #[must_use]
    pub fn box_samples(name: impl Into<String>, samples: Vec<Vec<f64>>) -> Self {
        let mut series = Self::new(name, Vec::new());
        series.y = samples
            .iter()
            .map(|values| values.iter().copied().filter(|v| v.is_finite()).fold(f64::NAN, f64::max))
            .collect();
        series.samples = Some(samples);
        series.chart_type = Some(ChartType::BoxWhisker);
        series
    }

    /// Finance series; the plain Y dimension is the close column.
    pub fn ohlc(name: impl Into<String>, columns: OhlcColumns) -> ChartResult<Self> {
        if let Some(volume) = &columns.volume {
            if volume.len() < columns.len() {
                return Err(ChartError::InvalidData(
                    "volume column must cover every ohlc point".to_owned(),
                ));
            }
        }
        let mut series = Self::new(name, columns.close.clone());
        series.ohlc = Some(columns);
        Ok(series)
    }

    /// Converts decimal Y input (prices, amounts) into a series.
    pub fn from_decimal_values(name: impl Into<String>, values: &[Decimal]) -> ChartResult<Self> {
        let y = values
            .iter()
            .map(|value| decimal_to_f64(*value, "value"))
            .collect::<ChartResult<Vec<_>>>()?;
        Ok(Self::new(name, y))
    }

    #[must_use]
    pub fn with_x(mut self, x: Vec<f64>) -> Self {
        self.x = Some(x);
        self
    }

    #[must_use]
    pub fn with_chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: SeriesStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_alt_style(mut self, style: SeriesStyle) -> Self {
        self.alt_style = Some(style);
        self
    }

    #[must_use]
    pub fn with_symbol_size(mut self, size: f64) -> Self {
        self.symbol_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_axes(mut self, axis_x: Option<AxisId>, axis_y: Option<AxisId>) -> Self {
        self.axis_x = axis_x;
        self.axis_y = axis_y;
        self
    }

    /// Source items returned by hit-test results, parallel to the values.
    #[must_use]
    pub fn with_items(mut self, items: Vec<Value>) -> Self {
        self.items = Some(items);
        self
    }

    /// Raw values of one dimension; `X` is `None` when the series is indexed.
    pub fn values(&self, dimension: Dimension) -> Option<&[f64]> {
        match dimension {
            Dimension::Y => Some(&self.y),
            Dimension::X => self.x.as_deref(),
        }
    }

    pub fn y_values(&self) -> &[f64] {
        &self.y
    }

    pub fn x_values(&self) -> Option<&[f64]> {
        self.x.as_deref()
    }

    pub fn samples(&self) -> Option<&[Vec<f64>]> {
        self.samples.as_deref()
    }

    pub fn ohlc_columns(&self) -> Option<&OhlcColumns> {
        self.ohlc.as_ref()
    }

    /// Number of plottable points.
    pub fn len(&self) -> usize {
        let base = match (&self.samples, &self.ohlc) {
            (Some(samples), _) => samples.len(),
            (None, Some(ohlc)) => ohlc.len(),
            (None, None) => self.y.len(),
        };
        match &self.x {
            Some(x) => base.min(x.len()),
            None => base,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// X value of a point: the explicit X value or its index.
    pub fn x_at(&self, index: usize) -> f64 {
        match &self.x {
            Some(x) => x.get(index).copied().unwrap_or(f64::NAN),
            None => index as f64,
        }
    }

    pub fn item(&self, index: usize) -> Option<&Value> {
        self.items.as_ref().and_then(|items| items.get(index))
    }

    /// Replaces Y values; go through `Chart::series_mut` to schedule a pass.
    pub fn set_values(&mut self, y: Vec<f64>) {
        self.y = y;
    }

    pub fn set_x_values(&mut self, x: Option<Vec<f64>>) {
        self.x = x;
    }
}
