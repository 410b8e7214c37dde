use serde::{Deserialize, Serialize};

use crate::core::{ChartType, QuartileMethod, Stacking};
use crate::error::{ChartError, ChartResult};
use crate::plot::WidthSpec;

/// Funnel layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FunnelMode {
    /// Tapering trapezoid ending in a rectangular neck.
    #[default]
    Default,
    /// Centered rectangles of equal height, width proportional to value.
    Rectangle,
}

/// Funnel tuning. Neck sizes are fractions of the plot rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelOptions {
    #[serde(default = "default_neck_width")]
    pub neck_width: f64,
    #[serde(default = "default_neck_height")]
    pub neck_height: f64,
    #[serde(default)]
    pub mode: FunnelMode,
}

impl Default for FunnelOptions {
    fn default() -> Self {
        Self {
            neck_width: default_neck_width(),
            neck_height: default_neck_height(),
            mode: FunnelMode::Default,
        }
    }
}

/// Box-and-whisker tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotOptions {
    #[serde(default)]
    pub quartile_method: QuartileMethod,
    #[serde(default = "default_true")]
    pub show_outliers: bool,
    #[serde(default)]
    pub show_mean_line: bool,
    #[serde(default)]
    pub show_mean_marker: bool,
    /// Whisker cap length relative to the box width.
    #[serde(default = "default_whisker_cap_ratio")]
    pub whisker_cap_ratio: f64,
}

impl Default for BoxPlotOptions {
    fn default() -> Self {
        Self {
            quartile_method: QuartileMethod::default(),
            show_outliers: true,
            show_mean_line: false,
            show_mean_marker: false,
            whisker_cap_ratio: default_whisker_cap_ratio(),
        }
    }
}

/// Finance symbol tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FinanceOptions {
    /// Candle/bar width; `None` uses 70% of the minimum x gap.
    #[serde(default)]
    pub symbol_width: Option<WidthSpec>,
}

/// Per-chart plotting configuration.
///
/// Serializable so hosts can persist chart setup as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartOptions {
    #[serde(default)]
    pub chart_type: ChartType,
    /// Swaps axis roles; implied by `ChartType::Bar`.
    #[serde(default)]
    pub rotated: bool,
    #[serde(default)]
    pub stacking: Stacking,
    #[serde(default)]
    pub interpolate_nulls: bool,
    /// Width of one bar group; `None` uses 70% of the minimum x gap.
    #[serde(default)]
    pub group_width: Option<WidthSpec>,
    /// Space between adjacent bars of a group, relative to the group width.
    #[serde(default)]
    pub gap_width: Option<WidthSpec>,
    #[serde(default)]
    pub bar_origin: f64,
    #[serde(default = "default_symbol_size")]
    pub symbol_size: f64,
    #[serde(default)]
    pub funnel: FunnelOptions,
    #[serde(default)]
    pub box_plot: BoxPlotOptions,
    #[serde(default)]
    pub finance: FinanceOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            chart_type: ChartType::default(),
            rotated: false,
            stacking: Stacking::None,
            interpolate_nulls: false,
            group_width: None,
            gap_width: None,
            bar_origin: 0.0,
            symbol_size: default_symbol_size(),
            funnel: FunnelOptions::default(),
            box_plot: BoxPlotOptions::default(),
            finance: FinanceOptions::default(),
        }
    }
}

impl ChartOptions {
    #[must_use]
    pub fn new(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_rotated(mut self, rotated: bool) -> Self {
        self.rotated = rotated;
        self
    }

    #[must_use]
    pub fn with_stacking(mut self, stacking: Stacking) -> Self {
        self.stacking = stacking;
        self
    }

    #[must_use]
    pub fn with_interpolate_nulls(mut self, interpolate: bool) -> Self {
        self.interpolate_nulls = interpolate;
        self
    }

    #[must_use]
    pub fn with_group_width(mut self, width: WidthSpec) -> Self {
        self.group_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_gap_width(mut self, width: WidthSpec) -> Self {
        self.gap_width = Some(width);
        self
    }

    #[must_use]
    pub fn with_bar_origin(mut self, origin: f64) -> Self {
        self.bar_origin = origin;
        self
    }

    #[must_use]
    pub fn with_symbol_size(mut self, size: f64) -> Self {
        self.symbol_size = size;
        self
    }

    #[must_use]
    pub fn with_funnel(mut self, funnel: FunnelOptions) -> Self {
        self.funnel = funnel;
        self
    }

    #[must_use]
    pub fn with_box_plot(mut self, box_plot: BoxPlotOptions) -> Self {
        self.box_plot = box_plot;
        self
    }

    #[must_use]
    pub fn with_finance(mut self, finance: FinanceOptions) -> Self {
        self.finance = finance;
        self
    }

    /// Whether axis roles are swapped for this chart.
    #[must_use]
    pub fn is_rotated(&self) -> bool {
        self.rotated || self.chart_type.implies_rotation()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.bar_origin.is_finite() {
            return Err(ChartError::InvalidOption(
                "bar origin must be finite".to_owned(),
            ));
        }
        if !self.symbol_size.is_finite() || self.symbol_size < 0.0 {
            return Err(ChartError::InvalidOption(
                "symbol size must be finite and >= 0".to_owned(),
            ));
        }
        for (name, value) in [
            ("funnel neck width", self.funnel.neck_width),
            ("funnel neck height", self.funnel.neck_height),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidOption(format!(
                    "{name} must be in [0, 1]"
                )));
            }
        }
        let cap = self.box_plot.whisker_cap_ratio;
        if !cap.is_finite() || cap < 0.0 {
            return Err(ChartError::InvalidOption(
                "whisker cap ratio must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Serializes options to pretty JSON.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize options: {e}")))
    }

    /// Deserializes and validates options from JSON.
    pub fn from_json(input: &str) -> ChartResult<Self> {
        let options: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidOption(format!("failed to parse options: {e}")))?;
        options.validate()?;
        Ok(options)
    }
}

fn default_symbol_size() -> f64 {
    10.0
}

fn default_neck_width() -> f64 {
    0.2
}

fn default_neck_height() -> f64 {
    0.2
}

fn default_whisker_cap_ratio() -> f64 {
    0.5
}

fn default_true() -> bool {
    true
}
