use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::format::ValueFormat;
use crate::core::scale::LinearScale;
use crate::core::types::Rect;
use crate::error::{ChartError, ChartResult};

/// Stable axis identity used to scope stacking accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AxisId(pub usize);

/// Screen direction an axis spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisPosition {
    /// Pixels grow left to right with the value.
    Horizontal,
    /// Pixels grow downward, so larger values map to smaller pixel offsets.
    Vertical,
}

/// Logical type of the values carried on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataType {
    #[default]
    Number,
    /// Epoch milliseconds.
    Date,
}

/// Replacement for the default affine value mapping.
///
/// Implementations map a data value to the fraction `[0, 1]` of the axis
/// span (0 at the `actual_min` end) and back.
pub trait AxisConversion: Send + Sync {
    fn to_fraction(&self, value: f64, actual_min: f64, actual_max: f64) -> f64;
    fn from_fraction(&self, fraction: f64, actual_min: f64, actual_max: f64) -> f64;
}

/// Value/pixel converter for one plot-area axis.
///
/// Bounds are resolved once per layout pass (`resolve_range` + `layout`) and
/// stay frozen while plotters run.
#[derive(Clone)]
pub struct Axis {
    id: AxisId,
    position: AxisPosition,
    data_type: DataType,
    log_base: Option<f64>,
    reversed: bool,
    min: Option<f64>,
    max: Option<f64>,
    format: ValueFormat,
    actual_min: f64,
    actual_max: f64,
    scale: Option<LinearScale>,
    conversion: Option<Arc<dyn AxisConversion>>,
}

impl fmt::Debug for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Axis")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("data_type", &self.data_type)
            .field("log_base", &self.log_base)
            .field("reversed", &self.reversed)
            .field("actual_min", &self.actual_min)
            .field("actual_max", &self.actual_max)
            .field("custom_conversion", &self.conversion.is_some())
            .finish()
    }
}

impl Axis {
    #[must_use]
    pub fn new(id: AxisId, position: AxisPosition) -> Self {
        Self {
            id,
            position,
            data_type: DataType::Number,
            log_base: None,
            reversed: false,
            min: None,
            max: None,
            format: ValueFormat::General,
            actual_min: 0.0,
            actual_max: 1.0,
            scale: None,
            conversion: None,
        }
    }

    pub fn horizontal(id: usize) -> Self {
        Self::new(AxisId(id), AxisPosition::Horizontal)
    }

    pub fn vertical(id: usize) -> Self {
        Self::new(AxisId(id), AxisPosition::Vertical)
    }

    /// Sets logarithmic mapping; the base must be finite and > 1.
    pub fn with_log_base(mut self, base: f64) -> ChartResult<Self> {
        if !base.is_finite() || base <= 1.0 {
            return Err(ChartError::InvalidOption(
                "axis log base must be finite and > 1".to_owned(),
            ));
        }
        self.log_base = Some(base);
        Ok(self)
    }

    #[must_use]
    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    #[must_use]
    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    /// Pins either end of the range; `None` lets data drive it.
    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min.filter(|v| v.is_finite());
        self.max = max.filter(|v| v.is_finite());
        self
    }

    pub fn id(&self) -> AxisId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AxisId) {
        self.id = id;
    }

    pub fn position(&self) -> AxisPosition {
        self.position
    }

    pub fn set_position(&mut self, position: AxisPosition) {
        self.position = position;
        self.scale = None;
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn log_base(&self) -> Option<f64> {
        self.log_base
    }

    pub fn format(&self) -> &ValueFormat {
        &self.format
    }

    pub fn actual_min(&self) -> f64 {
        self.actual_min
    }

    pub fn actual_max(&self) -> f64 {
        self.actual_max
    }

    pub fn has_custom_conversion(&self) -> bool {
        self.conversion.is_some()
    }

    /// Installs (or removes) a custom conversion, returning the previous one
    /// so the caller can restore it.
    pub fn replace_conversion(
        &mut self,
        conversion: Option<Arc<dyn AxisConversion>>,
    ) -> Option<Arc<dyn AxisConversion>> {
        std::mem::replace(&mut self.conversion, conversion)
    }

    /// Resolves `actual_min`/`actual_max` from a data range, honoring explicit
    /// bounds and keeping log ranges strictly positive.
    pub fn resolve_range(&mut self, data_min: f64, data_max: f64) {
        let mut min = self.min.unwrap_or(data_min);
        let mut max = self.max.unwrap_or(data_max);
        if !min.is_finite() || !max.is_finite() {
            (min, max) = match self.log_base {
                Some(_) => (1.0, 10.0),
                None => (0.0, 1.0),
            };
        }
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }

        if let Some(base) = self.log_base {
            if max <= 0.0 {
                max = base;
            }
            if min <= 0.0 {
                min = (max / base).min(1.0);
            }
            if min == max {
                min /= base;
                max *= base;
            }
        } else if min == max {
            // An absolute pad vanishes below the f64 ulp of large magnitudes.
            let mut pad = 0.5_f64.max(min.abs() * 1e-9);
            let center = min;
            while center - pad == center || center + pad == center {
                pad *= 2.0;
            }
            min = center - pad;
            max = center + pad;
        }

        self.actual_min = min;
        self.actual_max = max;
        self.scale = None;
    }

    /// Binds the resolved range to the plot rectangle.
    pub fn layout(&mut self, plot_rect: Rect) -> ChartResult<()> {
        let plot_rect = plot_rect.validate_plot_area()?;
        let (mut start, mut end) = match self.position {
            AxisPosition::Horizontal => (plot_rect.left, plot_rect.right()),
            AxisPosition::Vertical => (plot_rect.bottom(), plot_rect.top),
        };
        if self.reversed {
            std::mem::swap(&mut start, &mut end);
        }
        let t_min = self.transform(self.actual_min);
        let t_max = self.transform(self.actual_max);
        self.scale = Some(LinearScale::new(t_min, t_max, start, end)?);
        Ok(())
    }

    /// Shortcut used by tests and hosts that resolve ranges themselves.
    pub fn set_range(&mut self, actual_min: f64, actual_max: f64, plot_rect: Rect) -> ChartResult<()> {
        if !actual_min.is_finite() || !actual_max.is_finite() || actual_min == actual_max {
            return Err(ChartError::InvalidData(
                "axis range must be finite and non-zero".to_owned(),
            ));
        }
        self.actual_min = actual_min;
        self.actual_max = actual_max;
        self.layout(plot_rect)
    }

    /// Maps a data value to a pixel offset.
    ///
    /// Non-positive values on a log axis (and any non-finite input) produce a
    /// non-finite pixel; callers treat that as "don't draw".
    #[must_use]
    pub fn convert(&self, value: f64) -> f64 {
        let Some(scale) = self.scale else {
            return f64::NAN;
        };
        if let Some(conversion) = &self.conversion {
            let fraction = conversion.to_fraction(value, self.actual_min, self.actual_max);
            let (start, end) = scale.range();
            return start + fraction * (end - start);
        }
        scale.domain_to_pixel(self.transform(value))
    }

    /// Maps a pixel offset back to a data value.
    #[must_use]
    pub fn convert_back(&self, pixel: f64) -> f64 {
        let Some(scale) = self.scale else {
            return f64::NAN;
        };
        if let Some(conversion) = &self.conversion {
            let (start, end) = scale.range();
            let span = end - start;
            let fraction = if span == 0.0 { 0.0 } else { (pixel - start) / span };
            return conversion.from_fraction(fraction, self.actual_min, self.actual_max);
        }
        self.untransform(scale.pixel_to_domain(pixel))
    }

    /// Absolute pixel length of `delta` data units measured from `actual_min`.
    pub fn length_in_pixels(&self, delta: f64) -> f64 {
        (self.convert(self.actual_min + delta) - self.convert(self.actual_min)).abs()
    }

    /// Formats a value using the axis format and data type.
    pub fn format_value(&self, value: f64) -> String {
        match self.data_type {
            DataType::Number => self.format.format_number(value),
            DataType::Date => self.format.format_date(value),
        }
    }

    fn transform(&self, value: f64) -> f64 {
        match self.log_base {
            Some(base) => value.ln() / base.ln(),
            None => value,
        }
    }

    fn untransform(&self, value: f64) -> f64 {
        match self.log_base {
            Some(base) => base.powf(value),
            None => value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot_rect() -> Rect {
        Rect::new(50.0, 20.0, 400.0, 300.0)
    }

    #[test]
    fn vertical_axis_maps_min_to_bottom() {
        let mut axis = Axis::vertical(1);
        axis.set_range(0.0, 10.0, plot_rect()).expect("range");
        assert_eq!(axis.convert(0.0), 320.0);
        assert_eq!(axis.convert(10.0), 20.0);
    }

    #[test]
    fn reversed_horizontal_axis_flips_direction() {
        let mut axis = Axis::horizontal(0).with_reversed(true);
        axis.set_range(0.0, 10.0, plot_rect()).expect("range");
        assert_eq!(axis.convert(0.0), 450.0);
        assert_eq!(axis.convert(10.0), 50.0);
    }

    #[test]
    fn log_axis_returns_non_finite_for_non_positive_values() {
        let mut axis = Axis::vertical(1).with_log_base(10.0).expect("log");
        axis.set_range(1.0, 1000.0, plot_rect()).expect("range");
        assert!(!axis.convert(0.0).is_finite());
        assert!(!axis.convert(-5.0).is_finite());
        assert!((axis.convert(10.0) - 220.0).abs() <= 1e-9);
    }

    #[test]
    fn resolve_range_widens_flat_data() {
        let mut axis = Axis::horizontal(0);
        axis.resolve_range(3.0, 3.0);
        assert_eq!((axis.actual_min(), axis.actual_max()), (2.5, 3.5));

        let mut log_axis = Axis::vertical(1).with_log_base(10.0).expect("log");
        log_axis.resolve_range(-4.0, 100.0);
        assert!(log_axis.actual_min() > 0.0);
    }

    #[test]
    fn resolve_range_widens_flat_data_at_large_magnitude() {
        let mut axis = Axis::vertical(1);
        axis.resolve_range(1e17, 1e17);
        assert!(axis.actual_min() < 1e17);
        assert!(axis.actual_max() > 1e17);
        axis.layout(plot_rect()).expect("layout");
        assert!(axis.convert(1e17).is_finite());

        let mut negative = Axis::horizontal(0);
        negative.resolve_range(-3e20, -3e20);
        assert!(negative.actual_min() < negative.actual_max());
        negative.layout(plot_rect()).expect("layout");
    }

    #[test]
    fn convert_before_layout_is_not_finite() {
        let axis = Axis::horizontal(0);
        assert!(axis.convert(1.0).is_nan());
    }
}
