use std::cell::OnceCell;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::primitives::unix_millis_to_datetime;
use crate::core::{Axis, DataPoint, DataType, Series};

/// Flat per-slice name/value table kept for single-series slice charts
/// (funnel), indexed by point index instead of per-series binding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SliceLabels {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl SliceLabels {
    pub fn clear(&mut self) {
        self.names.clear();
        self.values.clear();
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Raw hit value typed by the owning axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitValue {
    Number(f64),
    Date(DateTime<Utc>),
}

impl HitValue {
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Number(value) => value,
            Self::Date(time) => time.timestamp_millis() as f64,
        }
    }
}

/// Resolved view of a located shape, computed lazily from its data point.
///
/// Every accessor memoizes its first result.
#[derive(Debug)]
pub struct HitTestResult<'a> {
    series: &'a Series,
    axis_x: &'a Axis,
    axis_y: &'a Axis,
    tag: DataPoint,
    distance: f64,
    slices: Option<&'a SliceLabels>,
    x: OnceCell<HitValue>,
    y: OnceCell<HitValue>,
    x_formatted: OnceCell<String>,
    y_formatted: OnceCell<String>,
}

impl<'a> HitTestResult<'a> {
    #[must_use]
    pub fn new(
        series: &'a Series,
        axis_x: &'a Axis,
        axis_y: &'a Axis,
        tag: DataPoint,
        distance: f64,
    ) -> Self {
        Self {
            series,
            axis_x,
            axis_y,
            tag,
            distance,
            slices: None,
            x: OnceCell::new(),
            y: OnceCell::new(),
            x_formatted: OnceCell::new(),
            y_formatted: OnceCell::new(),
        }
    }

    /// Switches name/value resolution to a flat slice table.
    #[must_use]
    pub fn with_slices(mut self, slices: &'a SliceLabels) -> Self {
        self.slices = Some(slices);
        self
    }

    pub fn series(&self) -> &'a Series {
        self.series
    }

    pub fn series_index(&self) -> usize {
        self.tag.series_index
    }

    pub fn point_index(&self) -> usize {
        self.tag.point_index
    }

    pub fn data_point(&self) -> DataPoint {
        self.tag
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn x(&self) -> HitValue {
        *self
            .x
            .get_or_init(|| typed_value(self.axis_x.data_type(), self.tag.data_x))
    }

    #[must_use]
    pub fn y(&self) -> HitValue {
        *self
            .y
            .get_or_init(|| typed_value(self.axis_y.data_type(), self.tag.data_y))
    }

    #[must_use]
    pub fn x_formatted(&self) -> &str {
        self.x_formatted
            .get_or_init(|| self.axis_x.format_value(self.tag.data_x))
    }

    #[must_use]
    pub fn y_formatted(&self) -> &str {
        self.y_formatted
            .get_or_init(|| self.axis_y.format_value(self.tag.data_y))
    }

    /// Source item bound at the point index, if the series carries items.
    pub fn item(&self) -> Option<&'a Value> {
        self.series.item(self.tag.point_index)
    }

    /// Slice name for slice charts, otherwise the series name.
    #[must_use]
    pub fn name(&self) -> Option<&'a str> {
        match self.slices {
            Some(slices) => slices.names.get(self.tag.point_index).map(String::as_str),
            None => Some(self.series.name.as_str()),
        }
    }

    /// Slice value for slice charts, otherwise the plotted Y value.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self.slices {
            Some(slices) => slices.values.get(self.tag.point_index).copied(),
            None => Some(self.tag.data_y),
        }
    }
}

fn typed_value(data_type: DataType, raw: f64) -> HitValue {
    match data_type {
        DataType::Number => HitValue::Number(raw),
        DataType::Date => unix_millis_to_datetime(raw)
            .map(HitValue::Date)
            .unwrap_or(HitValue::Number(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ValueFormat;

    #[test]
    fn resolves_typed_and_formatted_values_lazily() {
        let series = Series::with_xy("s", vec![1_609_459_200_000.0], vec![0.256])
            .with_items(vec![serde_json::json!({"id": 7})]);
        let axis_x = Axis::horizontal(0).with_data_type(DataType::Date);
        let axis_y = Axis::vertical(1).with_format(ValueFormat::Percent(1));
        let result = HitTestResult::new(
            &series,
            &axis_x,
            &axis_y,
            DataPoint::new(0, 0, 1_609_459_200_000.0, 0.256),
            0.0,
        );

        assert!(matches!(result.x(), HitValue::Date(_)));
        assert_eq!(result.x_formatted(), "2021-01-01");
        assert_eq!(result.y_formatted(), "25.6%");
        assert_eq!(result.item(), Some(&serde_json::json!({"id": 7})));
        assert_eq!(result.name(), Some("s"));
    }

    #[test]
    fn slice_tables_override_name_and_value() {
        let series = Series::new("funnel", vec![10.0, 5.0]);
        let axis_x = Axis::horizontal(0);
        let axis_y = Axis::vertical(1);
        let mut slices = SliceLabels::default();
        slices.push("Leads", 10.0);
        slices.push("Deals", 5.0);
        let result = HitTestResult::new(&series, &axis_x, &axis_y, DataPoint::new(0, 1, 1.0, 5.0), 0.0)
            .with_slices(&slices);
        assert_eq!(result.name(), Some("Deals"));
        assert_eq!(result.value(), Some(5.0));
    }
}
