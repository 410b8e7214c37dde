use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::series::{ChartType, Series};
use crate::core::types::is_valid;

/// Stacking policy shared by bar, area and line plotters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Stacking {
    #[default]
    None,
    Stacked,
    /// Each value is divided by the absolute sum of all values at its x.
    Stacked100pc,
}

impl Stacking {
    #[must_use]
    pub fn is_stacked(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Per-x totals across every stackable series of one axis pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StackTotals {
    pub count: usize,
    pub positive: f64,
    pub negative: f64,
    pub absolute: f64,
}

/// Immutable per-pass summary of all series bound to one axis pair.
///
/// Rebuilt wholesale at the start of every layout pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DataAggregator {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    delta_x: f64,
    x_values: Vec<f64>,
    totals: IndexMap<OrderedFloat<f64>, StackTotals>,
    stacking: Stacking,
}

impl Default for DataAggregator {
    fn default() -> Self {
        Self {
            min_x: f64::NAN,
            max_x: f64::NAN,
            min_y: f64::NAN,
            max_y: f64::NAN,
            delta_x: 0.0,
            x_values: Vec::new(),
            totals: IndexMap::new(),
            stacking: Stacking::None,
        }
    }
}

/// Series types whose values take part in stacking.
#[must_use]
pub fn is_stackable(chart_type: ChartType) -> bool {
    matches!(
        chart_type,
        ChartType::Column
            | ChartType::Bar
            | ChartType::Line
            | ChartType::LineSymbols
            | ChartType::Spline
            | ChartType::SplineSymbols
            | ChartType::Area
            | ChartType::SplineArea
    )
}

impl DataAggregator {
    /// Scans every series once. `series` pairs each series with its effective
    /// chart type so mixed charts stack only the stackable families.
    #[must_use]
    pub fn analyse(series: &[(&Series, ChartType)], stacking: Stacking) -> Self {
        let mut out = Self {
            stacking,
            ..Self::default()
        };
        let mut xs: Vec<f64> = Vec::new();

        for (series, chart_type) in series {
            let stacked = stacking.is_stacked() && is_stackable(*chart_type);
            for index in 0..series.len() {
                let x = series.x_at(index);
                if !is_valid(x) {
                    continue;
                }
                let Some((low, high)) = y_extent(series, index) else {
                    continue;
                };
                xs.push(x);
                out.min_x = fold_min(out.min_x, x);
                out.max_x = fold_max(out.max_x, x);

                if stacked {
                    let value = series.y_values().get(index).copied().unwrap_or(f64::NAN);
                    if !is_valid(value) {
                        continue;
                    }
                    let totals = out.totals.entry(OrderedFloat(x)).or_default();
                    totals.count += 1;
                    totals.absolute += value.abs();
                    if value >= 0.0 {
                        totals.positive += value;
                    } else {
                        totals.negative += value;
                    }
                } else {
                    out.min_y = fold_min(out.min_y, low);
                    out.max_y = fold_max(out.max_y, high);
                }
            }
        }

        for totals in out.totals.values() {
            let (negative, positive) = match stacking {
                Stacking::Stacked100pc if totals.absolute > 0.0 => (
                    totals.negative / totals.absolute,
                    totals.positive / totals.absolute,
                ),
                _ => (totals.negative, totals.positive),
            };
            out.min_y = fold_min(out.min_y, negative);
            out.max_y = fold_max(out.max_y, positive);
        }

        xs.sort_by(f64::total_cmp);
        xs.dedup();
        out.delta_x = xs
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|gap| *gap > 0.0)
            .fold(f64::NAN, fold_min);
        if !out.delta_x.is_finite() {
            out.delta_x = 0.0;
        }
        out.x_values = xs;
        out
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn min_y(&self) -> f64 {
        self.min_y
    }

    pub fn max_y(&self) -> f64 {
        self.max_y
    }

    /// Minimum positive gap between adjacent distinct x values, or `0.0` when
    /// fewer than two distinct values exist.
    pub fn delta_x(&self) -> f64 {
        self.delta_x
    }

    /// `delta_x` with the one-data-unit fallback applied.
    pub fn delta_x_or_unit(&self) -> f64 {
        if self.delta_x > 0.0 { self.delta_x } else { 1.0 }
    }

    /// Sorted distinct x values.
    pub fn x_values(&self) -> &[f64] {
        &self.x_values
    }

    pub fn stacking(&self) -> Stacking {
        self.stacking
    }

    #[must_use]
    pub fn totals_at(&self, x: f64) -> Option<&StackTotals> {
        self.totals.get(&OrderedFloat(x))
    }

    /// Absolute sum at `x` used by 100% stacking; `0.0` when nothing stacks there.
    #[must_use]
    pub fn abs_sum_at(&self, x: f64) -> f64 {
        self.totals_at(x).map_or(0.0, |totals| totals.absolute)
    }
}

/// Low/high Y contribution of one point, honoring box samples and OHLC columns.
fn y_extent(series: &Series, index: usize) -> Option<(f64, f64)> {
    if let Some(samples) = series.samples() {
        let values = samples.get(index)?;
        let (low, high) = values
            .iter()
            .copied()
            .filter(|v| is_valid(*v))
            .fold((f64::NAN, f64::NAN), |(lo, hi), v| (fold_min(lo, v), fold_max(hi, v)));
        return low.is_finite().then_some((low, high));
    }
    if let Some(ohlc) = series.ohlc_columns() {
        let candidates = [
            ohlc.low.get(index).copied(),
            ohlc.high.get(index).copied(),
            ohlc.open.get(index).copied(),
            ohlc.close.get(index).copied(),
        ];
        let (low, high) = candidates
            .into_iter()
            .flatten()
            .filter(|v| is_valid(*v))
            .fold((f64::NAN, f64::NAN), |(lo, hi), v| (fold_min(lo, v), fold_max(hi, v)));
        return low.is_finite().then_some((low, high));
    }
    let value = series.y_values().get(index).copied()?;
    is_valid(value).then_some((value, value))
}

fn fold_min(current: f64, value: f64) -> f64 {
    if current.is_nan() { value } else { current.min(value) }
}

fn fold_max(current: f64, value: f64) -> f64 {
    if current.is_nan() { value } else { current.max(value) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_x_is_minimum_positive_gap() {
        let a = Series::with_xy("a", vec![0.0, 4.0, 10.0], vec![1.0, 2.0, 3.0]);
        let b = Series::with_xy("b", vec![4.0, 5.5], vec![1.0, 1.0]);
        let info = DataAggregator::analyse(
            &[(&a, ChartType::Column), (&b, ChartType::Column)],
            Stacking::None,
        );
        assert_eq!(info.delta_x(), 1.5);
        assert_eq!(info.x_values(), &[0.0, 4.0, 5.5, 10.0]);
    }

    #[test]
    fn single_x_value_has_zero_delta() {
        let a = Series::with_xy("a", vec![3.0, 3.0], vec![1.0, 2.0]);
        let info = DataAggregator::analyse(&[(&a, ChartType::Line)], Stacking::None);
        assert_eq!(info.delta_x(), 0.0);
        assert_eq!(info.delta_x_or_unit(), 1.0);
    }

    #[test]
    fn invalid_values_contribute_nothing() {
        let a = Series::new("a", vec![f64::NAN, 2.0, f64::INFINITY, -1.0]);
        let info = DataAggregator::analyse(&[(&a, ChartType::Line)], Stacking::None);
        assert_eq!((info.min_y(), info.max_y()), (-1.0, 2.0));
        assert_eq!((info.min_x(), info.max_x()), (1.0, 3.0));
    }

    #[test]
    fn stacked_range_uses_signed_running_sums() {
        let a = Series::new("a", vec![2.0, -1.0]);
        let b = Series::new("b", vec![3.0, -4.0]);
        let info = DataAggregator::analyse(
            &[(&a, ChartType::Column), (&b, ChartType::Column)],
            Stacking::Stacked,
        );
        assert_eq!(info.max_y(), 5.0);
        assert_eq!(info.min_y(), -5.0);
        let totals = info.totals_at(1.0).expect("totals");
        assert_eq!(totals.absolute, 5.0);
        assert_eq!(totals.count, 2);
    }

    #[test]
    fn stacked_100pc_range_normalizes_by_absolute_sum() {
        let a = Series::new("a", vec![3.0]);
        let b = Series::new("b", vec![-1.0]);
        let info = DataAggregator::analyse(
            &[(&a, ChartType::Area), (&b, ChartType::Area)],
            Stacking::Stacked100pc,
        );
        assert_eq!(info.max_y(), 0.75);
        assert_eq!(info.min_y(), -0.25);
    }
}
