use indexmap::IndexMap;
use ordered_float::OrderedFloat;

use crate::core::{AxisId, DataAggregator, Point, Stacking};

/// Plotter family owning an accumulator; families never share running sums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackFamily {
    Bar,
    Area,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StackKey {
    family: StackFamily,
    axis_x: AxisId,
    axis_y: AxisId,
}

/// Lower and upper stacked value of one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackedValue {
    pub lower: f64,
    pub upper: f64,
}

/// Signed running sums for one (family, axis pair) within a render pass.
#[derive(Debug, Clone, Default)]
pub struct StackState {
    positive: IndexMap<OrderedFloat<f64>, f64>,
    negative: IndexMap<OrderedFloat<f64>, f64>,
    boundary: Option<Vec<Point>>,
}

impl StackState {
    /// Adds `value` (already normalized for 100% stacking) on top of the
    /// prior same-sign value at `x` and returns the resulting span.
    pub fn push(&mut self, x: f64, value: f64) -> StackedValue {
        let map = if value >= 0.0 {
            &mut self.positive
        } else {
            &mut self.negative
        };
        let sum = map.entry(OrderedFloat(x)).or_insert(0.0);
        let lower = *sum;
        *sum = lower + value;
        StackedValue {
            lower,
            upper: *sum,
        }
    }

    /// Current same-sign level at `x` without modifying it.
    #[must_use]
    pub fn level(&self, x: f64, negative: bool) -> f64 {
        let map = if negative { &self.negative } else { &self.positive };
        map.get(&OrderedFloat(x)).copied().unwrap_or(0.0)
    }

    /// Screen boundary of the previously stacked series (already smoothed
    /// for spline variants).
    #[must_use]
    pub fn boundary(&self) -> Option<&[Point]> {
        self.boundary.as_deref()
    }

    pub fn set_boundary(&mut self, boundary: Vec<Point>) {
        self.boundary = Some(boundary);
    }
}

/// Value entering a stack at `x`: 100% stacking divides by the absolute sum
/// of every stacked value at that x.
#[must_use]
pub fn stack_input(stacking: Stacking, data: &DataAggregator, x: f64, value: f64) -> f64 {
    match stacking {
        Stacking::Stacked100pc => {
            let total = data.abs_sum_at(x);
            if total > 0.0 { value / total } else { 0.0 }
        }
        _ => value,
    }
}

/// All stacking accumulators of one render pass.
#[derive(Debug, Clone, Default)]
pub struct StackRegistry {
    states: IndexMap<StackKey, StackState>,
}

impl StackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&mut self, family: StackFamily, axis_x: AxisId, axis_y: AxisId) -> &mut StackState {
        self.states
            .entry(StackKey {
                family,
                axis_x,
                axis_y,
            })
            .or_default()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_accumulates_each_sign_separately() {
        let mut state = StackState::default();
        assert_eq!(state.push(1.0, 2.0), StackedValue { lower: 0.0, upper: 2.0 });
        assert_eq!(state.push(1.0, -1.0), StackedValue { lower: 0.0, upper: -1.0 });
        assert_eq!(state.push(1.0, 3.0), StackedValue { lower: 2.0, upper: 5.0 });
        assert_eq!(state.push(1.0, -4.0), StackedValue { lower: -1.0, upper: -5.0 });
        assert_eq!(state.level(1.0, false), 5.0);
        assert_eq!(state.level(2.0, true), 0.0);
    }

    #[test]
    fn percent_stacking_divides_by_absolute_sum() {
        use crate::core::{ChartType, Series};

        let a = Series::new("a", vec![3.0]);
        let b = Series::new("b", vec![-1.0]);
        let data = DataAggregator::analyse(
            &[(&a, ChartType::Column), (&b, ChartType::Column)],
            Stacking::Stacked100pc,
        );
        assert_eq!(stack_input(Stacking::Stacked100pc, &data, 0.0, 3.0), 0.75);
        assert_eq!(stack_input(Stacking::Stacked100pc, &data, 0.0, -1.0), -0.25);
        assert_eq!(stack_input(Stacking::Stacked, &data, 0.0, 3.0), 3.0);
        assert_eq!(stack_input(Stacking::Stacked100pc, &data, 5.0, 3.0), 0.0);
    }

    #[test]
    fn registry_scopes_state_per_family_and_axis_pair() {
        let mut registry = StackRegistry::new();
        registry.state(StackFamily::Bar, AxisId(0), AxisId(1)).push(0.0, 4.0);
        assert_eq!(registry.state(StackFamily::Area, AxisId(0), AxisId(1)).level(0.0, false), 0.0);
        assert_eq!(registry.state(StackFamily::Bar, AxisId(0), AxisId(2)).level(0.0, false), 0.0);
        assert_eq!(registry.state(StackFamily::Bar, AxisId(0), AxisId(1)).level(0.0, false), 4.0);
    }
}
