use chart_plotters::core::{AxisId, ChartType, DataAggregator, Series, Stacking};
use chart_plotters::plot::{StackFamily, StackRegistry, stack_input};
use proptest::prelude::*;

fn columns() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..6, 1usize..8).prop_flat_map(|(series, points)| {
        prop::collection::vec(prop::collection::vec(-100.0f64..100.0, points), series)
    })
}

proptest! {
    #[test]
    fn stacked_spans_chain_property(values in columns()) {
        let series: Vec<Series> = values.iter().map(|v| Series::new("s", v.clone())).collect();
        let typed: Vec<(&Series, ChartType)> = series.iter().map(|s| (s, ChartType::Column)).collect();
        let data = DataAggregator::analyse(&typed, Stacking::Stacked);
        let mut registry = StackRegistry::new();
        let points = values[0].len();

        for x in 0..points {
            let mut positive_top = 0.0;
            let mut negative_top = 0.0;
            for column in &values {
                let value = stack_input(Stacking::Stacked, &data, x as f64, column[x]);
                let span = registry
                    .state(StackFamily::Bar, AxisId(0), AxisId(1))
                    .push(x as f64, value);
                let previous = if value >= 0.0 { &mut positive_top } else { &mut negative_top };
                prop_assert_eq!(span.lower, *previous);
                *previous = span.upper;
            }
        }
    }

    #[test]
    fn percent_stacking_sums_to_one_property(values in columns()) {
        let series: Vec<Series> = values.iter().map(|v| Series::new("s", v.clone())).collect();
        let typed: Vec<(&Series, ChartType)> = series.iter().map(|s| (s, ChartType::Area)).collect();
        let data = DataAggregator::analyse(&typed, Stacking::Stacked100pc);

        for x in 0..values[0].len() {
            let total: f64 = values
                .iter()
                .map(|column| stack_input(Stacking::Stacked100pc, &data, x as f64, column[x]).abs())
                .sum();
            let any_non_zero = values.iter().any(|column| column[x] != 0.0);
            if any_non_zero {
                prop_assert!((total - 1.0).abs() <= 1e-9);
            } else {
                prop_assert_eq!(total, 0.0);
            }
        }
    }
}
