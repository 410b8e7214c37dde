use chart_plotters::core::{Axis, AxisConversion, Rect};
use chart_plotters::plot::VolumeConversion;
use proptest::prelude::*;
use std::sync::Arc;

fn plot_rect() -> Rect {
    Rect::new(15.0, 25.0, 640.0, 480.0)
}

proptest! {
    #[test]
    fn linear_axis_pixel_round_trip_property(
        min in -10_000.0f64..10_000.0,
        span in 1.0f64..100_000.0,
        pixel_factor in 0.0f64..1.0,
        vertical in any::<bool>()
    ) {
        let mut axis = if vertical { Axis::vertical(1) } else { Axis::horizontal(0) };
        axis.set_range(min, min + span, plot_rect()).expect("range");
        let rect = plot_rect();
        let pixel = if vertical {
            rect.top + pixel_factor * rect.height
        } else {
            rect.left + pixel_factor * rect.width
        };
        let recovered = axis.convert(axis.convert_back(pixel));
        prop_assert!((recovered - pixel).abs() <= 1e-6);
    }

    #[test]
    fn log_axis_round_trip_in_moderate_ranges_property(
        min_exp in -3.0f64..3.0,
        decades in 0.5f64..6.0,
        pixel_factor in 0.0f64..1.0
    ) {
        let mut axis = Axis::horizontal(0).with_log_base(10.0).expect("log");
        let min = 10f64.powf(min_exp);
        axis.set_range(min, min * 10f64.powf(decades), plot_rect()).expect("range");
        let pixel = plot_rect().left + pixel_factor * plot_rect().width;
        let recovered = axis.convert(axis.convert_back(pixel));
        prop_assert!((recovered - pixel).abs() <= 1e-6);
    }

    #[test]
    fn volume_axis_round_trip_property(
        volumes in prop::collection::vec(0.1f64..1_000.0, 2..20),
        pixel_factor in 0.0f64..1.0
    ) {
        let x: Vec<f64> = (0..volumes.len()).map(|i| i as f64).collect();
        let volume = VolumeConversion::new(&x, &volumes).expect("volume");
        let (low, high) = volume.bounds();
        let conversion: Arc<dyn AxisConversion> = Arc::new(volume);
        let mut axis = Axis::horizontal(0);
        axis.replace_conversion(Some(conversion));
        axis.set_range(low, high, plot_rect()).expect("range");
        let pixel = plot_rect().left + pixel_factor * plot_rect().width;
        let recovered = axis.convert(axis.convert_back(pixel));
        prop_assert!((recovered - pixel).abs() <= 1e-5);
    }
}
