use chart_plotters::api::{Chart, ChartOptions, PRIMARY_X, PRIMARY_Y};
use chart_plotters::core::{Axis, ChartType, DataType, Point, Rect, Series, ValueFormat};
use chart_plotters::interaction::HitValue;
use chart_plotters::render::RecordingEngine;
use chart_plotters::ChartError;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

fn chart(chart_type: ChartType) -> Chart<RecordingEngine> {
    Chart::new(
        RecordingEngine::new(),
        Rect::new(0.0, 0.0, 400.0, 200.0),
        ChartOptions::new(chart_type),
    )
    .expect("chart")
}

fn marker_at(chart: &Chart<RecordingEngine>, x: f64, y: f64) -> Point {
    let axis_x = chart.axis(PRIMARY_X).expect("x axis");
    let axis_y = chart.axis(PRIMARY_Y).expect("y axis");
    Point::new(axis_x.convert(x), axis_y.convert(y))
}

#[test]
fn date_axis_hits_resolve_to_datetimes() {
    let days: Vec<f64> = (5..8)
        .map(|day| {
            Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0)
                .single()
                .expect("date")
                .timestamp_millis() as f64
        })
        .collect();
    let mut chart = chart(ChartType::Scatter);
    chart
        .set_axis(
            PRIMARY_X,
            Axis::horizontal(0)
                .with_data_type(DataType::Date)
                .with_format("%d.%m".parse().expect("format")),
        )
        .expect("axis");
    chart.add_series(Series::with_xy("visits", days.clone(), vec![3.0, 5.0, 4.0]));
    chart.render().expect("render");

    let hit = chart.hit_test(marker_at(&chart, days[1], 5.0)).expect("hit");
    assert_eq!(hit.point_index(), 1);
    let expected = Utc.with_ymd_and_hms(2024, 3, 6, 0, 0, 0).single().expect("date");
    assert_eq!(hit.x(), HitValue::Date(expected));
    assert_eq!(hit.x_formatted(), "06.03");
    assert_eq!(hit.y(), HitValue::Number(5.0));
}

#[test]
fn decimal_values_plot_with_fixed_formatting() {
    let mut chart = chart(ChartType::Scatter);
    *chart.axis_mut(PRIMARY_Y).expect("y axis") = Axis::vertical(1).with_format(ValueFormat::Fixed(2));
    let prices = [Decimal::new(1050, 2), Decimal::new(1125, 2), Decimal::new(990, 2)];
    chart.add_series(Series::from_decimal_values("price", &prices).expect("decimal"));
    chart.render().expect("render");

    let hit = chart.hit_test(marker_at(&chart, 1.0, 11.25)).expect("hit");
    assert_eq!(hit.y_formatted(), "11.25");
    assert_eq!(hit.x_formatted(), "1");
}

#[test]
fn percent_format_scales_values() {
    let format: ValueFormat = "p1".parse().expect("format");
    assert_eq!(format.format_number(0.256), "25.6%");
    assert!(matches!("x9".parse::<ValueFormat>(), Err(ChartError::InvalidOption(_))));
}
