use std::cell::Cell;
use std::rc::Rc;

use chart_plotters::api::{Chart, ChartOptions, Invalidation, PRIMARY_X};
use chart_plotters::core::{Axis, AxisId, AxisPosition, ChartType, Point, Rect, Series, Stacking};
use chart_plotters::interaction::{DistanceMode, HitTestResult};
use chart_plotters::plot::{PlotterKind, WidthSpec};
use chart_plotters::render::{Color, RecordingEngine, RenderEngine};
use chart_plotters::{ChartError, ChartResult};

fn formatter<F>(f: F) -> F
where
    F: Fn(&mut dyn RenderEngine, &HitTestResult<'_>, &mut dyn FnMut(&mut dyn RenderEngine)),
{
    f
}

fn column_chart() -> Chart<RecordingEngine> {
    let mut chart = Chart::new(
        RecordingEngine::new(),
        Rect::new(0.0, 0.0, 400.0, 300.0),
        ChartOptions::new(ChartType::Column),
    )
    .expect("chart");
    chart.add_series(Series::new("a", vec![1.0, 2.0, 3.0]));
    chart.add_series(Series::new("b", vec![2.0, 1.0, 4.0]));
    chart
}

#[test]
fn bar_center_resolves_to_its_data_point() {
    let mut chart = column_chart();
    chart.render().expect("render");
    let rects = chart.engine().rects();
    for (order, rect) in rects.iter().enumerate() {
        let hit = chart.hit_test(rect.center()).expect("hit");
        assert_eq!(hit.series_index(), order / 3);
        assert_eq!(hit.point_index(), order % 3);
        assert_eq!(hit.distance(), 0.0);
    }
}

#[test]
fn hit_result_formats_values_lazily() {
    let mut chart = column_chart();
    chart.render().expect("render");
    let center = chart.engine().rects()[2].center();
    let hit = chart.hit_test(center).expect("hit");
    assert_eq!(hit.x().as_f64(), 2.0);
    assert_eq!(hit.y().as_f64(), 3.0);
    assert_eq!(hit.x_formatted(), "2");
    assert_eq!(hit.name(), Some("a"));
    assert!(hit.item().is_none());
}

#[test]
fn nearest_query_respects_the_distance_mode() {
    let mut chart = column_chart();
    chart.render().expect("render");
    let first = chart.engine().rects()[0];
    let above = Point::new(first.center().x, first.top - 20.0);
    let hit = chart
        .hit_test_with(above, DistanceMode::X, false)
        .expect("hit");
    assert_eq!((hit.series_index(), hit.point_index()), (0, 0));
    assert_eq!(hit.distance(), 0.0);
}

#[test]
fn hidden_series_are_not_plotted() {
    let mut chart = column_chart();
    chart.series_mut(1).expect("series").visible = false;
    chart.render().expect("render");
    assert_eq!(chart.engine().rects().len(), 3);
    assert!(chart.hit_index().series_areas(1).is_empty());
}

#[test]
fn unknown_series_is_reported() {
    let mut chart = column_chart();
    assert!(matches!(chart.series_mut(7), Err(ChartError::UnknownSeries(7))));
    assert!(matches!(chart.remove_series(2), Err(ChartError::UnknownSeries(2))));
}

#[test]
fn invalid_plot_rect_is_rejected() {
    let result = Chart::new(
        RecordingEngine::new(),
        Rect::new(0.0, 0.0, 0.0, 100.0),
        ChartOptions::default(),
    );
    assert!(matches!(result, Err(ChartError::InvalidPlotRect { .. })));
}

#[test]
fn series_bound_to_a_missing_axis_fail_the_pass() {
    let mut chart = column_chart();
    chart.add_series(Series::new("c", vec![1.0]).with_axes(None, Some(AxisId(5))));
    assert!(matches!(chart.render(), Err(ChartError::InvalidOption(_))));
}

#[test]
fn failed_conditional_pass_stays_invalidated() {
    let mut chart = column_chart();
    chart.add_series(Series::new("c", vec![1.0]).with_axes(None, Some(AxisId(5))));
    assert!(chart.render_if_invalidated().is_err());
    assert!(chart.is_invalidated());
    assert_eq!(chart.render_count(), 0);

    chart.remove_series(2).expect("remove");
    assert!(chart.render_if_invalidated().expect("retry"));
    assert_eq!(chart.render_count(), 1);
}

#[test]
fn constant_series_of_large_magnitude_renders() {
    let mut chart = Chart::new(
        RecordingEngine::new(),
        Rect::new(0.0, 0.0, 400.0, 300.0),
        ChartOptions::new(ChartType::Line),
    )
    .expect("chart");
    chart.add_series(Series::new("flat", vec![1e17; 3]));
    chart.render().expect("render");

    let axis_y = chart.axis(AxisId(1)).expect("y axis");
    assert!(axis_y.actual_min() < 1e17 && 1e17 < axis_y.actual_max());
    assert_eq!(chart.engine().polylines().len(), 1);
    chart.engine().validate().expect("finite geometry");
}

#[test]
fn secondary_axis_ranges_independently() {
    let mut chart = column_chart();
    let secondary = chart.add_axis(Axis::vertical(0));
    assert_eq!(secondary, AxisId(2));
    chart.add_series(
        Series::new("volume", vec![1000.0, 3000.0, 2000.0])
            .with_chart_type(ChartType::Line)
            .with_axes(None, Some(secondary)),
    );
    chart.render().expect("render");

    assert_eq!(chart.axis(secondary).expect("axis").actual_max(), 3000.0);
    assert_eq!(chart.axis(AxisId(1)).expect("axis").actual_max(), 4.0);
    let kinds: Vec<PlotterKind> = chart.plot_groups().iter().map(|group| group.kind).collect();
    assert_eq!(kinds, vec![PlotterKind::Bar, PlotterKind::Line]);
}

#[test]
fn rotated_option_swaps_axis_directions() {
    let mut chart = Chart::new(
        RecordingEngine::new(),
        Rect::new(0.0, 0.0, 200.0, 200.0),
        ChartOptions::new(ChartType::Line).with_rotated(true),
    )
    .expect("chart");
    chart.add_series(Series::new("s", vec![1.0, 2.0]));
    chart.render().expect("render");
    assert_eq!(chart.axis(PRIMARY_X).expect("x").position(), AxisPosition::Vertical);
}

#[test]
fn invalidations_coalesce_into_one_pass() {
    let mut chart = column_chart();
    assert!(chart.render_if_invalidated().expect("first"));
    assert!(!chart.render_if_invalidated().expect("idle"));

    chart.invalidate();
    chart.invalidate();
    chart.series_mut(0).expect("series").set_values(vec![3.0, 2.0, 1.0]);
    assert!(chart.is_invalidated());
    assert!(chart.render_if_invalidated().expect("second"));
    assert!(!chart.render_if_invalidated().expect("idle again"));
    assert_eq!(chart.render_count(), 2);
}

#[test]
fn invalidation_counts_requests_and_passes() {
    let mut invalidation = Invalidation::default();
    assert!(invalidation.take());
    invalidation.mark_rendered();
    invalidation.request();
    invalidation.request();
    assert_eq!(invalidation.requests(), 2);
    assert!(invalidation.take());
    assert!(!invalidation.take());
    invalidation.mark_rendered();
    assert_eq!(invalidation.passes(), 2);
}

#[test]
fn item_formatter_can_restyle_or_skip_symbols() {
    let mut chart = column_chart();
    let calls = Rc::new(Cell::new(0_usize));
    let seen = Rc::clone(&calls);
    let highlight = Color::rgb(1.0, 0.5, 0.0);
    chart.set_item_formatter(formatter(move |engine, hit, default_render| {
        seen.set(seen.get() + 1);
        if hit.point_index() == 1 {
            return;
        }
        if hit.y().as_f64() >= 3.0 {
            engine.set_fill(Some(highlight));
        }
        default_render(engine);
    }));
    chart.render().expect("render");

    assert_eq!(calls.get(), 6);
    let fills: Vec<Option<Color>> = chart.engine().filled_rects().into_iter().map(|(_, fill)| fill).collect();
    assert_eq!(fills.len(), 4);
    assert_eq!(fills[1], Some(highlight));
    assert_eq!(fills[3], Some(highlight));
    assert_ne!(fills[0], Some(highlight));
    // skipped symbols are still hit-testable
    assert_eq!(chart.hit_index().len(), 6);
}

#[test]
fn options_round_trip_through_json() -> ChartResult<()> {
    let options = ChartOptions::new(ChartType::Column)
        .with_stacking(Stacking::Stacked100pc)
        .with_group_width(WidthSpec::Pixels(24.0))
        .with_gap_width(WidthSpec::Percent(10.0));
    let json = options.to_json_pretty()?;
    assert!(json.contains("\"24px\""));
    assert_eq!(ChartOptions::from_json(&json)?, options);
    Ok(())
}

#[test]
fn options_fill_defaults_and_reject_bad_values() {
    let options = ChartOptions::from_json(r#"{"chart_type": "Funnel", "funnel": {"mode": "Rectangle"}}"#)
        .expect("options");
    assert_eq!(options.chart_type, ChartType::Funnel);
    assert_eq!(options.funnel.neck_width, 0.2);
    assert_eq!(options.symbol_size, 10.0);

    let err = ChartOptions::from_json(r#"{"funnel": {"neck_width": 1.5}}"#).expect_err("neck");
    assert!(matches!(err, ChartError::InvalidOption(_)));
    let err = ChartOptions::from_json(r#"{"group_width": "wide"}"#).expect_err("width");
    assert!(matches!(err, ChartError::InvalidOption(_)));
}

#[test]
fn tracing_init_is_optional_for_render_passes() {
    let installed = chart_plotters::telemetry::init_tracing("chart_plotters=trace");
    assert_eq!(installed, cfg!(feature = "telemetry"));
    assert!(!chart_plotters::telemetry::init_tracing("chart_plotters=debug"));

    let mut chart = column_chart();
    chart.render().expect("render");
    assert_eq!(chart.render_count(), 1);
}
