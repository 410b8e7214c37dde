use chart_plotters::api::{Chart, ChartOptions};
use chart_plotters::core::stats::compute_all;
use chart_plotters::core::{
    Axis, ChartType, OhlcColumns, Point, QuartileMethod, Rect, Series, Stacking,
};
use chart_plotters::render::RecordingEngine;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn plot_rect() -> Rect {
    Rect::new(40.0, 20.0, 1_800.0, 1_000.0)
}

fn wave(phase: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 50.0 + 40.0 * ((i as f64) * 0.01 + phase).sin())
        .collect()
}

fn bench_axis_round_trip(c: &mut Criterion) {
    let mut axis = Axis::horizontal(0);
    axis.set_range(0.0, 10_000.0, plot_rect()).expect("valid range");

    c.bench_function("axis_round_trip", |b| {
        b.iter(|| {
            let px = axis.convert(black_box(4_321.123));
            black_box(axis.convert_back(px))
        })
    });
}

fn bench_stacked_columns_10k(c: &mut Criterion) {
    let options = ChartOptions::new(ChartType::Column).with_stacking(Stacking::Stacked);
    let mut chart = Chart::new(RecordingEngine::new(), plot_rect(), options).expect("chart");
    for phase in [0.0, 1.0, 2.0] {
        chart.add_series(Series::new("wave", wave(phase, 10_000)));
    }

    c.bench_function("stacked_columns_10k", |b| {
        b.iter(|| {
            chart.engine_mut().clear();
            chart.render().expect("render");
        })
    });
}

fn bench_spline_area_10k(c: &mut Criterion) {
    let options = ChartOptions::new(ChartType::SplineArea);
    let mut chart = Chart::new(RecordingEngine::new(), plot_rect(), options).expect("chart");
    chart.add_series(Series::new("wave", wave(0.5, 10_000)));

    c.bench_function("spline_area_10k", |b| {
        b.iter(|| {
            chart.engine_mut().clear();
            chart.render().expect("render");
        })
    });
}

fn bench_candlesticks_and_hit_test_10k(c: &mut Criterion) {
    let close = wave(0.0, 10_000);
    let open: Vec<f64> = close.iter().enumerate().map(|(i, c)| if i % 2 == 0 { c - 1.0 } else { c + 1.0 }).collect();
    let high: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.max(*c) + 0.75).collect();
    let low: Vec<f64> = open.iter().zip(&close).map(|(o, c)| o.min(*c) - 0.75).collect();
    let series = Series::ohlc(
        "quotes",
        OhlcColumns {
            open,
            high,
            low,
            close,
            volume: None,
        },
    )
    .expect("ohlc");

    let mut chart = Chart::new(
        RecordingEngine::new(),
        plot_rect(),
        ChartOptions::new(ChartType::Candlestick),
    )
    .expect("chart");
    chart.add_series(series);

    c.bench_function("candlesticks_10k", |b| {
        b.iter(|| {
            chart.engine_mut().clear();
            chart.render().expect("render");
        })
    });

    c.bench_function("hit_test_10k", |b| {
        b.iter(|| black_box(chart.hit_test(black_box(Point::new(900.0, 500.0))).is_some()))
    });
}

fn bench_box_stats(c: &mut Criterion) {
    let samples: Vec<Vec<f64>> = (0..500).map(|i| wave(i as f64, 200)).collect();

    c.bench_function("box_stats_500x200", |b| {
        b.iter(|| black_box(compute_all(&samples, QuartileMethod::InclusiveMedian, true)))
    });
}

criterion_group!(
    benches,
    bench_axis_round_trip,
    bench_stacked_columns_10k,
    bench_spline_area_10k,
    bench_candlesticks_and_hit_test_10k,
    bench_box_stats
);
criterion_main!(benches);
