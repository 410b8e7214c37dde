use serde_json::Value;
use tracing::{trace, warn};

use crate::api::{ChartOptions, FunnelMode};
use crate::core::{Axis, DataAggregator, DataPoint, Point, Rect, Series, is_valid};
use crate::interaction::{FunnelSegment, HitShape};
use crate::render::RenderEngine;

use super::{PlotContext, Plotter, PlotterKind, SeriesOrdinal, style_pen};

/// Area covered by the whole funnel outline: the tapering trapezoid plus the
/// rectangular neck. Neck sizes are fractions of `width`/`height`.
#[must_use]
pub fn funnel_total_area(width: f64, height: f64, neck_width: f64, neck_height: f64) -> f64 {
    let neck_w = width * neck_width;
    let neck_h = height * neck_height;
    0.5 * (width + neck_w) * (height - neck_h) + neck_w * neck_h
}

/// Funnel shape of one plot rectangle, filled top-down segment by segment.
#[derive(Debug, Clone, Copy)]
struct FunnelShape {
    rect: Rect,
    neck_w: f64,
    trap_h: f64,
    /// Half-width shrink per pixel of height along the slanted walls.
    angle: f64,
}

impl FunnelShape {
    fn new(rect: Rect, neck_width: f64, neck_height: f64) -> Self {
        let neck_w = rect.width * neck_width;
        let trap_h = rect.height * (1.0 - neck_height);
        let angle = if trap_h > 0.0 {
            0.5 * (rect.width - neck_w) / trap_h
        } else {
            0.0
        };
        Self {
            rect,
            neck_w,
            trap_h,
            angle,
        }
    }

    fn center_x(&self) -> f64 {
        self.rect.left + 0.5 * self.rect.width
    }

    fn width_at(&self, offset: f64) -> f64 {
        if offset < self.trap_h {
            self.rect.width - 2.0 * self.angle * offset
        } else {
            self.neck_w
        }
    }

    fn corners(&self, offset: f64) -> (Point, Point) {
        let half = 0.5 * self.width_at(offset);
        let y = self.rect.top + offset;
        (
            Point::new(self.center_x() - half, y),
            Point::new(self.center_x() + half, y),
        )
    }

    /// Outline of a segment of `area` starting at `offset`; returns the
    /// clockwise outline and the offset where the next segment starts.
    fn segment(&self, offset: f64, area: f64) -> (Vec<Point>, f64) {
        let (top_left, top_right) = self.corners(offset);
        if offset < self.trap_h {
            let top_w = self.width_at(offset);
            let rest_h = self.trap_h - offset;
            let rest_area = top_w * rest_h - self.angle * rest_h * rest_h;
            if area <= rest_area {
                let height = if self.angle > 0.0 {
                    let half = top_w / (2.0 * self.angle);
                    half - (half * half - area / self.angle).max(0.0).sqrt()
                } else if top_w > 0.0 {
                    area / top_w
                } else {
                    0.0
                };
                let end = (offset + height).min(self.trap_h);
                let (bottom_left, bottom_right) = self.corners(end);
                return (vec![top_left, top_right, bottom_right, bottom_left], end);
            }

            let neck_h = if self.neck_w > 0.0 {
                (area - rest_area) / self.neck_w
            } else {
                0.0
            };
            let end = (self.trap_h + neck_h).min(self.rect.height);
            let half = 0.5 * self.neck_w;
            let (cx, neck_top, bottom) = (
                self.center_x(),
                self.rect.top + self.trap_h,
                self.rect.top + end,
            );
            let outline = vec![
                top_left,
                top_right,
                Point::new(cx + half, neck_top),
                Point::new(cx + half, bottom),
                Point::new(cx - half, bottom),
                Point::new(cx - half, neck_top),
            ];
            return (outline, end);
        }

        let height = if self.neck_w > 0.0 { area / self.neck_w } else { 0.0 };
        let end = (offset + height).min(self.rect.height);
        let (bottom_left, bottom_right) = self.corners(end);
        (vec![top_left, top_right, bottom_right, bottom_left], end)
    }
}

/// Single-series funnel plotter (pyramid with neck, or stacked rectangles).
#[derive(Debug, Clone)]
pub struct FunnelPlotter {
    neck_width: f64,
    neck_height: f64,
    mode: FunnelMode,
}

impl FunnelPlotter {
    #[must_use]
    pub fn new(options: &ChartOptions) -> Self {
        Self {
            neck_width: options.funnel.neck_width.clamp(0.0, 1.0),
            neck_height: options.funnel.neck_height.clamp(0.0, 1.0),
            mode: options.funnel.mode,
        }
    }

    fn slice_name(series: &Series, axis_x: &Axis, index: usize) -> String {
        match series.item(index) {
            Some(Value::String(name)) => name.clone(),
            Some(Value::Object(fields)) => fields
                .get("name")
                .and_then(Value::as_str)
                .map_or_else(|| axis_x.format_value(series.x_at(index)), str::to_owned),
            _ => axis_x.format_value(series.x_at(index)),
        }
    }
}

impl Plotter for FunnelPlotter {
    fn kind(&self) -> PlotterKind {
        PlotterKind::Funnel
    }

    /// Funnels fill the plot rectangle and contribute no axis range.
    fn adjust_limits(&self, _data: &DataAggregator, _plot_rect: Rect, _axis_y: &Axis) -> Option<Rect> {
        None
    }

    fn plot_series(
        &mut self,
        ctx: &mut PlotContext<'_>,
        engine: &mut dyn RenderEngine,
        series: &Series,
        ordinal: SeriesOrdinal,
    ) {
        let series_index = ordinal.series_index;
        ctx.hits.clear_series(series_index);
        if ordinal.ordinal > 0 {
            warn!(series = series_index, "funnel charts plot only their first series");
            return;
        }

        let values = series.y_values();
        ctx.slices.clear();
        let mut slices: Vec<(usize, f64)> = Vec::new();
        for index in 0..series.len() {
            let value = values.get(index).copied().unwrap_or(f64::NAN);
            ctx.slices.push(Self::slice_name(series, ctx.axis_x, index), value);
            if is_valid(value) && value > 0.0 {
                slices.push((index, value));
            }
        }
        if slices.is_empty() {
            return;
        }

        let rect = ctx.plot_rect;
        let sum: f64 = slices.iter().map(|(_, value)| value).sum();
        let max = slices.iter().map(|(_, value)| *value).fold(0.0, f64::max);
        let shape = FunnelShape::new(rect, self.neck_width, self.neck_height);
        let total_area = funnel_total_area(rect.width, rect.height, self.neck_width, self.neck_height);
        let row_height = rect.height / slices.len() as f64;

        let mut offset = 0.0;
        for (row, &(index, value)) in slices.iter().enumerate() {
            let outline = match self.mode {
                FunnelMode::Default => {
                    let (outline, next) = shape.segment(offset, total_area * value / sum);
                    offset = next;
                    outline
                }
                FunnelMode::Rectangle => {
                    let width = rect.width * value / max;
                    let left = rect.left + 0.5 * (rect.width - width);
                    let top = rect.top + row as f64 * row_height;
                    vec![
                        Point::new(left, top),
                        Point::new(left + width, top),
                        Point::new(left + width, top + row_height),
                        Point::new(left, top + row_height),
                    ]
                }
            };

            let style = series.style.resolved(ctx.palette.color(index));
            engine.set_pen(style_pen(style));
            let tag = DataPoint::new(series_index, index, series.x_at(index), value);
            ctx.render_slice_symbol(engine, series, tag, &mut |engine| engine.draw_polygon(&outline));
            ctx.add_hit(HitShape::Funnel(FunnelSegment::new(outline)), tag);
        }

        trace!(series = series_index, segments = slices.len(), mode = ?self.mode, "plot funnel");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_area_splits_into_trapezoid_and_neck() {
        let area = funnel_total_area(100.0, 200.0, 0.2, 0.25);
        assert!((area - (0.5 * 120.0 * 150.0 + 20.0 * 50.0)).abs() <= 1e-9);
    }

    #[test]
    fn segment_inside_trapezoid_has_requested_area() {
        let shape = FunnelShape::new(Rect::new(0.0, 0.0, 100.0, 200.0), 0.2, 0.25);
        let (outline, end) = shape.segment(0.0, 2000.0);
        let area = FunnelSegment::new(outline.clone()).area();
        assert_eq!(outline.len(), 4);
        assert!((area - 2000.0).abs() <= 1e-6);
        assert!(end > 0.0 && end < 150.0);
    }

    #[test]
    fn segment_crossing_into_the_neck_uses_six_vertices() {
        let shape = FunnelShape::new(Rect::new(0.0, 0.0, 100.0, 200.0), 0.2, 0.25);
        let (outline, end) = shape.segment(140.0, 800.0);
        assert_eq!(outline.len(), 6);
        assert!(end > 150.0);
        assert!((FunnelSegment::new(outline).area() - 800.0).abs() <= 1e-6);
    }
}
