//! Cubic (Catmull-Rom) smoothing of pixel-space polylines.

use crate::core::types::Point;

/// Upper bound on interior samples per segment.
const MAX_SAMPLES_PER_SEGMENT: usize = 16;
/// Interior samples closer than this many pixels on both axes are dropped.
const MIN_PIXEL_GAP: f64 = 3.0;

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: Point,
    b: Point,
    c: Point,
    d: Point,
}

impl Segment {
    fn from_controls(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        let coefficient = |m: [f64; 4]| {
            Point::new(
                m[0] * p0.x + m[1] * p1.x + m[2] * p2.x + m[3] * p3.x,
                m[0] * p0.y + m[1] * p1.y + m[2] * p2.y + m[3] * p3.y,
            )
        };
        Self {
            a: coefficient([-0.5, 1.5, -1.5, 0.5]),
            b: coefficient([1.0, -2.5, 2.0, -0.5]),
            c: coefficient([-0.5, 0.0, 0.5, 0.0]),
            d: coefficient([0.0, 1.0, 0.0, 0.0]),
        }
    }

    fn at(&self, t: f64) -> Point {
        Point::new(
            ((self.a.x * t + self.b.x) * t + self.c.x) * t + self.d.x,
            ((self.a.y * t + self.b.y) * t + self.c.y) * t + self.d.y,
        )
    }
}

/// Smooths a polyline through every input point.
///
/// Inputs with three or fewer points are returned unchanged. Every input
/// point is part of the output; interior samples are spaced by the pixel
/// length of their segment.
#[must_use]
pub fn smooth(points: &[Point]) -> Vec<Point> {
    let len = points.len();
    if len <= 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(len * 4);
    out.push(points[0]);
    for i in 0..len - 1 {
        let p0 = if i == 0 { points[0] } else { points[i - 1] };
        let p3 = if i + 2 >= len { points[len - 1] } else { points[i + 2] };
        let (start, end) = (points[i], points[i + 1]);
        let segment = Segment::from_controls(p0, start, end, p3);

        let chord = start.distance_to(end);
        let samples = if chord.is_finite() {
            ((chord / MIN_PIXEL_GAP).ceil() as usize).clamp(1, MAX_SAMPLES_PER_SEGMENT)
        } else {
            1
        };
        let mut anchor = start;
        for k in 1..samples {
            let sample = segment.at(k as f64 / samples as f64);
            let near_anchor = (sample.x - anchor.x).abs() < MIN_PIXEL_GAP
                && (sample.y - anchor.y).abs() < MIN_PIXEL_GAP;
            let near_end = (sample.x - end.x).abs() < MIN_PIXEL_GAP
                && (sample.y - end.y).abs() < MIN_PIXEL_GAP;
            if !near_anchor && !near_end {
                out.push(sample);
                anchor = sample;
            }
        }
        out.push(end);
    }
    out
}
