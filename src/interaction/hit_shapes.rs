use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{DataPoint, Point, Rect};

/// Axis used when measuring the distance from a query point to a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DistanceMode {
    #[default]
    Xy,
    X,
    Y,
}

/// Outline of one funnel segment: a trapezoid, optionally continued by the
/// rectangular neck (up to six vertices, clockwise from the top-left).
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelSegment {
    outline: SmallVec<[Point; 6]>,
}

impl FunnelSegment {
    #[must_use]
    pub fn new(outline: impl IntoIterator<Item = Point>) -> Self {
        Self {
            outline: outline.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    /// Shoelace area of the outline.
    #[must_use]
    pub fn area(&self) -> f64 {
        polygon_area(&self.outline)
    }
}

/// Hit-testable geometry in pixel space.
#[derive(Debug, Clone, PartialEq)]
pub enum HitShape {
    Circle { center: Point, radius: f64 },
    Rect(Rect),
    Polyline(Vec<Point>),
    Polygon(Vec<Point>),
    Funnel(FunnelSegment),
}

impl HitShape {
    /// Polylines have no interior and never contain a point.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        match self {
            Self::Circle { center, radius } => center.distance_to(point) <= *radius,
            Self::Rect(rect) => rect.contains(point),
            Self::Polyline(_) => false,
            Self::Polygon(points) => polygon_contains(points, point),
            Self::Funnel(segment) => polygon_contains(segment.outline(), point),
        }
    }

    /// Distance from `point` to the shape boundary; `0.0` when contained.
    #[must_use]
    pub fn distance(&self, point: Point, mode: DistanceMode) -> f64 {
        match self {
            Self::Circle { center, radius } => {
                let d = match mode {
                    DistanceMode::Xy => center.distance_to(point),
                    DistanceMode::X => (center.x - point.x).abs(),
                    DistanceMode::Y => (center.y - point.y).abs(),
                };
                (d - radius).max(0.0)
            }
            Self::Rect(rect) => {
                let dx = axis_gap(point.x, rect.left, rect.right());
                let dy = axis_gap(point.y, rect.top, rect.bottom());
                match mode {
                    DistanceMode::Xy => dx.hypot(dy),
                    DistanceMode::X => dx,
                    DistanceMode::Y => dy,
                }
            }
            Self::Polyline(points) => polyline_distance(points, point, mode, false),
            Self::Polygon(points) => {
                if polygon_contains(points, point) {
                    0.0
                } else {
                    polyline_distance(points, point, mode, true)
                }
            }
            Self::Funnel(segment) => {
                if polygon_contains(segment.outline(), point) {
                    0.0
                } else {
                    polyline_distance(segment.outline(), point, mode, true)
                }
            }
        }
    }

    #[must_use]
    pub fn is_polyline(&self) -> bool {
        matches!(self, Self::Polyline(_))
    }
}

/// A shape tagged with the data point it was plotted from.
#[derive(Debug, Clone, PartialEq)]
pub struct HitArea {
    pub shape: HitShape,
    pub tag: DataPoint,
}

impl HitArea {
    #[must_use]
    pub fn new(shape: HitShape, tag: DataPoint) -> Self {
        Self { shape, tag }
    }
}

fn axis_gap(value: f64, low: f64, high: f64) -> f64 {
    if value < low {
        low - value
    } else if value > high {
        value - high
    } else {
        0.0
    }
}

fn polygon_contains(points: &[Point], point: Point) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside || points.iter().zip(points.iter().cycle().skip(1)).any(|(a, b)| {
        segment_distance(*a, *b, point) <= f64::EPSILON * 16.0
    })
}

fn polyline_distance(points: &[Point], point: Point, mode: DistanceMode, closed: bool) -> f64 {
    match points {
        [] => f64::INFINITY,
        [single] => match mode {
            DistanceMode::Xy => single.distance_to(point),
            DistanceMode::X => (single.x - point.x).abs(),
            DistanceMode::Y => (single.y - point.y).abs(),
        },
        _ => {
            let edges = points.windows(2).map(|w| (w[0], w[1]));
            let closing = closed.then(|| (points[points.len() - 1], points[0]));
            edges
                .chain(closing)
                .map(|(a, b)| match mode {
                    DistanceMode::Xy => segment_distance(a, b, point),
                    DistanceMode::X => axis_gap(point.x, a.x.min(b.x), a.x.max(b.x)),
                    DistanceMode::Y => axis_gap(point.y, a.y.min(b.y), a.y.max(b.y)),
                })
                .fold(f64::INFINITY, f64::min)
        }
    }
}

fn segment_distance(a: Point, b: Point, point: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return a.distance_to(point);
    }
    let t = (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    Point::new(a.x + t * dx, a.y + t * dy).distance_to(point)
}

fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    0.5 * twice.abs()
}
