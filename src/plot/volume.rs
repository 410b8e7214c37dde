use crate::core::{AxisConversion, is_valid};

/// Volume-weighted X mapping for finance charts.
///
/// Each point owns an interval of the cumulative traded volume; its x value
/// maps to the center of that interval and values between points are
/// interpolated linearly (extrapolated past either end). Intervals laid end
/// to end cover `[0, total]`, so wider symbols mean more volume.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeConversion {
    /// Sorted x values with the start and size of their volume interval.
    points: Vec<VolumePoint>,
    /// Strictly increasing `(x, volume position)` interpolation knots.
    knots: Vec<(f64, f64)>,
    total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct VolumePoint {
    x: f64,
    start: f64,
    volume: f64,
}

impl VolumeConversion {
    /// Builds the mapping; `None` when no point carries positive volume.
    ///
    /// Invalid x values are dropped; invalid or negative volumes count as 0.
    #[must_use]
    pub fn new(x: &[f64], volume: &[f64]) -> Option<Self> {
        let mut pairs: Vec<(f64, f64)> = x
            .iter()
            .zip(volume)
            .filter(|(x, _)| is_valid(**x))
            .map(|(x, v)| (*x, if is_valid(*v) && *v > 0.0 { *v } else { 0.0 }))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut points = Vec::with_capacity(pairs.len());
        let mut total = 0.0;
        for (x, volume) in pairs {
            points.push(VolumePoint {
                x,
                start: total,
                volume,
            });
            total += volume;
        }
        if total <= 0.0 {
            return None;
        }

        let mut knots: Vec<(f64, f64)> = Vec::with_capacity(points.len());
        for point in &points {
            let center = point.start + 0.5 * point.volume;
            match knots.last() {
                Some(&(last_x, last_center)) if point.x <= last_x || center <= last_center => {}
                _ => knots.push((point.x, center)),
            }
        }

        Some(Self {
            points,
            knots,
            total,
        })
    }

    #[must_use]
    pub fn total_volume(&self) -> f64 {
        self.total
    }

    /// Volume position of a data value.
    #[must_use]
    pub fn position(&self, value: f64) -> f64 {
        interpolate(&self.knots, value, self.total, |knot| knot)
    }

    /// Data value at a volume position.
    #[must_use]
    pub fn value_at(&self, position: f64) -> f64 {
        interpolate(&self.knots, position, 1.0 / self.total, |(x, center)| (center, x))
    }

    /// Data-space X range covering every volume interval.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.value_at(0.0), self.value_at(self.total))
    }

    /// Data-space span of the volume interval owned by the point at `x`.
    #[must_use]
    pub fn interval(&self, x: f64) -> Option<(f64, f64)> {
        let index = self.points.partition_point(|point| point.x < x);
        let point = self.points.get(index).filter(|point| point.x == x)?;
        Some((
            self.value_at(point.start),
            self.value_at(point.start + point.volume),
        ))
    }
}

impl AxisConversion for VolumeConversion {
    fn to_fraction(&self, value: f64, actual_min: f64, actual_max: f64) -> f64 {
        let low = self.position(actual_min);
        let span = self.position(actual_max) - low;
        if span == 0.0 {
            return 0.0;
        }
        (self.position(value) - low) / span
    }

    fn from_fraction(&self, fraction: f64, actual_min: f64, actual_max: f64) -> f64 {
        let low = self.position(actual_min);
        let high = self.position(actual_max);
        self.value_at(low + fraction * (high - low))
    }
}

/// Piecewise-linear map through `knots` (after `orient`), extrapolating the
/// outer segments. A single knot extrapolates with `single_slope`.
fn interpolate(
    knots: &[(f64, f64)],
    value: f64,
    single_slope: f64,
    orient: impl Fn((f64, f64)) -> (f64, f64),
) -> f64 {
    match knots {
        [] => f64::NAN,
        [only] => {
            let (from, to) = orient(*only);
            to + (value - from) * single_slope
        }
        _ => {
            let index = knots
                .partition_point(|knot| orient(*knot).0 <= value)
                .clamp(1, knots.len() - 1);
            let (x0, y0) = orient(knots[index - 1]);
            let (x1, y1) = orient(knots[index]);
            y0 + (value - x0) * (y1 - y0) / (x1 - x0)
        }
    }
}
