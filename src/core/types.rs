use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Point in pixel space (or data space for `adjust_limits` rectangles).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds a normalized rectangle from two opposite corners given in any order.
    #[must_use]
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            left: x0.min(x1),
            top: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn center(self) -> Point {
        Point::new(self.left + 0.5 * self.width, self.top + 0.5 * self.height)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Smallest rectangle covering both operands.
    #[must_use]
    pub fn union(self, other: Rect) -> Self {
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self::new(left, top, right - left, bottom - top)
    }

    /// Rejects rectangles that cannot host a plot.
    pub fn validate_plot_area(self) -> ChartResult<Self> {
        if !self.is_finite() || self.width <= 0.0 || self.height <= 0.0 {
            return Err(ChartError::InvalidPlotRect {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }
}

/// Join key between a hit-testable shape and the logical series data.
///
/// `point_index` indexes the owning series' value arrays as they were when
/// the point was plotted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub series_index: usize,
    pub point_index: usize,
    pub data_x: f64,
    pub data_y: f64,
}

impl DataPoint {
    #[must_use]
    pub const fn new(series_index: usize, point_index: usize, data_x: f64, data_y: f64) -> Self {
        Self {
            series_index,
            point_index,
            data_x,
            data_y,
        }
    }
}

/// NaN, infinities and missing values are all "invalid" for plotting.
#[must_use]
pub fn is_valid(value: f64) -> bool {
    value.is_finite()
}
