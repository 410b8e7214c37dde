use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::{Axis, Point, Rect};
use crate::error::{ChartError, ChartResult};

/// Maps logical (x, y) data pairs to screen space, swapping axis roles for
/// rotated charts: the X axis then supplies the vertical pixel coordinate.
#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    pub axis_x: &'a Axis,
    pub axis_y: &'a Axis,
    pub rotated: bool,
}

impl<'a> Projector<'a> {
    #[must_use]
    pub fn new(axis_x: &'a Axis, axis_y: &'a Axis, rotated: bool) -> Self {
        Self {
            axis_x,
            axis_y,
            rotated,
        }
    }

    #[must_use]
    pub fn point(&self, x: f64, y: f64) -> Point {
        let px = self.axis_x.convert(x);
        let py = self.axis_y.convert(y);
        if self.rotated {
            Point::new(py, px)
        } else {
            Point::new(px, py)
        }
    }

    /// Screen rectangle spanning `[x0, x1]` × `[y0, y1]` in data space.
    #[must_use]
    pub fn rect(&self, x0: f64, x1: f64, y0: f64, y1: f64) -> Rect {
        let a = self.point(x0, y0);
        let b = self.point(x1, y1);
        Rect::from_corners(a.x, a.y, b.x, b.y)
    }

    /// Pixel size of `delta` data units along the X dimension.
    #[must_use]
    pub fn x_length(&self, delta: f64) -> f64 {
        self.axis_x.length_in_pixels(delta)
    }

    /// Data value on the X dimension at the visible ends.
    #[must_use]
    pub fn x_bounds(&self) -> (f64, f64) {
        (self.axis_x.actual_min(), self.axis_x.actual_max())
    }

    #[must_use]
    pub fn y_bounds(&self) -> (f64, f64) {
        (self.axis_y.actual_min(), self.axis_y.actual_max())
    }

    /// Clamps a Y value into the visible Y range.
    #[must_use]
    pub fn clamp_y(&self, y: f64) -> f64 {
        let (min, max) = self.y_bounds();
        y.clamp(min.min(max), max.max(min))
    }
}

/// Width expressed in pixels, percent of a reference width, or a ratio.
///
/// Serialized as text: `"12px"`, `"40%"`, `"0.7"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum WidthSpec {
    Pixels(f64),
    Percent(f64),
    Ratio(f64),
}

impl WidthSpec {
    /// Resolves to data units given the reference width (in data units) and
    /// the pixel length of one data unit.
    #[must_use]
    pub fn to_data_units(self, reference: f64, pixels_per_unit: f64) -> f64 {
        let units = match self {
            Self::Pixels(px) if pixels_per_unit > 0.0 => px / pixels_per_unit,
            Self::Pixels(_) => 0.0,
            Self::Percent(pct) => reference * pct / 100.0,
            Self::Ratio(ratio) => reference * ratio,
        };
        if units.is_finite() { units.max(0.0) } else { 0.0 }
    }
}

impl fmt::Display for WidthSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(px) => write!(f, "{px}px"),
            Self::Percent(pct) => write!(f, "{pct}%"),
            Self::Ratio(ratio) => write!(f, "{ratio}"),
        }
    }
}

impl FromStr for WidthSpec {
    type Err = ChartError;

    fn from_str(raw: &str) -> ChartResult<Self> {
        let trimmed = raw.trim();
        let parse = |number: &str| -> ChartResult<f64> {
            match number.trim().parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
                _ => Err(ChartError::InvalidOption(format!("invalid width `{raw}`"))),
            }
        };
        if let Some(px) = trimmed.strip_suffix("px") {
            Ok(Self::Pixels(parse(px)?))
        } else if let Some(pct) = trimmed.strip_suffix('%') {
            Ok(Self::Percent(parse(pct)?))
        } else {
            Ok(Self::Ratio(parse(trimmed)?))
        }
    }
}

impl From<WidthSpec> for String {
    fn from(value: WidthSpec) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for WidthSpec {
    type Error = ChartError;

    fn try_from(value: String) -> ChartResult<Self> {
        value.parse()
    }
}

/// Tests a screen point against the plot rectangle with a half-pixel slack.
#[must_use]
pub fn inside_plot(plot_rect: Rect, point: Point) -> bool {
    point.is_finite()
        && point.x >= plot_rect.left - 0.5
        && point.x <= plot_rect.right() + 0.5
        && point.y >= plot_rect.top - 0.5
        && point.y <= plot_rect.bottom() + 0.5
}

/// Clips a rectangle to the plot area; `None` when nothing stays visible.
#[must_use]
pub fn clip_to_plot(plot_rect: Rect, rect: Rect) -> Option<Rect> {
    if !rect.is_finite() {
        return None;
    }
    let left = rect.left.max(plot_rect.left);
    let top = rect.top.max(plot_rect.top);
    let right = rect.right().min(plot_rect.right());
    let bottom = rect.bottom().min(plot_rect.bottom());
    (right >= left && bottom >= top).then(|| Rect::new(left, top, right - left, bottom - top))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_specs_parse_units() {
        assert_eq!("12px".parse::<WidthSpec>().expect("px"), WidthSpec::Pixels(12.0));
        assert_eq!("40%".parse::<WidthSpec>().expect("pct"), WidthSpec::Percent(40.0));
        assert_eq!("0.7".parse::<WidthSpec>().expect("ratio"), WidthSpec::Ratio(0.7));
        assert!("-3px".parse::<WidthSpec>().is_err());
        assert!("wide".parse::<WidthSpec>().is_err());
    }

    #[test]
    fn width_specs_resolve_to_data_units() {
        assert_eq!(WidthSpec::Pixels(20.0).to_data_units(1.0, 40.0), 0.5);
        assert_eq!(WidthSpec::Percent(50.0).to_data_units(2.0, 40.0), 1.0);
        assert_eq!(WidthSpec::Ratio(0.25).to_data_units(2.0, 40.0), 0.5);
        assert_eq!(WidthSpec::Pixels(20.0).to_data_units(1.0, 0.0), 0.0);
    }

    #[test]
    fn clip_drops_rects_outside_the_plot() {
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(clip_to_plot(plot, Rect::new(120.0, 0.0, 10.0, 10.0)).is_none());
        let clipped = clip_to_plot(plot, Rect::new(90.0, -10.0, 20.0, 20.0)).expect("clip");
        assert_eq!(clipped, Rect::new(90.0, 0.0, 10.0, 10.0));
    }
}
