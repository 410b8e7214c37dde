mod primitives;
mod recording;

pub use primitives::{Color, Palette, Pen};
pub use recording::{DrawCommand, DrawKind, RecordingEngine};

use crate::core::{Point, Rect};

/// Drawing surface consumed by plotters.
///
/// Pen state is stateful: plotters set `fill`/`stroke`/`stroke_width` once
/// and then issue several draw calls, each of which uses the pen as it is
/// at call time.
pub trait RenderEngine {
    fn pen(&self) -> Pen;
    fn set_fill(&mut self, fill: Option<Color>);
    fn set_stroke(&mut self, stroke: Option<Color>);
    fn set_stroke_width(&mut self, width: f64);

    fn set_pen(&mut self, pen: Pen) {
        self.set_fill(pen.fill);
        self.set_stroke(pen.stroke);
        self.set_stroke_width(pen.stroke_width);
    }

    fn draw_rect(&mut self, rect: Rect);
    fn draw_line(&mut self, from: Point, to: Point);
    fn draw_lines(&mut self, points: &[Point]);
    fn draw_splines(&mut self, points: &[Point]);
    fn draw_polygon(&mut self, points: &[Point]);
    /// Angles are in radians, clockwise from the positive X axis.
    fn draw_pie_segment(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64);
    fn draw_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64);
    fn start_group(&mut self, class_name: Option<&str>, clip: Option<Rect>);
    fn end_group(&mut self);
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderEngine, CairoRenderStats};
