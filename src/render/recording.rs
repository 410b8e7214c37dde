use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};

use super::{Color, Pen, RenderEngine};

/// One recorded primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    Rect(Rect),
    Line { from: Point, to: Point },
    Lines(Vec<Point>),
    Splines(Vec<Point>),
    Polygon(Vec<Point>),
    PieSegment {
        center: Point,
        radius: f64,
        start_angle: f64,
        sweep_angle: f64,
    },
    Ellipse {
        center: Point,
        radius_x: f64,
        radius_y: f64,
    },
    StartGroup {
        class_name: Option<String>,
        clip: Option<Rect>,
    },
    EndGroup,
}

/// A draw call together with the pen that was current when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub pen: Pen,
    pub kind: DrawKind,
}

/// Headless engine used by tests and hosts that post-process geometry.
///
/// It records every call; `validate` catches non-finite geometry that a
/// plotter should have filtered before drawing.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pen: Pen,
    commands: Vec<DrawCommand>,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.pen = Pen::default();
    }

    #[must_use]
    pub fn rects(&self) -> Vec<Rect> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd.kind {
                DrawKind::Rect(rect) => Some(rect),
                _ => None,
            })
            .collect()
    }

    /// Commands of the `Rect` kind paired with the fill that was active.
    #[must_use]
    pub fn filled_rects(&self) -> Vec<(Rect, Option<Color>)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd.kind {
                DrawKind::Rect(rect) => Some((rect, cmd.pen.fill)),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn polylines(&self) -> Vec<&[Point]> {
        self.commands
            .iter()
            .filter_map(|cmd| match &cmd.kind {
                DrawKind::Lines(points) | DrawKind::Splines(points) => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn polygons(&self) -> Vec<&[Point]> {
        self.commands
            .iter()
            .filter_map(|cmd| match &cmd.kind {
                DrawKind::Polygon(points) => Some(points.as_slice()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn ellipses(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd.kind {
                DrawKind::Ellipse { center, .. } => Some(center),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<(Point, Point)> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd.kind {
                DrawKind::Line { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn validate(&self) -> ChartResult<()> {
        let mut depth = 0_i64;
        for cmd in &self.commands {
            let finite = match &cmd.kind {
                DrawKind::Rect(rect) => rect.is_finite(),
                DrawKind::Line { from, to } => from.is_finite() && to.is_finite(),
                DrawKind::Lines(points) | DrawKind::Splines(points) | DrawKind::Polygon(points) => {
                    points.iter().all(|p| p.is_finite())
                }
                DrawKind::PieSegment {
                    center,
                    radius,
                    start_angle,
                    sweep_angle,
                } => {
                    center.is_finite()
                        && radius.is_finite()
                        && start_angle.is_finite()
                        && sweep_angle.is_finite()
                }
                DrawKind::Ellipse {
                    center,
                    radius_x,
                    radius_y,
                } => center.is_finite() && radius_x.is_finite() && radius_y.is_finite(),
                DrawKind::StartGroup { .. } => {
                    depth += 1;
                    true
                }
                DrawKind::EndGroup => {
                    depth -= 1;
                    depth >= 0
                }
            };
            if !finite {
                return Err(ChartError::InvalidData(format!(
                    "recorded draw command is not drawable: {:?}",
                    cmd.kind
                )));
            }
        }
        if depth != 0 {
            return Err(ChartError::InvalidData(
                "unbalanced start_group/end_group calls".to_owned(),
            ));
        }
        Ok(())
    }

    fn push(&mut self, kind: DrawKind) {
        self.commands.push(DrawCommand {
            pen: self.pen,
            kind,
        });
    }
}

impl RenderEngine for RecordingEngine {
    fn pen(&self) -> Pen {
        self.pen
    }

    fn set_fill(&mut self, fill: Option<Color>) {
        self.pen.fill = fill;
    }

    fn set_stroke(&mut self, stroke: Option<Color>) {
        self.pen.stroke = stroke;
    }

    fn set_stroke_width(&mut self, width: f64) {
        self.pen.stroke_width = width;
    }

    fn draw_rect(&mut self, rect: Rect) {
        self.push(DrawKind::Rect(rect));
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.push(DrawKind::Line { from, to });
    }

    fn draw_lines(&mut self, points: &[Point]) {
        self.push(DrawKind::Lines(points.to_vec()));
    }

    fn draw_splines(&mut self, points: &[Point]) {
        self.push(DrawKind::Splines(points.to_vec()));
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        self.push(DrawKind::Polygon(points.to_vec()));
    }

    fn draw_pie_segment(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64) {
        self.push(DrawKind::PieSegment {
            center,
            radius,
            start_angle,
            sweep_angle,
        });
    }

    fn draw_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64) {
        self.push(DrawKind::Ellipse {
            center,
            radius_x,
            radius_y,
        });
    }

    fn start_group(&mut self, class_name: Option<&str>, clip: Option<Rect>) {
        self.push(DrawKind::StartGroup {
            class_name: class_name.map(str::to_owned),
            clip,
        });
    }

    fn end_group(&mut self) {
        self.push(DrawKind::EndGroup);
    }
}
