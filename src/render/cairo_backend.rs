use cairo::{Context, Format, ImageSurface};
use std::f64::consts::TAU;

use crate::core::{Point, Rect};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, Pen, RenderEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub shapes_drawn: usize,
    pub groups_opened: usize,
}

/// Cairo implementation of the stateful-pen render engine.
///
/// Works either on its own offscreen image surface (`new`) or on an external
/// context such as a GTK drawing callback (`for_context`). Cairo failures do
/// not interrupt plotting; the first one is kept and reported by `finish`.
#[derive(Debug)]
pub struct CairoRenderEngine {
    context: Context,
    surface: Option<ImageSurface>,
    pen: Pen,
    stats: CairoRenderStats,
    first_error: Option<ChartError>,
}

impl CairoRenderEngine {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        let context = Context::new(&surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        let mut engine = Self::for_context(context);
        engine.surface = Some(surface);
        Ok(engine)
    }

    #[must_use]
    pub fn for_context(context: Context) -> Self {
        Self {
            context,
            surface: None,
            pen: Pen::default(),
            stats: CairoRenderStats::default(),
            first_error: None,
        }
    }

    #[must_use]
    pub fn surface(&self) -> Option<&ImageSurface> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> CairoRenderStats {
        self.stats
    }

    /// Paints the whole target with `color`.
    pub fn clear(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        apply_color(&self.context, color);
        self.context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))
    }

    /// Returns the first backend failure observed while drawing.
    pub fn finish(&mut self) -> ChartResult<CairoRenderStats> {
        match self.first_error.take() {
            Some(err) => Err(err),
            None => Ok(self.stats),
        }
    }

    fn paint_current_path(&mut self, allow_fill: bool) {
        let context = &self.context;
        let mut result = Ok(());
        if let (true, Some(fill)) = (allow_fill, self.pen.fill) {
            apply_color(context, fill);
            result = context.fill_preserve();
        }
        if result.is_ok() {
            if let Some(stroke) = self.pen.stroke.filter(|_| self.pen.stroke_width > 0.0) {
                apply_color(context, stroke);
                context.set_line_width(self.pen.stroke_width);
                result = context.stroke_preserve();
            }
        }
        context.new_path();
        match result {
            Ok(()) => self.stats.shapes_drawn += 1,
            Err(err) => self.record_error("failed to paint path", err),
        }
    }

    fn record_error(&mut self, prefix: &str, err: cairo::Error) {
        if self.first_error.is_none() {
            self.first_error = Some(map_backend_error(prefix, err));
        }
    }

    fn append_polyline(&self, points: &[Point]) {
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            self.context.move_to(first.x, first.y);
        }
        for point in iter {
            self.context.line_to(point.x, point.y);
        }
    }
}

impl RenderEngine for CairoRenderEngine {
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
        self.context
            .rectangle(rect.left, rect.top, rect.width, rect.height);
        self.paint_current_path(true);
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.paint_current_path(false);
    }

    fn draw_lines(&mut self, points: &[Point]) {
        if points.len() < 2 {
            return;
        }
        self.append_polyline(points);
        self.paint_current_path(false);
    }

    fn draw_splines(&mut self, points: &[Point]) {
        // Points arrive pre-smoothed; a dense polyline reproduces the curve.
        self.draw_lines(points);
    }

    fn draw_polygon(&mut self, points: &[Point]) {
        if points.len() < 3 {
            return;
        }
        self.append_polyline(points);
        self.context.close_path();
        self.paint_current_path(true);
    }

    fn draw_pie_segment(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64) {
        self.context.move_to(center.x, center.y);
        self.context
            .arc(center.x, center.y, radius, start_angle, start_angle + sweep_angle);
        self.context.close_path();
        self.paint_current_path(true);
    }

    fn draw_ellipse(&mut self, center: Point, radius_x: f64, radius_y: f64) {
        if radius_x <= 0.0 || radius_y <= 0.0 {
            return;
        }
        self.context.save().ok();
        self.context.translate(center.x, center.y);
        self.context.scale(radius_x, radius_y);
        self.context.arc(0.0, 0.0, 1.0, 0.0, TAU);
        self.context.restore().ok();
        self.paint_current_path(true);
    }

    fn start_group(&mut self, _class_name: Option<&str>, clip: Option<Rect>) {
        if let Err(err) = self.context.save() {
            self.record_error("failed to open group", err);
            return;
        }
        if let Some(clip) = clip {
            self.context
                .rectangle(clip.left, clip.top, clip.width, clip.height);
            self.context.clip();
        }
        self.stats.groups_opened += 1;
    }

    fn end_group(&mut self) {
        if let Err(err) = self.context.restore() {
            self.record_error("failed to close group", err);
        }
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::Backend(format!("{prefix}: {err}"))
}
