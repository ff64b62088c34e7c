//! Rasterizes face shapes into a pixel buffer.

use tiny_skia::{
    FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PremultipliedColorU8,
    Transform,
};

use crate::face::{FACE_SIZE, Point, Shape, Stroke};
use crate::palette::Rgb;

/// Owns the backing pixmap; reused across frames.
pub struct Renderer {
    pixmap: Pixmap,
}

impl Renderer {
    /// `None` if either dimension is zero.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Pixmap::new(width, height).map(|pixmap| Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reallocate for a new size. Zero sizes keep the current buffer.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width() && height == self.height() {
            return;
        }
        if let Some(pixmap) = Pixmap::new(width, height) {
            self.pixmap = pixmap;
        }
    }

    /// Clear and draw `shapes`, scaled uniformly and centred in the buffer.
    pub fn render(&mut self, shapes: &[Shape]) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        let transform = self.fit_transform();

        for shape in shapes {
            match shape {
                Shape::Circle {
                    center,
                    radius,
                    fill,
                    outline,
                } => {
                    let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) else {
                        continue;
                    };
                    self.pixmap.fill_path(
                        &path,
                        &paint(*fill),
                        FillRule::Winding,
                        transform,
                        None,
                    );
                    if let Some(outline) = outline {
                        self.stroke(&path, outline, transform);
                    }
                }
                Shape::Polyline { points, stroke } => {
                    if let Some(path) = polyline(points) {
                        self.stroke(&path, stroke, transform);
                    }
                }
            }
        }
    }

    pub fn pixels(&self) -> &[PremultipliedColorU8] {
        self.pixmap.pixels()
    }

    /// Copy into a `0xAARRGGBB` buffer such as a softbuffer surface.
    ///
    /// Colours stay premultiplied. Copies as many pixels as both sides hold.
    pub fn copy_to(&self, dst: &mut [u32]) {
        for (out, px) in dst.iter_mut().zip(self.pixmap.pixels()) {
            *out = u32::from(px.alpha()) << 24
                | u32::from(px.red()) << 16
                | u32::from(px.green()) << 8
                | u32::from(px.blue());
        }
    }

    fn stroke(&mut self, path: &Path, stroke: &Stroke, transform: Transform) {
        let style = tiny_skia::Stroke {
            width: stroke.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        self.pixmap
            .stroke_path(path, &paint(stroke.color), &style, transform, None);
    }

    fn fit_transform(&self) -> Transform {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let scale = w.min(h) / FACE_SIZE;
        let dx = (w - FACE_SIZE * scale) / 2.0;
        let dy = (h - FACE_SIZE * scale) / 2.0;
        Transform::from_scale(scale, scale).post_translate(dx, dy)
    }
}

fn paint(color: Rgb) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.0, color.1, color.2, 255);
    paint.anti_alias = true;
    paint
}

fn polyline(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    pb.finish()
}
