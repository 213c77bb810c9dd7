use kurbo::{Affine, BezPath, Point, Rect, Shape};

use crate::blend::composite_pixel;
use crate::config::BlendMode;
use crate::core::{Canvas, PixelBuffer, Rgba};
use crate::error::{SedimentaError, SedimentaResult};
use crate::phase::PhaseSample;
use crate::surface::{GradientStop, Surface, gradient_color};

/// CPU raster surface over straight RGBA8. Every primitive is composited
/// per pixel through the blend engine, so the active composite mode — custom
/// modes included — behaves identically for rects, gradients and blits.
///
/// Text is diagnostic-only and recorded as annotations instead of rasterized
/// glyphs.
#[derive(Clone, Debug)]
pub struct Pixmap {
    buffer: PixelBuffer,
    global_alpha: f64,
    composite: BlendMode,
    phase: PhaseSample,
    clip_stack: Vec<BezPath>,
    annotations: Vec<(String, Point)>,
}

impl Pixmap {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            buffer: PixelBuffer::blank(canvas.width, canvas.height),
            global_alpha: 1.0,
            composite: BlendMode::Normal,
            phase: PhaseSample::default(),
            clip_stack: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.buffer.pixel(x, y)
    }

    /// Diagnostic text recorded by [`Surface::draw_text`], oldest first.
    pub fn annotations(&self) -> &[(String, Point)] {
        &self.annotations
    }

    pub fn write_png(&self, path: impl AsRef<std::path::Path>) -> SedimentaResult<()> {
        let img = image::RgbaImage::from_raw(
            self.buffer.width(),
            self.buffer.height(),
            self.buffer.data().to_vec(),
        )
        .ok_or_else(|| SedimentaError::evaluation("pixmap buffer does not match dimensions"))?;
        img.save(path.as_ref())
            .map_err(|e| SedimentaError::evaluation(format!("png write failed: {e}")))
    }

    fn put(&mut self, x: i64, y: i64, color: Rgba) {
        let (w, h) = (
            i64::from(self.buffer.width()),
            i64::from(self.buffer.height()),
        );
        if x < 0 || y < 0 || x >= w || y >= h {
            return;
        }
        let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
        if !self.clip_stack.iter().all(|p| p.contains(center)) {
            return;
        }
        let dst = self
            .buffer
            .pixel(x as u32, y as u32)
            .unwrap_or([0, 0, 0, 0]);
        let out = composite_pixel(dst, color, self.composite, self.phase, self.global_alpha);
        self.buffer.set_pixel(x as u32, y as u32, out);
    }

    fn pixel_span(&self, rect: Rect) -> Option<(i64, i64, i64, i64)> {
        let rect = rect.abs();
        let x0 = rect.x0.floor() as i64;
        let y0 = rect.y0.floor() as i64;
        let x1 = rect.x1.ceil() as i64;
        let y1 = rect.y1.ceil() as i64;
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn fill_span(&mut self, rect: Rect, mut color_at: impl FnMut(f64, f64) -> Rgba) {
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let (cx, cy) = (x as f64 + 0.5, y as f64 + 0.5);
                self.put(x, y, color_at(cx, cy));
            }
        }
    }

    fn stamp(&mut self, center: Point, color: Rgba, line_width: f64) {
        let r = (line_width.max(1.0)) / 2.0;
        let rect = Rect::new(center.x - r, center.y - r, center.x + r, center.y + r);
        let Some((x0, y0, x1, y1)) = self.pixel_span(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x, y, color);
            }
        }
    }
}

impl Surface for Pixmap {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: self.buffer.width(),
            height: self.buffer.height(),
        }
    }

    fn clear(&mut self) {
        self.buffer.data_mut().fill(0);
        self.annotations.clear();
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_composite(&mut self, mode: BlendMode) {
        self.composite = mode;
    }

    fn set_phase(&mut self, phase: PhaseSample) {
        self.phase = phase;
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.fill_span(rect, |_, _| color);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64) {
        let rect = rect.abs();
        let w = line_width.max(1.0);
        self.fill_rect(Rect::new(rect.x0, rect.y0, rect.x1, rect.y0 + w), color);
        self.fill_rect(Rect::new(rect.x0, rect.y1 - w, rect.x1, rect.y1), color);
        self.fill_rect(Rect::new(rect.x0, rect.y0 + w, rect.x0 + w, rect.y1 - w), color);
        self.fill_rect(Rect::new(rect.x1 - w, rect.y0 + w, rect.x1, rect.y1 - w), color);
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64) {
        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let len = a.distance(b);
            let steps = (len * 2.0).ceil().max(1.0) as usize;
            for i in 0..=steps {
                let t = i as f64 / steps as f64;
                let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
                self.stamp(p, color, line_width);
            }
        }
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        let rect = Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        self.fill_span(rect, |cx, cy| {
            if center.distance(Point::new(cx, cy)) <= radius {
                color
            } else {
                Rgba::TRANSPARENT
            }
        });
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64) {
        let half = (line_width.max(1.0)) / 2.0;
        let outer = radius + half;
        let rect = Rect::new(
            center.x - outer,
            center.y - outer,
            center.x + outer,
            center.y + outer,
        );
        self.fill_span(rect, |cx, cy| {
            let d = center.distance(Point::new(cx, cy));
            if (d - radius).abs() <= half {
                color
            } else {
                Rgba::TRANSPARENT
            }
        });
    }

    fn fill_linear_gradient(&mut self, rect: Rect, from: Point, to: Point, stops: &[GradientStop]) {
        let axis = to - from;
        let len_sq = axis.hypot2().max(f64::MIN_POSITIVE);
        self.fill_span(rect, |cx, cy| {
            let t = ((Point::new(cx, cy) - from).dot(axis) / len_sq).clamp(0.0, 1.0);
            gradient_color(stops, t)
        });
    }

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop]) {
        if radius <= 0.0 {
            return;
        }
        let rect = Rect::new(
            center.x - radius,
            center.y - radius,
            center.x + radius,
            center.y + radius,
        );
        self.fill_span(rect, |cx, cy| {
            let d = center.distance(Point::new(cx, cy));
            if d > radius {
                Rgba::TRANSPARENT
            } else {
                gradient_color(stops, d / radius)
            }
        });
    }

    fn blit(&mut self, src: &PixelBuffer, src_rect: Rect, dst_rect: Rect) -> SedimentaResult<()> {
        self.blit_rotated(src, src_rect, dst_rect, 0.0)
    }

    fn blit_rotated(
        &mut self,
        src: &PixelBuffer,
        src_rect: Rect,
        dst_rect: Rect,
        rotation_rad: f64,
    ) -> SedimentaResult<()> {
        let src_rect = src_rect.abs();
        let dst_rect = dst_rect.abs();
        if src_rect.width() <= 0.0 || src_rect.height() <= 0.0 {
            return Err(SedimentaError::evaluation("blit source rect is empty"));
        }
        if src_rect.x1 > f64::from(src.width()) || src_rect.y1 > f64::from(src.height()) {
            return Err(SedimentaError::evaluation(
                "blit source rect exceeds source buffer",
            ));
        }
        if dst_rect.width() <= 0.0 || dst_rect.height() <= 0.0 {
            return Ok(());
        }

        let center = dst_rect.center();
        let rotate = Affine::translate(center.to_vec2())
            * Affine::rotate(rotation_rad)
            * Affine::translate(-center.to_vec2());
        let inverse = rotate.inverse();

        // Walk the bounding box of the rotated destination and inverse-map
        // each pixel back into the source.
        let bounds = rotate.transform_rect_bbox(dst_rect);
        let Some((x0, y0, x1, y1)) = self.pixel_span(bounds) else {
            return Ok(());
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let dst_pt = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let u = (dst_pt.x - dst_rect.x0) / dst_rect.width();
                let v = (dst_pt.y - dst_rect.y0) / dst_rect.height();
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let sx = (src_rect.x0 + u * src_rect.width()).floor() as i64;
                let sy = (src_rect.y0 + v * src_rect.height()).floor() as i64;
                if sx < 0 || sy < 0 {
                    continue;
                }
                let Some(px) = src.pixel(sx as u32, sy as u32) else {
                    continue;
                };
                self.put(x, y, Rgba::from_rgba8(px));
            }
        }
        Ok(())
    }

    fn push_clip(&mut self, path: &BezPath) {
        self.clip_stack.push(path.clone());
    }

    fn pop_clip(&mut self) {
        self.clip_stack.pop();
    }

    fn draw_text(&mut self, text: &str, at: Point, _color: Rgba) {
        tracing::trace!(text, x = at.x, y = at.y, "surface annotation");
        self.annotations.push((text.to_string(), at));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixmap(w: u32, h: u32) -> Pixmap {
        Pixmap::new(Canvas {
            width: w,
            height: h,
        })
    }

    #[test]
    fn fill_rect_writes_opaque_pixels() {
        let mut pm = pixmap(4, 4);
        pm.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Rgba::opaque(255.0, 0.0, 0.0));
        assert_eq!(pm.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(pm.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn global_alpha_scales_coverage() {
        let mut pm = pixmap(1, 1);
        pm.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgba::opaque(0.0, 0.0, 0.0));
        pm.set_global_alpha(0.5);
        pm.fill_rect(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rgba::opaque(255.0, 255.0, 255.0),
        );
        let px = pm.pixel(0, 0).unwrap();
        assert!((i32::from(px[0]) - 128).abs() <= 1);
    }

    #[test]
    fn multiply_composite_darkens() {
        let mut pm = pixmap(1, 1);
        pm.fill_rect(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rgba::opaque(100.0, 100.0, 100.0),
        );
        pm.set_composite(BlendMode::Multiply);
        pm.fill_rect(
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rgba::opaque(200.0, 200.0, 200.0),
        );
        let px = pm.pixel(0, 0).unwrap();
        // 100*200/255 ≈ 78.4
        assert!((i32::from(px[0]) - 78).abs() <= 1);
    }

    #[test]
    fn clip_confines_fills() {
        let mut pm = pixmap(4, 4);
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((2.0, 0.0));
        path.line_to((2.0, 4.0));
        path.line_to((0.0, 4.0));
        path.close_path();

        pm.push_clip(&path);
        pm.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Rgba::opaque(0.0, 255.0, 0.0));
        pm.pop_clip();

        assert_eq!(pm.pixel(1, 1), Some([0, 255, 0, 255]));
        assert_eq!(pm.pixel(3, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn blit_scales_source_into_destination() {
        let src = PixelBuffer::solid(2, 2, Rgba::opaque(0.0, 0.0, 255.0));
        let mut pm = pixmap(8, 8);
        pm.blit(
            &src,
            Rect::new(0.0, 0.0, 2.0, 2.0),
            Rect::new(0.0, 0.0, 8.0, 8.0),
        )
        .unwrap();
        assert_eq!(pm.pixel(0, 0), Some([0, 0, 255, 255]));
        assert_eq!(pm.pixel(7, 7), Some([0, 0, 255, 255]));
    }

    #[test]
    fn blit_rejects_out_of_bounds_source_rect() {
        let src = PixelBuffer::solid(2, 2, Rgba::opaque(1.0, 2.0, 3.0));
        let mut pm = pixmap(4, 4);
        let err = pm.blit(
            &src,
            Rect::new(0.0, 0.0, 3.0, 3.0),
            Rect::new(0.0, 0.0, 4.0, 4.0),
        );
        assert!(err.is_err());
    }

    #[test]
    fn rotated_blit_stays_within_expected_area() {
        let src = PixelBuffer::solid(4, 4, Rgba::opaque(255.0, 255.0, 255.0));
        let mut pm = pixmap(16, 16);
        pm.blit_rotated(
            &src,
            Rect::new(0.0, 0.0, 4.0, 4.0),
            Rect::new(6.0, 6.0, 10.0, 10.0),
            0.3,
        )
        .unwrap();
        // Center pixel covered, far corner untouched.
        assert_eq!(pm.pixel(8, 8).map(|p| p[0]), Some(255));
        assert_eq!(pm.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn draw_text_records_annotations_only() {
        let mut pm = pixmap(4, 4);
        pm.draw_text("T-0", Point::new(1.0, 1.0), Rgba::opaque(255.0, 255.0, 255.0));
        assert_eq!(pm.annotations().len(), 1);
        assert_eq!(pm.annotations()[0].0, "T-0");
        // Pixels untouched.
        assert_eq!(pm.pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn radial_gradient_fades_outward() {
        let mut pm = pixmap(11, 11);
        let stops = [
            GradientStop::new(0.0, Rgba::new(255.0, 0.0, 0.0, 0.9)),
            GradientStop::new(1.0, Rgba::new(255.0, 0.0, 0.0, 0.0)),
        ];
        pm.fill_radial_gradient(Point::new(5.5, 5.5), 5.0, &stops);
        let center = pm.pixel(5, 5).unwrap();
        let edge = pm.pixel(1, 5).unwrap();
        assert!(center[3] > edge[3]);
    }
}
