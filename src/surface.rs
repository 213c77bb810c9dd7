use kurbo::{BezPath, Point, Rect};

use crate::config::BlendMode;
use crate::core::{Canvas, PixelBuffer, Rgba};
use crate::error::SedimentaResult;
use crate::phase::PhaseSample;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis, [0, 1].
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// 2D raster drawing target required by the renderer.
///
/// The crate ships a CPU implementation ([`crate::Pixmap`]); embedders can
/// implement this over any canvas-like API. Implementations composite every
/// primitive through the active blend operator — that is what carries the
/// custom blend modes (organic-flow, erosion-blend, wave-distort) all the way
/// into pixels.
pub trait Surface {
    fn canvas(&self) -> Canvas;

    /// Resets every pixel to transparent. Drawing state is left alone.
    fn clear(&mut self);

    fn set_global_alpha(&mut self, alpha: f64);

    fn set_composite(&mut self, mode: BlendMode);

    /// Phase snapshot consumed by the phase-driven blend modes. Backends
    /// without per-pixel compositing may ignore it.
    fn set_phase(&mut self, _phase: PhaseSample) {}

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn stroke_rect(&mut self, rect: Rect, color: Rgba, line_width: f64);

    fn stroke_polyline(&mut self, points: &[Point], color: Rgba, line_width: f64);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, line_width: f64) {
        self.stroke_polyline(&[from, to], color, line_width);
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);

    fn stroke_circle(&mut self, center: Point, radius: f64, color: Rgba, line_width: f64);

    fn fill_linear_gradient(&mut self, rect: Rect, from: Point, to: Point, stops: &[GradientStop]);

    fn fill_radial_gradient(&mut self, center: Point, radius: f64, stops: &[GradientStop]);

    /// Copies `src_rect` of `src` into `dst_rect`, scaling as needed.
    fn blit(&mut self, src: &PixelBuffer, src_rect: Rect, dst_rect: Rect) -> SedimentaResult<()>;

    /// Like [`Surface::blit`] but rotated by `rotation_rad` about the center
    /// of `dst_rect`.
    fn blit_rotated(
        &mut self,
        src: &PixelBuffer,
        src_rect: Rect,
        dst_rect: Rect,
        rotation_rad: f64,
    ) -> SedimentaResult<()>;

    /// Subsequent drawing is confined to `path` until the matching pop.
    fn push_clip(&mut self, path: &BezPath);

    fn pop_clip(&mut self);

    /// Diagnostic overlay text (stratigraphy labels and the like).
    fn draw_text(&mut self, text: &str, at: Point, color: Rgba);
}

/// Interpolated color at `t` along a stop list. Stops are assumed sorted by
/// offset; positions outside the covered range clamp to the nearest stop.
pub fn gradient_color(stops: &[GradientStop], t: f64) -> Rgba {
    let Some(first) = stops.first() else {
        return Rgba::TRANSPARENT;
    };
    let last = stops[stops.len() - 1];
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = (b.offset - a.offset).max(f64::MIN_POSITIVE);
            let k = (t - a.offset) / span;
            return Rgba::new(
                a.color.r + (b.color.r - a.color.r) * k,
                a.color.g + (b.color.g - a.color.g) * k,
                a.color.b + (b.color.b - a.color.b) * k,
                a.color.a + (b.color.a - a.color.a) * k,
            );
        }
    }
    last.color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_color_hits_endpoints_and_midpoint() {
        let stops = [
            GradientStop::new(0.0, Rgba::new(0.0, 0.0, 0.0, 0.0)),
            GradientStop::new(1.0, Rgba::new(255.0, 0.0, 0.0, 1.0)),
        ];
        assert_eq!(gradient_color(&stops, -0.5), stops[0].color);
        assert_eq!(gradient_color(&stops, 2.0), stops[1].color);
        let mid = gradient_color(&stops, 0.5);
        assert!((mid.r - 127.5).abs() < 1e-9);
        assert!((mid.a - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_stop_list_is_transparent() {
        assert_eq!(gradient_color(&[], 0.3), Rgba::TRANSPARENT);
    }
}
