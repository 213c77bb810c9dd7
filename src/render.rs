use std::f64::consts::TAU;

use kurbo::{BezPath, Point, Rect};
use rand_core::RngCore;

use crate::blur;
use crate::color::{final_hue, hsv_to_rgb};
use crate::config::{BlendMode, HueShiftMode, LayeringMode, RenderConfig, ViewMode};
use crate::core::{Canvas, Rgba};
use crate::error::SedimentaResult;
use crate::layer::SedimentLayer;
use crate::layout::{self, BRICK_WEATHER_AGE, LayoutInput, Placement, band_height};
use crate::phase::{PhaseClock, PhaseSample};
use crate::store::LayerStore;
use crate::surface::{GradientStop, Surface};

/// Read-only consumer of the layer store: every entry point takes the store
/// by shared reference and draws onto a [`Surface`].
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    wave_amplitude: f64,
}

impl Renderer {
    pub fn new(wave_amplitude: f64) -> Self {
        Self { wave_amplitude }
    }

    /// Dispatches on the configured view mode.
    #[tracing::instrument(skip_all, fields(view = ?config.view_mode, layers = store.len()))]
    pub fn render(
        &self,
        store: &LayerStore,
        config: &RenderConfig,
        clock: &PhaseClock,
        now_ms: u64,
        rng: &mut dyn RngCore,
        surface: &mut dyn Surface,
    ) -> SedimentaResult<()> {
        match config.view_mode {
            ViewMode::Normal => self.render_layers(store, config, clock, now_ms, rng, surface, false),
            ViewMode::Wireframe => {
                self.render_layers(store, config, clock, now_ms, rng, surface, true)
            }
            ViewMode::Heatmap => self.render_heatmap(store, config, clock, now_ms, rng, surface),
            ViewMode::Sediment => self.render_sediment(store, config, clock, now_ms, rng, surface),
        }
    }

    /// Layered view. `wireframe` swaps the filled slit images for outlines
    /// plus motion-intensity ticks.
    #[allow(clippy::too_many_arguments)]
    pub fn render_layers(
        &self,
        store: &LayerStore,
        config: &RenderConfig,
        clock: &PhaseClock,
        now_ms: u64,
        rng: &mut dyn RngCore,
        surface: &mut dyn Surface,
        wireframe: bool,
    ) -> SedimentaResult<()> {
        let canvas = surface.canvas();
        let wave_phase = PhaseClock::render_wave_phase(now_ms);
        let phase = PhaseSample {
            tidal_cycle: clock.tidal_cycle,
            wave_phase,
        };

        begin_frame(surface, phase, canvas);
        if config.show_wave_pattern {
            draw_wave_background(surface, canvas, config.wave_energy, wave_phase);
        }
        if store.is_empty() {
            return Ok(());
        }

        match config.layering_mode {
            LayeringMode::Stratigraphy => {
                stratigraphy_backdrop(surface, canvas, "SEDIMENT STRATIGRAPHY");
            }
            LayeringMode::Brickwork => {
                // Faint masonry backdrop standing in for the full pattern fill.
                surface.set_global_alpha(0.5);
                surface.fill_rect(canvas_rect(canvas), Rgba::new(30.0, 30.0, 30.0, 0.9));
                surface.set_global_alpha(1.0);
            }
            _ => {}
        }

        let order = visible_tail(
            store.order_indices(config.layering_mode, rng),
            config.max_layers_display,
        );
        let input = LayoutInput {
            canvas,
            config,
            wave_phase,
            wave_amplitude: self.wave_amplitude,
        };
        let placements = layout::layout(&order, store.layers(), input);
        let newest = store.len() - 1;

        surface.set_composite(config.blend_mode);
        for (rank, p) in placements.iter().enumerate() {
            let layer = &store.layers()[p.layer];

            let mut alpha = layer.opacity;
            if layer.erosion_factor > 0.0 {
                alpha = (1.0 - layer.erosion_factor * 2.0).max(0.2);
            }
            surface.set_global_alpha(alpha);

            if wireframe {
                self.draw_wire_layer(surface, config, layer, p, rank, placements.len(), now_ms);
            } else {
                match config.layering_mode {
                    LayeringMode::Stratigraphy => {
                        draw_stratigraphy_band(surface, canvas, layer, p, rank, placements.len())?;
                    }
                    LayeringMode::Brickwork => {
                        self.draw_brick(surface, layer, p, rng)?;
                    }
                    _ => {
                        self.draw_slit(surface, config, layer, p, rank)?;
                    }
                }
            }

            if config.highlight_current && p.layer == newest {
                surface.set_global_alpha(1.0);
                surface.stroke_rect(
                    Rect::new(p.x - 2.0, p.y - 2.0, p.x + p.width + 2.0, p.y + p.height + 2.0),
                    Rgba::new(255.0, 0.0, 0.0, 0.8),
                    2.0,
                );
            }
        }

        end_frame(surface);
        Ok(())
    }

    /// Heatmap view: radial heat points with decay trails, no raw pixel use.
    pub fn render_heatmap(
        &self,
        store: &LayerStore,
        config: &RenderConfig,
        clock: &PhaseClock,
        now_ms: u64,
        rng: &mut dyn RngCore,
        surface: &mut dyn Surface,
    ) -> SedimentaResult<()> {
        let canvas = surface.canvas();
        let wave_phase = PhaseClock::render_wave_phase(now_ms);
        let phase = PhaseSample {
            tidal_cycle: clock.tidal_cycle,
            wave_phase,
        };

        begin_frame(surface, phase, canvas);
        if config.show_wave_pattern {
            draw_wave_background(surface, canvas, config.wave_energy, wave_phase);
        }
        if store.is_empty() {
            return Ok(());
        }
        if config.layering_mode == LayeringMode::Stratigraphy {
            stratigraphy_backdrop(surface, canvas, "HEAT STRATIGRAPHY");
        }

        let order = visible_tail(
            store.order_indices(config.layering_mode, rng),
            config.max_layers_display,
        );
        let count = order.len();

        surface.set_composite(config.blend_mode);
        for (rank, &index) in order.iter().enumerate() {
            let layer = &store.layers()[index];
            let intensity = layer.motion_intensity / 255.0;
            let x = brick_row_shift(
                self.scatter_x(layer, canvas, config, wave_phase),
                config,
                rank,
                canvas,
            );
            let hue = render_hue(config, layer, rank, count, now_ms);
            let hsv = config.hsv.normalized();
            let (r, g, b) = hsv_to_rgb(
                hue / 360.0,
                hsv.saturation / 100.0,
                (hsv.value / 100.0 + intensity * 0.5).min(1.0),
            );
            let heat = Rgba::new(r, g, b, 1.0);

            if config.layering_mode == LayeringMode::Stratigraphy {
                let band = band_height(config.layer_spacing);
                let y = canvas.height_f() - 30.0 - rank as f64 * band;
                if y < 0.0 || y > canvas.height_f() {
                    continue;
                }
                surface.fill_rect(
                    Rect::new(0.0, y, canvas.width_f(), y + band),
                    heat.with_alpha(0.7),
                );
                surface.fill_circle(
                    Point::new(x, y + band / 2.0),
                    3.0 + intensity * 5.0,
                    heat.with_alpha(0.7),
                );
                if rank % 10 == 0 || intensity > 0.5 {
                    surface.draw_text(
                        &format!("T-{rank}"),
                        Point::new(canvas.width_f() - 40.0, y + band - 1.0),
                        Rgba::new(255.0, 255.0, 255.0, 0.8),
                    );
                }
                if intensity > 0.3 {
                    surface.draw_text(
                        &format!("M:{}", (intensity * 100.0).floor()),
                        Point::new(40.0, y + band - 1.0),
                        Rgba::new(255.0, 200.0, 50.0, 0.8),
                    );
                }
                continue;
            }

            let y = self.scatter_y(config, layer, rank, count, canvas, wave_phase);

            let base_size = (f64::from(layer.pixels.width()) / 4.0).max(5.0);
            let size = base_size + intensity * base_size * 2.0;
            surface.fill_radial_gradient(
                Point::new(x, y),
                size,
                &[
                    GradientStop::new(0.0, heat.with_alpha(0.9)),
                    GradientStop::new(0.7, heat.with_alpha(0.5)),
                    GradientStop::new(1.0, heat.with_alpha(0.0)),
                ],
            );

            draw_heat_trail(surface, canvas, config, layer, heat, x, y, size, intensity);

            if config.highlight_current && rank + 1 == count {
                surface.stroke_circle(
                    Point::new(x, y),
                    size + 5.0,
                    Rgba::new(255.0, 255.0, 255.0, 0.8),
                    2.0,
                );
            }
        }

        end_frame(surface);
        draw_grid(surface, canvas, Rgba::new(255.0, 255.0, 255.0, 0.1), 0.5);
        Ok(())
    }

    /// Simplified sediment view: raw pixels where available, thin colored
    /// rectangles otherwise.
    pub fn render_sediment(
        &self,
        store: &LayerStore,
        config: &RenderConfig,
        clock: &PhaseClock,
        now_ms: u64,
        rng: &mut dyn RngCore,
        surface: &mut dyn Surface,
    ) -> SedimentaResult<()> {
        let canvas = surface.canvas();
        let wave_phase = PhaseClock::render_wave_phase(now_ms);
        let phase = PhaseSample {
            tidal_cycle: clock.tidal_cycle,
            wave_phase,
        };

        begin_frame(surface, phase, canvas);
        if config.show_wave_pattern {
            draw_wave_background(surface, canvas, config.wave_energy, wave_phase);
        }
        if store.is_empty() {
            return Ok(());
        }
        if config.layering_mode == LayeringMode::Stratigraphy {
            stratigraphy_backdrop(surface, canvas, "SEDIMENT STRATIGRAPHY");
        }

        let order = visible_tail(
            store.order_indices(config.layering_mode, rng),
            config.max_layers_display,
        );
        let count = order.len();

        surface.set_composite(config.blend_mode);
        for (rank, &index) in order.iter().enumerate() {
            let layer = &store.layers()[index];
            let x = brick_row_shift(
                self.scatter_x(layer, canvas, config, wave_phase),
                config,
                rank,
                canvas,
            );
            let hue = render_hue(config, layer, rank, count, now_ms);
            let color = crate::color::hsv_color(&config.hsv, hue);

            if config.layering_mode == LayeringMode::Stratigraphy {
                let band = band_height(config.layer_spacing);
                let y = canvas.height_f() - 30.0 - rank as f64 * band;
                if y < 0.0 || y > canvas.height_f() {
                    continue;
                }
                surface.fill_rect(Rect::new(0.0, y, canvas.width_f(), y + band), color);
                surface.fill_circle(Point::new(x, y + band / 2.0), 3.0, color);
                if rank % 10 == 0 {
                    surface.draw_text(
                        &format!("T-{rank}"),
                        Point::new(canvas.width_f() - 40.0, y + band - 1.0),
                        Rgba::new(255.0, 255.0, 255.0, 0.8),
                    );
                }
                continue;
            }

            let y = self.scatter_y(config, layer, rank, count, canvas, wave_phase);
            let w = f64::from(layer.pixels.width());
            let h = f64::from(layer.pixels.height());

            if !layer.pixels.is_empty() {
                surface.blit(
                    &layer.pixels,
                    Rect::new(0.0, 0.0, w, h),
                    Rect::new(x, y, x + w, y + h),
                )?;
            } else {
                surface.fill_rect(Rect::new(x, y, x + w.max(1.0), y + 1.0), color.with_alpha(0.8));
            }

            if config.highlight_current && rank + 1 == count {
                surface.stroke_circle(
                    Point::new(x + w / 2.0, y),
                    8.0,
                    Rgba::new(255.0, 255.0, 255.0, 0.8),
                    2.0,
                );
            }
        }

        end_frame(surface);
        Ok(())
    }

    fn draw_slit(
        &self,
        surface: &mut dyn Surface,
        config: &RenderConfig,
        layer: &SedimentLayer,
        p: &Placement,
        rank: usize,
    ) -> SedimentaResult<()> {
        let src_w = f64::from(layer.pixels.width());
        let src_h = f64::from(layer.pixels.height());
        if src_w <= 0.0 || src_h <= 0.0 {
            return Ok(());
        }
        let src_rect = Rect::new(0.0, 0.0, src_w, src_h);
        let dst_rect = Rect::new(p.x, p.y, p.x + p.width, p.y + p.height);

        let blurred;
        let pixels = if config.layer_blur > 0.0 {
            let radius = blur::radius_for_control(config.layer_blur);
            blurred =
                blur::gaussian_blur_rgba8(&layer.pixels, radius, blur::sigma_for_radius(radius))?;
            &blurred
        } else {
            &layer.pixels
        };

        if config.layer_distortion > 0.0 {
            let clip = distortion_path(p, rank, config.layer_distortion / 100.0);
            surface.push_clip(&clip);
            let result = surface.blit(pixels, src_rect, dst_rect);
            surface.pop_clip();
            result
        } else {
            surface.blit(pixels, src_rect, dst_rect)
        }
    }

    fn draw_brick(
        &self,
        surface: &mut dyn Surface,
        layer: &SedimentLayer,
        p: &Placement,
        rng: &mut dyn RngCore,
    ) -> SedimentaResult<()> {
        let src_w = f64::from(layer.pixels.width());
        let src_h = f64::from(layer.pixels.height());
        if src_w <= 0.0 || src_h <= 0.0 {
            return Ok(());
        }
        let dst_rect = Rect::new(p.x, p.y, p.x + p.width, p.y + p.height);

        surface.blit_rotated(
            &layer.pixels,
            Rect::new(0.0, 0.0, src_w, src_h),
            dst_rect,
            p.rotation,
        )?;

        // Mortar lines.
        surface.stroke_rect(dst_rect, Rgba::new(200.0, 200.0, 200.0, 0.5), 1.0);

        // Weathering on old bricks; decorative only.
        if layer.age > BRICK_WEATHER_AGE {
            let wear = Rgba::new(0.0, 0.0, 0.0, 0.1);
            let crack_from = Point::new(p.x + rand_unit(rng) * p.width / 3.0, p.y);
            let crack_to = Point::new(
                p.x + rand_unit(rng) * p.width,
                p.y + p.height - rand_unit(rng) * p.height / 3.0,
            );
            surface.stroke_line(crack_from, crack_to, wear, 0.5);
            for _ in 0..3 {
                let chip = Point::new(
                    p.x + rand_unit(rng) * p.width,
                    p.y + rand_unit(rng) * p.height,
                );
                surface.fill_circle(chip, 1.0 + rand_unit(rng) * 3.0, wear);
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_wire_layer(
        &self,
        surface: &mut dyn Surface,
        config: &RenderConfig,
        layer: &SedimentLayer,
        p: &Placement,
        rank: usize,
        count: usize,
        now_ms: u64,
    ) {
        let hue = render_hue(config, layer, rank, count, now_ms);
        let hsv = config.hsv.normalized();
        let (r, g, b) = hsv_to_rgb(hue / 360.0, hsv.saturation / 100.0, hsv.value / 100.0);
        let wire = Rgba::new(r, g, b, 0.8);

        surface.stroke_rect(Rect::new(p.x, p.y, p.x + p.width, p.y + p.height), wire, 1.0);

        // Motion intensity tick rising from the layer's top edge.
        let tick = layer.motion_intensity / 255.0 * 20.0;
        if tick > 0.0 {
            let mid = p.x + p.width / 2.0;
            surface.stroke_line(Point::new(mid, p.y), Point::new(mid, p.y - tick), wire, 1.0);
            surface.fill_circle(Point::new(mid, p.y - tick), 2.0, wire);
        }
    }

    /// Horizontal position used by the scatter-style views (heatmap,
    /// sediment): offset enters linearly and distortion as a positional sine
    /// rather than a clip path.
    fn scatter_x(
        &self,
        layer: &SedimentLayer,
        canvas: Canvas,
        config: &RenderConfig,
        wave_phase: f64,
    ) -> f64 {
        let pos = layer.position / 100.0;
        let mut x = (canvas.width_f() * pos).floor() + layer.wave_displacement;
        if config.show_wave_pattern {
            x += (wave_phase + pos * 10.0).sin()
                * self.wave_amplitude
                * (config.tidal_factor / 100.0)
                * (config.wave_energy / 100.0);
        }
        x += canvas.width_f() * (config.layer_offset / 100.0);
        x += (pos * TAU).sin() * (config.layer_distortion / 100.0) * 20.0;
        x
    }

    fn scatter_y(
        &self,
        config: &RenderConfig,
        layer: &SedimentLayer,
        rank: usize,
        count: usize,
        canvas: Canvas,
        wave_phase: f64,
    ) -> f64 {
        let height = canvas.height_f();
        let n = count.max(1) as f64;
        match config.layering_mode {
            LayeringMode::Stacked => height - (rank as f64 + 1.0) * (height / (n + 1.0)),
            LayeringMode::Overlap => (height - f64::from(layer.pixels.height())) / 2.0,
            LayeringMode::Wave => {
                let wave_pos = ((rank as f64 / n) * TAU + wave_phase).sin();
                height * (0.5 + wave_pos * 0.3)
            }
            LayeringMode::Brickwork => rank as f64 * (height / (n + 1.0)),
            _ => {
                let spacing = config.layer_spacing / 100.0;
                height - (rank as f64 + 1.0) * (height / (n + spacing * 10.0))
            }
        }
    }
}

fn begin_frame(surface: &mut dyn Surface, phase: PhaseSample, canvas: Canvas) {
    surface.set_phase(phase);
    surface.set_composite(BlendMode::Normal);
    surface.set_global_alpha(1.0);
    surface.clear();
    surface.fill_rect(canvas_rect(canvas), Rgba::new(0.0, 0.0, 0.0, 0.9));
}

fn end_frame(surface: &mut dyn Surface) {
    surface.set_global_alpha(1.0);
    surface.set_composite(BlendMode::Normal);
}

fn canvas_rect(canvas: Canvas) -> Rect {
    Rect::new(0.0, 0.0, canvas.width_f(), canvas.height_f())
}

/// Last `max_display` entries of an ordering (the newest end).
fn visible_tail(order: Vec<usize>, max_display: usize) -> Vec<usize> {
    let keep = max_display.max(1).min(order.len());
    order[order.len() - keep..].to_vec()
}

fn rand_unit(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u32() as f64) / (u32::MAX as f64)
}

/// Alternating-row offset for brickwork in the scatter views, wrapped to the
/// canvas width.
fn brick_row_shift(x: f64, config: &RenderConfig, rank: usize, canvas: Canvas) -> f64 {
    if config.layering_mode != LayeringMode::Brickwork {
        return x;
    }
    (x + (rank % 2) as f64 * (canvas.width_f() / 4.0)).rem_euclid(canvas.width_f())
}

fn render_hue(
    config: &RenderConfig,
    layer: &SedimentLayer,
    rank: usize,
    count: usize,
    now_ms: u64,
) -> f64 {
    match config.hsv.hue_shift_mode {
        HueShiftMode::Layer | HueShiftMode::Time => final_hue(
            &config.hsv,
            layer.motion_intensity,
            now_ms,
            Some((rank, count)),
        ),
        _ => config.hsv.normalized().base_hue,
    }
}

/// Sinusoidal clip region confining a distorted layer draw.
fn distortion_path(p: &Placement, rank: usize, amount: f64) -> BezPath {
    const POINTS: usize = 20;
    let mut path = BezPath::new();
    for i in 0..=POINTS {
        let x = p.x + (i as f64 / POINTS as f64) * p.width;
        let dy = (i as f64 * 0.5 + rank as f64).sin() * p.height * amount;
        let pt = (x, p.y + dy);
        if i == 0 {
            path.move_to(pt);
        } else {
            path.line_to(pt);
        }
    }
    path.line_to((p.x + p.width, p.y + p.height * (1.0 + amount)));
    path.line_to((p.x, p.y + p.height * (1.0 + amount)));
    path.close_path();
    path
}

fn draw_wave_background(
    surface: &mut dyn Surface,
    canvas: Canvas,
    wave_energy: f64,
    wave_phase: f64,
) {
    surface.fill_linear_gradient(
        canvas_rect(canvas),
        Point::new(0.0, 0.0),
        Point::new(0.0, canvas.height_f()),
        &[
            GradientStop::new(0.0, Rgba::new(0.0, 30.0, 60.0, 0.3)),
            GradientStop::new(1.0, Rgba::new(0.0, 10.0, 30.0, 0.3)),
        ],
    );

    let wave_count = 5 + (wave_energy / 20.0).floor() as usize;
    let amplitude = 5.0 + wave_energy / 10.0;
    let line = Rgba::new(100.0, 200.0, 255.0, 0.2);

    for i in 0..wave_count {
        let y_base = canvas.height_f() / (wave_count as f64 + 1.0) * (i as f64 + 1.0);
        let phase_offset = i as f64 * 0.2;
        let mut points = Vec::new();
        let mut x = 0.0;
        while x < canvas.width_f() {
            let y = y_base + (wave_phase + phase_offset + x * 0.01).sin() * amplitude;
            points.push(Point::new(x, y));
            x += 5.0;
        }
        surface.stroke_polyline(&points, line, 1.0);
    }
}

fn draw_grid(surface: &mut dyn Surface, canvas: Canvas, color: Rgba, line_width: f64) {
    let (w, h) = (canvas.width_f(), canvas.height_f());
    for i in 0..10 {
        let x = w / 10.0 * i as f64;
        surface.stroke_line(Point::new(x, 0.0), Point::new(x, h), color, line_width);
        let y = h / 10.0 * i as f64;
        surface.stroke_line(Point::new(0.0, y), Point::new(w, y), color, line_width);
    }
}

fn stratigraphy_backdrop(surface: &mut dyn Surface, canvas: Canvas, label: &str) {
    let (w, h) = (canvas.width_f(), canvas.height_f());
    draw_grid(surface, canvas, Rgba::new(255.0, 255.0, 255.0, 0.15), 0.5);
    surface.stroke_rect(
        Rect::new(10.0, 10.0, w - 10.0, h - 10.0),
        Rgba::new(255.0, 60.0, 30.0, 0.8),
        2.0,
    );
    surface.fill_rect(
        Rect::new(w / 2.0 - 50.0, h - 25.0, w / 2.0 + 50.0, h - 5.0),
        Rgba::new(255.0, 60.0, 30.0, 0.9),
    );
    surface.draw_text(
        label,
        Point::new(w / 2.0, h - 10.0),
        Rgba::new(255.0, 255.0, 255.0, 0.9),
    );
}

#[allow(clippy::too_many_arguments)]
fn draw_heat_trail(
    surface: &mut dyn Surface,
    canvas: Canvas,
    config: &RenderConfig,
    layer: &SedimentLayer,
    heat: Rgba,
    x: f64,
    y: f64,
    size: f64,
    intensity: f64,
) {
    let length = (f64::from(layer.pixels.width())
        + intensity * 150.0
        + config.layer_distortion * 2.0)
        .min(canvas.width_f() / 2.0);
    if length <= 0.0 {
        return;
    }
    let line_width = (size * 0.4).max(2.0);
    // Approximate the gradient stroke with fading segments.
    const SEGMENTS: usize = 8;
    for i in 0..SEGMENTS {
        let t0 = i as f64 / SEGMENTS as f64;
        let t1 = (i as f64 + 1.0) / SEGMENTS as f64;
        let alpha = 0.7 * (1.0 - t0);
        surface.stroke_line(
            Point::new((x - length * t0).max(0.0), y),
            Point::new((x - length * t1).max(0.0), y),
            heat.with_alpha(alpha),
            line_width,
        );
    }
}

fn draw_stratigraphy_band(
    surface: &mut dyn Surface,
    canvas: Canvas,
    layer: &SedimentLayer,
    p: &Placement,
    rank: usize,
    count: usize,
) -> SedimentaResult<()> {
    let src_w = f64::from(layer.pixels.width());
    let src_h = f64::from(layer.pixels.height());
    if src_w > 0.0 && src_h > 0.0 {
        surface.blit(
            &layer.pixels,
            Rect::new(0.0, 0.0, src_w, src_h),
            Rect::new(0.0, p.y, canvas.width_f(), p.y + p.height),
        )?;
    }

    // Side markers color-coded by stratum tag, age and motion; newer bands
    // read more opaque.
    let marker = Rgba::new(
        200.0 + f64::from(layer.stratigraphy_type) * 10.0,
        50.0 + (layer.age % 100) as f64,
        30.0 + layer.motion_intensity / 255.0 * 200.0,
        0.7 + (rank as f64 / count.max(1) as f64) * 0.3,
    );
    surface.fill_rect(Rect::new(0.0, p.y, 5.0, p.y + p.height), marker);
    surface.fill_rect(
        Rect::new(canvas.width_f() - 5.0, p.y, canvas.width_f(), p.y + p.height),
        marker,
    );

    // Sparse data points encoding the stratum tag.
    let spacing = canvas.width_f() / 10.0;
    for i in 0..10usize {
        if (i + layer.stratigraphy_type as usize) % 3 == 0 {
            let px = i as f64 * spacing;
            let ph = p.height * (0.5 + layer.motion_intensity / 255.0);
            surface.fill_rect(Rect::new(px, p.y, px + 2.0, p.y + ph), marker);
        }
    }

    if rank % 10 == 0 || layer.motion_intensity > 127.0 {
        surface.draw_text(
            &format!("T-{rank}"),
            Point::new(canvas.width_f() - 40.0, p.y + p.height - 1.0),
            Rgba::new(255.0, 255.0, 255.0, 0.8),
        );
    }
    Ok(())
}
