use crate::config::{HsvControls, HueShiftMode};
use crate::core::Rgba;

/// Alpha used for resolved layer colors, matching the legacy call sites.
pub const LAYER_COLOR_ALPHA: f64 = 0.7;

/// Sector-based HSV → RGB. `h`, `s`, `v` in [0, 1]; channels out in 0..=255.
pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 1.0);

    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0).round(), (g * 255.0).round(), (b * 255.0).round())
}

/// Final hue after applying the configured shift policy.
///
/// `layer_rank` is `(rank, visible_count)` and only meaningful for the
/// `layer` policy, which the render paths use; capture-time resolution passes
/// `None` and falls back to the base hue there.
pub fn final_hue(
    hsv: &HsvControls,
    intensity: f64,
    now_ms: u64,
    layer_rank: Option<(usize, usize)>,
) -> f64 {
    let hsv = hsv.normalized();
    let shifted = match hsv.hue_shift_mode {
        HueShiftMode::Fixed => hsv.base_hue,
        HueShiftMode::Position => hsv.base_hue + (intensity / 255.0) * hsv.hue_shift,
        HueShiftMode::Intensity => hsv.base_hue + (intensity / 255.0).min(1.0) * hsv.hue_shift,
        HueShiftMode::Time => {
            let t = (now_ms % 10_000) as f64 / 10_000.0;
            hsv.base_hue + t * hsv.hue_shift
        }
        HueShiftMode::Layer => match layer_rank {
            Some((rank, count)) if count > 0 => {
                hsv.base_hue + (rank as f64 / count as f64) * hsv.hue_shift
            }
            _ => hsv.base_hue,
        },
    };
    shifted.rem_euclid(360.0)
}

/// Translucent layer color from HSV controls and a resolved hue.
pub fn hsv_color(hsv: &HsvControls, hue_deg: f64) -> Rgba {
    let hsv = hsv.normalized();
    let (r, g, b) = hsv_to_rgb(hue_deg / 360.0, hsv.saturation / 100.0, hsv.value / 100.0);
    Rgba::new(r, g, b, LAYER_COLOR_ALPHA)
}

/// Inputs for capture-time color resolution.
#[derive(Clone, Copy, Debug)]
pub struct CaptureColorInput {
    pub intensity: f64,
    pub tidal_factor: f64,
    pub wave_energy: f64,
    pub color_shift: f64,
    pub tidal_cycle: f64,
    pub timestamp_ms: u64,
}

/// Resolves the display color stored on a new layer. With HSV controls
/// configured the HSV path runs; otherwise the legacy intensity-driven RGB
/// path with sinusoidal modulation at three phase offsets. Deterministic for
/// identical inputs.
pub fn resolve_capture_color(input: CaptureColorInput, hsv: Option<&HsvControls>) -> Rgba {
    if let Some(hsv) = hsv {
        let hue = final_hue(hsv, input.intensity, input.timestamp_ms, None);
        return hsv_color(hsv, hue);
    }

    let color_phase = input.tidal_cycle * (input.color_shift / 100.0);
    let r = input.intensity * 0.7 + color_phase.sin() * 50.0;
    let g = input.intensity * 0.5
        + (input.tidal_factor / 100.0) * 50.0
        + (color_phase + 2.1).sin() * 50.0;
    let b = input.intensity * 0.3
        + (input.wave_energy / 100.0) * 100.0
        + (color_phase + 4.2).sin() * 50.0;
    Rgba::new(r.floor(), g.floor(), b.floor(), LAYER_COLOR_ALPHA)
}
