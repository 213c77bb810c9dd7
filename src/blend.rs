use crate::config::BlendMode;
use crate::core::Rgba;
use crate::phase::PhaseSample;

/// Applies `mode` between a base (already-drawn) and top (incoming) color.
///
/// Pure: identical inputs always produce identical outputs. The two
/// phase-driven modes (`organic-flow`, `wave-distort`) read their phases from
/// the explicit `phase` argument. Channel outputs clamp to [0, 255], alpha to
/// [0, 1].
///
/// The `hue`/`saturation`/`color`/`luminosity` modes are pass-through to the
/// top color rather than true HSL-component blends; that matches the observed
/// behavior this engine reproduces.
pub fn blend(base: Rgba, top: Rgba, mode: BlendMode, phase: PhaseSample) -> Rgba {
    let (r1, g1, b1) = (base.r, base.g, base.b);
    let (r2, g2, b2) = (top.r, top.g, top.b);

    let (r, g, b) = match mode {
        BlendMode::Normal
        | BlendMode::Hue
        | BlendMode::Saturation
        | BlendMode::Color
        | BlendMode::Luminosity => (r2, g2, b2),

        BlendMode::Multiply => per_channel(base, top, |c1, c2| c1 * c2 / 255.0),
        BlendMode::Screen => {
            per_channel(base, top, |c1, c2| 255.0 - (255.0 - c1) * (255.0 - c2) / 255.0)
        }
        BlendMode::Overlay => per_channel(base, top, |c1, c2| {
            if c1 < 128.0 {
                2.0 * c1 * c2 / 255.0
            } else {
                255.0 - 2.0 * (255.0 - c1) * (255.0 - c2) / 255.0
            }
        }),
        BlendMode::Darken => per_channel(base, top, f64::min),
        BlendMode::Lighten => per_channel(base, top, f64::max),
        BlendMode::ColorDodge => per_channel(base, top, |c1, c2| {
            if c1 == 0.0 {
                0.0
            } else {
                (c2 * 255.0 / (255.0 - c1).max(f64::MIN_POSITIVE)).min(255.0)
            }
        }),
        BlendMode::ColorBurn => per_channel(base, top, |c1, c2| {
            if c1 >= 255.0 {
                255.0
            } else if c1 == 0.0 {
                0.0
            } else {
                (255.0 - (255.0 - c2) * 255.0 / c1).max(0.0)
            }
        }),
        BlendMode::HardLight => per_channel(base, top, |c1, c2| {
            if c2 < 128.0 {
                c1 * c2 / 128.0
            } else {
                255.0 - (255.0 - c1) * (255.0 - c2) / 128.0
            }
        }),
        BlendMode::SoftLight => per_channel(base, top, |c1, c2| {
            if c1 < 128.0 {
                c1 - c1 * (128.0 - c2) / 128.0
            } else {
                c1 + (c2 - 128.0) * (255.0 - c1) / 128.0
            }
        }),
        BlendMode::Difference => per_channel(base, top, |c1, c2| (c1 - c2).abs()),
        BlendMode::Exclusion => per_channel(base, top, |c1, c2| c1 + c2 - 2.0 * c1 * c2 / 255.0),

        BlendMode::OrganicFlow => {
            let factor = phase.tidal_cycle.sin() * 0.5 + 0.5;
            lerp_channels(base, top, factor)
        }
        BlendMode::ErosionBlend => {
            let factor = erosion_factor(top);
            lerp_channels(base, top, factor)
        }
        BlendMode::WaveDistort => {
            let factor = (phase.wave_phase + (r1 + g1 + b1) / 30.0).sin() * 0.5 + 0.5;
            lerp_channels(base, top, factor)
        }
    };

    let a = base.a + effective_source_alpha(top, mode) * (1.0 - base.a);
    Rgba::new(r, g, b, a)
}

/// Top-color brightness factor for erosion-blend, in [0, 1].
fn erosion_factor(top: Rgba) -> f64 {
    ((top.r + top.g + top.b) / (3.0 * 255.0) * 2.0).min(1.0)
}

/// Source alpha as it participates in the over-composite. Erosion-blend
/// scales its own alpha by the brightness factor; every other mode uses the
/// top alpha unchanged.
pub fn effective_source_alpha(top: Rgba, mode: BlendMode) -> f64 {
    match mode {
        BlendMode::ErosionBlend => (top.a * erosion_factor(top)).clamp(0.0, 1.0),
        _ => top.a.clamp(0.0, 1.0),
    }
}

/// Applies a blend result onto a destination RGBA8 pixel with
/// coverage-weighted mixing. This is how surfaces run the engine per pixel
/// for every draw primitive, custom modes included.
pub fn composite_pixel(
    dst: [u8; 4],
    src: Rgba,
    mode: BlendMode,
    phase: PhaseSample,
    global_alpha: f64,
) -> [u8; 4] {
    let base = Rgba::from_rgba8(dst);
    let src = src.with_alpha(src.a * global_alpha.clamp(0.0, 1.0));
    if src.a <= 0.0 {
        return dst;
    }

    let mixed = blend(base, src, mode, phase);
    let coverage = effective_source_alpha(src, mode);

    Rgba::new(
        base.r + (mixed.r - base.r) * coverage,
        base.g + (mixed.g - base.g) * coverage,
        base.b + (mixed.b - base.b) * coverage,
        mixed.a,
    )
    .to_rgba8()
}

fn per_channel(base: Rgba, top: Rgba, f: impl Fn(f64, f64) -> f64) -> (f64, f64, f64) {
    (f(base.r, top.r), f(base.g, top.g), f(base.b, top.b))
}

fn lerp_channels(base: Rgba, top: Rgba, t: f64) -> (f64, f64, f64) {
    (
        base.r + (top.r - base.r) * t,
        base.g + (top.g - base.g) * t,
        base.b + (top.b - base.b) * t,
    )
}
