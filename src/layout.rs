use std::f64::consts::TAU;

use crate::config::{LayeringMode, RenderConfig};
use crate::core::Canvas;
use crate::layer::SedimentLayer;

/// Brick-row tilt in radians; even rows lean one way, odd rows the other.
const BRICK_TILT: f64 = 0.05;
/// Bricks older than this many ticks grow crack/chip decorations.
pub const BRICK_WEATHER_AGE: u64 = 10;

/// One layer's computed placement. `layer` indexes into the store's layer
/// slice; `rotation` is nonzero only for brickwork.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub layer: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

/// Inputs shared by every layout strategy for one render pass.
#[derive(Clone, Copy, Debug)]
pub struct LayoutInput<'a> {
    pub canvas: Canvas,
    pub config: &'a RenderConfig,
    /// Render-side wave phase for the live wave term and the wave mode.
    pub wave_phase: f64,
    pub wave_amplitude: f64,
}

/// Computes placements for the ordered visible layers.
///
/// Returns one placement per layer except stratigraphy, which skips bands
/// that fall outside the canvas entirely. All coordinates are finite.
pub fn layout(order: &[usize], layers: &[SedimentLayer], input: LayoutInput<'_>) -> Vec<Placement> {
    let count = order.len();
    let height = input.canvas.height_f();
    let mut placements = Vec::with_capacity(count);

    for (rank, &index) in order.iter().enumerate() {
        let layer = &layers[index];
        let layer_height = layer.rendered_height();
        let layer_width = f64::from(layer.pixels.width());

        let placement = match input.config.layering_mode {
            LayeringMode::Stacked => Placement {
                layer: index,
                x: horizontal_position(rank, layer, input),
                y: height - (rank as f64 + 1.0) * (height / (count as f64 + 1.0)),
                width: layer_width,
                height: layer_height,
                rotation: 0.0,
            },
            LayeringMode::Overlap => Placement {
                layer: index,
                x: horizontal_position(rank, layer, input),
                y: (height - layer_height) / 2.0,
                width: layer_width,
                height: layer_height,
                rotation: 0.0,
            },
            LayeringMode::Wave => {
                let wave_pos =
                    ((rank as f64 / count.max(1) as f64) * TAU + input.wave_phase).sin();
                Placement {
                    layer: index,
                    x: horizontal_position(rank, layer, input),
                    y: (height - layer_height) * (0.5 + wave_pos * 0.3),
                    width: layer_width,
                    height: layer_height,
                    rotation: 0.0,
                }
            }
            LayeringMode::Stratigraphy => {
                let band = band_height(input.config.layer_spacing);
                let y = height - 30.0 - rank as f64 * band;
                if y < 0.0 || y > height {
                    // Band fell off the canvas: skip it outright.
                    continue;
                }
                Placement {
                    layer: index,
                    x: 0.0,
                    y,
                    width: input.canvas.width_f(),
                    height: band,
                    rotation: 0.0,
                }
            }
            LayeringMode::Brickwork => brick_placement(rank, index, layer, input.canvas, input.config),
            // Standard geometry; random/reverse/intensity only change the
            // ordering handed in.
            LayeringMode::Standard
            | LayeringMode::Random
            | LayeringMode::Reverse
            | LayeringMode::Intensity => Placement {
                layer: index,
                x: horizontal_position(rank, layer, input),
                y: height - layer_height,
                width: layer_width,
                height: layer_height,
                rotation: 0.0,
            },
        };
        placements.push(placement);
    }

    placements
}

/// Stratigraphy band height from the spacing control.
pub fn band_height(layer_spacing: f64) -> f64 {
    2.0 + layer_spacing / 5.0
}

/// Horizontal position for the non-grid modes: normalized capture position,
/// plus creation-time wave displacement, plus the live wave term when the
/// wave background is on, plus the sinusoidal offset term when set.
pub fn horizontal_position(rank: usize, layer: &SedimentLayer, input: LayoutInput<'_>) -> f64 {
    let width = input.canvas.width_f();
    let mut x = (width * layer.position).floor() / 100.0 + layer.wave_displacement;

    if input.config.show_wave_pattern {
        x += (input.wave_phase + layer.position / 10.0).sin()
            * input.wave_amplitude
            * (input.config.tidal_factor / 100.0)
            * (input.config.wave_energy / 100.0);
    }

    if input.config.layer_offset > 0.0 {
        let offset_amount = (input.config.layer_offset / 100.0) * (width * 0.4);
        x += (rank as f64 * 0.1).sin() * offset_amount;
    }

    x
}

fn brick_placement(
    rank: usize,
    index: usize,
    layer: &SedimentLayer,
    canvas: Canvas,
    config: &RenderConfig,
) -> Placement {
    let grid = 20.0 + config.layer_spacing * 2.0;
    let cols = ((canvas.width_f() / grid).floor() as usize).max(1);
    let cell = rank / 5;
    let grid_x = cell % cols;
    let grid_y = cell / cols;
    // Odd rows shift half a cell, masonry style.
    let row_offset = if grid_y % 2 == 1 { grid / 2.0 } else { 0.0 };

    Placement {
        layer: index,
        x: grid_x as f64 * grid + row_offset,
        y: grid_y as f64 * grid,
        width: grid - 2.0,
        height: grid - 2.0,
        rotation: if layer.brick_row % 2 == 0 {
            -BRICK_TILT
        } else {
            BRICK_TILT
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlendMode;
    use crate::core::{PixelBuffer, Rgba};

    fn layer(position: f64) -> SedimentLayer {
        SedimentLayer {
            pixels: PixelBuffer::blank(4, 40),
            position,
            captured_at_ms: 0,
            age: 0,
            motion_intensity: 100.0,
            wave_displacement: 1.5,
            organic_variation: 0.0,
            erosion_factor: 0.0,
            compaction: 1.0,
            color: Rgba::opaque(0.0, 0.0, 0.0),
            layering_mode: LayeringMode::Standard,
            blend_mode: BlendMode::Normal,
            opacity: 0.8,
            spacing: 0.0,
            offset: 0.0,
            distortion: 0.0,
            blur: 0.0,
            stratigraphy_type: 1,
            brick_row: 1,
            brick_size: 15,
        }
    }

    fn fixture(mode: LayeringMode) -> (Vec<SedimentLayer>, RenderConfig) {
        let layers: Vec<SedimentLayer> = (0..8).map(|i| layer(f64::from(i) * 12.0)).collect();
        let config = RenderConfig {
            layering_mode: mode,
            ..RenderConfig::default()
        };
        (layers, config)
    }

    #[test]
    fn every_mode_yields_finite_placements_for_all_layers() {
        for mode in LayeringMode::ALL {
            let (layers, config) = fixture(mode);
            let order: Vec<usize> = (0..layers.len()).collect();
            let placements = layout(
                &order,
                &layers,
                LayoutInput {
                    canvas: Canvas::new(320, 240).unwrap(),
                    config: &config,
                    wave_phase: 1.0,
                    wave_amplitude: 5.0,
                },
            );
            if mode == LayeringMode::Stratigraphy {
                assert!(placements.len() <= layers.len());
                assert!(!placements.is_empty());
            } else {
                assert_eq!(placements.len(), layers.len(), "{mode:?}");
            }
            for p in &placements {
                assert!(p.x.is_finite() && p.y.is_finite(), "{mode:?}");
                assert!(p.width.is_finite() && p.height.is_finite(), "{mode:?}");
            }
        }
    }

    #[test]
    fn standard_grows_from_bottom() {
        let (layers, config) = fixture(LayeringMode::Standard);
        let order = vec![0];
        let placements = layout(
            &order,
            &layers,
            LayoutInput {
                canvas: Canvas::new(100, 200).unwrap(),
                config: &config,
                wave_phase: 0.0,
                wave_amplitude: 5.0,
            },
        );
        assert_eq!(placements[0].y, 200.0 - 40.0);
    }

    #[test]
    fn overlap_centers_vertically() {
        let (layers, config) = fixture(LayeringMode::Overlap);
        let placements = layout(
            &[0],
            &layers,
            LayoutInput {
                canvas: Canvas::new(100, 200).unwrap(),
                config: &config,
                wave_phase: 0.0,
                wave_amplitude: 5.0,
            },
        );
        assert_eq!(placements[0].y, (200.0 - 40.0) / 2.0);
    }

    #[test]
    fn stratigraphy_skips_out_of_canvas_bands() {
        let (layers, config) = fixture(LayeringMode::Stratigraphy);
        // 40px canvas, bands start at y = 10 and step 2px up: only a handful
        // fit before y goes negative.
        let order: Vec<usize> = (0..layers.len()).collect();
        let placements = layout(
            &order,
            &layers,
            LayoutInput {
                canvas: Canvas::new(100, 40).unwrap(),
                config: &config,
                wave_phase: 0.0,
                wave_amplitude: 5.0,
            },
        );
        assert!(placements.len() < layers.len());
        for p in &placements {
            assert!(p.y >= 0.0 && p.y <= 40.0);
        }
    }

    #[test]
    fn brickwork_advances_one_cell_every_five_layers() {
        let (layers, config) = fixture(LayeringMode::Brickwork);
        let order: Vec<usize> = (0..layers.len()).collect();
        let placements = layout(
            &order,
            &layers,
            LayoutInput {
                canvas: Canvas::new(320, 240).unwrap(),
                config: &config,
                wave_phase: 0.0,
                wave_amplitude: 5.0,
            },
        );
        // Ranks 0..4 share a cell, rank 5 moves to the next one.
        assert_eq!(placements[0].x, placements[4].x);
        assert_eq!(placements[0].y, placements[4].y);
        assert_ne!(placements[0].x, placements[5].x);
        // Odd brick rows tilt positive.
        assert_eq!(placements[0].rotation, BRICK_TILT);
    }

    #[test]
    fn offset_control_bends_horizontal_positions() {
        let (layers, mut config) = fixture(LayeringMode::Standard);
        config.layer_offset = 50.0;
        let input = LayoutInput {
            canvas: Canvas::new(320, 240).unwrap(),
            config: &config,
            wave_phase: 0.0,
            wave_amplitude: 5.0,
        };
        let base = horizontal_position(0, &layers[3], input);
        let bent = horizontal_position(7, &layers[3], input);
        assert_ne!(base, bent);
    }
}
