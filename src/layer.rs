use crate::config::{BlendMode, LayeringMode};
use crate::core::{PixelBuffer, Rgba};

/// Compaction never shrinks a layer below this fraction of its height.
pub const COMPACTION_FLOOR: f64 = 0.1;
/// Per-tick drift added to `organic_variation`, wrapping into [0, 1).
pub const ORGANIC_DRIFT: f64 = 0.01;

/// One slit capture plus derived metadata. Created only by the capture step,
/// owned only by the store, destroyed only by oldest-first eviction.
#[derive(Clone, Debug)]
pub struct SedimentLayer {
    /// Raw slit image at capture time. Never mutated afterwards.
    pub pixels: PixelBuffer,
    /// Horizontal placement fraction at capture, [0, 100].
    pub position: f64,
    pub captured_at_ms: u64,
    /// Tick count since creation.
    pub age: u64,
    /// Derived once at creation, [0, 255].
    pub motion_intensity: f64,
    pub wave_displacement: f64,
    /// Drifts cyclically in [0, 1) as the layer ages.
    pub organic_variation: f64,
    /// Monotonically non-decreasing; raised toward a neighbor-derived floor
    /// on each tick, never lowered.
    pub erosion_factor: f64,
    /// Height multiplier in [COMPACTION_FLOOR, 1.0].
    pub compaction: f64,
    /// Display color resolved at creation.
    pub color: Rgba,
    // Render-parameter snapshot taken at capture time.
    pub layering_mode: LayeringMode,
    pub blend_mode: BlendMode,
    pub opacity: f64,
    pub spacing: f64,
    pub offset: f64,
    pub distortion: f64,
    pub blur: f64,
    /// Random stratum tag, 0..5.
    pub stratigraphy_type: u8,
    /// Alternating row parity at capture time.
    pub brick_row: u8,
    /// Random brick edge length, 10..30.
    pub brick_size: u32,
}

impl SedimentLayer {
    /// Rendered height after compaction, in pixels.
    pub fn rendered_height(&self) -> f64 {
        f64::from(self.pixels.height()) * self.compaction
    }

    pub(crate) fn tick(&mut self, compaction_rate: f64) {
        self.age += 1;
        if compaction_rate > 0.0 {
            self.compaction = (self.compaction - compaction_rate).max(COMPACTION_FLOOR);
        }
        self.organic_variation = (self.organic_variation + ORGANIC_DRIFT).rem_euclid(1.0);
    }

    pub(crate) fn erode_toward(&mut self, neighbor_motion: f64) {
        self.erosion_factor = self.erosion_factor.max((neighbor_motion / 255.0) * 0.05);
    }
}
