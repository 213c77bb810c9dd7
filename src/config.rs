use crate::error::{SedimentaError, SedimentaResult};

/// Vertical ordering/positioning strategy used when rendering layers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayeringMode {
    #[default]
    Standard,
    Stacked,
    Overlap,
    Wave,
    Random,
    Reverse,
    Intensity,
    Stratigraphy,
    Brickwork,
}

impl LayeringMode {
    pub const ALL: [LayeringMode; 9] = [
        LayeringMode::Standard,
        LayeringMode::Stacked,
        LayeringMode::Overlap,
        LayeringMode::Wave,
        LayeringMode::Random,
        LayeringMode::Reverse,
        LayeringMode::Intensity,
        LayeringMode::Stratigraphy,
        LayeringMode::Brickwork,
    ];

    /// Lenient parse: unknown names fall back to `Standard`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "stacked" => Self::Stacked,
            "overlap" => Self::Overlap,
            "wave" => Self::Wave,
            "random" => Self::Random,
            "reverse" => Self::Reverse,
            "intensity" => Self::Intensity,
            "stratigraphy" => Self::Stratigraphy,
            "brickwork" => Self::Brickwork,
            _ => Self::Standard,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Stacked => "stacked",
            Self::Overlap => "overlap",
            Self::Wave => "wave",
            Self::Random => "random",
            Self::Reverse => "reverse",
            Self::Intensity => "intensity",
            Self::Stratigraphy => "stratigraphy",
            Self::Brickwork => "brickwork",
        }
    }
}

/// Pixel compositing operation applied when drawing a layer over existing content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    OrganicFlow,
    ErosionBlend,
    WaveDistort,
}

impl BlendMode {
    pub const ALL: [BlendMode; 19] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
        BlendMode::ColorDodge,
        BlendMode::ColorBurn,
        BlendMode::HardLight,
        BlendMode::SoftLight,
        BlendMode::Difference,
        BlendMode::Exclusion,
        BlendMode::Hue,
        BlendMode::Saturation,
        BlendMode::Color,
        BlendMode::Luminosity,
        BlendMode::OrganicFlow,
        BlendMode::ErosionBlend,
        BlendMode::WaveDistort,
    ];

    /// Lenient parse: unknown names fall back to `Normal`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color-dodge" => Self::ColorDodge,
            "color-burn" => Self::ColorBurn,
            "hard-light" => Self::HardLight,
            "soft-light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            "hue" => Self::Hue,
            "saturation" => Self::Saturation,
            "color" => Self::Color,
            "luminosity" => Self::Luminosity,
            "organic-flow" => Self::OrganicFlow,
            "erosion-blend" => Self::ErosionBlend,
            "wave-distort" => Self::WaveDistort,
            _ => Self::Normal,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
            Self::OrganicFlow => "organic-flow",
            Self::ErosionBlend => "erosion-blend",
            Self::WaveDistort => "wave-distort",
        }
    }
}

/// Policy for deriving the final hue from the base hue + hue shift.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HueShiftMode {
    #[default]
    Fixed,
    Position,
    Intensity,
    Time,
    Layer,
}

impl HueShiftMode {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "position" => Self::Position,
            "intensity" => Self::Intensity,
            "time" => Self::Time,
            "layer" => Self::Layer,
            _ => Self::Fixed,
        }
    }
}

/// Top-level render entry point selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    #[default]
    Normal,
    Wireframe,
    Heatmap,
    Sediment,
}

impl ViewMode {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "wireframe" => Self::Wireframe,
            "heatmap" => Self::Heatmap,
            "sediment" => Self::Sediment,
            _ => Self::Normal,
        }
    }
}

/// HSV color controls. Presence on [`EngineOptions`] selects the HSV color
/// path at capture time; the render paths always carry a set of these.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HsvControls {
    /// Base hue in degrees, [0, 360).
    pub base_hue: f64,
    /// Saturation percentage, [0, 100].
    pub saturation: f64,
    /// Value percentage, [0, 100].
    pub value: f64,
    /// Hue shift amount in degrees, [0, 360).
    pub hue_shift: f64,
    pub hue_shift_mode: HueShiftMode,
}

impl Default for HsvControls {
    fn default() -> Self {
        Self {
            base_hue: 0.0,
            saturation: 100.0,
            value: 100.0,
            hue_shift: 0.0,
            hue_shift_mode: HueShiftMode::Fixed,
        }
    }
}

impl HsvControls {
    /// Out-of-range values are normalized, not rejected: hues wrap mod 360,
    /// percentages clamp.
    pub fn normalized(self) -> Self {
        Self {
            base_hue: self.base_hue.rem_euclid(360.0),
            saturation: self.saturation.clamp(0.0, 100.0),
            value: self.value.clamp(0.0, 100.0),
            hue_shift: self.hue_shift.rem_euclid(360.0),
            hue_shift_mode: self.hue_shift_mode,
        }
    }
}

/// Per-capture knobs supplied by the configuration provider on every tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptureParams {
    /// Tidal strength, roughly [0, 100].
    pub tidal_factor: f64,
    /// Wave energy, roughly [0, 100].
    pub wave_energy: f64,
    /// Erosion seed threshold, roughly [0, 100].
    pub erosion_threshold: f64,
    /// Compaction rate in per-mille units; divided by 1000 before the aging
    /// pass. 0 disables compaction entirely.
    pub compaction_rate: f64,
    /// Organic drift strength, [0, 100].
    pub organic_factor: f64,
    /// Legacy color cycling amount, [0, 100].
    pub color_shift: f64,
    /// Opacity snapshot stored on new layers, [0, 1].
    pub layer_opacity: f64,
    pub layering_mode: LayeringMode,
    pub blend_mode: BlendMode,
    pub layer_spacing: f64,
    pub layer_offset: f64,
    pub layer_distortion: f64,
    pub layer_blur: f64,
}

impl Default for CaptureParams {
    fn default() -> Self {
        Self {
            tidal_factor: 50.0,
            wave_energy: 50.0,
            erosion_threshold: 50.0,
            compaction_rate: 5.0,
            organic_factor: 50.0,
            color_shift: 0.0,
            layer_opacity: 0.8,
            layering_mode: LayeringMode::Standard,
            blend_mode: BlendMode::Normal,
            layer_spacing: 0.0,
            layer_offset: 0.0,
            layer_distortion: 0.0,
            layer_blur: 0.0,
        }
    }
}

/// Per-render-call parameter bag. Never persisted on layers; supplied fresh
/// for every render tick.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub view_mode: ViewMode,
    pub layering_mode: LayeringMode,
    pub blend_mode: BlendMode,
    pub tidal_factor: f64,
    pub wave_energy: f64,
    pub layer_spacing: f64,
    pub layer_offset: f64,
    pub layer_distortion: f64,
    pub layer_blur: f64,
    pub show_wave_pattern: bool,
    pub highlight_current: bool,
    /// Cap on how many of the newest layers are drawn.
    pub max_layers_display: usize,
    pub hsv: HsvControls,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Normal,
            layering_mode: LayeringMode::Standard,
            blend_mode: BlendMode::Normal,
            tidal_factor: 50.0,
            wave_energy: 50.0,
            layer_spacing: 0.0,
            layer_offset: 0.0,
            layer_distortion: 0.0,
            layer_blur: 0.0,
            show_wave_pattern: false,
            highlight_current: true,
            max_layers_display: 500,
            hsv: HsvControls::default(),
        }
    }
}

/// Constructor-time defaults for [`crate::SedimentProcessor`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    pub max_layers: usize,
    pub wave_amplitude: f64,
    pub layering_mode: LayeringMode,
    pub blend_mode: BlendMode,
    pub color_shift: f64,
    pub organic_factor: f64,
    pub layer_opacity: f64,
    /// When set, layer colors are resolved through the HSV path; when absent
    /// the legacy intensity-driven RGB path is used.
    pub hsv: Option<HsvControls>,
    /// Seed for the engine's deterministic random source (stratum tags, brick
    /// sizes, random ordering).
    pub seed: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_layers: 500,
            wave_amplitude: 5.0,
            layering_mode: LayeringMode::Standard,
            blend_mode: BlendMode::Normal,
            color_shift: 0.0,
            organic_factor: 50.0,
            layer_opacity: 0.8,
            hsv: None,
            seed: 0,
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> SedimentaResult<()> {
        if self.max_layers == 0 {
            return Err(SedimentaError::validation("max_layers must be > 0"));
        }
        if !self.wave_amplitude.is_finite() || self.wave_amplitude < 0.0 {
            return Err(SedimentaError::validation(
                "wave_amplitude must be finite and >= 0",
            ));
        }
        Ok(())
    }
}

/// Flat, timestamped settings document. Reading/writing it to disk is the
/// embedder's job; this is only the document shape plus the conversions.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsDoc {
    pub tidal_factor: f64,
    pub wave_energy: f64,
    pub erosion_threshold: f64,
    pub compaction_rate: f64,
    pub organic_factor: f64,
    pub color_shift: f64,
    pub layering_mode: String,
    pub blend_mode: String,
    pub layer_opacity: f64,
    pub layer_spacing: f64,
    pub layer_offset: f64,
    pub layer_distortion: f64,
    pub layer_blur: f64,
    pub max_layers: usize,
    pub base_hue: f64,
    pub saturation: f64,
    pub value: f64,
    pub hue_shift: f64,
    pub hue_shift_mode: String,
    pub highlight_current: bool,
    pub show_wave_pattern: bool,
    pub timestamp: u64,
}

impl Default for SettingsDoc {
    fn default() -> Self {
        Self::collect(
            &CaptureParams::default(),
            &RenderConfig::default(),
            500,
            0,
        )
    }
}

impl SettingsDoc {
    pub fn collect(
        capture: &CaptureParams,
        render: &RenderConfig,
        max_layers: usize,
        timestamp: u64,
    ) -> Self {
        Self {
            tidal_factor: capture.tidal_factor,
            wave_energy: capture.wave_energy,
            erosion_threshold: capture.erosion_threshold,
            compaction_rate: capture.compaction_rate,
            organic_factor: capture.organic_factor,
            color_shift: capture.color_shift,
            layering_mode: capture.layering_mode.name().to_string(),
            blend_mode: capture.blend_mode.name().to_string(),
            layer_opacity: capture.layer_opacity,
            layer_spacing: capture.layer_spacing,
            layer_offset: capture.layer_offset,
            layer_distortion: capture.layer_distortion,
            layer_blur: capture.layer_blur,
            max_layers,
            base_hue: render.hsv.base_hue,
            saturation: render.hsv.saturation,
            value: render.hsv.value,
            hue_shift: render.hsv.hue_shift,
            hue_shift_mode: match render.hsv.hue_shift_mode {
                HueShiftMode::Fixed => "fixed",
                HueShiftMode::Position => "position",
                HueShiftMode::Intensity => "intensity",
                HueShiftMode::Time => "time",
                HueShiftMode::Layer => "layer",
            }
            .to_string(),
            highlight_current: render.highlight_current,
            show_wave_pattern: render.show_wave_pattern,
            timestamp,
        }
    }

    /// Applies the document onto a capture/render pair. Mode names parse
    /// leniently: anything unrecognized lands on the documented defaults.
    pub fn apply(&self, capture: &mut CaptureParams, render: &mut RenderConfig) {
        capture.tidal_factor = self.tidal_factor;
        capture.wave_energy = self.wave_energy;
        capture.erosion_threshold = self.erosion_threshold;
        capture.compaction_rate = self.compaction_rate;
        capture.organic_factor = self.organic_factor.clamp(0.0, 100.0);
        capture.color_shift = self.color_shift.clamp(0.0, 100.0);
        capture.layering_mode = LayeringMode::from_name(&self.layering_mode);
        capture.blend_mode = BlendMode::from_name(&self.blend_mode);
        capture.layer_opacity = self.layer_opacity.clamp(0.0, 1.0);
        capture.layer_spacing = self.layer_spacing.clamp(0.0, 100.0);
        capture.layer_offset = self.layer_offset.clamp(0.0, 100.0);
        capture.layer_distortion = self.layer_distortion.clamp(0.0, 100.0);
        capture.layer_blur = self.layer_blur.clamp(0.0, 100.0);

        render.layering_mode = capture.layering_mode;
        render.blend_mode = capture.blend_mode;
        render.tidal_factor = self.tidal_factor;
        render.wave_energy = self.wave_energy;
        render.layer_spacing = capture.layer_spacing;
        render.layer_offset = capture.layer_offset;
        render.layer_distortion = capture.layer_distortion;
        render.layer_blur = capture.layer_blur;
        render.max_layers_display = self.max_layers.max(1);
        render.highlight_current = self.highlight_current;
        render.show_wave_pattern = self.show_wave_pattern;
        render.hsv = HsvControls {
            base_hue: self.base_hue,
            saturation: self.saturation,
            value: self.value,
            hue_shift: self.hue_shift,
            hue_shift_mode: HueShiftMode::from_name(&self.hue_shift_mode),
        }
        .normalized();
    }
}
