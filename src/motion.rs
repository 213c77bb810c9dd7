use crate::core::PixelBuffer;

/// Stride in bytes between sampled pixels (every 4th RGBA pixel).
const SAMPLE_STRIDE: usize = 16;
/// Grayscale delta between consecutive samples counted as an edge.
const HIGH_FREQ_THRESHOLD: f64 = 30.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorProfile {
    /// Per-channel means normalized to [0, 1].
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MotionAnalysis {
    /// Mean sampled grayscale, [0, 255].
    pub intensity: f64,
    pub color_profile: ColorProfile,
    /// Fraction of sampled pixels with an abrupt grayscale change, [0, 1].
    pub high_frequency: f64,
    pub dominant_channel: Channel,
}

impl MotionAnalysis {
    fn zero() -> Self {
        Self {
            intensity: 0.0,
            color_profile: ColorProfile::default(),
            high_frequency: 0.0,
            dominant_channel: Channel::Red,
        }
    }
}

/// Scans a slit buffer and extracts an intensity scalar plus color/frequency
/// statistics. Sampling every 4th pixel bounds the cost on tall slits; a
/// buffer too small to sample yields the all-zero analysis.
pub fn analyze(slit: &PixelBuffer) -> MotionAnalysis {
    let data = slit.data();

    let mut total_intensity = 0.0;
    let mut red = 0.0;
    let mut green = 0.0;
    let mut blue = 0.0;
    let mut high_freq_count = 0u64;
    let mut sampled = 0u64;
    let mut prev_gray: Option<f64> = None;

    let mut i = 0;
    while i + 2 < data.len() {
        let r = f64::from(data[i]);
        let g = f64::from(data[i + 1]);
        let b = f64::from(data[i + 2]);
        let gray = (r + g + b) / 3.0;

        total_intensity += gray;
        red += r;
        green += g;
        blue += b;

        if let Some(prev) = prev_gray
            && (gray - prev).abs() > HIGH_FREQ_THRESHOLD
        {
            high_freq_count += 1;
        }
        prev_gray = Some(gray);
        sampled += 1;

        i += SAMPLE_STRIDE;
    }

    if sampled == 0 {
        return MotionAnalysis::zero();
    }

    let n = sampled as f64;
    let avg_red = red / n;
    let avg_green = green / n;
    let avg_blue = blue / n;

    let dominant_channel = if avg_red >= avg_green && avg_red >= avg_blue {
        Channel::Red
    } else if avg_green >= avg_blue {
        Channel::Green
    } else {
        Channel::Blue
    };

    MotionAnalysis {
        intensity: total_intensity / n,
        color_profile: ColorProfile {
            red: avg_red / 255.0,
            green: avg_green / 255.0,
            blue: avg_blue / 255.0,
        },
        high_frequency: high_freq_count as f64 / n,
        dominant_channel,
    }
}
