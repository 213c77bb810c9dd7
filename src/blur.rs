use crate::core::PixelBuffer;
use crate::error::{SedimentaError, SedimentaResult};

/// Separable gaussian blur over an RGBA8 buffer, used as the deferred
/// offscreen pass when a layer's blur control is nonzero. Edge pixels clamp.
pub fn gaussian_blur_rgba8(
    src: &PixelBuffer,
    radius: u32,
    sigma: f64,
) -> SedimentaResult<PixelBuffer> {
    if radius == 0 {
        return Ok(src.clone());
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(SedimentaError::validation("blur sigma must be > 0"));
    }

    let kernel = gaussian_kernel(radius, sigma);
    let (w, h) = (src.width(), src.height());

    let mut tmp = PixelBuffer::blank(w, h);
    let mut out = PixelBuffer::blank(w, h);
    convolve_axis(src, &mut tmp, &kernel, Axis::Horizontal);
    convolve_axis(&tmp, &mut out, &kernel, Axis::Vertical);
    Ok(out)
}

/// Blur radius for a [0, 100] layer-blur control; sigma pairs via
/// [`sigma_for_radius`].
pub fn radius_for_control(layer_blur: f64) -> u32 {
    (layer_blur.clamp(0.0, 100.0) / 10.0).ceil() as u32
}

pub fn sigma_for_radius(radius: u32) -> f64 {
    f64::from(radius) * 0.5 + 0.5
}

enum Axis {
    Horizontal,
    Vertical,
}

fn gaussian_kernel(radius: u32, sigma: f64) -> Vec<f64> {
    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

fn convolve_axis(src: &PixelBuffer, dst: &mut PixelBuffer, kernel: &[f64], axis: Axis) {
    let radius = (kernel.len() / 2) as i64;
    let (w, h) = (src.width() as i64, src.height() as i64);

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f64; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let offset = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + offset).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + offset).clamp(0, h - 1)),
                };
                let px = src
                    .pixel(sx as u32, sy as u32)
                    .unwrap_or([0, 0, 0, 0]);
                for (a, &c) in acc.iter_mut().zip(px.iter()) {
                    *a += kw * f64::from(c);
                }
            }
            dst.set_pixel(
                x as u32,
                y as u32,
                [
                    acc[0].round().clamp(0.0, 255.0) as u8,
                    acc[1].round().clamp(0.0, 255.0) as u8,
                    acc[2].round().clamp(0.0, 255.0) as u8,
                    acc[3].round().clamp(0.0, 255.0) as u8,
                ],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba;

    #[test]
    fn radius_zero_is_identity() {
        let src = PixelBuffer::solid(3, 2, Rgba::opaque(10.0, 20.0, 30.0));
        let out = gaussian_blur_rgba8(&src, 0, 1.0).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let src = PixelBuffer::solid(5, 4, Rgba::new(40.0, 80.0, 120.0, 0.5));
        let out = gaussian_blur_rgba8(&src, 3, 1.5).unwrap();
        for y in 0..4 {
            for x in 0..5 {
                let px = out.pixel(x, y).unwrap();
                let want = src.pixel(x, y).unwrap();
                for c in 0..4 {
                    assert!((i32::from(px[c]) - i32::from(want[c])).abs() <= 1);
                }
            }
        }
    }

    #[test]
    fn single_pixel_spreads_energy() {
        let mut src = PixelBuffer::blank(5, 5);
        src.set_pixel(2, 2, [255, 255, 255, 255]);
        let out = gaussian_blur_rgba8(&src, 2, 1.2).unwrap();

        let lit = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .filter(|&(x, y)| out.pixel(x, y).unwrap()[3] != 0)
            .count();
        assert!(lit > 1);

        let total: u32 = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .map(|(x, y)| u32::from(out.pixel(x, y).unwrap()[3]))
            .sum();
        assert!((total as i32 - 255).abs() <= 8);
    }

    #[test]
    fn invalid_sigma_is_rejected() {
        let src = PixelBuffer::blank(2, 2);
        assert!(gaussian_blur_rgba8(&src, 1, 0.0).is_err());
        assert!(gaussian_blur_rgba8(&src, 1, f64::NAN).is_err());
    }

    #[test]
    fn control_mapping_is_monotonic() {
        assert_eq!(radius_for_control(0.0), 0);
        assert!(radius_for_control(15.0) >= 1);
        assert!(radius_for_control(100.0) >= radius_for_control(50.0));
    }
}
