//! Sub-pixel sampling with nearest, bilinear and Lanczos3 interpolation.
//!
//! Chip extraction uses inverse mapping: for each pixel in the output chip
//! we compute the (generally fractional) source position and interpolate
//! the surrounding source pixels. Positions that fall outside the image
//! sample as zero (black).

use crate::buffer::PixelBuffer;
use serde::{Deserialize, Serialize};

/// Interpolation filter for chip extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationFilter {
    /// Nearest neighbor (fastest, blocky when upscaling).
    Nearest,
    /// Bilinear interpolation - good balance of speed and quality.
    #[default]
    Bilinear,
    /// Lanczos3 interpolation - sharpest, slowest.
    Lanczos3,
}

/// Sample `image` at the continuous position `(x, y)`.
pub fn sample<I: PixelBuffer>(image: &I, x: f64, y: f64, filter: InterpolationFilter) -> [f64; 4] {
    match filter {
        InterpolationFilter::Nearest => sample_nearest(image, x, y),
        InterpolationFilter::Bilinear => sample_bilinear(image, x, y),
        InterpolationFilter::Lanczos3 => sample_lanczos3(image, x, y),
    }
}

fn sample_nearest<I: PixelBuffer>(image: &I, x: f64, y: f64) -> [f64; 4] {
    let (px, py) = (x.round(), y.round());
    if px < 0.0 || py < 0.0 || px >= image.width() as f64 || py >= image.height() as f64 {
        return [0.0; 4];
    }
    image.channels_at(px as u32, py as u32)
}

/// Bilinear interpolation over the 4 nearest pixels.
///
/// Positions up to half a pixel outside the image clamp to the edge row or
/// column; anything further out is black.
fn sample_bilinear<I: PixelBuffer>(image: &I, x: f64, y: f64) -> [f64; 4] {
    let (w, h) = (image.width(), image.height());
    if w == 0 || h == 0 {
        return [0.0; 4];
    }
    if x < -0.5 || y < -0.5 || x > w as f64 - 0.5 || y > h as f64 - 0.5 {
        return [0.0; 4];
    }

    let x = x.clamp(0.0, (w - 1) as f64);
    let y = y.clamp(0.0, (h - 1) as f64);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.channels_at(x0, y0);
    let p10 = image.channels_at(x1, y0);
    let p01 = image.channels_at(x0, y1);
    let p11 = image.channels_at(x1, y1);

    let mut result = [0.0; 4];
    for i in 0..I::CHANNELS {
        result[i] = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
    }
    result
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
fn sample_lanczos3<I: PixelBuffer>(image: &I, x: f64, y: f64) -> [f64; 4] {
    let (w, h) = (image.width() as i64, image.height() as i64);

    // Fall back to bilinear where the kernel would leave the image
    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 4];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = image.channels_at(px as u32, py as u32);
            for i in 0..I::CHANNELS {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    if weight_sum > 0.0 {
        for v in sum.iter_mut() {
            *v /= weight_sum;
        }
    }
    sum
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;
    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DecodedImage;

    /// Horizontal gradient: value = 10 * x in every channel.
    fn gradient(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for _y in 0..height {
            for x in 0..width {
                let v = (x * 10) as u8;
                pixels.extend_from_slice(&[v, v, v]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_integer_positions_are_exact() {
        let img = gradient(10, 10);
        for filter in [
            InterpolationFilter::Nearest,
            InterpolationFilter::Bilinear,
            InterpolationFilter::Lanczos3,
        ] {
            let v = sample(&img, 4.0, 5.0, filter);
            assert!((v[0] - 40.0).abs() < 1e-9, "{filter:?} gave {}", v[0]);
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        let img = gradient(10, 10);
        let v = sample(&img, 2.5, 3.0, InterpolationFilter::Bilinear);
        assert!((v[0] - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_bilinear_clamps_half_pixel_border() {
        let img = gradient(10, 10);
        let v = sample(&img, -0.4, 0.0, InterpolationFilter::Bilinear);
        assert!((v[0] - 0.0).abs() < 1e-9);
        let v = sample(&img, 9.4, 9.4, InterpolationFilter::Bilinear);
        assert!((v[0] - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_bounds_is_black() {
        let img = DecodedImage::new(4, 4, vec![200; 48]);
        for filter in [
            InterpolationFilter::Nearest,
            InterpolationFilter::Bilinear,
            InterpolationFilter::Lanczos3,
        ] {
            assert_eq!(sample(&img, -3.0, 1.0, filter), [0.0; 4]);
            assert_eq!(sample(&img, 1.0, 10.0, filter), [0.0; 4]);
        }
    }

    #[test]
    fn test_single_pixel_image() {
        let img = DecodedImage::new(1, 1, vec![128, 64, 32]);
        let v = sample(&img, 0.2, -0.2, InterpolationFilter::Bilinear);
        assert_eq!(&v[..3], &[128.0, 64.0, 32.0]);
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_lanczos_constant_region() {
        let img = DecodedImage::new(12, 12, vec![77; 12 * 12 * 3]);
        let v = sample(&img, 5.3, 6.7, InterpolationFilter::Lanczos3);
        assert!((v[0] - 77.0).abs() < 1e-6);
    }
}
