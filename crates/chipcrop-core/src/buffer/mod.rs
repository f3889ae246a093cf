//! Pixel buffers the cropper can read from and write chips into.
//!
//! The cropper never decodes images itself. It works against the narrow
//! [`PixelBuffer`] capability: dimensions, per-pixel channel access, a way
//! to allocate a blank buffer, and a left-right mirror. Two implementations
//! ship with the crate:
//!
//! - [`DecodedImage`]: packed RGB bytes, the format decoders hand over
//! - `image::ImageBuffer<P, Vec<u8>>` for any 8-bit `image` pixel type
//!   (`GrayImage`, `RgbImage`, `RgbaImage`, ...)

mod decoded;
mod image_buffer;

pub use decoded::DecodedImage;

/// Read/write access to a 2-D buffer of 8-bit pixels.
///
/// Channel values cross this interface as `f64` so that interpolation can be
/// written once for every pixel layout. Only the first [`Self::CHANNELS`]
/// entries of a channel array are meaningful.
pub trait PixelBuffer: Sized {
    /// Number of channels per pixel (at most 4).
    const CHANNELS: usize;

    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Allocate a zero-filled buffer.
    fn blank(width: u32, height: u32) -> Self;

    /// Channel values at `(x, y)`. Coordinates must be in bounds.
    fn channels_at(&self, x: u32, y: u32) -> [f64; 4];

    /// Store channel values at `(x, y)`, rounding and clamping to 0..=255.
    fn set_channels(&mut self, x: u32, y: u32, value: [f64; 4]);

    /// A copy of this buffer mirrored about its vertical centre line.
    fn flip_left_right(&self) -> Self;
}

/// Convert an interpolated channel value back to storage.
#[inline]
pub(crate) fn to_u8(v: f64) -> u8 {
    v.clamp(0.0, 255.0).round() as u8
}
