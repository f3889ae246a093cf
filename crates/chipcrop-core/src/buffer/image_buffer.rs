//! [`PixelBuffer`] for the `image` crate's 8-bit buffers.

use super::{to_u8, PixelBuffer};
use image::{ImageBuffer, Pixel};

impl<P> PixelBuffer for ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    const CHANNELS: usize = P::CHANNEL_COUNT as usize;

    fn width(&self) -> u32 {
        ImageBuffer::width(self)
    }

    fn height(&self) -> u32 {
        ImageBuffer::height(self)
    }

    fn blank(width: u32, height: u32) -> Self {
        ImageBuffer::new(width, height)
    }

    fn channels_at(&self, x: u32, y: u32) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (dst, &c) in out.iter_mut().zip(self.get_pixel(x, y).channels()) {
            *dst = c as f64;
        }
        out
    }

    fn set_channels(&mut self, x: u32, y: u32, value: [f64; 4]) {
        for (c, &v) in self.get_pixel_mut(x, y).channels_mut().iter_mut().zip(&value) {
            *c = to_u8(v);
        }
    }

    fn flip_left_right(&self) -> Self {
        image::imageops::flip_horizontal(self)
    }
}
