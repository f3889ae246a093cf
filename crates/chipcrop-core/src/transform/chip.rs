//! Fixed-size chip extraction.
//!
//! A chip is described by a source rectangle, an output size and a rotation
//! angle. The source rectangle's centre lands on the chip's centre, each
//! axis is stretched so the rectangle's edges land on the chip's edges, and
//! the result is rotated by the angle:
//!
//! ```text
//! p_img = c_rect + R(angle) * S * (p_chip - c_chip)
//! S     = diag(rect.width / cols, rect.height / rows)
//! ```
//!
//! The rectangle always maps exactly onto the chip, whatever the two
//! aspect ratios.

use super::mapping::PointTransformAffine;
use super::sample::{sample, InterpolationFilter};
use crate::buffer::PixelBuffer;
use crate::geometry::{DPoint, Rect};
use serde::{Deserialize, Serialize};

/// Output chip size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChipDims {
    pub rows: u32,
    pub cols: u32,
}

impl ChipDims {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Self { rows, cols }
    }

    /// The chip's own bounds, `[0, cols - 1] x [0, rows - 1]`.
    pub fn rect(&self) -> Rect {
        Rect::from_size(self.cols as i64, self.rows as i64)
    }
}

/// Where a chip comes from: source rectangle, output size and rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipDetails {
    /// Region of the source image, before rotation.
    pub rect: Rect,
    /// Output chip size.
    pub dims: ChipDims,
    /// Rotation in radians.
    pub angle: f64,
}

impl ChipDetails {
    pub const fn new(rect: Rect, dims: ChipDims, angle: f64) -> Self {
        Self { rect, dims, angle }
    }
}

/// Mapping from chip coordinates to source image coordinates.
///
/// # Panics
///
/// Panics if the source rectangle is empty or the chip has a zero dimension.
pub fn get_mapping_from_chip(details: &ChipDetails) -> PointTransformAffine {
    let ChipDims { rows, cols } = details.dims;
    assert!(
        rows > 0 && cols > 0,
        "chip dimensions must be non-zero, got {rows}x{cols}"
    );
    assert!(
        !details.rect.is_empty(),
        "chip source rectangle is empty: {:?}",
        details.rect
    );

    let scale_x = details.rect.width() as f64 / cols as f64;
    let scale_y = details.rect.height() as f64 / rows as f64;
    let chip_center = DPoint::new((cols as f64 - 1.0) / 2.0, (rows as f64 - 1.0) / 2.0);
    PointTransformAffine::scale_rotate(
        scale_x,
        scale_y,
        details.angle,
        chip_center,
        details.rect.dcenter(),
    )
}

/// Mapping from source image coordinates into chip coordinates.
pub fn get_mapping_to_chip(details: &ChipDetails) -> PointTransformAffine {
    get_mapping_from_chip(details).inverse()
}

/// Resample the region described by `details` into a new chip buffer.
///
/// The output is always exactly `details.dims` in size. Chip pixels whose
/// source position falls outside the image are black.
///
/// # Panics
///
/// Panics if the image has a zero dimension.
pub fn extract_image_chip<I: PixelBuffer>(
    image: &I,
    details: &ChipDetails,
    filter: InterpolationFilter,
) -> I {
    assert!(
        image.width() > 0 && image.height() > 0,
        "cannot extract a chip from an empty {}x{} image",
        image.width(),
        image.height()
    );

    let from_chip = get_mapping_from_chip(details);
    let ChipDims { rows, cols } = details.dims;
    let mut chip = I::blank(cols, rows);

    for r in 0..rows {
        for c in 0..cols {
            let src = from_chip.apply(DPoint::new(c as f64, r as f64));
            chip.set_channels(c, r, sample(image, src.x, src.y, filter));
        }
    }

    chip
}
