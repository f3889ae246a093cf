//! Geometric transforms between a source image and a fixed-size chip.
//!
//! # Coordinate System
//!
//! - Integer coordinates are pixel centres, origin at the top-left
//! - A rectangle covers its pixels' full extent, half a pixel past each corner centre
//! - Rotation angles are in radians
//!
//! Chip pixels are produced by inverse mapping (chip -> image, then
//! interpolate), while boxes are carried forward (image -> chip) through the
//! inverse of that same transform, so pixels and boxes always agree.

mod chip;
mod mapping;
mod sample;

pub use chip::{
    extract_image_chip, get_mapping_from_chip, get_mapping_to_chip, ChipDetails, ChipDims,
};
pub use mapping::{PointTransformAffine, RectangleTransform};
pub use sample::{sample, InterpolationFilter};
