//! Chipcrop Core - Random training chips for object detectors
//!
//! This crate turns a full image and its labeled object boxes into a
//! fixed-size chip plus the boxes remapped into chip coordinates, with
//! random translation, scale, rotation and left-right flip. Most chips are
//! centred on a real object; a configurable fraction are background-only.
//!
//! Batches are generated in parallel from an image pool, all workers sharing
//! one seeded random stream.

pub mod boxes;
pub mod buffer;
pub mod cropper;
pub mod error;
pub mod geometry;
pub mod transform;

pub use boxes::{has_non_ignored_box, MmodRect};
pub use buffer::{DecodedImage, PixelBuffer};
pub use cropper::{Crop, CropKind, CropPlan, CropperConfig, RandomCropper, RandomSource};
pub use error::ConfigError;
pub use geometry::{DPoint, Rect};
pub use transform::{
    extract_image_chip, ChipDetails, ChipDims, InterpolationFilter, PointTransformAffine,
    RectangleTransform,
};
