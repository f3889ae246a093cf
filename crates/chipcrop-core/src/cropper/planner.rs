//! Crop planning: which region to sample, how far to rotate it, and
//! whether to mirror the result.
//!
//! # Policy
//!
//! Most crops are centred on a randomly chosen usable (non-ignored) box:
//! the box centre is jittered by up to ±10% of the box size and the crop
//! side is chosen so the box spans between `min_object_height` and
//! `max_object_height` of the chip. With probability
//! `background_crops_fraction`, or whenever no usable box exists, a
//! background crop is taken instead: a square between 46.7% and 87.5% of
//! the image's shorter side, placed uniformly inside the image.
//!
//! Planning functions only draw from the generator they are handed. The
//! draw order is fixed: background decision, box pick, centre jitter,
//! scale (or background scale and offsets), flip, angle.

use super::config::CropperConfig;
use crate::boxes::{has_non_ignored_box, MmodRect};
use crate::geometry::{DPoint, Rect};
use crate::transform::ChipDetails;
use rand::Rng;
use tracing::debug;

/// Smallest background crop side, as a fraction of the image's shorter side.
pub const BACKGROUND_MIN_SCALE: f64 = 0.466666666;

/// Largest background crop side, as a fraction of the image's shorter side.
pub const BACKGROUND_MAX_SCALE: f64 = 0.875;

/// Shortest image side that can host a background crop of at least one pixel.
pub const MIN_BACKGROUND_IMAGE_SIDE: u32 = 3;

/// Maximum centre jitter of an object crop, as a fraction of the box size.
pub const CENTER_JITTER: f64 = 0.1;

/// Which sampling branch produced a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropKind {
    /// Centred on the box at this index of the input list.
    Object { box_index: usize },
    /// Sampled without regard to boxes.
    Background,
}

/// Everything needed to produce one chip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Source rectangle, chip size and rotation.
    pub chip: ChipDetails,
    /// Mirror the chip (and its boxes) left-right after extraction.
    pub flip: bool,
    pub kind: CropKind,
}

impl CropPlan {
    /// Rotation angle in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        self.chip.angle.to_degrees()
    }
}

/// Draw a complete crop plan for one image.
///
/// # Panics
///
/// Panics if a background crop is needed and the image is too small to
/// host one (see [`random_background_rect`]).
pub fn make_crop_plan<R: Rng + ?Sized>(
    rng: &mut R,
    image_width: u32,
    image_height: u32,
    boxes: &[MmodRect],
    config: &CropperConfig,
) -> CropPlan {
    let (rect, kind) =
        if has_non_ignored_box(boxes) && rng.gen::<f64>() >= config.background_crops_fraction() {
            let box_index = randomly_pick_box(rng, boxes);
            let rect = object_centered_rect(
                rng,
                &boxes[box_index].rect,
                config.min_object_height(),
                config.max_object_height(),
            );
            (rect, CropKind::Object { box_index })
        } else {
            (
                random_background_rect(rng, image_width, image_height),
                CropKind::Background,
            )
        };

    let flip = config.randomly_flip() && rng.gen::<f64>() > 0.5;
    let max_degrees = config.max_rotation_degrees();
    let angle_degrees = rng.gen_range(-max_degrees..=max_degrees);

    debug!(
        ?kind,
        side = rect.width(),
        angle_degrees,
        flip,
        "planned crop"
    );

    CropPlan {
        chip: ChipDetails::new(rect, config.chip_dims(), angle_degrees.to_radians()),
        flip,
        kind,
    }
}

/// Pick a uniformly random non-ignored box by rejection sampling.
///
/// # Panics
///
/// Panics if every box is marked ignore (the loop would never end).
pub fn randomly_pick_box<R: Rng + ?Sized>(rng: &mut R, boxes: &[MmodRect]) -> usize {
    assert!(
        has_non_ignored_box(boxes),
        "cannot pick an object box: all {} boxes are marked ignore",
        boxes.len()
    );
    loop {
        let idx = rng.gen_range(0..boxes.len());
        if !boxes[idx].ignore {
            return idx;
        }
    }
}

/// A square crop around `rect`, jittered in position and scale.
///
/// The side is `rect.height() / s` for `s` uniform between the two object
/// height fractions, so after resizing to the chip the box covers roughly
/// `s` of the chip height.
pub fn object_centered_rect<R: Rng + ?Sized>(
    rng: &mut R,
    rect: &Rect,
    min_object_height: f64,
    max_object_height: f64,
) -> Rect {
    let translate = DPoint::new(
        rng.gen_range(-CENTER_JITTER..CENTER_JITTER) * rect.width() as f64,
        rng.gen_range(-CENTER_JITTER..CENTER_JITTER) * rect.height() as f64,
    );

    let (lo, hi) = if min_object_height <= max_object_height {
        (min_object_height, max_object_height)
    } else {
        (max_object_height, min_object_height)
    };
    let scale = rng.gen_range(lo..=hi);

    let side = ((rect.height() as f64 / scale) as i64).max(1);
    let (cx, cy) = rect.center();
    let center = DPoint::new(cx as f64, cy as f64) + translate;
    Rect::centered(center.round(), side, side)
}

/// A square background crop placed uniformly inside the image.
///
/// # Panics
///
/// Panics if the image's shorter side is under
/// [`MIN_BACKGROUND_IMAGE_SIDE`]. Such images are a caller error, not a
/// sampling outcome.
pub fn random_background_rect<R: Rng + ?Sized>(
    rng: &mut R,
    image_width: u32,
    image_height: u32,
) -> Rect {
    let min_dim = image_width.min(image_height);
    assert!(
        min_dim >= MIN_BACKGROUND_IMAGE_SIDE,
        "image {image_width}x{image_height} is too small for a background crop \
         (shorter side must be at least {MIN_BACKGROUND_IMAGE_SIDE})"
    );

    let scale = rng.gen_range(BACKGROUND_MIN_SCALE..BACKGROUND_MAX_SCALE);
    let side = (scale * min_dim as f64) as i64;

    let (w, h) = (image_width as i64, image_height as i64);

    let x = rng.gen_range(0..w - side);
    let y = rng.gen_range(0..h - side);
    Rect::from_size(side, side).translated(x, y)
}
