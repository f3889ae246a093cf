//! Random chip generation for detector training.
//!
//! [`RandomCropper`] ties the pieces together: a [`RandomSource`] draws a
//! [`CropPlan`], the chip is resampled from the image, the boxes are carried
//! into chip space and, if the plan says so, both are mirrored left-right.
//!
//! # Concurrency
//!
//! Cropping takes `&self` and may run on any number of threads at once.
//! The only shared mutable state is the generator inside [`RandomSource`];
//! everything else is read-only input or per-call output. Configuration
//! changes take `&mut self`, so they cannot overlap a running batch.

mod config;
mod planner;
mod random;
mod remap;

pub use config::{CropperConfig, DEFAULT_CHIP_SIZE};
pub use planner::{
    make_crop_plan, object_centered_rect, random_background_rect, randomly_pick_box, CropKind,
    CropPlan, BACKGROUND_MAX_SCALE, BACKGROUND_MIN_SCALE, CENTER_JITTER,
    MIN_BACKGROUND_IMAGE_SIDE,
};
pub use random::RandomSource;
pub use remap::{flip_boxes_left_right, min_object_height_absolute, remap_boxes};

use crate::boxes::MmodRect;
use crate::buffer::PixelBuffer;
use crate::transform::{extract_image_chip, get_mapping_to_chip, RectangleTransform};
use rayon::prelude::*;
use std::fmt;
use tracing::info;

/// One generated training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Crop<I> {
    /// The chip, always exactly the configured size.
    pub chip: I,
    /// Boxes in chip coordinates.
    pub boxes: Vec<MmodRect>,
}

/// Produces randomly placed, scaled, rotated and mirrored chips.
#[derive(Debug, Default)]
pub struct RandomCropper {
    config: CropperConfig,
    rnd: RandomSource,
}

impl RandomCropper {
    /// Default settings, seeded from the operating system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default settings with a reproducible random stream.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_config(CropperConfig::default(), seed)
    }

    /// # Panics
    ///
    /// Panics if `config` fails [`CropperConfig::validate`].
    pub fn with_config(config: CropperConfig, seed: u64) -> Self {
        let mut cropper = Self {
            config: CropperConfig::default(),
            rnd: RandomSource::seeded(seed),
        };
        cropper.set_config(config);
        cropper
    }

    pub fn config(&self) -> &CropperConfig {
        &self.config
    }

    /// Mutable access for the individual `set_*` setters.
    pub fn config_mut(&mut self) -> &mut CropperConfig {
        &mut self.config
    }

    /// Replace every setting at once.
    ///
    /// # Panics
    ///
    /// Panics if `config` fails [`CropperConfig::validate`].
    pub fn set_config(&mut self, config: CropperConfig) {
        if let Err(e) = config.validate() {
            panic!("invalid cropper setting: {e}");
        }
        self.config = config;
    }

    /// Restart the random stream from `seed`.
    pub fn set_seed(&mut self, seed: u64) {
        self.rnd.reseed(seed);
    }

    /// Crop one chip from `image`.
    ///
    /// # Panics
    ///
    /// Panics if the image has a zero dimension, or if a background crop is
    /// drawn for an image whose shorter side is under
    /// [`MIN_BACKGROUND_IMAGE_SIDE`].
    pub fn crop<I: PixelBuffer>(&self, image: &I, boxes: &[MmodRect]) -> Crop<I> {
        let plan = self
            .rnd
            .plan_crop(image.width(), image.height(), boxes, &self.config);
        self.apply_plan(image, boxes, &plan)
    }

    /// Produce the chip and boxes described by an already drawn plan.
    ///
    /// Makes no random draws.
    pub fn apply_plan<I: PixelBuffer>(
        &self,
        image: &I,
        boxes: &[MmodRect],
        plan: &CropPlan,
    ) -> Crop<I> {
        let mut chip = extract_image_chip(image, &plan.chip, self.config.filter());

        let to_chip = RectangleTransform::new(get_mapping_to_chip(&plan.chip));
        let chip_rect = plan.chip.dims.rect();
        let min_height =
            min_object_height_absolute(self.config.min_object_height(), plan.chip.dims.rows);
        let mut boxes = remap_boxes(boxes, &to_chip, &chip_rect, min_height);

        if plan.flip {
            chip = chip.flip_left_right();
            flip_boxes_left_right(&mut boxes, &chip_rect);
        }

        Crop { chip, boxes }
    }

    /// Crop one chip from an image picked uniformly from the pool.
    ///
    /// # Panics
    ///
    /// Panics if `images` and `rects` differ in length or are empty.
    pub fn crop_from_pool<I: PixelBuffer>(&self, images: &[I], rects: &[Vec<MmodRect>]) -> Crop<I> {
        check_pool(images, rects);
        let idx = self.rnd.pick_index(images.len());
        self.crop(&images[idx], &rects[idx])
    }

    /// Generate `num_crops` independent chips from the pool in parallel.
    ///
    /// Results are in slot order; which image fed which slot is random.
    ///
    /// # Panics
    ///
    /// Panics if `images` and `rects` differ in length. Any panic inside a
    /// worker aborts the whole batch.
    pub fn crop_batch<I>(
        &self,
        num_crops: usize,
        images: &[I],
        rects: &[Vec<MmodRect>],
    ) -> Vec<Crop<I>>
    where
        I: PixelBuffer + Send + Sync,
    {
        check_pool(images, rects);
        info!(num_crops, pool_size = images.len(), "generating crop batch");

        (0..num_crops)
            .into_par_iter()
            .map(|_| self.crop_from_pool(images, rects))
            .collect()
    }

    /// Like [`Self::crop_batch`], writing into caller-owned vectors.
    ///
    /// Both output vectors are cleared and resized to `num_crops`; slot `i`
    /// of `crops` pairs with slot `i` of `crop_rects`.
    pub fn crop_batch_into<I>(
        &self,
        num_crops: usize,
        images: &[I],
        rects: &[Vec<MmodRect>],
        crops: &mut Vec<I>,
        crop_rects: &mut Vec<Vec<MmodRect>>,
    ) where
        I: PixelBuffer + Send + Sync,
    {
        check_pool(images, rects);
        info!(num_crops, pool_size = images.len(), "generating crop batch");

        crops.clear();
        crops.resize_with(num_crops, || I::blank(0, 0));
        crop_rects.clear();
        crop_rects.resize_with(num_crops, Vec::new);

        crops
            .par_iter_mut()
            .zip(crop_rects.par_iter_mut())
            .for_each(|(chip, boxes)| {
                let crop = self.crop_from_pool(images, rects);
                *chip = crop.chip;
                *boxes = crop.boxes;
            });
    }
}

fn check_pool<I>(images: &[I], rects: &[Vec<MmodRect>]) {
    assert_eq!(
        images.len(),
        rects.len(),
        "image pool and box lists must have the same length"
    );
}

impl fmt::Display for RandomCropper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.config;
        let dims = c.chip_dims();
        writeln!(f, "random_cropper:")?;
        writeln!(f, "  chip_dims:                 {} rows x {} cols", dims.rows, dims.cols)?;
        writeln!(f, "  randomly_flip:             {}", c.randomly_flip())?;
        writeln!(f, "  max_rotation_degrees:      {}", c.max_rotation_degrees())?;
        writeln!(f, "  min_object_height:         {}", c.min_object_height())?;
        writeln!(f, "  max_object_height:         {}", c.max_object_height())?;
        writeln!(f, "  background_crops_fraction: {}", c.background_crops_fraction())?;
        write!(f, "  filter:                    {:?}", c.filter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DecodedImage;
    use crate::geometry::Rect;
    use crate::transform::{ChipDetails, ChipDims, InterpolationFilter};
    use std::collections::HashSet;

    /// Create a test image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x % 256) as u8);
                pixels.push((y % 256) as u8);
                pixels.push(((x + y) % 256) as u8);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    fn small_cropper(seed: u64) -> RandomCropper {
        let mut cropper = RandomCropper::with_seed(seed);
        cropper.config_mut().set_chip_dims(48, 48);
        cropper
    }

    fn fixed_plan(rect: Rect, size: u32, flip: bool) -> CropPlan {
        CropPlan {
            chip: ChipDetails::new(rect, ChipDims::new(size, size), 0.0),
            flip,
            kind: CropKind::Background,
        }
    }

    #[test]
    fn test_chip_always_has_configured_size() {
        let mut cropper = RandomCropper::with_seed(11);
        cropper.config_mut().set_chip_dims(40, 56);
        let img = test_image(200, 150);
        let boxes = vec![MmodRect::new(Rect::new(50, 40, 89, 99))];

        for _ in 0..50 {
            let crop = cropper.crop(&img, &boxes);
            assert_eq!(crop.chip.width, 56);
            assert_eq!(crop.chip.height, 40);
            assert_eq!(crop.chip.pixels.len(), 56 * 40 * 3);
        }
    }

    #[test]
    fn test_box_outside_plan_is_dropped() {
        let cropper = RandomCropper::with_seed(0);
        let img = test_image(100, 100);
        let plan = fixed_plan(Rect::new(50, 50, 99, 99), 50, false);

        let boxes = vec![MmodRect::new(Rect::new(0, 0, 10, 10))];
        let crop = cropper.apply_plan(&img, &boxes, &plan);
        assert!(crop.boxes.is_empty());
    }

    #[test]
    fn test_contained_box_maps_into_chip() {
        let cropper = RandomCropper::with_seed(0);
        let img = test_image(100, 100);
        let plan = fixed_plan(Rect::new(50, 50, 99, 99), 50, false);

        let boxes = vec![MmodRect::new(Rect::new(60, 60, 79, 79))];
        let crop = cropper.apply_plan(&img, &boxes, &plan);
        assert_eq!(crop.boxes.len(), 1);
        assert_eq!(crop.boxes[0].rect, Rect::new(10, 10, 29, 29));
        assert!(!crop.boxes[0].ignore);

        // 1:1 scale, so the chip is a straight copy of the source region
        assert_eq!(crop.chip.pixel(0, 0), img.pixel(50, 50));
        assert_eq!(crop.chip.pixel(49, 49), img.pixel(99, 99));
    }

    #[test]
    fn test_flip_applies_to_chip_and_boxes() {
        let mut cropper = RandomCropper::with_seed(0);
        cropper.config_mut().set_filter(InterpolationFilter::Nearest);
        let img = test_image(100, 100);
        let boxes = vec![MmodRect::new(Rect::new(60, 60, 79, 79))];

        let plain = cropper.apply_plan(&img, &boxes, &fixed_plan(Rect::new(50, 50, 99, 99), 50, false));
        let flipped = cropper.apply_plan(&img, &boxes, &fixed_plan(Rect::new(50, 50, 99, 99), 50, true));

        assert_eq!(flipped.chip, plain.chip.flip_left_right());
        assert_eq!(flipped.boxes[0].rect, Rect::new(20, 10, 39, 29));
        assert_eq!(flipped.chip.pixel(0, 0), img.pixel(99, 50));
    }

    #[test]
    fn test_same_seed_same_crops() {
        let a = small_cropper(1234);
        let b = small_cropper(1234);
        let img = test_image(160, 120);
        let boxes = vec![
            MmodRect::new(Rect::new(20, 20, 59, 69)),
            MmodRect::new(Rect::new(90, 30, 139, 99)),
        ];

        for _ in 0..20 {
            assert_eq!(a.crop(&img, &boxes), b.crop(&img, &boxes));
        }
    }

    #[test]
    fn test_set_seed_restarts_stream() {
        let mut cropper = small_cropper(5);
        let img = test_image(160, 120);
        let boxes = vec![MmodRect::new(Rect::new(20, 20, 59, 69))];

        let first = cropper.crop(&img, &boxes);
        cropper.crop(&img, &boxes);
        cropper.set_seed(5);
        assert_eq!(cropper.crop(&img, &boxes), first);
    }

    #[test]
    fn test_surviving_boxes_follow_policy() {
        let cropper = small_cropper(8);
        let img = test_image(160, 120);
        let boxes = vec![
            MmodRect::new(Rect::new(20, 20, 59, 69)),
            MmodRect::ignored(Rect::new(40, 30, 79, 79)),
        ];

        for _ in 0..100 {
            let crop = cropper.crop(&img, &boxes);
            let chip_rect = Rect::from_size(48, 48);
            for b in &crop.boxes {
                assert!(chip_rect.intersect(&b.rect).area() > 0);
                if !b.ignore {
                    assert!(chip_rect.contains_rect(&b.rect));
                    assert!(b.rect.height() >= min_object_height_absolute(0.25, 48));
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_pool_panics() {
        let cropper = small_cropper(0);
        let images = vec![test_image(64, 64), test_image(64, 64)];
        let rects = vec![Vec::new()];
        cropper.crop_from_pool(&images, &rects);
    }

    #[test]
    #[should_panic(expected = "same length")]
    fn test_mismatched_batch_panics() {
        let cropper = small_cropper(0);
        let images = vec![test_image(64, 64)];
        let rects: Vec<Vec<MmodRect>> = Vec::new();
        cropper.crop_batch(4, &images, &rects);
    }

    #[test]
    fn test_pool_crop_without_boxes() {
        let cropper = small_cropper(3);
        let images: Vec<_> = (0..4).map(|i| test_image(100 + i * 20, 100)).collect();
        let rects: Vec<Vec<MmodRect>> = vec![Vec::new(); 4];

        for _ in 0..50 {
            let crop = cropper.crop_from_pool(&images, &rects);
            assert_eq!((crop.chip.width, crop.chip.height), (48, 48));
            assert!(crop.boxes.is_empty());
        }
    }

    #[test]
    fn test_parallel_batch_from_pool() {
        let cropper = small_cropper(2024);
        let images: Vec<_> = (0..8).map(|i| test_image(120 + i * 8, 100)).collect();
        let rects: Vec<Vec<MmodRect>> = (0..8)
            .map(|i| {
                vec![
                    MmodRect::new(Rect::new(10 + i, 10, 49 + i, 59)).with_label("a"),
                    MmodRect::ignored(Rect::new(60, 20, 89, 79)),
                ]
            })
            .collect();

        let crops = cropper.crop_batch(64, &images, &rects);
        assert_eq!(crops.len(), 64);

        let mut buffers = HashSet::new();
        for crop in &crops {
            assert_eq!((crop.chip.width, crop.chip.height), (48, 48));
            assert_eq!(crop.chip.pixels.len(), 48 * 48 * 3);
            buffers.insert(crop.chip.pixels.as_ptr());
        }
        assert_eq!(buffers.len(), 64, "output slots share a buffer");
    }

    #[test]
    fn test_batch_into_fills_every_slot() {
        let cropper = small_cropper(77);
        let images = vec![test_image(96, 80), test_image(80, 96)];
        let rects = vec![
            vec![MmodRect::new(Rect::new(10, 10, 49, 49))],
            vec![MmodRect::new(Rect::new(20, 30, 59, 79))],
        ];

        // Stale contents must be replaced
        let mut crops = vec![test_image(3, 3); 100];
        let mut crop_rects = vec![vec![MmodRect::default()]; 100];
        cropper.crop_batch_into(16, &images, &rects, &mut crops, &mut crop_rects);

        assert_eq!(crops.len(), 16);
        assert_eq!(crop_rects.len(), 16);
        assert!(crops.iter().all(|c| c.width == 48 && c.height == 48));
    }

    #[test]
    fn test_empty_batch() {
        let cropper = small_cropper(0);
        let images: Vec<DecodedImage> = Vec::new();
        let rects: Vec<Vec<MmodRect>> = Vec::new();
        assert!(cropper.crop_batch(0, &images, &rects).is_empty());
    }

    #[test]
    fn test_crops_gray_image_buffers() {
        let cropper = small_cropper(9);
        let img = image::GrayImage::from_fn(90, 70, |x, y| image::Luma([((x * 3 + y) % 256) as u8]));
        let crop = cropper.crop(&img, &[MmodRect::new(Rect::new(20, 20, 44, 49))]);
        assert_eq!(crop.chip.dimensions(), (48, 48));
    }

    /// Object crops keep the target box whole and sized within the
    /// configured fraction of the chip height.
    fn check_object_height_policy(rows: u32, cols: u32) {
        let mut cropper = RandomCropper::with_seed(31);
        let config = cropper.config_mut();
        config.set_chip_dims(rows, cols);
        config.set_background_crops_fraction(0.0);
        config.set_max_rotation_degrees(0.0);
        let (lo, hi) = (config.min_object_height(), config.max_object_height());

        let img = test_image(400, 400);
        let boxes = vec![MmodRect::new(Rect::new(170, 170, 229, 229))];
        let slack = 1.5 / rows as f64;

        for _ in 0..200 {
            let crop = cropper.crop(&img, &boxes);
            assert_eq!(crop.boxes.len(), 1);
            let target = &crop.boxes[0];
            assert!(!target.ignore, "{rows}x{cols}: target ignored at {:?}", target.rect);

            let frac = target.rect.height() as f64 / rows as f64;
            assert!(
                frac >= lo - slack && frac <= hi + slack,
                "{rows}x{cols}: height fraction {frac}"
            );
            assert!(Rect::from_size(cols as i64, rows as i64).contains_rect(&target.rect));
        }
    }

    #[test]
    fn test_object_height_policy_square_chip() {
        check_object_height_policy(48, 48);
    }

    #[test]
    fn test_object_height_policy_wide_chip() {
        check_object_height_policy(64, 96);
    }

    #[test]
    fn test_object_height_policy_tall_chip() {
        check_object_height_policy(96, 40);
    }

    #[test]
    fn test_with_config_keeps_settings() {
        let mut config = CropperConfig::new();
        config.set_chip_dims(32, 64);
        config.set_randomly_flip(false);
        let cropper = RandomCropper::with_config(config.clone(), 0);
        assert_eq!(cropper.config(), &config);

        let crop = cropper.crop(&test_image(100, 100), &[]);
        assert_eq!((crop.chip.width, crop.chip.height), (64, 32));
    }

    #[test]
    fn test_display_lists_every_setting() {
        let cropper = RandomCropper::with_seed(0);
        let text = cropper.to_string();
        for key in [
            "chip_dims",
            "randomly_flip",
            "max_rotation_degrees",
            "min_object_height",
            "max_object_height",
            "background_crops_fraction",
            "filter",
        ] {
            assert!(text.contains(key), "missing {key} in:\n{text}");
        }
        assert!(text.contains("300 rows x 300 cols"));
        assert!(text.contains("Bilinear"));
    }
}
