//! The cropper's shared random number generator.
//!
//! One generator serves every crop, including crops running on different
//! worker threads. It sits behind a single mutex, and each lock is held for
//! a whole unit of work (one full crop plan, or one pool pick) so that the
//! draws making up a plan are never interleaved with another thread's.
//! Raw draws are not exposed.

use super::config::CropperConfig;
use super::planner::{make_crop_plan, CropPlan};
use crate::boxes::MmodRect;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A mutex-guarded generator handing out whole crop plans.
#[derive(Debug)]
pub struct RandomSource {
    rng: Mutex<ChaCha8Rng>,
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource {
    /// A reproducible source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// A source seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Restart the stream from `seed`.
    pub fn reseed(&self, seed: u64) {
        *self.lock() = ChaCha8Rng::seed_from_u64(seed);
    }

    /// Draw a full crop plan under one lock acquisition.
    pub fn plan_crop(
        &self,
        image_width: u32,
        image_height: u32,
        boxes: &[MmodRect],
        config: &CropperConfig,
    ) -> CropPlan {
        let mut rng = self.lock();
        make_crop_plan(&mut *rng, image_width, image_height, boxes, config)
    }

    /// Uniform index in `0..len`.
    ///
    /// # Panics
    ///
    /// Panics if `len` is zero.
    pub fn pick_index(&self, len: usize) -> usize {
        assert!(len > 0, "cannot pick from an empty pool");
        self.lock().gen_range(0..len)
    }

    /// A panic on another thread cannot leave the generator half-updated,
    /// so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
