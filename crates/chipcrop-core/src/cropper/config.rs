//! Cropper settings.

use crate::error::ConfigError;
use crate::transform::{ChipDims, InterpolationFilter};
use serde::{Deserialize, Serialize};

/// Default chip edge length in pixels.
pub const DEFAULT_CHIP_SIZE: u32 = 300;

/// Settings read by every crop.
///
/// Setters panic on out-of-range values; the `try_set_*` variants report
/// the same violations as a [`ConfigError`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropperConfig {
    chip_dims: ChipDims,
    randomly_flip: bool,
    max_rotation_degrees: f64,
    min_object_height: f64,
    max_object_height: f64,
    background_crops_fraction: f64,
    filter: InterpolationFilter,
}

impl Default for CropperConfig {
    fn default() -> Self {
        Self {
            chip_dims: ChipDims::new(DEFAULT_CHIP_SIZE, DEFAULT_CHIP_SIZE),
            randomly_flip: true,
            max_rotation_degrees: 30.0,
            min_object_height: 0.25,
            max_object_height: 0.7,
            background_crops_fraction: 0.1,
            filter: InterpolationFilter::Bilinear,
        }
    }
}

impl CropperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every setting, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_chip_dims(self.chip_dims)?;
        check_rotation(self.max_rotation_degrees)?;
        check_object_height(self.min_object_height, ConfigError::MinObjectHeight)?;
        check_object_height(self.max_object_height, ConfigError::MaxObjectHeight)?;
        check_background_fraction(self.background_crops_fraction)
    }

    /// Size of every produced chip.
    pub fn chip_dims(&self) -> ChipDims {
        self.chip_dims
    }

    pub fn set_chip_dims(&mut self, rows: u32, cols: u32) {
        fatal(self.try_set_chip_dims(rows, cols));
    }

    pub fn try_set_chip_dims(&mut self, rows: u32, cols: u32) -> Result<(), ConfigError> {
        let dims = ChipDims::new(rows, cols);
        check_chip_dims(dims)?;
        self.chip_dims = dims;
        Ok(())
    }

    /// Whether half of all chips are mirrored left-right.
    pub fn randomly_flip(&self) -> bool {
        self.randomly_flip
    }

    pub fn set_randomly_flip(&mut self, value: bool) {
        self.randomly_flip = value;
    }

    /// Chips are rotated by a uniform angle in `[-max, max]` degrees.
    pub fn max_rotation_degrees(&self) -> f64 {
        self.max_rotation_degrees
    }

    /// Negative limits are folded to their absolute value.
    pub fn set_max_rotation_degrees(&mut self, value: f64) {
        fatal(self.try_set_max_rotation_degrees(value));
    }

    pub fn try_set_max_rotation_degrees(&mut self, value: f64) -> Result<(), ConfigError> {
        let value = value.abs();
        check_rotation(value)?;
        self.max_rotation_degrees = value;
        Ok(())
    }

    /// Smallest fraction of the chip height an object-centred crop aims for.
    ///
    /// Boxes shorter than this fraction after mapping are marked ignore.
    pub fn min_object_height(&self) -> f64 {
        self.min_object_height
    }

    pub fn set_min_object_height(&mut self, value: f64) {
        fatal(self.try_set_min_object_height(value));
    }

    pub fn try_set_min_object_height(&mut self, value: f64) -> Result<(), ConfigError> {
        check_object_height(value, ConfigError::MinObjectHeight)?;
        self.min_object_height = value;
        Ok(())
    }

    /// Largest fraction of the chip height an object-centred crop aims for.
    pub fn max_object_height(&self) -> f64 {
        self.max_object_height
    }

    pub fn set_max_object_height(&mut self, value: f64) {
        fatal(self.try_set_max_object_height(value));
    }

    pub fn try_set_max_object_height(&mut self, value: f64) -> Result<(), ConfigError> {
        check_object_height(value, ConfigError::MaxObjectHeight)?;
        self.max_object_height = value;
        Ok(())
    }

    /// Probability of sampling a background crop even when a usable box exists.
    pub fn background_crops_fraction(&self) -> f64 {
        self.background_crops_fraction
    }

    pub fn set_background_crops_fraction(&mut self, value: f64) {
        fatal(self.try_set_background_crops_fraction(value));
    }

    pub fn try_set_background_crops_fraction(&mut self, value: f64) -> Result<(), ConfigError> {
        check_background_fraction(value)?;
        self.background_crops_fraction = value;
        Ok(())
    }

    /// Interpolation used when resampling chips.
    pub fn filter(&self) -> InterpolationFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: InterpolationFilter) {
        self.filter = filter;
    }
}

fn fatal(result: Result<(), ConfigError>) {
    if let Err(e) = result {
        panic!("invalid cropper setting: {e}");
    }
}

fn check_chip_dims(dims: ChipDims) -> Result<(), ConfigError> {
    if dims.rows == 0 || dims.cols == 0 {
        return Err(ConfigError::EmptyChipDims {
            rows: dims.rows,
            cols: dims.cols,
        });
    }
    Ok(())
}

fn check_rotation(value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::MaxRotationDegrees(value));
    }
    Ok(())
}

fn check_object_height(value: f64, err: fn(f64) -> ConfigError) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(err(value))
    }
}

fn check_background_fraction(value: f64) -> Result<(), ConfigError> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::BackgroundCropsFraction(value))
    }
}
