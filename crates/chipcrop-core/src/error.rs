//! Configuration errors.

use thiserror::Error;

/// A cropper setting outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Background crop probability must be in `[0, 1)`.
    #[error("background crops fraction must be in [0, 1), got {0}")]
    BackgroundCropsFraction(f64),

    /// Minimum object height must be in `(0, 1)`.
    #[error("min object height must be in (0, 1), got {0}")]
    MinObjectHeight(f64),

    /// Maximum object height must be in `(0, 1)`.
    #[error("max object height must be in (0, 1), got {0}")]
    MaxObjectHeight(f64),

    /// Rotation limit must be a finite number of degrees.
    #[error("max rotation degrees must be finite, got {0}")]
    MaxRotationDegrees(f64),

    /// Chips need at least one row and one column.
    #[error("chip dimensions must be non-zero, got {rows}x{cols}")]
    EmptyChipDims { rows: u32, cols: u32 },
}
