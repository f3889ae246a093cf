//! Labeled object boxes.

use crate::geometry::Rect;
use serde::{Deserialize, Serialize};

/// A labeled object box.
///
/// Boxes marked `ignore` are still reported to the training pipeline but
/// are excluded from loss computation there.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MmodRect {
    /// Box location in pixel coordinates.
    pub rect: Rect,
    /// Detector score; 0 for ground-truth annotations.
    pub detection_confidence: f64,
    /// Exclude this box from loss computation.
    pub ignore: bool,
    /// Class label.
    pub label: String,
}

impl MmodRect {
    /// A usable (non-ignored) box with no label.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Default::default()
        }
    }

    /// A box that is already marked ignore.
    pub fn ignored(rect: Rect) -> Self {
        Self {
            rect,
            ignore: true,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

impl From<Rect> for MmodRect {
    fn from(rect: Rect) -> Self {
        Self::new(rect)
    }
}

/// True if at least one box is not marked ignore.
pub fn has_non_ignored_box(boxes: &[MmodRect]) -> bool {
    boxes.iter().any(|b| !b.ignore)
}
