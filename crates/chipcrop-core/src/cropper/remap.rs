//! Carrying object boxes from image space into chip space.
//!
//! Each box is mapped through the image-to-chip transform and then:
//!
//! - dropped if it no longer overlaps the chip at all
//! - marked ignore if it is cut by the chip border or ends up shorter than
//!   the minimum object height
//! - kept unchanged otherwise
//!
//! The ignore flag is only ever set, never cleared. Output order follows
//! input order.

use crate::boxes::MmodRect;
use crate::geometry::Rect;
use crate::transform::RectangleTransform;
use tracing::debug;

/// Minimum box height in chip pixels: `round(min_object_height * rows)`.
pub fn min_object_height_absolute(min_object_height: f64, chip_rows: u32) -> i64 {
    (min_object_height * chip_rows as f64).round() as i64
}

/// Map `boxes` into the chip and apply the keep/ignore/drop policy.
pub fn remap_boxes(
    boxes: &[MmodRect],
    to_chip: &RectangleTransform,
    chip_rect: &Rect,
    min_height: i64,
) -> Vec<MmodRect> {
    let remapped: Vec<MmodRect> = boxes
        .iter()
        .filter_map(|b| {
            let rect = to_chip.apply(&b.rect);
            if chip_rect.intersect(&rect).area() == 0 {
                return None;
            }
            let ignore = b.ignore || !chip_rect.contains_rect(&rect) || rect.height() < min_height;
            Some(MmodRect {
                rect,
                ignore,
                ..b.clone()
            })
        })
        .collect();

    debug!(
        kept = remapped.len(),
        ignored = remapped.iter().filter(|b| b.ignore).count(),
        dropped = boxes.len() - remapped.len(),
        "remapped boxes"
    );

    remapped
}

/// Mirror every box about the vertical centre line of `window`.
pub fn flip_boxes_left_right(boxes: &mut [MmodRect], window: &Rect) {
    for b in boxes.iter_mut() {
        b.rect = b.rect.flipped_left_right(window);
    }
}
