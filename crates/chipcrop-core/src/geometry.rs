//! Integer rectangles and floating-point points.
//!
//! # Coordinate System
//!
//! - Origin is the top-left pixel, x grows to the right, y grows downward
//! - Integer coordinates name pixel centres
//! - `Rect` corners are inclusive: a rect with `left == right` is one pixel wide
//! - A rect with `right < left` or `bottom < top` is empty

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DPoint {
    pub x: f64,
    pub y: f64,
}

impl DPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length of the vector from the origin to this point.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Round to the nearest integer pixel position.
    pub fn round(&self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }
}

impl Add for DPoint {
    type Output = DPoint;

    fn add(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for DPoint {
    type Output = DPoint;

    fn sub(self, rhs: DPoint) -> DPoint {
        DPoint::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for DPoint {
    type Output = DPoint;

    fn mul(self, rhs: f64) -> DPoint {
        DPoint::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle with inclusive integer corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl Default for Rect {
    /// The empty rectangle.
    fn default() -> Self {
        Self::new(0, 0, -1, -1)
    }
}

impl Rect {
    pub const fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// A `width x height` rectangle anchored at the origin.
    pub const fn from_size(width: i64, height: i64) -> Self {
        Self::new(0, 0, width - 1, height - 1)
    }

    /// A `width x height` rectangle centred on `center`.
    ///
    /// For even sizes the extra pixel goes to the right/bottom.
    pub fn centered(center: (i64, i64), width: i64, height: i64) -> Self {
        let left = center.0 - width / 2;
        let top = center.1 - height / 2;
        Self::new(left, top, left + width - 1, top + height - 1)
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn width(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.right - self.left + 1
        }
    }

    pub fn height(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.bottom - self.top + 1
        }
    }

    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// The overlap of two rectangles (empty if they do not overlap).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// True if `other` lies entirely inside `self`. Every rect contains the empty rect.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (self.left <= other.left
                && self.top <= other.top
                && self.right >= other.right
                && self.bottom >= other.bottom)
    }

    pub fn contains_point(&self, x: i64, y: i64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Integer centre pixel, rounding half-way cases toward the bottom-right.
    pub fn center(&self) -> (i64, i64) {
        (
            (self.left + self.right + 1) / 2,
            (self.top + self.bottom + 1) / 2,
        )
    }

    /// Exact centre in continuous coordinates.
    pub fn dcenter(&self) -> DPoint {
        DPoint::new(
            (self.left + self.right) as f64 / 2.0,
            (self.top + self.bottom) as f64 / 2.0,
        )
    }

    pub fn translated(&self, dx: i64, dy: i64) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Mirror this rectangle about the vertical centre line of `window`.
    ///
    /// Top and bottom are unchanged. Applying the same reflection twice
    /// returns the original rectangle.
    pub fn flipped_left_right(&self, window: &Rect) -> Rect {
        let left_dist = self.left - window.left;
        let right = window.right - left_dist;
        Rect::new(right - self.width() + 1, self.top, right, self.bottom)
    }
}
