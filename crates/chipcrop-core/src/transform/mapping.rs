//! Affine point and rectangle mappings.
//!
//! A chip is related to its source image by an axis-aligned scale followed
//! by a rotation and a translation. Pixels are pulled through the
//! chip-to-image direction; boxes are pushed through the inverse.

use crate::geometry::{DPoint, Rect};

/// `p ↦ M·p + b` for a 2x2 matrix `M` and offset `b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTransformAffine {
    m: [[f64; 2]; 2],
    b: DPoint,
}

impl Default for PointTransformAffine {
    fn default() -> Self {
        Self::identity()
    }
}

impl PointTransformAffine {
    pub const fn new(m: [[f64; 2]; 2], b: DPoint) -> Self {
        Self { m, b }
    }

    pub const fn identity() -> Self {
        Self::new([[1.0, 0.0], [0.0, 1.0]], DPoint::new(0.0, 0.0))
    }

    /// Maps `from_center` to `to_center`, scaling x by `scale_x` and y by
    /// `scale_y`, then rotating by `angle` radians about that point.
    pub fn scale_rotate(
        scale_x: f64,
        scale_y: f64,
        angle: f64,
        from_center: DPoint,
        to_center: DPoint,
    ) -> Self {
        let (sin, cos) = angle.sin_cos();
        let m = [
            [scale_x * cos, -scale_y * sin],
            [scale_x * sin, scale_y * cos],
        ];
        let t = Self::new(m, DPoint::default());
        let moved = t.apply(from_center);
        Self::new(m, to_center - moved)
    }

    #[inline]
    pub fn apply(&self, p: DPoint) -> DPoint {
        DPoint::new(
            self.m[0][0] * p.x + self.m[0][1] * p.y + self.b.x,
            self.m[1][0] * p.x + self.m[1][1] * p.y + self.b.y,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.m[0][0] * self.m[1][1] - self.m[0][1] * self.m[1][0]
    }

    /// The inverse mapping.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is singular.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        assert!(
            det.abs() > f64::EPSILON,
            "cannot invert a singular affine transform (det = {det})"
        );
        let m = [
            [self.m[1][1] / det, -self.m[0][1] / det],
            [-self.m[1][0] / det, self.m[0][0] / det],
        ];
        let t = Self::new(m, DPoint::default());
        let moved = t.apply(self.b);
        Self::new(m, DPoint::default() - moved)
    }
}

/// Maps axis-aligned rectangles through a [`PointTransformAffine`].
///
/// The four corners of the rectangle's continuous extent are transformed
/// and their bounding box taken. Under rotation that bounding box is larger
/// than the rotated rectangle itself, so it is shrunk about its centre until
/// its area matches the rotated rectangle's area. The result is rounded
/// back to inclusive pixel corners.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectangleTransform {
    tform: PointTransformAffine,
}

impl RectangleTransform {
    pub const fn new(tform: PointTransformAffine) -> Self {
        Self { tform }
    }

    pub fn apply(&self, r: &Rect) -> Rect {
        if r.is_empty() {
            return Rect::default();
        }

        let (l, t) = (r.left as f64 - 0.5, r.top as f64 - 0.5);
        let (rr, b) = (r.right as f64 + 0.5, r.bottom as f64 + 0.5);
        let tl = self.tform.apply(DPoint::new(l, t));
        let tr = self.tform.apply(DPoint::new(rr, t));
        let bl = self.tform.apply(DPoint::new(l, b));
        let br = self.tform.apply(DPoint::new(rr, b));

        let min_x = tl.x.min(tr.x).min(bl.x).min(br.x);
        let max_x = tl.x.max(tr.x).max(bl.x).max(br.x);
        let min_y = tl.y.min(tr.y).min(bl.y).min(br.y);
        let max_y = tl.y.max(tr.y).max(bl.y).max(br.y);

        let (bbox_w, bbox_h) = (max_x - min_x, max_y - min_y);
        let target_area = (tr - tl).length() * (bl - tl).length();
        let bbox_area = bbox_w * bbox_h;
        let shrink = if bbox_area > 0.0 {
            (target_area / bbox_area).sqrt()
        } else {
            1.0
        };

        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let half_w = bbox_w * shrink / 2.0;
        let half_h = bbox_h * shrink / 2.0;

        Rect::new(
            (cx - half_w + 0.5).round() as i64,
            (cy - half_h + 0.5).round() as i64,
            (cx + half_w - 0.5).round() as i64,
            (cy + half_h - 0.5).round() as i64,
        )
    }
}
