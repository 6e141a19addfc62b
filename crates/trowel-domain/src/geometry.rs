//! Bounding boxes in page coordinates

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in page coordinates.
///
/// `top` is smaller than `bottom` (the coordinate system grows downward, as
/// produced by the upstream PDF extractor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    /// Left edge
    pub x0: f64,
    /// Top edge
    pub top: f64,
    /// Right edge
    pub x1: f64,
    /// Bottom edge
    pub bottom: f64,
}

impl BBox {
    /// Center point of the rectangle as `(x, y)`.
    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Euclidean distance between the centers of two rectangles.
    pub fn center_distance(&self, other: &BBox) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}
