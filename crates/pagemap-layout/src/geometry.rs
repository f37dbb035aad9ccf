//! Axis-aligned rectangles.

use serde::Serialize;

/// Tolerance for coordinate comparisons.
pub(crate) const EPSILON: f64 = 1e-6;

/// Axis-aligned rectangle in diagram space, y growing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LayoutRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl LayoutRect {
    /// Rectangle with its top-left corner at `(x, y)`.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Horizontal center.
    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Vertical center.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Whether `other` lies entirely inside `self` (edges may touch).
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        other.x >= self.x - EPSILON
            && other.y >= self.y - EPSILON
            && other.right() <= self.right() + EPSILON
            && other.bottom() <= self.bottom() + EPSILON
    }

    /// Area shared by both rectangles.
    #[must_use]
    pub fn overlap_area(&self, other: &Self) -> f64 {
        let width = self.right().min(other.right()) - self.x.max(other.x);
        let height = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if width <= 0.0 || height <= 0.0 {
            return 0.0;
        }
        width * height
    }

    /// Bounding union of both rectangles.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_touching_rects_do_not_overlap() {
        let a = LayoutRect::new(0.0, 0.0, 10.0, 10.0);
        let b = LayoutRect::new(10.0, 0.0, 10.0, 10.0);

        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn test_overlap_area() {
        let a = LayoutRect::new(0.0, 0.0, 10.0, 10.0);
        let b = LayoutRect::new(5.0, 5.0, 10.0, 10.0);

        assert_eq!(a.overlap_area(&b), 25.0);
    }

    #[test]
    fn test_contains_and_union() {
        let outer = LayoutRect::new(0.0, 0.0, 100.0, 50.0);
        let inner = LayoutRect::new(10.0, 10.0, 20.0, 20.0);
        let far = LayoutRect::new(150.0, 60.0, 10.0, 10.0);

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&far));
        assert_eq!(outer.union(&far), LayoutRect::new(0.0, 0.0, 160.0, 70.0));
    }
}
