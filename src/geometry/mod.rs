//! Geometric primitives.
//!
//! The same [`Rect`] type is used in two spaces: canvas pixels (origin at the
//! top-left, y grows downward) and document points (origin at the
//! bottom-left, y grows upward). Which one a value lives in is stated by the
//! API that produces it; the calibrator converts between them.

use serde::{Deserialize, Serialize};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_form_designer::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(&self, other: Point) -> (f32, f32) {
        (self.x - other.x, self.y - other.y)
    }
}

/// Width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Size {
    /// Create a new size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle given by its origin corner and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the origin corner
    pub x: f32,
    /// Y coordinate of the origin corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_form_designer::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    /// assert_eq!(rect.right(), 100.0);
    /// assert_eq!(rect.bottom(), 50.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Origin corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Dimensions.
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the far edge y-coordinate (`y + height`).
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether `p` lies inside the rectangle (edges inclusive).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Corner coordinates `[x0, y0, x1, y1]`, the layout of a PDF `/Rect`.
    pub fn corners(&self) -> [f32; 4] {
        [self.x, self.y, self.right(), self.bottom()]
    }

    /// Approximate equality, for values that went through float arithmetic.
    pub fn approx_eq(&self, other: &Rect, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Clamp a coordinate so that a span of `extent` starting there stays in `[0, limit]`.
///
/// When the span is larger than the limit the coordinate pins to 0.
pub fn clamp_span(value: f32, extent: f32, limit: f32) -> f32 {
    value.min(limit - extent).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges_and_corners() {
        let r = Rect::new(10.0, 20.0, 150.0, 30.0);
        assert_eq!(r.right(), 160.0);
        assert_eq!(r.bottom(), 50.0);
        assert_eq!(r.corners(), [10.0, 20.0, 160.0, 50.0]);
        assert_eq!(r.origin(), Point::new(10.0, 20.0));
        assert_eq!(r.size(), Size::new(150.0, 30.0));
    }

    #[test]
    fn test_contains_is_edge_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(10.0, 0.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_clamp_span() {
        assert_eq!(clamp_span(-5.0, 150.0, 816.0), 0.0);
        assert_eq!(clamp_span(700.0, 150.0, 816.0), 666.0);
        assert_eq!(clamp_span(100.0, 150.0, 816.0), 100.0);
        assert_eq!(clamp_span(10.0, 900.0, 816.0), 0.0);
    }

    #[test]
    fn test_point_delta() {
        assert_eq!(Point::new(5.0, 7.0).delta_from(Point::new(2.0, 10.0)), (3.0, -3.0));
    }
}
