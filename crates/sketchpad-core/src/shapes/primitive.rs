//! Rectangle and circle primitives defined by a bounding box.

use super::{Rgba, ShapeId, ShapeTrait};
use kurbo::{BezPath, Circle, Point, Rect, Shape as KurboShape};
use uuid::Uuid;

/// Kind of bounding-box primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    /// Circle inscribed in the box, centred, diameter = shorter side.
    Circle,
}

/// A rectangle or circle spanning from `origin` by a signed width and height.
///
/// The size stays signed while the shape is being dragged out so the anchor
/// corner never moves; `rect()` gives the normalised box.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub(crate) id: ShapeId,
    pub kind: ShapeKind,
    /// Corner where the drag started.
    pub origin: Point,
    /// Signed horizontal extent from `origin`.
    pub width: f64,
    /// Signed vertical extent from `origin`.
    pub height: f64,
    /// Outline color.
    pub color: Rgba,
    /// Outline width.
    pub stroke_width: f64,
}

impl Shape {
    /// Create a zero-sized shape anchored at `origin`.
    pub fn new(kind: ShapeKind, origin: Point, color: Rgba, stroke_width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            origin,
            width: 0.0,
            height: 0.0,
            color,
            stroke_width,
        }
    }

    /// Stretch the shape so its far corner sits at `point`.
    pub fn resize_to(&mut self, point: Point) {
        self.width = point.x - self.origin.x;
        self.height = point.y - self.origin.y;
    }

    /// The normalised bounding box.
    pub fn rect(&self) -> Rect {
        Rect::from_points(
            self.origin,
            Point::new(self.origin.x + self.width, self.origin.y + self.height),
        )
    }

    /// The circle for `ShapeKind::Circle`, inscribed in `rect()`.
    pub fn circle(&self) -> Circle {
        let rect = self.rect();
        let radius = rect.width().min(rect.height()) / 2.0;
        Circle::new(rect.center(), radius)
    }

    /// Shapes smaller than this in both directions are treated as stray clicks.
    pub fn is_degenerate(&self) -> bool {
        self.width.abs() <= 1.0 && self.height.abs() <= 1.0
    }
}

impl ShapeTrait for Shape {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        match self.kind {
            ShapeKind::Rectangle => self.rect(),
            ShapeKind::Circle => self.circle().bounding_box(),
        }
    }

    fn to_path(&self) -> BezPath {
        match self.kind {
            ShapeKind::Rectangle => self.rect().to_path(0.1),
            ShapeKind::Circle => self.circle().to_path(0.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(kind: ShapeKind, origin: Point) -> Shape {
        Shape::new(kind, origin, Rgba::black(), 2.0)
    }

    #[test]
    fn test_new_shape_is_degenerate() {
        let rect = shape(ShapeKind::Rectangle, Point::new(10.0, 20.0));
        assert!(rect.is_degenerate());
        assert_eq!(rect.rect(), Rect::new(10.0, 20.0, 10.0, 20.0));
    }

    #[test]
    fn test_resize_keeps_signed_extent() {
        let mut rect = shape(ShapeKind::Rectangle, Point::new(100.0, 100.0));
        rect.resize_to(Point::new(50.0, 150.0));
        assert!((rect.width + 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(rect.origin, Point::new(100.0, 100.0));
    }

    #[test]
    fn test_rect_is_normalised() {
        let mut rect = shape(ShapeKind::Rectangle, Point::new(100.0, 100.0));
        rect.resize_to(Point::new(50.0, 50.0));
        assert_eq!(rect.rect(), Rect::new(50.0, 50.0, 100.0, 100.0));
        assert_eq!(rect.bounds(), Rect::new(50.0, 50.0, 100.0, 100.0));
    }

    #[test]
    fn test_circle_uses_shorter_side() {
        let mut circle = shape(ShapeKind::Circle, Point::ZERO);
        circle.resize_to(Point::new(100.0, 40.0));
        let c = circle.circle();
        assert_eq!(c.center, Point::new(50.0, 20.0));
        assert!((c.radius - 20.0).abs() < f64::EPSILON);

        let bounds = circle.bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-9);
        assert!((bounds.height() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_drag_is_degenerate() {
        let mut rect = shape(ShapeKind::Rectangle, Point::ZERO);
        rect.resize_to(Point::new(0.5, -1.0));
        assert!(rect.is_degenerate());
        rect.resize_to(Point::new(0.5, -1.5));
        assert!(!rect.is_degenerate());
    }
}
