//! Freehand stroke recorded by the pen and eraser tools.

use super::{Rgba, ShapeId, ShapeTrait};
use kurbo::{BezPath, Point, Rect};
use uuid::Uuid;

/// Which tool recorded a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrokeTool {
    /// Paints in the stroke color.
    Pen,
    /// Paints in the background color over whatever lies beneath it.
    Eraser,
}

/// A freehand path (ordered series of world points).
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub(crate) id: ShapeId,
    /// Tool that recorded this stroke.
    pub tool: StrokeTool,
    /// Points in pointer order.
    points: Vec<Point>,
    /// Stroke color (ignored for eraser strokes).
    pub color: Rgba,
    /// Stroke width in world units.
    pub width: f64,
}

impl Stroke {
    /// Start a stroke at `start`.
    pub fn new(tool: StrokeTool, start: Point, color: Rgba, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            points: vec![start],
            color,
            width,
        }
    }

    /// Append a point to the path.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Points recorded so far.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if the stroke is a single dot (no movement after pointer down).
    pub fn is_dot(&self) -> bool {
        match self.points.split_first() {
            Some((first, rest)) => rest.iter().all(|p| p == first),
            None => false,
        }
    }

    pub fn is_eraser(&self) -> bool {
        self.tool == StrokeTool::Eraser
    }
}

impl ShapeTrait for Stroke {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };

        let tight = self
            .points
            .iter()
            .fold(Rect::from_points(*first, *first), |acc, p| acc.union_pt(*p));
        let half = self.width / 2.0;
        tight.inflate(half, half)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some((first, rest)) = self.points.split_first() else {
            return path;
        };

        path.move_to(*first);
        for point in rest {
            path.line_to(*point);
        }

        path
    }
}
