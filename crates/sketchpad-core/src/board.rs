//! The board: committed strokes, shapes and images plus undo history.

use crate::shapes::{PlacedImage, Shape, ShapeId, ShapeTrait, Stroke};
use kurbo::{Point, Rect};

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Index into one of the entity lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Stroke(usize),
    Shape(usize),
    Image(usize),
}

/// A committed entity, borrowed from the board.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Stroke(&'a Stroke),
    Shape(&'a Shape),
    Image(&'a PlacedImage),
}

impl Entity<'_> {
    pub fn id(&self) -> ShapeId {
        match self {
            Entity::Stroke(stroke) => stroke.id(),
            Entity::Shape(shape) => shape.id(),
            Entity::Image(image) => image.id(),
        }
    }
}

/// A snapshot of board contents for undo/redo.
#[derive(Debug, Clone)]
struct BoardSnapshot {
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
    images: Vec<PlacedImage>,
    order: Vec<Slot>,
}

/// Everything drawn so far.
///
/// Each kind has its own list; `order` records the stacking order across
/// all of them, bottom first.
#[derive(Debug, Clone, Default)]
pub struct Board {
    strokes: Vec<Stroke>,
    shapes: Vec<Shape>,
    images: Vec<PlacedImage>,
    order: Vec<Slot>,
    undo_stack: Vec<BoardSnapshot>,
    redo_stack: Vec<BoardSnapshot>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn images(&self) -> &[PlacedImage] {
        &self.images
    }

    pub fn commit_stroke(&mut self, stroke: Stroke) {
        log::debug!("Committed stroke {} ({} points)", stroke.id(), stroke.len());
        self.order.push(Slot::Stroke(self.strokes.len()));
        self.strokes.push(stroke);
    }

    pub fn commit_shape(&mut self, shape: Shape) {
        log::debug!("Committed {:?} {}", shape.kind, shape.id());
        self.order.push(Slot::Shape(self.shapes.len()));
        self.shapes.push(shape);
    }

    pub fn add_image(&mut self, image: PlacedImage) {
        log::debug!("Placed image {} at {:?}", image.id(), image.position);
        self.order.push(Slot::Image(self.images.len()));
        self.images.push(image);
    }

    fn resolve(&self, slot: Slot) -> Option<Entity<'_>> {
        match slot {
            Slot::Stroke(index) => self.strokes.get(index).map(Entity::Stroke),
            Slot::Shape(index) => self.shapes.get(index).map(Entity::Shape),
            Slot::Image(index) => self.images.get(index).map(Entity::Image),
        }
    }

    /// All entities in stacking order, bottom first.
    pub fn entities(&self) -> impl DoubleEndedIterator<Item = Entity<'_>> + '_ {
        self.order.iter().filter_map(|slot| self.resolve(*slot))
    }

    /// Topmost image containing the world point.
    pub fn image_at(&self, point: Point) -> Option<ShapeId> {
        self.entities().rev().find_map(|entity| match entity {
            Entity::Image(image) if image.contains(point) => Some(image.id()),
            _ => None,
        })
    }

    /// Move image `id` to the top of the stacking order.
    pub fn raise_image(&mut self, id: ShapeId) -> bool {
        let Some(index) = self.images.iter().position(|image| image.id() == id) else {
            return false;
        };
        self.order.retain(|slot| *slot != Slot::Image(index));
        self.order.push(Slot::Image(index));
        true
    }

    pub fn image(&self, id: ShapeId) -> Option<&PlacedImage> {
        self.images.iter().find(|image| image.id() == id)
    }

    pub fn image_mut(&mut self, id: ShapeId) -> Option<&mut PlacedImage> {
        self.images.iter_mut().find(|image| image.id() == id)
    }

    /// Remove everything. History is kept so a clear can be undone.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.shapes.clear();
        self.images.clear();
        self.order.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.shapes.is_empty() && self.images.is_empty()
    }

    /// Number of committed entities.
    pub fn len(&self) -> usize {
        self.strokes.len() + self.shapes.len() + self.images.len()
    }

    /// Union of all entity bounds.
    pub fn bounds(&self) -> Option<Rect> {
        let strokes = self.strokes.iter().map(ShapeTrait::bounds);
        let shapes = self.shapes.iter().map(ShapeTrait::bounds);
        let images = self.images.iter().map(ShapeTrait::bounds);
        strokes
            .chain(shapes)
            .chain(images)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            strokes: self.strokes.clone(),
            shapes: self.shapes.clone(),
            images: self.images.clone(),
            order: self.order.clone(),
        }
    }

    fn restore(&mut self, snapshot: BoardSnapshot) {
        self.strokes = snapshot.strokes;
        self.shapes = snapshot.shapes;
        self.images = snapshot.images;
        self.order = snapshot.order;
    }

    /// Push current state to undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        let snapshot = self.snapshot();
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.redo_stack.push(current);
        self.restore(snapshot);
        true
    }

    /// Redo the last undone change. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = self.snapshot();
        self.undo_stack.push(current);
        self.restore(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RasterImage, Rgba, ShapeKind, StrokeTool};
    use std::sync::Arc;

    fn stroke_at(x: f64) -> Stroke {
        let mut stroke = Stroke::new(StrokeTool::Pen, Point::new(x, 0.0), Rgba::black(), 2.0);
        stroke.push_point(Point::new(x + 10.0, 10.0));
        stroke
    }

    fn image_at(x: f64, y: f64, size: u32) -> PlacedImage {
        let raster = RasterImage::from_rgba(size, size, vec![0; (size * size * 4) as usize]).unwrap();
        PlacedImage::new(Point::new(x, y), Arc::new(raster))
    }

    #[test]
    fn test_commit_preserves_order() {
        let mut board = Board::new();
        let first = stroke_at(0.0);
        let second = stroke_at(50.0);
        let (first_id, second_id) = (first.id(), second.id());
        board.commit_stroke(first);
        board.commit_stroke(second);

        let ids: Vec<_> = board.strokes().iter().map(|s| s.id()).collect();
        assert_eq!(ids, vec![first_id, second_id]);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_entities_follow_commit_order() {
        let mut board = Board::new();
        let stroke = stroke_at(0.0);
        let shape = Shape::new(ShapeKind::Circle, Point::ZERO, Rgba::black(), 2.0);
        let image = image_at(0.0, 0.0, 10);
        let second_stroke = stroke_at(20.0);
        let expected = vec![stroke.id(), image.id(), shape.id(), second_stroke.id()];

        board.commit_stroke(stroke);
        board.add_image(image);
        board.commit_shape(shape);
        board.commit_stroke(second_stroke);

        let ids: Vec<_> = board.entities().map(|e| e.id()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_raise_image_moves_it_to_the_top() {
        let mut board = Board::new();
        let image = image_at(0.0, 0.0, 10);
        let stroke = stroke_at(0.0);
        let (image_id, stroke_id) = (image.id(), stroke.id());
        board.add_image(image);
        board.commit_stroke(stroke);

        assert!(board.raise_image(image_id));
        let ids: Vec<_> = board.entities().map(|e| e.id()).collect();
        assert_eq!(ids, vec![stroke_id, image_id]);
        assert!(!board.raise_image(stroke_id));
    }

    #[test]
    fn test_undo_restores_stacking_order() {
        let mut board = Board::new();
        let below = image_at(0.0, 0.0, 100);
        let above = image_at(0.0, 0.0, 100);
        let (below_id, above_id) = (below.id(), above.id());
        board.add_image(below);
        board.add_image(above);

        board.push_undo();
        board.raise_image(below_id);
        assert_eq!(board.image_at(Point::new(5.0, 5.0)), Some(below_id));

        board.undo();
        assert_eq!(board.image_at(Point::new(5.0, 5.0)), Some(above_id));
        assert_eq!(board.entities().count(), 2);
    }

    #[test]
    fn test_image_at_prefers_topmost() {
        let mut board = Board::new();
        let below = image_at(0.0, 0.0, 100);
        let above = image_at(50.0, 50.0, 100);
        let (below_id, above_id) = (below.id(), above.id());
        board.add_image(below);
        board.add_image(above);

        assert_eq!(board.image_at(Point::new(75.0, 75.0)), Some(above_id));
        assert_eq!(board.image_at(Point::new(10.0, 10.0)), Some(below_id));
        assert_eq!(board.image_at(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_bounds_cover_every_list() {
        let mut board = Board::new();
        assert!(board.bounds().is_none());

        board.commit_stroke(stroke_at(0.0));
        let mut shape = Shape::new(ShapeKind::Rectangle, Point::new(100.0, 100.0), Rgba::black(), 2.0);
        shape.resize_to(Point::new(200.0, 150.0));
        board.commit_shape(shape);
        board.add_image(image_at(-50.0, -50.0, 20));

        let bounds = board.bounds().unwrap();
        assert!((bounds.x0 + 50.0).abs() < f64::EPSILON);
        assert!((bounds.y0 + 50.0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 200.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_undo_redo() {
        let mut board = Board::new();
        assert!(!board.undo());

        board.push_undo();
        board.commit_stroke(stroke_at(0.0));
        assert!(board.can_undo());

        assert!(board.undo());
        assert!(board.is_empty());
        assert!(board.can_redo());

        assert!(board.redo());
        assert_eq!(board.strokes().len(), 1);
        assert!(!board.redo());
    }

    #[test]
    fn test_new_change_clears_redo() {
        let mut board = Board::new();
        board.push_undo();
        board.commit_stroke(stroke_at(0.0));
        board.undo();
        assert!(board.can_redo());

        board.push_undo();
        board.commit_stroke(stroke_at(10.0));
        assert!(!board.can_redo());
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut board = Board::new();
        board.commit_stroke(stroke_at(0.0));
        board.add_image(image_at(0.0, 0.0, 10));

        board.push_undo();
        board.clear();
        assert!(board.is_empty());

        board.undo();
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_history_is_capped() {
        let mut board = Board::new();
        for i in 0..(MAX_UNDO_HISTORY + 10) {
            board.push_undo();
            board.commit_stroke(stroke_at(i as f64));
        }

        let mut undone = 0;
        while board.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_UNDO_HISTORY);
        assert_eq!(board.strokes().len(), 10);
    }

    #[test]
    fn test_snapshots_share_pixels() {
        let mut board = Board::new();
        let image = image_at(0.0, 0.0, 10);
        let pixels = Arc::clone(&image.pixels);
        board.add_image(image);

        board.push_undo();
        board.clear();
        board.undo();

        assert!(Arc::ptr_eq(&board.images()[0].pixels, &pixels));
    }
}
