//! Tool selection and the in-progress gesture.

use crate::shapes::{Rgba, Shape, ShapeId, ShapeKind, Stroke, StrokeTool};
use kurbo::{Point, Vec2};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Rectangle,
    Circle,
    Hand,
    Image,
}

impl ToolKind {
    /// Toolbar order.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Pen,
        ToolKind::Eraser,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Hand,
        ToolKind::Image,
    ];

    /// Lowercase identifier used in URLs and logs.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pen => "pen",
            ToolKind::Eraser => "eraser",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Hand => "hand",
            ToolKind::Image => "image",
        }
    }

    /// Toolbar label.
    pub fn label(&self) -> &'static str {
        match self {
            ToolKind::Pen => "Pen",
            ToolKind::Eraser => "Eraser",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Hand => "Hand",
            ToolKind::Image => "Image",
        }
    }

    /// Parse a tool name, case-insensitively. Accepts a few common aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pen" | "pencil" | "freehand" => Some(ToolKind::Pen),
            "eraser" => Some(ToolKind::Eraser),
            "rectangle" | "rect" => Some(ToolKind::Rectangle),
            "circle" => Some(ToolKind::Circle),
            "hand" | "pan" => Some(ToolKind::Hand),
            "image" => Some(ToolKind::Image),
            _ => None,
        }
    }

    /// The stroke tag for tools that record freehand strokes.
    pub fn stroke_tool(&self) -> Option<StrokeTool> {
        match self {
            ToolKind::Pen => Some(StrokeTool::Pen),
            ToolKind::Eraser => Some(StrokeTool::Eraser),
            _ => None,
        }
    }

    /// The primitive drawn by bounding-box tools.
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            _ => None,
        }
    }
}

/// Style applied to newly drawn entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolSettings {
    pub pen_color: Rgba,
    pub pen_width: f64,
    pub eraser_width: f64,
    pub shape_color: Rgba,
    pub shape_stroke_width: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pen_color: Rgba::new(0xdf, 0x4b, 0x26, 0xff),
            pen_width: 5.0,
            eraser_width: 20.0,
            shape_color: Rgba::black(),
            shape_stroke_width: 2.0,
        }
    }
}

/// The interaction in progress between pointer down and pointer up.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    /// Recording a pen or eraser stroke.
    Drawing { stroke: Stroke },
    /// Sizing a rectangle or circle.
    Shaping { shape: Shape },
    /// Panning the camera.
    Panning { last_screen: Point },
    /// Repositioning a placed image.
    DraggingImage {
        id: ShapeId,
        last_world: Point,
        /// Where the image was when the drag started.
        start_position: Point,
        moved: bool,
    },
}

/// Side effect of advancing a gesture that the owner must apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// Pan the camera by a screen delta.
    Pan(Vec2),
    /// Move an image by a world delta.
    MoveImage { id: ShapeId, delta: Vec2 },
}

/// What a finished gesture produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Committed {
    Stroke(Stroke),
    Shape(Shape),
    /// An image drag ended away from where it started.
    ImageMoved { id: ShapeId, from: Point },
}

/// Manages the current tool and its gesture.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    pub settings: ToolSettings,
    gesture: Gesture,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ToolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Switch tools, dropping any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) -> Gesture {
        if tool != self.current_tool {
            log::debug!("Tool changed: {} -> {}", self.current_tool.name(), tool.name());
        }
        self.current_tool = tool;
        self.cancel()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Start a stroke at a world point.
    pub fn begin_stroke(&mut self, tool: StrokeTool, world: Point) {
        let (color, width) = match tool {
            StrokeTool::Pen => (self.settings.pen_color, self.settings.pen_width),
            StrokeTool::Eraser => (self.settings.pen_color, self.settings.eraser_width),
        };
        self.gesture = Gesture::Drawing {
            stroke: Stroke::new(tool, world, color, width),
        };
    }

    /// Anchor a zero-sized shape at a world point.
    pub fn begin_shape(&mut self, kind: ShapeKind, world: Point) {
        self.gesture = Gesture::Shaping {
            shape: Shape::new(
                kind,
                world,
                self.settings.shape_color,
                self.settings.shape_stroke_width,
            ),
        };
    }

    pub fn begin_pan(&mut self, screen: Point) {
        self.gesture = Gesture::Panning {
            last_screen: screen,
        };
    }

    /// Start dragging image `id`, currently at `position`, grabbed at `world`.
    pub fn begin_image_drag(&mut self, id: ShapeId, world: Point, position: Point) {
        self.gesture = Gesture::DraggingImage {
            id,
            last_world: world,
            start_position: position,
            moved: false,
        };
    }

    /// Advance the gesture to a new pointer position.
    pub fn update(&mut self, world: Point, screen: Point) -> Option<GestureEffect> {
        match &mut self.gesture {
            Gesture::Idle => None,
            Gesture::Drawing { stroke } => {
                stroke.push_point(world);
                None
            }
            Gesture::Shaping { shape } => {
                shape.resize_to(world);
                None
            }
            Gesture::Panning { last_screen } => {
                let delta = screen - *last_screen;
                *last_screen = screen;
                Some(GestureEffect::Pan(delta))
            }
            Gesture::DraggingImage {
                id,
                last_world,
                moved,
                ..
            } => {
                let delta = world - *last_world;
                *last_world = world;
                if delta == Vec2::ZERO {
                    return None;
                }
                *moved = true;
                Some(GestureEffect::MoveImage { id: *id, delta })
            }
        }
    }

    /// End the gesture, returning whatever should be recorded on the board.
    pub fn finish(&mut self) -> Option<Committed> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => None,
            Gesture::Drawing { stroke } => Some(Committed::Stroke(stroke)),
            Gesture::Shaping { shape } => {
                if shape.is_degenerate() {
                    log::debug!("Dropped degenerate {:?}", shape.kind);
                    None
                } else {
                    Some(Committed::Shape(shape))
                }
            }
            Gesture::DraggingImage {
                id,
                start_position,
                moved,
                ..
            } => moved.then_some(Committed::ImageMoved {
                id,
                from: start_position,
            }),
        }
    }

    /// Drop the gesture without committing anything, returning it.
    pub fn cancel(&mut self) -> Gesture {
        std::mem::take(&mut self.gesture)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    /// Image being dragged, drawn above everything until the drag ends.
    pub fn dragged_image(&self) -> Option<ShapeId> {
        match &self.gesture {
            Gesture::DraggingImage { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Stroke being recorded, for live preview.
    pub fn preview_stroke(&self) -> Option<&Stroke> {
        match &self.gesture {
            Gesture::Drawing { stroke } => Some(stroke),
            _ => None,
        }
    }

    /// Shape being sized, for live preview.
    pub fn preview_shape(&self) -> Option<&Shape> {
        match &self.gesture {
            Gesture::Shaping { shape } => Some(shape),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(tool.name()), Some(tool));
        }
        assert_eq!(ToolKind::from_name("PAN"), Some(ToolKind::Hand));
        assert_eq!(ToolKind::from_name("lasso"), None);
        assert_eq!(ToolKind::default(), ToolKind::Pen);
    }

    #[test]
    fn test_default_settings() {
        let settings = ToolSettings::default();
        assert_eq!(Some(settings.pen_color), Rgba::from_hex("#df4b26"));
        assert!((settings.pen_width - 5.0).abs() < f64::EPSILON);
        assert!((settings.eraser_width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut tm = ToolManager::new();
        assert!(!tm.is_active());

        tm.begin_stroke(StrokeTool::Pen, Point::new(0.0, 0.0));
        assert!(tm.is_active());
        tm.update(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        tm.update(Point::new(10.0, 0.0), Point::new(10.0, 0.0));
        assert_eq!(tm.preview_stroke().map(Stroke::len), Some(3));
        assert!(tm.preview_shape().is_none());

        let Some(Committed::Stroke(stroke)) = tm.finish() else {
            panic!("expected a stroke");
        };
        assert_eq!(stroke.len(), 3);
        assert!((stroke.width - 5.0).abs() < f64::EPSILON);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_eraser_uses_eraser_width() {
        let mut tm = ToolManager::new();
        tm.begin_stroke(StrokeTool::Eraser, Point::ZERO);
        let stroke = tm.preview_stroke().unwrap();
        assert!(stroke.is_eraser());
        assert!((stroke.width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_single_point_stroke_commits() {
        let mut tm = ToolManager::new();
        tm.begin_stroke(StrokeTool::Pen, Point::new(3.0, 4.0));
        assert!(matches!(tm.finish(), Some(Committed::Stroke(s)) if s.is_dot()));
    }

    #[test]
    fn test_shape_lifecycle() {
        let mut tm = ToolManager::new();
        tm.begin_shape(ShapeKind::Rectangle, Point::new(10.0, 10.0));
        tm.update(Point::new(60.0, 40.0), Point::ZERO);
        assert_eq!(
            tm.preview_shape().map(Shape::rect),
            Some(kurbo::Rect::new(10.0, 10.0, 60.0, 40.0))
        );

        let Some(Committed::Shape(shape)) = tm.finish() else {
            panic!("expected a shape");
        };
        assert_eq!(shape.kind, ShapeKind::Rectangle);
        assert!((shape.stroke_width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degenerate_shape_dropped() {
        let mut tm = ToolManager::new();
        tm.begin_shape(ShapeKind::Circle, Point::new(10.0, 10.0));
        tm.update(Point::new(10.5, 11.0), Point::ZERO);
        assert_eq!(tm.finish(), None);
        assert!(!tm.is_active());
    }

    #[test]
    fn test_pan_reports_screen_deltas() {
        let mut tm = ToolManager::new();
        tm.begin_pan(Point::new(100.0, 100.0));
        assert_eq!(
            tm.update(Point::ZERO, Point::new(110.0, 95.0)),
            Some(GestureEffect::Pan(Vec2::new(10.0, -5.0)))
        );
        assert_eq!(
            tm.update(Point::ZERO, Point::new(112.0, 95.0)),
            Some(GestureEffect::Pan(Vec2::new(2.0, 0.0)))
        );
        assert_eq!(tm.finish(), None);
    }

    #[test]
    fn test_image_drag_reports_world_deltas() {
        let mut tm = ToolManager::new();
        let id = Uuid::new_v4();
        tm.begin_image_drag(id, Point::new(50.0, 50.0), Point::new(0.0, 0.0));
        assert_eq!(tm.dragged_image(), Some(id));

        assert_eq!(tm.update(Point::new(50.0, 50.0), Point::ZERO), None);
        assert_eq!(
            tm.update(Point::new(70.0, 40.0), Point::ZERO),
            Some(GestureEffect::MoveImage {
                id,
                delta: Vec2::new(20.0, -10.0)
            })
        );
        assert_eq!(
            tm.finish(),
            Some(Committed::ImageMoved {
                id,
                from: Point::ZERO
            })
        );
        assert_eq!(tm.dragged_image(), None);
    }

    #[test]
    fn test_image_click_without_move_commits_nothing() {
        let mut tm = ToolManager::new();
        tm.begin_image_drag(Uuid::new_v4(), Point::ZERO, Point::ZERO);
        assert_eq!(tm.finish(), None);
    }

    #[test]
    fn test_set_tool_cancels_gesture() {
        let mut tm = ToolManager::new();
        tm.begin_stroke(StrokeTool::Pen, Point::ZERO);
        let dropped = tm.set_tool(ToolKind::Rectangle);
        assert!(matches!(dropped, Gesture::Drawing { .. }));
        assert!(!tm.is_active());
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
    }

    #[test]
    fn test_tool_categories() {
        assert_eq!(ToolKind::Eraser.stroke_tool(), Some(StrokeTool::Eraser));
        assert_eq!(ToolKind::Circle.shape_kind(), Some(ShapeKind::Circle));
        assert_eq!(ToolKind::Hand.stroke_tool(), None);
        assert_eq!(ToolKind::Image.shape_kind(), None);
    }
}
