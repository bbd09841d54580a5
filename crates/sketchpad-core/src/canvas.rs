//! Canvas state: board, camera, tools and input behind one event API.

use crate::board::Board;
use crate::camera::Camera;
use crate::input::{InputState, PointerButton, PointerEvent};
use crate::shapes::{MAX_IMAGE_SIZE, PlacedImage, RasterImage, ShapeId, ShapeTrait};
use crate::tools::{Committed, Gesture, GestureEffect, ToolKind, ToolManager, ToolSettings};
use kurbo::{Point, Size};
use std::sync::Arc;

/// Zoom factor for the toolbar zoom buttons.
const BUTTON_ZOOM_STEP: f64 = 1.25;
/// Screen padding kept around content by `fit_to_content`.
const FIT_PADDING: f64 = 50.0;

/// Runtime canvas state (not persisted).
#[derive(Debug, Clone)]
pub struct Canvas {
    pub board: Board,
    pub camera: Camera,
    pub tool_manager: ToolManager,
    pub input: InputState,
    /// Drawing surface size in physical pixels.
    pub viewport_size: Size,
    /// Button that started the current gesture.
    active_button: Option<PointerButton>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_settings(ToolSettings::default())
    }

    pub fn with_settings(settings: ToolSettings) -> Self {
        Self {
            board: Board::new(),
            camera: Camera::new(),
            tool_manager: ToolManager::with_settings(settings),
            input: InputState::new(),
            viewport_size: Size::new(800.0, 600.0),
            active_button: None,
        }
    }

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0)
    }

    pub fn tool(&self) -> ToolKind {
        self.tool_manager.current_tool
    }

    /// Switch tools. A gesture in progress is cancelled.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let dropped = self.tool_manager.set_tool(tool);
        self.discard(dropped);
    }

    /// A pointer button was pressed at the last known position.
    pub fn pointer_down(&mut self, button: PointerButton) {
        if self.tool_manager.is_active() {
            return;
        }
        let Some(screen) = self.input.pointer_position else {
            return;
        };
        let world = self.camera.screen_to_world(screen);

        match (button, self.tool()) {
            (PointerButton::Middle, _) | (PointerButton::Primary, ToolKind::Hand) => {
                self.tool_manager.begin_pan(screen);
            }
            (PointerButton::Primary, ToolKind::Pen | ToolKind::Eraser) => {
                if let Some(stroke_tool) = self.tool().stroke_tool() {
                    self.tool_manager.begin_stroke(stroke_tool, world);
                }
            }
            (PointerButton::Primary, ToolKind::Rectangle | ToolKind::Circle) => {
                if let Some(kind) = self.tool().shape_kind() {
                    self.tool_manager.begin_shape(kind, world);
                }
            }
            (PointerButton::Primary, ToolKind::Image) => {
                let Some(image) = self
                    .board
                    .image_at(world)
                    .and_then(|id| self.board.image(id))
                else {
                    return;
                };
                let (id, position) = (image.id(), image.position);
                self.tool_manager.begin_image_drag(id, world, position);
            }
            (PointerButton::Secondary, _) => return,
        }

        self.active_button = Some(button);
    }

    /// The pointer moved to `screen`.
    pub fn pointer_move(&mut self, screen: Point) {
        self.input
            .handle_pointer_event(PointerEvent::Move { position: screen });

        let world = self.camera.screen_to_world(screen);
        match self.tool_manager.update(world, screen) {
            Some(GestureEffect::Pan(delta)) => self.camera.pan(delta),
            Some(GestureEffect::MoveImage { id, delta }) => {
                if let Some(image) = self.board.image_mut(id) {
                    image.move_by(delta);
                }
            }
            None => {}
        }
    }

    /// A pointer button was released. Only the button that started the
    /// gesture ends it.
    pub fn pointer_up(&mut self, button: PointerButton) {
        if self.active_button == Some(button) {
            self.finish_gesture();
        }
    }

    /// The cursor left the surface: treat it as a release at the last point.
    pub fn pointer_left(&mut self) {
        if self.tool_manager.is_active() {
            self.finish_gesture();
        }
        self.input.handle_pointer_event(PointerEvent::Left);
    }

    /// Zoom at the pointer, or at the viewport centre when the pointer is off the surface.
    pub fn wheel(&mut self, delta_y: f64) {
        let anchor = self
            .input
            .pointer_position
            .unwrap_or_else(|| self.viewport_center());
        self.camera.wheel_zoom(anchor, delta_y);
    }

    /// Abandon the gesture in progress.
    pub fn cancel(&mut self) {
        let dropped = self.tool_manager.cancel();
        self.discard(dropped);
    }

    fn discard(&mut self, gesture: Gesture) {
        self.active_button = None;
        if let Gesture::DraggingImage {
            id, start_position, ..
        } = gesture
        {
            self.set_image_position(id, start_position);
        }
    }

    fn finish_gesture(&mut self) {
        self.active_button = None;
        match self.tool_manager.finish() {
            Some(Committed::Stroke(stroke)) => {
                self.board.push_undo();
                self.board.commit_stroke(stroke);
            }
            Some(Committed::Shape(shape)) => {
                self.board.push_undo();
                self.board.commit_shape(shape);
            }
            Some(Committed::ImageMoved { id, from }) => {
                // Snapshot the pre-drag position so undo puts the image back.
                let Some(to) = self.board.image(id).map(|image| image.position) else {
                    return;
                };
                self.set_image_position(id, from);
                self.board.push_undo();
                self.set_image_position(id, to);
                self.board.raise_image(id);
            }
            None => {}
        }
    }

    fn set_image_position(&mut self, id: ShapeId, position: Point) {
        if let Some(image) = self.board.image_mut(id) {
            image.position = position;
        }
    }

    /// Place a decoded image centred on `screen` (viewport centre if `None`).
    pub fn insert_image(&mut self, raster: RasterImage, screen: Option<Point>) -> ShapeId {
        let (width, height) = (raster.width, raster.height);
        let center = self
            .camera
            .screen_to_world(screen.unwrap_or_else(|| self.viewport_center()));
        let image = PlacedImage::new(Point::ZERO, Arc::new(raster))
            .fit_within(MAX_IMAGE_SIZE, MAX_IMAGE_SIZE)
            .centered_at(center);
        let id = image.id();

        log::info!(
            "Inserted {}x{} image, displayed at {:.0}x{:.0}",
            width,
            height,
            image.width,
            image.height
        );
        self.board.push_undo();
        self.board.add_image(image);
        id
    }

    pub fn undo(&mut self) -> bool {
        self.cancel();
        let undone = self.board.undo();
        if undone {
            log::info!("Undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.cancel();
        let redone = self.board.redo();
        if redone {
            log::info!("Redo");
        }
        redone
    }

    /// Remove everything from the board (undoable).
    pub fn clear(&mut self) {
        self.cancel();
        if self.board.is_empty() {
            return;
        }
        self.board.push_undo();
        self.board.clear();
        log::info!("Cleared board");
    }

    pub fn zoom_in(&mut self) {
        let center = self.viewport_center();
        self.camera.zoom_at(center, BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        let center = self.viewport_center();
        self.camera.zoom_at(center, 1.0 / BUTTON_ZOOM_STEP);
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Fit the view to show everything on the board.
    pub fn fit_to_content(&mut self) {
        if let Some(bounds) = self.board.bounds() {
            self.camera
                .fit_to_bounds(bounds, self.viewport_size, FIT_PADDING);
        }
    }
}
