//! View transform between world and screen coordinates.

use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;
/// Scale applied per wheel notch.
pub const WHEEL_ZOOM_STEP: f64 = 1.05;

/// Pan offset and uniform zoom of the board view.
///
/// A world point `p` appears on screen at `offset + p * zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Screen-space translation.
    pub offset: Vec2,
    /// Uniform scale, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Screen to world.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Multiply the zoom by `factor`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let anchor = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        self.offset = screen_point.to_vec2() - anchor.to_vec2() * new_zoom;
    }

    /// Zoom one wheel notch at `screen_point`. Positive `delta_y` zooms in.
    pub fn wheel_zoom(&mut self, screen_point: Point, delta_y: f64) {
        if delta_y > 0.0 {
            self.zoom_at(screen_point, WHEEL_ZOOM_STEP);
        } else if delta_y < 0.0 {
            self.zoom_at(screen_point, 1.0 / WHEEL_ZOOM_STEP);
        }
    }

    /// Zoom as a whole percentage for display.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Back to the identity view.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Centre `bounds` in `viewport`, scaled to fit inside `padding` on every side.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            // Nothing to scale against; just centre it.
            self.zoom = 1.0;
        } else {
            let available = Size::new(
                (viewport.width - padding * 2.0).max(1.0),
                (viewport.height - padding * 2.0).max(1.0),
            );
            let scale = (available.width / bounds.width()).min(available.height / bounds.height());
            self.zoom = scale.clamp(MIN_ZOOM, MAX_ZOOM);
        }

        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        self.offset = viewport_center.to_vec2() - bounds.center().to_vec2() * self.zoom;
    }
}
