//! Renderer trait abstraction.

use kurbo::Size;
use peniko::Color;
use sketchpad_core::canvas::Canvas;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Initialization failed: {0}")]
    InitFailed(String),
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Surface error: {0}")]
    Surface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Viewport size in physical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Surface clear color; eraser strokes paint with it too.
    pub background_color: Color,
}

impl<'a> RenderContext<'a> {
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the drawing commands for a frame. Called once per frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RendererError::Surface("creation failed: Lost".into());
        assert_eq!(err.to_string(), "Surface error: creation failed: Lost");
        let err = RendererError::InitFailed("render context missing".into());
        assert_eq!(err.to_string(), "Initialization failed: render context missing");
    }

    #[test]
    fn test_context_defaults() {
        let canvas = Canvas::new();
        let ctx = RenderContext::new(&canvas, Size::new(10.0, 10.0))
            .with_scale_factor(2.0)
            .with_background(Color::BLACK);
        assert_eq!(ctx.scale_factor, 2.0);
        assert_eq!(ctx.background_color.to_rgba8(), Color::BLACK.to_rgba8());
    }
}
