//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, Renderer};
use kurbo::{Affine, Cap, Circle, Join, Stroke as KurboStroke};
use peniko::{Blob, Color, Fill};
use sketchpad_core::board::Entity;
use sketchpad_core::shapes::{PlacedImage, Shape, ShapeId, ShapeTrait, Stroke};
use std::collections::HashMap;
use std::sync::Arc;
use vello::Scene;

/// Vello-based renderer for GPU-accelerated 2D graphics.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Decoded pixels uploaded as peniko images, keyed by image id.
    image_cache: HashMap<ShapeId, peniko::ImageData>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            image_cache: HashMap::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Number of images currently held in the cache.
    pub fn cached_images(&self) -> usize {
        self.image_cache.len()
    }

    fn render_image(&mut self, image: &PlacedImage, transform: Affine) {
        let image_data = self
            .image_cache
            .entry(image.id())
            .or_insert_with(|| peniko::ImageData {
                data: Blob::new(Arc::new(image.pixels.rgba.clone())),
                format: peniko::ImageFormat::Rgba8,
                width: image.pixels.width,
                height: image.pixels.height,
                alpha_type: peniko::ImageAlphaType::Alpha,
            })
            .clone();

        let bounds = image.bounds();
        let scale_x = bounds.width() / image_data.width as f64;
        let scale_y = bounds.height() / image_data.height as f64;
        let image_transform = transform
            * Affine::translate((bounds.x0, bounds.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        self.scene
            .draw_image(&peniko::ImageBrush::from(image_data), image_transform);
    }

    fn render_shape(&mut self, shape: &Shape, transform: Affine) {
        let stroke = KurboStroke::new(shape.stroke_width);
        let color: Color = shape.color.into();
        self.scene
            .stroke(&stroke, transform, color, None, &shape.to_path());
    }

    fn render_stroke(&mut self, stroke: &Stroke, transform: Affine, background: Color) {
        let color = if stroke.is_eraser() {
            background
        } else {
            stroke.color.into()
        };

        if stroke.is_dot() {
            let Some(center) = stroke.points().first() else {
                return;
            };
            let dot = Circle::new(*center, stroke.width / 2.0);
            self.scene.fill(Fill::NonZero, transform, color, None, &dot);
            return;
        }

        let style = KurboStroke::new(stroke.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round);
        self.scene
            .stroke(&style, transform, color, None, &stroke.to_path());
    }

    /// Drop cached pixels for images no longer on the board.
    fn evict_images(&mut self, images: &[PlacedImage]) {
        if self.image_cache.len() > images.len() {
            let before = self.image_cache.len();
            self.image_cache
                .retain(|id, _| images.iter().any(|image| image.id() == *id));
            log::debug!("Evicted {} cached images", before - self.image_cache.len());
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();

        let canvas = ctx.canvas;
        let board = &canvas.board;
        let transform = canvas.camera.transform();

        self.evict_images(board.images());

        // Commit order, so an eraser only covers what came before it.
        let dragged = canvas.tool_manager.dragged_image();
        for entity in board.entities() {
            match entity {
                Entity::Image(image) if Some(image.id()) == dragged => {}
                Entity::Image(image) => self.render_image(image, transform),
                Entity::Shape(shape) => self.render_shape(shape, transform),
                Entity::Stroke(stroke) => {
                    self.render_stroke(stroke, transform, ctx.background_color)
                }
            }
        }

        if let Some(image) = dragged.and_then(|id| board.image(id)) {
            self.render_image(image, transform);
        }
        if let Some(stroke) = canvas.tool_manager.preview_stroke() {
            self.render_stroke(stroke, transform, ctx.background_color);
        }
        if let Some(shape) = canvas.tool_manager.preview_shape() {
            self.render_shape(shape, transform);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Size};
    use sketchpad_core::input::PointerButton;
    use sketchpad_core::shapes::RasterImage;
    use sketchpad_core::{Canvas, ToolKind};

    fn raster(size: u32) -> RasterImage {
        RasterImage::from_rgba(size, size, vec![128; (size * size * 4) as usize]).unwrap()
    }

    fn drag(canvas: &mut Canvas, from: Point, to: Point) {
        canvas.pointer_move(from);
        canvas.pointer_down(PointerButton::Primary);
        canvas.pointer_move(to);
        canvas.pointer_up(PointerButton::Primary);
    }

    fn build(renderer: &mut VelloRenderer, canvas: &Canvas) {
        let ctx = RenderContext::new(canvas, Size::new(800.0, 600.0));
        renderer.build_scene(&ctx);
    }

    #[test]
    fn test_renderer_creation() {
        let renderer = VelloRenderer::new();
        assert!(renderer.scene().encoding().is_empty());
        assert_eq!(renderer.cached_images(), 0);
    }

    #[test]
    fn test_build_empty_scene() {
        let mut renderer = VelloRenderer::new();
        build(&mut renderer, &Canvas::new());
        assert!(renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_strokes() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        drag(&mut canvas, Point::new(10.0, 10.0), Point::new(100.0, 50.0));
        canvas.set_tool(ToolKind::Eraser);
        drag(&mut canvas, Point::new(20.0, 10.0), Point::new(20.0, 90.0));

        build(&mut renderer, &canvas);
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_dot() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        canvas.pointer_move(Point::new(10.0, 10.0));
        canvas.pointer_down(PointerButton::Primary);
        canvas.pointer_up(PointerButton::Primary);

        build(&mut renderer, &canvas);
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_shapes() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, Point::new(100.0, 100.0), Point::new(300.0, 250.0));
        canvas.set_tool(ToolKind::Circle);
        drag(&mut canvas, Point::new(300.0, 300.0), Point::new(200.0, 200.0));
        assert_eq!(canvas.board.shapes().len(), 2);

        build(&mut renderer, &canvas);
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_build_scene_with_preview() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Rectangle);
        canvas.pointer_move(Point::new(0.0, 0.0));
        canvas.pointer_down(PointerButton::Primary);
        canvas.pointer_move(Point::new(40.0, 40.0));
        assert!(canvas.board.is_empty());

        build(&mut renderer, &canvas);
        assert!(!renderer.scene().encoding().is_empty());
    }

    #[test]
    fn test_shape_after_eraser_is_drawn_last() {
        let mut rect_only = Canvas::new();
        rect_only.set_tool(ToolKind::Rectangle);
        drag(&mut rect_only, Point::new(10.0, 10.0), Point::new(150.0, 150.0));
        let mut expected = VelloRenderer::new();
        build(&mut expected, &rect_only);

        let mut canvas = Canvas::new();
        canvas.set_tool(ToolKind::Eraser);
        drag(&mut canvas, Point::new(0.0, 50.0), Point::new(200.0, 50.0));
        canvas.set_tool(ToolKind::Rectangle);
        drag(&mut canvas, Point::new(10.0, 10.0), Point::new(150.0, 150.0));
        let mut renderer = VelloRenderer::new();
        build(&mut renderer, &canvas);

        let tail = expected.scene().encoding();
        let encoding = renderer.scene().encoding();
        assert!(encoding.draw_data.len() > tail.draw_data.len());
        assert!(encoding.draw_data.ends_with(&tail.draw_data));
        assert!(encoding.path_data.ends_with(&tail.path_data));
    }

    #[test]
    fn test_eraser_covers_earlier_image_only() {
        let mut canvas = Canvas::new();
        canvas.set_viewport_size(800.0, 600.0);
        canvas.set_tool(ToolKind::Eraser);
        drag(&mut canvas, Point::new(0.0, 300.0), Point::new(800.0, 300.0));
        let mut eraser_only = VelloRenderer::new();
        build(&mut eraser_only, &canvas);

        canvas.insert_image(raster(4), None);
        let mut renderer = VelloRenderer::new();
        build(&mut renderer, &canvas);

        let head = eraser_only.scene().encoding();
        let encoding = renderer.scene().encoding();
        assert!(encoding.draw_data.starts_with(&head.draw_data));
        assert!(encoding.path_data.starts_with(&head.path_data));
        assert!(encoding.draw_data.len() > head.draw_data.len());
    }

    #[test]
    fn test_dragged_image_draws_above_strokes() {
        let mut canvas = Canvas::new();
        canvas.set_viewport_size(800.0, 600.0);
        canvas.insert_image(raster(4), None);
        drag(&mut canvas, Point::new(350.0, 300.0), Point::new(450.0, 300.0));
        let mut strokes_on_top = VelloRenderer::new();
        build(&mut strokes_on_top, &canvas);

        canvas.set_tool(ToolKind::Image);
        canvas.pointer_move(Point::new(400.0, 300.0));
        canvas.pointer_down(PointerButton::Primary);
        let mut renderer = VelloRenderer::new();
        build(&mut renderer, &canvas);

        let before = strokes_on_top.scene().encoding();
        let during = renderer.scene().encoding();
        assert_eq!(before.draw_data.len(), during.draw_data.len());
        assert_ne!(before.draw_data, during.draw_data);
    }

    #[test]
    fn test_image_cache_follows_board() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        canvas.insert_image(raster(4), None);
        canvas.insert_image(raster(8), Some(Point::new(10.0, 10.0)));

        build(&mut renderer, &canvas);
        assert!(!renderer.scene().encoding().is_empty());
        assert_eq!(renderer.cached_images(), 2);

        canvas.clear();
        build(&mut renderer, &canvas);
        assert_eq!(renderer.cached_images(), 0);
        assert!(renderer.scene().encoding().is_empty());

        canvas.undo();
        build(&mut renderer, &canvas);
        assert_eq!(renderer.cached_images(), 2);
    }

    #[test]
    fn test_take_scene_resets() {
        let mut renderer = VelloRenderer::new();
        let mut canvas = Canvas::new();
        drag(&mut canvas, Point::ZERO, Point::new(5.0, 5.0));
        build(&mut renderer, &canvas);

        let scene = renderer.take_scene();
        assert!(!scene.encoding().is_empty());
        assert!(renderer.scene().encoding().is_empty());
    }
}
