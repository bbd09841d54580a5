//! Core application state and lifecycle.

use kurbo::{Point, Size};
use peniko::Color;
use sketchpad_core::canvas::Canvas;
use sketchpad_core::input::{Modifiers, PointerButton};
use sketchpad_core::shapes::RasterImage;
use sketchpad_core::tools::{ToolKind, ToolSettings};
use sketchpad_render::{RenderContext, RenderResult, Renderer, RendererError, VelloRenderer};
use std::sync::Arc;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use vello::{AaConfig, RenderParams, RendererOptions};
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::file_ops;
use crate::shortcuts::{ShortcutAction, ShortcutRegistry};
use crate::ui::{UiAction, UiState, render_ui};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// Initial window size in logical pixels (native only).
    pub width: u32,
    pub height: u32,
    pub background_color: Color,
    pub tool_settings: ToolSettings,
    pub initial_tool: ToolKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Sketchpad".to_string(),
            width: 1280,
            height: 800,
            background_color: Color::WHITE,
            tool_settings: ToolSettings::default(),
            initial_tool: ToolKind::default(),
        }
    }
}

/// Map a winit mouse button to a canvas button.
pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Middle => Some(PointerButton::Middle),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Vertical wheel movement; positive means away from the user.
pub fn wheel_delta_y(delta: MouseScrollDelta) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(pos) => pos.y,
    }
}

/// Application state (initialized after window creation).
struct AppState {
    window: Arc<Window>,
    surface: RenderSurface<'static>,
    vello_renderer: vello::Renderer,
    scene_renderer: VelloRenderer,
    /// Copies vello's Rgba8Unorm output onto the surface format.
    texture_blitter: vello::wgpu::util::TextureBlitter,

    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui_state: UiState,

    canvas: Canvas,
    config: AppConfig,
}

impl AppState {
    fn sync_ui_state(&mut self) {
        self.ui_state = UiState {
            current_tool: self.canvas.tool(),
            zoom_percent: self.canvas.camera.zoom_percent(),
            can_undo: self.canvas.board.can_undo(),
            can_redo: self.canvas.board.can_redo(),
            has_content: !self.canvas.board.is_empty(),
        };
    }

    /// Switch tools. Picking the image tool also asks for a file.
    fn select_tool(&mut self, tool: ToolKind) {
        self.canvas.set_tool(tool);
        if tool != ToolKind::Image {
            return;
        }

        #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
        if let Some(image) = file_ops::pick_image() {
            self.insert_image(image, None);
        }

        #[cfg(target_arch = "wasm32")]
        file_ops::open_image_picker();
    }

    fn insert_image(&mut self, image: RasterImage, screen: Option<Point>) {
        self.canvas.insert_image(image, screen);
        self.window.request_redraw();
    }

    fn apply_ui_action(&mut self, action: UiAction) {
        match action {
            UiAction::SetTool(tool) => self.select_tool(tool),
            UiAction::Undo => {
                self.canvas.undo();
            }
            UiAction::Redo => {
                self.canvas.redo();
            }
            UiAction::Clear => self.canvas.clear(),
            UiAction::ZoomIn => self.canvas.zoom_in(),
            UiAction::ZoomOut => self.canvas.zoom_out(),
            UiAction::ZoomReset => self.canvas.reset_view(),
            UiAction::FitToContent => self.canvas.fit_to_content(),
        }
    }

    fn apply_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::SetTool(tool) => self.select_tool(tool),
            ShortcutAction::Undo => {
                self.canvas.undo();
            }
            ShortcutAction::Redo => {
                self.canvas.redo();
            }
            ShortcutAction::Cancel => self.canvas.cancel(),
        }
    }

    /// Draw the canvas with vello, then egui on top.
    fn redraw(&mut self, render_cx: &vello::util::RenderContext) {
        #[cfg(target_arch = "wasm32")]
        for (image, position) in file_ops::take_pending_images() {
            self.canvas.insert_image(image, position);
        }

        self.sync_ui_state();

        let egui_input = self.egui_state.take_egui_input(&self.window);
        let mut ui_action = None;
        let ui_state = &self.ui_state;
        let egui_output = self.egui_ctx.run(egui_input, |ctx| {
            ui_action = render_ui(ctx, ui_state);
        });
        self.egui_state
            .handle_platform_output(&self.window, egui_output.platform_output);
        let egui_primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        if let Some(action) = ui_action {
            self.apply_ui_action(action);
        }

        let width = self.surface.config.width;
        let height = self.surface.config.height;

        let ctx = RenderContext::new(&self.canvas, Size::new(width as f64, height as f64))
            .with_scale_factor(self.window.scale_factor())
            .with_background(self.config.background_color);
        self.scene_renderer.build_scene(&ctx);
        let base_color = self.scene_renderer.background_color(&ctx);
        let scene = self.scene_renderer.take_scene();

        let device_handle = &render_cx.devices[self.surface.dev_id];
        let device = &device_handle.device;
        let queue = &device_handle.queue;

        let surface_texture = match self.surface.surface.get_current_texture() {
            Ok(t) => t,
            Err(e) => {
                log::warn!("{}", RendererError::Surface(format!("no texture: {e:?}")));
                return;
            }
        };

        let params = RenderParams {
            base_color,
            width,
            height,
            antialiasing_method: AaConfig::Area,
        };

        // Vello needs a storage texture, and WebGPU only allows that for Rgba8Unorm.
        let render_texture = device.create_texture(&vello::wgpu::TextureDescriptor {
            label: Some("vello render texture"),
            size: vello::wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: vello::wgpu::TextureDimension::D2,
            format: vello::wgpu::TextureFormat::Rgba8Unorm,
            usage: vello::wgpu::TextureUsages::STORAGE_BINDING
                | vello::wgpu::TextureUsages::COPY_SRC
                | vello::wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let render_view =
            render_texture.create_view(&vello::wgpu::TextureViewDescriptor::default());

        if let Err(e) =
            self.vello_renderer
                .render_to_texture(device, queue, &scene, &render_view, &params)
        {
            log::error!("{}", RendererError::RenderFailed(format!("{e:?}")));
            return;
        }

        let surface_view = surface_texture
            .texture
            .create_view(&vello::wgpu::TextureViewDescriptor::default());

        {
            let mut blit_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("blit encoder"),
                });
            self.texture_blitter
                .copy(device, &mut blit_encoder, &render_view, &surface_view);
            queue.submit(std::iter::once(blit_encoder.finish()));
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        {
            let mut egui_encoder =
                device.create_command_encoder(&vello::wgpu::CommandEncoderDescriptor {
                    label: Some("egui encoder"),
                });
            self.egui_renderer.update_buffers(
                device,
                queue,
                &mut egui_encoder,
                &egui_primitives,
                &screen_descriptor,
            );

            let render_pass = egui_encoder.begin_render_pass(&vello::wgpu::RenderPassDescriptor {
                label: Some("egui render pass"),
                color_attachments: &[Some(vello::wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: vello::wgpu::Operations {
                        load: vello::wgpu::LoadOp::Load,
                        store: vello::wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            // egui-wgpu wants a 'static pass.
            let mut render_pass = render_pass.forget_lifetime();
            self.egui_renderer
                .render(&mut render_pass, &egui_primitives, &screen_descriptor);
            drop(render_pass);

            queue.submit(std::iter::once(egui_encoder.finish()));
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        surface_texture.present();
        self.window.request_redraw();
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Window waiting for async surface creation (WASM only)
    pending_window: Option<Arc<Window>>,
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            pending_window: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application until the window closes.
    pub async fn run(config: AppConfig) {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(e) => {
                log::error!("Failed to create event loop: {}", e);
                return;
            }
        };
        let app = App::new(config);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            if let Err(e) = event_loop.run_app(&mut app) {
                log::error!("Event loop error: {}", e);
            }
        }
    }

    /// Finish initialization after the surface is created.
    fn finish_init(&mut self, window: Arc<Window>, surface: RenderSurface<'static>) -> RenderResult<()> {
        let render_cx = self
            .render_cx
            .as_ref()
            .ok_or_else(|| RendererError::InitFailed("render context missing".into()))?;
        let device = &render_cx.devices[surface.dev_id].device;

        let vello_renderer = vello::Renderer::new(device, RendererOptions::default())
            .map_err(|e| RendererError::InitFailed(format!("{e:?}")))?;
        let texture_blitter =
            vello::wgpu::util::TextureBlitter::new(device, surface.config.format);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface.config.format,
            egui_wgpu::RendererOptions::default(),
        );

        let mut canvas = Canvas::with_settings(self.config.tool_settings);
        canvas.set_viewport_size(surface.config.width as f64, surface.config.height as f64);
        canvas.set_tool(self.config.initial_tool);

        log::info!(
            "Sketchpad initialized - {}x{}, tool: {}",
            surface.config.width,
            surface.config.height,
            self.config.initial_tool.name()
        );
        log::debug!("Keyboard shortcuts:");
        ShortcutRegistry::log_all();

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;
            if let Some(html_canvas) = window.canvas() {
                file_ops::setup_drag_drop_handlers(&html_canvas);
            }
        }

        self.state = Some(AppState {
            window: window.clone(),
            surface,
            vello_renderer,
            scene_renderer: VelloRenderer::new(),
            texture_blitter,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui_state: UiState::default(),
            canvas,
            config: self.config.clone(),
        });
        self.pending_window = None;

        window.request_redraw();
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    fn start_async_init(&mut self, window: Arc<Window>) {
        if self.init_in_progress.get() {
            return;
        }
        self.init_in_progress.set(true);

        let (viewport_width, viewport_height, dpr) =
            crate::web::viewport_size((self.config.width as f64, self.config.height as f64));
        let width = (viewport_width * dpr) as u32;
        let height = (viewport_height * dpr) as u32;

        let self_ptr = self as *mut Self;
        wasm_bindgen_futures::spawn_local(async move {
            log::info!("Creating surface asynchronously...");
            let mut render_cx = vello::util::RenderContext::new();

            match render_cx
                .create_surface(window.clone(), width, height, PresentMode::AutoVsync)
                .await
            {
                Ok(surface) => {
                    // SAFETY: the surface only borrows the window, which the app keeps alive.
                    let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
                    // SAFETY: WASM is single-threaded and the event loop owns the app
                    // for the lifetime of the page.
                    let app = unsafe { &mut *self_ptr };
                    app.render_cx = Some(render_cx);
                    if let Err(e) = app.finish_init(window, surface) {
                        log::error!("{}", e);
                    }
                }
                Err(e) => {
                    log::error!("{}", RendererError::Surface(format!("creation failed: {e:?}")));
                    let app = unsafe { &mut *self_ptr };
                    app.init_in_progress.set(false);
                }
            }
        });
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        #[cfg(not(target_arch = "wasm32"))]
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        #[cfg(target_arch = "wasm32")]
        let window_attrs = {
            use winit::platform::web::WindowAttributesExtWebSys;

            let (width, height, _) =
                crate::web::viewport_size((self.config.width as f64, self.config.height as f64));
            let Some(canvas) = crate::web::create_canvas(width, height) else {
                log::error!("Failed to create canvas element");
                event_loop.exit();
                return;
            };
            Window::default_attributes()
                .with_title(&self.config.title)
                .with_canvas(Some(canvas))
        };

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        let (width, height) = if size.width == 0 || size.height == 0 {
            (self.config.width, self.config.height)
        } else {
            (size.width, size.height)
        };
        log::info!("Surface size: {}x{}", width, height);

        #[cfg(not(target_arch = "wasm32"))]
        {
            let render_cx = self
                .render_cx
                .get_or_insert_with(vello::util::RenderContext::new);
            let surface = match pollster::block_on(render_cx.create_surface(
                window.clone(),
                width,
                height,
                PresentMode::AutoVsync,
            )) {
                Ok(surface) => surface,
                Err(e) => {
                    log::error!("{}", RendererError::Surface(format!("creation failed: {e:?}")));
                    event_loop.exit();
                    return;
                }
            };

            // SAFETY: the surface only borrows the window, which AppState keeps alive.
            let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
            if let Err(e) = self.finish_init(window, surface) {
                log::error!("{}", e);
                event_loop.exit();
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            self.pending_window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            if let Some(window) = self.pending_window.clone() {
                self.start_async_init(window.clone());
                window.request_redraw();
            }
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        let egui_response = state.egui_state.on_window_event(&state.window, &event);
        let egui_wants_input = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input()
            || state.egui_ctx.wants_keyboard_input();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }
                state
                    .canvas
                    .set_viewport_size(size.width as f64, size.height as f64);
                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Some(render_cx) = self.render_cx.as_ref() {
                    state.redraw(render_cx);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                // A gesture keeps tracking the pointer even over the toolbar.
                if egui_wants_input && !state.canvas.tool_manager.is_active() {
                    state.canvas.pointer_left();
                    return;
                }
                state.canvas.pointer_move(Point::new(position.x, position.y));
                state.window.request_redraw();
            }

            WindowEvent::CursorLeft { .. } => {
                state.canvas.pointer_left();
                state.window.request_redraw();
            }

            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                let Some(button) = pointer_button(button) else {
                    return;
                };
                match button_state {
                    ElementState::Pressed => {
                        if egui_wants_input {
                            return;
                        }
                        state.canvas.pointer_down(button);
                    }
                    // Releases always reach the canvas so a gesture never gets stuck.
                    ElementState::Released => state.canvas.pointer_up(button),
                }
                state.window.request_redraw();
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if egui_wants_input {
                    return;
                }
                state.canvas.wheel(wheel_delta_y(delta));
                state.window.request_redraw();
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                let mods = modifiers.state();
                state.canvas.input.set_modifiers(Modifiers {
                    shift: mods.shift_key(),
                    ctrl: mods.control_key(),
                    alt: mods.alt_key(),
                    meta: mods.super_key(),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if egui_wants_input || event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let modifiers = state.canvas.input.modifiers;
                let action = match &event.logical_key {
                    Key::Character(c) => {
                        ShortcutRegistry::lookup(c.as_str(), modifiers.command(), modifiers.shift)
                    }
                    Key::Named(NamedKey::Escape) => {
                        ShortcutRegistry::lookup("Escape", false, false)
                    }
                    _ => None,
                };
                if let Some(action) = action {
                    log::debug!("Shortcut: {:?}", action);
                    state.apply_shortcut(action);
                    state.window.request_redraw();
                }
            }

            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::DroppedFile(path) => match file_ops::read_image(&path) {
                Ok(image) => {
                    let position = state.canvas.input.pointer_position;
                    state.insert_image(image, position);
                }
                Err(e) => log::error!("Failed to load dropped file {:?}: {}", path, e),
            },

            _ => {}
        }
    }
}
