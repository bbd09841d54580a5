//! Toolbar UI using egui.

use crate::shortcuts::ShortcutRegistry;
use egui::{Align2, Color32, Context, CornerRadius, Frame, Margin, RichText, Stroke, Vec2};
use sketchpad_core::tools::ToolKind;

const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(250, 250, 252, 250);
const BORDER: Color32 = Color32::from_rgb(220, 220, 220);
const TEXT: Color32 = Color32::from_gray(80);

/// Actions triggered from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiAction {
    SetTool(ToolKind),
    Undo,
    Redo,
    /// Remove everything from the board.
    Clear,
    ZoomIn,
    ZoomOut,
    /// Back to 100% at the origin.
    ZoomReset,
    FitToContent,
}

/// Snapshot of canvas state the toolbar displays.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub current_tool: ToolKind,
    pub zoom_percent: u32,
    pub can_undo: bool,
    pub can_redo: bool,
    pub has_content: bool,
}

/// Tooltip for a tool button, e.g. "Rectangle (R)".
pub fn tool_tooltip(tool: ToolKind) -> String {
    match ShortcutRegistry::key_for_tool(tool) {
        Some(key) => format!("{} ({})", tool.label(), key),
        None => tool.label().to_string(),
    }
}

fn panel_frame() -> Frame {
    Frame::new()
        .fill(PANEL_BG)
        .corner_radius(CornerRadius::same(8))
        .stroke(Stroke::new(1.0, BORDER))
        .shadow(egui::epaint::Shadow {
            spread: 0,
            blur: 8,
            offset: [0, 2],
            color: Color32::from_black_alpha(15),
        })
        .inner_margin(Margin::symmetric(8, 6))
}

/// Render the toolbars and return the action the user triggered, if any.
pub fn render_ui(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let tool_action = render_toolbar(ctx, ui_state);
    let view_action = render_bottom_toolbar(ctx, ui_state);
    tool_action.or(view_action)
}

/// Tool buttons, centred along the top edge.
fn render_toolbar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("toolbar"))
        .anchor(Align2::CENTER_TOP, Vec2::new(0.0, 12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);

                    for tool in ToolKind::ALL {
                        let selected = ui_state.current_tool == tool;
                        let response = ui
                            .add(egui::Button::new(tool.label()).selected(selected))
                            .on_hover_text(tool_tooltip(tool));
                        if response.clicked() {
                            action = Some(UiAction::SetTool(tool));
                        }
                    }
                });
            });
        });

    action
}

/// History and zoom controls in the bottom-left corner.
fn render_bottom_toolbar(ctx: &Context, ui_state: &UiState) -> Option<UiAction> {
    let mut action = None;

    egui::Area::new(egui::Id::new("bottom_toolbar"))
        .anchor(Align2::LEFT_BOTTOM, Vec2::new(12.0, -12.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            panel_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.spacing_mut().item_spacing = Vec2::new(4.0, 0.0);

                    if ui
                        .add_enabled(ui_state.can_undo, egui::Button::new("Undo"))
                        .on_hover_text("Undo (Ctrl+Z)")
                        .clicked()
                    {
                        action = Some(UiAction::Undo);
                    }
                    if ui
                        .add_enabled(ui_state.can_redo, egui::Button::new("Redo"))
                        .on_hover_text("Redo (Ctrl+Shift+Z)")
                        .clicked()
                    {
                        action = Some(UiAction::Redo);
                    }
                    if ui
                        .add_enabled(ui_state.has_content, egui::Button::new("Clear"))
                        .on_hover_text("Clear the board")
                        .clicked()
                    {
                        action = Some(UiAction::Clear);
                    }

                    ui.add_space(8.0);
                    ui.label(RichText::new("|").size(14.0).color(Color32::from_gray(200)));
                    ui.add_space(8.0);

                    if ui.button("\u{2212}").on_hover_text("Zoom out").clicked() {
                        action = Some(UiAction::ZoomOut);
                    }

                    let zoom_label = ui
                        .add(
                            egui::Label::new(
                                RichText::new(format!("{}%", ui_state.zoom_percent))
                                    .size(13.0)
                                    .color(TEXT),
                            )
                            .sense(egui::Sense::click()),
                        )
                        .on_hover_text("Reset to 100%");
                    if zoom_label.clicked() {
                        action = Some(UiAction::ZoomReset);
                    }

                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        action = Some(UiAction::ZoomIn);
                    }
                    if ui
                        .add_enabled(ui_state.has_content, egui::Button::new("Fit"))
                        .on_hover_text("Fit view to content")
                        .clicked()
                    {
                        action = Some(UiAction::FitToContent);
                    }
                });
            });
        });

    action
}
