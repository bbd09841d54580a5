//! Keyboard shortcut registry.

use sketchpad_core::tools::ToolKind;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetTool(ToolKind),
    Undo,
    Redo,
    /// Abandon the gesture in progress.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        // Tool keys ignore shift so caps lock does not break them.
        let shift_ok = self.shift == shift || (!self.ctrl && !self.shift);
        self.key.eq_ignore_ascii_case(key) && self.ctrl == ctrl && shift_ok
    }
}

const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("P", false, false, ShortcutAction::SetTool(ToolKind::Pen), "Pen"),
    Shortcut::new("E", false, false, ShortcutAction::SetTool(ToolKind::Eraser), "Eraser"),
    Shortcut::new("R", false, false, ShortcutAction::SetTool(ToolKind::Rectangle), "Rectangle"),
    Shortcut::new("C", false, false, ShortcutAction::SetTool(ToolKind::Circle), "Circle"),
    Shortcut::new("H", false, false, ShortcutAction::SetTool(ToolKind::Hand), "Hand (pan)"),
    Shortcut::new("I", false, false, ShortcutAction::SetTool(ToolKind::Image), "Insert or move images"),
    Shortcut::new("Z", true, false, ShortcutAction::Undo, "Undo"),
    Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo"),
    Shortcut::new("Y", true, false, ShortcutAction::Redo, "Redo"),
    Shortcut::new("Escape", false, false, ShortcutAction::Cancel, "Cancel current action"),
];

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    pub fn all() -> &'static [Shortcut] {
        SHORTCUTS
    }

    /// Find the action bound to `key` with the given modifiers.
    ///
    /// `ctrl` should be true for Ctrl or Cmd.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<ShortcutAction> {
        SHORTCUTS
            .iter()
            .find(|shortcut| shortcut.matches(key, ctrl, shift))
            .map(|shortcut| shortcut.action)
    }

    /// The key that selects `tool`.
    pub fn key_for_tool(tool: ToolKind) -> Option<&'static str> {
        SHORTCUTS
            .iter()
            .find(|shortcut| shortcut.action == ShortcutAction::SetTool(tool))
            .map(|shortcut| shortcut.key)
    }

    /// Log all shortcuts.
    pub fn log_all() {
        for shortcut in SHORTCUTS {
            log::debug!("  {:14} {}", shortcut.format(), shortcut.description);
        }
    }
}
