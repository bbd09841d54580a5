//! Raw pointer and modifier state between events.

use kurbo::Point;

/// Pointer buttons the board reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Cursor event in screen coordinates.
///
/// Button presses are not tracked here: the canvas applies them at the
/// last `Move` and remembers which button owns the gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Move { position: Point },
    /// The cursor left the drawing surface.
    Left,
}

/// Tracks the device state across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position, `None` while the cursor is off the surface.
    pub pointer_position: Option<Point>,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Move { position } => self.pointer_position = Some(position),
            PointerEvent::Left => self.pointer_position = None,
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}
