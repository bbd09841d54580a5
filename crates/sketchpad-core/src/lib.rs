//! Sketchpad Core Library
//!
//! Platform-agnostic data structures and the pointer state machine for the
//! Sketchpad drawing canvas.

pub mod board;
pub mod camera;
pub mod canvas;
pub mod input;
pub mod shapes;
pub mod tools;

pub use board::{Board, Entity};
pub use camera::Camera;
pub use canvas::Canvas;
pub use input::{InputState, PointerButton, PointerEvent};
pub use shapes::{ImageError, PlacedImage, RasterImage, Shape, ShapeKind, Stroke, StrokeTool};
pub use tools::{Gesture, ToolKind, ToolManager, ToolSettings};
