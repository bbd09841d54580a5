//! Sketchpad Render Library
//!
//! Renderer abstraction and the Vello implementation that replays the
//! board into a scene every frame.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
