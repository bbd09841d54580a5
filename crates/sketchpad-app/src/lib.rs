//! Sketchpad Application
//!
//! Window, surface and toolbar shell around the drawing canvas, for native
//! desktops and the browser.

mod app;
mod file_ops;
mod shortcuts;
mod ui;
mod url_params;

pub use app::{App, AppConfig};
pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};
pub use ui::{UiAction, UiState, render_ui};
pub use url_params::{UrlParams, parse_params};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::run_wasm;
