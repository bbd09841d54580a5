//! WebAssembly entry point and platform-specific code.

use crate::app::{App, AppConfig};
use crate::url_params::{UrlParams, parse_params};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const CANVAS_ID: &str = "sketchpad-canvas";

/// Read parameters from the page URL.
/// The query string wins over the hash fragment.
pub fn get_url_params() -> UrlParams {
    let Some(window) = web_sys::window() else {
        return UrlParams::default();
    };
    let location = window.location();

    let query = location
        .search()
        .map(|s| parse_params(&s))
        .unwrap_or_default();
    let hash = location.hash().map(|s| parse_params(&s)).unwrap_or_default();
    query.or(hash)
}

/// Browser viewport size in CSS pixels and the device pixel ratio.
pub fn viewport_size(fallback: (f64, f64)) -> (f64, f64, f64) {
    let Some(window) = web_sys::window() else {
        return (fallback.0, fallback.1, 1.0);
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(fallback.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(fallback.1);
    (width, height, window.device_pixel_ratio())
}

/// Find the drawing canvas or create one that fills the page.
pub fn create_canvas(width: f64, height: f64) -> Option<web_sys::HtmlCanvasElement> {
    let document = web_sys::window()?.document()?;

    if let Some(loading) = document.get_element_by_id("loading") {
        loading.remove();
    }

    let canvas = match document.get_element_by_id(CANVAS_ID) {
        Some(element) => element.dyn_into::<web_sys::HtmlCanvasElement>().ok()?,
        None => {
            let parent = match document.get_element_by_id("app") {
                Some(app) => app,
                None => document.body()?.into(),
            };
            let canvas = document.create_element("canvas").ok()?;
            canvas.set_id(CANVAS_ID);
            parent.append_child(&canvas).ok()?;
            canvas.dyn_into::<web_sys::HtmlCanvasElement>().ok()?
        }
    };

    let (_, _, dpr) = viewport_size((width, height));
    canvas.set_width((width * dpr) as u32);
    canvas.set_height((height * dpr) as u32);
    let style = canvas.style();
    for (property, value) in [
        ("width", "100%"),
        ("height", "100%"),
        ("display", "block"),
        ("position", "fixed"),
        ("top", "0"),
        ("left", "0"),
    ] {
        let _ = style.set_property(property, value);
    }

    Some(canvas)
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {e}").into());
    }

    log::info!("Starting Sketchpad (WASM)");

    let params = get_url_params();
    let mut config = AppConfig::default();
    if let Some(tool) = params.tool {
        log::info!("Tool from URL: {}", tool.name());
        config.initial_tool = tool;
    }

    App::run(config).await;
}
