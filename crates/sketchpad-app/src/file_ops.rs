//! Loading images from disk or the browser.

#[cfg(not(target_arch = "wasm32"))]
pub use native::*;
#[cfg(target_arch = "wasm32")]
pub use wasm::*;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use sketchpad_core::shapes::{ImageError, RasterImage};
    use std::path::Path;

    /// Read and decode an image file.
    pub fn read_image(path: &Path) -> Result<RasterImage, ImageError> {
        let data = std::fs::read(path).map_err(|e| ImageError::Read(e.to_string()))?;
        let image = RasterImage::decode(&data)?;
        log::info!(
            "Loaded image {:?} ({}x{})",
            path.file_name().unwrap_or_default(),
            image.width,
            image.height
        );
        Ok(image)
    }

    /// Ask the user for an image file with a native dialog.
    #[cfg(feature = "native")]
    pub fn pick_image() -> Option<RasterImage> {
        use sketchpad_core::shapes::ImageFormat;

        let path = rfd::FileDialog::new()
            .set_title("Insert Image")
            .add_filter("Images", ImageFormat::EXTENSIONS)
            .pick_file()?;

        match read_image(&path) {
            Ok(image) => Some(image),
            Err(e) => {
                log::error!("Failed to load image {:?}: {}", path, e);
                None
            }
        }
    }

}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use kurbo::Point;
    use sketchpad_core::shapes::{ImageFormat, RasterImage};
    use std::cell::RefCell;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::prelude::*;

    thread_local! {
        static PENDING_IMAGES: RefCell<Vec<(RasterImage, Option<Point>)>> = const { RefCell::new(Vec::new()) };
    }

    /// Take all images decoded since the last call, with their drop position
    /// in physical pixels (`None` for images picked through the file input).
    pub fn take_pending_images() -> Vec<(RasterImage, Option<Point>)> {
        PENDING_IMAGES.with(|cell| std::mem::take(&mut *cell.borrow_mut()))
    }

    fn push_pending_image(image: RasterImage, position: Option<Point>) {
        PENDING_IMAGES.with(|cell| cell.borrow_mut().push((image, position)));
    }

    /// Open the browser file picker. The chosen image shows up in
    /// `take_pending_images`.
    pub fn open_image_picker() {
        if let Err(e) = create_file_input() {
            log::error!("Failed to open file picker: {:?}", e);
        }
    }

    fn create_file_input() -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("No window")?;
        let document = window.document().ok_or("No document")?;
        let body = document.body().ok_or("No body")?;

        let input: web_sys::HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input.set_type("file");
        let accept = ImageFormat::EXTENSIONS
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(",");
        input.set_accept(&accept);
        input.style().set_property("display", "none")?;

        let input_clone = input.clone();
        let onchange = Closure::once(Box::new(move |_: web_sys::Event| {
            if let Some(file) = input_clone.files().and_then(|files| files.get(0)) {
                load_file(file, None);
            }
            input_clone.remove();
        }) as Box<dyn FnOnce(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        body.append_child(&input)?;
        input.click();
        Ok(())
    }

    /// Accept images dropped onto the canvas element.
    pub fn setup_drag_drop_handlers(canvas: &web_sys::HtmlCanvasElement) {
        let ondragover = Closure::wrap(Box::new(move |event: web_sys::DragEvent| {
            event.prevent_default();
        }) as Box<dyn Fn(_)>);
        canvas
            .add_event_listener_with_callback("dragover", ondragover.as_ref().unchecked_ref())
            .ok();
        ondragover.forget();

        let ondrop = Closure::wrap(Box::new(move |event: web_sys::DragEvent| {
            event.prevent_default();

            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            let position = Point::new(event.client_x() as f64 * dpr, event.client_y() as f64 * dpr);

            let Some(files) = event.data_transfer().and_then(|dt| dt.files()) else {
                return;
            };
            for i in 0..files.length() {
                if let Some(file) = files.get(i) {
                    if is_image_file(&file) {
                        load_file(file, Some(position));
                    } else {
                        log::debug!("Ignoring dropped file {}", file.name());
                    }
                }
            }
        }) as Box<dyn Fn(_)>);
        canvas
            .add_event_listener_with_callback("drop", ondrop.as_ref().unchecked_ref())
            .ok();
        ondrop.forget();
    }

    fn is_image_file(file: &web_sys::File) -> bool {
        if file.type_().starts_with("image/") {
            return true;
        }
        file.name()
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageFormat::from_extension(ext))
            .is_some()
    }

    fn load_file(file: web_sys::File, position: Option<Point>) {
        wasm_bindgen_futures::spawn_local(async move {
            let name = file.name();
            let data = match wasm_bindgen_futures::JsFuture::from(file.array_buffer()).await {
                Ok(buffer) => js_sys::Uint8Array::new(&buffer).to_vec(),
                Err(e) => {
                    log::error!("Failed to read {}: {:?}", name, e);
                    return;
                }
            };
            match RasterImage::decode(&data) {
                Ok(image) => {
                    log::info!("Loaded image {} ({}x{})", name, image.width, image.height);
                    push_pending_image(image, position);
                }
                Err(e) => log::error!("Failed to decode {}: {}", name, e),
            }
        });
    }
}
