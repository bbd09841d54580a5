//! Raster images placed on the board.

use super::{ShapeId, ShapeTrait};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape, Vec2};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Largest display extent (world units) a newly placed image may have.
pub const MAX_IMAGE_SIZE: f64 = 800.0;

/// Errors raised while turning file bytes into a placeable image.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("failed to decode image: {0}")]
    Decode(String),
    #[error("failed to read image file: {0}")]
    Read(String),
}

/// Encoded image formats the board accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Gif,
    Bmp,
}

impl ImageFormat {
    /// Extensions offered by file pickers.
    pub const EXTENSIONS: &'static [&'static str] =
        &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some(ImageFormat::Png)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if data.len() >= 12 && data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            Some(ImageFormat::WebP)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(ImageFormat::Gif)
        } else if data.starts_with(b"BM") {
            Some(ImageFormat::Bmp)
        } else {
            None
        }
    }

    fn to_image_crate(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// Decoded RGBA8 pixels (row-major, unpremultiplied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl RasterImage {
    /// Decode an encoded image file into RGBA8 pixels.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let format = ImageFormat::from_magic_bytes(bytes).ok_or(ImageError::UnsupportedFormat)?;
        let decoded = image::load_from_memory_with_format(bytes, format.to_image_crate())
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Decode("image has no pixels".to_string()));
        }

        log::debug!("Decoded {:?} image {}x{}", format, width, height);
        Ok(Self {
            width,
            height,
            rgba: rgba.into_raw(),
        })
    }

    /// Build from raw RGBA8 pixels; `None` if the buffer size doesn't match.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        (width > 0 && height > 0 && rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }
}

/// An image positioned on the board.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub(crate) id: ShapeId,
    /// Top-left corner in world coordinates.
    pub position: Point,
    /// Display width.
    pub width: f64,
    /// Display height.
    pub height: f64,
    /// Decoded pixels, shared with undo snapshots.
    pub pixels: Arc<RasterImage>,
}

impl PlacedImage {
    /// Place an image at its source size with its top-left corner at `position`.
    pub fn new(position: Point, pixels: Arc<RasterImage>) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            width: pixels.width as f64,
            height: pixels.height as f64,
            pixels,
        }
    }

    /// Scale down (never up) to fit within the given extents, preserving aspect ratio.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let scale = (max_width / self.width).min(max_height / self.height);
        if scale < 1.0 {
            self.width *= scale;
            self.height *= scale;
        }
        self
    }

    /// Centre the image on `center`.
    pub fn centered_at(mut self, center: Point) -> Self {
        self.position = Point::new(center.x - self.width / 2.0, center.y - self.height / 2.0);
        self
    }

    pub fn as_rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }

    /// True if the world point lies inside the image.
    pub fn contains(&self, point: Point) -> bool {
        self.as_rect().contains(point)
    }

    /// Move by a world-space delta.
    pub fn move_by(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

impl PartialEq for PlacedImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.position == other.position
            && self.width == other.width
            && self.height == other.height
            && Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl ShapeTrait for PlacedImage {
    fn id(&self) -> ShapeId {
        self.id
    }

    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn to_path(&self) -> BezPath {
        self.as_rect().to_path(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), format)
            .unwrap();
        bytes
    }

    fn raster(width: u32, height: u32) -> Arc<RasterImage> {
        Arc::new(RasterImage::from_rgba(width, height, vec![0; (width * height * 4) as usize]).unwrap())
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_extension("tiff"), None);

        assert_eq!(
            ImageFormat::from_magic_bytes(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic_bytes(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic_bytes(b"hello"), None);
        assert_eq!(ImageFormat::from_magic_bytes(&[]), None);
    }

    #[test]
    fn test_decode_png() {
        let bytes = encode(3, 2, image::ImageFormat::Png);
        let raster = RasterImage::decode(&bytes).unwrap();
        assert_eq!((raster.width, raster.height), (3, 2));
        assert_eq!(raster.rgba.len(), 3 * 2 * 4);
        assert_eq!(&raster.rgba[0..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_bmp() {
        let bytes = encode(4, 4, image::ImageFormat::Bmp);
        let raster = RasterImage::decode(&bytes).unwrap();
        assert_eq!((raster.width, raster.height), (4, 4));
    }

    #[test]
    fn test_decode_rejects_unknown_bytes() {
        assert!(matches!(
            RasterImage::decode(b"not an image at all"),
            Err(ImageError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_decode_rejects_truncated_data() {
        let bytes = encode(8, 8, image::ImageFormat::Png);
        assert!(matches!(
            RasterImage::decode(&bytes[..20]),
            Err(ImageError::Decode(_))
        ));
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(RasterImage::from_rgba(2, 2, vec![0; 16]).is_some());
        assert!(RasterImage::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(RasterImage::from_rgba(0, 2, vec![]).is_none());
    }

    #[test]
    fn test_fit_within_scales_down() {
        let img = PlacedImage::new(Point::ZERO, raster(1000, 500)).fit_within(400.0, 400.0);
        assert!((img.width - 400.0).abs() < 0.01);
        assert!((img.height - 200.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let img = PlacedImage::new(Point::ZERO, raster(100, 50)).fit_within(800.0, 800.0);
        assert!((img.width - 100.0).abs() < f64::EPSILON);
        assert!((img.height - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_contains_and_move() {
        let mut img = PlacedImage::new(Point::new(10.0, 20.0), raster(100, 50));
        assert!(img.contains(Point::new(50.0, 40.0)));
        assert!(!img.contains(Point::new(5.0, 40.0)));

        img.move_by(Vec2::new(-10.0, 5.0));
        assert_eq!(img.position, Point::new(0.0, 25.0));
        assert_eq!(img.bounds(), Rect::new(0.0, 25.0, 100.0, 75.0));
    }

    #[test]
    fn test_centered_at() {
        let img = PlacedImage::new(Point::ZERO, raster(100, 50)).centered_at(Point::new(0.0, 0.0));
        assert_eq!(img.position, Point::new(-50.0, -25.0));
    }
}
