use crate::error::EditorError;
use ::image::{ImageFormat, ImageReader};
use egui::Vec2;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;

/// A decoded background image: RGBA8 pixels plus natural size.
///
/// Immutable once decoded. Uploading a new image replaces the handle on the
/// surface wholesale; handles are never merged or edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHandle {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

// Define a reference-counted type alias for ImageHandle
pub type ImageRef = Arc<ImageHandle>;

impl ImageHandle {
    /// Wrap already-decoded RGBA8 pixels.
    pub fn from_rgba8(data: Vec<u8>, width: u32, height: u32) -> Result<Self, EditorError> {
        if width == 0 || height == 0 {
            return Err(EditorError::ZeroSizedImage);
        }
        debug_assert_eq!(data.len(), (width * height * 4) as usize);
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Decode an uploaded blob. Only PNG and JPEG are accepted; anything else
    /// is `InvalidImageFormat` so the caller can ignore the upload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EditorError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|_| EditorError::InvalidImageFormat)?;
        match reader.format() {
            Some(ImageFormat::Png) | Some(ImageFormat::Jpeg) => {}
            _ => return Err(EditorError::InvalidImageFormat),
        }
        let decoded = reader.decode()?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        log::debug!("decoded background image: {}x{}", width, height);
        Self::from_rgba8(rgba.into_raw(), width, height)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// RGBA value at a source pixel, clamped to the image bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }
}
