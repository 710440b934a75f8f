use crate::error::EditorError;
use crate::image::{ImageHandle, ImageRef};
use parking_lot::Mutex;
use std::sync::Arc;

/// The asynchronous decode boundary.
///
/// Uploads are decoded off the UI thread; the result lands in a shared slot
/// that the event loop polls. The loader never touches the surface itself, so
/// a decode that completes after the session was disposed is simply never
/// applied.
pub struct ImageLoader {
    slot: Arc<Mutex<Option<Result<ImageRef, EditorError>>>>,
    in_flight: bool,
}

impl ImageLoader {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            in_flight: false,
        }
    }

    /// Whether a decode has been started but not yet collected.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start decoding an uploaded blob. A newer upload supersedes an
    /// uncollected older result.
    pub fn spawn_decode(&mut self, bytes: Vec<u8>) {
        self.in_flight = true;
        *self.slot.lock() = None;
        let slot = Arc::clone(&self.slot);

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let result = ImageHandle::from_bytes(&bytes).map(Arc::new);
            *slot.lock() = Some(result);
        });

        #[cfg(target_arch = "wasm32")]
        {
            let result = ImageHandle::from_bytes(&bytes).map(Arc::new);
            *slot.lock() = Some(result);
        }
    }

    /// Take a completed decode result, if any. Called from the event loop.
    pub fn poll(&mut self) -> Option<Result<ImageRef, EditorError>> {
        let result = self.slot.lock().take();
        if result.is_some() {
            self.in_flight = false;
        }
        result
    }
}

impl Default for ImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn poll_until_done(loader: &mut ImageLoader) -> Result<ImageRef, EditorError> {
        for _ in 0..200 {
            if let Some(result) = loader.poll() {
                return result;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("decode did not complete");
    }

    #[test]
    fn test_decode_completes_through_the_slot() {
        let img = ::image::RgbaImage::from_pixel(2, 2, ::image::Rgba([9, 9, 9, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        ::image::DynamicImage::ImageRgba8(img)
            .write_to(&mut bytes, ::image::ImageFormat::Png)
            .unwrap();

        let mut loader = ImageLoader::new();
        loader.spawn_decode(bytes.into_inner());
        assert!(loader.in_flight());
        let handle = poll_until_done(&mut loader).unwrap();
        assert_eq!(handle.width(), 2);
        assert!(!loader.in_flight());
    }

    #[test]
    fn test_rejected_upload_surfaces_the_error() {
        let mut loader = ImageLoader::new();
        loader.spawn_decode(b"not an image".to_vec());
        let result = poll_until_done(&mut loader);
        assert!(matches!(result, Err(EditorError::InvalidImageFormat)));
    }
}
