use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the editing core.
///
/// Everything here degrades gracefully at the session boundary: rejected
/// uploads are ignored, empty undo/redo is a no-op, and operations against a
/// disposed surface are dropped rather than crashing the event loop.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The uploaded bytes are not a PNG or JPEG.
    #[error("unsupported image format, expected PNG or JPEG")]
    InvalidImageFormat,

    /// Decoding an upload or encoding an export failed inside the codec.
    #[error("image codec failure: {0}")]
    ImageCodec(#[from] image::ImageError),

    /// A decoded image with zero width or height cannot be fit to the canvas.
    #[error("image has zero width or height")]
    ZeroSizedImage,

    /// `begin_stroke` was called while another stroke was still pending.
    #[error("a stroke is already in progress")]
    StrokeInProgress,

    /// A select-mode operation referenced an object that no longer exists.
    #[error("no object with id {0}")]
    ObjectNotFound(Uuid),

    /// The editing session was disposed; late results must not be applied.
    #[error("surface has been disposed")]
    SurfaceDisposed,
}
