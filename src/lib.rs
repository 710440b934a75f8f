#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod error;
pub mod geometry;
pub mod history;
pub mod image;
pub mod loader;
pub mod panels;
pub mod raster;
pub mod session;
pub mod stroke;
pub mod surface;
pub mod tool;

pub use app::InpaintApp;
pub use error::EditorError;
pub use geometry::FitTransform;
pub use history::History;
pub use image::{ImageHandle, ImageRef};
pub use loader::ImageLoader;
pub use session::{EditorSession, DEFAULT_CANVAS_SIZE};
pub use stroke::{CompositeMode, MutableStroke, PathCommand, Stroke, StrokeRef, StrokeUpdate};
pub use surface::{Surface, SurfaceState};
pub use tool::{PenConfig, ToolMode, ToolState};
