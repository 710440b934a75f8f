use crate::error::EditorError;
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Uniform scale + top-left offset that fits a source image into a fixed-size
/// canvas, preserving aspect ratio and centering the result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTransform {
    pub scale: f32,
    pub offset: Vec2,
}

impl FitTransform {
    /// Compute the fit for `image` (natural size) inside `canvas`.
    ///
    /// A zero-sized image cannot be fit; callers must treat that as an error
    /// rather than drawing a degenerate background.
    pub fn fit_to_canvas(canvas: Vec2, image: Vec2) -> Result<Self, EditorError> {
        if image.x <= 0.0 || image.y <= 0.0 {
            return Err(EditorError::ZeroSizedImage);
        }
        let scale = (canvas.x / image.x).min(canvas.y / image.y);
        let offset = Vec2::new(
            (canvas.x - image.x * scale) / 2.0,
            (canvas.y - image.y * scale) / 2.0,
        );
        Ok(Self { scale, offset })
    }

    /// Placement rectangle of the scaled image in canvas coordinates.
    pub fn rect(&self, image: Vec2) -> Rect {
        Rect::from_min_size(self.offset.to_pos2(), image * self.scale)
    }

    /// Map a canvas-space position back into source-image pixel coordinates.
    pub fn canvas_to_image(&self, pos: Pos2) -> Pos2 {
        Pos2::new(
            (pos.x - self.offset.x) / self.scale,
            (pos.y - self.offset.y) / self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_fit_is_scaled_and_vertically_centered() {
        let fit =
            FitTransform::fit_to_canvas(Vec2::new(600.0, 400.0), Vec2::new(200.0, 100.0)).unwrap();
        assert_eq!(fit.scale, 3.0);
        assert_eq!(fit.offset, Vec2::new(0.0, 50.0));
    }

    #[test]
    fn test_square_image_is_horizontally_centered() {
        let fit =
            FitTransform::fit_to_canvas(Vec2::new(600.0, 400.0), Vec2::new(300.0, 300.0)).unwrap();
        assert!((fit.scale - 400.0 / 300.0).abs() < 1e-6);
        assert!((fit.offset.x - 100.0).abs() < 1e-3);
        assert_eq!(fit.offset.y, 0.0);
    }

    #[test]
    fn test_zero_sized_image_is_rejected() {
        let result = FitTransform::fit_to_canvas(Vec2::new(600.0, 400.0), Vec2::new(0.0, 100.0));
        assert!(matches!(result, Err(EditorError::ZeroSizedImage)));
    }

    #[test]
    fn test_canvas_to_image_round_trip() {
        let fit =
            FitTransform::fit_to_canvas(Vec2::new(600.0, 400.0), Vec2::new(200.0, 100.0)).unwrap();
        let image_pos = fit.canvas_to_image(Pos2::new(300.0, 200.0));
        assert_eq!(image_pos, Pos2::new(100.0, 50.0));
    }
}
