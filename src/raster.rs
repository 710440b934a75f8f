//! Deterministic, offscreen replay of the stroke list.
//!
//! The interactive canvas and the exported bitmaps are produced by the same
//! code path: walk each stroke's commands in paint order and stamp round caps
//! along the flattened path at the stroke's stored width and composite mode.
//! Nothing here is cached; callers re-invoke after each edit.

use crate::error::EditorError;
use crate::stroke::{CompositeMode, StrokeRef};
use crate::surface::SurfaceState;
use ::image::{ImageFormat, Rgba, RgbaImage};
use base64::Engine as _;
use egui::{Color32, Pos2, Vec2};
use std::io::Cursor;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Rasterize the mask: a canvas-sized bitmap, black everywhere except where a
/// paint-over stroke survives. Erase strokes apply destination-out, which
/// against the opaque black base collapses back to black.
pub fn rasterize_mask(strokes: &[StrokeRef], size: Vec2) -> RgbaImage {
    let (width, height) = (size.x.max(1.0) as u32, size.y.max(1.0) as u32);
    let mut mask = RgbaImage::from_pixel(width, height, BLACK);
    for stroke in strokes {
        let pixel = match stroke.composite() {
            CompositeMode::PaintOver => opaque(stroke.color()),
            CompositeMode::Erase => BLACK,
        };
        stroke_path(stroke, |cx, cy, r| {
            stamp_disc(cx, cy, r, width, height, |x, y| mask.put_pixel(x, y, pixel));
        });
    }
    mask
}

/// Composite the full surface: scaled, centered background plus strokes.
/// Erase strokes clear back to the background layer. This is the "save the
/// whole canvas" export, distinct from the pure mask.
pub fn render_surface(state: &SurfaceState, size: Vec2) -> RgbaImage {
    let (width, height) = (size.x.max(1.0) as u32, size.y.max(1.0) as u32);
    let mut base = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));

    if let (Some(background), Some(fit)) = (&state.background, state.fit) {
        let rect = fit.rect(background.size());
        let x0 = rect.min.x.max(0.0) as u32;
        let y0 = rect.min.y.max(0.0) as u32;
        let x1 = (rect.max.x as u32).min(width);
        let y1 = (rect.max.y as u32).min(height);
        for y in y0..y1 {
            for x in x0..x1 {
                let src = fit.canvas_to_image(Pos2::new(x as f32 + 0.5, y as f32 + 0.5));
                let px = background.pixel(src.x.max(0.0) as u32, src.y.max(0.0) as u32);
                base.put_pixel(x, y, Rgba(px));
            }
        }
    }

    let mut out = base.clone();
    for stroke in state.strokes.iter() {
        match stroke.composite() {
            CompositeMode::PaintOver => {
                let pixel = opaque(stroke.color());
                stroke_path(stroke, |cx, cy, r| {
                    stamp_disc(cx, cy, r, width, height, |x, y| out.put_pixel(x, y, pixel));
                });
            }
            CompositeMode::Erase => {
                stroke_path(stroke, |cx, cy, r| {
                    stamp_disc(cx, cy, r, width, height, |x, y| {
                        out.put_pixel(x, y, *base.get_pixel(x, y));
                    });
                });
            }
        }
    }
    out
}

/// Encode a bitmap as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, EditorError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}

/// The `data:image/png;base64,…` payload handed to mask consumers.
pub fn png_data_uri(png: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    )
}

fn opaque(color: Color32) -> Rgba<u8> {
    Rgba([color.r(), color.g(), color.b(), 255])
}

/// Walk a stroke's flattened subpaths, emitting stamp centers with the
/// stroke's cap radius roughly every pixel of arc length.
fn stroke_path(stroke: &crate::stroke::Stroke, mut stamp: impl FnMut(f32, f32, f32)) {
    let radius = (stroke.width() / 2.0).max(0.5);
    for subpath in stroke.flatten() {
        match subpath.as_slice() {
            [] => {}
            // A bare move-to is a dot.
            [only] => stamp(only.x, only.y, radius),
            points => {
                for pair in points.windows(2) {
                    let (a, b) = (pair[0], pair[1]);
                    let steps = a.distance(b).ceil().max(1.0) as u32;
                    for i in 0..=steps {
                        let p = a.lerp(b, i as f32 / steps as f32);
                        stamp(p.x, p.y, radius);
                    }
                }
            }
        }
    }
}

/// Fill every pixel within `radius` of the (rounded) center, clipped to the
/// bitmap bounds.
fn stamp_disc(cx: f32, cy: f32, radius: f32, width: u32, height: u32, mut put: impl FnMut(u32, u32)) {
    let cxi = cx.round() as i64;
    let cyi = cy.round() as i64;
    let reach = radius.ceil() as i64;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if ((dx * dx + dy * dy) as f32).sqrt() > radius {
                continue;
            }
            let (x, y) = (cxi + dx, cyi + dy);
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                put(x as u32, y as u32);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::MutableStroke;

    const CANVAS: Vec2 = Vec2::new(600.0, 400.0);

    fn line(
        from: Pos2,
        to: Pos2,
        color: Color32,
        width: f32,
        composite: CompositeMode,
    ) -> StrokeRef {
        let mut pending = MutableStroke::new(color, width, composite);
        pending.add_point(from);
        pending.add_point(to);
        pending.to_stroke_ref()
    }

    fn is_uniform(img: &RgbaImage, pixel: Rgba<u8>) -> bool {
        img.pixels().all(|p| *p == pixel)
    }

    #[test]
    fn test_zero_strokes_yield_uniform_black() {
        let mask = rasterize_mask(&[], CANVAS);
        assert_eq!(mask.dimensions(), (600, 400));
        assert!(is_uniform(&mask, BLACK));
    }

    #[test]
    fn test_paint_stroke_draws_its_color_along_the_path() {
        let stroke = line(
            Pos2::new(10.0, 10.0),
            Pos2::new(50.0, 50.0),
            Color32::RED,
            5.0,
            CompositeMode::PaintOver,
        );
        let mask = rasterize_mask(&[stroke], CANVAS);
        assert_eq!(*mask.get_pixel(30, 30), Rgba([255, 0, 0, 255]));
        assert_eq!(*mask.get_pixel(10, 10), Rgba([255, 0, 0, 255]));
        // Far from the path stays black.
        assert_eq!(*mask.get_pixel(500, 100), BLACK);
    }

    #[test]
    fn test_fully_overlapping_erase_cancels_paint() {
        let paint = line(
            Pos2::new(10.0, 10.0),
            Pos2::new(50.0, 50.0),
            Color32::RED,
            5.0,
            CompositeMode::PaintOver,
        );
        let erase = line(
            Pos2::new(10.0, 10.0),
            Pos2::new(50.0, 50.0),
            Color32::BLACK,
            7.0,
            CompositeMode::Erase,
        );
        let mask = rasterize_mask(&[paint, erase], CANVAS);
        assert!(is_uniform(&mask, BLACK));
    }

    #[test]
    fn test_replay_is_order_dependent() {
        let paint = line(
            Pos2::new(10.0, 10.0),
            Pos2::new(50.0, 50.0),
            Color32::RED,
            5.0,
            CompositeMode::PaintOver,
        );
        let erase = line(
            Pos2::new(10.0, 10.0),
            Pos2::new(50.0, 50.0),
            Color32::BLACK,
            7.0,
            CompositeMode::Erase,
        );
        // Erase first, paint second: the paint survives.
        let mask = rasterize_mask(&[erase, paint], CANVAS);
        assert_eq!(*mask.get_pixel(30, 30), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_surface_render_erase_restores_background_pixel() {
        use crate::geometry::FitTransform;
        use crate::image::ImageHandle;
        use std::sync::Arc;

        // Uniform mid-gray background filling part of the canvas.
        let background = Arc::new(
            ImageHandle::from_rgba8(vec![128; 20 * 10 * 4], 20, 10).unwrap(),
        );
        let fit = FitTransform::fit_to_canvas(CANVAS, background.size()).unwrap();
        let paint = line(
            Pos2::new(100.0, 200.0),
            Pos2::new(200.0, 200.0),
            Color32::RED,
            5.0,
            CompositeMode::PaintOver,
        );
        let erase = line(
            Pos2::new(100.0, 200.0),
            Pos2::new(200.0, 200.0),
            Color32::BLACK,
            7.0,
            CompositeMode::Erase,
        );
        let state = SurfaceState {
            background: Some(background),
            fit: Some(fit),
            strokes: vec![paint, erase],
        };
        let out = render_surface(&state, CANVAS);
        assert_eq!(*out.get_pixel(150, 200), Rgba([128, 128, 128, 128]));
    }

    #[test]
    fn test_data_uri_has_png_preamble() {
        let mask = rasterize_mask(&[], Vec2::new(4.0, 4.0));
        let png = encode_png(&mask).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(png_data_uri(&png).starts_with("data:image/png;base64,"));
    }
}
