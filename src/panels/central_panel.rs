use crate::app::InpaintApp;
use crate::raster;
use crate::stroke::CompositeMode;
use crate::tool::ToolMode;
use eframe::egui::{self, Color32, Pos2, Sense};

pub fn central_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("Image Inpainting Widget");
        if app.session.surface().background().is_none() {
            ui.label("Drop a PNG or JPEG onto the window to start.");
        }

        let canvas_size = app.session.surface().size();
        let (response, painter) = ui.allocate_painter(canvas_size, Sense::drag());
        let rect = response.rect;

        painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, Color32::GRAY));

        sync_canvas_texture(app, ctx);
        if let Some(texture) = &app.canvas_texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        // Live preview of the stroke being drawn; erase previews are shown
        // translucent since the committed result only exists after replay.
        if let Some(points) = app.session.pending_points() {
            if let Some(pen) = app.session.tools().pen() {
                let color = match pen.composite {
                    CompositeMode::PaintOver => pen.color,
                    CompositeMode::Erase => Color32::from_rgba_unmultiplied(255, 255, 255, 128),
                };
                let screen: Vec<Pos2> = points.iter().map(|p| *p + rect.min.to_vec2()).collect();
                if screen.len() == 1 {
                    painter.circle_filled(screen[0], pen.width / 2.0, color);
                } else {
                    painter.add(egui::Shape::line(
                        screen,
                        egui::Stroke::new(pen.width, color),
                    ));
                }
            }
        }

        // Pointer routing: canvas-local coordinates, one stroke per drag.
        if let Some(pos) = response.interact_pointer_pos() {
            let local = pos - rect.min.to_vec2();
            if response.drag_started() {
                app.session.pointer_pressed(local);
            } else if response.dragged() {
                app.session.pointer_moved(local);
            }
        }
        if response.drag_stopped() {
            match response.interact_pointer_pos() {
                Some(pos) => app.session.pointer_released(pos - rect.min.to_vec2()),
                None => app.session.pointer_canceled(),
            }
        }

        if app.session.tools().mode() == ToolMode::Select {
            if let Some(id) = app.session.selected() {
                ui.label(format!("Selected stroke {id}"));
            }
        }
    });
}

/// Re-upload the composited canvas when the session state changed.
fn sync_canvas_texture(app: &mut InpaintApp, ctx: &egui::Context) {
    let revision = app.session.revision();
    if app.canvas_revision == Some(revision) && app.canvas_texture.is_some() {
        return;
    }
    let state = app.session.surface().snapshot();
    let composited = raster::render_surface(&state, app.session.surface().size());
    let (w, h) = composited.dimensions();
    let color_image =
        egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], composited.as_raw());
    app.canvas_texture =
        Some(ctx.load_texture("canvas", color_image, egui::TextureOptions::NEAREST));
    app.canvas_revision = Some(revision);
}
