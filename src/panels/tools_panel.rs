use crate::app::InpaintApp;
use crate::tool::{ToolMode, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use eframe::egui::{self, Slider};

pub fn tools_panel(app: &mut InpaintApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Tools");
            ui.separator();

            let current = app.session.tools().mode();
            ui.horizontal(|ui| {
                if ui
                    .selectable_label(current == ToolMode::Brush, "🖌 Brush")
                    .clicked()
                {
                    app.session.set_tool(ToolMode::Brush);
                }
                if ui
                    .selectable_label(current == ToolMode::Eraser, "⌫ Eraser")
                    .clicked()
                {
                    app.session.set_tool(ToolMode::Eraser);
                }
                if ui
                    .selectable_label(current == ToolMode::Select, "↖ Select")
                    .clicked()
                {
                    app.session.set_tool(ToolMode::Select);
                }
            });

            ui.separator();

            // Color selection takes effect in brush mode only; the session
            // remembers it across an eraser detour.
            let mut color = app.session.tools().color();
            ui.horizontal(|ui| {
                ui.label("Color:");
                if egui::color_picker::color_edit_button_srgba(
                    ui,
                    &mut color,
                    egui::color_picker::Alpha::Opaque,
                )
                .changed()
                {
                    app.session.set_color(color);
                }
            });

            // Brush size is supplied continuously, whatever the active pen.
            let mut size = app.session.tools().brush_size();
            ui.horizontal(|ui| {
                ui.label("Brush size:");
                if ui
                    .add(Slider::new(&mut size, MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).integer())
                    .changed()
                {
                    app.session.set_brush_size(size);
                }
            });

            ui.separator();

            ui.horizontal(|ui| {
                let can_undo = app.session.can_undo();
                let can_redo = app.session.can_redo();
                if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                    app.session.undo();
                }
                if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                    app.session.redo();
                }
            });

            if let Some(id) = app.session.selected() {
                if ui.button("Delete selected").clicked() {
                    if let Err(err) = app.session.remove_object(id) {
                        log::warn!("delete failed: {err}");
                    }
                }
            }

            ui.separator();

            if ui.button("Generate Mask").clicked() {
                generate_mask(app, ctx);
            }
            if ui.button("Save Mask").clicked() {
                save_surface(app);
            }
            if ui.button("Clear Drawing").clicked() {
                app.session.clear();
            }

            // Result display, side by side with the editor.
            if let Some(mask) = &app.mask_texture {
                ui.separator();
                ui.heading("Mask");
                let scale = ui.available_width() / mask.size_vec2().x;
                ui.image((mask.id(), mask.size_vec2() * scale.min(1.0)));
            }
        });
}

fn generate_mask(app: &mut InpaintApp, ctx: &egui::Context) {
    match app.session.generate_mask() {
        Ok(data_uri) => {
            let bitmap = app.session.mask_bitmap();
            let (w, h) = bitmap.dimensions();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(
                [w as usize, h as usize],
                bitmap.as_raw(),
            );
            app.mask_texture =
                Some(ctx.load_texture("mask_result", color_image, egui::TextureOptions::NEAREST));
            app.mask_data_uri = Some(data_uri);
        }
        Err(err) => log::error!("mask generation failed: {err}"),
    }
}

fn save_surface(app: &InpaintApp) {
    #[cfg(not(target_arch = "wasm32"))]
    match app.session.surface_png() {
        Ok(bytes) => {
            if let Err(err) = std::fs::write("mask.png", &bytes) {
                log::error!("failed to save mask.png: {err}");
            } else {
                log::info!("saved mask.png ({} bytes)", bytes.len());
            }
        }
        Err(err) => log::error!("surface export failed: {err}"),
    }
    #[cfg(target_arch = "wasm32")]
    let _ = app;
}
