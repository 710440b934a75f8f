#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() -> eframe::Result {
    env_logger::init();

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([900.0, 520.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Image Inpainting Widget",
        native_options,
        Box::new(|cc| Ok(Box::new(inpaint_canvas::InpaintApp::new(cc)))),
    )
}
