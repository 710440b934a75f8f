use crate::loader::ImageLoader;
use crate::session::EditorSession;
use eframe::egui;

/// The eframe application shell around one editing session.
///
/// Everything interactive lives in the panels; this struct owns the session,
/// the decode boundary and the GPU-side textures derived from session state.
pub struct InpaintApp {
    pub(crate) session: EditorSession,
    pub(crate) loader: ImageLoader,
    // Composited canvas, re-uploaded when the session revision changes.
    pub(crate) canvas_texture: Option<egui::TextureHandle>,
    pub(crate) canvas_revision: Option<u64>,
    // Result display: the most recently generated mask.
    pub(crate) mask_texture: Option<egui::TextureHandle>,
    pub(crate) mask_data_uri: Option<String>,
}

impl InpaintApp {
    /// Called once before the first frame.
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            session: EditorSession::default(),
            loader: ImageLoader::new(),
            canvas_texture: None,
            canvas_revision: None,
            mask_texture: None,
            mask_data_uri: None,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    /// Queue any newly dropped files for decoding. Only PNG/JPEG uploads are
    /// considered; anything else is ignored without touching session state.
    fn check_for_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if !is_supported_upload(&file) {
                log::warn!("ignoring unsupported upload: {}", file.name);
                continue;
            }
            if let Some(bytes) = upload_bytes(&file) {
                log::info!("upload received: {} ({} bytes)", file.name, bytes.len());
                self.loader.spawn_decode(bytes);
            }
        }
    }

    /// Apply a completed decode, unless the session has been torn down in the
    /// meantime.
    fn poll_decoded_image(&mut self, ctx: &egui::Context) {
        let Some(result) = self.loader.poll() else {
            return;
        };
        if self.session.is_disposed() {
            log::debug!("decode finished after disposal, dropping result");
            return;
        }
        match result.and_then(|handle| self.session.load_image(handle)) {
            Ok(()) => {
                // A new image invalidates the previous mask result.
                self.mask_texture = None;
                self.mask_data_uri = None;
                ctx.request_repaint();
            }
            Err(err) => log::warn!("upload not applied: {err}"),
        }
    }
}

impl eframe::App for InpaintApp {
    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_for_dropped_files(ctx);
        self.poll_decoded_image(ctx);
        if self.loader.in_flight() {
            // Keep polling until the decode lands.
            ctx.request_repaint();
        }

        egui::Window::new("Session Debug")
            .default_open(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Strokes: {}",
                    self.session.surface().strokes().len()
                ));
                ui.label(format!("History entries: {}", self.session.history_len()));
                ui.label(format!("Tool: {:?}", self.session.tools().mode()));
                if ui.button("Dump state to log").clicked() {
                    match serde_json::to_string(&self.session.surface().snapshot()) {
                        Ok(json) => log::info!("surface state: {json}"),
                        Err(err) => log::error!("state serialization failed: {err}"),
                    }
                }
            });

        crate::panels::tools_panel(self, ctx);
        crate::panels::central_panel(self, ctx);
    }
}

fn is_supported_upload(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return matches!(file.mime.as_str(), "image/png" | "image/jpeg");
    }
    if let Some(path) = &file.path {
        if let Some(ext) = path.extension() {
            let ext = ext.to_string_lossy().to_lowercase();
            return matches!(ext.as_str(), "png" | "jpg" | "jpeg");
        }
    }
    false
}

fn upload_bytes(file: &egui::DroppedFile) -> Option<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Some(bytes.to_vec());
    }
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = &file.path {
        match std::fs::read(path) {
            Ok(bytes) => return Some(bytes),
            Err(err) => log::error!("failed to read upload {}: {err}", path.display()),
        }
    }
    None
}
