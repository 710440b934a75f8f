use crate::error::EditorError;
use crate::history::History;
use crate::image::ImageRef;
use crate::raster;
use crate::stroke::StrokeUpdate;
use crate::surface::Surface;
use crate::tool::{ToolMode, ToolState};
use egui::{Color32, Pos2, Vec2};
use uuid::Uuid;

/// Canvas size of the editing surface, matching the fixed drawing area the
/// surrounding page embeds.
pub const DEFAULT_CANVAS_SIZE: Vec2 = Vec2::new(600.0, 400.0);

/// An in-progress select-mode drag.
struct DragState {
    id: Uuid,
    last: Pos2,
    moved: bool,
}

/// One editing session: the surface, its history and the tool state, driven
/// by pointer events from a single UI event loop.
///
/// Every completed mutation captures exactly one history entry, in the order
/// operations complete; a capture never observes a partially applied stroke.
pub struct EditorSession {
    surface: Surface,
    history: History,
    tools: ToolState,
    drag: Option<DragState>,
    selected: Option<Uuid>,
    revision: u64,
    disposed: bool,
}

impl EditorSession {
    pub fn new(canvas_size: Vec2) -> Self {
        let surface = Surface::new(canvas_size);
        let mut history = History::new();
        // The very first entry captures the initial, background-less state.
        history.capture(surface.snapshot());
        Self {
            surface,
            history,
            tools: ToolState::default(),
            drag: None,
            selected: None,
            revision: 0,
            disposed: false,
        }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    /// Monotonic counter bumped on every visible state change, so the UI can
    /// re-upload its canvas texture only when needed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    /// Mark the session as torn down. Late decode results and stray events
    /// arriving afterwards are ignored rather than applied.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn capture(&mut self) {
        self.history.capture(self.surface.snapshot());
        self.revision += 1;
    }

    // ---- tool configuration (supplied continuously by the surrounding UI)

    pub fn set_tool(&mut self, mode: ToolMode) {
        self.tools.set_mode(mode);
        if mode != ToolMode::Select {
            self.selected = None;
        }
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.tools.set_brush_size(size);
    }

    pub fn set_color(&mut self, color: Color32) {
        self.tools.set_color(color);
    }

    // ---- image upload

    /// Apply a decoded upload: replaces the background, discards all strokes,
    /// and resets history to a single fresh entry.
    pub fn load_image(&mut self, handle: ImageRef) -> Result<(), EditorError> {
        if self.disposed {
            return Err(EditorError::SurfaceDisposed);
        }
        self.surface.load_image(handle)?;
        self.selected = None;
        self.drag = None;
        self.history.clear();
        self.capture();
        Ok(())
    }

    // ---- pointer routing

    pub fn pointer_pressed(&mut self, pos: Pos2) {
        if self.disposed {
            return;
        }
        match self.tools.pen() {
            Some(pen) => {
                if let Err(err) = self.surface.begin_stroke(pen) {
                    // A stray second press mid-drag; keep the first stroke.
                    log::warn!("ignoring pointer press: {err}");
                    return;
                }
                self.surface.append_point(pos);
            }
            // Select mode: pointer input selects and moves objects instead.
            None => {
                self.selected = self.surface.object_at(pos);
                self.drag = self.selected.map(|id| DragState {
                    id,
                    last: pos,
                    moved: false,
                });
            }
        }
    }

    pub fn pointer_moved(&mut self, pos: Pos2) {
        if self.disposed {
            return;
        }
        if self.tools.mode() == ToolMode::Select {
            if let Some(drag) = &mut self.drag {
                let delta = pos - drag.last;
                if delta != Vec2::ZERO {
                    let update = StrokeUpdate {
                        translate: Some(delta),
                        ..Default::default()
                    };
                    let id = drag.id;
                    drag.last = pos;
                    drag.moved = true;
                    if self.surface.modify_object(id, update).is_ok() {
                        self.revision += 1;
                    }
                }
            }
        } else {
            self.surface.append_point(pos);
        }
    }

    pub fn pointer_released(&mut self, pos: Pos2) {
        if self.disposed {
            return;
        }
        if self.tools.mode() != ToolMode::Select {
            self.surface.append_point(pos);
        }
        self.finish_pointer_action();
    }

    /// Finish the current action without a final sample, e.g. when the
    /// pointer leaves the window mid-drag. The stroke drawn so far is still
    /// committed.
    pub fn pointer_canceled(&mut self) {
        if self.disposed {
            return;
        }
        self.finish_pointer_action();
    }

    fn finish_pointer_action(&mut self) {
        if self.tools.mode() == ToolMode::Select {
            // One capture per completed move, not per motion event.
            if let Some(drag) = self.drag.take() {
                if drag.moved {
                    self.capture();
                }
            }
        } else if self.surface.end_stroke().is_some() {
            self.capture();
        }
    }

    /// Points of the stroke being drawn, for the live preview layer.
    pub fn pending_points(&self) -> Option<&[Pos2]> {
        self.surface.pending_points()
    }

    // ---- select-mode object operations

    pub fn remove_object(&mut self, id: Uuid) -> Result<(), EditorError> {
        if self.disposed {
            return Err(EditorError::SurfaceDisposed);
        }
        self.surface.remove_object(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.capture();
        Ok(())
    }

    pub fn modify_object(&mut self, id: Uuid, update: StrokeUpdate) -> Result<(), EditorError> {
        if self.disposed {
            return Err(EditorError::SurfaceDisposed);
        }
        self.surface.modify_object(id, update)?;
        self.capture();
        Ok(())
    }

    /// Remove all strokes, keep the background, capture.
    pub fn clear(&mut self) {
        if self.disposed {
            return;
        }
        self.surface.clear();
        self.selected = None;
        self.capture();
    }

    // ---- history

    pub fn undo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        match self.history.undo() {
            Some(state) => {
                let state = state.clone();
                self.surface.restore(&state);
                self.selected = None;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        match self.history.redo() {
            Some(state) => {
                let state = state.clone();
                self.surface.restore(&state);
                self.selected = None;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ---- exports

    /// The pure black/colored mask bitmap, produced fresh from the committed
    /// stroke list. With no background loaded this is still a valid all-black
    /// mask, not an error.
    pub fn mask_bitmap(&self) -> ::image::RgbaImage {
        raster::rasterize_mask(self.surface.strokes(), self.surface.size())
    }

    /// The `onMaskGenerated` payload: the mask as a PNG data URI.
    pub fn generate_mask(&self) -> Result<String, EditorError> {
        let png = raster::encode_png(&self.mask_bitmap())?;
        Ok(raster::png_data_uri(&png))
    }

    /// PNG bytes of the full composited surface (background plus strokes),
    /// the downloadable snapshot as opposed to the pure mask.
    pub fn surface_png(&self) -> Result<Vec<u8>, EditorError> {
        let composited = raster::render_surface(&self.surface.snapshot(), self.surface.size());
        raster::encode_png(&composited)
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_SIZE)
    }
}
