use crate::error::EditorError;
use crate::geometry::FitTransform;
use crate::image::ImageRef;
use crate::stroke::{MutableStroke, StrokeRef, StrokeUpdate};
use crate::tool::PenConfig;
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Pick tolerance for select-mode hit testing, in canvas pixels.
const HIT_TOLERANCE: f32 = 3.0;

/// A point-in-time snapshot of the surface, used as a history entry.
///
/// Structural and cheap to clone: the background and the strokes are
/// immutable and `Arc`-shared, so a restored snapshot can never alias live
/// state that is still being mutated forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceState {
    pub background: Option<ImageRef>,
    pub fit: Option<FitTransform>,
    pub strokes: Vec<StrokeRef>,
}

/// The live editable state: background image plus ordered stroke list.
/// Insertion order is paint order is replay order.
pub struct Surface {
    size: Vec2,
    background: Option<ImageRef>,
    fit: Option<FitTransform>,
    strokes: Vec<StrokeRef>,
    pending: Option<MutableStroke>,
}

impl Surface {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            background: None,
            fit: None,
            strokes: Vec::new(),
            pending: None,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn background(&self) -> Option<&ImageRef> {
        self.background.as_ref()
    }

    pub fn fit(&self) -> Option<FitTransform> {
        self.fit
    }

    /// The ordered stroke list, read-only, for rasterization and the UI.
    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    /// Set a new background. Discards all existing strokes and any pending
    /// one; the image is replaced, never merged.
    pub fn load_image(&mut self, handle: ImageRef) -> Result<(), EditorError> {
        let fit = FitTransform::fit_to_canvas(self.size, handle.size())?;
        self.background = Some(handle);
        self.fit = Some(fit);
        self.strokes.clear();
        self.pending = None;
        Ok(())
    }

    /// Start accumulating a stroke with the given pen. Only one stroke may be
    /// pending at a time.
    pub fn begin_stroke(&mut self, pen: PenConfig) -> Result<(), EditorError> {
        if self.pending.is_some() {
            return Err(EditorError::StrokeInProgress);
        }
        self.pending = Some(MutableStroke::new(pen.color, pen.width, pen.composite));
        Ok(())
    }

    /// Add a pointer sample to the pending stroke. Ignored when no stroke is
    /// in progress (e.g. a drag that started outside the canvas).
    pub fn append_point(&mut self, pos: Pos2) {
        if let Some(pending) = &mut self.pending {
            pending.add_point(pos);
        }
    }

    /// Commit the pending stroke to the object list. Returns the committed
    /// stroke, or `None` if nothing was pending or no point was sampled.
    pub fn end_stroke(&mut self) -> Option<StrokeRef> {
        let pending = self.pending.take()?;
        if pending.is_empty() {
            return None;
        }
        let stroke = pending.to_stroke_ref();
        self.strokes.push(Arc::clone(&stroke));
        Some(stroke)
    }

    /// Points of the stroke currently being drawn, for live preview only.
    pub fn pending_points(&self) -> Option<&[Pos2]> {
        self.pending.as_ref().map(|p| p.points())
    }

    /// Topmost stroke under `pos`, for select mode.
    pub fn object_at(&self, pos: Pos2) -> Option<Uuid> {
        self.strokes
            .iter()
            .rev()
            .find(|s| s.hit_test(pos, HIT_TOLERANCE))
            .map(|s| s.id())
    }

    /// Remove a stroke by id (select mode).
    pub fn remove_object(&mut self, id: Uuid) -> Result<(), EditorError> {
        let index = self
            .strokes
            .iter()
            .position(|s| s.id() == id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        self.strokes.remove(index);
        Ok(())
    }

    /// Replace a stroke with an updated copy, preserving its paint order.
    pub fn modify_object(&mut self, id: Uuid, update: StrokeUpdate) -> Result<(), EditorError> {
        let index = self
            .strokes
            .iter()
            .position(|s| s.id() == id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        self.strokes[index] = Arc::new(self.strokes[index].with_update(update));
        Ok(())
    }

    /// Remove all strokes but keep the background image.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.pending = None;
    }

    /// Capture a structural snapshot of the committed state. A pending stroke
    /// is deliberately not part of the snapshot; captures happen after the
    /// mutation completes, never mid-stroke.
    pub fn snapshot(&self) -> SurfaceState {
        SurfaceState {
            background: self.background.clone(),
            fit: self.fit,
            strokes: self.strokes.clone(),
        }
    }

    /// Restore a snapshot, dropping any pending stroke. Each restored stroke
    /// keeps its own stored composite mode; the currently selected tool has
    /// no influence on how it replays.
    pub fn restore(&mut self, state: &SurfaceState) {
        self.background = state.background.clone();
        self.fit = state.fit;
        self.strokes = state.strokes.clone();
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::CompositeMode;
    use crate::tool::{ToolMode, ToolState};
    use egui::Color32;

    fn pen() -> PenConfig {
        ToolState::default().pen().unwrap()
    }

    fn draw_line(surface: &mut Surface, from: Pos2, to: Pos2) -> StrokeRef {
        surface.begin_stroke(pen()).unwrap();
        surface.append_point(from);
        surface.append_point(to);
        surface.end_stroke().unwrap()
    }

    #[test]
    fn test_only_one_stroke_may_be_pending() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        surface.begin_stroke(pen()).unwrap();
        assert!(matches!(
            surface.begin_stroke(pen()),
            Err(EditorError::StrokeInProgress)
        ));
    }

    #[test]
    fn test_empty_drag_commits_nothing() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        surface.begin_stroke(pen()).unwrap();
        assert!(surface.end_stroke().is_none());
        assert!(surface.strokes().is_empty());
    }

    #[test]
    fn test_clear_keeps_background() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        let handle = Arc::new(
            crate::image::ImageHandle::from_rgba8(vec![0; 4 * 4 * 4], 4, 4).unwrap(),
        );
        surface.load_image(handle).unwrap();
        draw_line(&mut surface, Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        surface.clear();
        assert!(surface.strokes().is_empty());
        assert!(surface.background().is_some());
    }

    #[test]
    fn test_restore_honors_stored_composite_mode() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        let mut tools = ToolState::default();
        tools.set_mode(ToolMode::Eraser);
        surface.begin_stroke(tools.pen().unwrap()).unwrap();
        surface.append_point(Pos2::new(0.0, 0.0));
        surface.append_point(Pos2::new(10.0, 10.0));
        surface.end_stroke().unwrap();

        let snapshot = surface.snapshot();
        // Redisplay while a different tool is selected.
        tools.set_mode(ToolMode::Brush);
        surface.restore(&snapshot);
        assert_eq!(surface.strokes()[0].composite(), CompositeMode::Erase);
    }

    #[test]
    fn test_modify_object_preserves_paint_order() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        let first = draw_line(&mut surface, Pos2::new(0.0, 0.0), Pos2::new(10.0, 0.0));
        draw_line(&mut surface, Pos2::new(0.0, 10.0), Pos2::new(10.0, 10.0));
        surface
            .modify_object(
                first.id(),
                StrokeUpdate {
                    color: Some(Color32::BLUE),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(surface.strokes()[0].id(), first.id());
        assert_eq!(surface.strokes()[0].color(), Color32::BLUE);
    }

    #[test]
    fn test_remove_unknown_object_reports_not_found() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        let id = Uuid::new_v4();
        assert!(matches!(
            surface.remove_object(id),
            Err(EditorError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_object_at_picks_topmost() {
        let mut surface = Surface::new(Vec2::new(600.0, 400.0));
        draw_line(&mut surface, Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0));
        let top = draw_line(&mut surface, Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0));
        assert_eq!(surface.object_at(Pos2::new(50.0, 0.0)), Some(top.id()));
        assert_eq!(surface.object_at(Pos2::new(300.0, 300.0)), None);
    }
}
