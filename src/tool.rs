use crate::stroke::CompositeMode;
use egui::Color32;
use serde::{Deserialize, Serialize};

/// Brush sizes the surrounding UI may supply.
pub const MIN_BRUSH_SIZE: f32 = 1.0;
pub const MAX_BRUSH_SIZE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolMode {
    Brush,
    Eraser,
    Select,
}

/// Attributes applied to the next stroke at creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenConfig {
    pub color: Color32,
    pub width: f32,
    pub composite: CompositeMode,
}

/// The tool state machine: a closed set of modes with one pen configuration
/// per mode. Transitions happen only on explicit tool selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolState {
    mode: ToolMode,
    brush_color: Color32,
    brush_size: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            mode: ToolMode::Brush,
            brush_color: Color32::WHITE,
            brush_size: 5.0,
        }
    }
}

impl ToolState {
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        if self.mode != mode {
            log::debug!("tool changed: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Brush size is supplied continuously by the UI and applies to whichever
    /// pen is active; it does not trigger a mode transition.
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    /// Remember the selected paint color. The color takes effect immediately
    /// in brush mode; the eraser pen is forced and never picks it up.
    pub fn set_color(&mut self, color: Color32) {
        self.brush_color = color;
    }

    pub fn color(&self) -> Color32 {
        self.brush_color
    }

    /// The pen configuration for the next stroke, or `None` in select mode,
    /// where pointer input does not create strokes.
    pub fn pen(&self) -> Option<PenConfig> {
        match self.mode {
            ToolMode::Brush => Some(PenConfig {
                color: self.brush_color,
                width: self.brush_size,
                composite: CompositeMode::PaintOver,
            }),
            // Opaque erase configuration; the selected color is irrelevant.
            ToolMode::Eraser => Some(PenConfig {
                color: Color32::BLACK,
                width: self.brush_size,
                composite: CompositeMode::Erase,
            }),
            ToolMode::Select => None,
        }
    }
}
