use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// One command of a stroke's path, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Start a new subpath.
    MoveTo(Pos2),
    LineTo(Pos2),
    /// Quadratic curve to `to` with control point `control`.
    QuadTo { control: Pos2, to: Pos2 },
}

/// How a stroke combines with the pixels beneath it.
///
/// Stored on the stroke at creation time and never derived from the current
/// tool, so replaying a snapshot honors each stroke's own mode regardless of
/// which tool is selected when it is redisplayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeMode {
    /// Draw the stroke color over existing pixels.
    PaintOver,
    /// Punch through to the background (destination-out).
    Erase,
}

// Immutable stroke for sharing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stroke {
    id: Uuid,
    path: Vec<PathCommand>,
    color: Color32,
    width: f32,
    composite: CompositeMode,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

/// Attribute changes applied to an existing stroke in select mode.
/// Modification always replaces the stroke; strokes themselves never mutate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrokeUpdate {
    pub translate: Option<Vec2>,
    pub color: Option<Color32>,
    pub width: Option<f32>,
}

impl Stroke {
    pub fn new(path: Vec<PathCommand>, color: Color32, width: f32, composite: CompositeMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            path,
            color,
            width,
            composite,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &[PathCommand] {
        &self.path
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn composite(&self) -> CompositeMode {
        self.composite
    }

    /// Produce a copy with the update applied, keeping the same id.
    pub fn with_update(&self, update: StrokeUpdate) -> Self {
        let delta = update.translate.unwrap_or(Vec2::ZERO);
        let path = self
            .path
            .iter()
            .map(|cmd| match *cmd {
                PathCommand::MoveTo(p) => PathCommand::MoveTo(p + delta),
                PathCommand::LineTo(p) => PathCommand::LineTo(p + delta),
                PathCommand::QuadTo { control, to } => PathCommand::QuadTo {
                    control: control + delta,
                    to: to + delta,
                },
            })
            .collect();
        Self {
            id: self.id,
            path,
            color: update.color.unwrap_or(self.color),
            width: update.width.unwrap_or(self.width),
            composite: self.composite,
        }
    }

    /// Flatten the path into polyline subpaths. Quadratic segments are
    /// subdivided finely enough for rasterization and hit testing.
    pub fn flatten(&self) -> Vec<Vec<Pos2>> {
        const QUAD_STEPS: usize = 16;
        let mut subpaths: Vec<Vec<Pos2>> = Vec::new();
        for cmd in &self.path {
            match *cmd {
                PathCommand::MoveTo(p) => subpaths.push(vec![p]),
                PathCommand::LineTo(p) => {
                    if let Some(current) = subpaths.last_mut() {
                        current.push(p);
                    } else {
                        subpaths.push(vec![p]);
                    }
                }
                PathCommand::QuadTo { control, to } => {
                    if subpaths.last().is_none() {
                        subpaths.push(vec![control]);
                    }
                    let current = subpaths.last_mut().unwrap();
                    let from = *current.last().unwrap();
                    for i in 1..=QUAD_STEPS {
                        let t = i as f32 / QUAD_STEPS as f32;
                        let a = from.lerp(control, t);
                        let b = control.lerp(to, t);
                        current.push(a.lerp(b, t));
                    }
                }
            }
        }
        subpaths
    }

    /// Whether `pos` lies on the stroke, within half the stroke width plus a
    /// small pick tolerance. Used by select-mode hit testing.
    pub fn hit_test(&self, pos: Pos2, tolerance: f32) -> bool {
        let reach = self.width / 2.0 + tolerance;
        for subpath in self.flatten() {
            if subpath.len() == 1 {
                if subpath[0].distance(pos) <= reach {
                    return true;
                }
                continue;
            }
            for pair in subpath.windows(2) {
                if distance_to_segment(pos, pair[0], pair[1]) <= reach {
                    return true;
                }
            }
        }
        false
    }
}

fn distance_to_segment(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

// Mutable stroke for accumulating pointer samples during a drag
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    width: f32,
    composite: CompositeMode,
}

impl MutableStroke {
    pub fn new(color: Color32, width: f32, composite: CompositeMode) -> Self {
        Self {
            points: Vec::new(),
            color,
            width,
            composite,
        }
    }

    /// Add a pointer sample, skipping exact repeats.
    pub fn add_point(&mut self, point: Pos2) {
        if self.points.last() != Some(&point) {
            self.points.push(point);
        }
    }

    // Get a reference to the points for preview
    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Convert the sampled polyline into an immutable stroke.
    ///
    /// Two samples produce a straight `MoveTo`/`LineTo` pair; longer drags are
    /// smoothed with quadratic curves through segment midpoints, the classic
    /// pencil-brush smoothing.
    pub fn to_stroke(&self) -> Stroke {
        let mut path = Vec::with_capacity(self.points.len());
        match self.points.as_slice() {
            [] => {}
            [only] => path.push(PathCommand::MoveTo(*only)),
            [a, b] => {
                path.push(PathCommand::MoveTo(*a));
                path.push(PathCommand::LineTo(*b));
            }
            points => {
                path.push(PathCommand::MoveTo(points[0]));
                for i in 1..points.len() - 1 {
                    let control = points[i];
                    let to = control.lerp(points[i + 1], 0.5);
                    path.push(PathCommand::QuadTo { control, to });
                }
                path.push(PathCommand::LineTo(points[points.len() - 1]));
            }
        }
        Stroke::new(path, self.color, self.width, self.composite)
    }

    // Convert to a reference-counted StrokeRef
    pub fn to_stroke_ref(&self) -> StrokeRef {
        Arc::new(self.to_stroke())
    }
}
