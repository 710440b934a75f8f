use crate::surface::SurfaceState;

/// Linear undo/redo over full surface snapshots.
///
/// Entries up to the cursor form the undo chain; entries past the cursor are
/// redoable until the next capture truncates them. Snapshotting the whole
/// surface (rather than inverse operations) trades memory for robustness:
/// any mutation type undoes the same way. Growth is unbounded by design;
/// sessions are short-lived.
pub struct History {
    entries: Vec<SurfaceState>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a snapshot after a completed mutation, discarding any redo
    /// tail, and advance the cursor to it.
    pub fn capture(&mut self, state: SurfaceState) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(state);
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry and return the snapshot to restore, or `None` if
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<&SurfaceState> {
        if self.cursor == 0 || self.entries.is_empty() {
            log::debug!("nothing to undo");
            return None;
        }
        self.cursor -= 1;
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry and return the snapshot to restore, or `None`
    /// if there is nothing to redo.
    pub fn redo(&mut self) -> Option<&SurfaceState> {
        if self.cursor + 1 >= self.entries.len() {
            log::debug!("nothing to redo");
            return None;
        }
        self.cursor += 1;
        Some(&self.entries[self.cursor])
    }

    /// Returns true if there are entries that can be undone
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there are entries that can be redone
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries, e.g. when a new image replaces the session state.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
