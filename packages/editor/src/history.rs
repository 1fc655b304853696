//! # History Manager
//!
//! Bounded undo/redo over whole-document snapshots.
//!
//! ## Design
//!
//! - Each entry is a deep copy of the full page state, plus an optional note
//! - A cursor points at the entry matching the live document
//! - Undo/redo move the cursor and hand back a copy of the landed-on state
//! - Pushing after an undo discards the abandoned future branch
//! - Beyond `max_states` the oldest entry is evicted
//!
//! Snapshots trade memory for simplicity: there are no inverse operations
//! to derive, and a corrupt entry cannot poison its neighbors. Pages are
//! small trees, so a copy per edit burst is cheap.
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut history = History::new();
//! history.push(page.clone(), Some("Add hero".to_string()));
//!
//! if let Some(previous) = history.undo() {
//!     live.set(previous);
//! }
//! ```

use pagecraft_schema::PageSchema;

/// One recorded document state
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Full snapshot of the page at commit time
    pub state: PageSchema,

    /// Optional label for undo/redo menu items
    pub note: Option<String>,
}

/// Snapshot-based undo/redo stack
#[derive(Debug)]
pub struct History {
    /// Recorded states, oldest first
    entries: Vec<HistoryEntry>,

    /// Index of the entry matching the live document; `None` when empty
    cursor: Option<usize>,

    /// Maximum number of retained states (0 = unlimited)
    max_states: usize,
}

impl History {
    /// Create a history with the default capacity (50 states)
    pub fn new() -> Self {
        Self::with_max_states(50)
    }

    /// Create a history with a custom capacity
    pub fn with_max_states(max_states: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_states,
        }
    }

    /// Record a new state as the latest entry.
    ///
    /// Entries after the cursor (the redo branch) are discarded first, so a
    /// push after undo abandons the old future.
    pub fn push(&mut self, state: PageSchema, note: Option<String>) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(HistoryEntry { state, note });

        if self.max_states > 0 && self.entries.len() > self.max_states {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one state, if any precedes the cursor
    pub fn undo(&mut self) -> Option<PageSchema> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        Some(self.entries[cursor - 1].state.clone())
    }

    /// Step forward one state, if a prior undo left one ahead
    pub fn redo(&mut self) -> Option<PageSchema> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        Some(self.entries[cursor + 1].state.clone())
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    /// Copy of the entry the cursor points at
    pub fn current(&self) -> Option<PageSchema> {
        self.cursor.map(|cursor| self.entries[cursor].state.clone())
    }

    /// Note of the edit undo would revert (for "Undo <note>" menu labels)
    pub fn undo_note(&self) -> Option<&str> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.entries[cursor].note.as_deref()
    }

    /// Note of the edit redo would reapply
    pub fn redo_note(&self) -> Option<&str> {
        let cursor = self.cursor?;
        self.entries.get(cursor + 1)?.note.as_deref()
    }

    /// Number of states undo can reach
    pub fn undo_levels(&self) -> usize {
        self.cursor.unwrap_or(0)
    }

    /// Number of states redo can reach
    pub fn redo_levels(&self) -> usize {
        match self.cursor {
            Some(cursor) => self.entries.len() - 1 - cursor,
            None => 0,
        }
    }

    /// Total recorded states
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all recorded states
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
