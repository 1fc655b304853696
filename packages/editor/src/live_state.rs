//! # Live State Manager
//!
//! Single authoritative holder of the working copy.
//!
//! ## Design
//!
//! - Exactly one live document per editing session
//! - Every boundary crossing is a copy: callers get clones in and out,
//!   never a reference into internal storage
//! - `update` stages the mutator on a private draft before committing, so
//!   a panicking mutator cannot leave a half-edited live document behind
//!
//! History entries and autosave reads hold independent copies, which makes
//! them immune to later in-place mutation of the live copy.

use pagecraft_schema::PageSchema;
use serde_json::Error as JsonError;

/// Owns the mutable working copy of one page
#[derive(Debug)]
pub struct LiveState {
    current: PageSchema,
}

impl LiveState {
    pub fn new(initial: PageSchema) -> Self {
        Self { current: initial }
    }

    /// Defensive copy of the working document
    pub fn get(&self) -> PageSchema {
        self.current.clone()
    }

    /// Replace the working copy wholesale
    pub fn set(&mut self, page: PageSchema) {
        self.current = page;
    }

    /// Apply `mutator` to a private draft, commit it, return the committed
    /// copy
    pub fn update(&mut self, mutator: impl FnOnce(&mut PageSchema)) -> PageSchema {
        let mut draft = self.current.clone();
        mutator(&mut draft);
        self.current = draft;
        self.current.clone()
    }

    /// Canonical JSON of the working document (what autosave compares and
    /// persists)
    pub fn serialized(&self) -> Result<String, JsonError> {
        serde_json::to_string(&self.current)
    }

    /// Read-only peek without copying (internal fast path for diffing)
    pub(crate) fn peek(&self) -> &PageSchema {
        &self.current
    }
}
