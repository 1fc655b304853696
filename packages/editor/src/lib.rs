//! # Pagecraft Editor
//!
//! Core editing engine for Pagecraft page documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ schema: page documents + component ops      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: session lifecycle + change flow     │
//! │  - Live state with synchronous commits      │
//! │  - Debounced snapshot history (undo/redo)   │
//! │  - Structural diffing into patches          │
//! │  - Keyboard shortcut dispatch               │
//! │  - Autosave pump + version checkpoints      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ stores: DraftStore / VersionStore backends  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Page schema is source of truth**: patches are derived views
//! 2. **Sessions over singletons**: every consumer holds an explicit
//!    `EditorSession` handle, so many pages coexist in one process
//! 3. **Whole-state history**: undo restores a full snapshot rather
//!    than replaying an operation log
//! 4. **Stores are seams**: persistence is reached only through the
//!    `DraftStore` and `VersionStore` traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{EditorSession, KeyEvent};
//! use pagecraft_schema::{ComponentNode, PageSchema};
//!
//! let session = EditorSession::new(PageSchema::new("page-1", "Home"));
//!
//! // Edits commit to live state immediately; the history entry and
//! // change patches follow from the same call
//! session.update_state(|page| {
//!     page.components.push(ComponentNode::new("hero", "section"));
//! });
//!
//! // Ctrl+Z arriving from the UI layer
//! let handled = session.handle_key(&KeyEvent {
//!     key: "z".into(),
//!     ctrl: true,
//!     ..Default::default()
//! });
//! assert!(handled);
//! ```

mod autosave;
mod controller;
mod differ;
mod history;
mod live_state;
mod patch;
mod persist;
mod shortcuts;
mod versions;

pub use autosave::{AutosavePump, AutosaveStatus};
pub use controller::{EditorCommand, EditorOptions, EditorSession};
pub use differ::create_patch;
pub use history::{History, HistoryEntry};
pub use live_state::LiveState;
pub use patch::{apply_patch, PatchError, PatchOperation, ReplaceValue};
pub use persist::{DraftStore, PersistenceError, VersionRecord, VersionStore};
pub use shortcuts::{KeyChord, KeyEvent, ShortcutError, ShortcutMap};
pub use versions::VersionHistory;

// Re-export common types for convenience
pub use pagecraft_schema::{ComponentNode, ComponentOperation, PageSchema};
