//! # Editor Controller
//!
//! One `EditorSession` per edited page, owning the history manager, the
//! live state and the shortcut map.
//!
//! ## Design
//!
//! - The handle is cheaply cloneable (`Arc<Mutex<SessionCore>>`); every
//!   consumer receives an explicit session handle, so many pages can be
//!   edited concurrently in one process
//! - Edits commit to live state synchronously; the history push is
//!   debounced, so a burst of rapid edits collapses into one entry
//! - Undo/redo cancel any pending debounced push before pulling from
//!   history, then emit only the state-changed notification
//! - Callbacks are invoked after the session lock is released, so a
//!   subscriber may call back into the session
//!
//! The session must live on a tokio runtime: debounce timers are spawned
//! tasks. The core mutex is never held across an await.
//!
//! ## Notification Flow
//!
//! ```text
//! update_state(mutator)
//!   ├── commit to live state
//!   ├── create_patch(before, after)
//!   ├── (schedule debounced history push)
//!   ├── on_patch_created(&patches)
//!   └── on_state_change(&committed)
//! ```

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

use pagecraft_schema::{ComponentOperation, IdGenerator, OperationError, PageSchema};

use crate::differ::create_patch;
use crate::history::History;
use crate::live_state::LiveState;
use crate::patch::PatchOperation;
use crate::shortcuts::{KeyEvent, ShortcutError, ShortcutMap};

/// Commands reachable from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Undo,
    Redo,
}

/// Tunables for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorOptions {
    /// History capacity (0 = unlimited)
    pub max_history_states: usize,

    /// Quiet window before an edit burst is committed to history
    pub history_debounce: Duration,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            max_history_states: 50,
            history_debounce: Duration::from_millis(500),
        }
    }
}

type StateCallback = Arc<dyn Fn(&PageSchema) + Send + Sync>;
type PatchCallback = Arc<dyn Fn(&[PatchOperation]) + Send + Sync>;

struct SessionCore {
    live: LiveState,
    history: History,
    shortcuts: ShortcutMap<EditorCommand>,
    idgen: IdGenerator,
    debounce: Duration,

    /// Timer task for the scheduled history push, if any
    pending_push: Option<JoinHandle<()>>,

    /// Bumped on every schedule/cancel; a timer that fires with a stale
    /// epoch was superseded and must not push
    push_epoch: u64,

    on_state_change: Option<StateCallback>,
    on_patch_created: Option<PatchCallback>,
}

/// Cloneable handle to one page's editing session
#[derive(Clone)]
pub struct EditorSession {
    core: Arc<Mutex<SessionCore>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession").finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Open a session with default options
    pub fn new(initial: PageSchema) -> Self {
        Self::with_options(initial, EditorOptions::default())
    }

    /// Open a session; the initial document becomes the first history
    /// entry, so a fully-undone session lands back on it.
    pub fn with_options(initial: PageSchema, options: EditorOptions) -> Self {
        let mut idgen = IdGenerator::new(&initial.id);
        let ids = initial.collect_ids();
        idgen.skip_past(ids.iter().map(String::as_str));

        let mut history = History::with_max_states(options.max_history_states);
        history.push(initial.clone(), None);

        Self {
            core: Arc::new(Mutex::new(SessionCore {
                live: LiveState::new(initial),
                history,
                shortcuts: default_shortcuts(),
                idgen,
                debounce: options.history_debounce,
                pending_push: None,
                push_epoch: 0,
                on_state_change: None,
                on_patch_created: None,
            })),
        }
    }

    /// Id of the page this session edits
    pub fn page_id(&self) -> String {
        self.core.lock().unwrap().live.peek().id.clone()
    }

    /// Defensive copy of the working document
    pub fn current_state(&self) -> PageSchema {
        self.core.lock().unwrap().live.get()
    }

    /// Canonical JSON of the working document (the autosave pump polls
    /// this)
    pub fn serialized(&self) -> Result<String, serde_json::Error> {
        self.core.lock().unwrap().live.serialized()
    }

    /// Apply `mutator` to the document and commit.
    ///
    /// Synchronous: the committed document is returned. Subscribers are
    /// notified (patch first, then state) and a debounced history push is
    /// scheduled.
    pub fn update_state(&self, mutator: impl FnOnce(&mut PageSchema)) -> PageSchema {
        let (committed, patches, on_patch, on_state) = {
            let mut core = self.core.lock().unwrap();
            let before = core.live.get();
            let committed = core.live.update(mutator);
            let patches = create_patch(&before, &committed);
            self.schedule_push(&mut core, None);
            (
                committed,
                patches,
                core.on_patch_created.clone(),
                core.on_state_change.clone(),
            )
        };

        if let Some(callback) = on_patch {
            callback(&patches);
        }
        if let Some(callback) = on_state {
            callback(&committed);
        }
        committed
    }

    /// Replace the document wholesale (version restore enters here)
    pub fn set_state(&self, page: PageSchema) -> PageSchema {
        self.update_state(move |draft| *draft = page)
    }

    /// Validate and apply a semantic operation through the normal commit
    /// path; the eventual history entry is annotated with the operation's
    /// label.
    pub fn apply_operation(&self, op: &ComponentOperation) -> Result<PageSchema, OperationError> {
        let (committed, patches, on_patch, on_state) = {
            let mut core = self.core.lock().unwrap();
            let core = &mut *core;

            let before = core.live.get();
            let mut draft = before.clone();
            op.apply(&mut draft, &mut core.idgen)?;

            core.live.set(draft);
            let committed = core.live.get();
            let patches = create_patch(&before, &committed);
            self.schedule_push(core, Some(op.describe()));
            (
                committed,
                patches,
                core.on_patch_created.clone(),
                core.on_state_change.clone(),
            )
        };

        if let Some(callback) = on_patch {
            callback(&patches);
        }
        if let Some(callback) = on_state {
            callback(&committed);
        }
        Ok(committed)
    }

    /// Step back one history entry.
    ///
    /// Cancels any pending debounced push first. Emits only the
    /// state-changed notification: undo replays a previously observed
    /// change, so no new patch is computed. Returns `None` when there is
    /// nothing to undo.
    pub fn undo(&self) -> Option<PageSchema> {
        let (restored, on_state) = {
            let mut core = self.core.lock().unwrap();
            cancel_pending(&mut core);
            match core.history.undo() {
                Some(state) => {
                    core.live.set(state.clone());
                    (state, core.on_state_change.clone())
                }
                None => return None,
            }
        };

        if let Some(callback) = on_state {
            callback(&restored);
        }
        Some(restored)
    }

    /// Step forward one history entry; mirror of [`undo`](Self::undo)
    pub fn redo(&self) -> Option<PageSchema> {
        let (restored, on_state) = {
            let mut core = self.core.lock().unwrap();
            cancel_pending(&mut core);
            match core.history.redo() {
                Some(state) => {
                    core.live.set(state.clone());
                    (state, core.on_state_change.clone())
                }
                None => return None,
            }
        };

        if let Some(callback) = on_state {
            callback(&restored);
        }
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.core.lock().unwrap().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.core.lock().unwrap().history.can_redo()
    }

    /// Label for the "Undo ..." menu item
    pub fn undo_note(&self) -> Option<String> {
        self.core
            .lock()
            .unwrap()
            .history
            .undo_note()
            .map(str::to_string)
    }

    /// Label for the "Redo ..." menu item
    pub fn redo_note(&self) -> Option<String> {
        self.core
            .lock()
            .unwrap()
            .history
            .redo_note()
            .map(str::to_string)
    }

    /// Committed history depth behind the cursor
    pub fn undo_levels(&self) -> usize {
        self.core.lock().unwrap().history.undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.core.lock().unwrap().history.redo_levels()
    }

    /// Resolve a key event against the shortcut map and execute it.
    ///
    /// Returns true when the chord was bound, whether or not the command
    /// had any effect; the host uses this to suppress default handling.
    pub fn handle_key(&self, event: &KeyEvent) -> bool {
        let command = {
            let core = self.core.lock().unwrap();
            core.shortcuts.resolve(event).copied()
        };
        match command {
            Some(EditorCommand::Undo) => {
                self.undo();
                true
            }
            Some(EditorCommand::Redo) => {
                self.redo();
                true
            }
            None => false,
        }
    }

    /// Bind a chord spec to a command, replacing defaults if they collide
    pub fn bind_shortcut(&self, spec: &str, command: EditorCommand) -> Result<(), ShortcutError> {
        self.core.lock().unwrap().shortcuts.bind(spec, command)
    }

    pub fn unbind_shortcut(&self, spec: &str) -> Result<(), ShortcutError> {
        self.core.lock().unwrap().shortcuts.unbind(spec)
    }

    /// Subscribe to committed documents (render surface attach point)
    pub fn set_on_state_change(&self, callback: impl Fn(&PageSchema) + Send + Sync + 'static) {
        self.core.lock().unwrap().on_state_change = Some(Arc::new(callback));
    }

    /// Subscribe to computed patches (sync/logging attach point)
    pub fn set_on_patch_created(
        &self,
        callback: impl Fn(&[PatchOperation]) + Send + Sync + 'static,
    ) {
        self.core.lock().unwrap().on_patch_created = Some(Arc::new(callback));
    }

    /// Arm (or re-arm) the debounced history push. Must be called with the
    /// core lock held.
    fn schedule_push(&self, core: &mut SessionCore, note: Option<String>) {
        cancel_pending(core);
        let epoch = core.push_epoch;
        let debounce = core.debounce;
        let shared = Arc::clone(&self.core);

        core.pending_push = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let mut core = shared.lock().unwrap();
            if core.push_epoch != epoch {
                // Superseded while we slept
                return;
            }
            let state = core.live.get();
            core.history.push(state, note);
            core.pending_push = None;
        }));
    }
}

/// Abort the pending push and invalidate its epoch, so a timer already
/// past its sleep cannot commit a stale entry.
fn cancel_pending(core: &mut SessionCore) {
    core.push_epoch += 1;
    if let Some(handle) = core.pending_push.take() {
        handle.abort();
    }
}

fn default_shortcuts() -> ShortcutMap<EditorCommand> {
    let mut map = ShortcutMap::new();
    for (spec, command) in [
        ("mod+z", EditorCommand::Undo),
        ("mod+shift+z", EditorCommand::Redo),
        ("ctrl+y", EditorCommand::Redo),
        ("meta+y", EditorCommand::Redo),
    ] {
        // Specs are literals; parsing cannot fail
        let _ = map.bind(spec, command);
    }
    map
}
