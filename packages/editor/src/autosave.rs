//! # Autosave Pump
//!
//! Background draft persistence for one editing session.
//!
//! ## Design
//!
//! - A spawned interval task serializes the live document each tick and
//!   compares it against the last serialization the store accepted.
//!   Identical content skips the store entirely
//! - `last_saved` advances only on a successful write; a failure surfaces
//!   through the injected error callback and the next tick retries
//! - The session lock is held only long enough to serialize, never
//!   across a store call
//! - `shutdown` stops the interval and performs one final flush when
//!   unsaved edits remain
//!
//! The first tick fires one full interval after `start`, so a session
//! opened and immediately closed never touches the store.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use crate::controller::EditorSession;
use crate::persist::{DraftStore, PersistenceError};

type ErrorCallback = Arc<dyn Fn(&PersistenceError) + Send + Sync>;

/// Snapshot of the pump's health
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveStatus {
    /// True when the live document differs from the last saved draft
    pub dirty: bool,

    /// Message of the most recent failed save, cleared on success
    pub last_error: Option<String>,
}

struct PumpState {
    /// Serialization the store last accepted; `None` until the first
    /// successful save if seeding failed
    last_saved: Option<String>,
    last_error: Option<String>,
    on_error: Option<ErrorCallback>,
}

/// Periodic draft writer for one session
pub struct AutosavePump {
    session: EditorSession,
    store: Arc<dyn DraftStore>,
    page_id: String,
    shared: Arc<Mutex<PumpState>>,
    task: JoinHandle<()>,
}

impl AutosavePump {
    /// Spawn the interval task. The opening serialization seeds
    /// `last_saved`, so an untouched session is clean from the start.
    pub fn start(session: EditorSession, store: Arc<dyn DraftStore>, period: Duration) -> Self {
        let page_id = session.page_id();
        let shared = Arc::new(Mutex::new(PumpState {
            last_saved: session.serialized().ok(),
            last_error: None,
            on_error: None,
        }));

        let task = {
            let session = session.clone();
            let store = Arc::clone(&store);
            let page_id = page_id.clone();
            let shared = Arc::clone(&shared);
            tokio::spawn(async move {
                let mut ticker = time::interval_at(Instant::now() + period, period);
                loop {
                    ticker.tick().await;
                    Self::tick(&session, store.as_ref(), &page_id, &shared).await;
                }
            })
        };

        AutosavePump {
            session,
            store,
            page_id,
            shared,
            task,
        }
    }

    /// Route save failures somewhere visible (status bar, toast)
    pub fn set_on_error(&self, callback: impl Fn(&PersistenceError) + Send + Sync + 'static) {
        self.shared.lock().unwrap().on_error = Some(Arc::new(callback));
    }

    /// Dirtiness and the most recent save error, if any
    pub fn status(&self) -> AutosaveStatus {
        let current = self.session.serialized().ok();
        let state = self.shared.lock().unwrap();
        AutosaveStatus {
            dirty: current.is_some() && current != state.last_saved,
            last_error: state.last_error.clone(),
        }
    }

    /// Stop the interval task, flushing unsaved edits once on the way out
    pub async fn shutdown(self) {
        self.task.abort();
        let _ = self.task.await;

        let current = match self.session.serialized() {
            Ok(content) => content,
            Err(err) => {
                warn!(page_id = %self.page_id, error = %err, "final flush skipped, serialization failed");
                return;
            }
        };
        let dirty = {
            let state = self.shared.lock().unwrap();
            state.last_saved.as_deref() != Some(current.as_str())
        };
        if !dirty {
            return;
        }
        match self.store.save_draft(&self.page_id, &current).await {
            Ok(()) => debug!(page_id = %self.page_id, "final draft flush complete"),
            Err(err) => {
                warn!(page_id = %self.page_id, error = %err, "final draft flush failed");
                let on_error = self.shared.lock().unwrap().on_error.clone();
                if let Some(callback) = on_error {
                    callback(&err);
                }
            }
        }
    }

    async fn tick(
        session: &EditorSession,
        store: &dyn DraftStore,
        page_id: &str,
        shared: &Arc<Mutex<PumpState>>,
    ) {
        let current = match session.serialized() {
            Ok(content) => content,
            Err(err) => {
                warn!(page_id = %page_id, error = %err, "autosave skipped, serialization failed");
                return;
            }
        };

        let clean = {
            let state = shared.lock().unwrap();
            state.last_saved.as_deref() == Some(current.as_str())
        };
        if clean {
            return;
        }

        match store.save_draft(page_id, &current).await {
            Ok(()) => {
                debug!(page_id = %page_id, "draft autosaved");
                let mut state = shared.lock().unwrap();
                state.last_saved = Some(current);
                state.last_error = None;
            }
            Err(err) => {
                warn!(page_id = %page_id, error = %err, "autosave failed, retrying next tick");
                let on_error = {
                    let mut state = shared.lock().unwrap();
                    state.last_error = Some(err.to_string());
                    state.on_error.clone()
                };
                if let Some(callback) = on_error {
                    callback(&err);
                }
            }
        }
    }
}
