//! # Workspace Registry
//!
//! One editing session per open page, plus the autosave pump that keeps
//! its draft persisted. Sessions are handed out as cloneable handles;
//! the registry owns the pumps so closing a page always flushes it.
//!
//! Pages must be opened on a tokio runtime when a draft store is
//! attached: the pump spawns its interval task immediately.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;

use pagecraft_editor::{AutosavePump, AutosaveStatus, DraftStore, EditorOptions, EditorSession};
use pagecraft_schema::{PageSchema, SchemaError};

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Page already open: {0}")]
    AlreadyOpen(String),

    #[error("Page failed validation: {0}")]
    InvalidPage(#[from] SchemaError),
}

struct OpenPage {
    session: EditorSession,
    pump: Option<AutosavePump>,
}

/// Registry of editing sessions for all open pages in one process
pub struct Workspace {
    pages: HashMap<String, OpenPage>,
    draft_store: Option<Arc<dyn DraftStore>>,
    autosave_period: Duration,
    options: EditorOptions,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            draft_store: None,
            autosave_period: Duration::from_secs(30),
            options: EditorOptions::default(),
        }
    }

    /// Attach a draft store; pages opened afterwards get an autosave pump
    pub fn with_draft_store(mut self, store: Arc<dyn DraftStore>, period: Duration) -> Self {
        self.draft_store = Some(store);
        self.autosave_period = period;
        self
    }

    /// Session tunables applied to every page opened afterwards
    pub fn with_editor_options(mut self, options: EditorOptions) -> Self {
        self.options = options;
        self
    }

    /// Open an editing session for `page`.
    ///
    /// The page is validated first; opening an id twice is refused, the
    /// existing session stays authoritative.
    pub fn open(&mut self, page: PageSchema) -> Result<EditorSession, WorkspaceError> {
        page.validate()?;
        let page_id = page.id.clone();
        if self.pages.contains_key(&page_id) {
            return Err(WorkspaceError::AlreadyOpen(page_id));
        }

        let session = EditorSession::with_options(page, self.options.clone());
        let pump = self.draft_store.as_ref().map(|store| {
            AutosavePump::start(session.clone(), Arc::clone(store), self.autosave_period)
        });

        info!(page_id = %page_id, autosave = pump.is_some(), "opened page session");
        self.pages.insert(
            page_id,
            OpenPage {
                session: session.clone(),
                pump,
            },
        );
        Ok(session)
    }

    /// Handle to an open page's session
    pub fn session(&self, page_id: &str) -> Option<EditorSession> {
        self.pages.get(page_id).map(|open| open.session.clone())
    }

    pub fn is_open(&self, page_id: &str) -> bool {
        self.pages.contains_key(page_id)
    }

    /// Autosave health for an open page; `None` when the page is not open
    /// or no draft store is attached
    pub fn autosave_status(&self, page_id: &str) -> Option<AutosaveStatus> {
        self.pages
            .get(page_id)
            .and_then(|open| open.pump.as_ref())
            .map(AutosavePump::status)
    }

    /// Ids of all open pages, sorted
    pub fn open_pages(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.pages.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Close one page: shut its pump down (final flush) and drop the
    /// session. Returns false when the id was not open.
    pub async fn close(&mut self, page_id: &str) -> bool {
        match self.pages.remove(page_id) {
            Some(open) => {
                if let Some(pump) = open.pump {
                    pump.shutdown().await;
                }
                info!(page_id = %page_id, "closed page session");
                true
            }
            None => false,
        }
    }

    /// Close every open page (process teardown)
    pub async fn close_all(&mut self) {
        let ids: Vec<String> = self.pages.keys().cloned().collect();
        for id in ids {
            self.close(&id).await;
        }
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
