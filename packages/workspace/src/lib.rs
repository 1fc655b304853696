pub mod state;
pub mod store;

#[cfg(test)]
mod tests_workspace;

pub use state::{Workspace, WorkspaceError};
pub use store::{FileStore, MemoryStore};

// Re-export the session types consumers hold
pub use pagecraft_editor::{
    AutosavePump, AutosaveStatus, EditorOptions, EditorSession, VersionHistory, VersionRecord,
};
pub use pagecraft_schema::{ComponentNode, ComponentOperation, PageSchema};
