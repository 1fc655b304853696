//! # Persistence Interfaces
//!
//! Seams between the editing core and whatever stores documents.
//!
//! Content crosses these boundaries as opaque canonical JSON: stores never
//! inspect or rewrite it. `DraftStore` backs the autosave pump,
//! `VersionStore` backs explicit user checkpoints. Both are object-safe so
//! backends can be swapped per deployment.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored content is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Version not found: {0}")]
    VersionNotFound(u64),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Metadata of one durable checkpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Monotonic number within one page's log
    pub number: u64,

    /// User-supplied label for the checkpoint
    pub change_summary: String,

    pub created_at: DateTime<Utc>,
}

/// Best-effort draft persistence (autosave target)
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Persist the current draft for a page, replacing any prior draft
    async fn save_draft(&self, page_id: &str, content: &str) -> Result<(), PersistenceError>;
}

/// Append-only version log with restore
#[async_trait]
pub trait VersionStore: Send + Sync {
    /// Ordered version metadata, oldest first
    async fn list_versions(&self, page_id: &str) -> Result<Vec<VersionRecord>, PersistenceError>;

    /// Append a checkpoint and return its metadata
    async fn create_version(
        &self,
        page_id: &str,
        content: &str,
        change_summary: &str,
    ) -> Result<VersionRecord, PersistenceError>;

    /// Make a stored version's content current again and return it.
    /// Restoring never deletes later versions.
    async fn restore_version(&self, page_id: &str, number: u64)
        -> Result<String, PersistenceError>;
}
