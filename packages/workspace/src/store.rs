//! # Persistence Backends
//!
//! Reference `DraftStore`/`VersionStore` implementations. Content moves
//! through them byte-for-byte; stores never inspect or rewrite it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pagecraft_editor::{DraftStore, PersistenceError, VersionRecord, VersionStore};

/// One checkpoint as stored: metadata plus the content it froze
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredVersion {
    record: VersionRecord,
    content: String,
}

fn next_record(log: &[StoredVersion], change_summary: &str) -> VersionRecord {
    VersionRecord {
        number: log.len() as u64 + 1,
        change_summary: change_summary.to_string(),
        created_at: Utc::now(),
    }
}

fn find_content(log: &[StoredVersion], number: u64) -> Result<String, PersistenceError> {
    log.iter()
        .find(|stored| stored.record.number == number)
        .map(|stored| stored.content.clone())
        .ok_or(PersistenceError::VersionNotFound(number))
}

/// In-memory backend for tests and previews
#[derive(Default)]
pub struct MemoryStore {
    drafts: Mutex<HashMap<String, String>>,
    versions: Mutex<HashMap<String, Vec<StoredVersion>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest saved draft, if any
    pub fn draft(&self, page_id: &str) -> Option<String> {
        self.drafts.lock().unwrap().get(page_id).cloned()
    }
}

#[async_trait]
impl DraftStore for MemoryStore {
    async fn save_draft(&self, page_id: &str, content: &str) -> Result<(), PersistenceError> {
        self.drafts
            .lock()
            .unwrap()
            .insert(page_id.to_string(), content.to_string());
        Ok(())
    }
}

#[async_trait]
impl VersionStore for MemoryStore {
    async fn list_versions(&self, page_id: &str) -> Result<Vec<VersionRecord>, PersistenceError> {
        let versions = self.versions.lock().unwrap();
        Ok(versions
            .get(page_id)
            .map(|log| log.iter().map(|stored| stored.record.clone()).collect())
            .unwrap_or_default())
    }

    async fn create_version(
        &self,
        page_id: &str,
        content: &str,
        change_summary: &str,
    ) -> Result<VersionRecord, PersistenceError> {
        let mut versions = self.versions.lock().unwrap();
        let log = versions.entry(page_id.to_string()).or_default();
        let record = next_record(log, change_summary);
        log.push(StoredVersion {
            record: record.clone(),
            content: content.to_string(),
        });
        Ok(record)
    }

    async fn restore_version(
        &self,
        page_id: &str,
        number: u64,
    ) -> Result<String, PersistenceError> {
        let versions = self.versions.lock().unwrap();
        find_content(versions.get(page_id).map(Vec::as_slice).unwrap_or(&[]), number)
    }
}

/// Directory-backed store: `<root>/<page_id>.json` holds the draft,
/// `<root>/<page_id>.versions.json` the checkpoint log
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    /// Latest saved draft, if any
    pub fn draft(&self, page_id: &str) -> Option<String> {
        std::fs::read_to_string(self.draft_path(page_id)).ok()
    }

    fn draft_path(&self, page_id: &str) -> PathBuf {
        self.root.join(format!("{page_id}.json"))
    }

    fn log_path(&self, page_id: &str) -> PathBuf {
        self.root.join(format!("{page_id}.versions.json"))
    }

    // Page ids become file stems; refuse anything that would walk out of
    // the root.
    fn check_page_id(page_id: &str) -> Result<(), PersistenceError> {
        if page_id.is_empty()
            || page_id.contains('/')
            || page_id.contains('\\')
            || page_id.contains("..")
        {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("page id {page_id:?} cannot name a store file"),
            )
            .into());
        }
        Ok(())
    }

    fn read_log(&self, page_id: &str) -> Result<Vec<StoredVersion>, PersistenceError> {
        let path = self.log_path(page_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_log(&self, page_id: &str, log: &[StoredVersion]) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string_pretty(log)?;
        std::fs::write(self.log_path(page_id), raw)?;
        Ok(())
    }
}

#[async_trait]
impl DraftStore for FileStore {
    async fn save_draft(&self, page_id: &str, content: &str) -> Result<(), PersistenceError> {
        Self::check_page_id(page_id)?;
        std::fs::write(self.draft_path(page_id), content)?;
        debug!(page_id = %page_id, "draft written");
        Ok(())
    }
}

#[async_trait]
impl VersionStore for FileStore {
    async fn list_versions(&self, page_id: &str) -> Result<Vec<VersionRecord>, PersistenceError> {
        Self::check_page_id(page_id)?;
        Ok(self
            .read_log(page_id)?
            .iter()
            .map(|stored| stored.record.clone())
            .collect())
    }

    async fn create_version(
        &self,
        page_id: &str,
        content: &str,
        change_summary: &str,
    ) -> Result<VersionRecord, PersistenceError> {
        Self::check_page_id(page_id)?;
        let mut log = self.read_log(page_id)?;
        let record = next_record(&log, change_summary);
        log.push(StoredVersion {
            record: record.clone(),
            content: content.to_string(),
        });
        self.write_log(page_id, &log)?;
        debug!(page_id = %page_id, version = record.number, "version appended");
        Ok(record)
    }

    async fn restore_version(
        &self,
        page_id: &str,
        number: u64,
    ) -> Result<String, PersistenceError> {
        Self::check_page_id(page_id)?;
        find_content(&self.read_log(page_id)?, number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_draft_overwrites() {
        let store = MemoryStore::new();
        store.save_draft("home", "{\"v\":1}").await.unwrap();
        store.save_draft("home", "{\"v\":2}").await.unwrap();
        assert_eq!(store.draft("home").unwrap(), "{\"v\":2}");
        assert!(store.draft("other").is_none());
    }

    #[tokio::test]
    async fn test_memory_store_version_log_is_append_only() {
        let store = MemoryStore::new();
        let first = store.create_version("home", "{}", "First").await.unwrap();
        let second = store.create_version("home", "{ }", "Second").await.unwrap();
        assert_eq!(first.number, 1);
        assert_eq!(second.number, 2);

        let restored = store.restore_version("home", 1).await.unwrap();
        assert_eq!(restored, "{}");

        // Restoring changes nothing in the log
        let listed = store.list_versions("home").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].change_summary, "Second");

        let missing = store.restore_version("home", 9).await.unwrap_err();
        assert!(matches!(missing, PersistenceError::VersionNotFound(9)));
    }

    #[tokio::test]
    async fn test_file_store_round_trips_content_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        let content = "{\"name\":\"Home\",\"nested\":{\"unicode\":\"héllo⚡\"}}";
        store.save_draft("home", content).await.unwrap();
        assert_eq!(store.draft("home").unwrap(), content);

        let record = store.create_version("home", content, "Checkpoint").await.unwrap();
        assert_eq!(record.number, 1);
        assert_eq!(store.restore_version("home", 1).await.unwrap(), content);

        // Both files land under the root with the page id as stem
        assert!(dir.path().join("home.json").exists());
        assert!(dir.path().join("home.versions.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_log_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path()).unwrap();
            store.create_version("home", "{\"v\":1}", "One").await.unwrap();
            store.create_version("home", "{\"v\":2}", "Two").await.unwrap();
        }

        let reopened = FileStore::new(dir.path()).unwrap();
        let listed = reopened.list_versions("home").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].change_summary, "One");
        assert_eq!(reopened.restore_version("home", 2).await.unwrap(), "{\"v\":2}");
    }

    #[tokio::test]
    async fn test_file_store_rejects_path_escapes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();

        for bad in ["../evil", "a/b", "a\\b", ""] {
            let err = store.save_draft(bad, "{}").await.unwrap_err();
            assert!(matches!(err, PersistenceError::Io(_)), "{bad:?} must be refused");
        }
        assert!(!dir.path().join("evil.json").exists());
    }

    #[tokio::test]
    async fn test_file_store_empty_log_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path()).unwrap();
        assert!(store.list_versions("home").await.unwrap().is_empty());
        let err = store.restore_version("home", 1).await.unwrap_err();
        assert!(matches!(err, PersistenceError::VersionNotFound(1)));
    }
}
