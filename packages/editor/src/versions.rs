//! # Version History Client
//!
//! Local view of one page's durable checkpoint log.
//!
//! ## Design
//!
//! - Every call is a live round trip; the local list is a cache of the
//!   last successful fetch, not a fallback store
//! - Failures surface through the injected error callback and yield
//!   `None`; the stale list stays readable
//! - Restore hands the stored content back to the caller, who feeds it
//!   into the editor session as a fresh edit

use std::sync::Arc;
use tracing::warn;

use crate::persist::{PersistenceError, VersionRecord, VersionStore};

type ErrorCallback = Arc<dyn Fn(&PersistenceError) + Send + Sync>;
type RestoreCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Checkpoint client for one page
pub struct VersionHistory {
    page_id: String,
    store: Arc<dyn VersionStore>,
    versions: Vec<VersionRecord>,
    on_error: Option<ErrorCallback>,
    on_restore: Option<RestoreCallback>,
}

impl VersionHistory {
    pub fn new(page_id: impl Into<String>, store: Arc<dyn VersionStore>) -> Self {
        Self {
            page_id: page_id.into(),
            store,
            versions: Vec::new(),
            on_error: None,
            on_restore: None,
        }
    }

    /// Route store failures somewhere visible (status bar, toast)
    pub fn set_on_error(&mut self, callback: impl Fn(&PersistenceError) + Send + Sync + 'static) {
        self.on_error = Some(Arc::new(callback));
    }

    /// Observe restored content before the caller commits it
    pub fn set_on_restore(&mut self, callback: impl Fn(&str) + Send + Sync + 'static) {
        self.on_restore = Some(Arc::new(callback));
    }

    /// Versions from the last successful refresh, oldest first
    pub fn versions(&self) -> &[VersionRecord] {
        &self.versions
    }

    /// Fetch the version list; `None` on failure (list stays stale)
    pub async fn refresh(&mut self) -> Option<&[VersionRecord]> {
        match self.store.list_versions(&self.page_id).await {
            Ok(versions) => {
                self.versions = versions;
                Some(&self.versions)
            }
            Err(e) => {
                warn!(page_id = %self.page_id, error = %e, "version list fetch failed");
                self.report(&e);
                None
            }
        }
    }

    /// Append a checkpoint, then refresh the local list
    pub async fn create(&mut self, content: &str, change_summary: &str) -> Option<VersionRecord> {
        let record = match self
            .store
            .create_version(&self.page_id, content, change_summary)
            .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(page_id = %self.page_id, error = %e, "version create failed");
                self.report(&e);
                return None;
            }
        };
        let _ = self.refresh().await;
        Some(record)
    }

    /// Make `number`'s stored content current and return it.
    ///
    /// Later versions are kept; restoring is itself an edit, not a
    /// rollback of the log.
    pub async fn restore(&mut self, number: u64) -> Option<String> {
        match self.store.restore_version(&self.page_id, number).await {
            Ok(content) => {
                if let Some(callback) = &self.on_restore {
                    callback(&content);
                }
                Some(content)
            }
            Err(e) => {
                warn!(page_id = %self.page_id, version = number, error = %e, "version restore failed");
                self.report(&e);
                None
            }
        }
    }

    fn report(&self, error: &PersistenceError) {
        if let Some(callback) = &self.on_error {
            callback(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        log: Mutex<Vec<(VersionRecord, String)>>,
        fail: AtomicBool,
    }

    impl FakeStore {
        fn check(&self) -> Result<(), PersistenceError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(PersistenceError::Unavailable("offline".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl VersionStore for FakeStore {
        async fn list_versions(
            &self,
            _page_id: &str,
        ) -> Result<Vec<VersionRecord>, PersistenceError> {
            self.check()?;
            Ok(self
                .log
                .lock()
                .unwrap()
                .iter()
                .map(|(record, _)| record.clone())
                .collect())
        }

        async fn create_version(
            &self,
            _page_id: &str,
            content: &str,
            change_summary: &str,
        ) -> Result<VersionRecord, PersistenceError> {
            self.check()?;
            let mut log = self.log.lock().unwrap();
            let record = VersionRecord {
                number: log.len() as u64 + 1,
                change_summary: change_summary.to_string(),
                created_at: Utc::now(),
            };
            log.push((record.clone(), content.to_string()));
            Ok(record)
        }

        async fn restore_version(
            &self,
            _page_id: &str,
            number: u64,
        ) -> Result<String, PersistenceError> {
            self.check()?;
            let log = self.log.lock().unwrap();
            log.iter()
                .find(|(record, _)| record.number == number)
                .map(|(_, content)| content.clone())
                .ok_or(PersistenceError::VersionNotFound(number))
        }
    }

    #[tokio::test]
    async fn test_create_appends_and_refreshes() {
        let store = Arc::new(FakeStore::default());
        let mut history = VersionHistory::new("page-1", store);

        let record = history.create("{\"v\":1}", "first draft").await.unwrap();
        assert_eq!(record.number, 1);
        assert_eq!(history.versions().len(), 1);

        history.create("{\"v\":2}", "second draft").await.unwrap();
        let numbers: Vec<u64> = history.versions().iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_restore_returns_content_and_keeps_later_versions() {
        let store = Arc::new(FakeStore::default());
        let mut history = VersionHistory::new("page-1", store);
        history.create("{\"v\":1}", "one").await.unwrap();
        history.create("{\"v\":2}", "two").await.unwrap();

        let restored: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));
        let seen = Arc::clone(&restored);
        history.set_on_restore(move |content| {
            *seen.lock().unwrap() = Some(content.to_string());
        });

        let content = history.restore(1).await.unwrap();
        assert_eq!(content, "{\"v\":1}");
        assert_eq!(restored.lock().unwrap().as_deref(), Some("{\"v\":1}"));

        // The log is untouched
        history.refresh().await.unwrap();
        assert_eq!(history.versions().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_surface_via_callback_and_keep_stale_list() {
        let store = Arc::new(FakeStore::default());
        let mut history = VersionHistory::new("page-1", store.clone());
        history.create("{\"v\":1}", "one").await.unwrap();

        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        history.set_on_error(move |e| {
            sink.lock().unwrap().push(e.to_string());
        });

        store.fail.store(true, Ordering::SeqCst);
        assert!(history.refresh().await.is_none());
        assert!(history.create("{\"v\":2}", "two").await.is_none());
        assert!(history.restore(1).await.is_none());

        assert_eq!(errors.lock().unwrap().len(), 3);
        // Stale list still readable
        assert_eq!(history.versions().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_of_missing_version_reports_not_found() {
        let store = Arc::new(FakeStore::default());
        let mut history = VersionHistory::new("page-1", store);

        let errors: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        history.set_on_error(move |e| {
            sink.lock().unwrap().push(e.to_string());
        });

        assert!(history.restore(7).await.is_none());
        assert_eq!(
            errors.lock().unwrap().as_slice(),
            &["Version not found: 7".to_string()]
        );
    }
}
