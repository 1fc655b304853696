/// Comprehensive workspace flows: the session registry, autosave and
/// version checkpoints wired to the file-backed store
use crate::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[cfg(test)]
mod workspace_flow_tests {
    use super::*;

    fn landing() -> PageSchema {
        let mut page = PageSchema::new("landing", "Landing");
        page.components
            .push(ComponentNode::new("hero", "section").with_prop("title", json!("Launch day")));
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_file_backed_workspace_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        let mut workspace =
            Workspace::new().with_draft_store(store.clone(), Duration::from_secs(5));

        let session = workspace.open(landing()).unwrap();
        session.update_state(|page| {
            page.components[0]
                .props
                .insert("title".into(), json!("Relaunch"));
        });

        // First interval tick persists the dirty draft
        tokio::time::sleep(Duration::from_secs(6)).await;
        let draft = store.draft("landing").unwrap();
        assert!(draft.contains("Relaunch"));
        assert_eq!(draft, session.serialized().unwrap());

        workspace.close_all().await;
        assert!(!workspace.is_open("landing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkpoints_survive_session_close() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()).unwrap());
        let mut workspace =
            Workspace::new().with_draft_store(store.clone(), Duration::from_secs(5));

        let session = workspace.open(landing()).unwrap();
        let mut versions = VersionHistory::new("landing", store.clone());

        versions
            .create(&session.serialized().unwrap(), "Initial layout")
            .await
            .expect("create must succeed");
        session.update_state(|page| {
            page.components[0]
                .props
                .insert("title".into(), json!("Experimental"));
        });
        versions
            .create(&session.serialized().unwrap(), "Experiment")
            .await
            .expect("create must succeed");

        workspace.close("landing").await;
        assert!(workspace.session("landing").is_none());

        // Reopen from checkpoint 1; the log on disk is untouched
        let content = versions.restore(1).await.expect("version 1 exists");
        let restored: PageSchema = serde_json::from_str(&content).unwrap();
        let reopened = workspace.open(restored).unwrap();
        assert_eq!(
            reopened.current_state().components[0].props["title"],
            json!("Launch day")
        );
        assert_eq!(versions.refresh().await.unwrap().len(), 2);

        workspace.close_all().await;
    }
}
