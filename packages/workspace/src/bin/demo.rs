use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::info;

use pagecraft_editor::KeyEvent;
use pagecraft_workspace::{
    ComponentNode, ComponentOperation, EditorOptions, FileStore, PageSchema, VersionHistory,
    Workspace,
};

fn sample_page() -> PageSchema {
    let mut page = PageSchema::new("landing", "Landing");
    page.components.push(
        ComponentNode::new("hero", "section")
            .with_prop("title", json!("Launch day"))
            .with_prop("theme", json!("dark"))
            .with_child(
                ComponentNode::new("cta", "button")
                    .with_prop("label", json!("Get started"))
                    .with_position(120.0, 340.0),
            ),
    );
    page.components.push(ComponentNode::new("footer", "footer"));
    page
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let root_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("pagecraft-data"));

    println!("Pagecraft demo");
    println!("Store directory: {}", root_dir.display());

    let store = Arc::new(FileStore::new(&root_dir)?);
    let mut workspace = Workspace::new()
        .with_draft_store(store.clone(), Duration::from_secs(2))
        .with_editor_options(EditorOptions {
            max_history_states: 50,
            history_debounce: Duration::from_millis(300),
        });

    let session = workspace.open(sample_page())?;
    session.set_on_patch_created(|patches| {
        info!(count = patches.len(), "patches computed");
    });
    session.set_on_state_change(|page| {
        info!(components = page.node_count(), "state committed");
    });

    // A short editing burst: each commit is synchronous, the history
    // entry lands once the debounce window closes
    session.apply_operation(&ComponentOperation::Add {
        parent_id: None,
        index: 0,
        node: ComponentNode::new("nav", "navbar").with_prop("sticky", json!(true)),
    })?;
    session.apply_operation(&ComponentOperation::Update {
        node_id: "hero".to_string(),
        props: [("title".to_string(), json!("Relaunch week"))].into(),
        position: None,
        size: None,
    })?;
    session.apply_operation(&ComponentOperation::Duplicate {
        node_id: "cta".to_string(),
    })?;

    tokio::time::sleep(Duration::from_millis(400)).await;
    info!(
        undo_levels = session.undo_levels(),
        next_undo = session.undo_note().as_deref().unwrap_or("-"),
        "history settled"
    );

    // Undo through the keyboard path, then redo directly
    let handled = session.handle_key(&KeyEvent {
        key: "z".into(),
        ctrl: true,
        ..Default::default()
    });
    info!(handled, "ctrl+z dispatched");
    session.redo();

    // Page-level edits flow through the same commit path
    session.update_state(|page| {
        page.name = "Landing (autumn)".to_string();
        page.metadata.description = "Seasonal landing page".to_string();
        page.touch();
    });

    // Let the autosave pump pick the changes up
    tokio::time::sleep(Duration::from_millis(2500)).await;
    if let Some(status) = workspace.autosave_status("landing") {
        info!(dirty = status.dirty, "autosave status");
    }
    match store.draft("landing") {
        Some(draft) => info!(bytes = draft.len(), "draft on disk"),
        None => info!("draft not yet written"),
    }

    // Durable checkpoints, then a restore fed back into the session
    let mut versions = VersionHistory::new("landing", store.clone());
    versions.set_on_error(|error| {
        info!(%error, "version store reported a failure");
    });
    if let Some(record) = versions
        .create(&session.serialized()?, "Relaunch draft")
        .await
    {
        info!(number = record.number, "checkpoint created");
    }

    session.update_state(|page| {
        if let Some(hero) = page.find_mut("hero") {
            hero.props.insert("theme".to_string(), json!("light"));
        }
    });
    if let Some(record) = versions
        .create(&session.serialized()?, "Light theme experiment")
        .await
    {
        info!(number = record.number, "checkpoint created");
    }

    for record in versions.versions() {
        info!(
            number = record.number,
            summary = %record.change_summary,
            created_at = %record.created_at,
            "version"
        );
    }

    if let Some(content) = versions.restore(1).await {
        let restored: PageSchema = serde_json::from_str(&content)?;
        session.set_state(restored);
        info!("restored checkpoint 1");
    }

    workspace.close_all().await;
    println!(
        "Done. Draft and version log live under {}",
        root_dir.display()
    );
    Ok(())
}
