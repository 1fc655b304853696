use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::node::ComponentNode;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),
}

/// Descriptive page metadata (feeds the published site's head tags)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Page-level presentation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    pub theme: String,
    pub layout: String,
    pub responsive: bool,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            layout: "fluid".to_string(),
            responsive: true,
        }
    }
}

/// The full document under edit: an ordered forest of component trees plus
/// page-level metadata and settings.
///
/// All structural queries resolve by node id. The parent relationship is
/// derived from the ownership tree on demand (`parent_of`), so it can never
/// disagree with `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSchema {
    pub id: String,
    pub name: String,
    pub components: Vec<ComponentNode>,
    pub metadata: PageMetadata,
    pub settings: PageSettings,
}

impl PageSchema {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: id.into(),
            metadata: PageMetadata {
                title: name.clone(),
                description: String::new(),
                keywords: BTreeSet::new(),
                created_at: now,
                updated_at: now,
            },
            name,
            components: Vec::new(),
            settings: PageSettings::default(),
        }
    }

    /// Find a node anywhere in the page
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        find_in(&self.components, id)
    }

    /// Find a node anywhere in the page, mutably
    pub fn find_mut(&mut self, id: &str) -> Option<&mut ComponentNode> {
        find_in_mut(&mut self.components, id)
    }

    /// True if `id` names any node in the page
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// The node owning `id` in its `children`, or `None` for root-level
    /// nodes and unknown ids.
    pub fn parent_of(&self, id: &str) -> Option<&ComponentNode> {
        fn search<'a>(nodes: &'a [ComponentNode], id: &str) -> Option<&'a ComponentNode> {
            for node in nodes {
                if node.children.iter().any(|child| child.id == id) {
                    return Some(node);
                }
                if let Some(found) = search(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.components, id)
    }

    /// Where a node sits: its parent id (`None` = page root) and its index
    /// among the parent's children.
    pub fn locate(&self, id: &str) -> Option<(Option<&str>, usize)> {
        if let Some(index) = self.components.iter().position(|node| node.id == id) {
            return Some((None, index));
        }
        let parent = self.parent_of(id)?;
        let index = parent.children.iter().position(|child| child.id == id)?;
        Some((Some(parent.id.as_str()), index))
    }

    /// Ids from a page root down to (and including) `id`
    pub fn id_path(&self, id: &str) -> Option<Vec<String>> {
        fn descend(nodes: &[ComponentNode], id: &str, trail: &mut Vec<String>) -> bool {
            for node in nodes {
                trail.push(node.id.clone());
                if node.id == id || descend(&node.children, id, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }
        let mut trail = Vec::new();
        descend(&self.components, id, &mut trail).then_some(trail)
    }

    /// Remove the node (with its whole subtree) and return it
    pub fn detach(&mut self, id: &str) -> Option<ComponentNode> {
        detach_from(&mut self.components, id)
    }

    /// Insert `node` under `parent_id` (`None` = page root) at `index`,
    /// clamped to the current child count.
    pub fn insert(
        &mut self,
        parent_id: Option<&str>,
        index: usize,
        node: ComponentNode,
    ) -> Result<(), SchemaError> {
        let children = match parent_id {
            None => &mut self.components,
            Some(pid) => {
                let parent = self
                    .find_mut(pid)
                    .ok_or_else(|| SchemaError::ParentNotFound(pid.to_string()))?;
                &mut parent.children
            }
        };
        let index = index.min(children.len());
        children.insert(index, node);
        Ok(())
    }

    /// Every node id in document order
    pub fn collect_ids(&self) -> Vec<String> {
        let mut ids = Vec::new();
        for root in &self.components {
            root.walk(&mut |node| ids.push(node.id.clone()));
        }
        ids
    }

    /// Total number of nodes in the page
    pub fn node_count(&self) -> usize {
        self.components
            .iter()
            .map(ComponentNode::subtree_len)
            .sum()
    }

    /// Check structural invariants, reporting the first violation.
    ///
    /// Acyclicity is guaranteed by ownership; the remaining hazard is id
    /// aliasing introduced by a caller hand-building nodes.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for id in self.collect_ids() {
            if !seen.insert(id.clone()) {
                return Err(SchemaError::DuplicateId(id));
            }
        }
        Ok(())
    }

    /// Record a metadata-level edit time. Called by explicit metadata
    /// operations, never implicitly by the engine.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

fn find_in<'a>(nodes: &'a [ComponentNode], id: &str) -> Option<&'a ComponentNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_in_mut<'a>(nodes: &'a mut [ComponentNode], id: &str) -> Option<&'a mut ComponentNode> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

fn detach_from(nodes: &mut Vec<ComponentNode>, id: &str) -> Option<ComponentNode> {
    if let Some(index) = nodes.iter().position(|node| node.id == id) {
        return Some(nodes.remove(index));
    }
    for node in nodes {
        if let Some(found) = detach_from(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> PageSchema {
        let mut page = PageSchema::new("page-1", "Landing");
        page.components.push(
            ComponentNode::new("hero", "section")
                .with_child(ComponentNode::new("headline", "text"))
                .with_child(
                    ComponentNode::new("actions", "container")
                        .with_child(ComponentNode::new("cta", "button")),
                ),
        );
        page.components
            .push(ComponentNode::new("footer", "section"));
        page
    }

    #[test]
    fn test_find_resolves_nested_nodes() {
        let page = sample_page();
        assert_eq!(page.find("cta").unwrap().component_type, "button");
        assert!(page.find("missing").is_none());
    }

    #[test]
    fn test_parent_of_matches_ownership() {
        let page = sample_page();
        assert_eq!(page.parent_of("cta").unwrap().id, "actions");
        assert_eq!(page.parent_of("headline").unwrap().id, "hero");
        // Root-level nodes have no parent node
        assert!(page.parent_of("hero").is_none());
    }

    #[test]
    fn test_locate_reports_parent_and_index() {
        let page = sample_page();
        assert_eq!(page.locate("footer"), Some((None, 1)));
        assert_eq!(page.locate("actions"), Some((Some("hero"), 1)));
        assert_eq!(page.locate("nope"), None);
    }

    #[test]
    fn test_id_path_runs_root_to_target() {
        let page = sample_page();
        assert_eq!(
            page.id_path("cta").unwrap(),
            vec!["hero".to_string(), "actions".into(), "cta".into()]
        );
        assert_eq!(page.id_path("hero").unwrap(), vec!["hero".to_string()]);
        assert!(page.id_path("missing").is_none());
    }

    #[test]
    fn test_detach_removes_whole_subtree() {
        let mut page = sample_page();
        let taken = page.detach("actions").unwrap();

        assert_eq!(taken.subtree_len(), 2);
        assert!(!page.contains("actions"));
        assert!(!page.contains("cta"));
        assert_eq!(page.node_count(), 3);
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut page = sample_page();
        page.insert(Some("footer"), 99, ComponentNode::new("legal", "text"))
            .unwrap();
        assert_eq!(page.find("footer").unwrap().children[0].id, "legal");

        let err = page
            .insert(Some("ghost"), 0, ComponentNode::new("x", "text"))
            .unwrap_err();
        assert_eq!(err, SchemaError::ParentNotFound("ghost".to_string()));
    }

    #[test]
    fn test_validate_flags_duplicate_ids() {
        let mut page = sample_page();
        assert!(page.validate().is_ok());

        page.components
            .push(ComponentNode::new("cta", "button"));
        assert_eq!(
            page.validate().unwrap_err(),
            SchemaError::DuplicateId("cta".to_string())
        );
    }

    #[test]
    fn test_collect_ids_is_document_order() {
        let page = sample_page();
        assert_eq!(
            page.collect_ids(),
            vec!["hero", "headline", "actions", "cta", "footer"]
        );
    }

    #[test]
    fn test_new_page_defaults() {
        let page = PageSchema::new("page-9", "About");
        assert_eq!(page.metadata.title, "About");
        assert_eq!(page.metadata.created_at, page.metadata.updated_at);
        assert!(page.settings.responsive);
        assert_eq!(page.node_count(), 0);
    }
}
