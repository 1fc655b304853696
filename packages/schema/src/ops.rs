//! # Component Operations
//!
//! Semantic mutations of the component tree.
//!
//! ## Design Principles
//!
//! 1. **Intent-preserving**: each operation represents one user-level edit
//! 2. **Validated**: structural constraints are checked before anything moves
//! 3. **Minimal**: no redundant or overly generic operations
//!
//! ## Operation Semantics
//!
//! ### Move
//! - Atomic relocation of a node to a new parent at an index
//! - Fails if the target parent is missing or inside the moved subtree
//!
//! ### Update
//! - Merges the given prop keys (a `null` value deletes the key)
//! - Geometry hints replace wholesale when given
//!
//! ### Remove
//! - Removes the node and all descendants
//!
//! ### Duplicate
//! - Deep-copies the subtree with fresh ids, inserted after the source

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::id::{reassign_subtree_ids, IdGenerator};
use crate::node::{ComponentNode, Position, Size};
use crate::page::{PageSchema, SchemaError};

/// Semantic mutations (intent-preserving edits)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentOperation {
    /// Insert a new node (with its subtree) under a parent at an index.
    /// `parent_id: None` targets the page root list.
    Add {
        parent_id: Option<String>,
        index: usize,
        node: ComponentNode,
    },

    /// Remove a node and its whole subtree
    Remove { node_id: String },

    /// Merge prop values and/or replace geometry hints on one node
    Update {
        node_id: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        props: BTreeMap<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        position: Option<Position>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<Size>,
    },

    /// Move a node to a new parent at an index
    Move {
        node_id: String,
        new_parent_id: Option<String>,
        index: usize,
    },

    /// Deep-copy a node (fresh ids), inserted right after the source
    Duplicate { node_id: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Cannot move a node into its own subtree")]
    CycleDetected,
}

impl From<SchemaError> for OperationError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::NodeNotFound(id) => OperationError::NodeNotFound(id),
            SchemaError::ParentNotFound(id) => OperationError::ParentNotFound(id),
            SchemaError::DuplicateId(id) => OperationError::DuplicateId(id),
        }
    }
}

impl ComponentOperation {
    /// Validate without applying
    pub fn validate(&self, page: &PageSchema) -> Result<(), OperationError> {
        match self {
            ComponentOperation::Add {
                parent_id, node, ..
            } => {
                if let Some(pid) = parent_id {
                    if !page.contains(pid) {
                        return Err(OperationError::ParentNotFound(pid.clone()));
                    }
                }
                let mut clash = None;
                node.walk(&mut |n| {
                    if clash.is_none() && page.contains(&n.id) {
                        clash = Some(n.id.clone());
                    }
                });
                match clash {
                    Some(id) => Err(OperationError::DuplicateId(id)),
                    None => Ok(()),
                }
            }

            ComponentOperation::Remove { node_id }
            | ComponentOperation::Update { node_id, .. }
            | ComponentOperation::Duplicate { node_id } => {
                if page.contains(node_id) {
                    Ok(())
                } else {
                    Err(OperationError::NodeNotFound(node_id.clone()))
                }
            }

            ComponentOperation::Move {
                node_id,
                new_parent_id,
                ..
            } => {
                let node = page
                    .find(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;

                if let Some(pid) = new_parent_id {
                    if !page.contains(pid) {
                        return Err(OperationError::ParentNotFound(pid.clone()));
                    }
                    // Reparenting under the moved subtree would orphan it
                    if node.contains(pid) {
                        return Err(OperationError::CycleDetected);
                    }
                }
                Ok(())
            }
        }
    }

    /// Apply the operation to the page with validation.
    ///
    /// `idgen` mints ids for duplicated subtrees; other operations leave it
    /// untouched.
    pub fn apply(
        &self,
        page: &mut PageSchema,
        idgen: &mut IdGenerator,
    ) -> Result<(), OperationError> {
        self.validate(page)?;

        match self {
            ComponentOperation::Add {
                parent_id,
                index,
                node,
            } => {
                page.insert(parent_id.as_deref(), *index, node.clone())?;
                Ok(())
            }

            ComponentOperation::Remove { node_id } => {
                page.detach(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
                Ok(())
            }

            ComponentOperation::Update {
                node_id,
                props,
                position,
                size,
            } => {
                let node = page
                    .find_mut(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
                for (name, value) in props {
                    if value.is_null() {
                        node.props.remove(name);
                    } else {
                        node.props.insert(name.clone(), value.clone());
                    }
                }
                if let Some(p) = position {
                    node.position = Some(*p);
                }
                if let Some(s) = size {
                    node.size = Some(*s);
                }
                Ok(())
            }

            ComponentOperation::Move {
                node_id,
                new_parent_id,
                index,
            } => {
                let node = page
                    .detach(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
                page.insert(new_parent_id.as_deref(), *index, node)?;
                Ok(())
            }

            ComponentOperation::Duplicate { node_id } => {
                let (parent_id, index) = page
                    .locate(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?;
                let parent_id = parent_id.map(String::from);

                let mut copy = page
                    .find(node_id)
                    .ok_or_else(|| OperationError::NodeNotFound(node_id.clone()))?
                    .clone();
                reassign_subtree_ids(&mut copy, idgen);

                page.insert(parent_id.as_deref(), index + 1, copy)?;
                Ok(())
            }
        }
    }

    /// Short human label for the history entry this operation produced
    pub fn describe(&self) -> String {
        match self {
            ComponentOperation::Add { node, .. } => format!("Add {}", node.component_type),
            ComponentOperation::Remove { .. } => "Remove component".to_string(),
            ComponentOperation::Update { .. } => "Update component".to_string(),
            ComponentOperation::Move { .. } => "Move component".to_string(),
            ComponentOperation::Duplicate { .. } => "Duplicate component".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_tree() -> (PageSchema, IdGenerator) {
        let mut page = PageSchema::new("page-1", "Landing");
        let idgen = IdGenerator::new("page-1");
        page.components.push(
            ComponentNode::new("hero", "section")
                .with_child(ComponentNode::new("headline", "text"))
                .with_child(ComponentNode::new("cta", "button")),
        );
        page.validate().expect("fixture must be valid");
        (page, idgen)
    }

    #[test]
    fn test_add_inserts_under_parent() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Add {
            parent_id: Some("hero".to_string()),
            index: 1,
            node: ComponentNode::new("img", "image"),
        };

        op.apply(&mut page, &mut idgen).unwrap();
        assert_eq!(page.find("hero").unwrap().children[1].id, "img");
    }

    #[test]
    fn test_add_rejects_duplicate_subtree_ids() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Add {
            parent_id: None,
            index: 0,
            node: ComponentNode::new("wrapper", "container")
                .with_child(ComponentNode::new("cta", "button")),
        };

        assert_eq!(
            op.apply(&mut page, &mut idgen).unwrap_err(),
            OperationError::DuplicateId("cta".to_string())
        );
        // Validation failed before any change landed
        assert!(!page.contains("wrapper"));
    }

    #[test]
    fn test_remove_deletes_subtree() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Remove {
            node_id: "hero".to_string(),
        };

        op.apply(&mut page, &mut idgen).unwrap();
        assert!(!page.contains("hero"));
        assert!(!page.contains("cta"));
    }

    #[test]
    fn test_update_merges_and_deletes_props() {
        let (mut page, mut idgen) = page_with_tree();
        ComponentOperation::Update {
            node_id: "headline".to_string(),
            props: BTreeMap::from([
                ("content".to_string(), json!("Hello")),
                ("tone".to_string(), json!("bold")),
            ]),
            position: None,
            size: None,
        }
        .apply(&mut page, &mut idgen)
        .unwrap();

        ComponentOperation::Update {
            node_id: "headline".to_string(),
            props: BTreeMap::from([("tone".to_string(), Value::Null)]),
            position: Some(Position { x: 4.0, y: 8.0 }),
            size: None,
        }
        .apply(&mut page, &mut idgen)
        .unwrap();

        let node = page.find("headline").unwrap();
        assert_eq!(node.props.get("content"), Some(&json!("Hello")));
        assert!(!node.props.contains_key("tone"));
        assert_eq!(node.position, Some(Position { x: 4.0, y: 8.0 }));
    }

    #[test]
    fn test_move_relocates_node() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Move {
            node_id: "cta".to_string(),
            new_parent_id: None,
            index: 0,
        };

        op.apply(&mut page, &mut idgen).unwrap();
        assert_eq!(page.components[0].id, "cta");
        assert_eq!(page.find("hero").unwrap().children.len(), 1);
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Move {
            node_id: "hero".to_string(),
            new_parent_id: Some("cta".to_string()),
            index: 0,
        };

        assert_eq!(
            op.apply(&mut page, &mut idgen).unwrap_err(),
            OperationError::CycleDetected
        );
        // Nothing moved
        assert_eq!(page.components[0].id, "hero");
    }

    #[test]
    fn test_duplicate_clones_with_fresh_ids() {
        let (mut page, mut idgen) = page_with_tree();
        let before = page.node_count();

        ComponentOperation::Duplicate {
            node_id: "hero".to_string(),
        }
        .apply(&mut page, &mut idgen)
        .unwrap();

        assert_eq!(page.node_count(), before * 2);
        assert_eq!(page.components.len(), 2);
        assert_eq!(page.components[1].component_type, "section");
        assert_ne!(page.components[1].id, "hero");
        page.validate().expect("fresh ids must not collide");
    }

    #[test]
    fn test_operations_on_missing_nodes_fail() {
        let (mut page, mut idgen) = page_with_tree();
        let op = ComponentOperation::Remove {
            node_id: "ghost".to_string(),
        };
        assert_eq!(
            op.apply(&mut page, &mut idgen).unwrap_err(),
            OperationError::NodeNotFound("ghost".to_string())
        );
    }

    #[test]
    fn test_operation_serialization_round_trip() {
        let op = ComponentOperation::Move {
            node_id: "cta".to_string(),
            new_parent_id: Some("footer".to_string()),
            index: 2,
        };

        let json = serde_json::to_string(&op).unwrap();
        let back: ComponentOperation = serde_json::from_str(&json).unwrap();
        assert_eq!(op, back);
    }

    #[test]
    fn test_describe_labels() {
        let op = ComponentOperation::Add {
            parent_id: None,
            index: 0,
            node: ComponentNode::new("x", "image"),
        };
        assert_eq!(op.describe(), "Add image");
    }
}
