//! # Patch Operations
//!
//! Primitive, replayable edits between two document snapshots.
//!
//! ## Design
//!
//! - Targets are addressed by id-path (the id chain from the page root),
//!   never by array index, so sibling reordering does not invalidate paths
//! - `apply_patch` walks the id chain and falls back to a unique-id lookup
//!   when intermediate ancestry drifted
//! - Patches are trusted replay data produced by the differ; applying the
//!   patches computed from `(before, after)` to `before` reconstructs
//!   `after`
//!
//! Operation targets:
//!
//! - `Add`: `path` names the parent container (empty = page root list)
//! - `Remove` / `Replace`: `path` names the node itself
//! - `Move`: `path` names the node, `to` names the new parent container

use pagecraft_schema::{ComponentNode, PageMetadata, PageSchema, PageSettings, Position, Size};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Replacement payload for a `Replace` patch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplaceValue {
    /// Node content without its children (child edits travel separately)
    Content {
        component_type: String,
        props: BTreeMap<String, Value>,
        position: Option<Position>,
        size: Option<Size>,
    },

    /// Page-level fields without the component forest
    Page {
        name: String,
        metadata: PageMetadata,
        settings: PageSettings,
    },
}

/// One primitive edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOperation {
    /// Insert a subtree under the container at `path`
    Add {
        path: Vec<String>,
        index: usize,
        node: ComponentNode,
    },

    /// Remove the subtree at `path`
    Remove { path: Vec<String> },

    /// Overwrite content at `path` (node fields or page fields)
    Replace {
        path: Vec<String>,
        value: ReplaceValue,
    },

    /// Detach the node at `path`, insert it under the container at `to`
    Move {
        path: Vec<String>,
        to: Vec<String>,
        index: usize,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("Patch target not found: {0}")]
    TargetNotFound(String),

    #[error("Patch parent not found: {0}")]
    ParentNotFound(String),

    #[error("Page replace must target the page root, got: {0}")]
    InvalidPageTarget(String),
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<page>".to_string()
    } else {
        path.join("/")
    }
}

/// Strict id-chain walk from a root list
fn walk<'a>(nodes: &'a [ComponentNode], path: &[String]) -> Option<&'a ComponentNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.iter().find(|n| &n.id == first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        walk(&node.children, rest)
    }
}

fn walk_mut<'a>(nodes: &'a mut [ComponentNode], path: &[String]) -> Option<&'a mut ComponentNode> {
    let (first, rest) = path.split_first()?;
    let node = nodes.iter_mut().find(|n| &n.id == first)?;
    if rest.is_empty() {
        Some(node)
    } else {
        walk_mut(&mut node.children, rest)
    }
}

/// Resolve a node by id-path, falling back to unique-id lookup when the
/// recorded ancestry no longer matches the tree.
fn resolve_mut<'a>(page: &'a mut PageSchema, path: &[String]) -> Option<&'a mut ComponentNode> {
    if walk(&page.components, path).is_some() {
        return walk_mut(&mut page.components, path);
    }
    let last = path.last()?;
    page.find_mut(last)
}

/// Mutable child list of the container at `path` (empty = page root list)
fn children_of_mut<'a>(
    page: &'a mut PageSchema,
    path: &[String],
) -> Result<&'a mut Vec<ComponentNode>, PatchError> {
    if path.is_empty() {
        return Ok(&mut page.components);
    }
    match resolve_mut(page, path) {
        Some(node) => Ok(&mut node.children),
        None => Err(PatchError::ParentNotFound(display_path(path))),
    }
}

/// Detach the node named by `path` from wherever it currently sits
fn take_at(page: &mut PageSchema, path: &[String]) -> Result<ComponentNode, PatchError> {
    let id = match walk(&page.components, path) {
        Some(node) => node.id.clone(),
        None => path
            .last()
            .cloned()
            .ok_or_else(|| PatchError::TargetNotFound(display_path(path)))?,
    };
    page.detach(&id)
        .ok_or_else(|| PatchError::TargetNotFound(display_path(path)))
}

pub(crate) fn apply_one(page: &mut PageSchema, patch: &PatchOperation) -> Result<(), PatchError> {
    match patch {
        PatchOperation::Add { path, index, node } => {
            let children = children_of_mut(page, path)?;
            let at = (*index).min(children.len());
            children.insert(at, node.clone());
            Ok(())
        }

        PatchOperation::Remove { path } => {
            take_at(page, path)?;
            Ok(())
        }

        PatchOperation::Replace { path, value } => match value {
            ReplaceValue::Content {
                component_type,
                props,
                position,
                size,
            } => {
                let node = resolve_mut(page, path)
                    .ok_or_else(|| PatchError::TargetNotFound(display_path(path)))?;
                node.component_type = component_type.clone();
                node.props = props.clone();
                node.position = *position;
                node.size = *size;
                Ok(())
            }
            ReplaceValue::Page {
                name,
                metadata,
                settings,
            } => {
                if !path.is_empty() {
                    return Err(PatchError::InvalidPageTarget(display_path(path)));
                }
                page.name = name.clone();
                page.metadata = metadata.clone();
                page.settings = settings.clone();
                Ok(())
            }
        },

        PatchOperation::Move { path, to, index } => {
            let node = take_at(page, path)?;
            let children = children_of_mut(page, to)?;
            let at = (*index).min(children.len());
            children.insert(at, node);
            Ok(())
        }
    }
}

/// Apply patches in order. Deterministic: same input state and patch list,
/// same output state.
pub fn apply_patch(page: &mut PageSchema, patches: &[PatchOperation]) -> Result<(), PatchError> {
    for patch in patches {
        apply_one(page, patch)?;
    }
    Ok(())
}
