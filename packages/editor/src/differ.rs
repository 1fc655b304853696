//! # Structural Differ
//!
//! Computes the patch list between two document snapshots.
//!
//! ## Design
//!
//! - Nodes are matched by stable id, never by position
//! - Phases: page-level fields, removals, then a top-down structural pass
//!   emitting adds, moves and content replaces with ascending target
//!   indices
//! - Every emitted patch is replayed on a working copy as it is emitted,
//!   so recorded paths and indices are exact at application time
//! - Removals name subtree roots only; an id surviving inside a removed
//!   container is re-created by a later `Add`
//! - A node moved into a freshly added container is carried inside the
//!   `Add` payload, with its old copy removed up front
//!
//! The result is near-minimal: a sibling dragged to the front is exactly
//! one `Move`, a prop edit exactly one `Replace`.

use pagecraft_schema::{ComponentNode, PageSchema};
use std::collections::HashSet;

use crate::patch::{PatchOperation, ReplaceValue};

/// Compute the patches that turn `before` into `after`.
///
/// Empty iff the two snapshots are structurally equal.
pub fn create_patch(before: &PageSchema, after: &PageSchema) -> Vec<PatchOperation> {
    if before == after {
        return Vec::new();
    }

    let mut patches = Vec::new();
    let mut work = before.clone();

    // Page-level fields
    if before.name != after.name
        || before.metadata != after.metadata
        || before.settings != after.settings
    {
        patches.push(PatchOperation::Replace {
            path: Vec::new(),
            value: ReplaceValue::Page {
                name: after.name.clone(),
                metadata: after.metadata.clone(),
                settings: after.settings.clone(),
            },
        });
        work.name = after.name.clone();
        work.metadata = after.metadata.clone();
        work.settings = after.settings.clone();
    }

    // Removals: subtree roots whose id is gone
    let keep: HashSet<String> = after.collect_ids().into_iter().collect();
    let mut gone = Vec::new();
    removal_roots(&before.components, &keep, &mut gone);
    for id in gone {
        if let Some(path) = work.id_path(&id) {
            patches.push(PatchOperation::Remove { path });
        }
        work.detach(&id);
    }

    // Detach nodes that will ride inside an added container's payload
    detach_carried(&mut work, &after.components, false, &mut patches);

    // Structural pass: settle each container's children in ascending order
    sync_children(&mut work, &after.components, &[], &mut patches);

    patches
}

/// Collect the topmost nodes of `nodes` whose ids are not kept
fn removal_roots(nodes: &[ComponentNode], keep: &HashSet<String>, out: &mut Vec<String>) {
    for node in nodes {
        if keep.contains(&node.id) {
            removal_roots(&node.children, keep, out);
        } else {
            out.push(node.id.clone());
        }
    }
}

/// Remove surviving nodes that end up inside a freshly added subtree; the
/// later `Add` payload carries their new form.
fn detach_carried(
    work: &mut PageSchema,
    desired: &[ComponentNode],
    inside_added: bool,
    patches: &mut Vec<PatchOperation>,
) {
    for node in desired {
        let exists = work.contains(&node.id);
        if inside_added && exists {
            if let Some(path) = work.id_path(&node.id) {
                patches.push(PatchOperation::Remove { path });
            }
            work.detach(&node.id);
        }
        detach_carried(work, &node.children, inside_added || !exists, patches);
    }
}

fn content_eq(a: &ComponentNode, b: &ComponentNode) -> bool {
    a.component_type == b.component_type
        && a.props == b.props
        && a.position == b.position
        && a.size == b.size
}

fn insert_in(work: &mut PageSchema, parent: Option<&str>, index: usize, node: ComponentNode) {
    // Parents are settled before their children in this pass
    let _ = work.insert(parent, index, node);
}

/// Bring one container's children to the desired list, then recurse.
///
/// Positions are settled in ascending order, so a node's recorded target
/// index is final once emitted.
fn sync_children(
    work: &mut PageSchema,
    desired: &[ComponentNode],
    parent_path: &[String],
    patches: &mut Vec<PatchOperation>,
) {
    let parent_id: Option<String> = parent_path.last().cloned();

    for (index, child) in desired.iter().enumerate() {
        if work.contains(&child.id) {
            let located = work
                .locate(&child.id)
                .map(|(parent, at)| (parent.map(str::to_string), at));

            if let Some((work_parent, work_index)) = located {
                if work_parent != parent_id || work_index != index {
                    if let Some(path) = work.id_path(&child.id) {
                        patches.push(PatchOperation::Move {
                            path,
                            to: parent_path.to_vec(),
                            index,
                        });
                    }
                    if let Some(node) = work.detach(&child.id) {
                        insert_in(work, parent_id.as_deref(), index, node);
                    }
                }
            }

            let mut child_path = parent_path.to_vec();
            child_path.push(child.id.clone());

            let changed = match work.find(&child.id) {
                Some(work_node) => !content_eq(work_node, child),
                None => false,
            };
            if changed {
                patches.push(PatchOperation::Replace {
                    path: child_path.clone(),
                    value: ReplaceValue::Content {
                        component_type: child.component_type.clone(),
                        props: child.props.clone(),
                        position: child.position,
                        size: child.size,
                    },
                });
                if let Some(work_node) = work.find_mut(&child.id) {
                    work_node.component_type = child.component_type.clone();
                    work_node.props = child.props.clone();
                    work_node.position = child.position;
                    work_node.size = child.size;
                }
            }

            sync_children(work, &child.children, &child_path, patches);
        } else {
            // New subtree: the payload carries its final form wholesale
            patches.push(PatchOperation::Add {
                path: parent_path.to_vec(),
                index,
                node: child.clone(),
            });
            insert_in(work, parent_id.as_deref(), index, child.clone());
        }
    }
}
