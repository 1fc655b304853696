use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Canvas position hint for the designer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Rendered size hint for the designer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// One element of the edited document tree.
///
/// The node exclusively owns its children: removing it removes the whole
/// subtree. `component_type` is an opaque tag resolved by the component
/// registry; prop values are carried as raw JSON. Props live in an ordered
/// map so a page always serializes the same way, which lets the autosave
/// pump compare serialized forms byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Stable id, unique within one page
    pub id: String,

    /// Opaque component tag (resolved externally)
    pub component_type: String,

    /// Configuration values, name → raw JSON
    #[serde(default)]
    pub props: BTreeMap<String, Value>,

    /// Ordered child nodes (exclusively owned)
    #[serde(default)]
    pub children: Vec<ComponentNode>,

    /// Designer position hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,

    /// Designer size hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

impl ComponentNode {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            component_type: component_type.into(),
            props: BTreeMap::new(),
            children: Vec::new(),
            position: None,
            size: None,
        }
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size { width, height });
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ComponentNode::subtree_len)
            .sum::<usize>()
    }

    /// Depth-first walk over this subtree, self first
    pub fn walk(&self, visit: &mut dyn FnMut(&ComponentNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// True if `id` names this node or any descendant
    pub fn contains(&self, id: &str) -> bool {
        if self.id == id {
            return true;
        }
        self.children.iter().any(|child| child.contains(id))
    }
}
