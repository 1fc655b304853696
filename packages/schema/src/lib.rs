//! # Pagecraft Schema
//!
//! Document model for the Pagecraft editor.
//!
//! A page is a tree of configurable components:
//!
//! ```text
//! PageSchema
//! ├── metadata (title, description, keywords, timestamps)
//! ├── settings (theme, layout, responsive)
//! └── components: Vec<ComponentNode>
//!     └── ComponentNode { id, component_type, props, children, geometry }
//! ```
//!
//! ## Core Principles
//!
//! 1. **Ownership is structure**: a node exclusively owns its children, so
//!    destroying a node destroys its subtree and cycles cannot be expressed.
//! 2. **Identity over position**: every node carries a stable id, unique
//!    within the page; all cross-references use ids, never indices.
//! 3. **Opaque leaves**: `component_type` and prop values are carried
//!    untouched; resolving them is the component registry's job.
//! 4. **Operations are data**: semantic mutations are values that validate
//!    against the page before they touch it.

pub mod id;
pub mod node;
pub mod ops;
pub mod page;

pub use id::IdGenerator;
pub use node::{ComponentNode, Position, Size};
pub use ops::{ComponentOperation, OperationError};
pub use page::{PageMetadata, PageSchema, PageSettings, SchemaError};
