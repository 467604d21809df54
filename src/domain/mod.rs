//! Domain layer: records, hierarchy construction, tree structures.

pub mod arena;
pub mod builder;
pub mod error;
pub mod record;
pub mod render;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{Forest, HierarchyBuilder};
pub use error::{DomainError, TreeResult};
pub use record::{canonical_key, FieldSpec, Record};
pub use render::ToTermTree;
