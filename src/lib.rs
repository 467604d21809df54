//! kitree: organize flat parent-referencing records into nested hierarchies.
//!
//! Records are generic JSON objects carrying an identifier and a parent
//! reference (the medicine-cabinet "kit" layout: `id` / `parent` with `null`
//! marking top-level kits). [`domain::HierarchyBuilder`] groups them by
//! parent and descends from the roots, producing a [`domain::Forest`] of
//! arena-backed trees plus the records that could not be placed.
//!
//! ```
//! use kitree::domain::{FieldSpec, HierarchyBuilder, Record};
//! use serde_json::json;
//!
//! let records: Vec<Record> = [
//!     json!({"id": "first-aid", "parent": null, "name": "First aid"}),
//!     json!({"id": "bandages", "parent": "first-aid", "name": "Bandages"}),
//! ]
//! .iter()
//! .map(|v| v.as_object().cloned().unwrap())
//! .collect();
//!
//! let mut builder = HierarchyBuilder::new();
//! let forest = builder.build_forest(&records, &FieldSpec::default()).unwrap();
//! assert_eq!(forest.trees.len(), 1);
//! assert_eq!(forest.node_count(), 2);
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod loader;
pub mod util;

pub use config::Settings;
pub use domain::{FieldSpec, Forest, HierarchyBuilder, Record, TreeArena};
pub use loader::load_records;
