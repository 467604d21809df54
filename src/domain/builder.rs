//! Hierarchy builder: turns flat parent-referencing records into forests.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::error::{DomainError, TreeResult};
use crate::domain::record::{FieldSpec, Record};

/// A forest built from one flat record list: the trees rooted at records
/// matching the root marker, plus the records that could not be placed.
///
/// Orphans are excluded from tree output (and from [`Forest::to_nested`]);
/// they are surfaced here for diagnostics.
#[derive(Debug, Default)]
pub struct Forest {
    /// One tree per root record, in input order
    pub trees: Vec<TreeArena>,
    /// Records whose parent chain ends at a non-existent id, in input order
    pub orphans: Vec<Record>,
}

impl Forest {
    /// Total number of placed nodes across all trees.
    pub fn node_count(&self) -> usize {
        self.trees.iter().map(|t| t.node_count()).sum()
    }

    /// Maximum tree depth in the forest (0 for an empty forest).
    pub fn depth(&self) -> usize {
        self.trees.iter().map(|t| t.depth()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Leaf labels across all trees, in forest order.
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.trees.iter().flat_map(|t| t.leaf_nodes()).collect()
    }

    /// Nested JSON output: an array of root records, each augmented with a
    /// `children` array, recursively. All other fields pass through
    /// unchanged.
    pub fn to_nested(&self) -> Value {
        Value::Array(self.trees.iter().map(nest_tree).collect())
    }

    /// Every leaf-to-root lineage in the forest, as label paths
    /// (leaf first, root last).
    pub fn branches(&self) -> Vec<Vec<String>> {
        self.trees.iter().flat_map(tree_branches).collect()
    }
}

fn nest_tree(tree: &TreeArena) -> Value {
    fn nest(tree: &TreeArena, idx: generational_arena::Index) -> Value {
        let node = match tree.get_node(idx) {
            Some(node) => node,
            None => return Value::Null,
        };
        let mut obj = node.data.record.clone();
        let children: Vec<Value> = node.children.iter().map(|&c| nest(tree, c)).collect();
        obj.insert("children".to_string(), Value::Array(children));
        Value::Object(obj)
    }

    match tree.root() {
        Some(root) => nest(tree, root),
        None => Value::Null,
    }
}

fn tree_branches(tree: &TreeArena) -> Vec<Vec<String>> {
    let mut branches = Vec::new();
    for (idx, node) in tree.iter() {
        if !node.children.is_empty() {
            continue;
        }
        // Walk parent links from leaf to root
        let mut lineage = Vec::new();
        let mut current = Some(idx);
        while let Some(i) = current {
            match tree.get_node(i) {
                Some(n) => {
                    lineage.push(n.data.label.clone());
                    current = n.parent;
                }
                None => break,
            }
        }
        branches.push(lineage);
    }
    branches
}

/// Constructs hierarchical trees from flat record lists.
///
/// Strategy (group-by-parent, then descend from roots): records are grouped
/// by their parent key in input order, roots are the records carrying the
/// root marker, and each tree is built by an iterative stack walk over the
/// groups. Each record is visited at most once; total work is linear.
pub struct HierarchyBuilder {
    children_by_parent: HashMap<String, Vec<usize>>,
    placed: HashSet<usize>,
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self {
            children_by_parent: HashMap::new(),
            placed: HashSet::new(),
        }
    }

    /// Build the forest for `records` under `fields`.
    ///
    /// Input records are never mutated. Fails with
    /// [`DomainError::DuplicateId`] when two records share an id key and
    /// [`DomainError::CycleDetected`] when a parent chain loops
    /// (self-reference included); orphaned records never fail the build.
    #[instrument(level = "debug", skip(self, records, fields))]
    pub fn build_forest(&mut self, records: &[Record], fields: &FieldSpec) -> TreeResult<Forest> {
        // Reset state for fresh build
        self.children_by_parent.clear();
        self.placed.clear();

        let id_index = index_by_id(records, fields)?;

        // Group record indices by parent key, preserving input order
        for (i, record) in records.iter().enumerate() {
            self.children_by_parent
                .entry(fields.parent_key(record))
                .or_default()
                .push(i);
        }

        // Roots are the group keyed by the root marker
        let roots: Vec<usize> = self
            .children_by_parent
            .get(&fields.root_key())
            .cloned()
            .unwrap_or_default();
        debug!(roots = roots.len(), records = records.len(), "grouped");

        let mut trees = Vec::with_capacity(roots.len());
        for root in roots {
            trees.push(self.build_tree(root, records, fields)?);
        }

        let orphans = self.classify_unplaced(records, fields, &id_index)?;

        Ok(Forest { trees, orphans })
    }

    fn build_tree(
        &mut self,
        root: usize,
        records: &[Record],
        fields: &FieldSpec,
    ) -> TreeResult<TreeArena> {
        let mut tree = TreeArena::new();
        let mut stack = vec![(root, None)];

        while let Some((current, parent_idx)) = stack.pop() {
            let record = &records[current];
            // Revisit means a record is reachable twice; with unique ids this
            // only happens on malformed group state
            if !self.placed.insert(current) {
                return Err(DomainError::CycleDetected(
                    fields.id_key(record).unwrap_or_else(|| "null".to_string()),
                ));
            }

            let node_data = NodeData {
                key: fields.id_key(record),
                label: fields.label(record),
                record: record.clone(),
            };
            let current_idx = tree.insert_node(node_data, parent_idx);

            // A record without an id can never be referenced as a parent
            if let Some(key) = fields.id_key(record) {
                if let Some(children) = self.children_by_parent.get(&key) {
                    // Reverse push keeps sibling pop order == input order
                    for &child in children.iter().rev() {
                        stack.push((child, Some(current_idx)));
                    }
                }
            }
        }

        Ok(tree)
    }

    /// Classify records left unplaced after the root descent: a parent chain
    /// ending at a missing id makes the whole chain orphans; a chain that
    /// loops back on itself is a cycle and fails the build.
    fn classify_unplaced(
        &self,
        records: &[Record],
        fields: &FieldSpec,
        id_index: &HashMap<String, usize>,
    ) -> TreeResult<Vec<Record>> {
        let mut orphaned: HashSet<usize> = HashSet::new();

        for start in 0..records.len() {
            if self.placed.contains(&start) || orphaned.contains(&start) {
                continue;
            }

            let mut path = Vec::new();
            let mut on_path: HashSet<usize> = HashSet::new();
            let mut current = start;
            loop {
                path.push(current);
                on_path.insert(current);

                let parent_key = fields.parent_key(&records[current]);
                match id_index.get(&parent_key) {
                    None => {
                        // Chain falls off the id index: everything on it is
                        // orphaned
                        orphaned.extend(path);
                        break;
                    }
                    Some(&parent) => {
                        if on_path.contains(&parent) {
                            return Err(DomainError::CycleDetected(
                                fields
                                    .id_key(&records[parent])
                                    .unwrap_or_else(|| "null".to_string()),
                            ));
                        }
                        if self.placed.contains(&parent) {
                            // Placed parents place their children during
                            // descent; reaching one here means the chain
                            // re-enters a finished tree, which unique ids
                            // rule out
                            orphaned.extend(path);
                            break;
                        }
                        if orphaned.contains(&parent) {
                            orphaned.extend(path);
                            break;
                        }
                        current = parent;
                    }
                }
            }
        }

        Ok(records
            .iter()
            .enumerate()
            .filter(|(i, _)| orphaned.contains(i))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

/// Index records by canonical id key, rejecting duplicates.
///
/// Records without the id field are skipped: they can appear as nodes but
/// never be referenced as parents.
fn index_by_id(records: &[Record], fields: &FieldSpec) -> TreeResult<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        if let Some(key) = fields.id_key(record) {
            if index.insert(key.clone(), i).is_some() {
                return Err(DomainError::DuplicateId(key));
            }
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(v: Value) -> Vec<Record> {
        v.as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_object().cloned().unwrap())
            .collect()
    }

    #[test]
    fn given_self_referencing_record_when_building_then_reports_cycle() {
        let items = records(json!([{"id": "a", "parent": "a"}]));
        let mut builder = HierarchyBuilder::new();
        let result = builder.build_forest(&items, &FieldSpec::default());

        assert!(matches!(result, Err(DomainError::CycleDetected(_))));
    }

    #[test]
    fn given_two_node_cycle_when_building_then_reports_cycle() {
        let items = records(json!([
            {"id": "a", "parent": "b"},
            {"id": "b", "parent": "a"}
        ]));
        let mut builder = HierarchyBuilder::new();
        let result = builder.build_forest(&items, &FieldSpec::default());

        assert!(matches!(result, Err(DomainError::CycleDetected(_))));
    }

    #[test]
    fn given_duplicate_ids_when_building_then_errors() {
        let items = records(json!([
            {"id": "a", "parent": null},
            {"id": "a", "parent": null}
        ]));
        let mut builder = HierarchyBuilder::new();
        let result = builder.build_forest(&items, &FieldSpec::default());

        assert!(matches!(result, Err(DomainError::DuplicateId(id)) if id == "\"a\""));
    }

    #[test]
    fn given_builder_reuse_when_building_twice_then_state_resets() {
        let items = records(json!([{"id": "a", "parent": null}]));
        let mut builder = HierarchyBuilder::new();

        let first = builder.build_forest(&items, &FieldSpec::default()).unwrap();
        let second = builder.build_forest(&items, &FieldSpec::default()).unwrap();

        assert_eq!(first.node_count(), 1);
        assert_eq!(second.node_count(), 1);
    }
}
