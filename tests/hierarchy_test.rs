//! Tests for HierarchyBuilder forest construction

use serde_json::{json, Value};

use kitree::domain::{DomainError, FieldSpec, HierarchyBuilder, Record};

fn records(v: Value) -> Vec<Record> {
    v.as_array()
        .unwrap()
        .iter()
        .map(|r| r.as_object().cloned().unwrap())
        .collect()
}

fn build(items: Vec<Record>) -> kitree::domain::Forest {
    HierarchyBuilder::new()
        .build_forest(&items, &FieldSpec::default())
        .unwrap()
}

// ============================================================
// Nesting
// ============================================================

#[test]
fn given_four_record_hierarchy_when_nesting_then_matches_expected_shape() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"id": "b", "parent": "a"},
        {"id": "c", "parent": "a"},
        {"id": "d", "parent": "b"}
    ]));

    let forest = build(items);

    let expected = json!([
        {"id": "a", "parent": null, "children": [
            {"id": "b", "parent": "a", "children": [
                {"id": "d", "parent": "b", "children": []}
            ]},
            {"id": "c", "parent": "a", "children": []}
        ]}
    ]);
    assert_eq!(forest.to_nested(), expected);
}

#[test]
fn given_domain_fields_when_nesting_then_extra_fields_pass_through() {
    let items = records(json!([
        {"id": "first-aid", "parent": null, "name": "First aid", "color": "#d33"},
        {"id": "bandages", "parent": "first-aid", "name": "Bandages"}
    ]));

    let forest = build(items);

    let expected = json!([
        {"id": "first-aid", "parent": null, "name": "First aid", "color": "#d33",
         "children": [
            {"id": "bandages", "parent": "first-aid", "name": "Bandages", "children": []}
        ]}
    ]);
    assert_eq!(forest.to_nested(), expected);
}

#[test]
fn given_empty_input_when_building_then_forest_is_empty() {
    let forest = build(vec![]);

    assert!(forest.is_empty());
    assert_eq!(forest.to_nested(), json!([]));
    assert!(forest.orphans.is_empty());
}

// ============================================================
// Ordering
// ============================================================

#[test]
fn given_two_roots_when_building_then_preserves_input_order() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"id": "b", "parent": null}
    ]));

    let forest = build(items);

    let expected = json!([
        {"id": "a", "parent": null, "children": []},
        {"id": "b", "parent": null, "children": []}
    ]);
    assert_eq!(forest.to_nested(), expected);
}

#[test]
fn given_interleaved_siblings_when_building_then_sibling_order_follows_first_appearance() {
    // Children of "root" appear interleaved with another tree's records
    let items = records(json!([
        {"id": "x", "parent": "root"},
        {"id": "root", "parent": null},
        {"id": "other", "parent": null},
        {"id": "y", "parent": "root"},
        {"id": "z", "parent": "root"}
    ]));

    let forest = build(items);
    let nested = forest.to_nested();

    // Roots in input order: "root" before "other"
    assert_eq!(nested[0]["id"], json!("root"));
    assert_eq!(nested[1]["id"], json!("other"));
    // Siblings in first-appearance order: x, y, z
    let child_ids: Vec<&Value> = nested[0]["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| &c["id"])
        .collect();
    assert_eq!(child_ids, vec![&json!("x"), &json!("y"), &json!("z")]);
}

// ============================================================
// Orphans
// ============================================================

#[test]
fn given_record_with_missing_parent_when_building_then_orphan_is_dropped_from_trees() {
    let items = records(json!([
        {"id": "x", "parent": "missing-parent"}
    ]));

    let forest = build(items);

    assert_eq!(forest.to_nested(), json!([]));
    assert_eq!(forest.orphans.len(), 1);
    assert_eq!(forest.orphans[0].get("id"), Some(&json!("x")));
}

#[test]
fn given_orphan_chain_when_building_then_whole_chain_is_orphaned() {
    // "b" hangs off "a", which hangs off a non-existent parent
    let items = records(json!([
        {"id": "a", "parent": "gone"},
        {"id": "b", "parent": "a"},
        {"id": "root", "parent": null}
    ]));

    let forest = build(items);

    assert_eq!(forest.node_count(), 1);
    assert_eq!(forest.orphans.len(), 2);
}

#[test]
fn given_no_root_matches_marker_when_building_then_trees_are_empty() {
    let items = records(json!([
        {"id": "a", "parent": "nowhere"},
        {"id": "b", "parent": "a"}
    ]));

    let forest = build(items);

    assert!(forest.trees.is_empty());
    assert_eq!(forest.orphans.len(), 2);
}

// ============================================================
// Counting invariants
// ============================================================

#[test]
fn given_mixed_input_when_building_then_every_record_is_placed_or_orphaned() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"id": "b", "parent": "a"},
        {"id": "c", "parent": "a"},
        {"id": "d", "parent": "b"},
        {"id": "lost", "parent": "nowhere"}
    ]));
    let total = items.len();

    let forest = build(items);

    assert_eq!(forest.node_count(), 4);
    assert_eq!(forest.node_count() + forest.orphans.len(), total);
}

#[test]
fn given_deep_chain_when_building_then_depth_matches_chain_length() {
    let items = records(json!([
        {"id": "l0", "parent": null},
        {"id": "l1", "parent": "l0"},
        {"id": "l2", "parent": "l1"},
        {"id": "l3", "parent": "l2"},
        {"id": "l4", "parent": "l3"}
    ]));

    let forest = build(items);

    assert_eq!(forest.trees.len(), 1);
    assert_eq!(forest.depth(), 5);
    assert_eq!(forest.node_count(), 5);
}

// ============================================================
// Idempotence
// ============================================================

/// Strip injected `children` fields back into a preorder flat list.
fn flatten(nested: &Value, out: &mut Vec<Record>) {
    for node in nested.as_array().unwrap() {
        let mut record = node.as_object().cloned().unwrap();
        let children = record.remove("children").unwrap();
        out.push(record);
        flatten(&children, out);
    }
}

#[test]
fn given_nested_output_when_flattened_and_rebuilt_then_forest_is_equivalent() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"id": "b", "parent": "a"},
        {"id": "c", "parent": "a"},
        {"id": "d", "parent": "b"},
        {"id": "e", "parent": null}
    ]));

    let first = build(items).to_nested();
    let mut flat = Vec::new();
    flatten(&first, &mut flat);
    let second = build(flat).to_nested();

    assert_eq!(first, second);
}

// ============================================================
// Custom field specs
// ============================================================

#[test]
fn given_custom_field_names_and_marker_when_building_then_uses_them() {
    let items = records(json!([
        {"kit_id": 1, "parent_kit": 0, "name": "Travel kit"},
        {"kit_id": 2, "parent_kit": 1, "name": "Plasters"}
    ]));
    let fields = FieldSpec {
        id_field: "kit_id".to_string(),
        parent_field: "parent_kit".to_string(),
        root_marker: json!(0),
        label_field: "name".to_string(),
    };

    let forest = HierarchyBuilder::new().build_forest(&items, &fields).unwrap();

    assert_eq!(forest.trees.len(), 1);
    assert_eq!(forest.node_count(), 2);
    assert_eq!(forest.leaf_nodes(), vec!["Plasters".to_string()]);
}

#[test]
fn given_record_without_id_field_when_building_then_it_is_still_placed_as_leaf() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"parent": "a", "name": "anonymous"}
    ]));

    let forest = build(items);

    assert_eq!(forest.node_count(), 2);
    assert!(forest.orphans.is_empty());
}

// ============================================================
// Error cases
// ============================================================

#[test]
fn given_cyclic_records_when_building_then_fails_with_cycle_error() {
    let items = records(json!([
        {"id": "root", "parent": null},
        {"id": "a", "parent": "c"},
        {"id": "b", "parent": "a"},
        {"id": "c", "parent": "b"}
    ]));

    let result = HierarchyBuilder::new().build_forest(&items, &FieldSpec::default());

    assert!(matches!(result, Err(DomainError::CycleDetected(_))));
}

#[test]
fn given_duplicate_ids_when_building_then_fails_with_duplicate_error() {
    let items = records(json!([
        {"id": "a", "parent": null},
        {"id": "b", "parent": "a"},
        {"id": "b", "parent": "a"}
    ]));

    let result = HierarchyBuilder::new().build_forest(&items, &FieldSpec::default());

    assert!(matches!(result, Err(DomainError::DuplicateId(_))));
}
