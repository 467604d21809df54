//! Generic record model: flat JSON objects with self-referencing parent fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A flat input record. Arbitrary domain fields (name, color, description)
/// pass through the hierarchy untouched; only the id and parent fields are
/// interpreted.
pub type Record = serde_json::Map<String, Value>;

/// Field names and sentinel value driving hierarchy construction.
///
/// Defaults match the common kit layout: `id` / `parent` with `null` marking
/// top-level records, and `name` used for display labels.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldSpec {
    /// Field holding each record's own identifier
    pub id_field: String,
    /// Field holding the parent reference
    pub parent_field: String,
    /// Parent value that denotes "no parent"
    pub root_marker: Value,
    /// Field used for display labels (falls back to the id)
    pub label_field: String,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            parent_field: "parent".to_string(),
            root_marker: Value::Null,
            label_field: "name".to_string(),
        }
    }
}

impl FieldSpec {
    /// Canonical key for a record's own identifier, if the id field is present.
    ///
    /// Keys are the canonical JSON text of the value, so `"1"` and `1` stay
    /// distinct and non-string ids are supported.
    pub fn id_key(&self, record: &Record) -> Option<String> {
        record.get(&self.id_field).map(canonical_key)
    }

    /// Canonical key for a record's parent reference.
    ///
    /// An absent parent field counts as the root marker only when the marker
    /// is `null` (absence == null).
    pub fn parent_key(&self, record: &Record) -> String {
        match record.get(&self.parent_field) {
            Some(value) => canonical_key(value),
            None => canonical_key(&Value::Null),
        }
    }

    /// Canonical key of the root marker itself.
    pub fn root_key(&self) -> String {
        canonical_key(&self.root_marker)
    }

    /// Whether the record is a root (parent value equals the root marker).
    pub fn is_root(&self, record: &Record) -> bool {
        self.parent_key(record) == self.root_key()
    }

    /// Human-readable label: the label field if it is a string, else the
    /// raw id value, else a placeholder.
    pub fn label(&self, record: &Record) -> String {
        if let Some(Value::String(s)) = record.get(&self.label_field) {
            return s.clone();
        }
        match record.get(&self.id_field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "<no id>".to_string(),
        }
    }
}

/// Canonical JSON text of a value, used as hash-map key for id comparison.
pub fn canonical_key(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: Value) -> Record {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn given_absent_parent_field_when_marker_is_null_then_record_is_root() {
        let spec = FieldSpec::default();
        let r = record(json!({"id": "a"}));
        assert!(spec.is_root(&r));
    }

    #[test]
    fn given_absent_parent_field_when_marker_is_not_null_then_record_is_not_root() {
        let spec = FieldSpec {
            root_marker: json!(0),
            ..FieldSpec::default()
        };
        let r = record(json!({"id": "a"}));
        assert!(!spec.is_root(&r));
    }

    #[test]
    fn given_string_and_number_ids_when_keyed_then_keys_differ() {
        assert_ne!(canonical_key(&json!("1")), canonical_key(&json!(1)));
    }

    #[test]
    fn given_record_without_label_field_when_labeling_then_falls_back_to_id() {
        let spec = FieldSpec::default();
        let r = record(json!({"id": "aspirin"}));
        assert_eq!(spec.label(&r), "aspirin");
    }
}
