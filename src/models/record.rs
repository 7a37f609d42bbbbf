use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key-value payload of a stored document.
pub type Fields = Map<String, Value>;

/// A document read back from the store, tagged with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(flatten)]
    pub fields: Fields,
}

impl Record {
    /// Builds a record from a raw document payload.
    ///
    /// The store-assigned `id` always wins: any `id` key inside the stored
    /// payload is dropped.
    pub fn from_document(id: impl Into<String>, mut data: Fields) -> Self {
        data.remove("id");
        Self {
            id: id.into(),
            fields: data,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Returns a copy with `patch` merged in at the top level only.
    ///
    /// Nested objects in the patch replace the stored value wholesale. An
    /// `id` key in the patch is ignored.
    pub fn merged(&self, patch: &Fields) -> Self {
        let mut fields = self.fields.clone();
        merge_top_level(&mut fields, patch);
        Self {
            id: self.id.clone(),
            fields,
        }
    }

    /// Converts into a JSON object that includes the `id` field.
    pub fn into_value(self) -> Value {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Value::Object(fields)
    }
}

/// Top-level merge used by every update path (store adapters and local state).
pub fn merge_top_level(target: &mut Fields, patch: &Fields) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Converts a JSON value into document fields, rejecting non-objects.
pub fn fields_from_value(value: Value) -> Option<Fields> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        fields_from_value(value).unwrap()
    }

    #[test]
    fn test_store_id_overrides_payload_id() {
        let record = Record::from_document("doc-1", fields(json!({"id": "stale", "title": "Cut"})));

        assert_eq!(record.id, "doc-1");
        assert!(record.get("id").is_none());
        assert_eq!(record.clone().into_value()["id"], "doc-1");
    }

    #[test]
    fn test_merged_is_top_level_only() {
        let record = Record::from_document(
            "u1",
            fields(json!({"name": "Ann", "service": {"name": "Haircut", "price": 20}})),
        );

        let merged = record.merged(&fields(json!({"service": {"price": 25}})));

        assert_eq!(merged.get_str("name"), Some("Ann"));
        assert_eq!(merged.get("service"), Some(&json!({"price": 25})));
        // original untouched
        assert_eq!(record.get("service").unwrap()["name"], "Haircut");
    }

    #[test]
    fn test_merged_ignores_patch_id() {
        let record = Record::from_document("u1", Fields::new());
        let merged = record.merged(&fields(json!({"id": "other", "a": 1})));

        assert_eq!(merged.id, "u1");
        assert!(merged.get("id").is_none());
        assert_eq!(merged.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_fields_from_value_rejects_non_objects() {
        assert!(fields_from_value(json!([1, 2])).is_none());
        assert!(fields_from_value(json!("text")).is_none());
        assert!(fields_from_value(json!({})).is_some());
    }
}
