//! Whole-scene snapshots for the history engine.

use crate::object::SceneObjectData;
use easel_api_core::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// `user_data` keys that never survive a snapshot: runtime-only payloads
/// (file/blob handles, DOM references, renderer objects) that are not
/// serialization-safe. Keys with a `__` prefix are stripped as well.
const BLOCKED_USER_DATA_KEYS: [&str; 5] = ["file", "blob", "element", "window", "renderer"];

/// A deep, serialization-safe copy of the scene: object list, selection,
/// and the id counter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    pub objects: Vec<SceneObjectData>,
    pub selected_id: Option<ObjectId>,
    pub next_object_id: u64,
}

impl SceneSnapshot {
    pub fn new(
        objects: Vec<SceneObjectData>,
        selected_id: Option<ObjectId>,
        next_object_id: u64,
    ) -> Self {
        Self {
            objects,
            selected_id,
            next_object_id,
        }
    }

    /// Strip blocklisted `user_data` entries from every object. Stripping
    /// never fails; offending values are simply absent from the result.
    pub fn sanitized(mut self) -> Self {
        for object in &mut self.objects {
            sanitize_map(&mut object.user_data);
        }
        self
    }

    /// Structural equality for round-trip checks: same objects (by id,
    /// order-independent) and selection. The id counter is volatile and
    /// ignored.
    pub fn same_structure_as(&self, other: &SceneSnapshot) -> bool {
        if self.selected_id != other.selected_id || self.objects.len() != other.objects.len() {
            return false;
        }
        let mut mine: Vec<&SceneObjectData> = self.objects.iter().collect();
        let mut theirs: Vec<&SceneObjectData> = other.objects.iter().collect();
        mine.sort_by(|a, b| a.id.cmp(&b.id));
        theirs.sort_by(|a, b| a.id.cmp(&b.id));
        mine == theirs
    }
}

fn sanitize_map(map: &mut Map<String, JsonValue>) {
    map.retain(|key, _| !key.starts_with("__") && !BLOCKED_USER_DATA_KEYS.contains(&key.as_str()));
    for value in map.values_mut() {
        sanitize_value(value);
    }
}

fn sanitize_value(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => sanitize_map(map),
        JsonValue::Array(items) => {
            for item in items {
                sanitize_value(item);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;

    #[test]
    fn sanitize_strips_blocked_keys_recursively() {
        let mut record = SceneObjectData::new(ObjectKind::Mesh, "cube");
        record
            .user_data
            .insert("file".to_string(), serde_json::json!("blob:abc"));
        record
            .user_data
            .insert("__runtime".to_string(), serde_json::json!(1));
        record.user_data.insert(
            "nested".to_string(),
            serde_json::json!({ "window": {}, "kept": true }),
        );

        let snapshot =
            SceneSnapshot::new(vec![record], None, 1).sanitized();
        let user_data = &snapshot.objects[0].user_data;
        assert!(!user_data.contains_key("file"));
        assert!(!user_data.contains_key("__runtime"));
        let nested = user_data.get("nested").unwrap();
        assert!(nested.get("window").is_none());
        assert_eq!(nested.get("kept"), Some(&serde_json::json!(true)));
    }

    #[test]
    fn snapshot_serializes_after_sanitize() {
        let mut record = SceneObjectData::new(ObjectKind::Light, "sun");
        record
            .user_data
            .insert("blob".to_string(), serde_json::json!({"bytes": [1, 2, 3]}));
        let snapshot = SceneSnapshot::new(vec![record], None, 1).sanitized();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("bytes"));
        let back: SceneSnapshot = serde_json::from_str(&json).unwrap();
        assert!(snapshot.same_structure_as(&back));
    }
}
