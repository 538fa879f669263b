//! Scene persistence payloads.
//!
//! Storage itself (HTTP, IndexedDB, disk) is an external collaborator; the
//! core only produces and consumes [`SceneDocument`]s. Animation data
//! travels as an opaque JSON envelope owned by the animation layer.

use crate::error::SceneError;
use crate::object::SceneObjectData;
use crate::snapshot::SceneSnapshot;
use easel_api_core::ObjectId;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The JSON-serializable unit of scene save/load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDocument {
    pub objects: Vec<SceneObjectData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<ObjectId>,
    pub next_object_id: u64,
    /// Renderer configuration owned by the UI layer; passed through.
    #[serde(default)]
    pub renderer_settings: JsonValue,
    /// Asset manifest owned by the asset layer; passed through.
    #[serde(default)]
    pub assets: JsonValue,
    /// Animation envelope owned by the animation layer; passed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<JsonValue>,
}

impl SceneDocument {
    pub fn from_snapshot(snapshot: SceneSnapshot, animation: Option<JsonValue>) -> Self {
        Self {
            objects: snapshot.objects,
            selected_id: snapshot.selected_id,
            next_object_id: snapshot.next_object_id,
            renderer_settings: JsonValue::Null,
            assets: JsonValue::Null,
            animation,
        }
    }

    pub fn into_snapshot(self) -> (SceneSnapshot, Option<JsonValue>) {
        (
            SceneSnapshot::new(self.objects, self.selected_id, self.next_object_id),
            self.animation,
        )
    }
}

/// Load/save scenes by id.
pub trait PersistenceBackend {
    fn load_scene(&mut self, id: &str) -> Result<SceneDocument, SceneError>;
    fn save_scene(&mut self, id: &str, document: &SceneDocument) -> Result<(), SceneError>;
}

/// In-memory persistence; for tests and headless tooling.
#[derive(Default)]
pub struct MemoryPersistence {
    scenes: HashMap<String, SceneDocument>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.scenes.contains_key(id)
    }
}

impl PersistenceBackend for MemoryPersistence {
    fn load_scene(&mut self, id: &str) -> Result<SceneDocument, SceneError> {
        self.scenes
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::ObjectNotFound { id: id.to_string() })
    }

    fn save_scene(&mut self, id: &str, document: &SceneDocument) -> Result<(), SceneError> {
        self.scenes.insert(id.to_string(), document.clone());
        Ok(())
    }
}
