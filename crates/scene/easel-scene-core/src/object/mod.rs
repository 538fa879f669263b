//! The scene object data model.

mod patch;
mod payload;
mod transform;

pub use patch::{CriticalChange, MutationClass, ObjectPatch, PatchEffect};
pub use payload::{
    CameraData, FogSettings, GeometryDesc, GeometryKind, HelperData, HelperKind, MaterialDesc,
    MaterialKind, MeshData, SceneEnvironment,
};
pub use transform::{Transform, TransformPatch};

use easel_api_core::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// What a scene object is; decides its payload and how the render backend
/// realizes it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Group,
    Mesh,
    Camera,
    Light,
    Helper,
    Model,
    PointCloud,
    Scene,
}

/// Render-relevant boolean flags plus the draw-order hint, grouped so the
/// backend can patch them in one call.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderFlags {
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub frustum_culled: bool,
    pub render_order: u32,
}

/// One node of the scene graph.
///
/// `parent_id`/`children_ids` are kept bidirectionally consistent by the
/// registry: a non-root node's id appears in exactly its parent's
/// `children_ids`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneObjectData {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub name: String,
    pub parent_id: Option<ObjectId>,
    pub children_ids: Vec<ObjectId>,
    pub transform: Transform,
    /// Geometry/material pair; present for mesh-like kinds.
    pub mesh: Option<MeshData>,
    pub camera: Option<CameraData>,
    /// Background/environment/fog; present on the scene root.
    pub environment: Option<SceneEnvironment>,
    pub helper: Option<HelperData>,
    /// Free-form side data; light parameters live under the "light" key.
    #[serde(default)]
    pub user_data: Map<String, JsonValue>,
    pub visible: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub frustum_culled: bool,
    pub selectable: bool,
    pub render_order: u32,
}

impl SceneObjectData {
    /// Create a record with kind-appropriate defaults; every payload a
    /// kind requires is filled in.
    pub fn new(kind: ObjectKind, name: impl Into<String>) -> Self {
        let mut record = Self {
            id: ObjectId::default(),
            kind,
            name: name.into(),
            parent_id: None,
            children_ids: Vec::new(),
            transform: Transform::default(),
            mesh: None,
            camera: None,
            environment: None,
            helper: None,
            user_data: Map::new(),
            visible: true,
            cast_shadow: false,
            receive_shadow: false,
            frustum_culled: true,
            selectable: true,
            render_order: 0,
        };
        match kind {
            ObjectKind::Mesh | ObjectKind::Model | ObjectKind::PointCloud => {
                record.mesh = Some(MeshData::default());
                record.cast_shadow = kind == ObjectKind::Mesh;
                record.receive_shadow = kind == ObjectKind::Mesh;
            }
            ObjectKind::Camera => {
                record.camera = Some(CameraData::default());
            }
            ObjectKind::Scene => {
                record.environment = Some(SceneEnvironment::default());
            }
            ObjectKind::Helper => {
                record.helper = Some(HelperData::default());
                record.selectable = false;
            }
            ObjectKind::Light => {
                record.user_data.insert(
                    "light".to_string(),
                    serde_json::json!({
                        "kind": "directional",
                        "color": "#ffffff",
                        "intensity": 1.0,
                    }),
                );
            }
            ObjectKind::Group => {}
        }
        record
    }

    #[inline]
    pub fn with_id(mut self, id: impl Into<ObjectId>) -> Self {
        self.id = id.into();
        self
    }

    /// The flags the render backend patches as one unit.
    #[inline]
    pub fn render_flags(&self) -> RenderFlags {
        RenderFlags {
            visible: self.visible,
            cast_shadow: self.cast_shadow,
            receive_shadow: self.receive_shadow,
            frustum_culled: self.frustum_culled,
            render_order: self.render_order,
        }
    }

    /// The light parameter subtype ("directional", "point", ...), read from
    /// `user_data`.
    pub fn light_kind(&self) -> Option<&str> {
        self.user_data.get("light")?.get("kind")?.as_str()
    }

    /// Merge a patch into this record. Re-parent bookkeeping is the
    /// registry's job; this only rewrites the fields.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(parent_id) = &patch.parent_id {
            self.parent_id = parent_id.clone();
        }
        if let Some(transform) = &patch.transform {
            self.transform.apply(transform);
        }
        if let Some(geometry) = &patch.geometry {
            let mesh = self.mesh.get_or_insert_with(MeshData::default);
            mesh.geometry = geometry.clone();
        }
        if let Some(material) = &patch.material {
            let mesh = self.mesh.get_or_insert_with(MeshData::default);
            mesh.material = material.clone();
        }
        if let Some(camera) = &patch.camera {
            self.camera = Some(camera.clone());
        }
        if let Some(environment) = &patch.environment {
            self.environment = Some(environment.clone());
        }
        if let Some(helper) = &patch.helper {
            self.helper = Some(helper.clone());
        }
        if let Some(user_data) = &patch.user_data {
            // JSON-merge-patch style: null removes a key.
            for (key, value) in user_data {
                if value.is_null() {
                    self.user_data.remove(key);
                } else {
                    self.user_data.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(cast_shadow) = patch.cast_shadow {
            self.cast_shadow = cast_shadow;
        }
        if let Some(receive_shadow) = patch.receive_shadow {
            self.receive_shadow = receive_shadow;
        }
        if let Some(frustum_culled) = patch.frustum_culled {
            self.frustum_culled = frustum_culled;
        }
        if let Some(selectable) = patch.selectable {
            self.selectable = selectable;
        }
        if let Some(render_order) = patch.render_order {
            self.render_order = render_order;
        }
    }
}
