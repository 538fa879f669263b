//! Object patches and their classification.
//!
//! Every mutation of an existing object goes through [`ObjectPatch`]. The
//! classification decides two independent things: whether the history
//! engine snapshots before the change (critical vs non-critical), and how
//! the render sync realizes it (rebuild vs patch in place).

use super::payload::{CameraData, GeometryDesc, HelperData, MaterialDesc, SceneEnvironment};
use super::transform::TransformPatch;
use super::{ObjectKind, SceneObjectData};
use easel_api_core::ObjectId;
use serde_json::{Map, Value as JsonValue};

/// Partial update for one object. Unset fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct ObjectPatch {
    pub name: Option<String>,
    pub kind: Option<ObjectKind>,
    /// Outer `Some` means the patch changes the parent; inner `None`
    /// re-roots the object.
    pub parent_id: Option<Option<ObjectId>>,
    pub transform: Option<TransformPatch>,
    pub geometry: Option<GeometryDesc>,
    pub material: Option<MaterialDesc>,
    pub camera: Option<CameraData>,
    pub environment: Option<SceneEnvironment>,
    pub helper: Option<HelperData>,
    /// Merged key-by-key; a null value removes the key.
    pub user_data: Option<Map<String, JsonValue>>,
    pub visible: Option<bool>,
    pub cast_shadow: Option<bool>,
    pub receive_shadow: Option<bool>,
    pub frustum_culled: Option<bool>,
    pub selectable: Option<bool>,
    pub render_order: Option<u32>,
}

impl ObjectPatch {
    #[inline]
    pub fn transform(patch: TransformPatch) -> Self {
        Self {
            transform: Some(patch),
            ..Self::default()
        }
    }

    #[inline]
    pub fn reparent(parent: Option<ObjectId>) -> Self {
        Self {
            parent_id: Some(parent),
            ..Self::default()
        }
    }

    #[inline]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[inline]
    pub fn visibility(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    /// Classify this patch against the object's current state.
    pub fn classify(&self, current: &SceneObjectData) -> PatchEffect {
        let kind_changed = self.kind.is_some_and(|k| k != current.kind);
        let parent_changed = self
            .parent_id
            .as_ref()
            .is_some_and(|p| *p != current.parent_id);
        let helper_kind_changed = match (&self.helper, &current.helper) {
            (Some(new), Some(old)) => new.kind != old.kind,
            (Some(_), None) => true,
            _ => false,
        };
        let light_kind_changed = self
            .user_data
            .as_ref()
            .and_then(|m| m.get("light")?.get("kind")?.as_str())
            .is_some_and(|new_kind| current.light_kind() != Some(new_kind));

        let geometry_changed = self.geometry.is_some();
        let geometry_rebuilds = match (&self.geometry, &current.mesh) {
            (Some(new), Some(mesh)) => new.kind != mesh.geometry.kind,
            (Some(_), None) => true,
            _ => false,
        };
        let material_changed = self.material.is_some();
        let material_rebuilds = match (&self.material, &current.mesh) {
            (Some(new), Some(mesh)) => new.kind != mesh.material.kind,
            (Some(_), None) => true,
            _ => false,
        };

        let class = if kind_changed {
            MutationClass::Critical(CriticalChange::Kind)
        } else if parent_changed {
            MutationClass::Critical(CriticalChange::Parent)
        } else if helper_kind_changed {
            MutationClass::Critical(CriticalChange::HelperKind)
        } else if light_kind_changed {
            MutationClass::Critical(CriticalChange::LightKind)
        } else if geometry_changed {
            MutationClass::Critical(CriticalChange::Geometry)
        } else if material_changed {
            MutationClass::Critical(CriticalChange::Material)
        } else {
            MutationClass::NonCritical
        };

        let rebuild =
            kind_changed || helper_kind_changed || light_kind_changed || geometry_rebuilds
                || material_rebuilds;

        PatchEffect {
            class,
            rebuild,
            reattach: parent_changed || rebuild,
            geometry_changed,
            material_changed,
            transform_changed: self.transform.is_some_and(|t| !t.is_empty()),
            flags_changed: self.visible.is_some()
                || self.cast_shadow.is_some()
                || self.receive_shadow.is_some()
                || self.frustum_culled.is_some()
                || self.render_order.is_some(),
            camera_changed: self.camera.is_some(),
            environment_changed: self.environment.is_some(),
            helper_changed: self.helper.is_some(),
            light_changed: self
                .user_data
                .as_ref()
                .is_some_and(|m| m.contains_key("light")),
        }
    }
}

/// The subtype of critical change, for history labels and diagnostics.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CriticalChange {
    Kind,
    Parent,
    HelperKind,
    LightKind,
    Geometry,
    Material,
}

/// History-relevant classification of a patch.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MutationClass {
    /// Snapshotted before application; may force a renderable rebuild.
    Critical(CriticalChange),
    /// Cheap continuous edit (transform drag, visibility toggle); never
    /// snapshotted.
    NonCritical,
}

impl MutationClass {
    #[inline]
    pub fn is_critical(&self) -> bool {
        matches!(self, MutationClass::Critical(_))
    }
}

/// Everything the registry needs to apply a classified patch.
#[derive(Copy, Clone, Debug)]
pub struct PatchEffect {
    pub class: MutationClass,
    /// Dispose and recreate the renderable.
    pub rebuild: bool,
    /// Re-attach in the render hierarchy (parent changed, or rebuilt).
    pub reattach: bool,
    pub geometry_changed: bool,
    pub material_changed: bool,
    pub transform_changed: bool,
    pub flags_changed: bool,
    pub camera_changed: bool,
    pub environment_changed: bool,
    pub helper_changed: bool,
    pub light_changed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::payload::{GeometryKind, MaterialKind};
    use crate::object::TransformPatch;

    #[test]
    fn transform_patch_is_non_critical() {
        let record = SceneObjectData::new(ObjectKind::Mesh, "cube");
        let patch = ObjectPatch::transform(TransformPatch::position([1.0, 0.0, 0.0]));
        let effect = patch.classify(&record);
        assert_eq!(effect.class, MutationClass::NonCritical);
        assert!(!effect.rebuild);
        assert!(effect.transform_changed);
    }

    #[test]
    fn reparent_is_critical_but_not_a_rebuild() {
        let record = SceneObjectData::new(ObjectKind::Mesh, "cube");
        let patch = ObjectPatch::reparent(Some(ObjectId::new("obj-9")));
        let effect = patch.classify(&record);
        assert_eq!(
            effect.class,
            MutationClass::Critical(CriticalChange::Parent)
        );
        assert!(!effect.rebuild);
        assert!(effect.reattach);
    }

    #[test]
    fn same_parent_patch_is_non_critical() {
        let mut record = SceneObjectData::new(ObjectKind::Mesh, "cube");
        record.parent_id = Some(ObjectId::new("obj-9"));
        let patch = ObjectPatch::reparent(Some(ObjectId::new("obj-9")));
        assert_eq!(patch.classify(&record).class, MutationClass::NonCritical);
    }

    #[test]
    fn geometry_family_change_rebuilds_parameter_change_patches() {
        let record = SceneObjectData::new(ObjectKind::Mesh, "cube");

        let same_family = ObjectPatch {
            geometry: Some(GeometryDesc::new(GeometryKind::Box)),
            ..ObjectPatch::default()
        };
        let effect = same_family.classify(&record);
        assert!(effect.class.is_critical());
        assert!(!effect.rebuild);
        assert!(effect.geometry_changed);

        let new_family = ObjectPatch {
            geometry: Some(GeometryDesc::new(GeometryKind::Sphere)),
            ..ObjectPatch::default()
        };
        let effect = new_family.classify(&record);
        assert!(effect.rebuild);
    }

    #[test]
    fn material_family_change_rebuilds() {
        let record = SceneObjectData::new(ObjectKind::Mesh, "cube");
        let patch = ObjectPatch {
            material: Some(MaterialDesc::new(MaterialKind::Toon)),
            ..ObjectPatch::default()
        };
        assert!(patch.classify(&record).rebuild);
    }

    #[test]
    fn light_subtype_change_is_critical() {
        let record = SceneObjectData::new(ObjectKind::Light, "sun");
        let mut user_data = Map::new();
        user_data.insert(
            "light".to_string(),
            serde_json::json!({ "kind": "point", "intensity": 2.0 }),
        );
        let patch = ObjectPatch {
            user_data: Some(user_data),
            ..ObjectPatch::default()
        };
        let effect = patch.classify(&record);
        assert_eq!(
            effect.class,
            MutationClass::Critical(CriticalChange::LightKind)
        );
        assert!(effect.rebuild);

        // Intensity-only edits stay non-critical.
        let mut user_data = Map::new();
        user_data.insert(
            "light".to_string(),
            serde_json::json!({ "kind": "directional", "intensity": 0.5 }),
        );
        let patch = ObjectPatch {
            user_data: Some(user_data),
            ..ObjectPatch::default()
        };
        assert_eq!(patch.classify(&record).class, MutationClass::NonCritical);
    }
}
