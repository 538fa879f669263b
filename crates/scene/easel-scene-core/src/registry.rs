//! The scene object registry: the data-side scene graph, the id→renderable
//! map, and the sync policy that keeps the two aligned.
//!
//! The registry is the only owner of the renderable map. The animation
//! engine never touches renderables; it writes data through the
//! [`PropertyStore`] impl and a later [`sync_transforms`] pass pushes the
//! values into the render graph.
//!
//! [`sync_transforms`]: SceneObjectRegistry::sync_transforms

use crate::backend::RenderBackend;
use crate::error::SceneError;
use crate::object::{ObjectKind, ObjectPatch, PatchEffect, SceneObjectData};
use crate::snapshot::SceneSnapshot;
use easel_api_core::{AnimatableProperty, ObjectId, PropertyStore, Value};
use hashbrown::HashMap;

/// Options for [`SceneObjectRegistry::remove`].
#[derive(Copy, Clone, Debug)]
pub struct RemoveOptions {
    /// When true (the default) every descendant is removed with the
    /// object; when false, direct children are orphaned to the root
    /// instead.
    pub remove_children: bool,
}

impl Default for RemoveOptions {
    fn default() -> Self {
        Self {
            remove_children: true,
        }
    }
}

/// In-memory scene object store bound to one render backend.
pub struct SceneObjectRegistry<B: RenderBackend> {
    backend: B,
    objects: Vec<SceneObjectData>,
    renderables: HashMap<ObjectId, B::Handle>,
    selected_id: Option<ObjectId>,
    next_object_id: u64,
}

impl<B: RenderBackend> SceneObjectRegistry<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            objects: Vec::new(),
            renderables: HashMap::new(),
            selected_id: None,
            next_object_id: 0,
        }
    }

    // ---- queries ---------------------------------------------------------

    #[inline]
    fn index_of(&self, id: &ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| &o.id == id)
    }

    #[inline]
    pub fn get(&self, id: &ObjectId) -> Option<&SceneObjectData> {
        self.objects.iter().find(|o| &o.id == id)
    }

    #[inline]
    pub fn objects(&self) -> &[SceneObjectData] {
        &self.objects
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Direct children, in `children_ids` order.
    pub fn children_of(&self, id: &ObjectId) -> Vec<&SceneObjectData> {
        let Some(parent) = self.get(id) else {
            return Vec::new();
        };
        parent
            .children_ids
            .iter()
            .filter_map(|child| self.get(child))
            .collect()
    }

    /// Every descendant id, breadth-first.
    pub fn descendants_of(&self, id: &ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut queue: Vec<ObjectId> = match self.get(id) {
            Some(record) => record.children_ids.clone(),
            None => return out,
        };
        while let Some(next) = queue.pop() {
            if let Some(record) = self.get(&next) {
                queue.extend(record.children_ids.iter().cloned());
            }
            out.push(next);
        }
        out
    }

    /// Ancestor chain from the direct parent up to the root.
    pub fn ancestors_of(&self, id: &ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut current = self.get(id).and_then(|o| o.parent_id.clone());
        while let Some(parent_id) = current {
            current = self.get(&parent_id).and_then(|o| o.parent_id.clone());
            out.push(parent_id);
        }
        out
    }

    pub fn objects_of_kind(&self, kind: ObjectKind) -> Vec<&SceneObjectData> {
        self.objects.iter().filter(|o| o.kind == kind).collect()
    }

    /// Objects with no parent.
    pub fn roots(&self) -> Vec<&SceneObjectData> {
        self.objects
            .iter()
            .filter(|o| o.parent_id.is_none())
            .collect()
    }

    #[inline]
    pub fn has_renderable(&self, id: &ObjectId) -> bool {
        self.renderables.contains_key(id)
    }

    #[inline]
    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ---- selection -------------------------------------------------------

    #[inline]
    pub fn selected_id(&self) -> Option<&ObjectId> {
        self.selected_id.as_ref()
    }

    /// Select an object (or clear the selection). Returns false and leaves
    /// the selection untouched for an unknown id.
    pub fn set_selected(&mut self, id: Option<ObjectId>) -> bool {
        match id {
            Some(id) if self.get(&id).is_none() => false,
            other => {
                self.selected_id = other;
                true
            }
        }
    }

    // ---- mutations -------------------------------------------------------

    fn mint_id(&mut self) -> ObjectId {
        loop {
            self.next_object_id += 1;
            let candidate = ObjectId::new(format!("obj-{}", self.next_object_id));
            if self.get(&candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Insert a record, assigning an id from the scene-scoped counter when
    /// the record has none (or a colliding one), and create its renderable.
    ///
    /// On backend failure the record STAYS in the registry without a
    /// renderable; creation is retried by the next sync touching it.
    pub fn add(
        &mut self,
        mut record: SceneObjectData,
        parent: Option<&ObjectId>,
    ) -> Result<ObjectId, SceneError> {
        if record.id.is_empty() || self.get(&record.id).is_some() {
            record.id = self.mint_id();
        }
        let id = record.id.clone();

        let parent_id = parent.cloned().or_else(|| record.parent_id.clone());
        let parent_id = match parent_id {
            Some(pid) if self.get(&pid).is_some() => Some(pid),
            Some(pid) => {
                log::warn!("add: unknown parent {pid}, inserting {id} at the root");
                None
            }
            None => None,
        };

        record.parent_id = parent_id.clone();
        record.children_ids.clear();
        self.objects.push(record);
        if let Some(pid) = &parent_id {
            self.add_child_link(pid, &id);
        }

        self.create_renderable(&id)?;
        Ok(id)
    }

    /// Merge a patch into an object. Returns `Ok(None)` for an unknown id.
    /// Critical-vs-non-critical classification is part of the returned
    /// effect; recording history from it is the store's job.
    pub fn update(
        &mut self,
        id: &ObjectId,
        patch: &ObjectPatch,
    ) -> Result<Option<PatchEffect>, SceneError> {
        let Some(idx) = self.index_of(id) else {
            return Ok(None);
        };
        let effect = patch.classify(&self.objects[idx]);
        let old_parent = self.objects[idx].parent_id.clone();

        self.objects[idx].apply_patch(patch);

        // Re-parent bookkeeping: the patch has rewritten parent_id; fix
        // both children lists and fall back to the root for unknown
        // parents.
        if let Some(new_parent) = &patch.parent_id {
            if *new_parent != old_parent {
                if let Some(old) = &old_parent {
                    self.remove_child_link(old, id);
                }
                match new_parent {
                    Some(pid)
                        if self.get(pid).is_some()
                            && pid != id
                            && !self.descendants_of(id).contains(pid) =>
                    {
                        self.add_child_link(pid, id);
                    }
                    Some(pid) => {
                        // Unknown parent, or a cycle through a descendant.
                        log::warn!("update: cannot parent {id} under {pid}, re-rooting");
                        self.objects[idx].parent_id = None;
                    }
                    None => {}
                }
            }
        }

        self.sync_object(id, &effect)?;
        Ok(Some(effect))
    }

    /// Remove an object. Descendants cascade by default; with
    /// `remove_children: false` direct children are orphaned (parent
    /// cleared, renderables re-attached at the scene root). Removing an
    /// unknown id is a no-op returning false.
    pub fn remove(&mut self, id: &ObjectId, options: RemoveOptions) -> bool {
        if self.get(id).is_none() {
            return false;
        }

        let mut targets = vec![id.clone()];
        if options.remove_children {
            targets.extend(self.descendants_of(id));
        } else {
            let children: Vec<ObjectId> = self
                .get(id)
                .map(|o| o.children_ids.clone())
                .unwrap_or_default();
            for child in children {
                if let Some(idx) = self.index_of(&child) {
                    self.objects[idx].parent_id = None;
                }
                if let Some(handle) = self.renderables.get(&child) {
                    self.backend.attach(handle, None);
                }
            }
        }

        if let Some(parent_id) = self.get(id).and_then(|o| o.parent_id.clone()) {
            self.remove_child_link(&parent_id, id);
        }

        self.objects.retain(|o| !targets.contains(&o.id));
        for target in &targets {
            if let Some(handle) = self.renderables.remove(target) {
                self.backend.dispose(handle);
            }
        }
        if self
            .selected_id
            .as_ref()
            .is_some_and(|sel| targets.contains(sel))
        {
            self.selected_id = None;
        }
        true
    }

    fn add_child_link(&mut self, parent: &ObjectId, child: &ObjectId) {
        if let Some(idx) = self.index_of(parent) {
            let children = &mut self.objects[idx].children_ids;
            if !children.contains(child) {
                children.push(child.clone());
            }
        }
    }

    fn remove_child_link(&mut self, parent: &ObjectId, child: &ObjectId) {
        if let Some(idx) = self.index_of(parent) {
            self.objects[idx].children_ids.retain(|c| c != child);
        }
    }

    // ---- render sync -----------------------------------------------------

    fn create_renderable(&mut self, id: &ObjectId) -> Result<(), SceneError> {
        let Some(idx) = self.index_of(id) else {
            return Err(SceneError::ObjectNotFound { id: id.to_string() });
        };
        let handle = self.backend.create(&self.objects[idx])?;
        let parent_handle = self.objects[idx]
            .parent_id
            .as_ref()
            .and_then(|pid| self.renderables.get(pid));
        self.backend.attach(&handle, parent_handle);
        self.renderables.insert(id.clone(), handle);
        Ok(())
    }

    /// Apply a classified patch to the renderable: rebuild (dispose first)
    /// or idempotent in-place updates. An object whose renderable creation
    /// previously failed is created here (the retry path).
    fn sync_object(&mut self, id: &ObjectId, effect: &PatchEffect) -> Result<(), SceneError> {
        if !self.renderables.contains_key(id) || effect.rebuild {
            if let Some(handle) = self.renderables.remove(id) {
                self.backend.dispose(handle);
            }
            return self.create_renderable(id);
        }

        let Some(idx) = self.index_of(id) else {
            return Err(SceneError::ObjectNotFound { id: id.to_string() });
        };
        let record = &self.objects[idx];
        let Some(handle) = self.renderables.get(id) else {
            return Ok(());
        };

        if effect.transform_changed {
            self.backend.update_transform(handle, &record.transform);
        }
        if effect.flags_changed {
            self.backend.update_flags(handle, &record.render_flags());
        }
        if effect.geometry_changed {
            if let Some(mesh) = &record.mesh {
                self.backend.rebuild_geometry(handle, &mesh.geometry);
            }
        }
        if effect.material_changed {
            if let Some(mesh) = &record.mesh {
                self.backend.rebuild_material(handle, &mesh.material);
            }
        }
        if effect.camera_changed
            || effect.environment_changed
            || effect.helper_changed
            || effect.light_changed
        {
            self.backend.update_params(handle, record);
        }
        if effect.reattach {
            let parent_handle = record
                .parent_id
                .as_ref()
                .and_then(|pid| self.renderables.get(pid));
            self.backend.attach(handle, parent_handle);
        }
        Ok(())
    }

    /// Push every object's current transform and flags into its renderable.
    /// This is the cheap idempotent pass run after animation ticks; objects
    /// without a renderable are skipped.
    pub fn sync_transforms(&mut self) {
        for record in &self.objects {
            if let Some(handle) = self.renderables.get(&record.id) {
                self.backend.update_transform(handle, &record.transform);
                self.backend.update_flags(handle, &record.render_flags());
            }
        }
    }

    // ---- snapshots -------------------------------------------------------

    /// Deep, serialization-safe copy of the object list, selection, and id
    /// counter.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::new(
            self.objects.clone(),
            self.selected_id.clone(),
            self.next_object_id,
        )
        .sanitized()
    }

    /// Replace the whole scene from a snapshot and rebuild every
    /// renderable (dispose all, recreate parents-first, re-attach).
    ///
    /// Backend failures do not abort the pass: every object is attempted,
    /// the first error is returned, and failed objects retry on their next
    /// sync.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) -> Result<(), SceneError> {
        for (_, handle) in self.renderables.drain() {
            self.backend.dispose(handle);
        }
        self.objects = snapshot.objects;
        self.selected_id = snapshot.selected_id;
        self.next_object_id = snapshot.next_object_id;

        // Parents before children so attach targets exist.
        let mut order: Vec<ObjectId> = Vec::with_capacity(self.objects.len());
        let mut queue: Vec<ObjectId> = self
            .objects
            .iter()
            .filter(|o| {
                o.parent_id.is_none()
                    || o.parent_id
                        .as_ref()
                        .is_some_and(|pid| self.get(pid).is_none())
            })
            .map(|o| o.id.clone())
            .collect();
        while let Some(id) = queue.pop() {
            if let Some(record) = self.get(&id) {
                queue.extend(record.children_ids.iter().cloned());
            }
            order.push(id);
        }

        let mut first_err = None;
        for id in order {
            if let Err(err) = self.create_renderable(&id) {
                log::warn!("renderable rebuild failed for {id}: {err}");
                if first_err.is_none() {
                    first_err = Some(err);
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// The animation write path. Writes go straight into the data records; the
// post-tick sync pass pushes them to renderables. Never records history.
impl<B: RenderBackend> PropertyStore for SceneObjectRegistry<B> {
    fn get_property(&self, target: &ObjectId, property: AnimatableProperty) -> Option<Value> {
        let record = self.get(target)?;
        let t = &record.transform;
        Some(match property {
            AnimatableProperty::Position => Value::Vec3(t.position),
            AnimatableProperty::PositionX => Value::Scalar(t.position[0]),
            AnimatableProperty::PositionY => Value::Scalar(t.position[1]),
            AnimatableProperty::PositionZ => Value::Scalar(t.position[2]),
            AnimatableProperty::Rotation => Value::Vec3(t.rotation),
            AnimatableProperty::RotationX => Value::Scalar(t.rotation[0]),
            AnimatableProperty::RotationY => Value::Scalar(t.rotation[1]),
            AnimatableProperty::RotationZ => Value::Scalar(t.rotation[2]),
            AnimatableProperty::Scale => Value::Vec3(t.scale),
            AnimatableProperty::ScaleX => Value::Scalar(t.scale[0]),
            AnimatableProperty::ScaleY => Value::Scalar(t.scale[1]),
            AnimatableProperty::ScaleZ => Value::Scalar(t.scale[2]),
            AnimatableProperty::Visible => Value::Bool(record.visible),
            AnimatableProperty::CastShadow => Value::Bool(record.cast_shadow),
            AnimatableProperty::ReceiveShadow => Value::Bool(record.receive_shadow),
            AnimatableProperty::RenderOrder => Value::Scalar(record.render_order as f64),
            AnimatableProperty::Name => Value::Text(record.name.clone()),
        })
    }

    fn set_property(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
        value: &Value,
    ) -> bool {
        if value.kind() != property.value_kind() {
            return false;
        }
        let Some(idx) = self.index_of(target) else {
            return false;
        };
        let record = &mut self.objects[idx];
        let t = &mut record.transform;
        match (property, value) {
            (AnimatableProperty::Position, Value::Vec3(v)) => t.position = *v,
            (AnimatableProperty::PositionX, Value::Scalar(v)) => t.position[0] = *v,
            (AnimatableProperty::PositionY, Value::Scalar(v)) => t.position[1] = *v,
            (AnimatableProperty::PositionZ, Value::Scalar(v)) => t.position[2] = *v,
            (AnimatableProperty::Rotation, Value::Vec3(v)) => t.rotation = *v,
            (AnimatableProperty::RotationX, Value::Scalar(v)) => t.rotation[0] = *v,
            (AnimatableProperty::RotationY, Value::Scalar(v)) => t.rotation[1] = *v,
            (AnimatableProperty::RotationZ, Value::Scalar(v)) => t.rotation[2] = *v,
            (AnimatableProperty::Scale, Value::Vec3(v)) => t.scale = *v,
            (AnimatableProperty::ScaleX, Value::Scalar(v)) => t.scale[0] = *v,
            (AnimatableProperty::ScaleY, Value::Scalar(v)) => t.scale[1] = *v,
            (AnimatableProperty::ScaleZ, Value::Scalar(v)) => t.scale[2] = *v,
            (AnimatableProperty::Visible, Value::Bool(v)) => record.visible = *v,
            (AnimatableProperty::CastShadow, Value::Bool(v)) => record.cast_shadow = *v,
            (AnimatableProperty::ReceiveShadow, Value::Bool(v)) => record.receive_shadow = *v,
            (AnimatableProperty::RenderOrder, Value::Scalar(v)) => {
                record.render_order = v.max(0.0).round() as u32;
            }
            (AnimatableProperty::Name, Value::Text(v)) => record.name = v.clone(),
            _ => return false,
        }
        true
    }
}
