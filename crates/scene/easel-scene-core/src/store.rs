//! The scene store: registry + history + notifications, composed once at
//! startup and passed to whoever needs it (no ambient singletons).
//!
//! Control flow for a mutation: classify → record history (critical only)
//! → apply to the registry → sync the renderable graph. Undo/redo restore
//! whole snapshots and resync everything. The animation engine writes
//! through the [`PropertyStore`] impl, which skips history entirely.

use crate::backend::RenderBackend;
use crate::error::SceneError;
use crate::history::{EditAction, EditLabel, HistoryConfig, SceneHistory};
use crate::object::{CriticalChange, MutationClass, ObjectPatch, SceneObjectData};
use crate::persistence::{PersistenceBackend, SceneDocument};
use crate::registry::{RemoveOptions, SceneObjectRegistry};
use crate::snapshot::SceneSnapshot;
use easel_api_core::{AnimatableProperty, ObjectId, PropertyStore, Value};
use serde_json::Value as JsonValue;

/// Outcome severity for the UI notification sink.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Fire-and-forget outcome reporting (toasts). Never load-bearing.
pub trait Notifier {
    fn notify(&self, severity: Severity, message: &str);
}

/// Default notifier: routes through the `log` facade.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => log::info!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Error => log::error!("{message}"),
        }
    }
}

/// Registry + history behind one mutation API.
pub struct SceneStore<B: RenderBackend> {
    registry: SceneObjectRegistry<B>,
    history: SceneHistory,
    notifier: Box<dyn Notifier>,
}

impl<B: RenderBackend> SceneStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, HistoryConfig::default())
    }

    pub fn with_config(backend: B, config: HistoryConfig) -> Self {
        Self {
            registry: SceneObjectRegistry::new(backend),
            history: SceneHistory::new(config),
            notifier: Box::new(LogNotifier),
        }
    }

    pub fn set_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifier = notifier;
    }

    /// Read access to the registry (queries, renderable checks).
    #[inline]
    pub fn registry(&self) -> &SceneObjectRegistry<B> {
        &self.registry
    }

    #[inline]
    pub fn get_object(&self, id: &ObjectId) -> Option<&SceneObjectData> {
        self.registry.get(id)
    }

    #[inline]
    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    // ---- mutations -------------------------------------------------------

    /// Add an object (critical; one history entry per add).
    pub fn add_object(
        &mut self,
        record: SceneObjectData,
        parent: Option<&ObjectId>,
    ) -> Result<ObjectId, SceneError> {
        self.history.record(
            self.registry.snapshot(),
            EditLabel::new(EditAction::Add, None),
        );
        match self.registry.add(record, parent) {
            Ok(id) => Ok(id),
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, &format!("object creation failed: {err}"));
                Err(err)
            }
        }
    }

    /// Patch an object. Critical patches snapshot first; non-critical ones
    /// (transform drags, visibility toggles) skip history by design.
    /// Returns `Ok(false)` for an unknown id. A backend failure surfaces
    /// as an error but does not roll back the data change.
    pub fn update_object(&mut self, id: &ObjectId, patch: &ObjectPatch) -> Result<bool, SceneError> {
        let Some(record) = self.registry.get(id) else {
            return Ok(false);
        };
        let effect = patch.classify(record);
        if effect.class.is_critical() {
            let action = match effect.class {
                MutationClass::Critical(CriticalChange::Parent) => EditAction::Reparent,
                _ => EditAction::Update,
            };
            self.history.record(
                self.registry.snapshot(),
                EditLabel::new(action, Some(id.clone())),
            );
        }
        match self.registry.update(id, patch) {
            Ok(Some(_)) => Ok(true),
            Ok(None) => Ok(false),
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, &format!("render sync failed: {err}"));
                Err(err)
            }
        }
    }

    /// Remove an object (critical). See [`RemoveOptions`] for cascade
    /// behavior. Removing an unknown id is a no-op returning false.
    pub fn remove_object(&mut self, id: &ObjectId, options: RemoveOptions) -> bool {
        if self.registry.get(id).is_none() {
            return false;
        }
        self.history.record(
            self.registry.snapshot(),
            EditLabel::new(EditAction::Remove, Some(id.clone())),
        );
        self.registry.remove(id, options)
    }

    #[inline]
    pub fn select(&mut self, id: Option<ObjectId>) -> bool {
        self.registry.set_selected(id)
    }

    #[inline]
    pub fn selected_id(&self) -> Option<&ObjectId> {
        self.registry.selected_id()
    }

    /// Push animated data values into the renderable graph (the post-tick
    /// sync pass).
    #[inline]
    pub fn sync_animated(&mut self) {
        self.registry.sync_transforms();
    }

    // ---- history ---------------------------------------------------------

    #[inline]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Wrap a run of mutations into one undoable step.
    #[inline]
    pub fn begin_group(&mut self) {
        self.history.begin_group();
    }

    #[inline]
    pub fn end_group(&mut self) {
        self.history.end_group();
    }

    /// Undo the most recent recorded change. `Ok(false)` when there is
    /// nothing to undo. On apply failure the entry goes back onto the undo
    /// stack and the error is reported.
    pub fn undo(&mut self) -> Result<bool, SceneError> {
        let Some(entry) = self.history.pop_undo() else {
            return Ok(false);
        };
        let current = self.registry.snapshot();
        let label = entry.label.clone();

        let scope = self.history.restore_scope();
        let result = self.registry.load_snapshot(entry.snapshot.clone());
        drop(scope);

        match result {
            Ok(()) => {
                self.history.finish_undo(current, label);
                self.notifier.notify(Severity::Info, "undo applied");
                Ok(true)
            }
            Err(err) => {
                self.history.push_undo(entry);
                self.notifier
                    .notify(Severity::Error, &format!("undo failed: {err}"));
                Err(SceneError::HistoryApply {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Re-apply the most recently undone change; symmetric to [`undo`].
    ///
    /// [`undo`]: SceneStore::undo
    pub fn redo(&mut self) -> Result<bool, SceneError> {
        let Some(entry) = self.history.pop_redo() else {
            return Ok(false);
        };
        let current = self.registry.snapshot();
        let label = entry.label.clone();

        let scope = self.history.restore_scope();
        let result = self.registry.load_snapshot(entry.snapshot.clone());
        drop(scope);

        match result {
            Ok(()) => {
                self.history.finish_redo(current, label);
                self.notifier.notify(Severity::Info, "redo applied");
                Ok(true)
            }
            Err(err) => {
                self.history.push_redo(entry);
                self.notifier
                    .notify(Severity::Error, &format!("redo failed: {err}"));
                Err(SceneError::HistoryApply {
                    reason: err.to_string(),
                })
            }
        }
    }

    // ---- persistence -----------------------------------------------------

    #[inline]
    pub fn snapshot(&self) -> SceneSnapshot {
        self.registry.snapshot()
    }

    /// Build the persistence document, attaching the animation layer's
    /// envelope.
    pub fn to_document(&self, animation: Option<JsonValue>) -> SceneDocument {
        SceneDocument::from_snapshot(self.snapshot(), animation)
    }

    /// Replace the scene from a document. History is cleared (a loaded
    /// scene starts fresh); the animation envelope is handed back for the
    /// animation layer.
    pub fn load_document(
        &mut self,
        document: SceneDocument,
    ) -> Result<Option<JsonValue>, SceneError> {
        let (snapshot, animation) = document.into_snapshot();
        let scope = self.history.restore_scope();
        let result = self.registry.load_snapshot(snapshot.sanitized());
        drop(scope);
        result?;
        self.history.clear();
        Ok(animation)
    }

    /// Save through a persistence backend, reporting the outcome.
    pub fn save_scene(
        &self,
        backend: &mut dyn PersistenceBackend,
        scene_id: &str,
        animation: Option<JsonValue>,
    ) -> Result<(), SceneError> {
        match backend.save_scene(scene_id, &self.to_document(animation)) {
            Ok(()) => {
                self.notifier
                    .notify(Severity::Info, &format!("scene {scene_id} saved"));
                Ok(())
            }
            Err(err) => {
                self.notifier
                    .notify(Severity::Error, &format!("saving {scene_id} failed: {err}"));
                Err(err)
            }
        }
    }

    /// Load through a persistence backend; returns the animation envelope.
    pub fn load_scene(
        &mut self,
        backend: &mut dyn PersistenceBackend,
        scene_id: &str,
    ) -> Result<Option<JsonValue>, SceneError> {
        let document = backend.load_scene(scene_id)?;
        self.load_document(document)
    }
}

// Animation write path: straight to the registry, never through history.
impl<B: RenderBackend> PropertyStore for SceneStore<B> {
    fn get_property(&self, target: &ObjectId, property: AnimatableProperty) -> Option<Value> {
        self.registry.get_property(target, property)
    }

    fn set_property(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
        value: &Value,
    ) -> bool {
        self.registry.set_property(target, property, value)
    }
}
