//! Undo/redo behavior through the scene store: round trips, linearity,
//! coalescing, groups, failure recovery, and the persistence path.

mod common;

use common::RecordingBackend;
use easel_scene_core::{
    GeometryDesc, GeometryKind, MaterialDesc, MaterialKind, MemoryPersistence, NullBackend,
    ObjectKind, ObjectPatch, RemoveOptions, SceneError, SceneObjectData, SceneStore,
    TransformPatch,
};

fn store() -> SceneStore<NullBackend> {
    SceneStore::new(NullBackend)
}

fn mesh(name: &str) -> SceneObjectData {
    SceneObjectData::new(ObjectKind::Mesh, name)
}

fn material_patch(kind: MaterialKind) -> ObjectPatch {
    ObjectPatch {
        material: Some(MaterialDesc::new(kind)),
        ..ObjectPatch::default()
    }
}

fn geometry_params_patch(size: f64) -> ObjectPatch {
    let mut geometry = GeometryDesc::new(GeometryKind::Box);
    geometry
        .params
        .insert("size".to_string(), serde_json::json!(size));
    ObjectPatch {
        geometry: Some(geometry),
        ..ObjectPatch::default()
    }
}

#[test]
fn undo_redo_round_trip_over_critical_mutations() {
    let mut store = store();

    // Four critical mutations, capturing the scene after each.
    let mut stages = vec![store.snapshot()];
    let a = store.add_object(mesh("a"), None).unwrap();
    stages.push(store.snapshot());
    let b = store.add_object(mesh("b"), None).unwrap();
    stages.push(store.snapshot());
    store.update_object(&a, &material_patch(MaterialKind::Toon)).unwrap();
    stages.push(store.snapshot());
    store.remove_object(&b, RemoveOptions::default());
    stages.push(store.snapshot());

    // Walk all the way back...
    for stage in stages.iter().rev().skip(1) {
        assert!(store.undo().unwrap());
        assert!(store.snapshot().same_structure_as(stage));
    }
    assert!(!store.undo().unwrap());
    assert!(store.registry().is_empty());

    // ...and forward again.
    for stage in stages.iter().skip(1) {
        assert!(store.redo().unwrap());
        assert!(store.snapshot().same_structure_as(stage));
    }
    assert!(!store.can_redo());
    assert!(!store.redo().unwrap());
}

#[test]
fn new_mutation_discards_the_redo_branch() {
    let mut store = store();
    let _a = store.add_object(mesh("a"), None).unwrap();
    store.add_object(mesh("b"), None).unwrap();

    assert!(store.undo().unwrap());
    assert!(store.can_redo());

    store.add_object(mesh("c"), None).unwrap();
    assert!(!store.can_redo());
    assert!(!store.redo().unwrap());

    let names: Vec<&str> = store
        .registry()
        .objects()
        .iter()
        .map(|o| o.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn burst_of_updates_coalesces_into_one_undo_step() {
    let mut store = store();
    let id = store.add_object(mesh("a"), None).unwrap();
    let depth_after_add = store.history().undo_depth();

    // Two critical edits to the same object in quick succession land inside
    // the merge window and collapse into one entry.
    store.update_object(&id, &geometry_params_patch(1.0)).unwrap();
    store.update_object(&id, &geometry_params_patch(2.0)).unwrap();
    assert_eq!(store.history().undo_depth(), depth_after_add + 1);

    // One undo restores the state before the FIRST edit of the burst.
    assert!(store.undo().unwrap());
    let geometry = &store.get_object(&id).unwrap().mesh.as_ref().unwrap().geometry;
    assert!(geometry.params.is_empty());
}

#[test]
fn non_critical_edits_are_never_recorded() {
    let mut store = store();
    let id = store.add_object(mesh("a"), None).unwrap();
    let depth = store.history().undo_depth();

    // A drag gesture: many transform patches per second.
    for i in 0..20 {
        let patch = ObjectPatch::transform(TransformPatch::position([i as f64, 0.0, 0.0]));
        store.update_object(&id, &patch).unwrap();
    }
    store.update_object(&id, &ObjectPatch::visibility(false)).unwrap();

    assert_eq!(store.history().undo_depth(), depth);
    let record = store.get_object(&id).unwrap();
    assert_eq!(record.transform.position, [19.0, 0.0, 0.0]);
    assert!(!record.visible);
}

#[test]
fn group_collapses_mutations_into_one_step() {
    let mut store = store();
    let keep = store.add_object(mesh("keep"), None).unwrap();

    store.begin_group();
    for name in ["a", "b", "c"] {
        store.add_object(mesh(name), None).unwrap();
    }
    store.end_group();
    assert_eq!(store.registry().len(), 4);

    // The whole group undoes (and redoes) atomically.
    assert!(store.undo().unwrap());
    assert_eq!(store.registry().len(), 1);
    assert!(store.get_object(&keep).is_some());

    assert!(store.redo().unwrap());
    assert_eq!(store.registry().len(), 4);
}

#[test]
fn failed_undo_keeps_the_entry_and_recovers() {
    let backend = RecordingBackend::new();
    let (_ops, fail_creates) = backend.probes();
    let mut store = SceneStore::new(backend);

    let id = store.add_object(mesh("a"), None).unwrap();
    store.update_object(&id, &material_patch(MaterialKind::Toon)).unwrap();
    let depth = store.history().undo_depth();

    *fail_creates.borrow_mut() = true;
    let err = store.undo().unwrap_err();
    assert!(matches!(err, SceneError::HistoryApply { .. }));
    // The entry went back onto the undo stack; nothing was lost.
    assert_eq!(store.history().undo_depth(), depth);
    assert!(!store.can_redo());

    // Once the backend recovers the same undo applies cleanly.
    *fail_creates.borrow_mut() = false;
    assert!(store.undo().unwrap());
    assert_eq!(
        store.get_object(&id).unwrap().mesh.as_ref().unwrap().material.kind,
        MaterialKind::Standard
    );
    assert!(store.registry().has_renderable(&id));
}

#[test]
fn undo_restores_removed_subtrees() {
    let mut store = store();
    let parent = store.add_object(mesh("parent"), None).unwrap();
    let child = store.add_object(mesh("child"), Some(&parent)).unwrap();
    let grandchild = store.add_object(mesh("grandchild"), Some(&child)).unwrap();

    assert!(store.remove_object(&parent, RemoveOptions::default()));
    assert!(store.registry().is_empty());

    assert!(store.undo().unwrap());
    assert_eq!(store.registry().len(), 3);
    assert_eq!(
        store.get_object(&grandchild).unwrap().parent_id.as_ref(),
        Some(&child)
    );
    assert!(store.registry().has_renderable(&grandchild));
}

#[test]
fn save_and_load_round_trip_through_persistence() {
    let mut persistence = MemoryPersistence::new();

    let mut source = store();
    let root = source.add_object(mesh("root"), None).unwrap();
    source.add_object(mesh("child"), Some(&root)).unwrap();
    source.select(Some(root.clone()));
    let saved = source.snapshot();

    let envelope = serde_json::json!({ "version": "1.0", "clips": [] });
    source
        .save_scene(&mut persistence, "scene-1", Some(envelope.clone()))
        .unwrap();
    assert!(persistence.contains("scene-1"));

    let mut loaded = store();
    let animation = loaded.load_scene(&mut persistence, "scene-1").unwrap();
    assert_eq!(animation, Some(envelope));
    assert!(loaded.snapshot().same_structure_as(&saved));
    assert_eq!(loaded.registry().renderable_count(), 2);
    // A freshly loaded scene starts with empty history.
    assert!(!loaded.can_undo());
    assert!(!loaded.can_redo());

    // Loading an unknown id surfaces the persistence error.
    assert!(loaded.load_scene(&mut persistence, "missing").is_err());
}
