//! Render sync policy against a call-recording backend: rebuild vs patch
//! in place, dispose-before-recreate, attach discipline, and the
//! creation-failure retry path.

mod common;

use common::{Op, RecordingBackend};
use easel_api_core::ObjectId;
use easel_scene_core::{
    GeometryDesc, GeometryKind, MaterialDesc, MaterialKind, ObjectKind, ObjectPatch,
    RemoveOptions, SceneObjectData, SceneObjectRegistry, TransformPatch,
};
use std::cell::RefCell;
use std::rc::Rc;

fn recording_registry() -> (
    SceneObjectRegistry<RecordingBackend>,
    Rc<RefCell<Vec<Op>>>,
    Rc<RefCell<bool>>,
) {
    let backend = RecordingBackend::new();
    let (ops, fail_creates) = backend.probes();
    (SceneObjectRegistry::new(backend), ops, fail_creates)
}

#[test]
fn creation_attaches_under_the_parent_handle() {
    let (mut reg, ops, _) = recording_registry();
    let root = reg
        .add(SceneObjectData::new(ObjectKind::Group, "root"), None)
        .unwrap();
    reg.add(SceneObjectData::new(ObjectKind::Mesh, "child"), Some(&root))
        .unwrap();

    assert_eq!(
        *ops.borrow(),
        vec![
            Op::Create("obj-1".to_string()),
            Op::Attach {
                handle: 1,
                parent: None
            },
            Op::Create("obj-2".to_string()),
            Op::Attach {
                handle: 2,
                parent: Some(1)
            },
        ]
    );
}

#[test]
fn structural_material_change_disposes_before_recreating() {
    let (mut reg, ops, _) = recording_registry();
    let id = reg
        .add(SceneObjectData::new(ObjectKind::Mesh, "cube"), None)
        .unwrap();
    ops.borrow_mut().clear();

    let patch = ObjectPatch {
        material: Some(MaterialDesc::new(MaterialKind::Toon)),
        ..ObjectPatch::default()
    };
    reg.update(&id, &patch).unwrap();

    // The old renderable's resources are released before the new one
    // exists, and the replacement is re-attached.
    assert_eq!(
        *ops.borrow(),
        vec![
            Op::Dispose(1),
            Op::Create(id.to_string()),
            Op::Attach {
                handle: 2,
                parent: None
            },
        ]
    );
    assert!(reg.has_renderable(&id));
}

#[test]
fn parameter_changes_patch_in_place() {
    let (mut reg, ops, _) = recording_registry();
    let id = reg
        .add(SceneObjectData::new(ObjectKind::Mesh, "cube"), None)
        .unwrap();
    ops.borrow_mut().clear();

    // Same geometry family: no dispose, no recreate, no re-attach.
    let mut geometry = GeometryDesc::new(GeometryKind::Box);
    geometry
        .params
        .insert("size".to_string(), serde_json::json!(2.0));
    let patch = ObjectPatch {
        geometry: Some(geometry),
        ..ObjectPatch::default()
    };
    reg.update(&id, &patch).unwrap();
    assert_eq!(*ops.borrow(), vec![Op::RebuildGeometry(1)]);
}

#[test]
fn patching_the_same_state_twice_is_idempotent() {
    let (mut reg, ops, _) = recording_registry();
    let id = reg
        .add(SceneObjectData::new(ObjectKind::Mesh, "cube"), None)
        .unwrap();
    ops.borrow_mut().clear();

    let patch = ObjectPatch {
        transform: Some(TransformPatch::position([1.0, 2.0, 3.0])),
        visible: Some(false),
        ..ObjectPatch::default()
    };
    reg.update(&id, &patch).unwrap();
    let state_once = reg.get(&id).unwrap().clone();
    let ops_once = ops.borrow().clone();

    reg.update(&id, &patch).unwrap();
    assert_eq!(*reg.get(&id).unwrap(), state_once);
    // The second pass issues the same in-place updates and nothing else.
    let ops_twice = ops.borrow().clone();
    assert_eq!(ops_twice[ops_once.len()..], ops_once[..]);
    assert!(ops_twice
        .iter()
        .all(|op| matches!(op, Op::UpdateTransform(_) | Op::UpdateFlags(_))));
}

#[test]
fn reattachment_happens_only_when_the_parent_changes() {
    let (mut reg, ops, _) = recording_registry();
    let a = reg
        .add(SceneObjectData::new(ObjectKind::Group, "a"), None)
        .unwrap();
    let b = reg
        .add(SceneObjectData::new(ObjectKind::Mesh, "b"), None)
        .unwrap();
    ops.borrow_mut().clear();

    // A transform tweak never re-attaches.
    reg.update(&b, &ObjectPatch::transform(TransformPatch::position([1.0, 0.0, 0.0])))
        .unwrap();
    assert!(!ops
        .borrow()
        .iter()
        .any(|op| matches!(op, Op::Attach { .. })));

    // Re-parenting attaches under the new parent's handle.
    reg.update(&b, &ObjectPatch::reparent(Some(a.clone()))).unwrap();
    assert!(ops.borrow().contains(&Op::Attach {
        handle: 2,
        parent: Some(1)
    }));
}

#[test]
fn creation_failure_leaves_the_record_and_retries_on_next_sync() {
    let (mut reg, ops, fail_creates) = recording_registry();

    *fail_creates.borrow_mut() = true;
    let result = reg.add(
        SceneObjectData::new(ObjectKind::Mesh, "cube").with_id("m1"),
        None,
    );
    assert!(result.is_err());

    // The data record survives without a renderable.
    let id = ObjectId::new("m1");
    assert!(reg.get(&id).is_some());
    assert!(!reg.has_renderable(&id));

    // The next sync touching the object retries creation.
    *fail_creates.borrow_mut() = false;
    reg.update(&id, &ObjectPatch::visibility(false)).unwrap();
    assert!(reg.has_renderable(&id));
    assert!(ops.borrow().contains(&Op::Create("m1".to_string())));
}

#[test]
fn cascade_removal_disposes_every_descendant() {
    let (mut reg, ops, _) = recording_registry();
    let parent = reg
        .add(SceneObjectData::new(ObjectKind::Group, "parent"), None)
        .unwrap();
    reg.add(SceneObjectData::new(ObjectKind::Mesh, "child"), Some(&parent))
        .unwrap();
    ops.borrow_mut().clear();

    reg.remove(&parent, RemoveOptions::default());
    let mut disposed: Vec<u32> = ops
        .borrow()
        .iter()
        .filter_map(|op| match op {
            Op::Dispose(handle) => Some(*handle),
            _ => None,
        })
        .collect();
    disposed.sort_unstable();
    assert_eq!(disposed, vec![1, 2]);
    assert_eq!(reg.renderable_count(), 0);
}
