//! Shared test backends.

use easel_scene_core::{
    GeometryDesc, MaterialDesc, RenderBackend, RenderFlags, SceneError, SceneObjectData, Transform,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Every backend call, in order.
#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Create(String),
    UpdateTransform(u32),
    UpdateFlags(u32),
    RebuildGeometry(u32),
    RebuildMaterial(u32),
    UpdateParams(u32),
    Attach { handle: u32, parent: Option<u32> },
    Dispose(u32),
}

/// Backend that records calls and can be told to fail creation.
#[derive(Default)]
pub struct RecordingBackend {
    pub ops: Rc<RefCell<Vec<Op>>>,
    pub fail_creates: Rc<RefCell<bool>>,
    next_handle: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles to the shared op log and the failure toggle.
    pub fn probes(&self) -> (Rc<RefCell<Vec<Op>>>, Rc<RefCell<bool>>) {
        (Rc::clone(&self.ops), Rc::clone(&self.fail_creates))
    }
}

impl RenderBackend for RecordingBackend {
    type Handle = u32;

    fn create(&mut self, record: &SceneObjectData) -> Result<u32, SceneError> {
        if *self.fail_creates.borrow() {
            return Err(SceneError::BackendCreation {
                id: record.id.to_string(),
                reason: "forced failure".to_string(),
            });
        }
        self.next_handle += 1;
        self.ops
            .borrow_mut()
            .push(Op::Create(record.id.to_string()));
        Ok(self.next_handle)
    }

    fn update_transform(&mut self, handle: &u32, _transform: &Transform) {
        self.ops.borrow_mut().push(Op::UpdateTransform(*handle));
    }

    fn update_flags(&mut self, handle: &u32, _flags: &RenderFlags) {
        self.ops.borrow_mut().push(Op::UpdateFlags(*handle));
    }

    fn rebuild_geometry(&mut self, handle: &u32, _geometry: &GeometryDesc) {
        self.ops.borrow_mut().push(Op::RebuildGeometry(*handle));
    }

    fn rebuild_material(&mut self, handle: &u32, _material: &MaterialDesc) {
        self.ops.borrow_mut().push(Op::RebuildMaterial(*handle));
    }

    fn update_params(&mut self, handle: &u32, _record: &SceneObjectData) {
        self.ops.borrow_mut().push(Op::UpdateParams(*handle));
    }

    fn attach(&mut self, handle: &u32, parent: Option<&u32>) {
        self.ops.borrow_mut().push(Op::Attach {
            handle: *handle,
            parent: parent.copied(),
        });
    }

    fn dispose(&mut self, handle: u32) {
        self.ops.borrow_mut().push(Op::Dispose(handle));
    }
}
