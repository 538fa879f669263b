//! The render backend seam.
//!
//! The registry drives a renderer exclusively through this trait; no
//! renderer type ever crosses into core logic. One logical scene graph can
//! therefore drive any backend that can realize these seven capabilities.

use crate::error::SceneError;
use crate::object::{GeometryDesc, MaterialDesc, RenderFlags, SceneObjectData, Transform};

/// Capabilities the registry needs from a renderer.
pub trait RenderBackend {
    /// Opaque handle to one renderable object.
    type Handle;

    /// Realize a data record as a renderable. Failure leaves the data
    /// record valid in the registry; creation is retried on the next sync.
    fn create(&mut self, record: &SceneObjectData) -> Result<Self::Handle, SceneError>;

    /// Patch the renderable's transform in place. Must be idempotent.
    fn update_transform(&mut self, handle: &Self::Handle, transform: &Transform);

    /// Patch visibility/shadow/draw-order flags in place. Must be
    /// idempotent.
    fn update_flags(&mut self, handle: &Self::Handle, flags: &RenderFlags);

    /// Swap the renderable's geometry within the same structural family.
    fn rebuild_geometry(&mut self, handle: &Self::Handle, geometry: &GeometryDesc);

    /// Swap the renderable's material within the same structural family.
    fn rebuild_material(&mut self, handle: &Self::Handle, material: &MaterialDesc);

    /// Patch kind-specific parameters in place: camera lens, light
    /// parameters, scene environment/fog, helper configuration. Must be
    /// idempotent.
    fn update_params(&mut self, handle: &Self::Handle, record: &SceneObjectData);

    /// Place the renderable under `parent` in the render hierarchy, or at
    /// the scene root when `parent` is `None`.
    fn attach(&mut self, handle: &Self::Handle, parent: Option<&Self::Handle>);

    /// Release the renderable and its GPU-side resources (geometries,
    /// materials, textures). Called before every recreate; skipping it
    /// leaks renderer resources.
    fn dispose(&mut self, handle: Self::Handle);
}

/// Backend that realizes nothing; for headless use and tests.
#[derive(Debug, Default)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    type Handle = ();

    fn create(&mut self, _record: &SceneObjectData) -> Result<(), SceneError> {
        Ok(())
    }

    fn update_transform(&mut self, _handle: &(), _transform: &Transform) {}

    fn update_flags(&mut self, _handle: &(), _flags: &RenderFlags) {}

    fn rebuild_geometry(&mut self, _handle: &(), _geometry: &GeometryDesc) {}

    fn rebuild_material(&mut self, _handle: &(), _material: &MaterialDesc) {}

    fn update_params(&mut self, _handle: &(), _record: &SceneObjectData) {}

    fn attach(&mut self, _handle: &(), _parent: Option<&()>) {}

    fn dispose(&mut self, _handle: ()) {}
}
