//! easel-scene-core: the scene-state store of the Easel editor (core,
//! engine-agnostic).
//!
//! One logical scene graph (`SceneObjectData` records with bidirectional
//! parent/child links) drives a render backend through a narrow capability
//! trait; a bounded snapshot-stack history provides undo/redo with
//! merge-coalescing and compound groups; the `PropertyStore` impl is the
//! animation engine's history-free write path.

pub mod backend;
pub mod error;
pub mod history;
pub mod object;
pub mod persistence;
pub mod registry;
pub mod snapshot;
pub mod store;

pub use backend::{NullBackend, RenderBackend};
pub use error::SceneError;
pub use history::{
    Clock, EditAction, EditLabel, HistoryConfig, HistoryEntry, MonotonicClock, SceneHistory,
};
pub use object::{
    CameraData, CriticalChange, FogSettings, GeometryDesc, GeometryKind, HelperData, HelperKind,
    MaterialDesc, MaterialKind, MeshData, MutationClass, ObjectKind, ObjectPatch, PatchEffect,
    RenderFlags, SceneEnvironment, SceneObjectData, Transform, TransformPatch,
};
pub use persistence::{MemoryPersistence, PersistenceBackend, SceneDocument};
pub use registry::{RemoveOptions, SceneObjectRegistry};
pub use snapshot::SceneSnapshot;
pub use store::{LogNotifier, Notifier, SceneStore, Severity};

/// Scene core result type.
pub type Result<T> = core::result::Result<T, SceneError>;
