//! Kind-specific object payloads: geometry/material descriptors, camera
//! and scene parameters, helper configuration.
//!
//! Descriptor parameters are free-form JSON maps keyed by the renderer's
//! own parameter names (dimensions, colors, texture ids); the core only
//! distinguishes the structural `kind`, which decides rebuild-vs-patch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Structural geometry family. Changing the family forces a renderable
/// rebuild; changing parameters within a family patches in place.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryKind {
    Box,
    Sphere,
    Plane,
    Cylinder,
    Cone,
    Torus,
    /// Caller-provided buffer geometry (loaded models, point clouds).
    Buffer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryDesc {
    pub kind: GeometryKind,
    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

impl GeometryDesc {
    pub fn new(kind: GeometryKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }
}

/// Structural material family; same rebuild-vs-patch rule as geometry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Basic,
    Lambert,
    Phong,
    Standard,
    Physical,
    Toon,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub kind: MaterialKind,
    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

impl MaterialDesc {
    pub fn new(kind: MaterialKind) -> Self {
        Self {
            kind,
            params: Map::new(),
        }
    }
}

/// Geometry + material pair carried by mesh-like objects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub geometry: GeometryDesc,
    pub material: MaterialDesc,
}

impl Default for MeshData {
    fn default() -> Self {
        Self {
            geometry: GeometryDesc::new(GeometryKind::Box),
            material: MaterialDesc::new(MaterialKind::Standard),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraData {
    /// Vertical field of view in degrees.
    pub fov: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for CameraData {
    fn default() -> Self {
        Self {
            fov: 50.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FogSettings {
    pub enabled: bool,
    pub color: String,
    pub near: f64,
    pub far: f64,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            color: "#aaaaaa".to_string(),
            near: 10.0,
            far: 100.0,
        }
    }
}

/// Background/environment/fog settings carried by the scene root object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneEnvironment {
    /// Background color or asset id.
    pub background: Option<String>,
    /// Environment map asset id.
    pub environment: Option<String>,
    pub fog: Option<FogSettings>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelperKind {
    Grid,
    Axes,
    Arrow,
    BoundingBox,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HelperData {
    pub kind: HelperKind,
    #[serde(default)]
    pub params: Map<String, JsonValue>,
}

impl Default for HelperData {
    fn default() -> Self {
        Self {
            kind: HelperKind::Grid,
            params: Map::new(),
        }
    }
}
