//! Object transforms: position, Euler rotation (radians), scale.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    /// Euler angles in radians.
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    /// Merge a patch; position, rotation, and scale are independently
    /// replaceable.
    pub fn apply(&mut self, patch: &TransformPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        if let Some(scale) = patch.scale {
            self.scale = scale;
        }
    }
}

/// Partial transform update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPatch {
    pub position: Option<[f64; 3]>,
    pub rotation: Option<[f64; 3]>,
    pub scale: Option<[f64; 3]>,
}

impl TransformPatch {
    #[inline]
    pub fn position(position: [f64; 3]) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    #[inline]
    pub fn rotation(rotation: [f64; 3]) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    #[inline]
    pub fn scale(scale: [f64; 3]) -> Self {
        Self {
            scale: Some(scale),
            ..Self::default()
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.rotation.is_none() && self.scale.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_merge_independently() {
        let mut transform = Transform::default();
        transform.apply(&TransformPatch::position([1.0, 2.0, 3.0]));
        transform.apply(&TransformPatch::scale([2.0, 2.0, 2.0]));
        assert_eq!(transform.position, [1.0, 2.0, 3.0]);
        assert_eq!(transform.rotation, [0.0; 3]);
        assert_eq!(transform.scale, [2.0; 3]);
    }
}
