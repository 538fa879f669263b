//! The closed set of animatable scene properties.
//!
//! Tracks address targets through this enumeration instead of free-form
//! dotted strings, which keeps dispatch exhaustive. `parse`/`Display` keep
//! the conventional dotted notation ("position.x") on the wire so stored
//! documents stay readable.

use crate::object_id::ObjectId;
use crate::value::{Value, ValueKind};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A property of a scene object that animation tracks can drive.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AnimatableProperty {
    Position,
    PositionX,
    PositionY,
    PositionZ,
    Rotation,
    RotationX,
    RotationY,
    RotationZ,
    Scale,
    ScaleX,
    ScaleY,
    ScaleZ,
    Visible,
    CastShadow,
    ReceiveShadow,
    RenderOrder,
    Name,
}

impl AnimatableProperty {
    /// Every addressable property, in wire order.
    pub const ALL: [AnimatableProperty; 17] = [
        AnimatableProperty::Position,
        AnimatableProperty::PositionX,
        AnimatableProperty::PositionY,
        AnimatableProperty::PositionZ,
        AnimatableProperty::Rotation,
        AnimatableProperty::RotationX,
        AnimatableProperty::RotationY,
        AnimatableProperty::RotationZ,
        AnimatableProperty::Scale,
        AnimatableProperty::ScaleX,
        AnimatableProperty::ScaleY,
        AnimatableProperty::ScaleZ,
        AnimatableProperty::Visible,
        AnimatableProperty::CastShadow,
        AnimatableProperty::ReceiveShadow,
        AnimatableProperty::RenderOrder,
        AnimatableProperty::Name,
    ];

    /// The dotted wire name of this property.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimatableProperty::Position => "position",
            AnimatableProperty::PositionX => "position.x",
            AnimatableProperty::PositionY => "position.y",
            AnimatableProperty::PositionZ => "position.z",
            AnimatableProperty::Rotation => "rotation",
            AnimatableProperty::RotationX => "rotation.x",
            AnimatableProperty::RotationY => "rotation.y",
            AnimatableProperty::RotationZ => "rotation.z",
            AnimatableProperty::Scale => "scale",
            AnimatableProperty::ScaleX => "scale.x",
            AnimatableProperty::ScaleY => "scale.y",
            AnimatableProperty::ScaleZ => "scale.z",
            AnimatableProperty::Visible => "visible",
            AnimatableProperty::CastShadow => "castShadow",
            AnimatableProperty::ReceiveShadow => "receiveShadow",
            AnimatableProperty::RenderOrder => "renderOrder",
            AnimatableProperty::Name => "name",
        }
    }

    /// Parse the dotted wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.as_str() == s)
    }

    /// The value kind this property expects.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            AnimatableProperty::Position
            | AnimatableProperty::Rotation
            | AnimatableProperty::Scale => ValueKind::Vec3,
            AnimatableProperty::PositionX
            | AnimatableProperty::PositionY
            | AnimatableProperty::PositionZ
            | AnimatableProperty::RotationX
            | AnimatableProperty::RotationY
            | AnimatableProperty::RotationZ
            | AnimatableProperty::ScaleX
            | AnimatableProperty::ScaleY
            | AnimatableProperty::ScaleZ
            | AnimatableProperty::RenderOrder => ValueKind::Scalar,
            AnimatableProperty::Visible
            | AnimatableProperty::CastShadow
            | AnimatableProperty::ReceiveShadow => ValueKind::Bool,
            AnimatableProperty::Name => ValueKind::Text,
        }
    }

    /// The nine per-axis transform components, in position/rotation/scale
    /// order. Bulk transform keyframing writes one track per entry.
    pub const TRANSFORM_COMPONENTS: [AnimatableProperty; 9] = [
        AnimatableProperty::PositionX,
        AnimatableProperty::PositionY,
        AnimatableProperty::PositionZ,
        AnimatableProperty::RotationX,
        AnimatableProperty::RotationY,
        AnimatableProperty::RotationZ,
        AnimatableProperty::ScaleX,
        AnimatableProperty::ScaleY,
        AnimatableProperty::ScaleZ,
    ];
}

impl fmt::Display for AnimatableProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnimatableProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown animatable property: {s}"))
    }
}

impl Serialize for AnimatableProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AnimatableProperty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AnimatableProperty::parse(&s)
            .ok_or_else(|| de::Error::custom(format!("unknown animatable property: {s}")))
    }
}

/// Property access into scene state.
///
/// The animation tick reads and writes scene objects exclusively through
/// this trait. Implementations must not route these writes through any
/// history/undo mechanism: playback and scrubbing are not undoable.
pub trait PropertyStore {
    /// Read a property value; `None` when the target or property does not
    /// resolve.
    fn get_property(&self, target: &ObjectId, property: AnimatableProperty) -> Option<Value>;

    /// Write a property value. Returns `false` (and changes nothing) when
    /// the target is unknown or the value kind does not match.
    fn set_property(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
        value: &Value,
    ) -> bool;
}
