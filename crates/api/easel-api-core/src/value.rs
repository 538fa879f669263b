//! Animatable value kinds and blending rules.

use serde::{Deserialize, Serialize};

/// Discriminant for [`Value`], used for type checking before blending.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Scalar,
    Bool,
    Text,
    Vec3,
}

/// A value an animation track can carry and a scene property can hold.
///
/// Scalars and vectors blend arithmetically; `Bool` and `Text` are
/// step-only (they switch at the midpoint of a segment, with no continuous
/// blend).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Scalar(f64),
    Bool(bool),
    Text(String),
    Vec3([f64; 3]),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::Bool(_) => ValueKind::Bool,
            Value::Text(_) => ValueKind::Text,
            Value::Vec3(_) => ValueKind::Vec3,
        }
    }

    /// Whether two values are blendable with each other.
    #[inline]
    pub fn same_kind(&self, other: &Value) -> bool {
        self.kind() == other.kind()
    }

    /// Interpolate between `self` and `other` at parameter `t`.
    ///
    /// Numeric values lerp; `Vec3` lerps component-wise; `Bool` and `Text`
    /// step at t = 0.5. Returns `None` when the kinds differ.
    pub fn lerp(&self, other: &Value, t: f64) -> Option<Value> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Some(Value::Scalar(a + (b - a) * t)),
            (Value::Vec3(a), Value::Vec3(b)) => Some(Value::Vec3([
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
                a[2] + (b[2] - a[2]) * t,
            ])),
            (Value::Bool(_), Value::Bool(_)) | (Value::Text(_), Value::Text(_)) => {
                Some(self.step(other, t))
            }
            _ => None,
        }
    }

    /// Step from `self` to `other` at t = 0.5, regardless of kind.
    #[inline]
    pub fn step(&self, other: &Value, t: f64) -> Value {
        if t < 0.5 {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Scalar accessor; `None` for non-scalar values.
    #[inline]
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<[f64; 3]> for Value {
    fn from(v: [f64; 3]) -> Self {
        Value::Vec3(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_lerp() {
        let a = Value::Scalar(0.0);
        let b = Value::Scalar(10.0);
        assert_eq!(a.lerp(&b, 0.5), Some(Value::Scalar(5.0)));
        assert_eq!(a.lerp(&b, 0.0), Some(Value::Scalar(0.0)));
        assert_eq!(a.lerp(&b, 1.0), Some(Value::Scalar(10.0)));
    }

    #[test]
    fn vec3_lerp_componentwise() {
        let a = Value::Vec3([0.0, 2.0, -4.0]);
        let b = Value::Vec3([1.0, 0.0, 4.0]);
        assert_eq!(a.lerp(&b, 0.5), Some(Value::Vec3([0.5, 1.0, 0.0])));
    }

    #[test]
    fn bool_and_text_step_at_midpoint() {
        let a = Value::Bool(false);
        let b = Value::Bool(true);
        assert_eq!(a.lerp(&b, 0.49), Some(Value::Bool(false)));
        assert_eq!(a.lerp(&b, 0.5), Some(Value::Bool(true)));

        let s = Value::Text("red".into());
        let e = Value::Text("blue".into());
        assert_eq!(s.lerp(&e, 0.2), Some(Value::Text("red".into())));
        assert_eq!(s.lerp(&e, 0.8), Some(Value::Text("blue".into())));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        assert_eq!(Value::Scalar(1.0).lerp(&Value::Bool(true), 0.5), None);
    }

    #[test]
    fn serde_round_trip() {
        let v = Value::Vec3([1.0, 2.0, 3.0]);
        let json = serde_json::to_string(&v).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}
