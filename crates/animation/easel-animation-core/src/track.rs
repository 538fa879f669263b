//! Animation tracks: one animated property of one target object.

use crate::error::AnimationError;
use crate::ids::{KeyframeId, TrackId};
use crate::keyframe::Keyframe;
use crate::time::{AnimationTime, TimeRange};
use easel_api_core::{AnimatableProperty, ObjectId, Value};
use serde::{Deserialize, Serialize};

/// How values between keyframes are produced.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Blend between the bracketing keyframes (with per-segment easing).
    #[default]
    Linear,
    /// Hold the earlier keyframe's value until the next keyframe.
    Step,
}

/// A single property's timeline within a clip, bound to one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationTrack {
    pub id: TrackId,
    pub target: ObjectId,
    pub property: AnimatableProperty,
    /// Keyframes in ascending time order.
    pub keyframes: Vec<Keyframe>,
    #[serde(default)]
    pub interpolation: Interpolation,
    pub enabled: bool,
    pub locked: bool,
}

impl AnimationTrack {
    /// Create a new empty track.
    #[inline]
    pub fn new(target: impl Into<ObjectId>, property: AnimatableProperty) -> Self {
        Self {
            id: TrackId::new(),
            target: target.into(),
            property,
            keyframes: Vec::new(),
            interpolation: Interpolation::Linear,
            enabled: true,
            locked: false,
        }
    }

    /// Add a keyframe, keeping ascending time order.
    ///
    /// A keyframe within the authoring epsilon of an existing one replaces
    /// it in place (the keyframe count does not change). The value kind
    /// must match the rest of the track.
    pub fn add_keyframe(&mut self, keyframe: Keyframe) -> Result<KeyframeId, AnimationError> {
        if let Some(first) = self.keyframes.first() {
            if !first.value.same_kind(&keyframe.value) {
                return Err(AnimationError::ValueKindMismatch {
                    expected: first.value.kind(),
                    actual: keyframe.value.kind(),
                });
            }
        }

        if let Some(existing) = self
            .keyframes
            .iter_mut()
            .find(|k| k.time.approx_eq(keyframe.time))
        {
            existing.value = keyframe.value;
            existing.easing = keyframe.easing;
            return Ok(existing.id);
        }

        let id = keyframe.id;
        let insert_pos = self
            .keyframes
            .binary_search_by(|k| k.time.cmp(&keyframe.time))
            .unwrap_or_else(|pos| pos);
        self.keyframes.insert(insert_pos, keyframe);
        Ok(id)
    }

    /// Remove a keyframe by id; `None` when absent.
    pub fn remove_keyframe(&mut self, id: KeyframeId) -> Option<Keyframe> {
        let pos = self.keyframes.iter().position(|k| k.id == id)?;
        Some(self.keyframes.remove(pos))
    }

    #[inline]
    pub fn get_keyframe(&self, id: KeyframeId) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.id == id)
    }

    /// The keyframe sitting at `time` (within epsilon), if any.
    #[inline]
    pub fn keyframe_at(&self, time: AnimationTime) -> Option<&Keyframe> {
        self.keyframes.iter().find(|k| k.time.approx_eq(time))
    }

    /// The time range covered by this track's keyframes.
    #[inline]
    pub fn time_range(&self) -> Option<TimeRange> {
        let first = self.keyframes.first()?;
        let last = self.keyframes.last()?;
        TimeRange::new(first.time, last.time).ok()
    }

    /// Evaluate the track at `time`.
    ///
    /// With no keyframes there is no value. With one keyframe its value
    /// holds at all times. Outside the keyframe range the value clamps to
    /// the first/last keyframe. In between, the bracketing pair is located,
    /// the local parameter is eased with the NEXT keyframe's curve, and the
    /// values blend per their kind (numeric lerp, component-wise for
    /// vectors, midpoint step for bool/text). Step interpolation holds the
    /// earlier keyframe's value for the whole segment.
    pub fn sample(&self, time: AnimationTime) -> Option<Value> {
        let first = self.keyframes.first()?;
        if self.keyframes.len() == 1 || time <= first.time {
            return Some(first.value.clone());
        }
        let last = self.keyframes.last()?;
        if time >= last.time {
            return Some(last.value.clone());
        }

        // First keyframe strictly after `time`; bounds are safe because
        // time is strictly inside (first.time, last.time).
        let next_idx = self
            .keyframes
            .binary_search_by(|k| k.time.cmp(&time))
            .map(|idx| idx + 1)
            .unwrap_or_else(|idx| idx);
        let prev = &self.keyframes[next_idx - 1];
        let next = &self.keyframes[next_idx];

        if self.interpolation == Interpolation::Step {
            return Some(prev.value.clone());
        }

        let span = next.time.as_seconds() - prev.time.as_seconds();
        if span <= 0.0 {
            return Some(prev.value.clone());
        }
        let t = (time.as_seconds() - prev.time.as_seconds()) / span;
        let eased = next.easing.apply(t);

        Some(
            prev.value
                .lerp(&next.value, eased)
                .unwrap_or_else(|| prev.value.clone()),
        )
    }

    #[inline]
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    #[inline]
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    fn track_0_to_10() -> AnimationTrack {
        let mut track = AnimationTrack::new("obj-1", AnimatableProperty::PositionX);
        track.add_keyframe(Keyframe::new(0.0, 0.0)).unwrap();
        track.add_keyframe(Keyframe::new(2.0, 10.0)).unwrap();
        track
    }

    #[test]
    fn keyframes_stay_sorted() {
        let mut track = AnimationTrack::new("obj-1", AnimatableProperty::PositionX);
        track.add_keyframe(Keyframe::new(2.0, 2.0)).unwrap();
        track.add_keyframe(Keyframe::new(0.5, 0.5)).unwrap();
        track.add_keyframe(Keyframe::new(1.0, 1.0)).unwrap();
        let times: Vec<f64> = track.keyframes.iter().map(|k| k.time.as_seconds()).collect();
        assert_eq!(times, vec![0.5, 1.0, 2.0]);
    }

    #[test]
    fn kind_mismatch_rejected() {
        let mut track = AnimationTrack::new("obj-1", AnimatableProperty::PositionX);
        track.add_keyframe(Keyframe::new(0.0, 1.0)).unwrap();
        let err = track.add_keyframe(Keyframe::new(1.0, true)).unwrap_err();
        assert!(matches!(err, AnimationError::ValueKindMismatch { .. }));
    }

    #[test]
    fn midpoint_is_halfway() {
        let track = track_0_to_10();
        assert_eq!(
            track.sample(AnimationTime::from_seconds(1.0).unwrap()),
            Some(Value::Scalar(5.0))
        );
    }

    #[test]
    fn clamps_outside_range() {
        let track = track_0_to_10();
        assert_eq!(
            track.sample(AnimationTime::from_seconds(0.0).unwrap()),
            Some(Value::Scalar(0.0))
        );
        assert_eq!(
            track.sample(AnimationTime::from_seconds(5.0).unwrap()),
            Some(Value::Scalar(10.0))
        );
    }

    #[test]
    fn single_keyframe_holds_everywhere() {
        let mut track = AnimationTrack::new("obj-1", AnimatableProperty::PositionY);
        track.add_keyframe(Keyframe::new(1.0, 7.0)).unwrap();
        for t in [0.0, 1.0, 100.0] {
            assert_eq!(
                track.sample(AnimationTime::from_seconds(t).unwrap()),
                Some(Value::Scalar(7.0))
            );
        }
    }

    #[test]
    fn empty_track_has_no_value() {
        let track = AnimationTrack::new("obj-1", AnimatableProperty::PositionX);
        assert_eq!(track.sample(AnimationTime::zero()), None);
    }

    #[test]
    fn step_mode_holds_left() {
        let mut track = track_0_to_10();
        track.interpolation = Interpolation::Step;
        assert_eq!(
            track.sample(AnimationTime::from_seconds(1.9).unwrap()),
            Some(Value::Scalar(0.0))
        );
        assert_eq!(
            track.sample(AnimationTime::from_seconds(2.0).unwrap()),
            Some(Value::Scalar(10.0))
        );
    }

    #[test]
    fn easing_comes_from_the_next_keyframe() {
        let mut track = AnimationTrack::new("obj-1", AnimatableProperty::PositionX);
        track.add_keyframe(Keyframe::new(0.0, 0.0)).unwrap();
        track
            .add_keyframe(Keyframe::new(2.0, 10.0).with_easing(Easing::QuadIn))
            .unwrap();
        // t = 0.5 eased by quad-in is 0.25.
        assert_eq!(
            track.sample(AnimationTime::from_seconds(1.0).unwrap()),
            Some(Value::Scalar(2.5))
        );
    }

    #[test]
    fn epsilon_add_replaces_in_place() {
        let mut track = track_0_to_10();
        track
            .add_keyframe(Keyframe::new(1.0, 4.0))
            .unwrap();
        assert_eq!(track.keyframes.len(), 3);
        track
            .add_keyframe(Keyframe::new(1.0005, 6.0))
            .unwrap();
        assert_eq!(track.keyframes.len(), 3);
        assert_eq!(
            track.keyframe_at(AnimationTime::from_seconds(1.0).unwrap()).map(|k| &k.value),
            Some(&Value::Scalar(6.0))
        );
    }
}
