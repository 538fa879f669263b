//! Keyframes: a value pinned to a time, with the easing applied on the way
//! in from the previous keyframe.

use crate::easing::Easing;
use crate::ids::KeyframeId;
use crate::time::AnimationTime;
use easel_api_core::Value;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub id: KeyframeId,
    pub time: AnimationTime,
    pub value: Value,
    /// Easing applied to the segment that ENDS at this keyframe.
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    #[inline]
    pub fn new(time: impl Into<AnimationTime>, value: impl Into<Value>) -> Self {
        Self {
            id: KeyframeId::new(),
            time: time.into(),
            value: value.into(),
            easing: Easing::Linear,
        }
    }

    #[inline]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}
