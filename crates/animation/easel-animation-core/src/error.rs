//! Error types for the animation core.

use easel_api_core::ValueKind;
use serde::{Deserialize, Serialize};

/// Errors surfaced by clip storage, authoring, and playback control.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AnimationError {
    /// Clip not loaded in the engine.
    #[error("clip not found: {id}")]
    ClipNotFound { id: String },

    /// Track not present in the clip.
    #[error("track not found: {track_id} in clip {clip_id}")]
    TrackNotFound { clip_id: String, track_id: String },

    /// Keyframe not present in the track.
    #[error("keyframe not found: {keyframe_id} in track {track_id}")]
    KeyframeNotFound {
        track_id: String,
        keyframe_id: String,
    },

    /// Negative or non-finite time value.
    #[error("invalid time value: {time}")]
    InvalidTime { time: f64 },

    /// Playback control request not valid in the current state.
    #[error("invalid playback state: {current_state} -> {requested_state}")]
    InvalidPlaybackState {
        current_state: String,
        requested_state: String,
    },

    /// A keyframe's value kind does not match the rest of the track.
    #[error("value kind mismatch: expected {expected:?}, got {actual:?}")]
    ValueKindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Serialization or envelope format error.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
