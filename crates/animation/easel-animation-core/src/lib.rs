//! easel-animation-core: keyframe animation for the Easel editor (core,
//! engine-agnostic).
//!
//! Clips own tracks; tracks own keyframes sorted by time; playback
//! contexts (one foreground, any number of background) advance on the
//! host's frame tick and write sampled values into scene state through the
//! `PropertyStore` trait from `easel-api-core`. Animation writes never
//! touch the undo history.

pub mod clip;
pub mod easing;
pub mod engine;
pub mod error;
pub mod ids;
pub mod keyframe;
pub mod player;
pub mod stored;
pub mod time;
pub mod track;

pub use clip::{AnimationClip, PlayMode, LOOP_FOREVER};
pub use easing::Easing;
pub use engine::{AnimationEngine, AnimationEvent};
pub use error::AnimationError;
pub use ids::{ClipId, KeyframeId, TrackId};
pub use keyframe::Keyframe;
pub use player::{
    ClipPlayback, ClipTiming, PlaybackDirection, PlaybackMode, PlaybackSession, PlaybackState,
};
pub use stored::{StoredAnimationSet, StoredClip, ENVELOPE_VERSION};
pub use time::{AnimationTime, TimeRange, KEYFRAME_EPSILON_SECONDS};
pub use track::{AnimationTrack, Interpolation};

/// Animation core result type.
pub type Result<T> = core::result::Result<T, AnimationError>;
