//! Animation clips: a named set of tracks with shared playback settings.

use crate::error::AnimationError;
use crate::ids::{ClipId, TrackId};
use crate::keyframe::Keyframe;
use crate::time::AnimationTime;
use crate::track::AnimationTrack;
use easel_api_core::{AnimatableProperty, ObjectId};
use serde::{Deserialize, Serialize};

/// Whether a clip starts on its own when loaded or waits for an explicit
/// play request.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    Auto,
    #[default]
    Manual,
}

/// Loop counter for a clip; -1 plays forever.
pub const LOOP_FOREVER: i32 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub id: ClipId,
    pub name: String,
    /// Clip length in seconds, always > 0.
    pub duration: AnimationTime,
    pub fps: f64,
    pub looping: bool,
    /// Number of re-plays after the first pass; [`LOOP_FOREVER`] for
    /// unbounded.
    pub loop_count: i32,
    pub play_mode: PlayMode,
    pub enabled: bool,
    /// When true, completion rewinds the playhead to zero; when false the
    /// final values stay applied.
    pub reset_on_complete: bool,
    pub tracks: Vec<AnimationTrack>,
    /// Unix seconds.
    pub created_at: u64,
    /// Unix seconds, refreshed by [`AnimationClip::touch`].
    pub updated_at: u64,
}

impl AnimationClip {
    /// Create an empty clip with editor defaults.
    pub fn new(name: impl Into<String>, duration: impl Into<AnimationTime>) -> Self {
        let now = now_unix_seconds();
        Self {
            id: ClipId::new(),
            name: name.into(),
            duration: duration.into(),
            fps: 30.0,
            looping: false,
            loop_count: LOOP_FOREVER,
            play_mode: PlayMode::Manual,
            enabled: true,
            reset_on_complete: true,
            tracks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the modification timestamp.
    #[inline]
    pub fn touch(&mut self) {
        self.updated_at = now_unix_seconds();
    }

    /// Find the track driving (target, property), if any. A clip holds at
    /// most one track per pair.
    #[inline]
    pub fn find_track(
        &self,
        target: &ObjectId,
        property: AnimatableProperty,
    ) -> Option<&AnimationTrack> {
        self.tracks
            .iter()
            .find(|t| &t.target == target && t.property == property)
    }

    #[inline]
    pub fn find_track_mut(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
    ) -> Option<&mut AnimationTrack> {
        self.tracks
            .iter_mut()
            .find(|t| &t.target == target && t.property == property)
    }

    #[inline]
    pub fn get_track(&self, id: TrackId) -> Option<&AnimationTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    #[inline]
    pub fn get_track_mut(&mut self, id: TrackId) -> Option<&mut AnimationTrack> {
        self.tracks.iter_mut().find(|t| t.id == id)
    }

    /// Get or create the track for (target, property), preserving the
    /// one-track-per-pair invariant.
    pub fn upsert_track(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
    ) -> &mut AnimationTrack {
        if let Some(pos) = self
            .tracks
            .iter()
            .position(|t| &t.target == target && t.property == property)
        {
            return &mut self.tracks[pos];
        }
        self.tracks
            .push(AnimationTrack::new(target.clone(), property));
        self.tracks.last_mut().expect("track just pushed")
    }

    /// Remove a track by id; `None` when absent.
    pub fn remove_track(&mut self, id: TrackId) -> Option<AnimationTrack> {
        let pos = self.tracks.iter().position(|t| t.id == id)?;
        self.touch();
        Some(self.tracks.remove(pos))
    }

    /// Drop every track bound to a target (used when the object is deleted
    /// and its timeline should go with it).
    pub fn remove_tracks_for_target(&mut self, target: &ObjectId) -> usize {
        let before = self.tracks.len();
        self.tracks.retain(|t| &t.target != target);
        let removed = before - self.tracks.len();
        if removed > 0 {
            self.touch();
        }
        removed
    }

    /// Add or replace a keyframe on the (target, property) track, creating
    /// the track on demand.
    pub fn add_keyframe(
        &mut self,
        target: &ObjectId,
        property: AnimatableProperty,
        keyframe: Keyframe,
    ) -> Result<TrackId, AnimationError> {
        let track = self.upsert_track(target, property);
        let track_id = track.id;
        track.add_keyframe(keyframe)?;
        self.touch();
        Ok(track_id)
    }

    /// Grow the clip duration to cover every keyframe (authoring helper;
    /// the stored duration never shrinks below its configured length).
    pub fn extend_duration_to_tracks(&mut self) {
        let max_time = self
            .tracks
            .iter()
            .filter_map(|t| t.time_range())
            .map(|r| r.end)
            .max()
            .unwrap_or(AnimationTime::zero());
        if max_time > self.duration {
            self.duration = max_time;
        }
    }
}

/// Current wall-clock time as unix seconds.
pub(crate) fn now_unix_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_api_core::Value;

    #[test]
    fn one_track_per_target_property_pair() {
        let mut clip = AnimationClip::new("walk", 2.0);
        let target = ObjectId::new("obj-1");
        let a = clip.upsert_track(&target, AnimatableProperty::PositionX).id;
        let b = clip.upsert_track(&target, AnimatableProperty::PositionX).id;
        assert_eq!(a, b);
        assert_eq!(clip.tracks.len(), 1);

        clip.upsert_track(&target, AnimatableProperty::PositionY);
        assert_eq!(clip.tracks.len(), 2);
    }

    #[test]
    fn add_keyframe_creates_track_on_demand() {
        let mut clip = AnimationClip::new("walk", 2.0);
        let target = ObjectId::new("obj-1");
        clip.add_keyframe(
            &target,
            AnimatableProperty::PositionX,
            Keyframe::new(0.5, 1.0),
        )
        .unwrap();
        let track = clip.find_track(&target, AnimatableProperty::PositionX).unwrap();
        assert_eq!(track.keyframes.len(), 1);
        assert_eq!(track.keyframes[0].value, Value::Scalar(1.0));
    }

    #[test]
    fn remove_tracks_for_target() {
        let mut clip = AnimationClip::new("walk", 2.0);
        let a = ObjectId::new("obj-1");
        let b = ObjectId::new("obj-2");
        clip.upsert_track(&a, AnimatableProperty::PositionX);
        clip.upsert_track(&a, AnimatableProperty::PositionY);
        clip.upsert_track(&b, AnimatableProperty::PositionX);
        assert_eq!(clip.remove_tracks_for_target(&a), 2);
        assert_eq!(clip.tracks.len(), 1);
        assert_eq!(clip.tracks[0].target, b);
    }

    #[test]
    fn duration_extends_to_cover_keyframes() {
        let mut clip = AnimationClip::new("walk", 1.0);
        let target = ObjectId::new("obj-1");
        clip.add_keyframe(
            &target,
            AnimatableProperty::PositionX,
            Keyframe::new(3.0, 1.0),
        )
        .unwrap();
        clip.extend_duration_to_tracks();
        assert_eq!(clip.duration.as_seconds(), 3.0);
    }
}
