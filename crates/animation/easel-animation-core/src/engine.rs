//! The animation engine: clip library, playback scheduling, and the
//! property write path into scene state.
//!
//! One engine owns a foreground playback context (the timeline the UI
//! scrubs) and any number of background contexts, each with an independent
//! clock and loop counter. Every tick samples the enabled tracks of each
//! playing clip and writes the results through [`PropertyStore`], never
//! through the scene's history-recording mutation path, so playback and
//! scrubbing are not undoable.

use crate::clip::{AnimationClip, PlayMode};
use crate::easing::Easing;
use crate::error::AnimationError;
use crate::ids::{ClipId, KeyframeId, TrackId};
use crate::keyframe::Keyframe;
use crate::player::{ClipPlayback, ClipTiming, PlaybackMode, PlaybackSession, PlaybackSignal};
use crate::stored::{StoredAnimationSet, StoredClip, ENVELOPE_VERSION};
use crate::time::AnimationTime;
use easel_api_core::{AnimatableProperty, ObjectId, PropertyStore, Value};
use hashbrown::HashMap;

/// Discrete playback signals, tagged with the clip they came from. Drained
/// by the host with [`AnimationEngine::take_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    ClipStarted { clip: ClipId },
    ClipLooped { clip: ClipId, loops_completed: u32 },
    ClipCompleted { clip: ClipId },
    ClipStopped { clip: ClipId },
}

/// Clip library plus foreground/background playback contexts.
#[derive(Debug)]
pub struct AnimationEngine {
    clips: Vec<AnimationClip>,
    active_clip_id: Option<ClipId>,
    foreground: ClipPlayback,
    /// Boundary-mode override for the foreground (e.g. ping-pong preview);
    /// `None` derives the mode from the clip's loop settings.
    foreground_mode: Option<PlaybackMode>,
    background: HashMap<ClipId, ClipPlayback>,
    playback_speed: f64,
    next_session: u64,
    events: Vec<AnimationEvent>,
}

impl Default for AnimationEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationEngine {
    pub fn new() -> Self {
        Self {
            clips: Vec::new(),
            active_clip_id: None,
            foreground: ClipPlayback::new(),
            foreground_mode: None,
            background: HashMap::new(),
            playback_speed: 1.0,
            next_session: 0,
            events: Vec::new(),
        }
    }

    // ---- clip library ----------------------------------------------------

    /// Load a clip into the library. The first clip loaded becomes the
    /// active (foreground) clip; clips marked auto-play start on their own
    /// background clock immediately.
    pub fn load_clip(&mut self, clip: AnimationClip) -> ClipId {
        let id = clip.id;
        let auto = clip.play_mode == PlayMode::Auto && clip.enabled;
        if let Some(existing) = self.clips.iter_mut().find(|c| c.id == id) {
            *existing = clip;
        } else {
            self.clips.push(clip);
        }
        if self.active_clip_id.is_none() {
            self.active_clip_id = Some(id);
        }
        if auto {
            self.play_background(id);
        }
        id
    }

    /// Unload a clip, stopping any playback bound to it.
    pub fn unload_clip(&mut self, id: ClipId) -> Result<AnimationClip, AnimationError> {
        let pos = self
            .clips
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| AnimationError::ClipNotFound { id: id.to_string() })?;
        self.background.remove(&id);
        if self.active_clip_id == Some(id) {
            self.active_clip_id = None;
            self.foreground = ClipPlayback::new();
        }
        Ok(self.clips.remove(pos))
    }

    #[inline]
    pub fn get_clip(&self, id: ClipId) -> Option<&AnimationClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    #[inline]
    pub fn get_clip_mut(&mut self, id: ClipId) -> Option<&mut AnimationClip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    #[inline]
    pub fn clips(&self) -> impl Iterator<Item = &AnimationClip> {
        self.clips.iter()
    }

    #[inline]
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Select the clip the foreground timeline edits and plays. Resets the
    /// foreground playhead.
    pub fn set_active_clip(&mut self, id: ClipId) -> Result<(), AnimationError> {
        if self.get_clip(id).is_none() {
            return Err(AnimationError::ClipNotFound { id: id.to_string() });
        }
        if self.active_clip_id != Some(id) {
            self.active_clip_id = Some(id);
            self.foreground = ClipPlayback::new();
        }
        Ok(())
    }

    #[inline]
    pub fn active_clip_id(&self) -> Option<ClipId> {
        self.active_clip_id
    }

    #[inline]
    pub fn active_clip(&self) -> Option<&AnimationClip> {
        self.active_clip_id.and_then(|id| self.get_clip(id))
    }

    // ---- playback control ------------------------------------------------

    #[inline]
    pub fn playback_speed(&self) -> f64 {
        self.playback_speed
    }

    /// Set the foreground speed multiplier (direction is handled by the
    /// playback context, so the speed is kept non-negative).
    #[inline]
    pub fn set_playback_speed(&mut self, speed: f64) {
        self.playback_speed = speed.max(0.0);
    }

    /// Override the foreground boundary mode (e.g. ping-pong); `None`
    /// falls back to the clip's own loop settings.
    #[inline]
    pub fn set_playback_mode(&mut self, mode: Option<PlaybackMode>) {
        self.foreground_mode = mode;
    }

    /// The current foreground session identity. Ticks delivered with an
    /// older session are ignored.
    #[inline]
    pub fn current_session(&self) -> PlaybackSession {
        self.foreground.session
    }

    #[inline]
    pub fn foreground(&self) -> &ClipPlayback {
        &self.foreground
    }

    #[inline]
    fn alloc_session(&mut self) -> PlaybackSession {
        self.next_session += 1;
        PlaybackSession(self.next_session)
    }

    /// Start (or resume) foreground playback of the active clip. No-op
    /// when already playing. Returns the session identity to schedule
    /// frame callbacks against.
    pub fn play(&mut self) -> Result<PlaybackSession, AnimationError> {
        let clip_id = self
            .active_clip_id
            .ok_or_else(|| AnimationError::ClipNotFound {
                id: "<no active clip>".to_string(),
            })?;
        let session = self.alloc_session();
        let mut signals = Vec::new();
        self.foreground.play(session, &mut signals);
        self.push_signals(clip_id, &signals);
        Ok(self.foreground.session)
    }

    /// Pause foreground playback; only valid while playing.
    pub fn pause(&mut self) -> Result<(), AnimationError> {
        self.foreground.pause()
    }

    /// Stop foreground playback from any state. With `reset_to_start` the
    /// playhead rewinds to zero and the track values at zero are reapplied;
    /// otherwise time and applied values stay where playback left off.
    pub fn stop(&mut self, reset_to_start: bool, store: &mut dyn PropertyStore) {
        let mut signals = Vec::new();
        self.foreground.stop(reset_to_start, &mut signals);
        if let Some(clip_id) = self.active_clip_id {
            self.push_signals(clip_id, &signals);
            if reset_to_start {
                self.apply_clip_at(clip_id, AnimationTime::zero(), store);
            }
        }
    }

    /// Move the foreground playhead (clamped to the clip duration) and
    /// immediately reapply all track values. Legal in any state.
    pub fn seek(&mut self, time: impl Into<AnimationTime>, store: &mut dyn PropertyStore) {
        let Some(clip_id) = self.active_clip_id else {
            return;
        };
        let Some(duration) = self.get_clip(clip_id).map(|c| c.duration) else {
            return;
        };
        self.foreground.seek(time.into(), duration);
        let at = self.foreground.current_time;
        self.apply_clip_at(clip_id, at, store);
    }

    /// Start a clip on its own background clock, independent of the
    /// foreground playhead. No-op when that clip is already playing in the
    /// background.
    pub fn play_background(&mut self, clip_id: ClipId) {
        if self.get_clip(clip_id).is_none() {
            return;
        }
        let session = self.alloc_session();
        let mut signals = Vec::new();
        self.background
            .entry(clip_id)
            .or_insert_with(ClipPlayback::new)
            .play(session, &mut signals);
        self.push_signals(clip_id, &signals);
    }

    /// Stop one background clip; other background clips and the foreground
    /// are untouched.
    pub fn stop_background(
        &mut self,
        clip_id: ClipId,
        reset_to_start: bool,
        store: &mut dyn PropertyStore,
    ) {
        let mut signals = Vec::new();
        if let Some(playback) = self.background.get_mut(&clip_id) {
            playback.stop(reset_to_start, &mut signals);
        }
        self.push_signals(clip_id, &signals);
        if reset_to_start && !signals.is_empty() {
            self.apply_clip_at(clip_id, AnimationTime::zero(), store);
        }
    }

    #[inline]
    pub fn background_playback(&self, clip_id: ClipId) -> Option<&ClipPlayback> {
        self.background.get(&clip_id)
    }

    #[inline]
    pub fn background_clip_ids(&self) -> Vec<ClipId> {
        self.background.keys().copied().collect()
    }

    // ---- frame tick ------------------------------------------------------

    /// Advance every playing context by `dt` seconds and write the sampled
    /// track values into the store. The foreground advances at the engine's
    /// playback speed; background clips run at their natural rate.
    pub fn tick(&mut self, dt: f64, store: &mut dyn PropertyStore) {
        self.tick_foreground(dt * self.playback_speed, store);
        self.tick_background(dt, store);
    }

    /// Foreground tick guarded by session identity: a callback scheduled
    /// for an earlier play() is a no-op once a new session has started.
    /// Returns whether the tick was applied.
    pub fn tick_session(
        &mut self,
        session: PlaybackSession,
        dt: f64,
        store: &mut dyn PropertyStore,
    ) -> bool {
        if session != self.foreground.session {
            return false;
        }
        self.tick_foreground(dt * self.playback_speed, store);
        true
    }

    fn tick_foreground(&mut self, dt: f64, store: &mut dyn PropertyStore) {
        let Some(clip_id) = self.active_clip_id else {
            return;
        };
        let Some((mut timing, reset_on_complete)) = self
            .get_clip(clip_id)
            .map(|c| (ClipTiming::of(c), c.reset_on_complete))
        else {
            return;
        };
        if let Some(mode) = self.foreground_mode {
            timing = timing.with_mode(mode);
        }

        let mut signals = Vec::new();
        let completed = self.foreground.advance(dt, &timing, &mut signals);
        let playing = self.foreground.state.is_playing();
        if completed && reset_on_complete {
            self.foreground.current_time = AnimationTime::zero();
        }
        let at = self.foreground.current_time;
        self.push_signals(clip_id, &signals);

        if playing || completed {
            self.apply_clip_at(clip_id, at, store);
        }
    }

    fn tick_background(&mut self, dt: f64, store: &mut dyn PropertyStore) {
        let ids: Vec<ClipId> = self.background.keys().copied().collect();
        for clip_id in ids {
            let Some((timing, reset_on_complete)) = self
                .get_clip(clip_id)
                .map(|c| (ClipTiming::of(c), c.reset_on_complete))
            else {
                // Clip was unloaded out from under its playback.
                self.background.remove(&clip_id);
                continue;
            };

            let mut signals = Vec::new();
            let (completed, playing, at) = match self.background.get_mut(&clip_id) {
                Some(playback) => {
                    let completed = playback.advance(dt, &timing, &mut signals);
                    let playing = playback.state.is_playing();
                    if completed && reset_on_complete {
                        playback.current_time = AnimationTime::zero();
                    }
                    (completed, playing, playback.current_time)
                }
                None => continue,
            };
            self.push_signals(clip_id, &signals);

            if playing || completed {
                self.apply_clip_at(clip_id, at, store);
            }
        }
    }

    /// Evaluate every enabled, unlocked track of a clip at `time` and write
    /// the results. A track whose target no longer resolves is skipped
    /// silently; the remaining tracks still apply.
    fn apply_clip_at(&self, clip_id: ClipId, time: AnimationTime, store: &mut dyn PropertyStore) {
        let Some(clip) = self.get_clip(clip_id) else {
            return;
        };
        for track in &clip.tracks {
            if !track.enabled || track.locked {
                continue;
            }
            let Some(value) = track.sample(time) else {
                continue;
            };
            if !store.set_property(&track.target, track.property, &value) {
                log::trace!(
                    "animation write skipped: {}/{} did not resolve",
                    track.target,
                    track.property
                );
            }
        }
    }

    fn push_signals(&mut self, clip_id: ClipId, signals: &[PlaybackSignal]) {
        for signal in signals {
            self.events.push(match signal {
                PlaybackSignal::Started => AnimationEvent::ClipStarted { clip: clip_id },
                PlaybackSignal::Looped { loops_completed } => AnimationEvent::ClipLooped {
                    clip: clip_id,
                    loops_completed: *loops_completed,
                },
                PlaybackSignal::Completed => AnimationEvent::ClipCompleted { clip: clip_id },
                PlaybackSignal::Stopped => AnimationEvent::ClipStopped { clip: clip_id },
            });
        }
    }

    /// Drain the queued playback events.
    pub fn take_events(&mut self) -> Vec<AnimationEvent> {
        std::mem::take(&mut self.events)
    }

    // ---- authoring -------------------------------------------------------

    /// Add (or epsilon-replace) a keyframe on the (target, property) track
    /// of a clip, creating the track on demand.
    pub fn add_keyframe(
        &mut self,
        clip_id: ClipId,
        target: &ObjectId,
        property: AnimatableProperty,
        time: impl Into<AnimationTime>,
        value: impl Into<Value>,
        easing: Easing,
    ) -> Result<TrackId, AnimationError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or_else(|| AnimationError::ClipNotFound {
                id: clip_id.to_string(),
            })?;
        clip.add_keyframe(
            target,
            property,
            Keyframe::new(time, value).with_easing(easing),
        )
    }

    /// Remove a keyframe from a track.
    pub fn remove_keyframe(
        &mut self,
        clip_id: ClipId,
        track_id: TrackId,
        keyframe_id: KeyframeId,
    ) -> Result<Keyframe, AnimationError> {
        let clip = self
            .clips
            .iter_mut()
            .find(|c| c.id == clip_id)
            .ok_or_else(|| AnimationError::ClipNotFound {
                id: clip_id.to_string(),
            })?;
        let track = clip
            .get_track_mut(track_id)
            .ok_or_else(|| AnimationError::TrackNotFound {
                clip_id: clip_id.to_string(),
                track_id: track_id.to_string(),
            })?;
        let removed =
            track
                .remove_keyframe(keyframe_id)
                .ok_or_else(|| AnimationError::KeyframeNotFound {
                    track_id: track_id.to_string(),
                    keyframe_id: keyframe_id.to_string(),
                })?;
        clip.touch();
        Ok(removed)
    }

    /// Keyframe a target's whole transform at `time`: nine tracks
    /// (position/rotation/scale x/y/z), each value sourced from the
    /// object's live transform in the store. No-op (empty result) when the
    /// target does not resolve.
    pub fn keyframe_transform(
        &mut self,
        clip_id: ClipId,
        target: &ObjectId,
        time: impl Into<AnimationTime>,
        store: &dyn PropertyStore,
    ) -> Result<Vec<TrackId>, AnimationError> {
        let time = time.into();
        if self.get_clip(clip_id).is_none() {
            return Err(AnimationError::ClipNotFound {
                id: clip_id.to_string(),
            });
        }

        let mut tracks = Vec::new();
        for property in AnimatableProperty::TRANSFORM_COMPONENTS {
            let Some(value) = store.get_property(target, property) else {
                continue;
            };
            let track_id =
                self.add_keyframe(clip_id, target, property, time, value, Easing::Linear)?;
            tracks.push(track_id);
        }
        Ok(tracks)
    }

    /// Drop every track bound to a target across all clips (scene object
    /// deleted). Returns the number of tracks removed.
    pub fn purge_target(&mut self, target: &ObjectId) -> usize {
        self.clips
            .iter_mut()
            .map(|c| c.remove_tracks_for_target(target))
            .sum()
    }

    // ---- persistence envelope --------------------------------------------

    /// Produce the serialization envelope for the persistence layer.
    pub fn export_animation_data(&self) -> StoredAnimationSet {
        StoredAnimationSet {
            version: ENVELOPE_VERSION.to_string(),
            clips: self.clips.iter().map(StoredClip::from_clip).collect(),
            active_clip_id: self.active_clip_id,
        }
    }

    /// Replace the engine's clip library from an envelope. Playback state
    /// is reset; clips marked auto-play start their background clocks.
    pub fn import_animation_data(
        &mut self,
        set: StoredAnimationSet,
    ) -> Result<(), AnimationError> {
        if set.version != ENVELOPE_VERSION {
            return Err(AnimationError::Serialization {
                reason: format!("unsupported animation data version: {}", set.version),
            });
        }
        let mut clips = Vec::with_capacity(set.clips.len());
        for stored in set.clips {
            clips.push(stored.into_clip()?);
        }

        self.clips.clear();
        self.background.clear();
        self.foreground = ClipPlayback::new();
        self.active_clip_id = None;
        for clip in clips {
            self.load_clip(clip);
        }
        if let Some(active) = set.active_clip_id {
            self.set_active_clip(active)?;
        }
        Ok(())
    }
}
