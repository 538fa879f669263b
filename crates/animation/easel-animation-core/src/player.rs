//! Per-context playback state machines.
//!
//! Each playback context (the foreground playhead, and every background
//! clip) owns one [`ClipPlayback`]: its own clock, direction, loop counter,
//! and session identity. Contexts never share state, so stopping one clip
//! cannot disturb another.

use crate::clip::{AnimationClip, LOOP_FOREVER};
use crate::error::AnimationError;
use crate::time::AnimationTime;
use serde::{Deserialize, Serialize};

/// Playback state of one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

impl PlaybackState {
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn can_resume(&self) -> bool {
        matches!(self, Self::Stopped | Self::Paused)
    }
}

/// Direction the playhead moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackDirection {
    #[default]
    Forward,
    Backward,
}

impl PlaybackDirection {
    #[inline]
    fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// What happens when the playhead reaches a clip boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackMode {
    /// Play once and complete at the boundary.
    #[default]
    Once,
    /// Wrap to the opposite boundary.
    Loop,
    /// Reverse direction at each boundary.
    PingPong,
}

/// Identity of one play()..completion span.
///
/// A tick or completion callback scheduled for an older session is a
/// no-op; this replaces cancelling in-flight frame callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct PlaybackSession(pub u64);

/// Discrete signals produced while a context advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackSignal {
    Started,
    /// The playhead wrapped (or reversed, for ping-pong).
    Looped { loops_completed: u32 },
    /// The loop budget ran out or the clip was non-looping; emitted exactly
    /// once per session, including when `stop` cuts playback short.
    Completed,
    Stopped,
}

/// Boundary behavior for one advance step, derived from the clip.
#[derive(Debug, Clone, Copy)]
pub struct ClipTiming {
    pub duration: AnimationTime,
    pub mode: PlaybackMode,
    /// Re-plays allowed after the first pass; [`LOOP_FOREVER`] = unbounded.
    pub loop_count: i32,
}

impl ClipTiming {
    /// Derive boundary behavior from a clip's settings.
    pub fn of(clip: &AnimationClip) -> Self {
        Self {
            duration: clip.duration,
            mode: if clip.looping {
                PlaybackMode::Loop
            } else {
                PlaybackMode::Once
            },
            loop_count: clip.loop_count,
        }
    }

    #[inline]
    pub fn with_mode(mut self, mode: PlaybackMode) -> Self {
        self.mode = mode;
        self
    }
}

/// One playback context: state machine, clock, loop counter, session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClipPlayback {
    pub state: PlaybackState,
    pub current_time: AnimationTime,
    pub direction: PlaybackDirection,
    pub loops_completed: u32,
    pub session: PlaybackSession,
    completion_emitted: bool,
}

impl ClipPlayback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or resume) playback. No-op when already playing. A fresh
    /// start resets the clock origin, loop counter, and direction, and
    /// opens a new session.
    pub fn play(&mut self, session: PlaybackSession, signals: &mut Vec<PlaybackSignal>) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => {
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Stopped => {
                self.state = PlaybackState::Playing;
                self.direction = PlaybackDirection::Forward;
                self.loops_completed = 0;
                self.completion_emitted = false;
                self.session = session;
                signals.push(PlaybackSignal::Started);
            }
        }
    }

    /// Pause; only valid while playing. The current time is preserved.
    pub fn pause(&mut self) -> Result<(), AnimationError> {
        if !self.state.can_pause() {
            return Err(AnimationError::InvalidPlaybackState {
                current_state: self.state.name().to_string(),
                requested_state: "paused".to_string(),
            });
        }
        self.state = PlaybackState::Paused;
        Ok(())
    }

    /// Stop from any state. With `reset_to_start` the playhead rewinds to
    /// zero (the caller reapplies values at zero); otherwise time stays
    /// where playback left off. The session's completion signal fires here
    /// if it has not already.
    pub fn stop(&mut self, reset_to_start: bool, signals: &mut Vec<PlaybackSignal>) {
        let was_active = self.state != PlaybackState::Stopped;
        self.state = PlaybackState::Stopped;
        if reset_to_start {
            self.current_time = AnimationTime::zero();
        }
        if was_active && !self.completion_emitted {
            self.completion_emitted = true;
            signals.push(PlaybackSignal::Completed);
        }
        if was_active {
            signals.push(PlaybackSignal::Stopped);
        }
    }

    /// Move the playhead, clamped to [0, duration]. Legal in any state.
    pub fn seek(&mut self, time: AnimationTime, duration: AnimationTime) {
        self.current_time = time.clamp(AnimationTime::zero(), duration);
    }

    /// Whether a loop budget remains for another boundary crossing.
    #[inline]
    fn can_loop(&self, timing: &ClipTiming) -> bool {
        timing.mode != PlaybackMode::Once
            && (timing.loop_count == LOOP_FOREVER
                || self.loops_completed < timing.loop_count as u32)
    }

    /// Advance the clock by `dt` seconds (already speed-scaled, >= 0),
    /// handling boundary wraps, ping-pong reversal, and completion.
    ///
    /// Returns `true` when this step completed the session; the playhead is
    /// then clamped at the boundary it reached and the state is Stopped.
    pub fn advance(&mut self, dt: f64, timing: &ClipTiming, signals: &mut Vec<PlaybackSignal>) -> bool {
        if !self.state.is_playing() || dt <= 0.0 {
            return false;
        }
        let duration = timing.duration.as_seconds();
        if duration <= 0.0 {
            return false;
        }

        let mut t = self.current_time.as_seconds();
        let mut remaining = dt;
        let mut completed = false;

        while remaining > 0.0 {
            let room = match self.direction {
                PlaybackDirection::Forward => duration - t,
                PlaybackDirection::Backward => t,
            };
            if remaining < room {
                t = match self.direction {
                    PlaybackDirection::Forward => t + remaining,
                    PlaybackDirection::Backward => t - remaining,
                };
                break;
            }

            remaining -= room;
            t = match self.direction {
                PlaybackDirection::Forward => duration,
                PlaybackDirection::Backward => 0.0,
            };

            if self.can_loop(timing) {
                self.loops_completed += 1;
                signals.push(PlaybackSignal::Looped {
                    loops_completed: self.loops_completed,
                });
                match timing.mode {
                    PlaybackMode::Loop => {
                        t = match self.direction {
                            PlaybackDirection::Forward => 0.0,
                            PlaybackDirection::Backward => duration,
                        };
                    }
                    PlaybackMode::PingPong => {
                        self.direction = self.direction.reversed();
                    }
                    PlaybackMode::Once => unreachable!("Once never loops"),
                }
            } else {
                self.state = PlaybackState::Stopped;
                if !self.completion_emitted {
                    self.completion_emitted = true;
                    signals.push(PlaybackSignal::Completed);
                }
                completed = true;
                break;
            }
        }

        self.current_time = AnimationTime::from_seconds_clamped(t);
        completed
    }
}
