//! Time handling for animation playback.
//!
//! Times are stored as u64 nanoseconds so they are `Ord` and free of float
//! accumulation drift across long playback sessions.

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Two keyframes closer than this are considered the same authoring
/// position; adding the second replaces the first.
pub const KEYFRAME_EPSILON_SECONDS: f64 = 0.001;

/// A moment on an animation timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct AnimationTime(u64);

impl AnimationTime {
    #[inline]
    pub fn from_nanos(nanoseconds: u64) -> Self {
        Self(nanoseconds)
    }

    #[inline]
    pub fn from_millis(milliseconds: f64) -> Result<Self, AnimationError> {
        Self::from_seconds(milliseconds / 1000.0)
    }

    /// Create a time from seconds; negative or non-finite inputs are
    /// rejected.
    #[inline]
    pub fn from_seconds(seconds: f64) -> Result<Self, AnimationError> {
        if seconds < 0.0 || !seconds.is_finite() {
            return Err(AnimationError::InvalidTime { time: seconds });
        }
        Ok(Self((seconds * 1_000_000_000.0) as u64))
    }

    /// Saturating conversion used for arithmetic results that may have
    /// gone negative; clamps to zero.
    #[inline]
    pub fn from_seconds_clamped(seconds: f64) -> Self {
        Self::from_seconds(seconds.max(0.0)).unwrap_or_else(|_| Self::zero())
    }

    #[inline]
    pub fn zero() -> Self {
        Self(0)
    }

    #[inline]
    pub fn as_seconds(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    #[inline]
    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    #[inline]
    pub fn as_nanos(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn clamp(&self, min: AnimationTime, max: AnimationTime) -> Self {
        if self.0 < min.0 {
            min
        } else if self.0 > max.0 {
            max
        } else {
            *self
        }
    }

    /// Whether two times fall within the keyframe identity epsilon.
    #[inline]
    pub fn approx_eq(&self, other: AnimationTime) -> bool {
        (self.as_seconds() - other.as_seconds()).abs() < KEYFRAME_EPSILON_SECONDS
    }
}

impl std::ops::Add for AnimationTime {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl std::ops::AddAssign for AnimationTime {
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl std::ops::Sub for AnimationTime {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl std::ops::SubAssign for AnimationTime {
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl From<f64> for AnimationTime {
    fn from(seconds: f64) -> Self {
        Self::from_seconds_clamped(seconds)
    }
}

impl From<AnimationTime> for f64 {
    fn from(t: AnimationTime) -> f64 {
        t.as_seconds()
    }
}

/// An inclusive time range on a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: AnimationTime,
    pub end: AnimationTime,
}

impl TimeRange {
    pub fn new(start: AnimationTime, end: AnimationTime) -> Result<Self, AnimationError> {
        if start > end {
            return Err(AnimationError::InvalidTime {
                time: start.as_seconds(),
            });
        }
        Ok(Self { start, end })
    }

    /// Range from zero to the given duration.
    #[inline]
    pub fn from_duration(duration: AnimationTime) -> Self {
        Self {
            start: AnimationTime::zero(),
            end: duration,
        }
    }

    #[inline]
    pub fn duration(&self) -> AnimationTime {
        AnimationTime(self.end.0 - self.start.0)
    }

    #[inline]
    pub fn contains(&self, time: AnimationTime) -> bool {
        time >= self.start && time <= self.end
    }

    /// Normalize a time within this range to [0, 1].
    #[inline]
    pub fn normalize(&self, time: AnimationTime) -> f64 {
        let duration = self.duration().as_seconds();
        if duration == 0.0 {
            return 0.0;
        }
        ((time.as_seconds() - self.start.as_seconds()) / duration).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_round_trip() {
        let t = AnimationTime::from_seconds(1.5).unwrap();
        assert_eq!(t.as_seconds(), 1.5);
        assert_eq!(t.as_millis(), 1500.0);
    }

    #[test]
    fn invalid_times_rejected() {
        assert!(AnimationTime::from_seconds(-1.0).is_err());
        assert!(AnimationTime::from_seconds(f64::NAN).is_err());
        assert!(AnimationTime::from_seconds(f64::INFINITY).is_err());
    }

    #[test]
    fn arithmetic_saturates() {
        let a = AnimationTime::from_seconds(1.0).unwrap();
        let b = AnimationTime::from_seconds(3.0).unwrap();
        assert_eq!((a - b), AnimationTime::zero());
        assert_eq!((b - a).as_seconds(), 2.0);
    }

    #[test]
    fn epsilon_identity() {
        let a = AnimationTime::from_seconds(1.0).unwrap();
        let b = AnimationTime::from_seconds(1.0005).unwrap();
        let c = AnimationTime::from_seconds(1.002).unwrap();
        assert!(a.approx_eq(b));
        assert!(!a.approx_eq(c));
    }

    #[test]
    fn range_normalize() {
        let range = TimeRange::new(
            AnimationTime::from_seconds(1.0).unwrap(),
            AnimationTime::from_seconds(3.0).unwrap(),
        )
        .unwrap();
        assert!(range.contains(AnimationTime::from_seconds(2.0).unwrap()));
        assert_eq!(range.normalize(AnimationTime::from_seconds(2.0).unwrap()), 0.5);
    }
}
