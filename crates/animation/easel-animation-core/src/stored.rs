//! The serialized animation envelope exchanged with the persistence layer.
//!
//! Wire shape: `{ "version": "1.0", "clips": [...], "activeClipId": ... }`
//! with clip timestamps as ISO-8601 UTC strings. Clips store unix seconds
//! internally; the conversion lives here so the rest of the crate never
//! sees calendar math.

use crate::clip::{AnimationClip, PlayMode};
use crate::error::AnimationError;
use crate::ids::ClipId;
use crate::time::AnimationTime;
use crate::track::AnimationTrack;
use serde::{Deserialize, Serialize};

/// Envelope format version this crate reads and writes.
pub const ENVELOPE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnimationSet {
    pub version: String,
    pub clips: Vec<StoredClip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_clip_id: Option<ClipId>,
}

impl StoredAnimationSet {
    /// Parse an envelope from JSON, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, AnimationError> {
        let set: StoredAnimationSet = serde_json::from_str(json)?;
        if set.version != ENVELOPE_VERSION {
            return Err(AnimationError::Serialization {
                reason: format!("unsupported animation data version: {}", set.version),
            });
        }
        Ok(set)
    }

    pub fn to_json(&self) -> Result<String, AnimationError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredClip {
    pub id: ClipId,
    pub name: String,
    /// Seconds.
    pub duration: f64,
    pub fps: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub loop_count: i32,
    pub play_mode: PlayMode,
    pub enabled: bool,
    pub reset_on_complete: bool,
    pub tracks: Vec<AnimationTrack>,
    /// ISO-8601 UTC, e.g. "2024-03-01T12:30:00Z".
    pub created_at: String,
    pub updated_at: String,
}

impl StoredClip {
    pub fn from_clip(clip: &AnimationClip) -> Self {
        Self {
            id: clip.id,
            name: clip.name.clone(),
            duration: clip.duration.as_seconds(),
            fps: clip.fps,
            looping: clip.looping,
            loop_count: clip.loop_count,
            play_mode: clip.play_mode,
            enabled: clip.enabled,
            reset_on_complete: clip.reset_on_complete,
            tracks: clip.tracks.clone(),
            created_at: unix_to_iso8601(clip.created_at),
            updated_at: unix_to_iso8601(clip.updated_at),
        }
    }

    pub fn into_clip(self) -> Result<AnimationClip, AnimationError> {
        let created_at =
            iso8601_to_unix(&self.created_at).ok_or_else(|| AnimationError::Serialization {
                reason: format!("invalid createdAt timestamp: {}", self.created_at),
            })?;
        let updated_at =
            iso8601_to_unix(&self.updated_at).ok_or_else(|| AnimationError::Serialization {
                reason: format!("invalid updatedAt timestamp: {}", self.updated_at),
            })?;
        let duration = AnimationTime::from_seconds(self.duration).map_err(|_| {
            AnimationError::Serialization {
                reason: format!("invalid clip duration: {}", self.duration),
            }
        })?;
        Ok(AnimationClip {
            id: self.id,
            name: self.name,
            duration,
            fps: self.fps,
            looping: self.looping,
            loop_count: self.loop_count,
            play_mode: self.play_mode,
            enabled: self.enabled,
            reset_on_complete: self.reset_on_complete,
            tracks: self.tracks,
            created_at,
            updated_at,
        })
    }
}

// ---- calendar conversion -----------------------------------------------
//
// Unix seconds <-> "YYYY-MM-DDTHH:MM:SSZ". Days-from-civil and back, via
// the era/day-of-era decomposition (four-century cycles of 146097 days).

/// Format unix seconds as an ISO-8601 UTC timestamp.
pub fn unix_to_iso8601(seconds: u64) -> String {
    let days = (seconds / 86_400) as i64;
    let secs_of_day = seconds % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

/// Parse an ISO-8601 UTC timestamp ("YYYY-MM-DDTHH:MM:SSZ", optional
/// fractional seconds) back to unix seconds. `None` for anything else.
pub fn iso8601_to_unix(s: &str) -> Option<u64> {
    let s = s.strip_suffix('Z')?;
    let (date, time) = s.split_once('T')?;

    let mut date_parts = date.split('-');
    let year: i64 = date_parts.next()?.parse().ok()?;
    let month: u64 = date_parts.next()?.parse().ok()?;
    let day: u64 = date_parts.next()?.parse().ok()?;
    if date_parts.next().is_some() || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    // Fractional seconds are tolerated and truncated.
    let time = time.split('.').next()?;
    let mut time_parts = time.split(':');
    let hour: u64 = time_parts.next()?.parse().ok()?;
    let minute: u64 = time_parts.next()?.parse().ok()?;
    let second: u64 = time_parts.next()?.parse().ok()?;
    if time_parts.next().is_some() || hour > 23 || minute > 59 || second > 60 {
        return None;
    }

    let days = days_from_civil(year, month as i64, day as i64);
    if days < 0 {
        return None;
    }
    Some(days as u64 * 86_400 + hour * 3600 + minute * 60 + second)
}

fn civil_from_days(days: i64) -> (i64, u64, u64) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u64;
    let m = (if mp < 10 { mp + 3 } else { mp - 9 }) as u64;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = y.div_euclid(400);
    let yoe = y.rem_euclid(400);
    let doy = (153 * (if month > 2 { month - 3 } else { month + 9 }) + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_formats_as_expected() {
        assert_eq!(unix_to_iso8601(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn known_timestamp_round_trips() {
        // 2024-03-01T12:30:45Z
        let seconds = 1_709_296_245;
        let iso = unix_to_iso8601(seconds);
        assert_eq!(iso, "2024-03-01T12:30:45Z");
        assert_eq!(iso8601_to_unix(&iso), Some(seconds));
    }

    #[test]
    fn fractional_seconds_are_truncated() {
        assert_eq!(
            iso8601_to_unix("1970-01-01T00:00:01.500Z"),
            Some(1)
        );
    }

    #[test]
    fn malformed_timestamps_rejected() {
        assert_eq!(iso8601_to_unix("not-a-date"), None);
        assert_eq!(iso8601_to_unix("1970-01-01 00:00:00"), None);
        assert_eq!(iso8601_to_unix("1970-13-01T00:00:00Z"), None);
    }

    #[test]
    fn leap_year_round_trip() {
        for &seconds in &[951_782_400u64, 1_582_934_400, 4_107_542_399] {
            let iso = unix_to_iso8601(seconds);
            assert_eq!(iso8601_to_unix(&iso), Some(seconds), "at {iso}");
        }
    }

    #[test]
    fn envelope_version_is_checked() {
        let json = r#"{"version":"2.0","clips":[]}"#;
        assert!(StoredAnimationSet::from_json(json).is_err());
        let json = r#"{"version":"1.0","clips":[]}"#;
        let set = StoredAnimationSet::from_json(json).unwrap();
        assert!(set.clips.is_empty());
        assert_eq!(set.active_clip_id, None);
    }

    #[test]
    fn clip_round_trips_through_stored_form() {
        let clip = AnimationClip::new("walk", 2.0);
        let stored = StoredClip::from_clip(&clip);
        let back = stored.into_clip().unwrap();
        assert_eq!(back.id, clip.id);
        assert_eq!(back.name, clip.name);
        assert_eq!(back.duration, clip.duration);
        assert_eq!(back.created_at, clip.created_at);
        assert_eq!(back.updated_at, clip.updated_at);
    }
}
