//! Identifiers for clips, tracks, and keyframes.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! animation_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random id.
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse the canonical hyphenated form.
            pub fn parse(s: impl AsRef<str>) -> Option<Self> {
                Uuid::parse_str(s.as_ref()).ok().map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

animation_id!(
    /// Unique identifier of an animation clip.
    ClipId
);
animation_id!(
    /// Unique identifier of a track within a clip.
    TrackId
);
animation_id!(
    /// Unique identifier of a keyframe within a track.
    KeyframeId
);
