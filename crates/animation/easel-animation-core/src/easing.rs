//! Named easing curves applied to segment-local interpolation parameters.
//!
//! Each curve maps t in [0, 1] to an eased parameter. Curves outside the
//! monotonic families (back, elastic) may overshoot [0, 1]; callers blend
//! with the eased parameter as-is.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::f64::consts::PI;
use std::fmt;

/// The easing vocabulary exposed on keyframes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Easing {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    BackIn,
    BackOut,
    BackInOut,
    ElasticOut,
    BounceOut,
}

impl Easing {
    /// Every named curve.
    pub const ALL: [Easing; 27] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticOut,
        Easing::BounceOut,
    ];

    /// The curve's wire name.
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::QuadIn => "easeInQuad",
            Easing::QuadOut => "easeOutQuad",
            Easing::QuadInOut => "easeInOutQuad",
            Easing::CubicIn => "easeInCubic",
            Easing::CubicOut => "easeOutCubic",
            Easing::CubicInOut => "easeInOutCubic",
            Easing::QuartIn => "easeInQuart",
            Easing::QuartOut => "easeOutQuart",
            Easing::QuartInOut => "easeInOutQuart",
            Easing::QuintIn => "easeInQuint",
            Easing::QuintOut => "easeOutQuint",
            Easing::QuintInOut => "easeInOutQuint",
            Easing::SineIn => "easeInSine",
            Easing::SineOut => "easeOutSine",
            Easing::SineInOut => "easeInOutSine",
            Easing::ExpoIn => "easeInExpo",
            Easing::ExpoOut => "easeOutExpo",
            Easing::ExpoInOut => "easeInOutExpo",
            Easing::CircIn => "easeInCirc",
            Easing::CircOut => "easeOutCirc",
            Easing::CircInOut => "easeInOutCirc",
            Easing::BackIn => "easeInBack",
            Easing::BackOut => "easeOutBack",
            Easing::BackInOut => "easeInOutBack",
            Easing::ElasticOut => "easeOutElastic",
            Easing::BounceOut => "easeOutBounce",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.name() == s)
    }

    /// Apply the curve to t, clamped to [0, 1] on input.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => in_out(t, |t| t * t),
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => in_out(t, |t| t * t * t),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, |t| t.powi(4)),
            Easing::QuintIn => t.powi(5),
            Easing::QuintOut => 1.0 - (1.0 - t).powi(5),
            Easing::QuintInOut => in_out(t, |t| t.powi(5)),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    (2.0f64).powf(10.0 * t - 10.0)
                }
            }
            Easing::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - (2.0f64).powf(-10.0 * t)
                }
            }
            Easing::ExpoInOut => in_out(t, |t| {
                if t == 0.0 {
                    0.0
                } else {
                    (2.0f64).powf(10.0 * t - 10.0)
                }
            }),
            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::CircInOut => in_out(t, |t| 1.0 - (1.0 - t * t).sqrt()),
            Easing::BackIn => back_in(t),
            Easing::BackOut => 1.0 - back_in(1.0 - t),
            Easing::BackInOut => in_out(t, back_in),
            Easing::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    (2.0f64).powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Easing::BounceOut => bounce_out(t),
        }
    }
}

/// Mirror an ease-in curve into an in-out curve.
fn in_out(t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 * (1.0 - t)) / 2.0
    }
}

fn back_in(t: f64) -> f64 {
    const C1: f64 = 1.70158;
    const C3: f64 = C1 + 1.0;
    C3 * t * t * t - C1 * t * t
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Easing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Easing::parse(&s).ok_or_else(|| de::Error::custom(format!("unknown easing curve: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn curve_table_is_complete_and_round_trips() {
        assert_eq!(Easing::ALL.len(), 27);
        for e in Easing::ALL {
            assert_eq!(Easing::parse(e.name()), Some(e));
        }
    }

    #[test]
    fn endpoints_are_fixed() {
        for e in Easing::ALL {
            assert_relative_eq!(e.apply(0.0), 0.0, epsilon = 1e-9);
            assert_relative_eq!(e.apply(1.0), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_is_identity() {
        assert_eq!(Easing::Linear.apply(0.25), 0.25);
        assert_eq!(Easing::Linear.apply(0.5), 0.5);
    }

    #[test]
    fn quad_shapes() {
        assert_relative_eq!(Easing::QuadIn.apply(0.5), 0.25);
        assert_relative_eq!(Easing::QuadOut.apply(0.5), 0.75);
        assert_relative_eq!(Easing::QuadInOut.apply(0.5), 0.5);
    }

    #[test]
    fn back_overshoots() {
        // easeOutBack rises above 1 inside the segment.
        assert!(Easing::BackOut.apply(0.8) > 1.0);
    }
}
