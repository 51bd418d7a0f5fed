//! Easing curves for tweening between keyframes

use std::{f32::consts::PI, fmt, str::FromStr};

/// Interpolation curve between two keyframe values
///
/// `None` disables tweening: the controller snaps from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Easing {
    #[default]
    None,
    Sine,
    Quad,
    Cubic,
    Quart,
    Exponential,
    Circular,
    Back,
}

const BACK_OVERSHOOT: f32 = 1.70158;

impl Easing {
    pub const ALL: [Easing; 8] = [
        Easing::None,
        Easing::Sine,
        Easing::Quad,
        Easing::Cubic,
        Easing::Quart,
        Easing::Exponential,
        Easing::Circular,
        Easing::Back,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Easing::None => "None",
            Easing::Sine => "Sine",
            Easing::Quad => "Quad",
            Easing::Cubic => "Cubic",
            Easing::Quart => "Quart",
            Easing::Exponential => "Exponential",
            Easing::Circular => "Circular",
            Easing::Back => "Back",
        }
    }

    pub fn is_tweening(self) -> bool {
        self != Easing::None
    }

    /// Eased progress for linear progress `t` in `[0, 1]`
    pub fn curve(self, t: f32) -> f32 {
        match self {
            Easing::None => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Easing::Sine => 1.0 - (t * PI / 2.0).cos(),
            Easing::Quad => t * t,
            Easing::Cubic => t * t * t,
            Easing::Quart => t * t * t * t,
            Easing::Exponential => {
                if t <= 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * (t - 1.0))
                }
            }
            Easing::Circular => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Easing::Back => (BACK_OVERSHOOT + 1.0) * t * t * t - BACK_OVERSHOOT * t * t,
        }
    }

    /// Value between `start` and `end` at progress `t`
    ///
    /// `t <= 0` yields `start` and `t >= 1` yields `end` exactly.
    pub fn ease(self, start: f32, end: f32, t: f32) -> f32 {
        if t <= 0.0 {
            return start;
        }
        if t >= 1.0 {
            return end;
        }
        start + (end - start) * self.curve(t)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown easing '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_are_exact() {
        for easing in Easing::ALL {
            for (start, end) in [(0.0, 1.0), (-40.0, 250.0), (3.5, -3.5)] {
                assert_eq!(easing.ease(start, end, 0.0), start, "{} at 0", easing);
                assert_eq!(easing.ease(start, end, 1.0), end, "{} at 1", easing);
            }
        }
    }

    #[test]
    fn test_curves_reach_their_ends() {
        for easing in Easing::ALL.into_iter().filter(|e| e.is_tweening()) {
            assert!(easing.curve(0.0).abs() < 1e-6, "{}", easing);
            assert!((easing.curve(1.0) - 1.0).abs() < 1e-6, "{}", easing);
        }
    }

    #[test]
    fn test_midpoints() {
        assert_eq!(Easing::Quad.ease(0.0, 100.0, 0.5), 25.0);
        assert_eq!(Easing::Cubic.ease(0.0, 8.0, 0.5), 1.0);
        // back overshoots below the start early on
        assert!(Easing::Back.ease(0.0, 1.0, 0.2) < 0.0);
        assert_eq!(Easing::None.ease(1.0, 2.0, 0.99), 1.0);
    }

    #[test]
    fn test_names_roundtrip() {
        for easing in Easing::ALL {
            assert_eq!(easing.to_string().parse::<Easing>(), Ok(easing));
        }
        assert_eq!("sine".parse::<Easing>(), Ok(Easing::Sine));
        assert!("Elastic".parse::<Easing>().is_err());
    }
}
