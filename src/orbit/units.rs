//! Display units and the SI request payload.
//!
//! Users enter distances in a rounded "astronomical unit" of exactly
//! 1×10¹¹ m and velocities in km/s. The prediction service expects meters
//! and meters per second. Conversion goes through `uom` quantities so the
//! velocity scaling is checked dimensionally.
//!
//! Input is parsed but not validated: a non-numeric field becomes `NaN`
//! (or an absent step count) and travels to the service unchanged.

use serde::{Deserialize, Serialize};
use uom::si::f64::{Length, Velocity};
use uom::si::length::meter;
use uom::si::velocity::{kilometer_per_second, meter_per_second};

/// Meters per display distance unit.
///
/// A rounded astronomical unit, not the IAU value.
pub const METERS_PER_DISPLAY_UNIT: f64 = 1e11;

/// Raw form values as entered by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayInput {
    /// Initial x position (display AU).
    pub x: String,
    /// Initial y position (display AU).
    pub y: String,
    /// Initial x velocity (km/s).
    pub vx: String,
    /// Initial y velocity (km/s).
    pub vy: String,
    /// Number of integration steps.
    pub steps: String,
}

impl DisplayInput {
    /// Create input from form values.
    #[must_use]
    pub fn new(
        x: impl Into<String>,
        y: impl Into<String>,
        vx: impl Into<String>,
        vy: impl Into<String>,
        steps: impl Into<String>,
    ) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            vx: vx.into(),
            vy: vy.into(),
            steps: steps.into(),
        }
    }

    /// Earth-like circular orbit: 1 AU out, 29.78 km/s prograde, 365 steps.
    #[must_use]
    pub fn earth_like() -> Self {
        Self::new("1.0", "0.0", "0.0", "29.78", "365")
    }

    /// Build the SI request payload.
    #[must_use]
    pub fn to_request(&self) -> SimulationRequest {
        SimulationRequest::from_display(
            parse_magnitude(&self.x),
            parse_magnitude(&self.y),
            parse_magnitude(&self.vx),
            parse_magnitude(&self.vy),
            parse_steps(&self.steps),
        )
    }
}

impl Default for DisplayInput {
    fn default() -> Self {
        Self::earth_like()
    }
}

/// Initial physical state sent to the prediction service (SI units).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    /// Position x (m).
    pub x: f64,
    /// Position y (m).
    pub y: f64,
    /// Velocity x (m/s).
    pub vx: f64,
    /// Velocity y (m/s).
    pub vy: f64,
    /// Step count; `None` when the entered value was not a number.
    pub steps: Option<u32>,
}

impl SimulationRequest {
    /// Convert display magnitudes (AU, km/s) to SI.
    #[must_use]
    pub fn from_display(x_au: f64, y_au: f64, vx_kms: f64, vy_kms: f64, steps: Option<u32>) -> Self {
        Self {
            x: display_distance(x_au).get::<meter>(),
            y: display_distance(y_au).get::<meter>(),
            vx: display_velocity(vx_kms).get::<meter_per_second>(),
            vy: display_velocity(vy_kms).get::<meter_per_second>(),
            steps,
        }
    }

    /// Whether every field survived parsing.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.vx.is_finite()
            && self.vy.is_finite()
            && self.steps.is_some()
    }
}

/// Display distance (AU) as a length.
#[must_use]
pub fn display_distance(au: f64) -> Length {
    Length::new::<meter>(au * METERS_PER_DISPLAY_UNIT)
}

/// Display velocity (km/s) as a velocity.
#[must_use]
pub fn display_velocity(kms: f64) -> Velocity {
    Velocity::new::<kilometer_per_second>(kms)
}

/// Parse a real-valued form field; anything unparsable is `NaN`.
#[must_use]
pub fn parse_magnitude(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}

/// Parse the step count the way `parseInt` would.
///
/// Only the leading `[+-]?digits` prefix counts, so `"12abc"` is 12 and
/// `"1e3"` is 1. Negative counts and values past `u32::MAX` are absent,
/// as is text with no leading digits.
#[must_use]
pub fn parse_steps(text: &str) -> Option<u32> {
    let text = text.trim();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    let steps: u32 = rest[..end].parse().ok()?;
    (!negative || steps == 0).then_some(steps)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Distance scaling is linear in the display value.
        #[test]
        fn prop_distance_linear(au in -50.0f64..50.0) {
            let req = SimulationRequest::from_display(au, au, 0.0, 0.0, Some(1));
            let expected = au * METERS_PER_DISPLAY_UNIT;
            prop_assert!((req.x - expected).abs() <= expected.abs() * 1e-12 + 1e-9);
            prop_assert!((req.x - req.y).abs() < 1e-9);
        }

        /// Velocity scaling is a factor of one thousand.
        #[test]
        fn prop_velocity_times_thousand(kms in -100.0f64..100.0) {
            let req = SimulationRequest::from_display(0.0, 0.0, kms, -kms, Some(1));
            prop_assert!((req.vx - kms * 1000.0).abs() <= kms.abs() * 1e-12 + 1e-9);
            prop_assert!((req.vx + req.vy).abs() < 1e-9);
        }

        /// Integer step counts round-trip through the text field.
        #[test]
        fn prop_steps_parse(steps in 0u32..1_000_000) {
            prop_assert_eq!(parse_steps(&steps.to_string()), Some(steps));
        }
    }
}
