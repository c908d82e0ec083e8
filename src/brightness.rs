// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Lux to backlight conversion.
//!
//! The curve follows the Windows ambient light guidance: perceived
//! brightness grows with the logarithm of illuminance, reaching 1.0 at
//! roughly 100k lux (direct sunlight).

use tracing::warn;

use crate::config::BacklightConfig;

/// Lowest backlight level the panel is usable at.
pub const LOWER_BACKLIGHT: f64 = 6.0;

/// Highest backlight level accepted by the panel.
pub const UPPER_BACKLIGHT: f64 = 100.0;

/// Span added on top of `LOWER_BACKLIGHT` at full brightness.
pub const BACKLIGHT_SCALE: f64 = 10.0;

/// The only light unit the curve understands.
pub const LUX: &str = "lux";

/// Normalized perceptual brightness for a light reading.
///
/// Returns 0.0 for any unit other than `"lux"`.
pub fn brightness(level: f64, unit: &str) -> f64 {
    if unit != LUX {
        warn!("Unknown unit: {}", unit);
        return 0.0;
    }
    (level + 1.0).log10() / 5.0
}

/// Maps normalized brightness onto the backlight device range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacklightCurve {
    lower: f64,
    upper: f64,
    scale: f64,
    clamp: bool,
}

impl Default for BacklightCurve {
    fn default() -> Self {
        Self {
            lower: LOWER_BACKLIGHT,
            upper: UPPER_BACKLIGHT,
            scale: BACKLIGHT_SCALE,
            clamp: true,
        }
    }
}

impl From<&BacklightConfig> for BacklightCurve {
    fn from(config: &BacklightConfig) -> Self {
        Self {
            lower: config.lower,
            upper: config.upper,
            scale: config.scale,
            clamp: config.clamp,
        }
    }
}

impl BacklightCurve {
    /// Backlight setpoint for a normalized brightness value.
    ///
    /// Clamping is skipped when the bounds are inverted or NaN.
    pub fn setpoint(&self, brightness: f64) -> f64 {
        let level = brightness * self.scale + self.lower;
        if self.clamp && self.lower <= self.upper {
            level.clamp(self.lower, self.upper)
        } else {
            level
        }
    }

    /// Backlight setpoint straight from a light reading.
    pub fn setpoint_for(&self, level: f64, unit: &str) -> f64 {
        self.setpoint(brightness(level, unit))
    }
}
