// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::collections::HashSet;

use crate::error::{AutorotateError, Result};

use super::Settings;

impl Settings {
    /// Check the settings for values the daemon cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.sensor.service_name.trim().is_empty() {
            return Err(invalid("sensor.service_name must not be empty"));
        }
        if !self.sensor.object_path.starts_with('/') {
            return Err(invalid(format!(
                "sensor.object_path must be absolute, got '{}'",
                self.sensor.object_path
            )));
        }
        if self.display.output.trim().is_empty() {
            return Err(invalid("display.output must not be empty"));
        }

        let mut seen = HashSet::new();
        for device in &self.display.devices {
            if device.trim().is_empty() {
                return Err(invalid("display.devices must not contain empty names"));
            }
            if !seen.insert(device.as_str()) {
                return Err(invalid(format!("duplicate device '{}'", device)));
            }
        }

        let backlight = &self.backlight;
        if !backlight.lower.is_finite() || !backlight.upper.is_finite() {
            return Err(invalid("backlight bounds must be finite"));
        }
        if backlight.lower >= backlight.upper {
            return Err(invalid(format!(
                "backlight.lower ({}) must be below backlight.upper ({})",
                backlight.lower, backlight.upper
            )));
        }
        if !(backlight.scale > 0.0 && backlight.scale.is_finite()) {
            return Err(invalid("backlight.scale must be positive"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> AutorotateError {
    AutorotateError::Config(msg.into())
}
