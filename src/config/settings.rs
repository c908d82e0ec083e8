// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for Autorotate
//!
//! Handles loading and saving settings from ~/.config/autorotate/config.toml

use serde::{Deserialize, Serialize};

mod io;
mod validation;

pub use io::CONFIG_ENV;

/// Main settings structure, stored in ~/.config/autorotate/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Sensor service connection and claims
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Display output and input devices to transform
    #[serde(default)]
    pub display: DisplayConfig,

    /// Backlight curve parameters
    #[serde(default)]
    pub backlight: BacklightConfig,

    /// Action executor selection
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Which message bus the sensor service lives on
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusKind {
    #[default]
    System,
    Session,
}

/// Sensor service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SensorConfig {
    /// Bus to connect to
    #[serde(default)]
    pub bus: BusKind,

    /// Well-known bus name of the sensor service
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Object path of the sensor interface
    #[serde(default = "default_object_path")]
    pub object_path: String,

    /// Claim the accelerometer when the service appears
    #[serde(default = "default_true")]
    pub claim_accelerometer: bool,

    /// Claim the ambient light sensor when the service appears
    #[serde(default = "default_true")]
    pub claim_light: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            bus: BusKind::System,
            service_name: default_service_name(),
            object_path: default_object_path(),
            claim_accelerometer: true,
            claim_light: true,
        }
    }
}

/// Display and input device configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Output rotated on orientation changes
    #[serde(default = "default_output")]
    pub output: String,

    /// Input devices that receive the coordinate transform
    #[serde(default = "default_devices")]
    pub devices: Vec<String>,

    /// Apply the current orientation and light level right after claiming
    #[serde(default)]
    pub apply_on_claim: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            devices: default_devices(),
            apply_on_claim: false,
        }
    }
}

/// Backlight curve configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BacklightConfig {
    /// Setpoint at zero brightness
    #[serde(default = "default_lower")]
    pub lower: f64,

    /// Highest setpoint the device accepts
    #[serde(default = "default_upper")]
    pub upper: f64,

    /// Setpoint span for normalized brightness 0..1
    #[serde(default = "default_scale")]
    pub scale: f64,

    /// Clamp setpoints into [lower, upper]
    #[serde(default = "default_true")]
    pub clamp: bool,
}

impl Default for BacklightConfig {
    fn default() -> Self {
        Self {
            lower: default_lower(),
            upper: default_upper(),
            scale: default_scale(),
            clamp: true,
        }
    }
}

/// Backend implementation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// xrandr / xinput / xbacklight
    #[default]
    Xorg,
    /// Log actions without running anything
    DryRun,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_xrandr")]
    pub xrandr: String,

    #[serde(default = "default_xinput")]
    pub xinput: String,

    #[serde(default = "default_xbacklight")]
    pub xbacklight: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Xorg,
            xrandr: default_xrandr(),
            xinput: default_xinput(),
            xbacklight: default_xbacklight(),
        }
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_service_name() -> String {
    "net.hadess.SensorProxy".to_string()
}

fn default_object_path() -> String {
    "/net/hadess/SensorProxy".to_string()
}

fn default_output() -> String {
    "eDP1".to_string()
}

fn default_devices() -> Vec<String> {
    vec![
        "Atmel".to_string(),
        "Wacom ISDv4 12C Pen stylus".to_string(),
        "Wacom ISDv4 12C Pen eraser".to_string(),
    ]
}

fn default_lower() -> f64 {
    crate::brightness::LOWER_BACKLIGHT
}

fn default_upper() -> f64 {
    crate::brightness::UPPER_BACKLIGHT
}

fn default_scale() -> f64 {
    crate::brightness::BACKLIGHT_SCALE
}

fn default_xrandr() -> String {
    "xrandr".to_string()
}

fn default_xinput() -> String {
    "xinput".to_string()
}

fn default_xbacklight() -> String {
    "xbacklight".to_string()
}
