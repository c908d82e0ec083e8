// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for Autorotate
//!
//! This module defines all error types used throughout the daemon.

use thiserror::Error;

use crate::sensor::SensorCapability;

/// Main error type for Autorotate operations
#[derive(Error, Debug)]
pub enum AutorotateError {
    /// Sensor service errors
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),

    /// Display/input/backlight backend errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// Message bus errors outside of a sensor call
    #[error("Bus error: {0}")]
    Bus(String),
}

/// Sensor-service specific error types
#[derive(Error, Debug)]
pub enum SensorError {
    /// The service refused or failed a claim
    #[error("Failed to claim {capability}: {message}")]
    ClaimFailed {
        capability: SensorCapability,
        message: String,
    },

    /// The call was abandoned because the daemon is shutting down
    #[error("Sensor call cancelled")]
    Cancelled,

    /// No connection to the sensor service
    #[error("Sensor service not connected")]
    Disconnected,

    /// A property carried a value of the wrong type
    #[error("Invalid value for property {0}")]
    InvalidProperty(String),

    /// Any other failure talking to the service
    #[error("Sensor call failed: {0}")]
    Call(String),
}

/// Backend (action executor) error types
#[derive(Error, Debug)]
pub enum BackendError {
    /// External program could not be started
    #[error("Failed to run {program}: {message}")]
    Spawn { program: String, message: String },

    /// External program exited unsuccessfully
    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },
}

impl AutorotateError {
    /// Whether this error is a cancellation caused by shutdown.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AutorotateError::Sensor(SensorError::Cancelled))
    }
}

/// Result type alias for Autorotate operations
pub type Result<T> = std::result::Result<T, AutorotateError>;

impl From<toml::de::Error> for AutorotateError {
    fn from(err: toml::de::Error) -> Self {
        AutorotateError::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for AutorotateError {
    fn from(err: toml::ser::Error) -> Self {
        AutorotateError::Toml(err.to_string())
    }
}

impl From<zbus::Error> for AutorotateError {
    fn from(err: zbus::Error) -> Self {
        AutorotateError::Bus(err.to_string())
    }
}

impl From<zbus::fdo::Error> for AutorotateError {
    fn from(err: zbus::fdo::Error) -> Self {
        AutorotateError::Bus(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_failed_message() {
        let err = SensorError::ClaimFailed {
            capability: SensorCapability::Accelerometer,
            message: "access denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to claim accelerometer: access denied"
        );
    }

    #[test]
    fn test_claim_failed_light_message() {
        let err = SensorError::ClaimFailed {
            capability: SensorCapability::AmbientLight,
            message: "no sensor".to_string(),
        };
        assert!(err.to_string().contains("light sensor"));
    }

    #[test]
    fn test_cancelled_is_cancelled() {
        let err: AutorotateError = SensorError::Cancelled.into();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_claim_failed_is_not_cancelled() {
        let err: AutorotateError = SensorError::ClaimFailed {
            capability: SensorCapability::AmbientLight,
            message: "boom".to_string(),
        }
        .into();
        assert!(!err.is_cancelled());
        assert!(err.to_string().contains("Sensor error"));
    }

    #[test]
    fn test_backend_command_failed() {
        let err = BackendError::CommandFailed {
            program: "xrandr".to_string(),
            status: 1,
            stderr: "cannot find output".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("xrandr"));
        assert!(msg.contains("cannot find output"));
    }

    #[test]
    fn test_config_error() {
        let err = AutorotateError::Config("bad config".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AutorotateError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let err: AutorotateError = toml_err.into();
        assert!(err.to_string().contains("TOML error"));
    }
}
