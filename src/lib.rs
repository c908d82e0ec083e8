// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Autorotate - sensor-driven display daemon.
//!
//! Watches iio-sensor-proxy on the system bus and turns its readings into
//! display actions: screen rotation, pen/touch coordinate remapping and
//! backlight level.
//!
//! Architecture highlights:
//! - `brightness`, `orientation`: pure mappings from readings to actions
//! - `sensor`: sensor-service types plus the D-Bus proxy and name watcher
//! - `session`: claim lifecycle against the sensor service
//! - `dispatcher`: turns property-change batches into backend calls
//! - `backend`: the display/input/backlight executors
//! - `daemon`: the single event loop tying the above together

pub mod backend;
pub mod brightness;
pub mod cli;
pub mod config;
pub mod daemon;
pub mod dispatcher;
pub mod error;
pub mod orientation;
pub mod sensor;
pub mod session;

pub use error::{AutorotateError, Result};
