// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::{BackendKind, BusKind, Settings};

/// Autorotate - rotate the screen and follow ambient light from iio-sensor-proxy
#[derive(Parser, Debug, Default)]
#[command(name = "autorotate")]
#[command(version, about = "Sensor-driven screen rotation and backlight daemon")]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log actions instead of running xrandr/xinput/xbacklight
    #[arg(long)]
    pub dry_run: bool,

    /// Watch the session bus instead of the system bus
    #[arg(long)]
    pub session_bus: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if self.dry_run {
            settings.backend.kind = BackendKind::DryRun;
        }
        if self.session_bus {
            settings.sensor.bus = BusKind::Session;
        }
    }

    /// Default log directive for the requested verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
