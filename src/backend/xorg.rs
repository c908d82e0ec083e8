// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! X11 backend driving xrandr, xinput and xbacklight.
//!
//! Commands are spawned directly with argument vectors, never through a
//! shell, so device names need no quoting.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::DisplayBackend;
use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::orientation::{Rotation, TransformMatrix};

/// xinput property holding the coordinate transform.
pub const TRANSFORM_PROPERTY: &str = "Coordinate Transformation Matrix";

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
        }
    }
}

/// Backend for X11 sessions
pub struct XorgBackend {
    output: String,
    xrandr: String,
    xinput: String,
    xbacklight: String,
}

impl XorgBackend {
    pub fn new(config: &BackendConfig, output: &str) -> Self {
        Self {
            output: output.to_string(),
            xrandr: config.xrandr.clone(),
            xinput: config.xinput.clone(),
            xbacklight: config.xbacklight.clone(),
        }
    }

    /// `xrandr --output <output> --rotate <rotation>`
    pub fn rotation_command(&self, rotation: Rotation) -> CommandSpec {
        CommandSpec::new(
            &self.xrandr,
            vec![
                "--output".to_string(),
                self.output.clone(),
                "--rotate".to_string(),
                rotation.as_str().to_string(),
            ],
        )
    }

    /// `xinput set-prop <device> "Coordinate Transformation Matrix" <m0> .. <m8>`
    pub fn transform_command(&self, device: &str, matrix: &TransformMatrix) -> CommandSpec {
        let mut args = vec![
            "set-prop".to_string(),
            device.to_string(),
            TRANSFORM_PROPERTY.to_string(),
        ];
        args.extend(matrix.to_args());
        CommandSpec::new(&self.xinput, args)
    }

    /// `xbacklight -set <level>`
    pub fn backlight_command(&self, level: f64) -> CommandSpec {
        CommandSpec::new(
            &self.xbacklight,
            vec!["-set".to_string(), format!("{:.6}", level)],
        )
    }

    async fn run(&self, spec: CommandSpec) -> Result<()> {
        debug!("Running {} {}", spec.program, spec.args.join(" "));

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| BackendError::Spawn {
                program: spec.program.clone(),
                message: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(BackendError::CommandFailed {
                program: spec.program,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl DisplayBackend for XorgBackend {
    fn name(&self) -> &str {
        "xorg"
    }

    async fn set_rotation(&self, rotation: Rotation) -> Result<()> {
        self.run(self.rotation_command(rotation)).await
    }

    async fn set_device_transform(&self, device: &str, matrix: &TransformMatrix) -> Result<()> {
        self.run(self.transform_command(device, matrix)).await
    }

    async fn set_backlight(&self, level: f64) -> Result<()> {
        self.run(self.backlight_command(level)).await
    }
}
