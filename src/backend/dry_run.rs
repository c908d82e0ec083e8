// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend that only logs what it would do.

use async_trait::async_trait;
use tracing::info;

use super::DisplayBackend;
use crate::error::Result;
use crate::orientation::{Rotation, TransformMatrix};

pub struct DryRunBackend {
    output: String,
}

impl DryRunBackend {
    pub fn new(output: &str) -> Self {
        Self {
            output: output.to_string(),
        }
    }
}

#[async_trait]
impl DisplayBackend for DryRunBackend {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn set_rotation(&self, rotation: Rotation) -> Result<()> {
        info!("[dry-run] rotate {} {}", self.output, rotation);
        Ok(())
    }

    async fn set_device_transform(&self, device: &str, matrix: &TransformMatrix) -> Result<()> {
        info!("[dry-run] transform '{}' {}", device, matrix);
        Ok(())
    }

    async fn set_backlight(&self, level: f64) -> Result<()> {
        info!("[dry-run] backlight {:.6}", level);
        Ok(())
    }
}
