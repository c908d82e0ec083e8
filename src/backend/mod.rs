// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Display backends
//!
//! A backend carries out the actions derived from sensor readings:
//! rotating the output, remapping input device coordinates and setting
//! the backlight.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendKind, Settings};
use crate::error::Result;
use crate::orientation::{Rotation, TransformMatrix};

pub mod dry_run;
pub mod xorg;

pub use dry_run::DryRunBackend;
pub use xorg::XorgBackend;

/// Executes display actions
#[async_trait]
pub trait DisplayBackend: Send + Sync {
    /// Backend name for logs (e.g., "xorg")
    fn name(&self) -> &str;

    /// Rotate the primary display output
    async fn set_rotation(&self, rotation: Rotation) -> Result<()>;

    /// Set an input device's coordinate transformation matrix
    async fn set_device_transform(&self, device: &str, matrix: &TransformMatrix) -> Result<()>;

    /// Set the absolute backlight level
    async fn set_backlight(&self, level: f64) -> Result<()>;
}

/// Factory for creating display backends
pub struct BackendFactory;

impl BackendFactory {
    /// Create the backend selected in `settings`
    pub fn create(settings: &Settings) -> Arc<dyn DisplayBackend> {
        match settings.backend.kind {
            BackendKind::Xorg => Arc::new(XorgBackend::new(
                &settings.backend,
                &settings.display.output,
            )),
            BackendKind::DryRun => Arc::new(DryRunBackend::new(&settings.display.output)),
        }
    }
}
