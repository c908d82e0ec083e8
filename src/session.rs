// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Claim lifecycle against the sensor service.
//!
//! The session connects and claims when the service appears, forgets the
//! connection when it vanishes and keeps a snapshot of the sensor
//! properties up to date from the change stream. A later reappearance
//! goes through connect and claim again.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::config::SensorConfig;
use crate::error::{Result, SensorError};
use crate::sensor::{
    ChangeSet, PropertyBatch, SensorCapability, SensorConnector, SensorService, SensorSnapshot,
};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Service not on the bus
    Disconnected,
    /// Proxy established, claims not (yet) granted
    Connected,
    /// All configured capabilities claimed
    Claimed,
}

/// Owns the connection to the sensor service.
pub struct SensorSession {
    connector: Arc<dyn SensorConnector>,
    capabilities: Vec<SensorCapability>,
    state: SessionState,
    service: Option<Box<dyn SensorService>>,
    changes: Option<BoxStream<'static, PropertyBatch>>,
    claimed: Vec<SensorCapability>,
    snapshot: SensorSnapshot,
}

impl SensorSession {
    /// Create a session claiming the capabilities enabled in `config`.
    pub fn new(connector: Arc<dyn SensorConnector>, config: &SensorConfig) -> Self {
        let mut capabilities = Vec::new();
        if config.claim_accelerometer {
            capabilities.push(SensorCapability::Accelerometer);
        }
        if config.claim_light {
            capabilities.push(SensorCapability::AmbientLight);
        }
        Self::with_capabilities(connector, capabilities)
    }

    /// Create a session claiming `capabilities` in order.
    pub fn with_capabilities(
        connector: Arc<dyn SensorConnector>,
        capabilities: Vec<SensorCapability>,
    ) -> Self {
        Self {
            connector,
            capabilities,
            state: SessionState::Disconnected,
            service: None,
            changes: None,
            claimed: Vec::new(),
            snapshot: SensorSnapshot::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> &SensorSnapshot {
        &self.snapshot
    }

    /// Capabilities currently held.
    pub fn claimed(&self) -> &[SensorCapability] {
        &self.claimed
    }

    /// Handle the service appearing: connect, claim, read initial values.
    ///
    /// The first failing claim aborts the sequence; later capabilities are
    /// not attempted.
    pub async fn acquire(&mut self) -> Result<()> {
        info!("+++ iio-sensor-proxy appeared");

        // A direct owner handover arrives without a vanish in between.
        self.drop_link();

        let link = self.connector.connect().await?;
        self.service = Some(link.service);
        self.changes = Some(link.changes);
        self.state = SessionState::Connected;

        let service = self.service.as_ref().ok_or(SensorError::Disconnected)?;
        for capability in &self.capabilities {
            service.claim(*capability).await?;
            debug!("Claimed {}", capability);
            self.claimed.push(*capability);
        }

        self.snapshot = service.read_snapshot().await?;
        self.state = SessionState::Claimed;
        log_initial_values(&self.snapshot);
        Ok(())
    }

    /// Handle the service vanishing. Claims die with the service.
    pub fn forget(&mut self) {
        if self.service.is_some() {
            info!("--- iio-sensor-proxy vanished, waiting for it to appear");
        }
        self.drop_link();
    }

    /// Release held claims and disconnect.
    pub async fn release(&mut self) {
        if let Some(service) = self.service.as_ref() {
            for capability in self.claimed.iter().rev() {
                match service.release(*capability).await {
                    Ok(()) => debug!("Released {}", capability),
                    Err(err) => warn!("Failed to release {}: {}", capability, err),
                }
            }
        }
        self.drop_link();
    }

    /// Next change batch from the service.
    ///
    /// Pends forever while disconnected or after the change stream ended,
    /// so it can sit in a `select!` next to the presence stream.
    pub async fn next_batch(&mut self) -> Option<PropertyBatch> {
        let Some(changes) = self.changes.as_mut() else {
            return std::future::pending().await;
        };
        match changes.next().await {
            Some(batch) => Some(batch),
            None => {
                debug!("Sensor change stream ended");
                self.changes = None;
                None
            }
        }
    }

    /// Fold a batch into the snapshot and report what it touched.
    ///
    /// Invalidated properties trigger a full re-read from the service.
    pub async fn apply(&mut self, batch: PropertyBatch) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (property, value) in batch.changed {
            match self.snapshot.set(property, value) {
                Ok(()) => changes.insert(property),
                Err(err) => warn!("Ignoring change: {}", err),
            }
        }

        if !batch.invalidated.is_empty() {
            if let Some(service) = self.service.as_ref() {
                match service.read_snapshot().await {
                    Ok(snapshot) => {
                        self.snapshot = snapshot;
                        for property in batch.invalidated {
                            changes.insert(property);
                        }
                    }
                    Err(err) => warn!("Failed to refresh sensor values: {}", err),
                }
            }
        }

        changes
    }

    fn drop_link(&mut self) {
        self.service = None;
        self.changes = None;
        self.claimed.clear();
        self.state = SessionState::Disconnected;
    }
}

fn log_initial_values(snapshot: &SensorSnapshot) {
    if snapshot.has_accelerometer {
        info!(
            "=== Has accelerometer (orientation: {})",
            snapshot.orientation
        );
    } else {
        info!("=== No accelerometer");
    }

    if snapshot.has_ambient_light {
        info!(
            "=== Has ambient light sensor (value: {}, unit: {})",
            snapshot.light_level, snapshot.light_unit
        );
    } else {
        info!("=== No ambient light sensor");
    }
}
