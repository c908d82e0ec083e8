// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turns sensor property changes into display actions.

use std::sync::Arc;

use tracing::{info, warn};

use crate::backend::DisplayBackend;
use crate::brightness::BacklightCurve;
use crate::config::{BacklightConfig, DisplayConfig};
use crate::orientation::{map_orientation, Rotation, TransformMatrix};
use crate::sensor::{ChangeSet, SensorProperty, SensorSnapshot};

/// One call into the display backend.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayAction {
    Rotate(Rotation),
    Transform {
        device: String,
        matrix: TransformMatrix,
    },
    Backlight(f64),
}

/// Maps change batches onto backend calls.
pub struct ChangeDispatcher {
    backend: Arc<dyn DisplayBackend>,
    devices: Vec<String>,
    curve: BacklightCurve,
}

impl ChangeDispatcher {
    pub fn new(
        backend: Arc<dyn DisplayBackend>,
        display: &DisplayConfig,
        backlight: &BacklightConfig,
    ) -> Self {
        Self {
            backend,
            devices: display.devices.clone(),
            curve: BacklightCurve::from(backlight),
        }
    }

    /// Input devices receiving the coordinate transform.
    pub fn devices(&self) -> &[String] {
        &self.devices
    }

    /// Work out the actions for a batch of changes.
    ///
    /// Every category is checked; presence changes only log.
    pub fn plan(&self, changes: &ChangeSet, snapshot: &SensorSnapshot) -> Vec<DisplayAction> {
        let mut actions = Vec::new();

        if changes.contains(SensorProperty::HasAccelerometer) {
            if snapshot.has_accelerometer {
                info!("+++ Accelerometer appeared");
            } else {
                info!("--- Accelerometer disappeared");
            }
        }

        if changes.contains(SensorProperty::AccelerometerOrientation) {
            actions.extend(self.orientation_actions(&snapshot.orientation));
        }

        if changes.contains(SensorProperty::HasAmbientLight) {
            if snapshot.has_ambient_light {
                info!("+++ Light sensor appeared");
            } else {
                info!("--- Light sensor disappeared");
            }
        }

        if changes.contains(SensorProperty::LightLevel) {
            actions.push(self.light_action(snapshot.light_level, &snapshot.light_unit));
        }

        actions
    }

    /// Rotation plus one transform per device, or nothing for an unknown orientation.
    pub fn orientation_actions(&self, orientation: &str) -> Vec<DisplayAction> {
        let Some(transform) = map_orientation(orientation) else {
            warn!("Unknown orientation: {}", orientation);
            return Vec::new();
        };

        let mut actions = Vec::with_capacity(self.devices.len() + 1);
        actions.push(DisplayAction::Rotate(transform.rotation));
        actions.extend(self.devices.iter().map(|device| DisplayAction::Transform {
            device: device.clone(),
            matrix: transform.matrix,
        }));
        actions
    }

    pub fn light_action(&self, level: f64, unit: &str) -> DisplayAction {
        let setpoint = self.curve.setpoint_for(level, unit);
        info!("xbacklight -set {:.6}", setpoint);
        DisplayAction::Backlight(setpoint)
    }

    /// Plan and execute a batch. Returns the number of actions that succeeded.
    pub async fn dispatch(&self, changes: &ChangeSet, snapshot: &SensorSnapshot) -> usize {
        let actions = self.plan(changes, snapshot);
        self.execute_all(&actions).await
    }

    /// Apply whatever the snapshot currently reports, as if every present
    /// sensor had just changed.
    pub async fn apply_snapshot(&self, snapshot: &SensorSnapshot) -> usize {
        let mut actions = Vec::new();
        if snapshot.has_accelerometer {
            actions.extend(self.orientation_actions(&snapshot.orientation));
        }
        if snapshot.has_ambient_light {
            actions.push(self.light_action(snapshot.light_level, &snapshot.light_unit));
        }
        self.execute_all(&actions).await
    }

    async fn execute_all(&self, actions: &[DisplayAction]) -> usize {
        let mut succeeded = 0;
        for action in actions {
            if self.execute(action).await {
                succeeded += 1;
            }
        }
        succeeded
    }

    /// Run one action. Failures are logged and do not stop the batch.
    pub async fn execute(&self, action: &DisplayAction) -> bool {
        let result = match action {
            DisplayAction::Rotate(rotation) => self.backend.set_rotation(*rotation).await,
            DisplayAction::Transform { device, matrix } => {
                self.backend.set_device_transform(device, matrix).await
            }
            DisplayAction::Backlight(level) => self.backend.set_backlight(*level).await,
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                warn!("{} backend: {}", self.backend.name(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BackendError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend recording calls, failing rotations on request.
    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<DisplayAction>>,
        fail_rotation: bool,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<DisplayAction> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DisplayBackend for RecordingBackend {
        fn name(&self) -> &str {
            "recording"
        }

        async fn set_rotation(&self, rotation: Rotation) -> Result<()> {
            if self.fail_rotation {
                return Err(BackendError::CommandFailed {
                    program: "xrandr".to_string(),
                    status: 1,
                    stderr: "no output".to_string(),
                }
                .into());
            }
            self.calls.lock().unwrap().push(DisplayAction::Rotate(rotation));
            Ok(())
        }

        async fn set_device_transform(&self, device: &str, matrix: &TransformMatrix) -> Result<()> {
            self.calls.lock().unwrap().push(DisplayAction::Transform {
                device: device.to_string(),
                matrix: *matrix,
            });
            Ok(())
        }

        async fn set_backlight(&self, level: f64) -> Result<()> {
            self.calls.lock().unwrap().push(DisplayAction::Backlight(level));
            Ok(())
        }
    }

    fn dispatcher(backend: Arc<RecordingBackend>) -> ChangeDispatcher {
        ChangeDispatcher::new(
            backend,
            &DisplayConfig::default(),
            &BacklightConfig::default(),
        )
    }

    fn snapshot(orientation: &str, level: f64, unit: &str) -> SensorSnapshot {
        SensorSnapshot {
            has_accelerometer: true,
            orientation: orientation.to_string(),
            has_ambient_light: true,
            light_level: level,
            light_unit: unit.to_string(),
        }
    }

    fn changes(properties: &[SensorProperty]) -> ChangeSet {
        properties.iter().copied().collect()
    }

    #[test]
    fn test_plan_orientation() {
        let d = dispatcher(Arc::new(RecordingBackend::default()));
        let actions = d.plan(
            &changes(&[SensorProperty::AccelerometerOrientation]),
            &snapshot("bottom-up", 0.0, "lux"),
        );
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0], DisplayAction::Rotate(Rotation::Inverted));
        for (action, device) in actions[1..].iter().zip(d.devices()) {
            assert_eq!(
                action,
                &DisplayAction::Transform {
                    device: device.clone(),
                    matrix: TransformMatrix::INVERTED,
                }
            );
        }
    }

    #[test]
    fn test_plan_unknown_orientation() {
        let d = dispatcher(Arc::new(RecordingBackend::default()));
        let actions = d.plan(
            &changes(&[SensorProperty::AccelerometerOrientation]),
            &snapshot("sideways", 0.0, "lux"),
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn test_plan_light_level() {
        let d = dispatcher(Arc::new(RecordingBackend::default()));
        let actions = d.plan(
            &changes(&[SensorProperty::LightLevel]),
            &snapshot("normal", 99.0, "lux"),
        );
        assert_eq!(actions.len(), 1);
        match actions[0] {
            DisplayAction::Backlight(level) => assert!((level - 10.0).abs() < 1e-9),
            ref other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn test_plan_light_unknown_unit_falls_back() {
        let d = dispatcher(Arc::new(RecordingBackend::default()));
        let actions = d.plan(
            &changes(&[SensorProperty::LightLevel]),
            &snapshot("normal", 500.0, "vendor"),
        );
        assert_eq!(actions, vec![DisplayAction::Backlight(6.0)]);
    }

    #[test]
    fn test_plan_presence_and_unit_only_changes_do_nothing() {
        let d = dispatcher(Arc::new(RecordingBackend::default()));
        let actions = d.plan(
            &changes(&[
                SensorProperty::HasAccelerometer,
                SensorProperty::HasAmbientLight,
                SensorProperty::LightLevelUnit,
            ]),
            &snapshot("normal", 10.0, "lux"),
        );
        assert!(actions.is_empty());
    }

    #[test]
    fn test_plan_empty_device_list() {
        let d = ChangeDispatcher::new(
            Arc::new(RecordingBackend::default()),
            &DisplayConfig {
                devices: Vec::new(),
                ..DisplayConfig::default()
            },
            &BacklightConfig::default(),
        );
        let actions = d.orientation_actions("left-up");
        assert_eq!(actions, vec![DisplayAction::Rotate(Rotation::Left)]);
    }

    #[tokio::test]
    async fn test_dispatch_combined_batch() {
        let backend = Arc::new(RecordingBackend::default());
        let d = dispatcher(backend.clone());

        let done = d
            .dispatch(
                &changes(&[
                    SensorProperty::AccelerometerOrientation,
                    SensorProperty::LightLevel,
                    SensorProperty::LightLevelUnit,
                ]),
                &snapshot("right-up", 9.0, "lux"),
            )
            .await;

        let calls = backend.calls();
        assert_eq!(done, 5);
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], DisplayAction::Rotate(Rotation::Right));
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, DisplayAction::Transform { matrix, .. } if *matrix == TransformMatrix::RIGHT))
                .count(),
            3
        );
        match calls[4] {
            DisplayAction::Backlight(level) => assert!((level - 8.0).abs() < 1e-9),
            ref other => panic!("unexpected action: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_failure_does_not_stop_batch() {
        let backend = Arc::new(RecordingBackend {
            fail_rotation: true,
            ..Default::default()
        });
        let d = dispatcher(backend.clone());

        let done = d
            .dispatch(
                &changes(&[SensorProperty::AccelerometerOrientation]),
                &snapshot("normal", 0.0, "lux"),
            )
            .await;

        assert_eq!(done, 3);
        assert_eq!(backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_apply_snapshot_skips_absent_sensors() {
        let backend = Arc::new(RecordingBackend::default());
        let d = dispatcher(backend.clone());

        let snapshot = SensorSnapshot {
            has_accelerometer: false,
            ..snapshot("left-up", 9.0, "lux")
        };
        assert_eq!(d.apply_snapshot(&snapshot).await, 1);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], DisplayAction::Backlight(level) if (level - 8.0).abs() < 1e-9));
    }
}
