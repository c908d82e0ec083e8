// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sensor service abstraction
//!
//! Types shared between the D-Bus implementation, the session and the
//! dispatcher, plus the traits the session talks to. The D-Bus backed
//! implementations live in `dbus` and `presence`.

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::{Result, SensorError};

pub mod dbus;
pub mod presence;

pub use dbus::{DbusConnector, DbusSensorService, SENSOR_INTERFACE};
pub use presence::watch_presence;

/// A claimable feature of the sensor service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorCapability {
    Accelerometer,
    AmbientLight,
}

impl fmt::Display for SensorCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorCapability::Accelerometer => f.write_str("accelerometer"),
            SensorCapability::AmbientLight => f.write_str("light sensor"),
        }
    }
}

/// Properties of the sensor interface the daemon cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorProperty {
    HasAccelerometer,
    AccelerometerOrientation,
    HasAmbientLight,
    LightLevel,
    LightLevelUnit,
}

impl SensorProperty {
    pub const ALL: [SensorProperty; 5] = [
        SensorProperty::HasAccelerometer,
        SensorProperty::AccelerometerOrientation,
        SensorProperty::HasAmbientLight,
        SensorProperty::LightLevel,
        SensorProperty::LightLevelUnit,
    ];

    /// D-Bus property name.
    pub fn name(&self) -> &'static str {
        match self {
            SensorProperty::HasAccelerometer => "HasAccelerometer",
            SensorProperty::AccelerometerOrientation => "AccelerometerOrientation",
            SensorProperty::HasAmbientLight => "HasAmbientLight",
            SensorProperty::LightLevel => "LightLevel",
            SensorProperty::LightLevelUnit => "LightLevelUnit",
        }
    }

    /// Look up a property by its D-Bus name. Unknown names (compass,
    /// proximity, ...) yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for SensorProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A property value as delivered by the service.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Str(String),
    Double(f64),
}

/// Last known values of the sensor properties.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorSnapshot {
    pub has_accelerometer: bool,
    pub orientation: String,
    pub has_ambient_light: bool,
    pub light_level: f64,
    pub light_unit: String,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            has_accelerometer: false,
            orientation: "undefined".to_string(),
            has_ambient_light: false,
            light_level: 0.0,
            light_unit: crate::brightness::LUX.to_string(),
        }
    }
}

impl SensorSnapshot {
    /// Store a new value for `property`, rejecting values of the wrong type.
    pub fn set(&mut self, property: SensorProperty, value: PropertyValue) -> Result<()> {
        match (property, value) {
            (SensorProperty::HasAccelerometer, PropertyValue::Bool(b)) => {
                self.has_accelerometer = b
            }
            (SensorProperty::AccelerometerOrientation, PropertyValue::Str(s)) => {
                self.orientation = s
            }
            (SensorProperty::HasAmbientLight, PropertyValue::Bool(b)) => {
                self.has_ambient_light = b
            }
            (SensorProperty::LightLevel, PropertyValue::Double(d)) => self.light_level = d,
            (SensorProperty::LightLevelUnit, PropertyValue::Str(s)) => self.light_unit = s,
            (property, _) => {
                return Err(SensorError::InvalidProperty(property.name().to_string()).into())
            }
        }
        Ok(())
    }
}

/// One property-change notification from the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBatch {
    /// Properties with their new values
    pub changed: Vec<(SensorProperty, PropertyValue)>,
    /// Properties that changed without a value attached
    pub invalidated: Vec<SensorProperty>,
}

impl PropertyBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a changed property.
    pub fn with(mut self, property: SensorProperty, value: PropertyValue) -> Self {
        self.changed.push((property, value));
        self
    }

    /// Add an invalidated property.
    pub fn invalidate(mut self, property: SensorProperty) -> Self {
        self.invalidated.push(property);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.invalidated.is_empty()
    }
}

/// Set of properties touched by a batch after it was applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet(BTreeSet<SensorProperty>);

impl ChangeSet {
    pub fn insert(&mut self, property: SensorProperty) {
        self.0.insert(property);
    }

    pub fn contains(&self, property: SensorProperty) -> bool {
        self.0.contains(&property)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SensorProperty> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SensorProperty> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = SensorProperty>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Presence of the sensor service on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Appeared,
    Vanished,
}

/// Calls into a connected sensor service.
#[async_trait]
pub trait SensorService: Send + Sync {
    /// Claim a capability. Blocks until granted or refused.
    async fn claim(&self, capability: SensorCapability) -> Result<()>;

    /// Release a previously claimed capability.
    async fn release(&self, capability: SensorCapability) -> Result<()>;

    /// Read all properties from the service.
    async fn read_snapshot(&self) -> Result<SensorSnapshot>;
}

/// A live connection to the sensor service.
pub struct SensorLink {
    pub service: Box<dyn SensorService>,
    pub changes: BoxStream<'static, PropertyBatch>,
}

/// Opens a `SensorLink` each time the service appears.
#[async_trait]
pub trait SensorConnector: Send + Sync {
    async fn connect(&self) -> Result<SensorLink>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_names_round_trip() {
        for property in SensorProperty::ALL {
            assert_eq!(SensorProperty::from_name(property.name()), Some(property));
        }
    }

    #[test]
    fn test_unknown_property_name() {
        assert_eq!(SensorProperty::from_name("CompassHeading"), None);
        assert_eq!(SensorProperty::from_name("lightlevel"), None);
    }

    #[test]
    fn test_capability_display() {
        assert_eq!(SensorCapability::Accelerometer.to_string(), "accelerometer");
        assert_eq!(SensorCapability::AmbientLight.to_string(), "light sensor");
    }

    #[test]
    fn test_snapshot_default() {
        let snapshot = SensorSnapshot::default();
        assert!(!snapshot.has_accelerometer);
        assert!(!snapshot.has_ambient_light);
        assert_eq!(snapshot.light_unit, "lux");
    }

    #[test]
    fn test_snapshot_set_values() {
        let mut snapshot = SensorSnapshot::default();
        snapshot
            .set(SensorProperty::HasAccelerometer, PropertyValue::Bool(true))
            .unwrap();
        snapshot
            .set(
                SensorProperty::AccelerometerOrientation,
                PropertyValue::Str("left-up".to_string()),
            )
            .unwrap();
        snapshot
            .set(SensorProperty::LightLevel, PropertyValue::Double(42.5))
            .unwrap();
        assert!(snapshot.has_accelerometer);
        assert_eq!(snapshot.orientation, "left-up");
        assert_eq!(snapshot.light_level, 42.5);
    }

    #[test]
    fn test_snapshot_rejects_wrong_type() {
        let mut snapshot = SensorSnapshot::default();
        let err = snapshot
            .set(SensorProperty::LightLevel, PropertyValue::Str("bright".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("LightLevel"));
        assert_eq!(snapshot.light_level, 0.0);
    }

    #[test]
    fn test_batch_builder() {
        let batch = PropertyBatch::new()
            .with(SensorProperty::LightLevel, PropertyValue::Double(9.0))
            .invalidate(SensorProperty::LightLevelUnit);
        assert_eq!(batch.changed.len(), 1);
        assert_eq!(batch.invalidated, vec![SensorProperty::LightLevelUnit]);
        assert!(!batch.is_empty());
        assert!(PropertyBatch::new().is_empty());
    }

    #[test]
    fn test_change_set() {
        let set: ChangeSet = [SensorProperty::LightLevel, SensorProperty::LightLevel]
            .into_iter()
            .collect();
        assert!(set.contains(SensorProperty::LightLevel));
        assert!(!set.contains(SensorProperty::HasAmbientLight));
        assert_eq!(set.iter().count(), 1);
    }
}
