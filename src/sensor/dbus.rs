// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! iio-sensor-proxy over D-Bus.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, warn};
use zbus::fdo::{PropertiesChanged, PropertiesProxy};
use zbus::zvariant::Value;
use zbus::{CacheProperties, Connection};

use super::{
    PropertyBatch, PropertyValue, SensorCapability, SensorConnector, SensorLink, SensorProperty,
    SensorService, SensorSnapshot,
};
use crate::config::{BusKind, SensorConfig};
use crate::error::{Result, SensorError};

/// Interface name of the sensor service.
pub const SENSOR_INTERFACE: &str = "net.hadess.SensorProxy";

#[zbus::proxy(
    interface = "net.hadess.SensorProxy",
    default_service = "net.hadess.SensorProxy",
    default_path = "/net/hadess/SensorProxy",
    gen_blocking = false
)]
trait HadessSensor {
    fn claim_accelerometer(&self) -> zbus::Result<()>;

    fn release_accelerometer(&self) -> zbus::Result<()>;

    fn claim_light(&self) -> zbus::Result<()>;

    fn release_light(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn has_accelerometer(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn accelerometer_orientation(&self) -> zbus::Result<String>;

    #[zbus(property)]
    fn has_ambient_light(&self) -> zbus::Result<bool>;

    #[zbus(property)]
    fn light_level(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn light_level_unit(&self) -> zbus::Result<String>;
}

/// Sensor service calls through a `net.hadess.SensorProxy` proxy.
pub struct DbusSensorService {
    proxy: HadessSensorProxy<'static>,
}

#[async_trait]
impl SensorService for DbusSensorService {
    async fn claim(&self, capability: SensorCapability) -> Result<()> {
        let result = match capability {
            SensorCapability::Accelerometer => self.proxy.claim_accelerometer().await,
            SensorCapability::AmbientLight => self.proxy.claim_light().await,
        };
        result.map_err(|err| claim_error(capability, err).into())
    }

    async fn release(&self, capability: SensorCapability) -> Result<()> {
        let result = match capability {
            SensorCapability::Accelerometer => self.proxy.release_accelerometer().await,
            SensorCapability::AmbientLight => self.proxy.release_light().await,
        };
        result.map_err(|err| call_error(err).into())
    }

    async fn read_snapshot(&self) -> Result<SensorSnapshot> {
        Ok(SensorSnapshot {
            has_accelerometer: self.proxy.has_accelerometer().await.map_err(call_error)?,
            orientation: self
                .proxy
                .accelerometer_orientation()
                .await
                .map_err(call_error)?,
            has_ambient_light: self.proxy.has_ambient_light().await.map_err(call_error)?,
            light_level: self.proxy.light_level().await.map_err(call_error)?,
            light_unit: self.proxy.light_level_unit().await.map_err(call_error)?,
        })
    }
}

/// Connects to the sensor service on the configured bus.
pub struct DbusConnector {
    connection: Connection,
    service_name: String,
    object_path: String,
}

impl DbusConnector {
    /// Open the configured bus.
    pub async fn open(config: &SensorConfig) -> Result<Self> {
        let connection = match config.bus {
            BusKind::System => Connection::system().await?,
            BusKind::Session => Connection::session().await?,
        };
        Ok(Self::with_connection(connection, config))
    }

    /// Use an existing bus connection.
    pub fn with_connection(connection: Connection, config: &SensorConfig) -> Self {
        Self {
            connection,
            service_name: config.service_name.clone(),
            object_path: config.object_path.clone(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }
}

#[async_trait]
impl SensorConnector for DbusConnector {
    async fn connect(&self) -> Result<SensorLink> {
        // Values are tracked by the session from the change stream, so the
        // proxy cache would only duplicate them.
        let proxy: HadessSensorProxy<'static> = HadessSensorProxy::builder(&self.connection)
            .destination(self.service_name.clone())?
            .path(self.object_path.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let properties: PropertiesProxy<'static> = PropertiesProxy::builder(&self.connection)
            .destination(self.service_name.clone())?
            .path(self.object_path.clone())?
            .cache_properties(CacheProperties::No)
            .build()
            .await?;

        let changes = properties
            .receive_properties_changed()
            .await?
            .filter_map(|signal| async move { batch_from_signal(&signal) })
            .boxed();

        debug!(
            "Connected to {} at {}",
            self.service_name, self.object_path
        );

        Ok(SensorLink {
            service: Box::new(DbusSensorService { proxy }),
            changes,
        })
    }
}

/// Convert a `PropertiesChanged` signal into a batch for the sensor interface.
fn batch_from_signal(signal: &PropertiesChanged) -> Option<PropertyBatch> {
    let args = match signal.args() {
        Ok(args) => args,
        Err(err) => {
            warn!("Malformed PropertiesChanged signal: {}", err);
            return None;
        }
    };

    property_batch(
        args.interface_name().as_str(),
        args.changed_properties(),
        args.invalidated_properties(),
    )
}

/// Build a batch from the payload of a `PropertiesChanged` signal.
///
/// Returns `None` for other interfaces. Unknown property names are dropped.
fn property_batch(
    interface: &str,
    changed: &HashMap<&str, Value<'_>>,
    invalidated: &[&str],
) -> Option<PropertyBatch> {
    if interface != SENSOR_INTERFACE {
        return None;
    }

    let mut batch = PropertyBatch::new();
    for (name, value) in changed {
        let Some(property) = SensorProperty::from_name(name) else {
            continue;
        };
        match property_value(value) {
            Some(value) => batch.changed.push((property, value)),
            None => warn!("Unexpected value type for {}", property),
        }
    }
    batch.changed.sort_by_key(|(property, _)| *property);
    batch.invalidated = invalidated
        .iter()
        .filter_map(|name| SensorProperty::from_name(name))
        .collect();

    Some(batch)
}

fn property_value(value: &Value<'_>) -> Option<PropertyValue> {
    match value {
        Value::Bool(b) => Some(PropertyValue::Bool(*b)),
        Value::F64(d) => Some(PropertyValue::Double(*d)),
        Value::Str(s) => Some(PropertyValue::Str(s.to_string())),
        Value::Value(inner) => property_value(inner),
        _ => None,
    }
}

/// Map a failed claim to `Cancelled` or `ClaimFailed`.
fn claim_error(capability: SensorCapability, err: zbus::Error) -> SensorError {
    if is_cancellation(&err) {
        return SensorError::Cancelled;
    }
    SensorError::ClaimFailed {
        capability,
        message: err.to_string(),
    }
}

fn call_error(err: zbus::Error) -> SensorError {
    if is_cancellation(&err) {
        SensorError::Cancelled
    } else {
        SensorError::Call(err.to_string())
    }
}

/// An interrupted transport means the call was torn down locally.
fn is_cancellation(err: &zbus::Error) -> bool {
    matches!(err, zbus::Error::InputOutput(io) if io.kind() == std::io::ErrorKind::Interrupted)
}
