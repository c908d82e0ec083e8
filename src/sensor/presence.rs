// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Bus name watching for the sensor service.

use futures::stream::{self, BoxStream};
use futures::StreamExt;
use zbus::fdo::DBusProxy;
use zbus::names::BusName;
use zbus::Connection;

use super::Presence;
use crate::error::Result;

/// Stream of appear/vanish transitions for `service_name`.
///
/// Emits `Appeared` first if the name already has an owner. An owner
/// handover (old owner to new owner) is reported as `Appeared`.
pub async fn watch_presence(
    connection: &Connection,
    service_name: &str,
) -> Result<BoxStream<'static, Presence>> {
    let dbus: DBusProxy<'static> = DBusProxy::new(connection).await?;

    // Subscribe before probing so an owner change in between is not lost.
    let changes = dbus
        .receive_name_owner_changed_with_args(&[(0, service_name)])
        .await?
        .filter_map(|signal| async move {
            let args = signal.args().ok()?;
            Some(presence_for(args.new_owner().is_some()))
        });

    let name = BusName::try_from(service_name.to_string()).map_err(zbus::Error::from)?;
    let initial = if dbus.name_has_owner(name).await? {
        Some(Presence::Appeared)
    } else {
        None
    };

    Ok(stream::iter(initial).chain(changes).boxed())
}

fn presence_for(has_owner: bool) -> Presence {
    if has_owner {
        Presence::Appeared
    } else {
        Presence::Vanished
    }
}
