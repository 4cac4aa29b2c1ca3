// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service presence watcher
//!
//! Reports whether a well-known bus name currently has an owner: once when the
//! watch starts, then on every transition.

use crate::service::ServiceError;
use futures_util::StreamExt;
use zbus::names::BusName;
use zbus::Connection;

/// Watches one well-known name on a bus
#[derive(Clone)]
pub struct NameWatcher {
    conn: Connection,
    name: &'static str,
}

impl NameWatcher {
    pub fn new(conn: Connection, name: &'static str) -> Self {
        Self { conn, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run until the bus connection goes away, calling `on_change` with the
    /// initial presence and every change after it.
    pub async fn watch<F>(self, mut on_change: F) -> Result<(), ServiceError>
    where
        F: FnMut(bool) + Send,
    {
        let dbus = zbus::fdo::DBusProxy::new(&self.conn).await?;

        // Subscribe before querying so no transition falls in between
        let mut changes = dbus.receive_name_owner_changed().await?;
        let bus_name = BusName::try_from(self.name).map_err(zbus::Error::from)?;
        let mut present = dbus.name_has_owner(bus_name).await?;
        tracing::debug!(name = self.name, present, "initial presence");
        on_change(present);

        while let Some(signal) = changes.next().await {
            let args = match signal.args() {
                Ok(args) => args,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed NameOwnerChanged signal");
                    continue;
                }
            };
            if args.name().as_str() != self.name {
                continue;
            }

            let now = args.new_owner().is_some();
            if now != present {
                present = now;
                tracing::info!(name = self.name, present, "service presence changed");
                on_change(present);
            }
        }

        tracing::debug!(name = self.name, "name watch ended");
        Ok(())
    }
}
