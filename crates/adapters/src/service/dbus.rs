// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! D-Bus inhibition services

use super::{HandleService, ServiceError, TokenService};
use async_trait::async_trait;
use ka_core::Lease;
use zbus::Connection;

/// Session manager flag for "inhibit suspending the session or computer"
const INHIBIT_SUSPEND: u32 = 4;

#[zbus::proxy(
    interface = "org.freedesktop.PowerManagement.Inhibit",
    default_service = "org.freedesktop.PowerManagement",
    default_path = "/org/freedesktop/PowerManagement/Inhibit",
    gen_blocking = false
)]
trait PowerManagementInhibit {
    fn inhibit(&self, application: &str, reason: &str) -> zbus::Result<u32>;

    #[zbus(name = "UnInhibit")]
    fn un_inhibit(&self, cookie: u32) -> zbus::Result<()>;
}

#[zbus::proxy(
    interface = "org.freedesktop.login1.Manager",
    default_service = "org.freedesktop.login1",
    default_path = "/org/freedesktop/login1",
    gen_blocking = false
)]
trait Login1Manager {
    fn inhibit(
        &self,
        what: &str,
        who: &str,
        why: &str,
        mode: &str,
    ) -> zbus::Result<zbus::zvariant::OwnedFd>;
}

/// Desktop session managers sharing the `Inhibit`/`Uninhibit` interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionManager {
    Gnome,
    Mate,
}

impl SessionManager {
    pub fn bus_name(self) -> &'static str {
        match self {
            SessionManager::Gnome => "org.gnome.SessionManager",
            SessionManager::Mate => "org.mate.SessionManager",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            SessionManager::Gnome => "/org/gnome/SessionManager",
            SessionManager::Mate => "/org/mate/SessionManager",
        }
    }
}

/// Cookie service on the session bus: org.gnome.SessionManager or org.mate.SessionManager
#[derive(Clone)]
pub struct SessionManagerService {
    proxy: zbus::Proxy<'static>,
}

impl SessionManagerService {
    pub async fn new(conn: &Connection, manager: SessionManager) -> Result<Self, ServiceError> {
        let proxy = zbus::Proxy::new(
            conn,
            manager.bus_name(),
            manager.path(),
            manager.bus_name(),
        )
        .await?;
        Ok(Self { proxy })
    }
}

#[async_trait]
impl TokenService for SessionManagerService {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<u32, ServiceError> {
        // No toplevel window to attach the inhibitor to
        let toplevel_xid = 0u32;
        let cookie: u32 = self
            .proxy
            .call("Inhibit", &(app, toplevel_xid, reason, INHIBIT_SUSPEND))
            .await?;
        Ok(cookie)
    }

    async fn uninhibit(&self, cookie: u32) -> Result<(), ServiceError> {
        let () = self.proxy.call("Uninhibit", &(cookie,)).await?;
        Ok(())
    }
}

/// Cookie service on the session bus: org.freedesktop.PowerManagement
#[derive(Clone)]
pub struct PowerManagementService {
    proxy: PowerManagementInhibitProxy<'static>,
}

impl PowerManagementService {
    pub const BUS_NAME: &'static str = "org.freedesktop.PowerManagement";

    pub async fn new(conn: &Connection) -> Result<Self, ServiceError> {
        let proxy = PowerManagementInhibitProxy::new(conn).await?;
        Ok(Self { proxy })
    }
}

#[async_trait]
impl TokenService for PowerManagementService {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<u32, ServiceError> {
        Ok(self.proxy.inhibit(app, reason).await?)
    }

    async fn uninhibit(&self, cookie: u32) -> Result<(), ServiceError> {
        Ok(self.proxy.un_inhibit(cookie).await?)
    }
}

/// Descriptor service on the system bus: org.freedesktop.login1
#[derive(Clone)]
pub struct Login1Service {
    proxy: Login1ManagerProxy<'static>,
}

impl Login1Service {
    pub const BUS_NAME: &'static str = "org.freedesktop.login1";

    pub async fn new(conn: &Connection) -> Result<Self, ServiceError> {
        let proxy = Login1ManagerProxy::new(conn).await?;
        Ok(Self { proxy })
    }
}

#[async_trait]
impl HandleService for Login1Service {
    async fn inhibit(&self, app: &str, reason: &str) -> Result<Box<dyn Lease>, ServiceError> {
        let fd = self.proxy.inhibit("sleep", app, reason, "block").await?;
        // Convert to the std type so the zbus wrapper does not leak out
        let fd = std::os::fd::OwnedFd::from(fd);
        Ok(Box::new(fd))
    }
}
