//! systemd D-Bus interfaces used to supervise the player service.

#![allow(missing_docs)]

use zbus::{proxy, zvariant::OwnedObjectPath};

/// systemd manager interface
#[proxy(
    interface = "org.freedesktop.systemd1.Manager",
    default_service = "org.freedesktop.systemd1",
    default_path = "/org/freedesktop/systemd1"
)]
pub trait SystemdManager {
    /// Load a unit by name (loading it if needed) and return its object path
    fn load_unit(&self, name: &str) -> zbus::Result<OwnedObjectPath>;

    /// Restart a unit, returning the queued job's object path
    fn restart_unit(&self, name: &str, mode: &str) -> zbus::Result<OwnedObjectPath>;
}

/// systemd unit interface
#[proxy(
    interface = "org.freedesktop.systemd1.Unit",
    default_service = "org.freedesktop.systemd1"
)]
pub trait SystemdUnit {
    /// High-level activation state ("active", "inactive", "failed", ...)
    #[zbus(property)]
    fn active_state(&self) -> zbus::Result<String>;

    /// Low-level state specific to the unit type ("running", "dead", ...)
    #[zbus(property)]
    fn sub_state(&self) -> zbus::Result<String>;
}
