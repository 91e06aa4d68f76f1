use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;
use zbus::Connection;

use crate::config::BusKind;

use super::{
    SupervisorError,
    proxy::{SystemdManagerProxy, SystemdUnitProxy},
};

/// OS service manager hosting the player process
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Whether `unit` is currently active.
    ///
    /// # Errors
    /// Returns error if the service manager cannot be queried
    async fn is_active(&self, unit: &str) -> Result<bool, SupervisorError>;

    /// Asks the service manager to restart `unit`.
    ///
    /// # Errors
    /// Returns error if the request fails or is rejected
    async fn restart(&self, unit: &str) -> Result<(), SupervisorError>;
}

/// systemd over D-Bus
///
/// The bus connection is opened lazily so one-shot commands that never
/// need the service manager do not require D-Bus access.
pub struct SystemdServiceManager {
    bus: BusKind,
    connection: OnceCell<Connection>,
}

impl SystemdServiceManager {
    /// Creates a manager for the system or per-user systemd instance.
    pub fn new(bus: BusKind) -> Self {
        Self {
            bus,
            connection: OnceCell::new(),
        }
    }

    async fn connection(&self) -> Result<&Connection, SupervisorError> {
        self.connection
            .get_or_try_init(|| async {
                match self.bus {
                    BusKind::System => Connection::system().await,
                    BusKind::Session => Connection::session().await,
                }
            })
            .await
            .map_err(SupervisorError::DbusError)
    }
}

#[async_trait]
impl ServiceManager for SystemdServiceManager {
    async fn is_active(&self, unit: &str) -> Result<bool, SupervisorError> {
        let connection = self.connection().await?;
        let manager = SystemdManagerProxy::new(connection).await?;
        let path = manager.load_unit(unit).await?;

        let unit_proxy = SystemdUnitProxy::builder(connection)
            .path(path)?
            .build()
            .await?;

        let active_state = unit_proxy.active_state().await?;
        let sub_state = unit_proxy.sub_state().await.unwrap_or_default();
        debug!(unit, %active_state, %sub_state, "Queried player service state");

        Ok(active_state == "active")
    }

    async fn restart(&self, unit: &str) -> Result<(), SupervisorError> {
        let connection = self.connection().await?;
        let manager = SystemdManagerProxy::new(connection).await?;

        let job = manager
            .restart_unit(unit, "replace")
            .await
            .map_err(|e| SupervisorError::Rejected {
                operation: "restart",
                unit: unit.to_string(),
                reason: e.to_string(),
            })?;

        debug!(unit, job = %job.as_str(), "Queued player service restart");
        Ok(())
    }
}
