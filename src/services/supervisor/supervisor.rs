use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use tokio::{
    net::UnixStream,
    time::{Instant, sleep, timeout},
};
use tracing::{error, info, instrument, warn};

use crate::{config::PlayerConfig, services::ipc::ChannelRecovery};

use super::ServiceManager;

/// Keeps the player's OS service alive and its socket connectable
pub struct ProcessSupervisor {
    manager: Arc<dyn ServiceManager>,
    unit: String,
    socket_path: PathBuf,
    query_timeout: Duration,
    restart_timeout: Duration,
    socket_timeout: Duration,
    poll_interval: Duration,
}

impl ProcessSupervisor {
    /// Creates a supervisor for the unit and socket named in `config`.
    pub fn new(manager: Arc<dyn ServiceManager>, config: &PlayerConfig) -> Self {
        Self {
            manager,
            unit: config.service_name.clone(),
            socket_path: config.socket_path.clone(),
            query_timeout: config.restart_timeout(),
            restart_timeout: config.restart_timeout(),
            socket_timeout: config.socket_timeout(),
            poll_interval: config.socket_poll_interval(),
        }
    }

    /// Supervised unit name
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Player socket path
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the player service is active.
    ///
    /// Any failure to query the service manager counts as inactive.
    pub async fn is_active(&self) -> bool {
        match timeout(self.query_timeout, self.manager.is_active(&self.unit)).await {
            Ok(Ok(active)) => active,
            Ok(Err(err)) => {
                warn!(unit = %self.unit, error = %err, "Service state query failed, assuming inactive");
                false
            }
            Err(_) => {
                warn!(unit = %self.unit, timeout = ?self.query_timeout, "Service state query timed out, assuming inactive");
                false
            }
        }
    }

    /// Restarts the player service.
    ///
    /// Succeeds when the service manager accepted the restart without error
    /// within the restart timeout. Does not wait for the socket.
    #[instrument(skip(self), fields(unit = %self.unit))]
    pub async fn restart(&self) -> bool {
        match timeout(self.restart_timeout, self.manager.restart(&self.unit)).await {
            Ok(Ok(())) => {
                info!("Player service restart requested");
                true
            }
            Ok(Err(err)) => {
                error!(error = %err, "Player service restart failed");
                false
            }
            Err(_) => {
                error!(timeout = ?self.restart_timeout, "Player service restart timed out");
                false
            }
        }
    }

    /// Waits until the socket exists and accepts a connection.
    ///
    /// Confirms the service is active first, restarting it once if not.
    /// Returns `false` if the restart fails or `wait` elapses.
    #[instrument(skip(self), fields(unit = %self.unit, socket = %self.socket_path.display()))]
    pub async fn wait_for_socket(&self, wait: Duration) -> bool {
        let started = Instant::now();

        if !self.is_active().await {
            warn!("Player service inactive, restarting before waiting for socket");
            if !self.restart().await {
                return false;
            }
        }

        let deadline = started + wait;
        loop {
            if self.socket_connectable().await {
                info!(
                    waited_ms = started.elapsed().as_millis() as u64,
                    "Player socket is connectable"
                );
                return true;
            }

            if Instant::now() + self.poll_interval > deadline {
                warn!(waited = ?wait, "Player socket did not become connectable");
                return false;
            }

            sleep(self.poll_interval).await;
        }
    }

    async fn socket_connectable(&self) -> bool {
        if !self.socket_path.exists() {
            return false;
        }

        matches!(
            timeout(self.poll_interval, UnixStream::connect(&self.socket_path)).await,
            Ok(Ok(_))
        )
    }
}

#[async_trait]
impl ChannelRecovery for ProcessSupervisor {
    async fn recover(&self) -> bool {
        self.wait_for_socket(self.socket_timeout).await
    }
}
