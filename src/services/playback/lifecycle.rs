use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::services::{
    ipc::{ChannelError, ChannelState, IpcChannel},
    supervisor::ProcessSupervisor,
};

/// Health checks and restart of the player process
#[async_trait]
pub trait PlayerLifecycle: Send + Sync {
    /// Name of the supervised service
    fn unit(&self) -> String;

    /// Current IPC channel state
    fn channel_state(&self) -> ChannelState;

    /// Whether the backing service is active.
    async fn service_active(&self) -> bool;

    /// Whether the control socket accepts connections.
    async fn socket_reachable(&self) -> bool;

    /// Probes the player over IPC.
    ///
    /// # Errors
    /// Returns the `ChannelError` of the failed probe
    async fn handshake(&self) -> Result<(), ChannelError>;

    /// Restarts the service and waits for its socket. Returns `true` once
    /// the socket is connectable again.
    async fn restart(&self) -> bool;
}

/// The real player: a supervised service behind the IPC channel
pub struct SupervisedPlayer {
    supervisor: Arc<ProcessSupervisor>,
    channel: Arc<IpcChannel>,
    socket_timeout: Duration,
}

impl SupervisedPlayer {
    /// Combines the supervisor and channel for one player.
    pub fn new(
        supervisor: Arc<ProcessSupervisor>,
        channel: Arc<IpcChannel>,
        socket_timeout: Duration,
    ) -> Self {
        Self {
            supervisor,
            channel,
            socket_timeout,
        }
    }
}

#[async_trait]
impl PlayerLifecycle for SupervisedPlayer {
    fn unit(&self) -> String {
        self.supervisor.unit().to_string()
    }

    fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    async fn service_active(&self) -> bool {
        self.supervisor.is_active().await
    }

    async fn socket_reachable(&self) -> bool {
        self.channel.is_reachable().await
    }

    async fn handshake(&self) -> Result<(), ChannelError> {
        self.channel.handshake().await
    }

    async fn restart(&self) -> bool {
        self.channel.disconnect().await;
        self.supervisor.restart().await
            && self.supervisor.wait_for_socket(self.socket_timeout).await
    }
}
