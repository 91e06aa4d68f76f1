use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use futures::Stream;
use tokio::{
    sync::Mutex,
    time::{Instant, sleep, timeout},
};
use tracing::{debug, error, info, instrument, warn};

use crate::services::common::Property;

use super::{
    ChannelError, ChannelState, Connector, Delivery, PlayerCommand, PlayerConnection,
    PlayerResponse, PlayerStream, RetryPolicy,
};

/// Brings the player's socket back when it cannot be reached
#[async_trait]
pub trait ChannelRecovery: Send + Sync {
    /// Verifies (and if needed restarts) the backing service, then waits for
    /// the socket to become connectable. Returns `true` once it is.
    async fn recover(&self) -> bool;
}

/// Recovery strategy that never restarts anything
pub struct NoRecovery;

#[async_trait]
impl ChannelRecovery for NoRecovery {
    async fn recover(&self) -> bool {
        false
    }
}

/// Managed connection to the player's control socket
///
/// All commands go through one exclusive lock, so at most one command is in
/// flight to the player at any time across the whole process. The lock also
/// guards the cached connection, which is dropped after any transport failure
/// and re-established (with a handshake probe) by the next attempt.
pub struct IpcChannel {
    connector: Arc<dyn Connector>,
    recovery: Arc<dyn ChannelRecovery>,
    policy: RetryPolicy,
    connection: Mutex<Option<PlayerConnection>>,
    state: Property<ChannelState>,
    next_request_id: AtomicU64,
}

impl IpcChannel {
    /// Creates a disconnected channel; the first command connects.
    pub fn new(
        connector: Arc<dyn Connector>,
        recovery: Arc<dyn ChannelRecovery>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            connector,
            recovery,
            policy,
            connection: Mutex::new(None),
            state: Property::new(ChannelState::Disconnected),
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        self.state.get()
    }

    /// Stream of connection state changes, starting with the current state.
    pub fn state_monitored(&self) -> impl Stream<Item = ChannelState> + Send {
        self.state.watch()
    }

    /// Sends a command and returns the player's response.
    ///
    /// A response whose `error` is not `"success"` is returned as `Ok`; use
    /// [`PlayerResponse::into_result`] to turn it into a protocol error.
    ///
    /// # Errors
    /// - `ChannelError::Unavailable` when every attempt failed to reach the player
    /// - `ChannelError::Timeout` when the last attempt got no answer in time
    /// - `ChannelError::Encoding` if the command cannot be serialized
    pub async fn send(
        &self,
        command: PlayerCommand,
        timeout: Duration,
    ) -> Result<PlayerResponse, ChannelError> {
        self.send_reported(command, timeout)
            .await
            .map(|delivery| delivery.response)
    }

    /// Like [`send`](Self::send), also reporting the attempt that succeeded.
    ///
    /// Each attempt connects if needed (asking the recovery strategy to
    /// restart the player service when the socket is unreachable), writes the
    /// command and waits up to `timeout` for the answer. Attempts are separated
    /// by the policy's retry delay.
    ///
    /// # Errors
    /// Same as [`send`](Self::send)
    #[instrument(skip(self, command, timeout), fields(verb = %command.verb()))]
    pub async fn send_reported(
        &self,
        command: PlayerCommand,
        timeout: Duration,
    ) -> Result<Delivery, ChannelError> {
        let started = Instant::now();
        let command = command.with_request_id(self.allocate_request_id());
        let line = command.to_line()?;
        let max_attempts = self.policy.max_attempts.max(1);

        let mut slot = self.connection.lock().await;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let attempt_started = Instant::now();

            match self.attempt(&mut slot, &command, &line, timeout).await {
                Ok(response) => {
                    let elapsed = started.elapsed();
                    if attempt > 1 {
                        info!(
                            request_id = command.request_id(),
                            attempt,
                            elapsed_ms = elapsed.as_millis() as u64,
                            outcome = %response.error,
                            "Player command succeeded after retry"
                        );
                    } else {
                        debug!(
                            request_id = command.request_id(),
                            attempt,
                            elapsed_ms = elapsed.as_millis() as u64,
                            outcome = %response.error,
                            "Player command answered"
                        );
                    }

                    return Ok(Delivery {
                        response,
                        attempts: attempt,
                        elapsed,
                    });
                }
                Err(err) if !err.is_transport() => return Err(err),
                Err(err) => {
                    warn!(
                        request_id = command.request_id(),
                        attempt,
                        max_attempts,
                        elapsed_ms = attempt_started.elapsed().as_millis() as u64,
                        error = %err,
                        "Player command attempt failed"
                    );
                    *slot = None;
                    last_error = Some(err);

                    if attempt < max_attempts {
                        sleep(self.policy.retry_delay).await;
                    }
                }
            }
        }

        self.state.set(ChannelState::Disconnected);

        let err = match last_error {
            Some(ChannelError::Timeout { .. }) => ChannelError::Timeout {
                command: command.verb().to_string(),
                timeout,
                attempts: max_attempts,
            },
            Some(other) => ChannelError::Unavailable {
                attempts: max_attempts,
                reason: other.to_string(),
            },
            None => ChannelError::Unavailable {
                attempts: max_attempts,
                reason: "no attempt was made".to_string(),
            },
        };

        error!(
            request_id = command.request_id(),
            attempts = max_attempts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            error = %err,
            "Player command failed, retries exhausted"
        );

        Err(err)
    }

    /// Single handshake probe without retries or service recovery.
    ///
    /// Used by startup checks that have their own retry policy.
    ///
    /// # Errors
    /// Returns the transport error of the failed probe
    pub async fn handshake(&self) -> Result<(), ChannelError> {
        let mut slot = self.connection.lock().await;

        if slot.as_ref().is_some_and(PlayerConnection::interrupted) {
            *slot = None;
        }

        if let Some(connection) = slot.as_mut() {
            let probe = PlayerCommand::get_version().with_request_id(self.allocate_request_id());
            let line = probe.to_line()?;
            match connection
                .round_trip(
                    probe.verb(),
                    probe.request_id(),
                    &line,
                    self.policy.handshake_timeout,
                )
                .await
            {
                Ok(_) => return Ok(()),
                Err(err) => {
                    *slot = None;
                    self.state.set(ChannelState::Degraded);
                    return Err(err);
                }
            }
        }

        *slot = Some(self.establish(false).await?);
        Ok(())
    }

    /// Whether the socket accepts a raw connection right now.
    pub async fn is_reachable(&self) -> bool {
        self.open().await.is_ok()
    }

    /// Drops the cached connection.
    pub async fn disconnect(&self) {
        let mut slot = self.connection.lock().await;
        *slot = None;
        self.state.set(ChannelState::Disconnected);
    }

    fn allocate_request_id(&self) -> u64 {
        self.next_request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn attempt(
        &self,
        slot: &mut Option<PlayerConnection>,
        command: &PlayerCommand,
        line: &str,
        timeout: Duration,
    ) -> Result<PlayerResponse, ChannelError> {
        if slot.as_ref().is_some_and(PlayerConnection::interrupted) {
            debug!("Discarding connection left mid-exchange by a cancelled caller");
            *slot = None;
        }

        if slot.is_none() {
            *slot = Some(self.establish(true).await?);
        }

        let Some(connection) = slot.as_mut() else {
            return Err(ChannelError::ConnectionClosed);
        };

        connection
            .round_trip(command.verb(), command.request_id(), line, timeout)
            .await
            .inspect_err(|_| {
                self.state.set(ChannelState::Degraded);
            })
    }

    async fn establish(&self, recover: bool) -> Result<PlayerConnection, ChannelError> {
        self.state.set(ChannelState::Connecting);
        let endpoint = self.connector.endpoint();

        let stream = match self.open().await {
            Ok(stream) => stream,
            Err(err) if recover => {
                warn!(endpoint, error = %err, "Player socket unreachable, recovering service");

                if !self.recovery.recover().await {
                    self.state.set(ChannelState::Disconnected);
                    return Err(ChannelError::Unavailable {
                        attempts: 1,
                        reason: format!("{err}; service recovery failed"),
                    });
                }

                self.open().await.map_err(|err| {
                    self.state.set(ChannelState::Disconnected);
                    ChannelError::Unavailable {
                        attempts: 1,
                        reason: format!("{err} after service recovery"),
                    }
                })?
            }
            Err(err) => {
                self.state.set(ChannelState::Disconnected);
                return Err(ChannelError::Unavailable {
                    attempts: 1,
                    reason: err.to_string(),
                });
            }
        };

        let mut connection = PlayerConnection::new(stream);
        let probe = PlayerCommand::get_version().with_request_id(self.allocate_request_id());
        let line = probe.to_line()?;

        if let Err(err) = connection
            .round_trip(
                probe.verb(),
                probe.request_id(),
                &line,
                self.policy.handshake_timeout,
            )
            .await
        {
            self.state.set(ChannelState::Disconnected);
            return Err(err);
        }

        self.state.set(ChannelState::Ready);
        debug!(endpoint, "Player IPC connection ready");
        Ok(connection)
    }

    async fn open(&self) -> io::Result<Box<dyn PlayerStream>> {
        match timeout(self.policy.connect_timeout, self.connector.connect()).await {
            Ok(result) => result,
            Err(_) => Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connect to {} timed out", self.connector.endpoint()),
            )),
        }
    }
}
