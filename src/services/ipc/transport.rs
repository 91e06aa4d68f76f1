use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::UnixStream,
    time::{Instant, timeout_at},
};
use tracing::trace;

use super::{ChannelError, PlayerResponse};

/// Byte stream to the player's IPC endpoint
pub trait PlayerStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> PlayerStream for T {}

/// Opens raw connections to the player
#[async_trait]
pub trait Connector: Send + Sync {
    /// Opens a new stream to the player.
    ///
    /// # Errors
    /// Returns the underlying I/O error if the endpoint is missing or refuses
    async fn connect(&self) -> io::Result<Box<dyn PlayerStream>>;

    /// Human-readable endpoint description for logs
    fn endpoint(&self) -> String;
}

/// Connects to the player over a Unix domain socket
#[derive(Debug, Clone)]
pub struct UnixSocketConnector {
    path: PathBuf,
}

impl UnixSocketConnector {
    /// Creates a connector for the socket at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Socket path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Connector for UnixSocketConnector {
    async fn connect(&self) -> io::Result<Box<dyn PlayerStream>> {
        let stream = UnixStream::connect(&self.path).await?;
        Ok(Box::new(stream))
    }

    fn endpoint(&self) -> String {
        self.path.display().to_string()
    }
}

/// An open, line-framed connection to the player
pub struct PlayerConnection {
    stream: BufReader<Box<dyn PlayerStream>>,
    line: String,
    in_flight: bool,
}

impl PlayerConnection {
    /// Wraps a raw stream.
    pub fn new(stream: Box<dyn PlayerStream>) -> Self {
        Self {
            stream: BufReader::new(stream),
            line: String::new(),
            in_flight: false,
        }
    }

    /// Whether a previous exchange was abandoned before its response was read.
    ///
    /// Such a connection may hold a half-written request or an unread
    /// response and must not be reused.
    pub fn interrupted(&self) -> bool {
        self.in_flight
    }

    /// Writes one command line and reads until its response arrives.
    ///
    /// Unsolicited `{"event": ...}` lines and responses carrying a different
    /// `request_id` are skipped. A response without `request_id` is accepted,
    /// since the player only echoes ids it was given.
    ///
    /// # Errors
    /// - `ChannelError::Timeout` if no matching response arrives before `timeout`
    /// - `ChannelError::ConnectionClosed` on EOF or write failure
    /// - `ChannelError::MalformedResponse` if a line is not a valid response
    pub async fn round_trip(
        &mut self,
        verb: &str,
        request_id: u64,
        line: &str,
        timeout: Duration,
    ) -> Result<PlayerResponse, ChannelError> {
        self.in_flight = true;
        let deadline = Instant::now() + timeout;
        let timed_out = || ChannelError::Timeout {
            command: verb.to_string(),
            timeout,
            attempts: 1,
        };

        let write = async {
            let stream = self.stream.get_mut();
            stream.write_all(line.as_bytes()).await?;
            stream.flush().await
        };
        timeout_at(deadline, write)
            .await
            .map_err(|_| timed_out())?
            .map_err(|_| ChannelError::ConnectionClosed)?;

        loop {
            self.line.clear();
            let read = timeout_at(deadline, self.stream.read_line(&mut self.line))
                .await
                .map_err(|_| timed_out())?
                .map_err(|_| ChannelError::ConnectionClosed)?;

            if read == 0 {
                return Err(ChannelError::ConnectionClosed);
            }

            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            trace!(line = text, "player ipc line");

            let value: Value = serde_json::from_str(text)
                .map_err(|e| ChannelError::MalformedResponse(format!("{e}: {text}")))?;

            if value.get("event").is_some() {
                continue;
            }

            let response: PlayerResponse = serde_json::from_value(value)
                .map_err(|e| ChannelError::MalformedResponse(format!("{e}: {text}")))?;

            match response.request_id {
                Some(id) if id != request_id => continue,
                _ => {
                    self.in_flight = false;
                    return Ok(response);
                }
            }
        }
    }
}
