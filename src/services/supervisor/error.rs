use std::time::Duration;

/// Errors raised while talking to the service manager
#[derive(thiserror::Error, Debug)]
pub enum SupervisorError {
    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),

    /// The service manager did not answer in time
    #[error("Service manager did not complete {operation} within {timeout:?}")]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
        /// Timeout that elapsed
        timeout: Duration,
    },

    /// The service manager refused the request
    #[error("Service manager rejected {operation} for {unit}: {reason}")]
    Rejected {
        /// Operation that was rejected
        operation: &'static str,
        /// Unit name
        unit: String,
        /// Reason reported
        reason: String,
    },
}
