use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::player::secs;

/// Startup sequencing for the playback controller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StartupConfig {
    /// Initialization attempts before giving up.
    pub init_attempts: u32,

    /// Base of the exponential backoff between initialization attempts.
    pub init_backoff_base_secs: f64,

    /// Upper bound of the initialization backoff.
    pub init_backoff_cap_secs: f64,

    /// Bounded wait applied to each readiness check.
    pub init_check_timeout_secs: f64,

    /// Attempts at establishing the idle logo after initialization.
    pub logo_attempts: u32,

    /// Delay between idle logo attempts.
    pub logo_retry_delay_secs: f64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            init_attempts: 3,
            init_backoff_base_secs: 2.0,
            init_backoff_cap_secs: 30.0,
            init_check_timeout_secs: 10.0,
            logo_attempts: 3,
            logo_retry_delay_secs: 2.0,
        }
    }
}

impl StartupConfig {
    /// Backoff before initialization attempt `attempt + 1` (1-based `attempt`).
    ///
    /// Doubles from the base on each attempt and never exceeds the cap.
    pub fn init_backoff(&self, attempt: u32) -> Duration {
        let base = secs(self.init_backoff_base_secs);
        let cap = secs(self.init_backoff_cap_secs);
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        base.saturating_mul(factor).min(cap)
    }

    /// Bounded wait for each readiness check.
    pub fn init_check_timeout(&self) -> Duration {
        secs(self.init_check_timeout_secs)
    }

    /// Delay between idle logo attempts.
    pub fn logo_retry_delay(&self) -> Duration {
        secs(self.logo_retry_delay_secs)
    }
}
