//! Failed-login lockout policy.

use serde::{Deserialize, Serialize};

/// Lockout bookkeeping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Consecutive failed password checks that lock the account.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Minutes after the last bad attempt before a locked account may
    /// log in again (`0` = locked until an administrator unlocks it).
    #[serde(default)]
    pub lockout_duration_minutes: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed(),
            lockout_duration_minutes: 0,
        }
    }
}

fn default_max_failed() -> u32 {
    5
}
