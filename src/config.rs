use serde::{Deserialize, Serialize};

use crate::errors::{ProtocolError, ProtocolResult};

pub const DEFAULT_SCHEME: &str = "ijkmediadatasource";
pub const DEFAULT_READ_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_READ_RETRY_BACKOFF_MS: u64 = 10;

/// How a host-side reader reacts to `WouldBlock`. The adapter itself never retries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadRetryConfig {
    pub max_attempts: u32,
    pub backoff_ms: u64,
}

impl Default for ReadRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_READ_RETRY_ATTEMPTS,
            backoff_ms: DEFAULT_READ_RETRY_BACKOFF_MS,
        }
    }
}

impl ReadRetryConfig {
    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> std::time::Duration {
        let shift = attempt.saturating_sub(1).min(16);
        std::time::Duration::from_millis(self.backoff_ms.saturating_mul(1_u64 << shift))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// URL scheme the adapter registers under and strips at open.
    pub scheme: String,
    pub read_retry: ReadRetryConfig,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            read_retry: ReadRetryConfig::default(),
        }
    }
}

impl ProtocolConfig {
    pub fn from_json(json: &str) -> ProtocolResult<Self> {
        let config: ProtocolConfig = serde_json::from_str(json)
            .map_err(|e| ProtocolError::invalid(format!("Invalid protocol config: {}", e)))?;

        if config.scheme.is_empty() || config.scheme.contains(':') {
            return Err(ProtocolError::invalid(format!(
                "Invalid scheme: {:?}",
                config.scheme
            )));
        }

        Ok(config)
    }

    /// Prefix stripped from URLs at open, e.g. `ijkmediadatasource:`.
    pub fn url_prefix(&self) -> String {
        format!("{}:", self.scheme)
    }
}
