//! Configuration for the hosted lookup client.

use serde::{Deserialize, Serialize};

/// Configuration for a hosted lookup service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Service base URL (e.g. `https://api.cashaccount.info`).
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl LookupConfig {
    /// Create a configuration for the given service URL.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// Configuration for the reference lookup service.
    pub fn cashaccount_info() -> Self {
        Self::new("https://api.cashaccount.info")
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}
