// Shared transport configuration for building reqwest::Client instances.
//
// Every HostClient gets its own client built from this config; read and
// control calls use `timeout`, bulk add/upload calls override with
// `upload_timeout` per request.

use std::time::Duration;

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for reads and control actions (list, pause, delete...).
    pub timeout: Duration,
    /// Timeout for bulk operations (add by URL, .torrent upload).
    pub upload_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("qbfleet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
