// ── Fleet domain types ──
//
// Host connections as configured by the caller, the per-result host
// identity echo, and the health samples the monitor emits.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::Display;
use url::Url;
use uuid::Uuid;

// ── HostId ───────────────────────────────────────────────────────────

/// Opaque host identity, stable across aggregation passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identity (for hosts configured without one).
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ── HostConnection ───────────────────────────────────────────────────

/// One configured qBittorrent host: address, credentials, enabled flag.
///
/// Owned by the caller's registry; the fleet layer reads a snapshot at
/// call time and never mutates it.
#[derive(Debug, Clone)]
pub struct HostConnection {
    pub id: HostId,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub enabled: bool,
}

impl HostConnection {
    /// WebUI base URL for this host.
    pub fn base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&format!("http://{}:{}/", self.host, self.port))
    }

    /// The identity echoed into every aggregated result.
    pub fn reference(&self) -> HostRef {
        HostRef {
            id: self.id.clone(),
            name: self.name.clone(),
            host: self.host.clone(),
        }
    }
}

/// Host identity carried in aggregated results and events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRef {
    pub id: HostId,
    pub name: String,
    pub host: String,
}

// ── Health types ─────────────────────────────────────────────────────

/// Probe-driven host status. `Unknown` exists only before the first
/// probe; afterwards a host is always `Online` or `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HostStatus {
    Unknown,
    Online,
    Offline,
}

/// One probe outcome for one host, as handed to the persistence sink.
///
/// Retention (keep-last-N per host) is the sink implementor's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSample {
    pub host_id: HostId,
    pub status: HostStatus,
    /// Probe round-trip time in milliseconds (recorded for failures too).
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}
