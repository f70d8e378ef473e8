// ── Core error types ──
//
// User-facing errors from qbfleet-core. Consumers never see raw HTTP
// failures directly; the `From<qbfleet_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Registry ─────────────────────────────────────────────────────
    #[error("Host not found: {identifier}")]
    HostNotFound { identifier: String },

    #[error("Host '{name}' is disabled")]
    HostDisabled { name: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Cannot connect to host {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired on host -- re-authentication required")]
    SessionExpired,

    #[error("Request timed out")]
    Timeout,

    // ── Operations ───────────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Remote API error: {message}")]
    Api {
        message: String,
        /// HTTP status code, when the host answered at all.
        status: Option<u16>,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<qbfleet_api::Error> for CoreError {
    fn from(err: qbfleet_api::Error) -> Self {
        match err {
            qbfleet_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            qbfleet_api::Error::SessionExpired => CoreError::SessionExpired,
            qbfleet_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            qbfleet_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            qbfleet_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            qbfleet_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            qbfleet_api::Error::Validation { message } => CoreError::ValidationFailed { message },
        }
    }
}
