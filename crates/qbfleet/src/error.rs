//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use qbfleet_config::ConfigError;
use qbfleet_core::CoreError;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(dead_code)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to host at {url}")]
    #[diagnostic(
        code(qbfleet::connection_failed),
        help(
            "Check that the qBittorrent WebUI is running and reachable.\n\
             URL: {url}\n\
             Try: qbfleet hosts test"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(qbfleet::auth_failed),
        help(
            "Verify the username and password for this host.\n\
             Credentials come from password_env, the system keyring, or the config file."
        )
    )]
    AuthFailed { message: String },

    #[error("No password configured for host '{host}'")]
    #[diagnostic(
        code(qbfleet::no_credentials),
        help(
            "Set a password in the config file, the system keyring,\n\
             or an environment variable named by password_env."
        )
    )]
    NoCredentials { host: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Host '{identifier}' not found")]
    #[diagnostic(
        code(qbfleet::host_not_found),
        help("Run: qbfleet hosts list to see configured hosts")
    )]
    HostNotFound { identifier: String },

    #[error("Host '{name}' is disabled")]
    #[diagnostic(
        code(qbfleet::host_disabled),
        help("Enable it in the config file (enabled = true) and retry.")
    )]
    HostDisabled { name: String },

    // ── Fleet status ─────────────────────────────────────────────────
    #[error("{offline} of {total} host(s) offline")]
    #[diagnostic(
        code(qbfleet::hosts_down),
        help("Run: qbfleet hosts test for per-host detail")
    )]
    HostsDown { offline: usize, total: usize },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error: {message}")]
    #[diagnostic(code(qbfleet::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(qbfleet::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(qbfleet::config),
        help("Check the config file at the path shown by the error, or pass --config.")
    )]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(qbfleet::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(qbfleet::timeout),
        help("Increase the timeout with --timeout or check host responsiveness.")
    )]
    Timeout,

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::HostNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::HostNotFound { identifier } => CliError::HostNotFound { identifier },

            CoreError::HostDisabled { name } => CliError::HostDisabled { name },

            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired => CliError::AuthFailed {
                message: "session rejected by host".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config { message },

            CoreError::Internal(message) => CliError::ApiError {
                message,
                status: None,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { host } => CliError::NoCredentials { host },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
