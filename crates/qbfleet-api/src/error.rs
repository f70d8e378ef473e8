use thiserror::Error;

/// Top-level error type for the `qbfleet-api` crate.
///
/// Covers every failure mode of a single host: authentication,
/// transport, remote API rejections, and local validation. Nothing
/// panics across this boundary — callers always see one of these.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (wrong credentials, banned IP, unexpected body).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The host rejected a previously valid session (HTTP 403).
    ///
    /// No automatic re-login is attempted; the next operation on a
    /// fresh client will authenticate again.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Remote API ──────────────────────────────────────────────────
    /// Non-2xx response on an authenticated call.
    #[error("Remote API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Local ───────────────────────────────────────────────────────
    /// Input rejected before any network call was made.
    #[error("Validation failed: {message}")]
    Validation { message: String },
}

impl Error {
    /// Returns `true` if the host actively refused the connection (or
    /// was otherwise unreachable at the TCP/DNS level).
    ///
    /// The health monitor reports this class separately from
    /// authentication or API failures.
    pub fn is_connection_refused(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` for authentication-class failures.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::SessionExpired)
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
///
/// Error bodies from the host may carry non-ASCII text; slicing at a
/// fixed byte offset would panic mid-character.
pub(crate) fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
