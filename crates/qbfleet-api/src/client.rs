// Per-host HTTP client
//
// Wraps `reqwest::Client` with qBittorrent-specific URL construction,
// session-cookie handling, and status-to-error mapping. Endpoint
// groups (auth, torrents, app) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header;
use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, truncate_on_char_boundary};
use crate::transport::TransportConfig;

/// Client for one qBittorrent WebUI instance.
///
/// Owns a single session: the `SID` cookie captured at login, stored
/// until the client is dropped. Every data/action call ensures a
/// session exists first (exactly one login attempt); a session the
/// host has expired is surfaced as [`Error::SessionExpired`], never
/// silently retried.
pub struct HostClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    upload_timeout: Duration,
    /// Session cookie pair (`"SID=..."`) captured from the login
    /// response. Held for the lifetime of this client only.
    session: RwLock<Option<String>>,
}

impl HostClient {
    /// Create a client for the WebUI at `base_url`
    /// (e.g. `http://10.0.0.5:8080`).
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
            upload_timeout: transport.upload_timeout,
            session: RwLock::new(None),
        })
    }

    /// The host base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The login username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The underlying HTTP client (for auth flows needing direct access).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    pub(crate) fn upload_timeout(&self) -> Duration {
        self.upload_timeout
    }

    // ── Session management ───────────────────────────────────────────

    /// Whether a session cookie is currently cached.
    pub fn has_session(&self) -> bool {
        self.session
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    /// Store the session cookie pair captured at login.
    pub(crate) fn set_session(&self, cookie: String) {
        debug!(host = %self.base_url, "storing session cookie");
        *self.session.write().expect("session lock poisoned") = Some(cookie);
    }

    /// Clone the stored cookie pair for a `Cookie` request header.
    pub(crate) fn session_header(&self) -> Option<String> {
        self.session
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Ensure a session exists, logging in at most once.
    ///
    /// A login failure short-circuits the calling operation: no
    /// further network call is attempted.
    pub(crate) async fn ensure_session(&self) -> Result<(), Error> {
        if self.has_session() {
            return Ok(());
        }
        self.login().await
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for a WebUI API path: `{base}/api/v2/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Url {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/v2/{path}")).expect("invalid API URL")
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Authenticated GET returning deserialized JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.ensure_session().await?;

        let url = self.api_url(path);
        debug!("GET {url}");

        let mut req = self.http.get(url);
        if let Some(cookie) = self.session_header() {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        let body = self.check_status(resp).await?;

        serde_json::from_str(&body).map_err(|e| {
            let preview = truncate_on_char_boundary(&body, 200);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    /// Authenticated form-encoded POST, discarding the response body.
    ///
    /// `timeout` overrides the client-level timeout for bulk
    /// operations (add by URL).
    pub(crate) async fn post_form(
        &self,
        path: &str,
        form: &(impl Serialize + Sync),
        timeout: Option<Duration>,
    ) -> Result<(), Error> {
        self.ensure_session().await?;

        let url = self.api_url(path);
        debug!("POST {url}");

        let mut req = self.http.post(url).form(form);
        if let Some(cookie) = self.session_header() {
            req = req.header(header::COOKIE, cookie);
        }
        if let Some(t) = timeout {
            req = req.timeout(t);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        self.check_status(resp).await?;
        Ok(())
    }

    /// Map response status to an error, or return the body text.
    ///
    /// A 403 on an authenticated call means the host dropped our
    /// session. It is logged distinctly so operators can spot the
    /// (deliberate) absence of automatic re-login.
    pub(crate) async fn check_status(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::FORBIDDEN {
            warn!(
                host = %self.base_url,
                "host rejected the session (HTTP 403); not re-authenticating automatically"
            );
            return Err(Error::SessionExpired);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: truncate_on_char_boundary(&body, 200).to_owned(),
            });
        }

        resp.text().await.map_err(Error::Transport)
    }
}
