// Authentication
//
// Cookie-based session login. The login endpoint answers a literal
// "Ok." body on success and sets the SID cookie; "Fails." (still HTTP
// 200) means bad credentials. The cookie is captured manually and
// attached as a `Cookie` header on subsequent calls.

use reqwest::header;
use secrecy::ExposeSecret;
use tracing::debug;

use crate::client::HostClient;
use crate::error::{Error, truncate_on_char_boundary};

impl HostClient {
    /// Authenticate with the host using username/password.
    ///
    /// `POST /api/v2/auth/login`, URL-form-encoded. On success the SID
    /// cookie is stored and used for all subsequent requests on this
    /// client. Any network error, non-2xx status, or non-`Ok.` body is
    /// an authentication failure; connection refusal stays
    /// distinguishable via [`Error::is_connection_refused`].
    pub async fn login(&self) -> Result<(), Error> {
        let url = self.api_url("auth/login");
        debug!("logging in at {url}");

        let form = [
            ("username", self.username().to_owned()),
            ("password", self.password().expose_secret().to_owned()),
        ];

        let resp = self
            .http()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!(
                    "login failed (HTTP {status}): {}",
                    truncate_on_char_boundary(&body, 200)
                ),
            });
        }

        // Capture the SID cookie before consuming the body.
        let sid = extract_sid(resp.headers());

        let body = resp.text().await.map_err(Error::Transport)?;
        if body.trim() != "Ok." {
            return Err(Error::Authentication {
                message: if body.is_empty() {
                    "login rejected by host (empty response)".into()
                } else {
                    format!(
                        "login rejected by host: {}",
                        truncate_on_char_boundary(&body, 200)
                    )
                },
            });
        }

        match sid {
            Some(cookie) => {
                self.set_session(cookie);
                debug!("login successful");
                Ok(())
            }
            None => Err(Error::Authentication {
                message: "login accepted but no SID cookie was set".into(),
            }),
        }
    }
}

/// Pull the `SID=...` pair out of the `Set-Cookie` headers.
fn extract_sid(headers: &header::HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|cookie| {
            let pair = cookie.split(';').next()?.trim();
            pair.starts_with("SID=").then(|| pair.to_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sid_and_ignores_other_cookies() {
        let mut headers = header::HeaderMap::new();
        headers.append(
            header::SET_COOKIE,
            "theme=dark; Path=/".parse().expect("header"),
        );
        headers.append(
            header::SET_COOKIE,
            "SID=abc123; HttpOnly; Path=/".parse().expect("header"),
        );
        assert_eq!(extract_sid(&headers).as_deref(), Some("SID=abc123"));
    }

    #[test]
    fn no_sid_yields_none() {
        let headers = header::HeaderMap::new();
        assert!(extract_sid(&headers).is_none());
    }
}
