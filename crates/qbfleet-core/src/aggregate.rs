// ── Fan-out aggregation ──
//
// Runs one operation against N hosts concurrently and collects every
// outcome. Each host gets a freshly constructed client with its own
// session; failures (construction, network, API) become failure
// entries rather than aborting the pass. The aggregate call itself
// never fails.

use std::future::Future;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use serde::Serialize;
use tracing::debug;

use qbfleet_api::{Error as ApiError, HostClient, TransportConfig};

use crate::model::{HostConnection, HostRef};

/// Per-host wrapper for one fan-out outcome.
///
/// Exactly one of these exists per requested host, success or not.
#[derive(Debug, Clone, Serialize)]
pub struct HostResult<T> {
    pub host: HostRef,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Wall-clock time the host's call took, failures included.
    pub elapsed_ms: u64,
}

impl<T> HostResult<T> {
    pub fn ok(host: HostRef, data: T, elapsed: Duration) -> Self {
        Self {
            host,
            success: true,
            data: Some(data),
            error: None,
            elapsed_ms: elapsed_millis(elapsed),
        }
    }

    pub fn failure(host: HostRef, error: &ApiError, elapsed: Duration) -> Self {
        Self {
            host,
            success: false,
            data: None,
            error: Some(describe_error(error)),
            elapsed_ms: elapsed_millis(elapsed),
        }
    }

    fn from_outcome(host: HostRef, outcome: Result<T, ApiError>, elapsed: Duration) -> Self {
        match outcome {
            Ok(data) => Self::ok(host, data, elapsed),
            Err(ref e) => Self::failure(host, e, elapsed),
        }
    }
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Human-readable failure text, with connection refusal kept
/// recognizable for the health monitor's reporting.
pub fn describe_error(err: &ApiError) -> String {
    if err.is_connection_refused() {
        format!("connection refused: {err}")
    } else {
        err.to_string()
    }
}

/// Build a fresh client for one host connection.
pub fn build_client(
    conn: &HostConnection,
    transport: &TransportConfig,
) -> Result<HostClient, ApiError> {
    let url = conn.base_url()?;
    HostClient::new(url, conn.username.clone(), conn.password.clone(), transport)
}

/// Run `op` against every host concurrently and wait for all to settle.
///
/// Fire all, then await all: pass latency is bounded by the slowest
/// single host's own call timeout, not the sum. The output has exactly
/// one entry per input host; order follows the input list.
pub async fn aggregate<T, F, Fut>(
    hosts: &[HostConnection],
    transport: &TransportConfig,
    op: F,
) -> Vec<HostResult<T>>
where
    F: Fn(HostClient) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    debug!(hosts = hosts.len(), "starting fan-out");

    let op = &op;
    let calls = hosts.iter().map(|conn| {
        let host = conn.reference();
        let client = build_client(conn, transport);
        async move {
            let started = Instant::now();
            match client {
                Ok(client) => {
                    let outcome = op(client).await;
                    HostResult::from_outcome(host, outcome, started.elapsed())
                }
                Err(ref e) => HostResult::failure(host, e, started.elapsed()),
            }
        }
    });

    join_all(calls).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use secrecy::SecretString;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::model::HostId;

    use super::*;

    fn host_for(name: &str, url: &str) -> HostConnection {
        let parsed = Url::parse(url).unwrap();
        HostConnection {
            id: HostId::from(name),
            name: name.to_owned(),
            host: parsed.host_str().unwrap().to_owned(),
            port: parsed.port().unwrap_or(80),
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
            enabled: true,
        }
    }

    async fn healthy_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Ok.")
                    .insert_header("Set-Cookie", "SID=t; path=/"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/torrents/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        server
    }

    /// An address nothing is listening on.
    fn dead_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn empty_host_list_yields_empty_output() {
        let results: Vec<HostResult<Vec<qbfleet_api::Torrent>>> =
            aggregate(&[], &TransportConfig::default(), |client| async move {
                client.torrents().await
            })
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn one_refused_host_does_not_drop_or_abort_the_others() {
        let a = healthy_server().await;
        let c = healthy_server().await;
        let hosts = vec![
            host_for("a", &a.uri()),
            host_for("b", &dead_url()),
            host_for("c", &c.uri()),
        ];

        let results = aggregate(&hosts, &TransportConfig::default(), |client| async move {
            client.torrents().await
        })
        .await;

        assert_eq!(results.len(), 3);

        let by_id = |id: &str| results.iter().find(|r| r.host.id.as_str() == id).unwrap();
        assert!(by_id("a").success);
        assert_eq!(by_id("a").data.as_ref().map(Vec::len), Some(0));
        assert!(by_id("c").success);

        let b = by_id("b");
        assert!(!b.success);
        assert!(b.data.is_none());
        assert!(
            b.error.as_deref().unwrap().starts_with("connection refused"),
            "got: {:?}",
            b.error
        );
    }

    #[tokio::test]
    async fn unparseable_address_becomes_a_failure_entry() {
        let hosts = vec![HostConnection {
            host: "bad host".into(),
            ..host_for("x", "http://127.0.0.1:1")
        }];

        let results = aggregate(&hosts, &TransportConfig::default(), |client| async move {
            client.torrents().await
        })
        .await;

        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(results[0].error.is_some());
    }

    #[tokio::test]
    async fn double_delete_is_safe_for_the_aggregate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Ok.")
                    .insert_header("Set-Cookie", "SID=t; path=/"),
            )
            .mount(&server)
            .await;
        // First delete succeeds, later ones report conflict.
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/delete"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/delete"))
            .respond_with(ResponseTemplate::new(409).set_body_string("unknown hash"))
            .mount(&server)
            .await;

        let hosts = vec![host_for("a", &server.uri())];
        let hashes = vec!["aaa".to_owned()];

        for expect_success in [true, false] {
            let hashes = hashes.clone();
            let results = aggregate(&hosts, &TransportConfig::default(), move |client| {
                let hashes = hashes.clone();
                async move { client.delete(&hashes, false).await }
            })
            .await;
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].success, expect_success);
        }
    }
}
