// ── Fleet facade ──
//
// The two contracts the core offers its callers: fetch aggregated
// state across all enabled hosts, and dispatch an action to exactly
// one host resolved by id. Single-host dispatch constructs one client
// directly; multi-host reads go through the fan-out aggregator.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use qbfleet_api::{AddTorrentOptions, HostClient, Torrent, TransferInfo, TransportConfig};

use crate::aggregate::{HostResult, aggregate, build_client};
use crate::error::CoreError;
use crate::model::{HostConnection, HostId, HostRef};
use crate::registry::HostSource;

/// Entry point for callers (CLI, HTTP layer, ...).
pub struct Fleet {
    source: Arc<dyn HostSource>,
    transport: TransportConfig,
}

/// Combined single-host detail view: maindata snapshot, preferences,
/// and transfer stats, fetched in parallel. Each section fails
/// independently; the per-section error text lands in `errors`.
#[derive(Debug, Serialize)]
pub struct HostOverview {
    pub host: HostRef,
    pub main_data: Option<serde_json::Value>,
    pub preferences: Option<serde_json::Value>,
    pub transfer: Option<TransferInfo>,
    pub errors: OverviewErrors,
}

#[derive(Debug, Default, Serialize)]
pub struct OverviewErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer: Option<String>,
}

impl Fleet {
    pub fn new(source: Arc<dyn HostSource>, transport: TransportConfig) -> Self {
        Self { source, transport }
    }

    /// Resolve a host id to an enabled connection.
    fn resolve(&self, id: &HostId) -> Result<HostConnection, CoreError> {
        let conn = self
            .source
            .list_hosts()
            .into_iter()
            .find(|h| &h.id == id)
            .ok_or_else(|| CoreError::HostNotFound {
                identifier: id.to_string(),
            })?;
        if !conn.enabled {
            return Err(CoreError::HostDisabled { name: conn.name });
        }
        Ok(conn)
    }

    fn client(&self, conn: &HostConnection) -> Result<HostClient, CoreError> {
        build_client(conn, &self.transport).map_err(CoreError::from)
    }

    // ── Multi-host reads ─────────────────────────────────────────────

    /// Torrent lists from every enabled host, partial failure tolerated.
    pub async fn all_torrents(&self) -> Vec<HostResult<Vec<Torrent>>> {
        let hosts = self.source.list_enabled();
        aggregate(&hosts, &self.transport, |client| async move {
            client.torrents().await
        })
        .await
    }

    /// Transfer statistics from every enabled host.
    pub async fn all_transfer_stats(&self) -> Vec<HostResult<TransferInfo>> {
        let hosts = self.source.list_enabled();
        aggregate(&hosts, &self.transport, |client| async move {
            client.transfer_info().await
        })
        .await
    }

    // ── Single-host reads ────────────────────────────────────────────

    /// Torrent list from one host.
    pub async fn host_torrents(&self, id: &HostId) -> Result<Vec<Torrent>, CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client.torrents().await.map_err(CoreError::from)
    }

    /// Detail view for one host: maindata + preferences + transfer
    /// stats fetched in parallel on the same session.
    pub async fn host_overview(&self, id: &HostId) -> Result<HostOverview, CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        debug!(host = %conn.name, "fetching host overview");

        let (main_data, preferences, transfer) = tokio::join!(
            client.main_data(),
            client.preferences(),
            client.transfer_info(),
        );

        let mut errors = OverviewErrors::default();
        let main_data = main_data.map_err(|e| errors.main_data = Some(e.to_string())).ok();
        let preferences = preferences
            .map_err(|e| errors.preferences = Some(e.to_string()))
            .ok();
        let transfer = transfer.map_err(|e| errors.transfer = Some(e.to_string())).ok();

        Ok(HostOverview {
            host: conn.reference(),
            main_data,
            preferences,
            transfer,
            errors,
        })
    }

    // ── Single-host actions ──────────────────────────────────────────

    /// Add a torrent by URL/magnet to one host.
    pub async fn add_by_url(
        &self,
        id: &HostId,
        urls: &str,
        savepath: Option<&str>,
    ) -> Result<(), CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client
            .add_torrent_url(urls, savepath)
            .await
            .map_err(CoreError::from)
    }

    /// Upload a `.torrent` file to one host.
    pub async fn upload_torrent(
        &self,
        id: &HostId,
        file: Bytes,
        options: &AddTorrentOptions,
    ) -> Result<(), CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client
            .add_torrent_file(file, options)
            .await
            .map_err(CoreError::from)
    }

    pub async fn pause(&self, id: &HostId, hashes: &[String]) -> Result<(), CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client.pause(hashes).await.map_err(CoreError::from)
    }

    pub async fn resume(&self, id: &HostId, hashes: &[String]) -> Result<(), CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client.resume(hashes).await.map_err(CoreError::from)
    }

    pub async fn delete(
        &self,
        id: &HostId,
        hashes: &[String],
        delete_files: bool,
    ) -> Result<(), CoreError> {
        let conn = self.resolve(id)?;
        let client = self.client(&conn)?;
        client
            .delete(hashes, delete_files)
            .await
            .map_err(CoreError::from)
    }

    // ── Batch actions ────────────────────────────────────────────────

    /// Add the same torrent URL to several hosts at once.
    ///
    /// Unknown or disabled ids in the requested set are skipped; the
    /// fan-out runs over the intersection with the enabled set.
    pub async fn add_by_url_many(
        &self,
        ids: &[HostId],
        urls: &str,
        savepath: Option<&str>,
    ) -> Vec<HostResult<()>> {
        let hosts: Vec<HostConnection> = self
            .source
            .list_enabled()
            .into_iter()
            .filter(|h| ids.contains(&h.id))
            .collect();

        let urls = urls.to_owned();
        let savepath = savepath.map(str::to_owned);

        aggregate(&hosts, &self.transport, move |client| {
            let urls = urls.clone();
            let savepath = savepath.clone();
            async move { client.add_torrent_url(&urls, savepath.as_deref()).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use secrecy::SecretString;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::registry::StaticHosts;

    use super::*;

    fn host_for(id: &str, url: &str, enabled: bool) -> HostConnection {
        let parsed = Url::parse(url).unwrap();
        HostConnection {
            id: HostId::from(id),
            name: id.to_owned(),
            host: parsed.host_str().unwrap().to_owned(),
            port: parsed.port().unwrap_or(80),
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
            enabled,
        }
    }

    fn fleet_of(hosts: Vec<HostConnection>) -> Fleet {
        Fleet::new(
            Arc::new(StaticHosts::new(hosts)),
            TransportConfig::default(),
        )
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("Ok.")
                    .insert_header("Set-Cookie", "SID=t; path=/"),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn dispatch_to_unknown_host_is_not_found() {
        let fleet = fleet_of(vec![]);
        let result = fleet.pause(&HostId::from("nope"), &["aaa".to_owned()]).await;
        assert!(matches!(result, Err(CoreError::HostNotFound { .. })));
    }

    #[tokio::test]
    async fn dispatch_to_disabled_host_is_rejected() {
        let fleet = fleet_of(vec![host_for("a", "http://127.0.0.1:9", false)]);
        let result = fleet.pause(&HostId::from("a"), &["aaa".to_owned()]).await;
        assert!(matches!(result, Err(CoreError::HostDisabled { .. })));
    }

    #[tokio::test]
    async fn all_torrents_skips_disabled_hosts() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/torrents/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let fleet = fleet_of(vec![
            host_for("a", &server.uri(), true),
            host_for("b", "http://127.0.0.1:9", false),
        ]);

        let results = fleet.all_torrents().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].host.id.as_str(), "a");
    }

    #[tokio::test]
    async fn host_overview_reports_partial_section_failures() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/api/v2/sync/maindata"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"rid": 1})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/transfer/info"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "dl_info_speed": 100, "up_info_speed": 5
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/app/preferences"))
            .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
            .mount(&server)
            .await;

        let fleet = fleet_of(vec![host_for("a", &server.uri(), true)]);
        let overview = fleet.host_overview(&HostId::from("a")).await.unwrap();

        assert!(overview.main_data.is_some());
        assert_eq!(overview.transfer.unwrap().dl_info_speed, 100);
        assert!(overview.preferences.is_none());
        assert!(overview.errors.preferences.is_some());
        assert!(overview.errors.main_data.is_none());
    }

    #[tokio::test]
    async fn upload_forwards_paused_flag_as_multipart_part() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/add"))
            .and(body_string_contains("name=\"torrents\""))
            .and(body_string_contains("name=\"paused\""))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .expect(1)
            .mount(&server)
            .await;

        let fleet = fleet_of(vec![host_for("a", &server.uri(), true)]);
        let options = AddTorrentOptions {
            paused: Some(true),
            ..AddTorrentOptions::default()
        };
        fleet
            .upload_torrent(
                &HostId::from("a"),
                Bytes::from_static(b"d8:announce0:e"),
                &options,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn batch_add_runs_only_over_requested_enabled_hosts() {
        let a = MockServer::start().await;
        let b = MockServer::start().await;
        for server in [&a, &b] {
            mount_login(server).await;
        }
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/add"))
            .and(body_string_contains("urls="))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .expect(1)
            .mount(&a)
            .await;
        // Host b is configured but not requested.
        Mock::given(method("POST"))
            .and(path("/api/v2/torrents/add"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Ok."))
            .expect(0)
            .mount(&b)
            .await;

        let fleet = fleet_of(vec![
            host_for("a", &a.uri(), true),
            host_for("b", &b.uri(), true),
        ]);

        let results = fleet
            .add_by_url_many(
                &[HostId::from("a"), HostId::from("ghost")],
                "magnet:?xt=urn:btih:aabb",
                None,
            )
            .await;

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
    }
}
