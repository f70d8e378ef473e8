// ── Health monitoring ──
//
// Fixed-interval authenticate-only probes against every enabled host.
// Each pass fans out `login()` calls, classifies every host as online
// or offline, hands a sample to the persistence sink, and publishes
// per-host and pass-summary events. A probe pass never fails as a
// whole; unreachable hosts simply come back offline.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use qbfleet_api::TransportConfig;

use crate::aggregate::aggregate;
use crate::model::{HealthSample, HostId, HostStatus};
use crate::registry::HostSource;

/// Where probe samples go. Implementations own retention.
pub trait HealthSink: Send + Sync {
    fn record_sample(&self, sample: &HealthSample);
}

/// Outbound channel for monitor events (websocket bridge, logging, ...).
pub trait StatusPublisher: Send + Sync {
    fn publish(&self, event: MonitorEvent);
}

/// Events emitted by the monitor, one `HostStatus` per host per pass
/// followed by a single `PassSummary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MonitorEvent {
    HostStatus {
        host_id: HostId,
        name: String,
        status: HostStatus,
        latency_ms: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },
    PassSummary {
        total: usize,
        online: usize,
        offline: usize,
        timestamp: DateTime<Utc>,
    },
}

/// Fan-out publisher over a tokio broadcast channel.
///
/// Slow or absent subscribers never block a probe pass; send errors
/// (no receivers) are ignored.
pub struct BroadcastPublisher {
    tx: broadcast::Sender<MonitorEvent>,
}

impl BroadcastPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }
}

impl StatusPublisher for BroadcastPublisher {
    fn publish(&self, event: MonitorEvent) {
        let _ = self.tx.send(event);
    }
}

/// Monitor tuning knobs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between probe passes.
    pub interval: Duration,
    /// Consecutive failed probes before a host flips to offline.
    /// 1 means a single failure flips immediately.
    pub offline_after: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            offline_after: 1,
        }
    }
}

/// Aggregate numbers for one completed probe pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PassReport {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
}

/// Periodic prober over the configured host set.
pub struct HealthMonitor {
    source: Arc<dyn HostSource>,
    sink: Arc<dyn HealthSink>,
    publisher: Arc<dyn StatusPublisher>,
    transport: TransportConfig,
    config: MonitorConfig,
    failures: Mutex<HashMap<HostId, u32>>,
    status: Mutex<HashMap<HostId, HostStatus>>,
}

impl HealthMonitor {
    pub fn new(
        source: Arc<dyn HostSource>,
        sink: Arc<dyn HealthSink>,
        publisher: Arc<dyn StatusPublisher>,
        transport: TransportConfig,
        config: MonitorConfig,
    ) -> Self {
        Self {
            source,
            sink,
            publisher,
            transport,
            config,
            failures: Mutex::new(HashMap::new()),
            status: Mutex::new(HashMap::new()),
        }
    }

    /// Last known status for a host, `Unknown` before its first probe.
    pub fn status_of(&self, id: &HostId) -> HostStatus {
        self.status
            .lock()
            .expect("status lock poisoned")
            .get(id)
            .copied()
            .unwrap_or(HostStatus::Unknown)
    }

    /// Probe loop. Runs one pass immediately, then every
    /// `config.interval` until the token is cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);

        info!(interval = ?self.config.interval, "health monitor started");

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    info!("health monitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let report = self.run_pass().await;
                    debug!(
                        total = report.total,
                        online = report.online,
                        offline = report.offline,
                        "probe pass complete"
                    );
                }
            }
        }
    }

    /// Run one probe pass over every enabled host.
    pub async fn run_pass(&self) -> PassReport {
        let hosts = self.source.list_enabled();
        let results = aggregate(&hosts, &self.transport, |client| async move {
            client.login().await
        })
        .await;

        let timestamp = Utc::now();
        let mut online = 0usize;
        let mut offline = 0usize;

        for result in &results {
            let status = self.apply_transition(&result.host.id, result.success);
            match status {
                HostStatus::Online => online += 1,
                _ => offline += 1,
            }

            if status == HostStatus::Offline {
                warn!(
                    host = %result.host.name,
                    error = result.error.as_deref().unwrap_or("probe failed"),
                    "host is offline"
                );
            }

            let sample = HealthSample {
                host_id: result.host.id.clone(),
                status,
                latency_ms: result.elapsed_ms,
                error: result.error.clone(),
                timestamp,
            };
            self.sink.record_sample(&sample);

            self.publisher.publish(MonitorEvent::HostStatus {
                host_id: result.host.id.clone(),
                name: result.host.name.clone(),
                status,
                latency_ms: result.elapsed_ms,
                error: result.error.clone(),
                timestamp,
            });
        }

        let report = PassReport {
            total: results.len(),
            online,
            offline,
        };

        self.publisher.publish(MonitorEvent::PassSummary {
            total: report.total,
            online: report.online,
            offline: report.offline,
            timestamp,
        });

        report
    }

    /// Fold one probe outcome into the host's tracked state.
    ///
    /// A success always flips the host online and clears its failure
    /// streak. A failure flips it offline once the streak reaches
    /// `offline_after`, or immediately when the host was not online to
    /// begin with.
    fn apply_transition(&self, id: &HostId, success: bool) -> HostStatus {
        let mut failures = self.failures.lock().expect("failures lock poisoned");
        let mut status = self.status.lock().expect("status lock poisoned");

        let next = if success {
            failures.remove(id);
            HostStatus::Online
        } else {
            let streak = failures.entry(id.clone()).or_insert(0);
            *streak += 1;
            let current = status.get(id).copied().unwrap_or(HostStatus::Unknown);
            if *streak >= self.config.offline_after || current != HostStatus::Online {
                HostStatus::Offline
            } else {
                current
            }
        };

        status.insert(id.clone(), next);
        next
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use secrecy::SecretString;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::model::HostConnection;
    use crate::registry::StaticHosts;

    use super::*;

    struct RecordingSink {
        samples: Mutex<Vec<HealthSample>>,
    }

    impl RecordingSink {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                samples: Mutex::new(Vec::new()),
            })
        }

        fn samples(&self) -> Vec<HealthSample> {
            self.samples.lock().unwrap().clone()
        }
    }

    impl HealthSink for RecordingSink {
        fn record_sample(&self, sample: &HealthSample) {
            self.samples.lock().unwrap().push(sample.clone());
        }
    }

    struct RecordingPublisher {
        events: Mutex<Vec<MonitorEvent>>,
    }

    impl RecordingPublisher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<MonitorEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl StatusPublisher for RecordingPublisher {
        fn publish(&self, event: MonitorEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn host_for(id: &str, url: &str) -> HostConnection {
        let parsed = Url::parse(url).unwrap();
        HostConnection {
            id: HostId::from(id),
            name: id.to_owned(),
            host: parsed.host_str().unwrap().to_owned(),
            port: parsed.port().unwrap_or(80),
            username: "admin".into(),
            password: SecretString::from("pw".to_owned()),
            enabled: true,
        }
    }

    async fn mount_login_ok(server: &MockServer) {
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

    async fn mount_login_refused(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v2/auth/login"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Fails."))
            .mount(server)
            .await;
    }

    fn monitor_for(
        hosts: Vec<HostConnection>,
        sink: Arc<RecordingSink>,
        publisher: Arc<RecordingPublisher>,
        config: MonitorConfig,
    ) -> HealthMonitor {
        HealthMonitor::new(
            Arc::new(StaticHosts::new(hosts)),
            sink,
            publisher,
            TransportConfig::default(),
            config,
        )
    }

    #[tokio::test]
    async fn status_flips_offline_online_offline_across_passes() {
        let server = MockServer::start().await;
        mount_login_refused(&server).await;

        let sink = RecordingSink::new();
        let publisher = RecordingPublisher::new();
        let monitor = monitor_for(
            vec![host_for("a", &server.uri())],
            sink.clone(),
            publisher,
            MonitorConfig::default(),
        );
        let id = HostId::from("a");

        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Offline);

        server.reset().await;
        mount_login_ok(&server).await;
        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Online);

        server.reset().await;
        mount_login_refused(&server).await;
        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Offline);

        let statuses: Vec<HostStatus> = sink.samples().iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![HostStatus::Offline, HostStatus::Online, HostStatus::Offline]
        );
    }

    #[tokio::test]
    async fn pass_counts_mixed_fleet_and_records_failed_probe_latency() {
        let healthy = MockServer::start().await;
        mount_login_ok(&healthy).await;

        // An address nothing is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let dead = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let sink = RecordingSink::new();
        let publisher = RecordingPublisher::new();
        let monitor = monitor_for(
            vec![host_for("up", &healthy.uri()), host_for("down", &dead)],
            sink.clone(),
            publisher.clone(),
            MonitorConfig::default(),
        );

        let report = monitor.run_pass().await;
        assert_eq!(report.total, 2);
        assert_eq!(report.online, 1);
        assert_eq!(report.offline, 1);

        let samples = sink.samples();
        assert_eq!(samples.len(), 2);
        let down = samples
            .iter()
            .find(|s| s.host_id.as_str() == "down")
            .unwrap();
        assert_eq!(down.status, HostStatus::Offline);
        assert!(down.error.as_deref().unwrap().starts_with("connection refused"));

        let events = publisher.events();
        assert_eq!(events.len(), 3);
        let summaries: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, MonitorEvent::PassSummary { .. }))
            .collect();
        assert_eq!(summaries.len(), 1);
        if let MonitorEvent::PassSummary { total, online, offline, .. } = summaries[0] {
            assert_eq!((*total, *online, *offline), (2, 1, 1));
        }
    }

    #[tokio::test]
    async fn offline_flip_can_be_debounced() {
        let server = MockServer::start().await;
        mount_login_ok(&server).await;

        let sink = RecordingSink::new();
        let publisher = RecordingPublisher::new();
        let monitor = monitor_for(
            vec![host_for("a", &server.uri())],
            sink,
            publisher,
            MonitorConfig {
                offline_after: 2,
                ..MonitorConfig::default()
            },
        );
        let id = HostId::from("a");

        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Online);

        // First failure is absorbed, second flips.
        server.reset().await;
        mount_login_refused(&server).await;
        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Online);
        monitor.run_pass().await;
        assert_eq!(monitor.status_of(&id), HostStatus::Offline);
    }

    #[tokio::test]
    async fn broadcast_publisher_delivers_to_subscribers() {
        let publisher = BroadcastPublisher::new(16);
        let mut rx = publisher.subscribe();

        publisher.publish(MonitorEvent::PassSummary {
            total: 3,
            online: 2,
            offline: 1,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, MonitorEvent::PassSummary { total: 3, .. }));
    }

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(MonitorEvent::PassSummary {
            total: 1,
            online: 1,
            offline: 0,
            timestamp: Utc::now(),
        })
        .unwrap();
        assert_eq!(json["type"], "pass_summary");
        assert_eq!(json["data"]["online"], 1);
    }
}
