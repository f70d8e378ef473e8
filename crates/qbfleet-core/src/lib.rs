//! Fleet orchestration over multiple qBittorrent hosts.
//!
//! Builds on [`qbfleet_api`] to provide fan-out aggregation across a
//! configured host set, a single-host dispatch facade, and a periodic
//! health prober with pluggable persistence and event publication.

pub mod aggregate;
pub mod error;
pub mod fleet;
pub mod model;
pub mod monitor;
pub mod registry;

pub use aggregate::{HostResult, aggregate};
pub use error::CoreError;
pub use fleet::{Fleet, HostOverview, OverviewErrors};
pub use model::{HealthSample, HostConnection, HostId, HostRef, HostStatus};
pub use monitor::{
    BroadcastPublisher, HealthMonitor, HealthSink, MonitorConfig, MonitorEvent, PassReport,
    StatusPublisher,
};
pub use registry::{HostSource, StaticHosts};
