// ── Connection registry boundary ──
//
// The set of configured hosts is owned by an external collaborator
// (config file, database, ...). The core only needs a snapshot at call
// time, so the boundary is a plain trait returning owned connections.

use crate::model::HostConnection;

/// Source of configured hosts.
///
/// Implementations return a snapshot; the fleet layer never holds on
/// to connections across calls, so registry mutations take effect on
/// the next aggregation pass or probe tick.
pub trait HostSource: Send + Sync {
    /// All configured hosts, enabled or not.
    fn list_hosts(&self) -> Vec<HostConnection>;

    /// Enabled hosts only — the set fan-out operations run against.
    fn list_enabled(&self) -> Vec<HostConnection> {
        self.list_hosts().into_iter().filter(|h| h.enabled).collect()
    }
}

/// Fixed in-memory host list (CLI invocations, tests).
pub struct StaticHosts {
    hosts: Vec<HostConnection>,
}

impl StaticHosts {
    pub fn new(hosts: Vec<HostConnection>) -> Self {
        Self { hosts }
    }
}

impl HostSource for StaticHosts {
    fn list_hosts(&self) -> Vec<HostConnection> {
        self.hosts.clone()
    }
}
