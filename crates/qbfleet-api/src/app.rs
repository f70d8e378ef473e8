// Application-level endpoints
//
// Transfer stats, the maindata sync snapshot, and preferences.
// maindata and preferences are version-dependent shapes the caller
// consumes unmodified, so they come back as raw JSON.

use tracing::debug;

use crate::client::HostClient;
use crate::error::Error;
use crate::models::TransferInfo;

impl HostClient {
    /// Global transfer statistics.
    ///
    /// `GET /api/v2/transfer/info`
    pub async fn transfer_info(&self) -> Result<TransferInfo, Error> {
        debug!("fetching transfer info");
        self.get_json("transfer/info").await
    }

    /// Full sync snapshot (server state, categories, torrents).
    ///
    /// `GET /api/v2/sync/maindata` — passed through as raw JSON.
    pub async fn main_data(&self) -> Result<serde_json::Value, Error> {
        debug!("fetching maindata snapshot");
        self.get_json("sync/maindata").await
    }

    /// Application preferences (save paths, limits, ...).
    ///
    /// `GET /api/v2/app/preferences` — passed through as raw JSON.
    pub async fn preferences(&self) -> Result<serde_json::Value, Error> {
        debug!("fetching preferences");
        self.get_json("app/preferences").await
    }
}
