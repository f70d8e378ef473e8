// Wire types for the qBittorrent WebUI API.
//
// Torrent records are typed for the fields the fleet layer cares
// about; maindata and preferences are passed through as raw JSON
// because their shapes are host-version dependent and the caller
// consumes them unmodified.

use serde::{Deserialize, Serialize};
use strum::Display;

/// One torrent as reported by `GET /api/v2/torrents/info`.
///
/// The host sends many more fields; unknown ones are ignored and
/// missing ones default so older daemon versions still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Torrent {
    /// Content hash — the torrent's identity on the host.
    pub hash: String,
    pub name: String,
    #[serde(default)]
    pub size: i64,
    /// Completion fraction in `[0, 1]`.
    #[serde(default)]
    pub progress: f64,
    /// Download rate in bytes/s.
    #[serde(default)]
    pub dlspeed: i64,
    /// Upload rate in bytes/s.
    #[serde(default)]
    pub upspeed: i64,
    #[serde(default)]
    pub state: TorrentState,
    #[serde(default)]
    pub eta: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub added_on: Option<i64>,
}

/// Lifecycle state tag, in the daemon's own vocabulary.
///
/// Treated as opaque by the fleet layer — it is decoded only so the
/// CLI can render it, never interpreted. Anything this enum doesn't
/// know about lands in `Unknown` rather than failing the parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TorrentState {
    #[serde(rename = "downloading")]
    #[strum(serialize = "downloading")]
    Downloading,
    #[serde(rename = "uploading")]
    #[strum(serialize = "uploading")]
    Uploading,
    #[serde(rename = "pausedDL")]
    #[strum(serialize = "pausedDL")]
    PausedDl,
    #[serde(rename = "pausedUP")]
    #[strum(serialize = "pausedUP")]
    PausedUp,
    #[serde(rename = "queuedDL")]
    #[strum(serialize = "queuedDL")]
    QueuedDl,
    #[serde(rename = "queuedUP")]
    #[strum(serialize = "queuedUP")]
    QueuedUp,
    #[serde(rename = "stalledDL")]
    #[strum(serialize = "stalledDL")]
    StalledDl,
    #[serde(rename = "stalledUP")]
    #[strum(serialize = "stalledUP")]
    StalledUp,
    #[serde(rename = "checkingDL")]
    #[strum(serialize = "checkingDL")]
    CheckingDl,
    #[serde(rename = "checkingUP")]
    #[strum(serialize = "checkingUP")]
    CheckingUp,
    #[serde(rename = "checkingResumeData")]
    #[strum(serialize = "checkingResumeData")]
    CheckingResumeData,
    #[serde(rename = "metaDL")]
    #[strum(serialize = "metaDL")]
    MetaDl,
    #[serde(rename = "forcedDL")]
    #[strum(serialize = "forcedDL")]
    ForcedDl,
    #[serde(rename = "forcedUP")]
    #[strum(serialize = "forcedUP")]
    ForcedUp,
    #[serde(rename = "allocating")]
    #[strum(serialize = "allocating")]
    Allocating,
    #[serde(rename = "moving")]
    #[strum(serialize = "moving")]
    Moving,
    #[serde(rename = "missingFiles")]
    #[strum(serialize = "missingFiles")]
    MissingFiles,
    #[serde(rename = "error")]
    #[strum(serialize = "error")]
    Error,
    #[serde(other)]
    #[default]
    #[strum(serialize = "unknown")]
    Unknown,
}

impl TorrentState {
    /// Whether the torrent is paused (either direction).
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::PausedDl | Self::PausedUp)
    }
}

/// Global transfer statistics from `GET /api/v2/transfer/info`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferInfo {
    /// Current download rate in bytes/s.
    #[serde(default)]
    pub dl_info_speed: i64,
    /// Session download total in bytes.
    #[serde(default)]
    pub dl_info_data: i64,
    /// Current upload rate in bytes/s.
    #[serde(default)]
    pub up_info_speed: i64,
    /// Session upload total in bytes.
    #[serde(default)]
    pub up_info_data: i64,
    #[serde(default)]
    pub dht_nodes: i64,
    #[serde(default)]
    pub connection_status: String,
}

/// Options for adding a torrent from a `.torrent` file.
#[derive(Debug, Clone, Default)]
pub struct AddTorrentOptions {
    /// Add in paused state instead of starting immediately.
    pub paused: Option<bool>,
    pub savepath: Option<String>,
    pub category: Option<String>,
    /// Comma-separated tag list, forwarded verbatim.
    pub tags: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn torrent_parses_with_unknown_state_and_extra_fields() {
        let json = r#"{
            "hash": "abc",
            "name": "ubuntu.iso",
            "size": 123,
            "progress": 0.5,
            "dlspeed": 1024,
            "upspeed": 0,
            "state": "someFutureState",
            "ratio": 1.5,
            "tracker": "udp://example"
        }"#;
        let t: Torrent = serde_json::from_str(json).expect("parse");
        assert_eq!(t.state, TorrentState::Unknown);
        assert_eq!(t.hash, "abc");
        assert!(t.eta.is_none());
    }

    #[test]
    fn torrent_state_round_trips_daemon_tags() {
        for (tag, state) in [
            ("pausedDL", TorrentState::PausedDl),
            ("stalledUP", TorrentState::StalledUp),
            ("missingFiles", TorrentState::MissingFiles),
            ("downloading", TorrentState::Downloading),
        ] {
            let parsed: TorrentState =
                serde_json::from_str(&format!("\"{tag}\"")).expect("parse");
            assert_eq!(parsed, state);
            assert_eq!(state.to_string(), tag);
        }
    }
}
