// qbfleet-api: Async Rust client for the qBittorrent WebUI API (v2)

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod app;
mod auth;
mod torrents;

pub use client::HostClient;
pub use error::Error;
pub use models::{AddTorrentOptions, Torrent, TorrentState, TransferInfo};
pub use transport::TransportConfig;
