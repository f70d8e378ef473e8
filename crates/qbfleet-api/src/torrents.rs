// Torrent endpoints
//
// Listing plus the add/pause/resume/delete actions. Multi-hash actions
// join hashes with `|` as the WebUI API expects; empty inputs are
// rejected locally before any network call.

use bytes::Bytes;
use reqwest::header;
use reqwest::multipart;
use tracing::debug;

use crate::client::HostClient;
use crate::error::Error;
use crate::models::{AddTorrentOptions, Torrent};

impl HostClient {
    /// List all torrents on the host.
    ///
    /// `GET /api/v2/torrents/info`
    pub async fn torrents(&self) -> Result<Vec<Torrent>, Error> {
        debug!("listing torrents");
        self.get_json("torrents/info").await
    }

    /// Add a torrent by URL or magnet link.
    ///
    /// `POST /api/v2/torrents/add` with `urls` (and optional
    /// `savepath`). Rejects empty URLs locally. Uses the upload
    /// timeout — the host may fetch metadata before answering.
    pub async fn add_torrent_url(
        &self,
        urls: &str,
        savepath: Option<&str>,
    ) -> Result<(), Error> {
        if urls.trim().is_empty() {
            return Err(Error::Validation {
                message: "torrent URL must not be empty".into(),
            });
        }

        let mut form = vec![("urls", urls.to_owned())];
        if let Some(path) = savepath {
            form.push(("savepath", path.to_owned()));
        }

        debug!("adding torrent by URL");
        self.post_form("torrents/add", &form, Some(self.upload_timeout()))
            .await
    }

    /// Upload a `.torrent` file.
    ///
    /// `POST /api/v2/torrents/add` multipart, file bytes in the
    /// `torrents` field, options as additional text parts.
    pub async fn add_torrent_file(
        &self,
        file: Bytes,
        options: &AddTorrentOptions,
    ) -> Result<(), Error> {
        if file.is_empty() {
            return Err(Error::Validation {
                message: "torrent file must not be empty".into(),
            });
        }

        self.ensure_session().await?;

        let part = multipart::Part::bytes(file.to_vec())
            .file_name("upload.torrent")
            .mime_str("application/x-bittorrent")
            .map_err(Error::Transport)?;
        let mut form = multipart::Form::new().part("torrents", part);

        if let Some(paused) = options.paused {
            form = form.text("paused", paused.to_string());
        }
        if let Some(ref savepath) = options.savepath {
            form = form.text("savepath", savepath.clone());
        }
        if let Some(ref category) = options.category {
            form = form.text("category", category.clone());
        }
        if let Some(ref tags) = options.tags {
            form = form.text("tags", tags.clone());
        }

        let url = self.api_url("torrents/add");
        debug!("POST {url} (multipart upload)");

        let mut req = self
            .http()
            .post(url)
            .multipart(form)
            .timeout(self.upload_timeout());
        if let Some(cookie) = self.session_header() {
            req = req.header(header::COOKIE, cookie);
        }
        let resp = req.send().await.map_err(Error::Transport)?;
        self.check_status(resp).await?;
        Ok(())
    }

    /// Pause torrents by hash.
    ///
    /// `POST /api/v2/torrents/pause` with `hashes` joined by `|`.
    pub async fn pause(&self, hashes: &[String]) -> Result<(), Error> {
        let hashes = join_hashes(hashes)?;
        debug!(hashes, "pausing torrents");
        self.post_form("torrents/pause", &[("hashes", hashes)], None)
            .await
    }

    /// Resume torrents by hash.
    ///
    /// `POST /api/v2/torrents/resume` with `hashes` joined by `|`.
    pub async fn resume(&self, hashes: &[String]) -> Result<(), Error> {
        let hashes = join_hashes(hashes)?;
        debug!(hashes, "resuming torrents");
        self.post_form("torrents/resume", &[("hashes", hashes)], None)
            .await
    }

    /// Delete torrents by hash, optionally removing downloaded files.
    ///
    /// `POST /api/v2/torrents/delete` with `hashes` joined by `|` and
    /// a `deleteFiles` boolean.
    pub async fn delete(&self, hashes: &[String], delete_files: bool) -> Result<(), Error> {
        let hashes = join_hashes(hashes)?;
        debug!(hashes, delete_files, "deleting torrents");
        self.post_form(
            "torrents/delete",
            &[
                ("hashes", hashes),
                ("deleteFiles", delete_files.to_string()),
            ],
            None,
        )
        .await
    }
}

/// Join hashes with the `|` separator, rejecting empty lists locally.
fn join_hashes(hashes: &[String]) -> Result<String, Error> {
    if hashes.is_empty() {
        return Err(Error::Validation {
            message: "at least one torrent hash is required".into(),
        });
    }
    Ok(hashes.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_hashes_with_pipe() {
        let hashes = vec!["aaa".to_owned(), "bbb".to_owned(), "ccc".to_owned()];
        assert_eq!(join_hashes(&hashes).expect("join"), "aaa|bbb|ccc");
    }

    #[test]
    fn empty_hash_list_is_a_validation_error() {
        assert!(matches!(
            join_hashes(&[]),
            Err(Error::Validation { .. })
        ));
    }
}
