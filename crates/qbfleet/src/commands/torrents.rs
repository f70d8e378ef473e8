//! Torrent command handlers: list, add, upload, pause, resume, delete.

use bytes::Bytes;
use serde::Serialize;
use tabled::Tabled;

use qbfleet_api::AddTorrentOptions;
use qbfleet_core::{HostId, HostResult};

use crate::AppContext;
use crate::cli::{GlobalOpts, TorrentsArgs, TorrentsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    ctx: &AppContext,
    args: TorrentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TorrentsCommand::List { host } => list(ctx, host.as_deref(), global).await,
        TorrentsCommand::Add {
            url,
            host,
            savepath,
        } => add(ctx, &url, &host, savepath.as_deref(), global).await,
        TorrentsCommand::Upload {
            file,
            host,
            paused,
            savepath,
            category,
            tags,
        } => {
            // The paused field is only sent when the flag was given,
            // so the host's own default applies otherwise.
            let options = AddTorrentOptions {
                paused: paused.then_some(true),
                savepath,
                category,
                tags,
            };
            upload(ctx, &file, &host, options, global).await
        }
        TorrentsCommand::Pause { host, hashes } => {
            let id = util::resolve_host(&ctx.hosts, &host)?;
            ctx.fleet.pause(&id, &hashes).await?;
            report_action(global, &format!("Paused {} torrent(s)", hashes.len()));
            Ok(())
        }
        TorrentsCommand::Resume { host, hashes } => {
            let id = util::resolve_host(&ctx.hosts, &host)?;
            ctx.fleet.resume(&id, &hashes).await?;
            report_action(global, &format!("Resumed {} torrent(s)", hashes.len()));
            Ok(())
        }
        TorrentsCommand::Delete {
            host,
            hashes,
            delete_files,
        } => delete(ctx, &host, &hashes, delete_files, global).await,
    }
}

fn report_action(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

// ── torrents list ────────────────────────────────────────────────────

#[derive(Serialize)]
struct TorrentListing {
    host: String,
    hash: String,
    name: String,
    state: String,
    progress: f64,
    dlspeed: i64,
    upspeed: i64,
    size: i64,
}

#[derive(Tabled)]
struct TorrentRow {
    #[tabled(rename = "HOST")]
    host: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "PROGRESS")]
    progress: String,
    #[tabled(rename = "DOWN")]
    dlspeed: String,
    #[tabled(rename = "UP")]
    upspeed: String,
    #[tabled(rename = "SIZE")]
    size: String,
}

async fn list(ctx: &AppContext, host: Option<&str>, global: &GlobalOpts) -> Result<(), CliError> {
    let mut listings: Vec<TorrentListing> = Vec::new();
    let mut failures: Vec<String> = Vec::new();

    match host {
        Some(identifier) => {
            let id = util::resolve_host(&ctx.hosts, identifier)?;
            let torrents = ctx.fleet.host_torrents(&id).await?;
            let name = host_name(ctx, &id);
            listings.extend(torrents.iter().map(|t| listing_for(&name, t)));
        }
        None => {
            for result in ctx.fleet.all_torrents().await {
                match result.data {
                    Some(ref torrents) => {
                        listings
                            .extend(torrents.iter().map(|t| listing_for(&result.host.name, t)));
                    }
                    None => failures.push(format!(
                        "{}: {}",
                        result.host.name,
                        result.error.as_deref().unwrap_or("unknown error")
                    )),
                }
            }
        }
    }

    let rendered = output::render_list(
        &global.output,
        &listings,
        |l| TorrentRow {
            host: l.host.clone(),
            name: l.name.clone(),
            state: l.state.clone(),
            progress: format!("{:.1}%", l.progress * 100.0),
            dlspeed: output::format_rate(l.dlspeed),
            upspeed: output::format_rate(l.upspeed),
            size: output::format_size(l.size),
        },
        |l| l.hash.clone(),
    );
    output::print_output(&rendered, global.quiet);

    for failure in &failures {
        eprintln!("warning: {failure}");
    }
    Ok(())
}

fn listing_for(host: &str, t: &qbfleet_api::Torrent) -> TorrentListing {
    TorrentListing {
        host: host.into(),
        hash: t.hash.clone(),
        name: t.name.clone(),
        state: t.state.to_string(),
        progress: t.progress,
        dlspeed: t.dlspeed,
        upspeed: t.upspeed,
        size: t.size,
    }
}

fn host_name(ctx: &AppContext, id: &HostId) -> String {
    ctx.hosts
        .iter()
        .find(|h| &h.id == id)
        .map_or_else(|| id.to_string(), |h| h.name.clone())
}

// ── torrents add ─────────────────────────────────────────────────────

async fn add(
    ctx: &AppContext,
    url: &str,
    hosts: &[String],
    savepath: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if hosts.len() == 1 {
        let id = util::resolve_host(&ctx.hosts, &hosts[0])?;
        ctx.fleet.add_by_url(&id, url, savepath).await?;
        report_action(global, "Torrent added");
        return Ok(());
    }

    // Several targets (or all enabled hosts when none named).
    let ids: Vec<HostId> = if hosts.is_empty() {
        ctx.hosts
            .iter()
            .filter(|h| h.enabled)
            .map(|h| h.id.clone())
            .collect()
    } else {
        hosts
            .iter()
            .map(|identifier| util::resolve_host(&ctx.hosts, identifier))
            .collect::<Result<_, _>>()?
    };

    let results = ctx.fleet.add_by_url_many(&ids, url, savepath).await;
    report_batch(&results, global);
    Ok(())
}

/// Per-host outcome summary for batch actions.
fn report_batch(results: &[HostResult<()>], global: &GlobalOpts) {
    let succeeded = results.iter().filter(|r| r.success).count();
    report_action(
        global,
        &format!("Added on {succeeded}/{} host(s)", results.len()),
    );
    for result in results.iter().filter(|r| !r.success) {
        eprintln!(
            "warning: {}: {}",
            result.host.name,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}

// ── torrents upload ──────────────────────────────────────────────────

async fn upload(
    ctx: &AppContext,
    file: &std::path::Path,
    host: &str,
    options: AddTorrentOptions,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::resolve_host(&ctx.hosts, host)?;
    let contents = std::fs::read(file)?;
    ctx.fleet
        .upload_torrent(&id, Bytes::from(contents), &options)
        .await?;
    report_action(global, "Torrent uploaded");
    Ok(())
}

// ── torrents delete ──────────────────────────────────────────────────

async fn delete(
    ctx: &AppContext,
    host: &str,
    hashes: &[String],
    delete_files: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::resolve_host(&ctx.hosts, host)?;

    let prompt = if delete_files {
        format!(
            "Delete {} torrent(s) AND their downloaded data from '{host}'?",
            hashes.len()
        )
    } else {
        format!("Delete {} torrent(s) from '{host}'?", hashes.len())
    };
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    ctx.fleet.delete(&id, hashes, delete_files).await?;
    report_action(global, &format!("Deleted {} torrent(s)", hashes.len()));
    Ok(())
}
