//! Host command handlers: list, test, show.

use serde::Serialize;
use tabled::Tabled;

use qbfleet_core::{HostConnection, aggregate};

use crate::AppContext;
use crate::cli::{GlobalOpts, HostsArgs, HostsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(ctx: &AppContext, args: HostsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        HostsCommand::List => list(ctx, global),
        HostsCommand::Test { host } => test(ctx, host.as_deref(), global).await,
        HostsCommand::Show { host } => show(ctx, &host, global).await,
    }
}

// ── hosts list ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct HostListing {
    id: String,
    name: String,
    address: String,
    enabled: bool,
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "ENABLED")]
    enabled: String,
}

fn list(ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let listings: Vec<HostListing> = ctx
        .hosts
        .iter()
        .map(|h| HostListing {
            id: h.id.to_string(),
            name: h.name.clone(),
            address: format!("{}:{}", h.host, h.port),
            enabled: h.enabled,
        })
        .collect();

    let rendered = output::render_list(
        &global.output,
        &listings,
        |l| HostRow {
            name: l.name.clone(),
            address: l.address.clone(),
            enabled: if l.enabled { "yes".into() } else { "no".into() },
        },
        |l| l.name.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}

// ── hosts test ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct ProbeListing {
    name: String,
    status: String,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "LATENCY")]
    latency: String,
    #[tabled(rename = "ERROR")]
    error: String,
}

async fn test(ctx: &AppContext, host: Option<&str>, global: &GlobalOpts) -> Result<(), CliError> {
    let targets: Vec<HostConnection> = match host {
        Some(identifier) => {
            let id = util::resolve_host(&ctx.hosts, identifier)?;
            ctx.hosts.iter().filter(|h| h.id == id).cloned().collect()
        }
        None => ctx.hosts.iter().filter(|h| h.enabled).cloned().collect(),
    };

    let results = aggregate(&targets, &ctx.transport, |client| async move {
        client.login().await
    })
    .await;

    let listings: Vec<ProbeListing> = results
        .iter()
        .map(|r| ProbeListing {
            name: r.host.name.clone(),
            status: if r.success { "online".into() } else { "offline".into() },
            latency_ms: r.elapsed_ms,
            error: r.error.clone(),
        })
        .collect();

    let rendered = output::render_list(
        &global.output,
        &listings,
        |l| ProbeRow {
            name: l.name.clone(),
            status: l.status.clone(),
            latency: format!("{}ms", l.latency_ms),
            error: l.error.clone().unwrap_or_default(),
        },
        |l| format!("{} {}", l.name, l.status),
    );
    output::print_output(&rendered, global.quiet);

    // Report failure to scripts when any probed host is down.
    let offline = listings.iter().filter(|l| l.error.is_some()).count();
    if offline > 0 {
        return Err(CliError::HostsDown {
            offline,
            total: listings.len(),
        });
    }
    Ok(())
}

// ── hosts show ───────────────────────────────────────────────────────

async fn show(ctx: &AppContext, host: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let id = util::resolve_host(&ctx.hosts, host)?;
    let overview = ctx.fleet.host_overview(&id).await?;

    let rendered = output::render_single(
        &global.output,
        &overview,
        |o| {
            let mut lines = vec![format!("Host: {} ({})", o.host.name, o.host.host)];
            if let Some(ref transfer) = o.transfer {
                lines.push(format!(
                    "Transfer: down {} / up {}",
                    output::format_rate(transfer.dl_info_speed),
                    output::format_rate(transfer.up_info_speed),
                ));
            }
            if let Some(ref err) = o.errors.transfer {
                lines.push(format!("Transfer: unavailable ({err})"));
            }
            if let Some(ref err) = o.errors.main_data {
                lines.push(format!("Sync data: unavailable ({err})"));
            }
            if let Some(ref err) = o.errors.preferences {
                lines.push(format!("Preferences: unavailable ({err})"));
            }
            lines.join("\n")
        },
        |o| o.host.name.clone(),
    );
    output::print_output(&rendered, global.quiet);
    Ok(())
}
