//! Fleet-wide transfer statistics.

use serde::Serialize;
use tabled::Tabled;

use crate::AppContext;
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatsListing {
    host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    dl_speed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    up_speed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "HOST")]
    host: String,
    #[tabled(rename = "DOWN")]
    down: String,
    #[tabled(rename = "UP")]
    up: String,
}

pub async fn handle(ctx: &AppContext, global: &GlobalOpts) -> Result<(), CliError> {
    let results = ctx.fleet.all_transfer_stats().await;

    let listings: Vec<StatsListing> = results
        .iter()
        .map(|r| StatsListing {
            host: r.host.name.clone(),
            dl_speed: r.data.as_ref().map(|t| t.dl_info_speed),
            up_speed: r.data.as_ref().map(|t| t.up_info_speed),
            error: r.error.clone(),
        })
        .collect();

    // Fleet totals over the hosts that answered.
    let total_dl: i64 = listings.iter().filter_map(|l| l.dl_speed).sum();
    let total_up: i64 = listings.iter().filter_map(|l| l.up_speed).sum();

    let rendered = output::render_list(
        &global.output,
        &listings,
        |l| StatsRow {
            host: l.host.clone(),
            down: l
                .dl_speed
                .map_or_else(|| "-".into(), output::format_rate),
            up: l.up_speed.map_or_else(|| "-".into(), output::format_rate),
        },
        |l| l.host.clone(),
    );
    output::print_output(&rendered, global.quiet);

    if !global.quiet && matches!(global.output, crate::cli::OutputFormat::Table) {
        eprintln!(
            "Total: down {} / up {}",
            output::format_rate(total_dl),
            output::format_rate(total_up)
        );
    }

    for listing in listings.iter().filter(|l| l.error.is_some()) {
        eprintln!(
            "warning: {}: {}",
            listing.host,
            listing.error.as_deref().unwrap_or_default()
        );
    }
    Ok(())
}
