//! Health monitor command: periodic probes with console reporting.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use qbfleet_core::{
    HealthMonitor, HealthSample, HealthSink, MonitorEvent, StaticHosts, StatusPublisher,
};

use crate::AppContext;
use crate::cli::{GlobalOpts, MonitorArgs};
use crate::error::CliError;

/// Sink that logs each sample through tracing.
struct LoggingSink;

impl HealthSink for LoggingSink {
    fn record_sample(&self, sample: &HealthSample) {
        info!(
            host = %sample.host_id,
            status = %sample.status,
            latency_ms = sample.latency_ms,
            error = sample.error.as_deref().unwrap_or(""),
            "probe sample"
        );
    }
}

/// Publisher that prints events to stdout.
struct ConsolePublisher {
    quiet: bool,
}

impl StatusPublisher for ConsolePublisher {
    fn publish(&self, event: MonitorEvent) {
        if self.quiet {
            return;
        }
        match event {
            MonitorEvent::HostStatus {
                name,
                status,
                latency_ms,
                error,
                ..
            } => {
                let status_text = match status {
                    qbfleet_core::HostStatus::Online => format!("{}", "online".green()),
                    qbfleet_core::HostStatus::Offline => format!("{}", "offline".red()),
                    qbfleet_core::HostStatus::Unknown => "unknown".to_string(),
                };
                match error {
                    Some(err) => println!("{name}: {status_text} ({latency_ms}ms) -- {err}"),
                    None => println!("{name}: {status_text} ({latency_ms}ms)"),
                }
            }
            MonitorEvent::PassSummary {
                total,
                online,
                offline,
                timestamp,
            } => {
                println!(
                    "[{}] {online}/{total} online, {offline} offline",
                    timestamp.format("%H:%M:%S")
                );
            }
        }
    }
}

pub async fn handle(
    ctx: &AppContext,
    args: MonitorArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut config = ctx.config.monitor_config();
    if let Some(secs) = args.interval {
        config.interval = Duration::from_secs(secs);
    }

    let monitor = HealthMonitor::new(
        Arc::new(StaticHosts::new(ctx.hosts.clone())),
        Arc::new(LoggingSink),
        Arc::new(ConsolePublisher {
            quiet: global.quiet,
        }),
        ctx.transport.clone(),
        config,
    );

    if args.once {
        let report = monitor.run_pass().await;
        // Nonzero exit when any host is down, for cron/scripting use.
        if report.offline > 0 {
            return Err(CliError::HostsDown {
                offline: report.offline,
                total: report.total,
            });
        }
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    monitor.run(cancel).await;
    Ok(())
}
