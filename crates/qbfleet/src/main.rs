mod cli;
mod commands;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use qbfleet_api::TransportConfig;
use qbfleet_core::{Fleet, HostConnection, StaticHosts};

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

/// Everything a command handler needs: resolved hosts and a fleet facade.
pub struct AppContext {
    pub config: qbfleet_config::Config,
    pub hosts: Vec<HostConnection>,
    pub transport: TransportConfig,
    pub fleet: Fleet,
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Completions don't need configured hosts
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "qbfleet", &mut std::io::stdout());
            Ok(())
        }

        // Everything else operates on the configured fleet
        cmd => {
            let ctx = build_context(&cli.global)?;
            tracing::debug!(command = ?cmd, hosts = ctx.hosts.len(), "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}

/// Load config, resolve credentials, and wire up the fleet facade.
fn build_context(global: &cli::GlobalOpts) -> Result<AppContext, CliError> {
    let config = match global.config {
        Some(ref path) => qbfleet_config::load_config_from(path)?,
        None => qbfleet_config::load_config()?,
    };

    let hosts = config.connections()?;

    let mut transport = config.transport();
    if let Some(secs) = global.timeout {
        transport.timeout = std::time::Duration::from_secs(secs);
    }

    let fleet = Fleet::new(
        Arc::new(StaticHosts::new(hosts.clone())),
        transport.clone(),
    );

    Ok(AppContext {
        config,
        hosts,
        transport,
        fleet,
    })
}
