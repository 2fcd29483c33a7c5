//! # hostsync - entry point
//!
//! ## Startup Sequence
//!
//! 1. **Tracing** - `RUST_LOG`, else `info` (or `debug` with `--verbose`)
//! 2. **Configuration** - defaults, TOML file, `HOSTSYNC_*` environment, CLI flags
//! 3. **API client** - connect and log the remote API version
//! 4. **Import run** - one report row per source record
//!
//! ## Exit Codes
//!
//! - `0` every record succeeded
//! - `1` the run completed with failed records
//! - `2` the run was stopped early, or setup failed

#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use hostsync::{Cli, execute, resolve_config};
use hostsync_reconciler::RunStatus;
use hostsync_rpc::ApiClient;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(status) => ExitCode::from(exit_code(status)),
        Err(e) => {
            error!(error = %format!("{e:#}"), "Import aborted");
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(RunStatus::Aborted))
        }
    }
}

fn run(cli: &Cli) -> Result<RunStatus> {
    let config = resolve_config(cli)?;

    let client = ApiClient::connect(&config.api).context("Failed to build API client")?;
    let version = client
        .api_version()
        .context("Failed to reach the Zabbix API")?;
    info!(version = %version, endpoint = %client.transport().endpoint(), "Connected to Zabbix API");

    let (summary, report_path) = execute(cli, &config, &client)?;

    info!(
        mode = %summary.mode,
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        aborted = summary.aborted,
        report = %report_path.display(),
        "Import complete"
    );

    Ok(summary.status())
}

fn exit_code(status: RunStatus) -> u8 {
    u8::try_from(status.code()).unwrap_or(u8::MAX)
}

/// `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
