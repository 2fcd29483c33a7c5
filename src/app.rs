//! Wiring between the CLI, configuration, source, engine and report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use hostsync_core::{CsvReport, RowSource};
use hostsync_reconciler::{HostReconciler, ImportRun, RunMode, RunSummary};
use hostsync_rpc::{ApiClient, Transport};
use tracing::info;

use crate::cli::Cli;
use crate::config::AppConfig;

/// Prefix of generated report file names.
pub const REPORT_PREFIX: &str = "hostsync_report_";

/// Layer CLI flags on top of file and environment configuration.
///
/// # Errors
///
/// Returns an error when the config file or an environment variable is
/// invalid.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(url) = &cli.url {
        config.api.url = Some(url.clone());
    }
    if let Some(delimiter) = cli.delimiter {
        config.import.delimiter = delimiter;
    }
    if let Some(sheet) = &cli.sheet {
        config.import.sheet.clone_from(sheet);
    }
    if cli.stop_on_error {
        config.import.continue_on_error = false;
    }

    Ok(config)
}

/// `<source dir>/hostsync_report_<YYYYmmdd_HHMMSS>.csv`
pub fn default_report_path(source: &Path, now: DateTime<Local>) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    dir.join(format!("{REPORT_PREFIX}{}.csv", now.format("%Y%m%d_%H%M%S")))
}

/// Run one import against `client`.
///
/// # Errors
///
/// Returns an error for setup failures: unreadable source, unwritable report
/// or a report that cannot be flushed. Per-record failures are reported in
/// the returned summary instead.
pub fn execute<T: Transport>(
    cli: &Cli,
    config: &AppConfig,
    client: &ApiClient<T>,
) -> Result<(RunSummary, PathBuf)> {
    let mode = RunMode::from_apply_flag(cli.apply);
    let delimiter = config.import.delimiter_byte().context("Invalid delimiter")?;

    let report_path = cli
        .report
        .clone()
        .unwrap_or_else(|| default_report_path(&cli.source, Local::now()));

    let rows = RowSource::open(&cli.source, delimiter, &config.import.sheet)
        .with_context(|| format!("Failed to open source {}", cli.source.display()))?;
    let mut report = CsvReport::create(&report_path)
        .with_context(|| format!("Failed to create report {}", report_path.display()))?;

    info!(
        %mode,
        source = %cli.source.display(),
        report = %report_path.display(),
        "Starting import"
    );

    let reconciler = HostReconciler::new(client, config.import.reconciler_config(mode));
    let summary = ImportRun::new(&reconciler, config.import.run_policy())
        .run(rows, &mut report)
        .context("Failed to write report")?;

    Ok((summary, report_path))
}
