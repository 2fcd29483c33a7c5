//! CLI definition using clap.

use std::path::PathBuf;

use clap::Parser;
use url::Url;

/// hostsync - converge Zabbix hosts to an inventory sheet
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "hostsync")]
#[command(version)]
#[command(
    about = "Create and update Zabbix hosts, groups and templates from a spreadsheet or CSV inventory"
)]
#[command(
    long_about = "Reads one host per row (display name; groups; address; templates), ensures \
                  every referenced group and template exists, then creates or updates the host. \
                  Runs as a simulation unless --apply is given. Writes one report row per record."
)]
pub struct Cli {
    /// Inventory workbook (.xlsx, .xlsm, .xlsb, .xls, .ods) or CSV
    /// (header row, then: name, groups, address, templates)
    #[arg(short, long)]
    pub source: PathBuf,

    /// Report CSV path [default: <source dir>/hostsync_report_<timestamp>.csv]
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Execute mutations (default is simulation)
    #[arg(long, default_value_t = false)]
    pub apply: bool,

    /// Stop at the first failing record
    #[arg(long, default_value_t = false)]
    pub stop_on_error: bool,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config and HOSTSYNC_API_URL)
    #[arg(long)]
    pub url: Option<Url>,

    /// Source field delimiter for CSV sources (overrides config)
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Worksheet to read from workbook sources (overrides config)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
