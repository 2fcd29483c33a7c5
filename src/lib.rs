#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # hostsync
//!
//! Converge a Zabbix server to a CSV host inventory.
//!
//! This crate holds the command-line surface: argument parsing, layered
//! configuration and the wiring that feeds source rows through the
//! reconciler into a report. The engine lives in `hostsync-reconciler`.

pub mod app;
pub mod cli;
pub mod config;

pub use app::{REPORT_PREFIX, default_report_path, execute, resolve_config};
pub use cli::Cli;
pub use config::{AppConfig, ConfigError, ImportSettings};
