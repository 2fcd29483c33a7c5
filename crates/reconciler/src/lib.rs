//! Host inventory reconciliation against Zabbix.
//!
//! Each desired record is converged independently:
//!
//! - **Resolve**: ensure every referenced host group and template exists
//! - **Match**: find the existing host by technical name, display name, then address
//! - **Converge**: create the host, or update its interface, groups and templates
//! - **Classify**: turn the result into a report outcome
//!
//! # Simulation
//!
//! All remote traffic flows through [`SimulationGate`]. Request types are
//! either [`hostsync_rpc::Query`] or [`hostsync_rpc::Mutation`]; in
//! [`RunMode::Simulate`] mutations are logged and answered with placeholders,
//! so the same decision logic produces `WOULD_CREATE` / `WOULD_UPDATE`.
//!
//! # Convergence
//!
//! Templates converge exactly: missing ones are linked and extra ones cleared.
//! Groups only grow: desired groups are added, others are left attached.
//!
//! # Example
//!
//! ```ignore
//! use hostsync_core::{CsvSource, CsvReport};
//! use hostsync_reconciler::{HostReconciler, ImportRun, ReconcilerConfig, RunPolicy};
//! use hostsync_rpc::{ApiClient, ApiConfig};
//!
//! let client = ApiClient::connect(&ApiConfig::default().overlay_env()?)?;
//! let reconciler = HostReconciler::new(&client, ReconcilerConfig::default());
//! let mut report = CsvReport::create("report.csv".as_ref())?;
//! let rows = CsvSource::open("hosts.csv".as_ref(), b';')?;
//! let summary = ImportRun::new(&reconciler, RunPolicy::default()).run(rows, &mut report)?;
//! std::process::exit(summary.status().code());
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod diff;
pub mod error;
pub mod gate;
pub mod interface;
pub mod r#loop;
pub mod matcher;
pub mod outcome;
pub mod reconciler;
pub mod resolver;
pub mod text;
pub mod types;

// Re-export main types
pub use diff::TemplateDiff;
pub use error::{Error, Result};
pub use gate::{Placeholder, SimulationGate};
pub use interface::{InterfaceChange, InterfaceSynchronizer};
pub use matcher::{HostMatch, HostMatcher};
pub use outcome::OutcomeClassifier;
pub use r#loop::{ImportRun, RunPolicy, RunStatus, RunSummary};
pub use reconciler::{DEFAULT_AGENT_PORT, DEFAULT_TEMPLATE_GROUP, HostReconciler, ReconcilerConfig};
pub use resolver::{GroupNamespace, GroupResolver, HostGroups, TemplateGroups, TemplateResolver};
pub use text::{sanitize_technical_name, split_multi};
pub use types::{DesiredRecord, MatchStrategy, Outcome, OutcomeKind, Reconciliation, RunMode};
