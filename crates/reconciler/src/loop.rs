//! Sequential import run.
//!
//! Feeds source rows through a [`HostReconciler`] one at a time, in source
//! order, writes one report row per record and applies the error policy.

use hostsync_core::{ReportRow, ReportSink, ResultExt, SourceRow};
use hostsync_rpc::Transport;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::reconciler::HostReconciler;
use crate::types::{DesiredRecord, Outcome, OutcomeKind, RunMode};

/// What to do after a failed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    /// Keep going after a failed record. When false the run stops at the
    /// first failure.
    pub continue_on_error: bool,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            continue_on_error: true,
        }
    }
}

impl RunPolicy {
    pub const fn fail_fast() -> Self {
        Self {
            continue_on_error: false,
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every record succeeded.
    Clean,
    /// The run completed but some records failed.
    CompletedWithFailures,
    /// The run was stopped early.
    Aborted,
}

impl RunStatus {
    /// Process exit code.
    pub const fn code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::CompletedWithFailures => 1,
            Self::Aborted => 2,
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub mode: RunMode,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub aborted: bool,
}

impl RunSummary {
    const fn new(mode: RunMode) -> Self {
        Self {
            mode,
            total: 0,
            succeeded: 0,
            failed: 0,
            aborted: false,
        }
    }

    const fn record(&mut self, kind: OutcomeKind) {
        self.total = self.total.saturating_add(1);
        if kind.is_error() {
            self.failed = self.failed.saturating_add(1);
        } else {
            self.succeeded = self.succeeded.saturating_add(1);
        }
    }

    pub const fn status(&self) -> RunStatus {
        if self.aborted {
            RunStatus::Aborted
        } else if self.failed > 0 {
            RunStatus::CompletedWithFailures
        } else {
            RunStatus::Clean
        }
    }
}

/// Drives a whole import.
pub struct ImportRun<'r, 'a, T> {
    reconciler: &'r HostReconciler<'a, T>,
    policy: RunPolicy,
}

impl<'r, 'a, T: Transport> ImportRun<'r, 'a, T> {
    pub const fn new(reconciler: &'r HostReconciler<'a, T>, policy: RunPolicy) -> Self {
        Self { reconciler, policy }
    }

    /// Process every row and report each outcome to `sink`.
    ///
    /// Unreadable rows are reported as `ERROR` outcomes. The sink is always
    /// finished, also when the run stops early.
    ///
    /// # Errors
    ///
    /// Returns `Report` when the sink rejects a row or fails to flush.
    pub fn run<I, S>(&self, rows: I, sink: &mut S) -> Result<RunSummary>
    where
        I: IntoIterator<Item = hostsync_core::Result<SourceRow>>,
        S: ReportSink + ?Sized,
    {
        let mode = self.reconciler.config().mode;
        let mut summary = RunSummary::new(mode);
        info!(%mode, continue_on_error = self.policy.continue_on_error, "Starting import run");

        let pushed = self.process(rows, sink, &mut summary);
        let finished = sink.finish().map_err(Error::from);
        pushed.and(finished)?;

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            aborted = summary.aborted,
            status = ?summary.status(),
            intercepted = self.reconciler.gate().intercepted(),
            "Import run finished"
        );
        Ok(summary)
    }

    fn process<I, S>(&self, rows: I, sink: &mut S, summary: &mut RunSummary) -> Result<()>
    where
        I: IntoIterator<Item = hostsync_core::Result<SourceRow>>,
        S: ReportSink + ?Sized,
    {
        for row in rows {
            let (report, outcome) = match row.inspect_error(|e| warn!(error = %e, "Unreadable row")) {
                Ok(row) => {
                    let record = DesiredRecord::from_row(&row);
                    let outcome = self.reconciler.reconcile(&record);
                    (report_row(&row, &outcome), outcome)
                }
                Err(err) => {
                    let line = err.line().unwrap_or_default();
                    let outcome = Outcome::new(line, OutcomeKind::Error, err.to_string());
                    let row = SourceRow {
                        row_number: line,
                        ..SourceRow::default()
                    };
                    (report_row(&row, &outcome), outcome)
                }
            };

            summary.record(outcome.kind);
            sink.push(report)?;

            if outcome.is_error() && !self.policy.continue_on_error {
                error!(row = outcome.row_number, "Stopping at first failure");
                summary.aborted = true;
                break;
            }
        }
        Ok(())
    }
}

fn report_row(row: &SourceRow, outcome: &Outcome) -> ReportRow {
    ReportRow {
        row_number: outcome.row_number,
        display_name: row.display_name.clone(),
        address: row.address.clone(),
        groups: row.groups_raw.clone(),
        templates: row.templates_raw.clone(),
        outcome: outcome.kind.label().to_string(),
        message: outcome.message.clone(),
    }
}
