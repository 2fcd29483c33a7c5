//! Integration tests for whole import runs.
//!
//! These tests verify that:
//! - Every record yields exactly one report row, in source order
//! - Continue-on-error and fail-fast policies map to the right exit status
//! - The report sink is flushed even when the run stops early

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]
#![forbid(clippy::panic)]

use hostsync_core::{CsvReport, CsvSource, ReportRow, ReportSink, SourceRow};
use hostsync_reconciler::{
    HostReconciler, ImportRun, ReconcilerConfig, RunMode, RunPolicy, RunStatus,
};
use hostsync_rpc::{ApiClient, InMemoryZabbix};

type TestResult = Result<(), Box<dyn std::error::Error>>;

const INVENTORY: &str = "\
Name;Groups;Address;Templates
Srv-Web-01;\"Web;Prod\";10.0.0.5;Linux OS
Broken;;10.0.0.6;Linux OS
Srv-Db-01;DB;10.0.0.7;Linux OS
";

/// Sink that remembers whether it was finished.
#[derive(Default)]
struct RecordingSink {
    rows: Vec<ReportRow>,
    finished: bool,
}

impl ReportSink for RecordingSink {
    fn push(&mut self, row: ReportRow) -> hostsync_core::Result<()> {
        self.rows.push(row);
        Ok(())
    }

    fn finish(&mut self) -> hostsync_core::Result<()> {
        self.finished = true;
        Ok(())
    }
}

fn rows() -> CsvSource<&'static [u8]> {
    CsvSource::from_reader(INVENTORY.as_bytes(), b';')
}

/// Test that a failing record does not stop the run by default.
///
/// # GIVEN
/// Three records where the second has no groups
///
/// # WHEN
/// The run is applied with the default policy
///
/// # THEN
/// Three report rows come back in order, the middle one is ERROR and the
/// run completes with failures
#[test]
fn test_continue_on_error_reports_every_row() -> TestResult {
    // GIVEN: Three records, the second invalid
    let remote = InMemoryZabbix::new();
    let client = ApiClient::new(&remote);
    let reconciler =
        HostReconciler::new(&client, ReconcilerConfig::default().with_mode(RunMode::Apply));
    let mut sink = RecordingSink::default();

    // WHEN: The run is applied
    let summary = ImportRun::new(&reconciler, RunPolicy::default()).run(rows(), &mut sink)?;

    // THEN: Three rows in order, middle one failed
    let labels: Vec<(u64, &str)> = sink
        .rows
        .iter()
        .map(|r| (r.row_number, r.outcome.as_str()))
        .collect();
    assert_eq!(labels, vec![(2, "CREATED"), (3, "ERROR"), (4, "CREATED")]);
    assert_eq!(
        sink.rows.get(1).map(|r| r.message.as_str()),
        Some("at least one host group is required")
    );
    assert!(sink.finished);
    assert_eq!((summary.total, summary.succeeded, summary.failed), (3, 2, 1));
    assert_eq!(summary.status(), RunStatus::CompletedWithFailures);
    assert_eq!(summary.status().code(), 1);
    assert_eq!(remote.hosts().len(), 2);
    Ok(())
}

/// Test that fail-fast stops at the first failure.
///
/// # GIVEN
/// Three records where the second has no groups
///
/// # WHEN
/// The run uses the fail-fast policy
///
/// # THEN
/// Two rows are reported, the sink is finished and the run is aborted
#[test]
fn test_fail_fast_stops_and_flushes() -> TestResult {
    // GIVEN: Three records, the second invalid
    let remote = InMemoryZabbix::new();
    let client = ApiClient::new(&remote);
    let reconciler =
        HostReconciler::new(&client, ReconcilerConfig::default().with_mode(RunMode::Apply));
    let mut sink = RecordingSink::default();

    // WHEN: The run is fail-fast
    let summary = ImportRun::new(&reconciler, RunPolicy::fail_fast()).run(rows(), &mut sink)?;

    // THEN: Stopped after the failure
    assert_eq!(sink.rows.len(), 2);
    assert!(sink.finished);
    assert!(summary.aborted);
    assert_eq!(summary.status(), RunStatus::Aborted);
    assert_eq!(summary.status().code(), 2);
    assert_eq!(remote.hosts().len(), 1);
    Ok(())
}

/// Test a simulated run end to end through the CSV report.
///
/// # GIVEN
/// An empty remote system and a valid record
///
/// # WHEN
/// The run is simulated into a CSV report
///
/// # THEN
/// The report holds the header and one WOULD_CREATE row, and nothing was
/// mutated
#[test]
fn test_simulated_run_writes_csv_report() -> TestResult {
    // GIVEN: An empty remote and a valid record
    let remote = InMemoryZabbix::new();
    let client = ApiClient::new(&remote);
    let reconciler = HostReconciler::new(&client, ReconcilerConfig::default());
    let source = vec![Ok(SourceRow {
        row_number: 2,
        display_name: "Srv-Web-01".to_string(),
        groups_raw: "Web;Prod".to_string(),
        address: "10.0.0.5".to_string(),
        templates_raw: "Linux OS".to_string(),
    })];
    let mut report = CsvReport::from_writer(Vec::new())?;

    // WHEN: The run is simulated
    let summary = ImportRun::new(&reconciler, RunPolicy::default()).run(source, &mut report)?;

    // THEN: One WOULD_CREATE row and no mutations
    let text = String::from_utf8(report.into_inner()?)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("row_number;display_name;address;groups;templates;outcome;message")
    );
    assert_eq!(
        lines.next(),
        Some(
            "2;Srv-Web-01;10.0.0.5;\"Web;Prod\";Linux OS;WOULD_CREATE;\
             \"host did not exist; would be created (name='Srv-Web-01', host='Srv-Web-01')\""
        )
    );
    assert_eq!(lines.next(), None);
    assert_eq!(summary.status(), RunStatus::Clean);
    assert_eq!(remote.mutation_count(), 0);
    Ok(())
}
