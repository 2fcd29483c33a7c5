#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # hostsync-core
//!
//! Shared plumbing for hostsync: the error type used at file boundaries,
//! Railway-style result helpers, the CSV and workbook row sources that feed
//! desired inventory into the reconciler, and the CSV report sink that
//! records one outcome per row.

pub mod error;
pub mod report;
pub mod result;
pub mod source;
pub mod workbook;

pub use error::{Error, Result};
pub use report::{CsvReport, REPORT_HEADER, ReportRow, ReportSink};
pub use result::ResultExt;
pub use source::{CsvSource, RowSource, SourceRow};
pub use workbook::{DEFAULT_SHEET, XlsxSource};
