//! Outcome report persistence.
//!
//! One row per processed source record, written as `;`-delimited CSV in the
//! order records were processed.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// Report field delimiter.
pub const REPORT_DELIMITER: u8 = b';';

/// Column names in the order they are written.
pub const REPORT_HEADER: [&str; 7] = [
    "row_number",
    "display_name",
    "address",
    "groups",
    "templates",
    "outcome",
    "message",
];

/// One report line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub row_number: u64,
    pub display_name: String,
    pub address: String,
    /// Raw group cell as read from the source.
    pub groups: String,
    /// Raw template cell as read from the source.
    pub templates: String,
    /// Outcome label (`CREATED`, `WOULD_UPDATE`, `ERROR`, ...).
    pub outcome: String,
    pub message: String,
}

/// Destination for report rows.
pub trait ReportSink {
    /// Append one row.
    ///
    /// # Errors
    ///
    /// Returns an error when the row cannot be persisted.
    fn push(&mut self, row: ReportRow) -> Result<()>;

    /// Flush everything pushed so far. Called once, also on early abort.
    ///
    /// # Errors
    ///
    /// Returns an error when buffered rows cannot be flushed.
    fn finish(&mut self) -> Result<()>;
}

impl ReportSink for Vec<ReportRow> {
    fn push(&mut self, row: ReportRow) -> Result<()> {
        Vec::push(self, row);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// CSV report writer.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvReport<File> {
    /// Create (or truncate) the report file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryCreationFailed` or `FileWriteFailed`.
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| Error::directory_creation_failed(parent, e.to_string()))?;
        }
        let file =
            File::create(path).map_err(|e| Error::file_write_failed(path, e.to_string()))?;
        Self::from_writer(file).map_err(|e| Error::file_write_failed(path, e.to_string()))
    }
}

impl<W: Write> CsvReport<W> {
    /// Wrap any writer and emit the header line, so a run without rows
    /// still leaves a well-formed report.
    ///
    /// # Errors
    ///
    /// Returns `Io` when the header cannot be written.
    pub fn from_writer(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(REPORT_DELIMITER)
            .has_headers(false)
            .from_writer(writer);
        writer
            .write_record(REPORT_HEADER)
            .map_err(|e| Error::Io(e.into()))?;
        Ok(Self { writer })
    }

    /// Flush and hand back the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error when the final flush fails.
    pub fn into_inner(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn push(&mut self, row: ReportRow) -> Result<()> {
        let number = row.row_number;
        self.writer
            .serialize(row)
            .map_err(|e| Error::report_write_failed(number, e.to_string()))
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
