//! Core error types for hostsync file boundaries using Railway-Oriented Programming.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reading sources and writing reports.
#[derive(Debug, Error)]
pub enum Error {
    // I/O errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("failed to write file '{path}': {reason}")]
    FileWriteFailed { path: PathBuf, reason: String },

    #[error("failed to create directory '{path}': {reason}")]
    DirectoryCreationFailed { path: PathBuf, reason: String },

    // Parsing errors
    #[error("CSV parse error at line {line}: {reason}")]
    CsvParseFailed { line: u64, reason: String },

    // Workbook errors
    #[error("failed to read workbook '{path}': {reason}")]
    WorkbookReadFailed { path: PathBuf, reason: String },

    #[error("worksheet '{sheet}' not found in '{path}' (available: {available})")]
    SheetNotFound {
        path: PathBuf,
        sheet: String,
        available: String,
    },

    // Report errors
    #[error("failed to write report row {row}: {reason}")]
    ReportWriteFailed { row: u64, reason: String },

    // Generic I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a file write error.
    pub fn file_write_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileWriteFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a directory creation error.
    pub fn directory_creation_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DirectoryCreationFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a CSV parse error.
    pub fn csv_parse_failed(line: u64, reason: impl Into<String>) -> Self {
        Self::CsvParseFailed {
            line,
            reason: reason.into(),
        }
    }

    /// Create a workbook read error.
    pub fn workbook_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::WorkbookReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-worksheet error.
    pub fn sheet_not_found(
        path: impl Into<PathBuf>,
        sheet: impl Into<String>,
        available: impl Into<String>,
    ) -> Self {
        Self::SheetNotFound {
            path: path.into(),
            sheet: sheet.into(),
            available: available.into(),
        }
    }

    /// Create a report write error.
    pub fn report_write_failed(row: u64, reason: impl Into<String>) -> Self {
        Self::ReportWriteFailed {
            row,
            reason: reason.into(),
        }
    }

    /// Source line the error refers to, if any.
    pub const fn line(&self) -> Option<u64> {
        match self {
            Self::CsvParseFailed { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_includes_path() {
        let err = Error::file_read_failed("/tmp/hosts.csv", "not found");
        let message = err.to_string();
        assert!(message.contains("/tmp/hosts.csv"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_csv_parse_failed_mentions_line() {
        let err = Error::csv_parse_failed(7, "invalid UTF-8");
        assert_eq!(err.to_string(), "CSV parse error at line 7: invalid UTF-8");
        assert_eq!(err.line(), Some(7));
        assert_eq!(Error::report_write_failed(2, "x").line(), None);
    }

    #[test]
    fn test_sheet_not_found_names_sheet_and_alternatives() {
        let err = Error::sheet_not_found("/tmp/hosts.xlsx", "Hosts", "Sheet1, Servers");
        assert_eq!(
            err.to_string(),
            "worksheet 'Hosts' not found in '/tmp/hosts.xlsx' (available: Sheet1, Servers)"
        );
    }
}
