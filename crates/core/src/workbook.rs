//! Workbook row source.
//!
//! Reads one worksheet of an Excel or OpenDocument file with the same
//! positional columns as the CSV source. Row 1 is the header; data starts at
//! row 2 and row numbers are the ones shown in the spreadsheet.

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};

use crate::error::{Error, Result};
use crate::source::SourceRow;

/// Worksheet read when none is configured.
pub const DEFAULT_SHEET: &str = "Hosts";

/// Extensions opened as workbooks. Anything else is read as CSV.
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// name, groups, address, templates
const COLUMNS: u32 = 4;

/// Whether `path` has a workbook extension (case-insensitive).
pub fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Rows of one worksheet in sheet order.
///
/// The sheet is loaded whole when opened; rows whose four cells are all blank
/// are dropped.
#[derive(Debug)]
pub struct XlsxSource {
    rows: std::vec::IntoIter<SourceRow>,
}

impl XlsxSource {
    /// Open `sheet` of the workbook at `path`.
    ///
    /// # Errors
    ///
    /// Returns `WorkbookReadFailed` when the file cannot be opened or decoded,
    /// and `SheetNotFound` when the workbook has no sheet called `sheet`.
    pub fn open(path: &Path, sheet: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)
            .map_err(|e| Error::workbook_read_failed(path, e.to_string()))?;

        let names = workbook.sheet_names();
        if !names.iter().any(|name| name == sheet) {
            return Err(Error::sheet_not_found(path, sheet, names.join(", ")));
        }

        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| Error::workbook_read_failed(path, e.to_string()))?;
        Ok(Self::from_range(&range))
    }

    /// Read rows out of an already loaded cell range.
    pub fn from_range(range: &Range<Data>) -> Self {
        let rows = match (range.start(), range.end()) {
            (Some((first, _)), Some((last, _))) => (first.max(1)..=last)
                .filter_map(|row| read_row(range, row))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            rows: rows.into_iter(),
        }
    }
}

/// `row` is the absolute 0-based sheet row.
fn read_row(range: &Range<Data>, row: u32) -> Option<SourceRow> {
    let cells: Vec<String> = (0..COLUMNS)
        .map(|col| {
            range
                .get_value((row, col))
                .map(ToString::to_string)
                .unwrap_or_default()
        })
        .collect();

    if cells.iter().all(|cell| cell.trim().is_empty()) {
        return None;
    }

    let row_number = u64::from(row).saturating_add(1);
    Some(SourceRow::from_cells(
        row_number,
        cells.iter().map(String::as_str),
    ))
}

impl Iterator for XlsxSource {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(Ok)
    }
}
