//! Row sources for desired inventory.
//!
//! The inventory is read positionally: display name, groups, address,
//! templates. The first line is a header. Multi-value cells are kept raw here;
//! splitting them is the reconciler's job so the report can echo the operator's
//! original text.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::workbook::{XlsxSource, is_workbook};

/// Default field delimiter (spreadsheet exports in most locales).
pub const DEFAULT_DELIMITER: u8 = b';';

/// One raw row from the inventory source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceRow {
    /// 1-based line number in the source file (header = 1).
    pub row_number: u64,
    /// Human readable host name.
    pub display_name: String,
    /// `;`-separated host-group names, untouched.
    pub groups_raw: String,
    /// Primary agent address.
    pub address: String,
    /// `;`-separated template names, untouched.
    pub templates_raw: String,
}

impl SourceRow {
    /// Build a row from positional cells. Missing cells read as empty.
    pub fn from_cells<'a>(row_number: u64, cells: impl IntoIterator<Item = &'a str>) -> Self {
        let mut cells = cells.into_iter();
        let mut next = || cells.next().unwrap_or_default().to_string();
        let display_name = next().trim().to_string();
        let groups_raw = next();
        let address = next().trim().to_string();
        let templates_raw = next();

        Self {
            row_number,
            display_name,
            groups_raw,
            address,
            templates_raw,
        }
    }
}

/// Streaming CSV reader yielding [`SourceRow`]s in file order.
///
/// Rows whose cells are all blank are skipped; they still advance the line
/// counter so reported row numbers match what the operator sees.
pub struct CsvSource<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
}

impl CsvSource<File> {
    /// Open a CSV file.
    ///
    /// # Errors
    ///
    /// Returns `FileReadFailed` when the file cannot be opened.
    pub fn open(path: &Path, delimiter: u8) -> Result<Self> {
        let file =
            File::open(path).map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        Ok(Self::from_reader(file, delimiter))
    }
}

impl<R: Read> CsvSource<R> {
    /// Wrap any reader.
    pub fn from_reader(reader: R, delimiter: u8) -> Self {
        let records = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader)
            .into_records();
        Self { records }
    }
}

impl<R: Read> Iterator for CsvSource<R> {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map_or(0, csv::Position::line);
                    return Some(Err(Error::csv_parse_failed(line, e.to_string())));
                }
            };

            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let line = record.position().map_or(0, csv::Position::line);
            return Some(Ok(SourceRow::from_cells(line, record.iter())));
        }
    }
}

/// Inventory source picked by file extension.
pub enum RowSource {
    Csv(CsvSource<File>),
    Workbook(XlsxSource),
}

impl RowSource {
    /// Open `path` as a workbook (reading `sheet`) when its extension is a
    /// spreadsheet one, otherwise as CSV split on `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns the error of the chosen source's `open`.
    pub fn open(path: &Path, delimiter: u8, sheet: &str) -> Result<Self> {
        if is_workbook(path) {
            XlsxSource::open(path, sheet).map(Self::Workbook)
        } else {
            CsvSource::open(path, delimiter).map(Self::Csv)
        }
    }
}

impl Iterator for RowSource {
    type Item = Result<SourceRow>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Csv(rows) => rows.next(),
            Self::Workbook(rows) => rows.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(input: &str) -> Result<Vec<SourceRow>> {
        CsvSource::from_reader(input.as_bytes(), DEFAULT_DELIMITER).collect()
    }

    #[test]
    fn test_reads_positional_columns() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let parsed = rows("Name;Group;IP;Template\nSrv-Web-01;\"Web;Prod\";10.0.0.5;Linux OS\n")?;
        let row = parsed.first().ok_or("expected one row")?;
        assert_eq!(row.row_number, 2);
        assert_eq!(row.display_name, "Srv-Web-01");
        assert_eq!(row.groups_raw, "Web;Prod");
        assert_eq!(row.address, "10.0.0.5");
        assert_eq!(row.templates_raw, "Linux OS");
        Ok(())
    }

    #[test]
    fn test_skips_blank_rows_but_keeps_line_numbers()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let parsed = rows("Name;Group;IP;Template\nA;G;10.0.0.1;T\n;;;\n  ; ;;\nB;G;10.0.0.2;T\n")?;
        let numbers: Vec<u64> = parsed.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![2, 5]);
        Ok(())
    }

    #[test]
    fn test_missing_trailing_cells_read_empty()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let parsed = rows("Name;Group;IP;Template\nOnlyName\n")?;
        let row = parsed.first().ok_or("expected one row")?;
        assert_eq!(row.display_name, "OnlyName");
        assert!(row.groups_raw.is_empty());
        assert!(row.address.is_empty());
        assert!(row.templates_raw.is_empty());
        Ok(())
    }

    #[test]
    fn test_trims_name_and_address_only() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let input = "h1,h2,h3,h4\n  Srv 1 , Web ; DB ,  10.0.0.9  , Linux \n";
        let parsed: Vec<SourceRow> =
            CsvSource::from_reader(input.as_bytes(), b',').collect::<Result<_>>()?;
        let row = parsed.first().ok_or("expected one row")?;
        assert_eq!(row.display_name, "Srv 1");
        assert_eq!(row.groups_raw, " Web ; DB ");
        assert_eq!(row.address, "10.0.0.9");
        assert_eq!(row.templates_raw, " Linux ");
        Ok(())
    }

    #[test]
    fn test_open_missing_file_fails() {
        let result = CsvSource::open(Path::new("/nonexistent/hosts.csv"), DEFAULT_DELIMITER);
        assert!(matches!(result, Err(Error::FileReadFailed { .. })));
    }

    #[test]
    fn test_row_source_picks_format_by_extension() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = tempfile::tempdir()?;
        let csv_path = dir.path().join("hosts.csv");
        std::fs::write(&csv_path, "Name;Group;IP;Template
Srv-Web-01;Web;10.0.0.5;Linux
")?;

        let source = RowSource::open(&csv_path, DEFAULT_DELIMITER, "Hosts")?;
        assert!(matches!(source, RowSource::Csv(_)));
        assert_eq!(source.count(), 1);

        let missing = RowSource::open(&dir.path().join("hosts.xlsx"), DEFAULT_DELIMITER, "Hosts");
        assert!(matches!(missing, Err(Error::WorkbookReadFailed { .. })));
        Ok(())
    }
}
