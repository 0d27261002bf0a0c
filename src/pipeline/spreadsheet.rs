//! Spreadsheet normalisation: tabular bytes → canonical-shaped rows.
//!
//! Ledger spreadsheets arrive with whatever header spellings the clerk
//! typed — "Cause No", "CAUSE  NO.", "cause_no" — so each header cell is
//! canonicalised (trim, case-fold, whitespace runs → single underscore)
//! before rows are read. Only three canonical keys are consumed:
//! `court_station`, `cause_no`, `name_of_deceased`; anything else in the
//! sheet is ignored, and a missing key defaults to the empty string.
//!
//! A workbook whose first sheet has fewer than two rows carries no data at
//! all and is rejected as invalid input rather than yielding zero records.

use crate::error::GazetteError;
use crate::model::{CanonicalRecord, GazetteStatus};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDate;
use std::io::Cursor;
use tracing::debug;

/// Canonicalise one header cell: "Cause No" → "cause_no".
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Render a cell to the string form the matcher and extractor expect.
///
/// Numeric cells print without a trailing ".0" so a cause number typed as
/// a number still compares equal to its text form.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Shape already-read rows (header first) into canonical records.
///
/// Split out from the workbook decoding so the mapping logic is testable
/// without fabricating xlsx bytes.
pub fn rows_to_records(
    rows: &[Vec<Data>],
    name: &str,
    date_received: NaiveDate,
) -> Result<Vec<CanonicalRecord>, GazetteError> {
    if rows.len() < 2 {
        return Err(GazetteError::EmptySpreadsheet { name: name.into() });
    }

    let headers: Vec<String> = rows[0].iter().map(|c| normalize_header(&cell_to_string(c))).collect();
    let column = |key: &str| headers.iter().position(|h| h.as_str() == key);

    let court_col = column("court_station");
    let cause_col = column("cause_no");
    let name_col = column("name_of_deceased");

    let field = |row: &[Data], col: Option<usize>| -> String {
        col.and_then(|i| row.get(i)).map(cell_to_string).unwrap_or_default()
    };

    let records = rows[1..]
        .iter()
        .map(|row| CanonicalRecord {
            sequence_no: None,
            court_station: field(row, court_col),
            cause_no: field(row, cause_col),
            name_of_deceased: field(row, name_col),
            date_received,
            status_at_gp: GazetteStatus::Pending,
            rejection_reason: String::new(),
            date_published: None,
            volume_no: String::new(),
            source_file: None,
        })
        .collect();

    Ok(records)
}

/// Decode a spreadsheet payload (xlsx/xls/ods, sniffed from the bytes) and
/// normalise its first sheet.
pub fn parse_spreadsheet(
    bytes: &[u8],
    name: &str,
    date_received: NaiveDate,
) -> Result<Vec<CanonicalRecord>, GazetteError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        GazetteError::SpreadsheetUnreadable {
            name: name.into(),
            detail: e.to_string(),
        }
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| GazetteError::EmptySpreadsheet { name: name.into() })?
        .map_err(|e| GazetteError::SpreadsheetUnreadable {
            name: name.into(),
            detail: e.to_string(),
        })?;

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    let records = rows_to_records(&rows, name, date_received)?;
    debug!(file = name, rows = records.len(), "spreadsheet normalised");
    Ok(records)
}
