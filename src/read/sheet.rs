// src/read/sheet.rs

use crate::error::{PipelineError, Result};
use crate::table::RawTable;
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Cell text as it would appear in a CSV export. Date cells become ISO dates
/// instead of Excel serial numbers.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(ts) if ts.time() == chrono::NaiveTime::MIN => ts.format("%Y-%m-%d").to_string(),
            Some(ts) => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        _ => cell.to_string(),
    }
}

/// Read the first worksheet: first row is the header, every cell rendered as text.
pub fn read_first_sheet(path: &Path) -> Result<RawTable> {
    let sheet_err = |detail: String| PipelineError::Sheet {
        path: path.to_path_buf(),
        detail,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| sheet_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| sheet_err("workbook has no worksheets".into()))?
        .map_err(|e| sheet_err(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let headers = rows
        .next()
        .ok_or_else(|| sheet_err("first worksheet is empty".into()))?;
    let body: Vec<Vec<String>> = rows.collect();
    debug!(path = %path.display(), columns = headers.len(), rows = body.len(), "read worksheet");

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("sheet")
        .to_ascii_lowercase();
    Ok(RawTable::new(headers, body, ext))
}
