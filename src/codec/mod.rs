// Spreadsheet codec: the store's rows to and from a three-column .xlsx sheet
// Import is all-or-nothing; export writes rows as they are.

pub mod cell;
pub mod sheet;

#[cfg(test)]
mod tests;

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Reader, Xlsx};
use chrono::Timelike;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::constants::{
    COLUMNS, COL_WIDTH_LAST_SCANNED_AT, COL_WIDTH_QTY, COL_WIDTH_UPC, TIMESTAMP_EXCEL_FORMAT,
};
use crate::error::{CounterError, Result};
use crate::store::RecordStore;

pub use cell::CellValue;
pub use sheet::{validate_sheet, Record, Sheet};

/// Read the first worksheet of an .xlsx file and build a store from it.
/// Any violation anywhere rejects the whole file.
pub fn import_rows(path: &Path) -> Result<RecordStore> {
    let sheet = read_sheet(path)?;
    let rows = match validate_sheet(&sheet) {
        Ok(rows) => rows,
        Err(e) => {
            log::warn!("Rejected import of {}: {}", path.display(), e);
            return Err(e);
        }
    };

    let store = RecordStore::from_rows(rows)?;
    log::info!("Imported {} rows from {}", store.len(), path.display());
    Ok(store)
}

/// Raw cells of the first worksheet. An empty sheet yields an empty header and no rows.
pub fn read_sheet(path: &Path) -> Result<Sheet> {
    let bytes = fs::read(path)?;
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(spreadsheet_err)?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(spreadsheet_err)?,
        None => return Ok(Sheet::default()),
    };

    let header_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut rows = range.rows().map(|row| row.iter().map(CellValue::from).collect::<Vec<_>>());

    let header = rows.next().unwrap_or_default();
    Ok(Sheet {
        header_row,
        header,
        rows: rows.collect(),
    })
}

/// Write every row to `path` as UPC (text), Qty (number), LastScannedAt (datetime).
/// The workbook is built in memory first so a failure never leaves a truncated file.
pub fn export_rows(store: &RecordStore, path: &Path) -> Result<()> {
    let bytes = build_workbook(store).map_err(spreadsheet_err)?;

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    log::info!("Exported {} rows to {}", store.len(), path.display());
    Ok(())
}

fn build_workbook(store: &RecordStore) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let timestamp_format = Format::new().set_num_format(TIMESTAMP_EXCEL_FORMAT);

    let worksheet = workbook.add_worksheet();
    for (col, name) in COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }
    worksheet.set_column_width(0, COL_WIDTH_UPC)?;
    worksheet.set_column_width(1, COL_WIDTH_QTY)?;
    worksheet.set_column_width(2, COL_WIDTH_LAST_SCANNED_AT)?;

    for (i, row) in store.rows().iter().enumerate() {
        let r = (i + 1) as u32;
        worksheet.write_string(r, 0, &row.code)?;
        worksheet.write_number(r, 1, row.quantity as f64)?;
        if let Some(ts) = &row.last_scanned_at {
            // Whole seconds only, matching what the table shows
            let ts = ts.with_nanosecond(0).unwrap_or(*ts);
            worksheet.write_datetime_with_format(r, 2, &ts, &timestamp_format)?;
        }
    }

    workbook.save_to_buffer()
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

fn spreadsheet_err(e: impl std::fmt::Display) -> CounterError {
    CounterError::Spreadsheet(e.to_string())
}
