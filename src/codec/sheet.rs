// Sheet alignment and whole-file validation
// Every row is checked before any is accepted; all problems are reported together.

use std::collections::HashMap;

use super::cell::CellValue;
use crate::constants::{COLUMNS, SHEET_ROW_BASE};
use crate::error::{CounterError, ImportViolations, Result, RowViolation, ViolationKind};
use crate::store::validate::{is_valid_code, normalize_code};
use crate::store::Row;

/// Raw cells of one worksheet: a header row followed by data rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    /// 0-based sheet row holding the header.
    pub header_row: usize,
    pub header: Vec<CellValue>,
    pub rows: Vec<Vec<CellValue>>,
}

/// One data row aligned to the fixed (UPC, Qty, LastScannedAt) schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based sheet row number, as a spreadsheet shows it.
    pub sheet_row: usize,
    pub upc: CellValue,
    pub qty: CellValue,
    pub last_scanned_at: CellValue,
}

impl Sheet {
    /// Position of each schema column in the header; `None` when the column is absent.
    fn column_map(&self) -> [Option<usize>; 3] {
        COLUMNS.map(|name| {
            self.header.iter().position(|cell| match cell {
                CellValue::Text(s) => s.trim().eq_ignore_ascii_case(name),
                _ => false,
            })
        })
    }

    /// Data rows aligned to the schema. Missing columns read as empty;
    /// rows with nothing in any schema column are skipped.
    pub fn records(&self) -> Vec<Record> {
        let map = self.column_map();
        let cell = |row: &[CellValue], col: Option<usize>| {
            col.and_then(|c| row.get(c)).cloned().unwrap_or(CellValue::Empty)
        };

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| Record {
                sheet_row: self.header_row + i + 1 + SHEET_ROW_BASE,
                upc: cell(row, map[0]),
                qty: cell(row, map[1]),
                last_scanned_at: cell(row, map[2]),
            })
            .filter(|r| !(r.upc.is_blank() && r.qty.is_blank() && r.last_scanned_at.is_blank()))
            .collect()
    }
}

/// Validate a whole sheet and convert it to store rows.
///
/// Checks, in order: each code is present and valid after normalization; no two
/// rows share a normalized code (each group is reported at its lowest row); each
/// quantity is a whole number. Unreadable timestamps become unknown.
pub fn validate_sheet(sheet: &Sheet) -> Result<Vec<Row>> {
    let records = sheet.records();
    let mut violations = Vec::new();

    let codes: Vec<Option<String>> = records
        .iter()
        .map(|r| r.upc.code_text().map(|t| normalize_code(&t)))
        .collect();

    for (record, code) in records.iter().zip(&codes) {
        let valid = code.as_deref().is_some_and(is_valid_code);
        if !valid {
            violations.push(RowViolation {
                row: record.sheet_row,
                kind: ViolationKind::InvalidCode { value: record.upc.describe() },
            });
        }
    }

    let mut groups: HashMap<&str, Vec<usize>> = HashMap::new();
    for (record, code) in records.iter().zip(&codes) {
        if let Some(code) = code.as_deref().filter(|c| !c.is_empty()) {
            groups.entry(code).or_default().push(record.sheet_row);
        }
    }
    let mut duplicates: Vec<(&str, Vec<usize>)> =
        groups.into_iter().filter(|(_, rows)| rows.len() > 1).collect();
    duplicates.sort_by_key(|(_, rows)| rows[0]);
    for (code, rows) in duplicates {
        violations.push(RowViolation {
            row: rows[0],
            kind: ViolationKind::DuplicateCode { code: code.to_string(), rows },
        });
    }

    for record in &records {
        if record.qty.quantity().is_none() {
            violations.push(RowViolation {
                row: record.sheet_row,
                kind: ViolationKind::InvalidQuantity { value: record.qty.describe() },
            });
        }
    }

    if !violations.is_empty() {
        return Err(CounterError::ImportValidation(ImportViolations(violations)));
    }

    let rows = records
        .iter()
        .zip(codes)
        .map(|(record, code)| Row {
            code: code.unwrap_or_default(),
            quantity: record.qty.quantity().unwrap_or_default(),
            last_scanned_at: record.last_scanned_at.timestamp(),
        })
        .collect();
    Ok(rows)
}
