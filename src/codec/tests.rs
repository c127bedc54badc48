// Codec tests: whole-file validation, xlsx import/export, round trip
// Workbooks are generated with rust_xlsxwriter; no binary fixtures are checked in.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use super::*;
use crate::error::{CounterError, ViolationKind};
use crate::store::{Row, StepClock};

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn header() -> Vec<CellValue> {
    vec![text("UPC"), text("Qty"), text("LastScannedAt")]
}

fn sheet(rows: Vec<Vec<CellValue>>) -> Sheet {
    Sheet { header_row: 0, header: header(), rows }
}

fn violations(err: CounterError) -> Vec<RowViolationView> {
    match err {
        CounterError::ImportValidation(v) => v
            .iter()
            .map(|v| match &v.kind {
                ViolationKind::InvalidCode { .. } => RowViolationView::Code(v.row),
                ViolationKind::DuplicateCode { rows, .. } => RowViolationView::Dup(rows.clone()),
                ViolationKind::InvalidQuantity { .. } => RowViolationView::Qty(v.row),
            })
            .collect(),
        other => panic!("expected ImportValidation, got {other:?}"),
    }
}

#[derive(Debug, PartialEq)]
enum RowViolationView {
    Code(usize),
    Dup(Vec<usize>),
    Qty(usize),
}

/// Write a one-sheet workbook whose cells are given as strings; cells that parse
/// as numbers are written as numbers, empty strings are left blank.
fn write_xlsx(dir: &Path, name: &str, rows: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>() {
                Ok(n) if r > 0 => {
                    worksheet.write_number(r as u32, c as u16, n).unwrap();
                }
                _ => {
                    worksheet.write_string(r as u32, c as u16, *value).unwrap();
                }
            }
        }
    }
    workbook.save(&path).unwrap();
    path
}

fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// ---------------------------------------------------------------
// validate_sheet (in memory)
// ---------------------------------------------------------------

#[test]
fn test_valid_sheet_is_normalized() {
    let rows = validate_sheet(&sheet(vec![
        vec![text("  abcd12 "), CellValue::Float(17.0), text("2024-03-05 14:07:09")],
        vec![CellValue::Float(123456.0), text("4"), CellValue::Empty],
    ]))
    .unwrap();

    assert_eq!(
        rows,
        vec![
            Row { code: "ABCD12".into(), quantity: 17, last_scanned_at: Some(dt("2024-03-05 14:07:09")) },
            Row { code: "123456".into(), quantity: 4, last_scanned_at: None },
        ]
    );
}

#[test]
fn test_duplicate_codes_report_every_row_of_group() {
    let err = validate_sheet(&sheet(vec![
        vec![text("ABCD12"), CellValue::Int(1), CellValue::Empty],
        vec![text("WXYZ99"), CellValue::Int(1), CellValue::Empty],
        vec![text("abcd12 "), CellValue::Int(2), CellValue::Empty],
    ]))
    .unwrap_err();

    assert_eq!(violations(err), vec![RowViolationView::Dup(vec![2, 4])]);
}

#[test]
fn test_fractional_quantity_rejected() {
    let err = validate_sheet(&sheet(vec![
        vec![text("ABCD12"), text("3.5"), CellValue::Empty],
        vec![text("EFGH34"), CellValue::Float(2.25), CellValue::Empty],
    ]))
    .unwrap_err();

    assert_eq!(violations(err), vec![RowViolationView::Qty(2), RowViolationView::Qty(3)]);
}

#[test]
fn test_all_violations_collected_together() {
    let err = validate_sheet(&sheet(vec![
        vec![text("AB1"), CellValue::Int(1), CellValue::Empty],
        vec![text("GOOD01"), text("many"), CellValue::Empty],
        vec![CellValue::Empty, CellValue::Int(1), CellValue::Empty],
        vec![text("DUPE01"), CellValue::Int(1), CellValue::Empty],
        vec![text("dupe01"), CellValue::Int(-3), CellValue::Empty],
        vec![text("BAD-CODE"), CellValue::Int(1), CellValue::Empty],
    ]))
    .unwrap_err();

    assert_eq!(
        violations(err),
        vec![
            RowViolationView::Code(2),
            RowViolationView::Code(4),
            RowViolationView::Code(7),
            RowViolationView::Dup(vec![5, 6]),
            RowViolationView::Qty(3),
            RowViolationView::Qty(6),
        ]
    );
}

#[test]
fn test_missing_column_reads_as_empty() {
    // No Qty column: every row fails the quantity check
    let s = Sheet {
        header_row: 0,
        header: vec![text("UPC"), text("LastScannedAt")],
        rows: vec![vec![text("ABCD12"), CellValue::Empty]],
    };
    assert_eq!(violations(validate_sheet(&s).unwrap_err()), vec![RowViolationView::Qty(2)]);

    // No timestamp column: rows import with unknown timestamps
    let s = Sheet {
        header_row: 0,
        header: vec![text("upc "), text("QTY")],
        rows: vec![vec![text("ABCD12"), CellValue::Int(5)]],
    };
    let rows = validate_sheet(&s).unwrap();
    assert_eq!(rows[0].quantity, 5);
    assert_eq!(rows[0].last_scanned_at, None);
}

#[test]
fn test_columns_matched_by_header_name() {
    let s = Sheet {
        header_row: 2,
        header: vec![text("Note"), text("Qty"), text("UPC")],
        rows: vec![
            vec![text("shelf 4"), CellValue::Int(3), text("ABCD12")],
            vec![text("shelf 5"), text("x"), text("EFGH34")],
        ],
    };
    // Header sits on sheet row 3, so data starts at row 4
    assert_eq!(violations(validate_sheet(&s).unwrap_err()), vec![RowViolationView::Qty(5)]);
}

#[test]
fn test_blank_rows_skipped_but_numbering_kept() {
    let rows = validate_sheet(&sheet(vec![
        vec![text("ABCD12"), CellValue::Int(1), CellValue::Empty],
        vec![CellValue::Empty, text("  "), CellValue::Empty],
        vec![text("EFGH34"), CellValue::Int(2), CellValue::Empty],
    ]))
    .unwrap();
    assert_eq!(rows.len(), 2);

    let err = validate_sheet(&sheet(vec![
        vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
        vec![text("AB"), CellValue::Int(2), CellValue::Empty],
    ]))
    .unwrap_err();
    assert_eq!(violations(err), vec![RowViolationView::Code(3)]);
}

#[test]
fn test_unparsable_timestamp_is_not_an_error() {
    let rows = validate_sheet(&sheet(vec![vec![text("ABCD12"), CellValue::Int(1), text("soon")]]))
        .unwrap();
    assert_eq!(rows[0].last_scanned_at, None);
}

// ---------------------------------------------------------------
// xlsx files
// ---------------------------------------------------------------

#[test]
fn test_import_xlsx_file() {
    let tmp = TempDir::new().unwrap();
    let path = write_xlsx(
        tmp.path(),
        "counts.xlsx",
        &[
            &["UPC", "Qty", "LastScannedAt"],
            &["abcd12", "17", "2024-03-05 14:07:09"],
            &["0000123456", "", ""],
        ],
    );

    // Second row has no Qty
    let err = import_rows(&path).unwrap_err();
    assert_eq!(violations(err), vec![RowViolationView::Qty(3)]);

    let path = write_xlsx(
        tmp.path(),
        "counts2.xlsx",
        &[
            &["UPC", "Qty", "LastScannedAt"],
            &["abcd12", "17", "2024-03-05 14:07:09"],
            &["WXYZ99", "0", ""],
        ],
    );
    let store = import_rows(&path).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.find_row("ABCD12"), Some(0));
    assert_eq!(store.row(0).unwrap().quantity, 17);
    assert_eq!(store.row(0).unwrap().last_scanned_at, Some(dt("2024-03-05 14:07:09")));
    assert_eq!(store.row(1).unwrap().last_scanned_at, None);
}

#[test]
fn test_import_xlsx_duplicates_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = write_xlsx(
        tmp.path(),
        "dupes.xlsx",
        &[
            &["UPC", "Qty", "LastScannedAt"],
            &["ABCD12", "1", ""],
            &["abcd12", "2", ""],
        ],
    );

    let err = import_rows(&path).unwrap_err();
    assert_eq!(violations(err), vec![RowViolationView::Dup(vec![2, 3])]);
}

#[test]
fn test_import_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let err = import_rows(&tmp.path().join("nope.xlsx")).unwrap_err();
    assert!(matches!(err, CounterError::Io(_)));
}

#[test]
fn test_import_non_spreadsheet_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.xlsx");
    std::fs::write(&path, b"just some text").unwrap();

    assert!(matches!(import_rows(&path), Err(CounterError::Spreadsheet(_))));
}

#[test]
fn test_export_then_import_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("round.xlsx");

    let mut store = RecordStore::new().with_clock(StepClock::new());
    store.append_row("ABCD12").unwrap();
    store.append_row("0000123456").unwrap();
    store.append_row("wxyz99").unwrap();
    store.increment_quantity(0, 7).unwrap();
    store.increment_quantity(2, 10).unwrap();
    store.set_fields(1, None, Some(250), true).unwrap();

    export_rows(&store, &path).unwrap();
    let loaded = import_rows(&path).unwrap();

    assert_eq!(loaded.rows(), store.rows());
    assert_eq!(loaded.find_row("0000123456"), Some(1));
}

#[test]
fn test_round_trip_keeps_displayed_seconds() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("fraction.xlsx");
    let scanned = NaiveDateTime::parse_from_str("2024-01-01 09:00:00.700", "%Y-%m-%d %H:%M:%S%.f").unwrap();
    let store = RecordStore::from_rows(vec![Row {
        code: "ABCD12".into(),
        quantity: 2,
        last_scanned_at: Some(scanned),
    }])
    .unwrap();
    let before = store.display(0, 2);

    export_rows(&store, &path).unwrap();
    let loaded = import_rows(&path).unwrap();

    assert_eq!(loaded.display(0, 2), before);
    assert_eq!(loaded.display(0, 2).as_deref(), Some("2024-01-01 09:00:00"));
}

#[test]
fn test_round_trip_with_system_clock() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("live.xlsx");
    let mut store = RecordStore::new();
    for i in 0..20 {
        store.append_row(&format!("LIVE{i:02}")).unwrap();
    }

    export_rows(&store, &path).unwrap();
    let loaded = import_rows(&path).unwrap();

    for i in 0..store.len() {
        assert_eq!(loaded.display(i, 2), store.display(i, 2));
    }
    assert_eq!(loaded.rows(), store.rows());
}

#[test]
fn test_export_unknown_timestamp_stays_blank() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("blank.xlsx");
    let store = RecordStore::from_rows(vec![Row {
        code: "ABCD12".into(),
        quantity: 3,
        last_scanned_at: None,
    }])
    .unwrap();

    export_rows(&store, &path).unwrap();

    let sheet = read_sheet(&path).unwrap();
    assert_eq!(sheet.header, header());
    assert_eq!(sheet.rows.len(), 1);
    assert_eq!(sheet.rows[0][0], text("ABCD12"));
    assert_eq!(sheet.rows[0][1].quantity(), Some(3));
    assert!(sheet.rows[0].get(2).map_or(true, CellValue::is_blank));
}

#[test]
fn test_export_empty_store_writes_header() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("empty.xlsx");

    export_rows(&RecordStore::new(), &path).unwrap();

    let sheet = read_sheet(&path).unwrap();
    assert_eq!(sheet.header, header());
    assert!(sheet.rows.is_empty());
    assert!(import_rows(&path).unwrap().is_empty());
}

#[test]
fn test_export_failure_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("missing-dir").join("out.xlsx");

    let err = export_rows(&RecordStore::new(), &path).unwrap_err();
    assert!(matches!(err, CounterError::Io(_)));
    assert!(!path.exists());
}

#[test]
fn test_export_replaces_existing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out.xlsx");
    std::fs::write(&path, b"old").unwrap();

    let mut store = RecordStore::new();
    store.append_row("ABCD12").unwrap();
    export_rows(&store, &path).unwrap();

    assert_eq!(import_rows(&path).unwrap().len(), 1);
    assert!(!tmp.path().join(".out.xlsx.tmp").exists());
}

#[test]
fn test_failed_export_removes_temp_file() {
    let tmp = TempDir::new().unwrap();
    // A non-empty directory at the target makes the final rename fail
    let path = tmp.path().join("taken.xlsx");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("keep"), b"x").unwrap();

    let err = export_rows(&RecordStore::new(), &path).unwrap_err();
    assert!(matches!(err, CounterError::Io(_)));
    assert!(!tmp.path().join(".taken.xlsx.tmp").exists());
    assert!(path.join("keep").exists());
}
