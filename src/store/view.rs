// Display contract for the table: headers, per-cell text, display-only sort order

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use super::RecordStore;
use crate::constants::{COLUMNS, TIMESTAMP_DISPLAY_FORMAT};

/// Column a table view can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Upc,
    Qty,
    LastScannedAt,
}

/// `YYYY-MM-DD HH:MM:SS`, or empty when unknown.
pub fn format_timestamp(ts: Option<&NaiveDateTime>) -> String {
    ts.map(|t| t.format(TIMESTAMP_DISPLAY_FORMAT).to_string())
        .unwrap_or_default()
}

impl RecordStore {
    pub fn row_count(&self) -> usize {
        self.len()
    }

    pub fn column_count(&self) -> usize {
        COLUMNS.len()
    }

    pub fn header(&self, col: usize) -> Option<&'static str> {
        COLUMNS.get(col).copied()
    }

    /// Text shown for one cell, `None` outside the table.
    pub fn display(&self, row: usize, col: usize) -> Option<String> {
        let r = self.row(row)?;
        match col {
            0 => Some(r.code.clone()),
            1 => Some(r.quantity.to_string()),
            2 => Some(format_timestamp(r.last_scanned_at.as_ref())),
            _ => None,
        }
    }

    /// Row indices in display order. The store itself is never reordered.
    /// Unknown timestamps sort last in either direction; ties keep append order.
    pub fn sorted_rows(&self, column: SortColumn, descending: bool) -> Vec<usize> {
        let rows = self.rows();
        let mut order: Vec<usize> = (0..rows.len()).collect();

        order.sort_by(|&a, &b| {
            let (ra, rb) = (&rows[a], &rows[b]);
            let ord = match column {
                SortColumn::Upc => ra.code.cmp(&rb.code),
                SortColumn::Qty => ra.quantity.cmp(&rb.quantity),
                SortColumn::LastScannedAt => match (ra.last_scanned_at, rb.last_scanned_at) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => return Ordering::Less,
                    (None, Some(_)) => return Ordering::Greater,
                    (None, None) => Ordering::Equal,
                },
            };
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        order
    }
}
