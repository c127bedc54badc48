// Record store: ordered (UPC, Qty, LastScannedAt) rows plus a UPC -> row index
// The index is rebuilt or patched on every insert and edit; rows are never deleted.

pub mod validate;
pub mod view;


use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{CounterError, Result};
use validate::{check_quantity, normalize_code, validate_code};

pub use view::{format_timestamp, SortColumn};

/// One tracked item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub code: String,
    pub quantity: u64,
    /// `None` when an imported sheet had no usable timestamp.
    pub last_scanned_at: Option<NaiveDateTime>,
}

/// Source of "now" for scan timestamps.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time, truncated to whole seconds like the display and the sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        let now = chrono::Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

/// Test clock: starts at 2024-01-01 09:00:00 and moves one second per reading.
#[cfg(test)]
pub(crate) struct StepClock(std::cell::Cell<NaiveDateTime>);

#[cfg(test)]
impl StepClock {
    pub(crate) fn new() -> Self {
        let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        Self(std::cell::Cell::new(start))
    }
}

#[cfg(test)]
impl Clock for StepClock {
    fn now(&self) -> NaiveDateTime {
        let now = self.0.get();
        self.0.set(now + chrono::Duration::seconds(1));
        now
    }
}

/// What a successful mutation touched. Callers use it to mark unsaved state
/// and to refresh the affected row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Inserted(usize),
    Updated(usize),
}

impl Change {
    pub fn row(&self) -> usize {
        match *self {
            Change::Inserted(row) | Change::Updated(row) => row,
        }
    }
}

pub struct RecordStore {
    rows: Vec<Row>,
    index: HashMap<String, usize>,
    clock: Box<dyn Clock>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("rows", &self.rows)
            .finish_non_exhaustive()
    }
}

impl RecordStore {
    /// Empty store using the system clock.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
            clock: Box::new(SystemClock),
        }
    }

    /// Build a store from existing rows. Every code must already be normalized,
    /// valid and unique.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        let mut store = Self::new();
        for row in &rows {
            if validate_code(&row.code)? != row.code {
                return Err(CounterError::InvalidCode(row.code.clone()));
            }
        }
        store.rows = rows;
        store.rebuild_index()?;
        Ok(store)
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Take over another store's rows wholesale, keeping this store's clock.
    pub fn replace_with(&mut self, other: RecordStore) {
        self.rows = other.rows;
        self.index = other.index;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Look up a code after trimming and uppercasing it.
    pub fn find_row(&self, code: &str) -> Option<usize> {
        self.index.get(&normalize_code(code)).copied()
    }

    /// Append a new row with quantity 0 stamped with the current time.
    pub fn append_row(&mut self, code: &str) -> Result<Change> {
        let code = validate_code(code)?;
        if self.index.contains_key(&code) {
            return Err(CounterError::DuplicateCode(code));
        }

        let row = self.rows.len();
        self.rows.push(Row {
            code: code.clone(),
            quantity: 0,
            last_scanned_at: Some(self.clock.now()),
        });
        self.index.insert(code, row);

        log::debug!("appended row {} ({})", row, self.rows[row].code);
        Ok(Change::Inserted(row))
    }

    /// Add `amount` to a row's quantity and refresh its timestamp.
    /// The 1..=10 range is enforced by the caller.
    pub fn increment_quantity(&mut self, row: usize, amount: u32) -> Result<Change> {
        let now = self.clock.now();
        let entry = self.rows.get_mut(row).ok_or(CounterError::InvalidIndex(row))?;

        let total = entry
            .quantity
            .checked_add(u64::from(amount))
            .ok_or_else(|| CounterError::InvalidQuantity(format!("{} + {}", entry.quantity, amount)))?;
        entry.quantity = total;
        entry.last_scanned_at = Some(now);

        log::debug!("row {} ({}) qty +{} -> {}", row, entry.code, amount, entry.quantity);
        Ok(Change::Updated(row))
    }

    /// Overwrite code and/or quantity of one row.
    ///
    /// Both values are validated before anything is written, so a failure leaves the
    /// row untouched. The timestamp is refreshed unless `preserve_timestamp` is set,
    /// which is what the corrective edit path uses.
    pub fn set_fields(
        &mut self,
        row: usize,
        new_code: Option<&str>,
        new_quantity: Option<i64>,
        preserve_timestamp: bool,
    ) -> Result<Change> {
        if row >= self.rows.len() {
            return Err(CounterError::InvalidIndex(row));
        }

        let code = match new_code {
            Some(raw) => {
                let code = validate_code(raw)?;
                match self.index.get(&code) {
                    Some(&owner) if owner != row => return Err(CounterError::DuplicateCode(code)),
                    _ => Some(code),
                }
            }
            None => None,
        };
        let quantity = new_quantity.map(check_quantity).transpose()?;

        let now = self.clock.now();
        let entry = &mut self.rows[row];
        if let Some(code) = code {
            if code != entry.code {
                self.index.remove(&entry.code);
                self.index.insert(code.clone(), row);
                entry.code = code;
            }
        }
        if let Some(quantity) = quantity {
            entry.quantity = quantity;
        }
        if !preserve_timestamp {
            entry.last_scanned_at = Some(now);
        }

        log::debug!(
            "row {} set to ({}, {}){}",
            row,
            entry.code,
            entry.quantity,
            if preserve_timestamp { " keeping timestamp" } else { "" }
        );
        Ok(Change::Updated(row))
    }

    fn rebuild_index(&mut self) -> Result<()> {
        self.index.clear();
        for (i, row) in self.rows.iter().enumerate() {
            if self.index.insert(row.code.clone(), i).is_some() {
                return Err(CounterError::DuplicateCode(row.code.clone()));
            }
        }
        Ok(())
    }
}
