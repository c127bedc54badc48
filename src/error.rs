// UPC Counter Error Types

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CounterError {
    #[error("Invalid UPC: {0:?} (letters and digits only, at least 4 characters)")]
    InvalidCode(String),

    #[error("Duplicate UPC: {0}")]
    DuplicateCode(String),

    #[error("Invalid quantity: {0:?} (whole number, not negative)")]
    InvalidQuantity(String),

    #[error("Invalid input: {0:?} (UPC of 4+ characters or a number from 1 to 10)")]
    InvalidToken(String),

    #[error("No row selected: select a row or scan a UPC before adding a quantity")]
    NoSelection,

    #[error("Row index out of range: {0}")]
    InvalidIndex(usize),

    #[error("Import validation failed: {0}")]
    ImportValidation(ImportViolations),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No file to save to: use save as")]
    NoCurrentFile,
}

pub type Result<T> = std::result::Result<T, CounterError>;

/// One problem found while validating an imported sheet.
/// `row` is the 1-based spreadsheet row (the header is row 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowViolation {
    pub row: usize,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    InvalidCode { value: String },
    /// `rows` holds every row of the group, lowest first (equal to the violation's own row).
    DuplicateCode { code: String, rows: Vec<usize> },
    InvalidQuantity { value: String },
}

impl fmt::Display for RowViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ViolationKind::InvalidCode { value } => {
                write!(f, "row {}: invalid UPC {:?}", self.row, value)
            }
            ViolationKind::DuplicateCode { code, rows } => {
                let rows: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
                write!(f, "row {}: duplicate UPC {} (rows {})", self.row, code, rows.join(", "))
            }
            ViolationKind::InvalidQuantity { value } => {
                write!(f, "row {}: invalid Qty {:?}", self.row, value)
            }
        }
    }
}

/// Every violation found in one import, in check order (codes, duplicates, quantities).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportViolations(pub Vec<RowViolation>);

impl ImportViolations {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowViolation> {
        self.0.iter()
    }

    /// Sorted, de-duplicated sheet rows touched by any violation.
    pub fn rows(&self) -> Vec<usize> {
        let mut rows: Vec<usize> = self
            .0
            .iter()
            .flat_map(|v| match &v.kind {
                ViolationKind::DuplicateCode { rows, .. } => rows.clone(),
                _ => vec![v.row],
            })
            .collect();
        rows.sort_unstable();
        rows.dedup();
        rows
    }
}

impl fmt::Display for ImportViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} problem(s)", self.0.len())?;
        for violation in &self.0 {
            write!(f, "; {}", violation)?;
        }
        Ok(())
    }
}
