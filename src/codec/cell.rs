// Cell values read from a sheet and how each column interprets them

use calamine::Data;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Reader-independent cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Float(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => dt
                .as_datetime()
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Float(dt.as_f64())),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => CellValue::Error(format!("{e:?}")),
        }
    }
}

// Text timestamp layouts accepted on import, most specific first
const TEXT_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const TEXT_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

// Largest serial a spreadsheet can display (9999-12-31)
const MAX_SERIAL_DAYS: f64 = 2_958_465.0;

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text of the cell as a UPC candidate. Whole numbers lose their `.0`
    /// so a numeric `12345` cell reads as `"12345"`.
    pub fn code_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(whole_number(*f).map_or_else(|| f.to_string(), |n| n.to_string())),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.to_string()),
            CellValue::Error(e) => Some(e.clone()),
        }
    }

    /// Whole, non-negative quantity. Accepts integers, integer-valued floats and digit strings.
    pub fn quantity(&self) -> Option<u64> {
        match self {
            CellValue::Int(i) => u64::try_from(*i).ok(),
            CellValue::Float(f) => whole_number(*f).and_then(|n| u64::try_from(n).ok()),
            CellValue::Text(s) => {
                let t = s.trim();
                if !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()) {
                    t.parse().ok()
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Scan timestamp rounded to the second, absorbing float noise in stored serials;
    /// `None` when the cell cannot be read as one.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        let dt = match self {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Text(s) => parse_text_timestamp(s.trim()),
            CellValue::Float(f) => from_serial(*f),
            CellValue::Int(i) => from_serial(*i as f64),
            _ => None,
        }?;
        Some(round_to_second(dt))
    }

    /// Short rendering used in violation messages.
    pub fn describe(&self) -> String {
        self.code_text().unwrap_or_default()
    }
}

fn whole_number(f: f64) -> Option<i64> {
    // i64 range check keeps the cast exact for anything a sheet can hold as a count
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_text_timestamp(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    for fmt in TEXT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in TEXT_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

/// Spreadsheet serial date (days since 1899-12-30, fraction = time of day).
fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_SERIAL_DAYS).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn round_to_second(dt: NaiveDateTime) -> NaiveDateTime {
    let base = dt.with_nanosecond(0).unwrap_or(dt);
    if dt.nanosecond() >= 500_000_000 {
        base + Duration::seconds(1)
    } else {
        base
    }
}
