// Canonical code and quantity rules
// Live edits, the input classifier and file import all go through these functions.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{QTY_STEP_PATTERN, UPC_CHARSET_PATTERN, UPC_PATTERN};
use crate::error::{CounterError, Result};

static UPC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UPC_PATTERN).expect("UPC pattern is a valid regex"));
static UPC_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(UPC_CHARSET_PATTERN).expect("UPC charset pattern is a valid regex"));
static QTY_STEP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(QTY_STEP_PATTERN).expect("quantity pattern is a valid regex"));

/// Trim and uppercase. Does not validate.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// True when an already-normalized code satisfies the charset and length rule.
pub fn is_valid_code(code: &str) -> bool {
    UPC_RE.is_match(code)
}

/// Normalize `raw` and check it against the code rule.
pub fn validate_code(raw: &str) -> Result<String> {
    let code = normalize_code(raw);
    if is_valid_code(&code) {
        Ok(code)
    } else {
        Err(CounterError::InvalidCode(raw.trim().to_string()))
    }
}

/// Letters and digits only, any length.
pub fn has_code_charset(token: &str) -> bool {
    UPC_CHARSET_RE.is_match(token)
}

/// Parse a buffer increment: the integers 1 through 10, written without leading zeros.
pub fn parse_quantity_step(token: &str) -> Option<u32> {
    if !QTY_STEP_RE.is_match(token) {
        return None;
    }
    token.parse().ok()
}

/// Parse quantity text from the edit path: ASCII digits only.
pub fn parse_quantity_text(text: &str) -> Result<u64> {
    let t = text.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CounterError::InvalidQuantity(t.to_string()));
    }
    t.parse()
        .map_err(|_| CounterError::InvalidQuantity(t.to_string()))
}

/// Accept a signed quantity only when it is not negative.
pub fn check_quantity(value: i64) -> Result<u64> {
    u64::try_from(value).map_err(|_| CounterError::InvalidQuantity(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code_normalizes() {
        assert_eq!(validate_code("  abcd12 ").unwrap(), "ABCD12");
        assert_eq!(validate_code("0042").unwrap(), "0042");
    }

    #[test]
    fn test_validate_code_rejects_short_and_symbols() {
        assert!(matches!(validate_code("AB1"), Err(CounterError::InvalidCode(_))));
        assert!(matches!(validate_code("AB-12"), Err(CounterError::InvalidCode(_))));
        assert!(matches!(validate_code("AB 12"), Err(CounterError::InvalidCode(_))));
        assert!(matches!(validate_code(""), Err(CounterError::InvalidCode(_))));
    }

    #[test]
    fn test_quantity_step_range() {
        assert_eq!(parse_quantity_step("1"), Some(1));
        assert_eq!(parse_quantity_step("10"), Some(10));
        assert_eq!(parse_quantity_step("0"), None);
        assert_eq!(parse_quantity_step("11"), None);
        assert_eq!(parse_quantity_step("05"), None);
        assert_eq!(parse_quantity_step("-3"), None);
    }

    #[test]
    fn test_quantity_text_digits_only() {
        assert_eq!(parse_quantity_text(" 42 ").unwrap(), 42);
        assert_eq!(parse_quantity_text("0").unwrap(), 0);
        assert!(parse_quantity_text("-1").is_err());
        assert!(parse_quantity_text("4.0").is_err());
        assert!(parse_quantity_text("").is_err());
    }

    #[test]
    fn test_check_quantity_rejects_negative() {
        assert_eq!(check_quantity(7).unwrap(), 7);
        assert!(matches!(check_quantity(-1), Err(CounterError::InvalidQuantity(_))));
    }
}
