// Input classifier: one committed token -> select/add a UPC or add a quantity
// Tokens of 4+ characters are UPCs; "1".."10" are quantity increments; anything else is rejected.

pub mod buffer;

use crate::constants::UPC_MIN_LEN;
use crate::error::{CounterError, Result};
use crate::store::validate::{has_code_charset, normalize_code, parse_quantity_step};
use crate::store::{Change, RecordStore};

pub use buffer::InputBuffer;

/// What a token means, before it touches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Empty,
    Code(String),
    Quantity(u32),
}

/// Result of handling one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Blank input, nothing happened.
    Ignored,
    /// Known UPC; the row becomes the selection, the store is untouched.
    Selected { row: usize, code: String },
    /// Unknown UPC; a new row was appended and becomes the selection.
    Added { row: usize, code: String, change: Change },
    /// Quantity added to the selected row.
    Incremented { row: usize, amount: u32, quantity: u64, change: Change },
}

impl InputOutcome {
    /// Row the caller should select afterwards, if the selection moves.
    pub fn selection(&self) -> Option<usize> {
        match self {
            InputOutcome::Selected { row, .. } | InputOutcome::Added { row, .. } => Some(*row),
            _ => None,
        }
    }

    pub fn change(&self) -> Option<Change> {
        match self {
            InputOutcome::Added { change, .. } | InputOutcome::Incremented { change, .. } => {
                Some(*change)
            }
            _ => None,
        }
    }

    /// Short status-bar text.
    pub fn status_message(&self) -> Option<String> {
        match self {
            InputOutcome::Ignored => None,
            InputOutcome::Selected { code, .. } => Some(format!("UPC selected: {}", code)),
            InputOutcome::Added { code, .. } => Some(format!("New UPC added: {}", code)),
            InputOutcome::Incremented { amount, .. } => Some(format!("Qty +{}", amount)),
        }
    }
}

/// Classify a raw token without looking at any state.
pub fn classify(raw: &str) -> Result<Token> {
    let token = raw.trim();
    if token.is_empty() {
        return Ok(Token::Empty);
    }

    if token.chars().count() >= UPC_MIN_LEN {
        if !has_code_charset(token) {
            return Err(CounterError::InvalidToken(token.to_string()));
        }
        return Ok(Token::Code(normalize_code(token)));
    }

    parse_quantity_step(token)
        .map(Token::Quantity)
        .ok_or_else(|| CounterError::InvalidToken(token.to_string()))
}

/// Classify `raw` and apply it to the store, given the currently selected row.
/// On error the store is unchanged.
pub fn handle_input(store: &mut RecordStore, selected: Option<usize>, raw: &str) -> Result<InputOutcome> {
    let outcome = match classify(raw)? {
        Token::Empty => InputOutcome::Ignored,
        Token::Code(code) => match store.find_row(&code) {
            Some(row) => InputOutcome::Selected { row, code },
            None => {
                let change = store.append_row(&code)?;
                InputOutcome::Added { row: change.row(), code, change }
            }
        },
        Token::Quantity(amount) => {
            let row = selected.ok_or(CounterError::NoSelection)?;
            let change = store.increment_quantity(row, amount)?;
            let quantity = store.row(row).map_or(0, |r| r.quantity);
            InputOutcome::Incremented { row, amount, quantity, change }
        }
    };

    log::debug!("input {:?} -> {:?}", raw.trim(), outcome);
    Ok(outcome)
}
