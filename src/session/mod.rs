// Counting session: one store plus the state a front end needs around it
// (selection, keystroke buffer, current file, unsaved flag). Front ends
// observe it through SessionObserver instead of reaching into its fields.


use std::path::{Path, PathBuf};

use crate::codec;
use crate::constants::{APP_TITLE, UNTITLED};
use crate::error::{CounterError, Result};
use crate::input::{self, InputBuffer, InputOutcome};
use crate::store::validate::parse_quantity_text;
use crate::store::{Change, RecordStore};

/// Callbacks a front end implements to follow the session. All default to no-ops.
pub trait SessionObserver {
    /// A row was inserted or updated.
    fn changed(&mut self, _change: &Change) {}
    /// A user action was rejected; the message is meant to be shown as-is.
    fn error(&mut self, _message: &str) {}
    /// Transient status text.
    fn status(&mut self, _message: &str) {}
}

pub struct NullObserver;

impl SessionObserver for NullObserver {}

/// How a manual row edit treats the scan timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Fix a mistake: keep LastScannedAt as it is.
    Correction,
    /// Treat the edit as a fresh scan: LastScannedAt becomes now.
    Touch,
}

pub struct Session {
    store: RecordStore,
    selection: Option<usize>,
    buffer: InputBuffer,
    current_file: Option<PathBuf>,
    dirty: bool,
    observer: Box<dyn SessionObserver>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_store(RecordStore::new())
    }

    pub fn with_store(store: RecordStore) -> Self {
        Self {
            store,
            selection: None,
            buffer: InputBuffer::new(),
            current_file: None,
            dirty: false,
            observer: Box::new(NullObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn selection(&self) -> Option<usize> {
        self.selection
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Window title: `UPC Counter - <file>` with a trailing `*` when unsaved.
    pub fn title(&self) -> String {
        let name = self.current_file.as_deref().map_or_else(|| UNTITLED.to_string(), file_label);
        let star = if self.dirty { "*" } else { "" };
        format!("{} - {}{}", APP_TITLE, name, star)
    }

    // ----- Selection -----

    pub fn select_row(&mut self, row: usize) -> Result<()> {
        let Some(r) = self.store.row(row) else {
            return self.report(Err(CounterError::InvalidIndex(row)));
        };
        let message = format!("Selected: UPC={}, Qty={}", r.code, r.quantity);
        self.selection = Some(row);
        self.observer.status(&message);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ----- Input buffer -----

    pub fn push_char(&mut self, c: char) -> bool {
        self.buffer.push(c)
    }

    pub fn buffer_text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.observer.status("Buffer cleared");
    }

    /// Commit the buffer and handle its text as one token.
    pub fn process_buffer(&mut self) -> Result<InputOutcome> {
        let text = self.buffer.commit();
        self.submit(&text)
    }

    /// Handle one token (scanner line or committed buffer).
    pub fn submit(&mut self, raw: &str) -> Result<InputOutcome> {
        let outcome = input::handle_input(&mut self.store, self.selection, raw);
        let outcome = self.report(outcome)?;

        if let Some(row) = outcome.selection() {
            self.selection = Some(row);
        }
        if let Some(change) = outcome.change() {
            self.mark_changed(change);
        }
        if let Some(message) = outcome.status_message() {
            self.observer.status(&message);
        }
        Ok(outcome)
    }

    // ----- Manual edits -----

    /// Apply the edit dialog's fields to one row. `code_text` follows the UPC rule,
    /// `qty_text` must be digits only. Nothing changes unless both are valid.
    pub fn edit_row(&mut self, row: usize, code_text: &str, qty_text: &str, mode: EditMode) -> Result<Change> {
        let result = parse_quantity_text(qty_text)
            .and_then(|q| i64::try_from(q).map_err(|_| CounterError::InvalidQuantity(q.to_string())))
            .and_then(|q| {
                self.store
                    .set_fields(row, Some(code_text), Some(q), mode == EditMode::Correction)
            });
        let change = self.report(result)?;
        self.mark_changed(change);
        Ok(change)
    }

    // ----- Files -----

    /// Replace the store with the contents of `path`. On failure nothing changes.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let loaded = self.report(codec::import_rows(path))?;
        self.store.replace_with(loaded);
        self.selection = None;
        self.dirty = false;
        self.current_file = Some(path.to_path_buf());

        log::info!("Opened {} ({} rows)", path.display(), self.store.len());
        self.observer.status(&format!("Loaded: {}", file_label(path)));
        Ok(())
    }

    /// Write to the current file. Fails with `NoCurrentFile` when there is none.
    pub fn save(&mut self) -> Result<PathBuf> {
        let path = match self.current_file.clone() {
            Some(path) => path,
            None => return self.report(Err(CounterError::NoCurrentFile)),
        };
        self.write_to(&path)?;
        Ok(path)
    }

    /// Write to `path` and make it the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        self.write_to(path)?;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    fn write_to(&mut self, path: &Path) -> Result<()> {
        self.report(codec::export_rows(&self.store, path))?;
        self.dirty = false;
        self.observer.status(&format!("Saved: {}", file_label(path)));
        Ok(())
    }

    fn mark_changed(&mut self, change: Change) {
        self.dirty = true;
        self.observer.changed(&change);
    }

    /// Forward an error to the observer before handing it back.
    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            log::warn!("{}", e);
            self.observer.error(&e.to_string());
        }
        result
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
