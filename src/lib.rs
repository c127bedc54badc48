// UPC Counter - Library Entry Point
// Counting core behind the desktop window and the `upc-counter` CLI:
// record store, spreadsheet codec, input classifier and the session tying them together.

pub mod constants;
pub mod error;
pub mod store;
pub mod codec;
pub mod input;
pub mod session;
pub mod settings;

pub use error::{CounterError, Result};
pub use session::{EditMode, Session, SessionObserver};
pub use store::{Change, RecordStore, Row};
