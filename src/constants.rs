// UPC Counter Constants
// The spreadsheet layout and the code/quantity rules are shared by live edits and file import.

// Spreadsheet schema (fixed order)
pub const COL_UPC: &str = "UPC";
pub const COL_QTY: &str = "Qty";
pub const COL_LAST_SCANNED_AT: &str = "LastScannedAt";
pub const COLUMNS: [&str; 3] = [COL_UPC, COL_QTY, COL_LAST_SCANNED_AT];

// Codes
pub const UPC_MIN_LEN: usize = 4;
pub const UPC_PATTERN: &str = r"^[A-Za-z0-9]{4,}$";
pub const UPC_CHARSET_PATTERN: &str = r"^[A-Za-z0-9]+$";

// Quantity increments typed into the buffer (1..=10, no leading zeros)
pub const QTY_STEP_PATTERN: &str = r"^(?:10|[1-9])$";

// Time
pub const TIMESTAMP_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const TIMESTAMP_EXCEL_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

// Spreadsheet rows are 1-based and the header occupies the first one
pub const SHEET_ROW_BASE: usize = 1;

// Export layout
pub const COL_WIDTH_UPC: f64 = 32.0;
pub const COL_WIDTH_QTY: f64 = 10.0;
pub const COL_WIDTH_LAST_SCANNED_AT: f64 = 22.0;

// Session
pub const APP_TITLE: &str = "UPC Counter";
pub const UNTITLED: &str = "Untitled";
pub const DEFAULT_FILE_NAME: &str = "upc_data.xlsx";

// Settings
pub const SETTINGS_DIR: &str = ".upc-counter";
pub const SETTINGS_FILENAME: &str = "settings.json";
pub const SETTINGS_VERSION: u32 = 1;
pub const MAX_RECENT_FILES: usize = 10;
