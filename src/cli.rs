// UPC Counter CLI binary

use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use upc_counter_lib::codec;
use upc_counter_lib::error::CounterError;
use upc_counter_lib::session::{EditMode, Session, SessionObserver};
use upc_counter_lib::settings::Settings;
use upc_counter_lib::store::{format_timestamp, Change, RecordStore, SortColumn};

#[derive(Parser)]
#[command(name = "upc-counter")]
#[command(about = "UPC Counter - tally scanned UPCs into a spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty count sheet
    New {
        /// Spreadsheet path (.xlsx); defaults to the configured file name
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Feed scanned tokens (UPCs or quantities 1-10) into a count sheet
    Scan {
        /// Spreadsheet path (.xlsx); created if missing
        path: PathBuf,
        /// Tokens to process in order; reads one per line from stdin when omitted
        tokens: Vec<String>,
        /// Process tokens but do not save
        #[arg(long)]
        dry_run: bool,
    },

    /// Correct one row
    Edit {
        /// Spreadsheet path (.xlsx)
        path: PathBuf,
        /// UPC of the row to edit
        upc: String,
        /// Replacement UPC
        #[arg(long = "upc")]
        new_upc: Option<String>,
        /// Replacement quantity
        #[arg(long)]
        qty: Option<String>,
        /// Refresh LastScannedAt instead of keeping it
        #[arg(long)]
        touch: bool,
    },

    /// Show the rows of a count sheet
    List {
        /// Spreadsheet path (.xlsx)
        path: PathBuf,
        /// Sort column
        #[arg(long, value_enum)]
        sort: Option<SortArg>,
        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Validate a count sheet and report every problem
    Check {
        /// Spreadsheet path (.xlsx)
        path: PathBuf,
    },

    /// List recently used count sheets
    Recent,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Upc,
    Qty,
    Scanned,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Upc => SortColumn::Upc,
            SortArg::Qty => SortColumn::Qty,
            SortArg::Scanned => SortColumn::LastScannedAt,
        }
    }
}

/// Prints session feedback the way the desktop status bar and message boxes show it.
struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn changed(&mut self, change: &Change) {
        log::debug!("changed: {:?}", change);
    }

    fn error(&mut self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn status(&mut self, message: &str) {
        println!("{}", message);
    }
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::New { path, force } => cmd_new(path, force),
        Commands::Scan { path, tokens, dry_run } => cmd_scan(&path, tokens, dry_run),
        Commands::Edit { path, upc, new_upc, qty, touch } => cmd_edit(&path, &upc, new_upc, qty, touch),
        Commands::List { path, sort, desc } => cmd_list(&path, sort, desc),
        Commands::Check { path } => cmd_check(&path),
        Commands::Recent => cmd_recent(),
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn cmd_new(path: Option<PathBuf>, force: bool) -> Result<()> {
    let path = path.unwrap_or_else(|| PathBuf::from(Settings::load().default_file_name));
    let path = path.as_path();
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    codec::export_rows(&RecordStore::new(), path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    remember(path);

    println!("Created empty count sheet {}", path.display());
    Ok(())
}

fn cmd_scan(path: &Path, tokens: Vec<String>, dry_run: bool) -> Result<()> {
    let mut session = open_session(path, true)?;

    let tokens = if tokens.is_empty() {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read tokens from stdin")?
    } else {
        tokens
    };

    let mut accepted = 0usize;
    let mut rejected = 0usize;
    for token in &tokens {
        match session.submit(token) {
            Ok(_) => accepted += 1,
            // Already printed by the observer
            Err(_) => rejected += 1,
        }
    }

    println!();
    println!("Scan complete:");
    println!("  Accepted:  {}", accepted);
    println!("  Rejected:  {}", rejected);
    println!("  Rows:      {}", session.store().len());

    if dry_run {
        println!("Dry run: {} not written.", path.display());
        return Ok(());
    }
    if session.is_dirty() {
        save_session(&mut session, path)?;
    }

    Ok(())
}

fn cmd_edit(path: &Path, upc: &str, new_upc: Option<String>, qty: Option<String>, touch: bool) -> Result<()> {
    let mut session = open_session(path, false)?;

    let row = session
        .store()
        .find_row(upc)
        .ok_or_else(|| anyhow::anyhow!("UPC {} not found in {}", upc.trim().to_uppercase(), path.display()))?;
    let current = session
        .store()
        .row(row)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Row {} disappeared", row))?;

    let code = new_upc.unwrap_or(current.code);
    let qty = qty.unwrap_or_else(|| current.quantity.to_string());
    let mode = if touch { EditMode::Touch } else { EditMode::Correction };

    apply_edit(&mut session, row, &code, &qty, mode, path)?;
    save_session(&mut session, path)?;

    print_rows(session.store(), &[row]);
    Ok(())
}

fn cmd_list(path: &Path, sort: Option<SortArg>, desc: bool) -> Result<()> {
    let store = codec::import_rows(path).with_context(|| format!("Failed to open {}", path.display()))?;

    if store.is_empty() {
        println!("No rows. Use 'upc-counter scan {} <UPC>' to start counting.", path.display());
        return Ok(());
    }

    let order = match sort {
        Some(column) => store.sorted_rows(column.into(), desc),
        None => (0..store.len()).collect(),
    };
    print_rows(&store, &order);

    let total: u64 = store.rows().iter().map(|r| r.quantity).sum();
    println!();
    println!("{} UPCs, {} items counted", store.len(), total);
    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    match codec::import_rows(path) {
        Ok(store) => {
            println!("OK: {} rows in {}", store.len(), path.display());
            Ok(())
        }
        Err(CounterError::ImportValidation(violations)) => {
            for violation in violations.iter() {
                println!("  {}", violation);
            }
            anyhow::bail!("{} has {} problem(s)", path.display(), violations.len())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn cmd_recent() -> Result<()> {
    let settings = Settings::load();

    if settings.recent_files.is_empty() {
        println!("No recent count sheets.");
        return Ok(());
    }

    for file in &settings.recent_files {
        println!("{}  {}", format_timestamp(Some(&file.last_used)), file.path.display());
    }
    Ok(())
}

/// The observer has already printed why an edit was refused; only say that nothing was written.
fn apply_edit(session: &mut Session, row: usize, code: &str, qty: &str, mode: EditMode, path: &Path) -> Result<()> {
    if session.edit_row(row, code, qty, mode).is_err() {
        anyhow::bail!("{} left unchanged", path.display());
    }
    Ok(())
}

/// Open `path` into a session; a missing file gives an empty session when `create` is set.
fn open_session(path: &Path, create: bool) -> Result<Session> {
    let mut session = Session::new().with_observer(ConsoleObserver);

    if path.exists() {
        session
            .open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        remember(path);
    } else if !create {
        anyhow::bail!("{} does not exist", path.display());
    }

    Ok(session)
}

fn save_session(session: &mut Session, path: &Path) -> Result<()> {
    let saved = match session.current_file() {
        Some(_) => session.save().map(|_| ()),
        None => session.save_as(path),
    };
    saved.with_context(|| format!("Failed to save {}", path.display()))?;

    remember(path);
    Ok(())
}

fn remember(path: &Path) {
    let mut settings = Settings::load();
    settings.remember(path);
    if let Err(e) = settings.save() {
        log::warn!("Failed to update recent files: {}", e);
    }
}

fn print_rows(store: &RecordStore, order: &[usize]) {
    println!("{:<24}  {:>8}  {}", "UPC", "Qty", "LastScannedAt");
    println!("{}", "-".repeat(56));

    for &i in order {
        if let Some(row) = store.row(i) {
            println!(
                "{:<24}  {:>8}  {}",
                row.code,
                row.quantity,
                format_timestamp(row.last_scanned_at.as_ref())
            );
        }
    }
}
