//! shelf - personal book catalogue
//!
//! Without a subcommand this opens the terminal UI. The subcommands run the
//! same operations headless, for scripting and barcode readers on stdin.

mod app;
mod commands;
mod keybindings;
mod mode;
mod views;
mod widgets;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use shelf_core::{Collection, Config, FileStorage, Lookup};

use app::App;

/// Environment variable holding the log filter (`RUST_LOG` syntax).
const LOG_ENV: &str = "SHELF_LOG";

const LOG_FILE: &str = "shelf.log";

#[derive(Parser)]
#[command(name = "shelf", version, about = "Find books by ISBN and keep a personal library")]
struct Cli {
    /// Path to a config.toml (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the library and the log file.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a book by ISBN.
    Lookup {
        /// ISBN-10 or ISBN-13, hyphens allowed.
        isbn: String,

        /// Add the book to the library when found.
        #[arg(long)]
        add: bool,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Read barcodes from stdin (one per line) and look up the first one found.
    Scan {
        /// Add the book to the library when found.
        #[arg(long)]
        add: bool,
    },

    /// List the books in the library.
    List,

    /// List the metadata sources in the order they are tried.
    Sources,

    /// Show one book from the library.
    Show {
        id: String,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Mark a book as checked out.
    Checkout { id: String },

    /// Mark a book as available again.
    Return { id: String },

    /// Remove a book from the library.
    Remove { id: String },

    /// Export the library as CSV.
    Export {
        /// Output path (defaults to the configured file name).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = Some(dir);
    }
    let data_dir = config.data_dir();

    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Some(command) => {
            init_stderr_logging();
            let ctx = commands::Context::new(config, data_dir);
            runtime.block_on(commands::run(command, &ctx))
        }
        None => {
            init_file_logging(&data_dir)?;
            run_tui(config, &data_dir, runtime.handle().clone())
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .init();
}

/// The terminal owns stdout and stderr while the UI is up, so logs go to a file.
fn init_file_logging(data_dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(data_dir)?;
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join(LOG_FILE))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_tui(
    config: Config,
    data_dir: &Path,
    runtime: tokio::runtime::Handle,
) -> Result<(), Box<dyn std::error::Error>> {
    let lookup = Lookup::from_config(&config)?;
    let collection = Collection::load(FileStorage::new(data_dir));
    let mut app = App::new(config, collection, lookup, runtime);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.drain_events();
        terminal.draw(|f| app.render(f))?;

        // Poll with a timeout so lookup and scan results are picked up
        // without waiting for a key press.
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key.code, key.modifiers) {
                    app.shutdown();
                    return Ok(());
                }
            }
        }
    }
}
