//! Headless subcommands

use std::io::BufRead;
use std::path::PathBuf;

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use thiserror::Error;

use shelf_core::{
    export_to_file, BookRecord, BookStatus, CancelFlag, Capabilities, CaptureError, Collection,
    Config, FileStorage, Lookup, ScanEvent, ScanOutcome, Scanner, SourceMetadata,
    TextBarcodeDetector, WedgeCamera,
};

use crate::views::{description, detail_fields};
use crate::Command;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("No book with id {0} in your library")]
    NotInLibrary(String),

    #[error("Scan ended without reading a barcode")]
    NoBarcode,

    #[error("Scan cancelled")]
    Cancelled,
}

/// What every subcommand needs.
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn new(config: Config, data_dir: PathBuf) -> Self {
        Self { config, data_dir }
    }

    fn collection(&self) -> Collection<FileStorage> {
        Collection::load(FileStorage::new(&self.data_dir))
    }
}

pub async fn run(command: Command, ctx: &Context) -> CommandResult {
    match command {
        Command::Lookup { isbn, add, json } => lookup(ctx, &isbn, add, json).await,
        Command::Scan { add } => scan(ctx, add).await,
        Command::List => list(ctx),
        Command::Sources => sources(ctx),
        Command::Show { id, json } => show(ctx, &id, json),
        Command::Checkout { id } => set_status(ctx, &id, BookStatus::CheckedOut),
        Command::Return { id } => set_status(ctx, &id, BookStatus::Available),
        Command::Remove { id } => remove(ctx, &id),
        Command::Export { output } => export(ctx, output),
    }
}

async fn lookup(ctx: &Context, isbn: &str, add: bool, json: bool) -> CommandResult {
    let book = Lookup::from_config(&ctx.config)?.find_by_isbn(isbn).await?;
    print_book(&book, json)?;
    if add {
        add_to_library(ctx, book)?;
    }
    Ok(())
}

/// Lines on stdin are fed to a keyboard-wedge scanner until one holds a
/// barcode. EOF ends the stream; Ctrl-C cancels.
async fn scan(ctx: &Context, add: bool) -> CommandResult {
    let detector = TextBarcodeDetector::default();
    if !Capabilities::probe(&detector, &ctx.config.scanner).barcode_detection {
        return Err(CaptureError::Unsupported.into());
    }

    let (camera, feed) = WedgeCamera::new();
    let mut scanner = Scanner::from_config(camera, detector, &ctx.config.scanner);
    let cancel = CancelFlag::new();

    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    // A plain thread: a blocking stdin read must not hold up runtime shutdown.
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if feed.is_closed() {
                break;
            }
            let Ok(line) = line else { break };
            feed.submit(line);
        }
    });

    eprintln!("Point your scanner at a book's barcode.");
    let outcome = scanner
        .run(&cancel, |event| {
            if let ScanEvent::TransientError(e) = event {
                eprintln!("{}", e);
            }
        })
        .await?;

    let code = match outcome {
        ScanOutcome::Detected(code) => code,
        ScanOutcome::Cancelled => return Err(CommandError::Cancelled.into()),
        ScanOutcome::StreamEnded => return Err(CommandError::NoBarcode.into()),
    };
    eprintln!("Scanned {}", code.raw_value);
    lookup(ctx, &code.raw_value, add, false).await
}

fn list(ctx: &Context) -> CommandResult {
    let collection = ctx.collection();
    if collection.is_empty() {
        println!("Your library is empty");
        return Ok(());
    }
    println!("{}", library_table(collection.books()));
    Ok(())
}

fn sources(ctx: &Context) -> CommandResult {
    let lookup = Lookup::from_config(&ctx.config)?;
    println!("{}", sources_table(&lookup.sources()));
    Ok(())
}

fn show(ctx: &Context, id: &str, json: bool) -> CommandResult {
    let collection = ctx.collection();
    let book = collection
        .get(id)
        .ok_or_else(|| CommandError::NotInLibrary(id.to_string()))?;
    print_book(book, json)?;
    if !json {
        println!("{:<11}{}", "Status", book.status.display_name());
    }
    Ok(())
}

fn set_status(ctx: &Context, id: &str, status: BookStatus) -> CommandResult {
    let mut collection = ctx.collection();
    if !collection.set_status(id, status)? {
        return Err(CommandError::NotInLibrary(id.to_string()).into());
    }
    println!("{}: {}", id, status.display_name());
    Ok(())
}

fn remove(ctx: &Context, id: &str) -> CommandResult {
    let mut collection = ctx.collection();
    if !collection.remove(id)? {
        return Err(CommandError::NotInLibrary(id.to_string()).into());
    }
    println!("Removed {}", id);
    Ok(())
}

fn export(ctx: &Context, output: Option<PathBuf>) -> CommandResult {
    let collection = ctx.collection();
    let path = output.unwrap_or_else(|| PathBuf::from(&ctx.config.export.file_name));
    export_to_file(collection.books(), &path)?;
    println!("Exported {} books to {}", collection.len(), path.display());
    Ok(())
}

fn add_to_library(ctx: &Context, book: BookRecord) -> CommandResult {
    let mut collection = ctx.collection();
    let id = book.id.clone();
    if collection.add(book)? {
        println!("Added {} to your library", id);
    } else {
        println!("{} is already in your library", id);
    }
    Ok(())
}

fn print_book(book: &BookRecord, json: bool) -> CommandResult {
    if json {
        println!("{}", serde_json::to_string_pretty(book)?);
        return Ok(());
    }
    println!("{}", book.title);
    println!("{:<11}{}", "Id", book.id);
    for (label, value) in detail_fields(book) {
        println!("{:<11}{}", label, value);
    }
    println!();
    println!("{}", description(book));
    Ok(())
}

fn library_table(books: &[BookRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Id", "Title", "Authors", "Status"]);
    for book in books {
        table.add_row(vec![
            book.id.clone(),
            book.title.clone(),
            book.authors_display(),
            book.status.display_name().to_string(),
        ]);
    }
    table
}

fn sources_table(sources: &[SourceMetadata]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Id", "Name", "Description", "Endpoint", "Key required"]);
    for (i, source) in sources.iter().enumerate() {
        table.add_row(vec![
            (i + 1).to_string(),
            source.id.to_string(),
            source.name.to_string(),
            source.description.to_string(),
            source.base_url.to_string(),
            if source.requires_api_key { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}
