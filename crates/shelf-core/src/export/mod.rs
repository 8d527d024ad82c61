//! CSV export of the collection

use crate::domain::BookRecord;
use crate::error::ExportError;
use std::path::Path;

/// File name offered when the user does not pick one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "library_collection.csv";

/// Column order of the export.
pub const CSV_HEADERS: [&str; 6] = [
    "ISBN",
    "Title",
    "Authors",
    "Publisher",
    "PublishedDate",
    "Status",
];

/// Render books as CSV.
///
/// The header row is bare. Every data field is quote-enclosed with embedded
/// quotes doubled. Authors are joined with `", "`; a missing publisher or
/// date is an empty field.
pub fn to_csv(books: &[BookRecord]) -> Result<String, ExportError> {
    let mut header = csv_writer(Vec::new(), csv::QuoteStyle::Necessary);
    header.write_record(CSV_HEADERS)?;

    let mut writer = csv_writer(header.into_inner()?, csv::QuoteStyle::Always);
    for book in books {
        writer.write_record([
            book.isbn.as_str(),
            book.title.as_str(),
            book.authors_display().as_str(),
            book.publisher.as_deref().unwrap_or(""),
            book.published_date.as_deref().unwrap_or(""),
            book.status.as_str(),
        ])?;
    }

    let bytes = writer.into_inner()?;
    String::from_utf8(bytes)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn csv_writer(buf: Vec<u8>, style: csv::QuoteStyle) -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .quote_style(style)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf)
}

/// Write the CSV document to `path`, creating parent directories.
pub fn export_to_file(books: &[BookRecord], path: &Path) -> Result<(), ExportError> {
    let csv = to_csv(books)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, csv)?;
    tracing::info!(path = %path.display(), count = books.len(), "exported collection");
    Ok(())
}
