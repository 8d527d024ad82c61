//! TUI views

mod detail_view;
mod library_view;
mod scanner_view;
mod search_view;

pub use detail_view::{description, detail_fields, DetailView};
pub use library_view::LibraryView;
pub use scanner_view::ScannerView;
pub use search_view::SearchView;

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Find,
    Library,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Find => Tab::Library,
            Tab::Library => Tab::Find,
        }
    }

    /// Tab label; the library tab carries the book count.
    pub fn title(self, library_len: usize) -> String {
        match self {
            Tab::Find => "Find Book".to_string(),
            Tab::Library => format!("My Library ({})", library_len),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Find => 0,
            Tab::Library => 1,
        }
    }
}
