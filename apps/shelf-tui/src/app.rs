//! Application state and main render loop

use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

use shelf_core::{
    export_to_file, BookRecord, CancelFlag, Capabilities, CaptureError, Collection, Config,
    FileStorage, Lookup, LookupError, ScanEvent, ScanOutcome, ScanState, Scanner, SlotStorage,
    TextBarcodeDetector, WedgeCamera, WedgeFeed,
};

use crate::keybindings::{normal_mode_action, starts_isbn_entry, Action};
use crate::mode::Mode;
use crate::views::{DetailView, LibraryView, ScannerView, SearchView, Tab};
use crate::widgets::{ErrorBanner, ModeIndicator};

/// Results delivered from background tasks
#[derive(Debug)]
pub enum AppEvent {
    LookupFinished(Result<BookRecord, LookupError>),
    Scan {
        session: u64,
        event: ScanEvent,
    },
    ScanFinished {
        session: u64,
        result: Result<ScanOutcome, CaptureError>,
    },
}

/// A scan in progress. Dropping it drops the feed, which ends the stream.
struct ScanSession {
    id: u64,
    feed: WedgeFeed,
    cancel: CancelFlag,
    state: ScanState,
    /// Characters typed since the last Enter
    pending: String,
    last_error: Option<String>,
}

/// Main application state
pub struct App<S: SlotStorage = FileStorage> {
    /// Current mode (NORMAL, INSERT, SCAN)
    pub mode: Mode,
    pub tab: Tab,
    /// ISBN field contents
    pub isbn_input: String,
    /// A lookup is outstanding
    pub searching: bool,
    /// Record shown in the detail view
    pub selected: Option<BookRecord>,
    /// The one dismissible error message
    pub error: Option<String>,
    /// Status message
    pub status_message: Option<String>,
    /// Whether to show the help overlay
    pub show_help: bool,
    pub library_view: LibraryView,
    config: Config,
    collection: Collection<S>,
    lookup: Arc<Lookup>,
    capabilities: Capabilities,
    runtime: Handle,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    scan: Option<ScanSession>,
    next_scan_id: u64,
}

impl<S: SlotStorage> App<S> {
    /// Create a new application instance. Background work is spawned on
    /// `runtime`.
    pub fn new(config: Config, collection: Collection<S>, lookup: Lookup, runtime: Handle) -> Self {
        let capabilities = Capabilities::probe(&TextBarcodeDetector::default(), &config.scanner);
        debug!(?capabilities, "scanner capabilities");
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            mode: Mode::Normal,
            tab: Tab::Find,
            isbn_input: String::new(),
            searching: false,
            selected: None,
            error: None,
            status_message: None,
            show_help: false,
            library_view: LibraryView::new(),
            config,
            collection,
            lookup: Arc::new(lookup),
            capabilities,
            runtime,
            events_tx,
            events_rx,
            scan: None,
            next_scan_id: 0,
        }
    }

    pub fn collection(&self) -> &Collection<S> {
        &self.collection
    }

    /// Apply every result that background tasks have delivered so far.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Stop any running scan before exit.
    pub fn shutdown(&mut self) {
        if let Some(scan) = self.scan.take() {
            scan.cancel.cancel();
        }
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LookupFinished(result) => {
                self.searching = false;
                match result {
                    Ok(book) => {
                        self.status_message = None;
                        self.selected = Some(book);
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
            AppEvent::Scan { session, event } => {
                let Some(scan) = self.scan.as_mut().filter(|s| s.id == session) else {
                    return;
                };
                match event {
                    ScanEvent::State(state) => scan.state = state,
                    ScanEvent::TransientError(e) => scan.last_error = Some(e.to_string()),
                }
            }
            AppEvent::ScanFinished { session, result } => {
                // A cancelled session was already torn down
                if self.scan.as_ref().map(|s| s.id) != Some(session) {
                    return;
                }
                self.scan = None;
                self.mode = Mode::Normal;
                match result {
                    Ok(ScanOutcome::Detected(code)) => {
                        info!(value = %code.raw_value, "looking up scanned code");
                        self.isbn_input = code.raw_value;
                        self.search();
                    }
                    Ok(ScanOutcome::Cancelled) => {
                        self.status_message = Some("Scan cancelled".to_string());
                    }
                    Ok(ScanOutcome::StreamEnded) => {
                        self.status_message = Some("Scanner stopped".to_string());
                    }
                    Err(e) => self.error = Some(e.to_string()),
                }
            }
        }
    }

    /// Render the application
    pub fn render(&self, frame: &mut Frame) {
        let size = frame.area();

        let banner_height = self
            .error
            .as_deref()
            .map(|msg| ErrorBanner::new(msg).height(size.width))
            .unwrap_or(0);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Tabs
                Constraint::Length(banner_height), // Error banner
                Constraint::Min(0),                // Main content
                Constraint::Length(1),             // Status bar
            ])
            .split(size);

        self.render_tabs(frame, chunks[0]);
        if let Some(msg) = &self.error {
            frame.render_widget(ErrorBanner::new(msg), chunks[1]);
        }
        self.render_main_view(frame, chunks[2]);
        self.render_status_bar(frame, chunks[3]);

        if let Some(scan) = &self.scan {
            let view = ScannerView {
                state: scan.state,
                pending: &scan.pending,
                last_error: scan.last_error.as_deref(),
            };
            view.render(frame, centered_rect(60, 40, size));
        }

        // Help overlay if shown
        if self.show_help {
            self.render_help_overlay(frame, size);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = [Tab::Find, Tab::Library].map(|t| t.title(self.collection.len()));
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .block(Block::default().title("shelf").borders(Borders::ALL))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_main_view(&self, frame: &mut Frame, area: Rect) {
        if let Some(book) = &self.selected {
            let view = DetailView {
                book,
                owned: self.collection.get(&book.id),
            };
            view.render(frame, area);
            return;
        }

        match self.tab {
            Tab::Find => {
                let view = SearchView {
                    input: &self.isbn_input,
                    editing: self.mode == Mode::Insert,
                    searching: self.searching,
                    scanning_supported: self.capabilities.barcode_detection,
                };
                view.render(frame, area);
            }
            Tab::Library => {
                self.library_view
                    .render(frame, area, self.collection.books());
            }
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hint = self.status_message.clone().unwrap_or_else(|| {
            match (self.mode, self.tab) {
                (Mode::Insert, _) => "Enter search | Esc done".to_string(),
                (Mode::Scanning, _) => "Esc cancel scan".to_string(),
                (Mode::Normal, Tab::Library) => {
                    "j/k move | Enter open | c check out/return | d remove | e export | ? help"
                        .to_string()
                }
                (Mode::Normal, Tab::Find) => "Tab switch | ? help | q quit".to_string(),
            }
        });

        let line = Line::from(vec![
            ModeIndicator::new(self.mode).as_span(),
            Span::raw(" "),
            Span::raw(hint),
        ]);
        let status_bar = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status_bar, area);
    }

    fn render_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let help_text = r#"
shelf - Help

Tabs:
  Tab     - Switch between Find Book and My Library

Find Book:
  0-9 / i - Type an ISBN (Enter searches, Esc stops editing)
  s       - Scan a barcode (Esc cancels)

Book detail:
  a       - Add to library
  r       - Remove from library
  c       - Check out / return
  Esc / b - Back

My Library:
  j/k     - Move up/down
  Enter   - Show detail
  c       - Check out / return
  d       - Remove
  e       - Export CSV

Other:
  x       - Dismiss error
  ?       - Toggle this help
  q       - Quit
"#;

        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        let help_area = centered_rect(60, 80, area);
        frame.render_widget(Clear, help_area);
        let paragraph = Paragraph::new(help_text).block(block);
        frame.render_widget(paragraph, help_area);
    }

    /// Handle a key press, returns true if app should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            self.shutdown();
            return true;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(code),
            Mode::Insert => self.handle_insert_key(code),
            Mode::Scanning => self.handle_scanning_key(code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) -> bool {
        if self.show_help && matches!(code, KeyCode::Esc | KeyCode::Char('?')) {
            self.show_help = false;
            return false;
        }

        if self.tab == Tab::Find && self.selected.is_none() {
            if let Some(c) = starts_isbn_entry(code) {
                self.mode = Mode::Insert;
                self.isbn_input.push(c);
                return false;
            }
        }

        let Some(action) = normal_mode_action(code) else {
            return false;
        };

        match action {
            Action::Quit => return true,
            Action::ToggleHelp => self.show_help = !self.show_help,
            Action::NextTab => self.switch_tab(self.tab.next()),
            Action::DismissError => self.error = None,
            Action::Cancel => {
                if self.error.is_some() {
                    self.error = None;
                } else {
                    self.selected = None;
                }
            }
            Action::Back => self.selected = None,
            Action::MoveDown => {
                if self.in_library_list() {
                    self.library_view.next(self.collection.len());
                }
            }
            Action::MoveUp => {
                if self.in_library_list() {
                    self.library_view.prev(self.collection.len());
                }
            }
            Action::Select if self.selected.is_none() => match self.tab {
                Tab::Find => self.search(),
                Tab::Library => {
                    self.selected = self
                        .library_view
                        .selected_book(self.collection.books())
                        .cloned();
                }
            },
            Action::Select => {}
            Action::EditIsbn => {
                if self.tab == Tab::Find && self.selected.is_none() {
                    self.mode = Mode::Insert;
                }
            }
            Action::Scan => {
                if self.tab == Tab::Find && self.selected.is_none() {
                    self.start_scan();
                }
            }
            Action::Add => self.add_selected(),
            Action::Remove => {
                if let Some(id) = self.target_id() {
                    self.remove_book(&id);
                }
            }
            Action::ToggleStatus => {
                if let Some(id) = self.target_id() {
                    self.toggle_status(&id);
                }
            }
            Action::Export => {
                if self.tab == Tab::Library && self.selected.is_none() {
                    self.export();
                }
            }
        }
        false
    }

    fn handle_insert_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.search();
            }
            KeyCode::Backspace => {
                self.isbn_input.pop();
            }
            KeyCode::Char(c) => self.isbn_input.push(c),
            _ => {}
        }
        false
    }

    fn handle_scanning_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Esc => self.cancel_scan(),
            KeyCode::Enter => {
                if let Some(scan) = self.scan.as_mut() {
                    let line = std::mem::take(&mut scan.pending);
                    scan.feed.submit(line);
                }
            }
            KeyCode::Backspace => {
                if let Some(scan) = self.scan.as_mut() {
                    scan.pending.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(scan) = self.scan.as_mut() {
                    scan.pending.push(c);
                }
            }
            _ => {}
        }
        false
    }

    fn in_library_list(&self) -> bool {
        self.tab == Tab::Library && self.selected.is_none()
    }

    /// Book a library action applies to: the open detail record if it is in
    /// the library, otherwise the highlighted library row.
    fn target_id(&self) -> Option<String> {
        match &self.selected {
            Some(book) => book.is_in(self.collection.books()).then(|| book.id.clone()),
            None if self.tab == Tab::Library => self
                .library_view
                .selected_book(self.collection.books())
                .map(|b| b.id.clone()),
            None => None,
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.selected = None;
        self.error = None;
        self.status_message = None;
    }

    /// Start a lookup for the ISBN field. Ignored while one is outstanding.
    pub fn search(&mut self) {
        if self.searching {
            return;
        }
        self.selected = None;
        self.error = None;
        self.status_message = None;
        self.searching = true;

        let lookup = Arc::clone(&self.lookup);
        let tx = self.events_tx.clone();
        let query = self.isbn_input.clone();
        self.runtime.spawn(async move {
            let result = lookup.find_by_isbn(&query).await;
            let _ = tx.send(AppEvent::LookupFinished(result));
        });
    }

    fn start_scan(&mut self) {
        if !self.capabilities.barcode_detection {
            self.error = Some(CaptureError::Unsupported.to_string());
            return;
        }
        if self.searching || self.scan.is_some() {
            return;
        }
        self.error = None;
        self.status_message = None;

        let (camera, feed) = WedgeCamera::new();
        let detector = TextBarcodeDetector::new(self.capabilities.formats.clone());
        let mut scanner = Scanner::from_config(camera, detector, &self.config.scanner);
        let cancel = CancelFlag::new();

        self.next_scan_id += 1;
        let session = self.next_scan_id;
        let tx = self.events_tx.clone();
        let task_cancel = cancel.clone();
        self.runtime.spawn(async move {
            let events = tx.clone();
            let result = scanner
                .run(&task_cancel, move |event| {
                    let _ = events.send(AppEvent::Scan { session, event });
                })
                .await;
            let _ = tx.send(AppEvent::ScanFinished { session, result });
        });

        self.scan = Some(ScanSession {
            id: session,
            feed,
            cancel,
            state: ScanState::Idle,
            pending: String::new(),
            last_error: None,
        });
        self.mode = Mode::Scanning;
    }

    fn cancel_scan(&mut self) {
        if let Some(scan) = self.scan.take() {
            scan.cancel.cancel();
            self.status_message = Some("Scan cancelled".to_string());
        }
        self.mode = Mode::Normal;
    }

    fn add_selected(&mut self) {
        let Some(book) = self.selected.clone() else {
            return;
        };
        match self.collection.add(book) {
            Ok(true) => self.status_message = Some("Added to your library".to_string()),
            Ok(false) => self.status_message = Some("Already in your library".to_string()),
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn remove_book(&mut self, id: &str) {
        match self.collection.remove(id) {
            Ok(true) => {
                self.library_view.clamp(self.collection.len());
                self.status_message = Some("Removed from your library".to_string());
            }
            Ok(false) => {}
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn toggle_status(&mut self, id: &str) {
        match self.collection.toggle_status(id) {
            Ok(Some(status)) => {
                self.status_message = Some(format!("Marked as {}", status.display_name()));
            }
            Ok(None) => {}
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    fn export(&mut self) {
        let path = PathBuf::from(&self.config.export.file_name);
        match export_to_file(self.collection.books(), &path) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Exported {} books to {}",
                    self.collection.len(),
                    path.display()
                ));
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
