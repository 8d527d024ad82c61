//! Keybinding definitions

use crossterm::event::KeyCode;

/// Keybinding action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application
    Quit,
    /// Toggle help
    ToggleHelp,
    /// Switch between Find Book and My Library
    NextTab,
    /// Close the topmost thing: error, detail, overlay
    Cancel,
    /// Leave the detail view
    Back,
    /// Dismiss the error banner
    DismissError,
    /// Move up in list
    MoveUp,
    /// Move down in list
    MoveDown,
    /// Open / confirm
    Select,
    /// Focus the ISBN field
    EditIsbn,
    /// Open the barcode scanner
    Scan,
    /// Add the shown book to the library
    Add,
    /// Remove a book from the library
    Remove,
    /// Check out / return
    ToggleStatus,
    /// Write the library to CSV
    Export,
}

/// Get the action for a key in normal mode
pub fn normal_mode_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Tab | KeyCode::BackTab => Some(Action::NextTab),
        KeyCode::Char('j') | KeyCode::Down => Some(Action::MoveDown),
        KeyCode::Char('k') | KeyCode::Up => Some(Action::MoveUp),
        KeyCode::Char('b') => Some(Action::Back),
        KeyCode::Char('x') => Some(Action::DismissError),
        KeyCode::Char('i') | KeyCode::Char('/') => Some(Action::EditIsbn),
        KeyCode::Char('s') => Some(Action::Scan),
        KeyCode::Char('a') => Some(Action::Add),
        KeyCode::Char('r') | KeyCode::Char('d') => Some(Action::Remove),
        KeyCode::Char('c') => Some(Action::ToggleStatus),
        KeyCode::Char('e') => Some(Action::Export),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}

/// Characters that start ISBN entry when typed on the Find Book tab.
pub fn starts_isbn_entry(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == 'X' || c == '-' => Some(c),
        _ => None,
    }
}
