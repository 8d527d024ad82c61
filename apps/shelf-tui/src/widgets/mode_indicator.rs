//! Mode indicator shown at the left of the status bar.

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use crate::mode::Mode;

/// Displays the current interaction mode with color coding:
/// - Normal: Blue
/// - Insert: Green
/// - Scanning: Magenta
pub struct ModeIndicator {
    mode: Mode,
}

impl ModeIndicator {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode_color(mode: Mode) -> Color {
        match mode {
            Mode::Normal => Color::Blue,
            Mode::Insert => Color::Green,
            Mode::Scanning => Color::Magenta,
        }
    }

    fn style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(Self::mode_color(self.mode))
            .add_modifier(Modifier::BOLD)
    }

    /// Render as a styled span (for embedding in other widgets).
    pub fn as_span(&self) -> Span<'static> {
        Span::styled(format!("[{}]", self.mode.short_code()), self.style())
    }
}
