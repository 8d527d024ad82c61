//! Single dismissible error message.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct ErrorBanner<'a> {
    message: &'a str,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }

    /// Rows needed to show the message at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2).max(1) as usize;
        let lines = self.message.chars().count().div_ceil(inner).max(1);
        (lines as u16).saturating_add(2)
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(Line::from(vec![
                Span::styled(" Error ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                Span::styled("(x to dismiss) ", Style::default().fg(Color::DarkGray)),
            ]));

        Paragraph::new(self.message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}
