//! Find Book tab: ISBN entry and the scan affordance.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct SearchView<'a> {
    pub input: &'a str,
    pub editing: bool,
    pub searching: bool,
    pub scanning_supported: bool,
}

impl SearchView<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status
                Constraint::Length(1),
                Constraint::Min(0), // Scanner notice and hints
            ])
            .split(area);

        self.render_input(frame, chunks[0]);

        let status = if self.searching {
            Line::from(Span::styled("Searching...", Style::default().fg(Color::Yellow)))
        } else {
            Line::from(Span::styled(
                "Enter an ISBN-10 or ISBN-13 and press Enter",
                Style::default().fg(Color::DarkGray),
            ))
        };
        frame.render_widget(Paragraph::new(status), chunks[1]);

        let scan_line = if self.scanning_supported {
            Line::from(vec![
                Span::styled("s", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw("  Scan barcode"),
            ])
        } else {
            Line::from(Span::styled(
                "Barcode scanning is not supported here. Use manual ISBN entry instead.",
                Style::default().fg(Color::DarkGray),
            ))
        };
        let hints = vec![
            scan_line,
            Line::from(vec![
                Span::styled("i", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw("  Edit ISBN"),
            ]),
            Line::from(vec![
                Span::styled("Tab", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                Span::raw("  My Library"),
            ]),
        ];
        frame.render_widget(Paragraph::new(hints).wrap(Wrap { trim: true }), chunks[3]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let border = if self.editing {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        let block = Block::default()
            .title("ISBN")
            .borders(Borders::ALL)
            .border_style(border);

        let text = if self.input.is_empty() && !self.editing {
            Span::styled("e.g. 978-0-13-468599-1", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(self.input)
        };
        frame.render_widget(Paragraph::new(Line::from(text)).block(block), area);

        if self.editing {
            let x = area.x + 1 + self.input.chars().count() as u16;
            frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }
}
