//! Scanner overlay

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use shelf_core::ScanState;

pub struct ScannerView<'a> {
    pub state: ScanState,
    /// Text typed since the last submitted line
    pub pending: &'a str,
    /// Most recent transient detection failure
    pub last_error: Option<&'a str>,
}

impl ScannerView<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let status = match self.state {
            ScanState::Idle => "Stopping...",
            ScanState::RequestingCamera => "Opening scanner...",
            ScanState::Scanning => "Scanning",
        };

        let mut lines = vec![
            Line::from(Span::styled(
                "Point your scanner at a book's barcode.",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Status: "),
                Span::styled(status, Style::default().fg(Color::Cyan)),
            ]),
            Line::from(vec![Span::raw("> "), Span::raw(self.pending)]),
        ];
        if let Some(err) = self.last_error {
            lines.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Yellow),
            )));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter submits a code | Esc cancels",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .title("Scan Barcode")
            .borders(Borders::ALL)
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
            area,
        );
    }
}
