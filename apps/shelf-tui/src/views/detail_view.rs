//! Book detail view

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use shelf_core::{BookRecord, BookStatus, CoverSize};

const NO_DESCRIPTION: &str = "No description available.";

/// Labelled metadata rows for a record, in display order. Absent optional
/// fields are left out.
pub fn detail_fields(book: &BookRecord) -> Vec<(&'static str, String)> {
    let mut fields = vec![("Authors", book.authors_display())];
    if let Some(publisher) = &book.publisher {
        fields.push(("Publisher", publisher.clone()));
    }
    if let Some(date) = &book.published_date {
        fields.push(("Published", date.clone()));
    }
    if let Some(categories) = book.categories.as_ref().filter(|c| !c.is_empty()) {
        fields.push(("Categories", categories.join(", ")));
    }
    if let Some(pages) = book.page_count {
        fields.push(("Pages", pages.to_string()));
    }
    fields.push(("ISBN", book.isbn.clone()));
    fields.push(("Cover", book.cover_url(CoverSize::Large)));
    fields
}

/// Description text, or the fallback when the source had none.
pub fn description(book: &BookRecord) -> &str {
    book.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION)
}

pub struct DetailView<'a> {
    pub book: &'a BookRecord,
    /// The library's copy of the record, when it is in the library
    pub owned: Option<&'a BookRecord>,
}

impl DetailView<'_> {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.book.title.as_str())
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(detail_fields(self.book).len() as u16 + 1),
                Constraint::Min(3),    // Description
                Constraint::Length(1), // Actions
            ])
            .split(inner);

        let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let mut lines: Vec<Line> = detail_fields(self.book)
            .into_iter()
            .map(|(name, value)| {
                Line::from(vec![Span::styled(format!("{:<11}", name), label), Span::raw(value)])
            })
            .collect();
        if let Some(owned) = self.owned {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<11}", "Status"), label),
                status_span(owned.status),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), chunks[0]);

        let description = Paragraph::new(description(self.book))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Description").borders(Borders::TOP));
        frame.render_widget(description, chunks[1]);

        let actions = match self.owned {
            Some(owned) => format!(
                "r Remove from Library | c {} | Esc Back",
                owned.status.action_label()
            ),
            None => "a Add to Library | Esc Back".to_string(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(actions, Style::default().fg(Color::DarkGray))),
            chunks[2],
        );
    }
}

pub fn status_span(status: BookStatus) -> Span<'static> {
    let color = match status {
        BookStatus::Available => Color::Green,
        BookStatus::CheckedOut => Color::Yellow,
    };
    Span::styled(status.display_name(), Style::default().fg(color))
}
