//! My Library tab

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use shelf_core::BookRecord;

use super::detail_view::status_span;

/// Library view state
#[derive(Debug, Default)]
pub struct LibraryView {
    /// Currently selected row
    pub selected: usize,
}

impl LibraryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    pub fn prev(&mut self, count: usize) {
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    /// Keep the selection in range after the list shrank.
    pub fn clamp(&mut self, count: usize) {
        self.selected = self.selected.min(count.saturating_sub(1));
    }

    pub fn selected_book<'a>(&self, books: &'a [BookRecord]) -> Option<&'a BookRecord> {
        books.get(self.selected)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, books: &[BookRecord]) {
        let block = Block::default()
            .title(format!("My Library ({})", books.len()))
            .borders(Borders::ALL);

        if books.is_empty() {
            let empty = Paragraph::new(vec![
                Line::from("Your library is empty"),
                Line::from(""),
                Line::from("Find a book and press a to add it."),
            ])
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(["Title", "Authors", "Status"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = books
            .iter()
            .map(|book| {
                Row::new(vec![
                    Cell::from(book.title.clone()),
                    Cell::from(book.authors_display()),
                    Cell::from(status_span(book.status)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(50),
                Constraint::Percentage(35),
                Constraint::Percentage(15),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }
}
