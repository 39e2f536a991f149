use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Cell, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::components::format::cell_text;
use crate::fs::table::{Column, ListingTable, SortDirection};
use crate::presentation::PresentationProvider;

fn column_width(column: Column) -> Constraint {
    match column {
        Column::Icon => Constraint::Length(4),
        Column::DisplayName => Constraint::Fill(2),
        Column::Path => Constraint::Fill(3),
        Column::Size => Constraint::Length(10),
        Column::LastModified => Constraint::Length(16),
        Column::Readable
        | Column::Writable
        | Column::Executable
        | Column::IsDirectory
        | Column::IsFile => Constraint::Length(2),
    }
}

/// Header text for `column`, with an arrow when the view is sorted by it.
pub fn header_title(column: Column, sort: Option<(Column, SortDirection)>) -> String {
    match sort {
        Some((sorted, SortDirection::Ascending)) if sorted == column => {
            format!("{}▲", column.title())
        }
        Some((sorted, SortDirection::Descending)) if sorted == column => {
            format!("{}▼", column.title())
        }
        _ => column.title().to_string(),
    }
}

/// Renders the listing table in view order.
pub struct ListingTableWidget<'a> {
    table: &'a ListingTable,
    presentation: &'a dyn PresentationProvider,
    focused: bool,
    block: Option<Block<'a>>,
}

impl<'a> ListingTableWidget<'a> {
    pub fn new(table: &'a ListingTable, presentation: &'a dyn PresentationProvider) -> Self {
        Self {
            table,
            presentation,
            focused: false,
            block: None,
        }
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for ListingTableWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sort = self.table.sort();
        let header = Row::new(
            Column::ALL
                .iter()
                .map(|&c| Cell::from(header_title(c, sort))),
        )
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };

        // Only rows in the window get cells built; the header takes one line.
        let body_height = inner.height.saturating_sub(1) as usize;
        let view_rows = self.table.view_rows();
        let selected = self.table.selected_view_row();
        let offset = selected
            .map(|s| (s + 1).saturating_sub(body_height))
            .unwrap_or(0)
            .min(view_rows.len());
        let window = &view_rows[offset..(offset + body_height).min(view_rows.len())];

        let rows = window.iter().map(|&model_row| {
            Row::new(Column::ALL.iter().map(|&column| {
                let text = self
                    .table
                    .cell(model_row, column, self.presentation)
                    .map(|value| cell_text(&value))
                    .unwrap_or_default();
                Cell::from(text)
            }))
        });

        let highlight = if self.focused {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED)
        };

        let widget = Table::new(rows, Column::ALL.map(column_width))
            .header(header)
            .column_spacing(1)
            .row_highlight_style(highlight);

        let mut state =
            TableState::default().with_selected(selected.and_then(|s| s.checked_sub(offset)));
        StatefulWidget::render(widget, inner, buf, &mut state);
    }
}
