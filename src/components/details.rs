use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::components::format::{format_flag, format_size, format_time};
use crate::fs::entry::PathEntry;
use crate::presentation::PresentationProvider;

/// Attributes of the current selection, one per line.
pub struct DetailsWidget<'a> {
    entry: Option<&'a PathEntry>,
    presentation: &'a dyn PresentationProvider,
    block: Option<Block<'a>>,
}

impl<'a> DetailsWidget<'a> {
    pub fn new(entry: Option<&'a PathEntry>, presentation: &'a dyn PresentationProvider) -> Self {
        Self {
            entry,
            presentation,
            block: None,
        }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<10}", label),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn permissions(entry: &PathEntry) -> String {
    let bit = |set: bool, c: char| if set { c } else { '-' };
    [
        bit(entry.can_read, 'r'),
        bit(entry.can_write, 'w'),
        bit(entry.can_execute, 'x'),
    ]
    .iter()
    .collect()
}

impl<'a> Widget for DetailsWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(entry) = self.entry else {
            let line = Line::from(Span::styled(
                "Nothing selected",
                Style::default().fg(Color::DarkGray),
            ));
            buf.set_line(inner.x, inner.y, &line, inner.width);
            return;
        };

        let kind = if entry.is_directory {
            "Directory"
        } else if entry.is_regular_file {
            "File"
        } else {
            "Other"
        };

        let name = format!(
            "{}{}",
            self.presentation.icon_for_entry(entry).glyph(),
            self.presentation.display_name_for(&entry.path)
        );
        let lines = [
            field("Name", name),
            field("Path", entry.path.display().to_string()),
            field("Type", kind.to_string()),
            field("Size", format_size(entry.size_bytes)),
            field("Modified", format_time(entry.last_modified)),
            field("Access", permissions(entry)),
            field("Hidden", format_flag(entry.is_hidden()).to_string()),
        ];

        for (i, line) in lines.iter().take(inner.height as usize).enumerate() {
            buf.set_line(inner.x, inner.y + i as u16, line, inner.width);
        }
    }
}
