use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use std::path::Path;

use crate::app::{AppMode, DialogKind, DialogState};

/// Dialog widget that renders a centered modal overlay.
pub struct DialogWidget<'a> {
    mode: &'a AppMode,
    dialog_state: &'a DialogState,
}

impl<'a> DialogWidget<'a> {
    pub fn new(mode: &'a AppMode, dialog_state: &'a DialogState) -> Self {
        Self { mode, dialog_state }
    }

    /// Calculate a centered rectangle within the given area.
    fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let w = width.min(area.width);
        let h = height.min(area.height);
        Rect::new(x, y, w, h)
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let kind = match &self.mode {
            AppMode::Dialog(kind) => kind,
            _ => return,
        };

        match kind {
            DialogKind::CreateFile => {
                render_input_dialog("New File", self.dialog_state, area, buf);
            }
            DialogKind::CreateDirectory => {
                render_input_dialog("New Directory", self.dialog_state, area, buf);
            }
            DialogKind::Rename { .. } => {
                render_input_dialog("Rename", self.dialog_state, area, buf);
            }
            DialogKind::DeleteConfirm {
                target,
                is_directory,
            } => {
                render_confirm_dialog(target, *is_directory, area, buf);
            }
            DialogKind::Error { title, message } => {
                render_error_dialog(title, message, area, buf);
            }
        }
    }
}

fn render_input_dialog(title: &str, state: &DialogState, area: Rect, buf: &mut Buffer) {
    let dialog_width = 50.min(area.width.saturating_sub(4));
    let dialog_height = 5;
    let rect = DialogWidget::centered_rect(dialog_width, dialog_height, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    // `cursor_position` is a byte offset on a char boundary.
    let input = &state.input;
    let cursor_pos = state.cursor_position.min(input.len());
    let (before, rest) = input.split_at(cursor_pos);
    let (cursor_char, after) = match rest.chars().next() {
        Some(c) => rest.split_at(c.len_utf8()),
        None => (" ", ""),
    };

    // Keep the cursor in view by dropping characters from the left.
    let max_width = inner.width as usize;
    let before_len = before.chars().count();
    let before_display: String = if before_len + 1 > max_width {
        before
            .chars()
            .skip(before_len + 1 - max_width)
            .collect()
    } else {
        before.to_string()
    };

    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .bg(Color::White)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD);

    let line = Line::from(vec![
        Span::styled(before_display, input_style),
        Span::styled(cursor_char, cursor_style),
        Span::styled(after, input_style),
    ]);
    buf.set_line(inner.x, inner.y + inner.height / 2, &line, inner.width);

    render_hint("[Enter] Confirm  [Esc] Cancel", inner, buf);
}

fn render_confirm_dialog(target: &Path, is_directory: bool, area: Rect, buf: &mut Buffer) {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| target.to_string_lossy().to_string());
    let kind = if is_directory { "directory" } else { "file" };

    let dialog_width = (name.chars().count() as u16 + 10)
        .max(40)
        .min(area.width.saturating_sub(4));
    let dialog_height = 6;
    let rect = DialogWidget::centered_rect(dialog_width, dialog_height, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(" Delete ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let header = Line::from(Span::styled(
        format!("Delete this {}?", kind),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ));
    buf.set_line(inner.x, inner.y, &header, inner.width);

    if inner.height > 2 {
        let line = Line::from(Span::styled(
            format!("  • {}", name),
            Style::default().fg(Color::White),
        ));
        buf.set_line(inner.x, inner.y + 1, &line, inner.width);
    }

    render_hint("[y] Yes  [n/Esc] Cancel", inner, buf);
}

fn render_error_dialog(title: &str, message: &str, area: Rect, buf: &mut Buffer) {
    let text_width = message.chars().count().max(title.chars().count()) as u16;
    let dialog_width = (text_width + 6).max(30).min(area.width.saturating_sub(4));
    let dialog_height = 5;
    let rect = DialogWidget::centered_rect(dialog_width, dialog_height, area);

    Clear.render(rect, buf);

    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .padding(Padding::horizontal(1));

    let inner = block.inner(rect);
    block.render(rect, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let msg_line = Line::from(Span::styled(message, Style::default().fg(Color::Red)));
    buf.set_line(inner.x, inner.y + inner.height / 2, &msg_line, inner.width);

    render_hint("Press any key", inner, buf);
}

fn render_hint(hint: &str, inner: Rect, buf: &mut Buffer) {
    if inner.height < 2 {
        return;
    }
    let hint_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::DIM);
    let hint_line = Line::from(Span::styled(hint, hint_style));
    buf.set_line(inner.x, inner.y + inner.height - 1, &hint_line, inner.width);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_input_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::CreateFile);
        let state = DialogState {
            input: "test.txt".to_string(),
            cursor_position: 8,
        };
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        // Check that the dialog title appears
        let content = buffer_to_string(&buf, area);
        assert!(content.contains("New File"));
        assert!(content.contains("test.txt"));
    }

    #[test]
    fn test_rename_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::Rename {
            original: PathBuf::from("/tmp/old_name.txt"),
        });
        let state = DialogState {
            input: "old_name.txt".to_string(),
            cursor_position: 12,
        };
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Rename"));
        assert!(content.contains("old_name.txt"));
    }

    #[test]
    fn test_confirm_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            target: PathBuf::from("/tmp/file1.txt"),
            is_directory: false,
        });
        let state = DialogState::default();
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Delete this file?"));
        assert!(content.contains("file1.txt"));
    }

    #[test]
    fn test_confirm_dialog_uses_listed_kind() {
        // Nothing exists at this path; the kind comes from the dialog itself.
        let mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            target: PathBuf::from("/nonexistent/fileman/build"),
            is_directory: true,
        });
        let state = DialogState::default();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(&mode, &state).render(area, &mut buf);

        assert!(buffer_to_string(&buf, area).contains("Delete this directory?"));
    }

    #[test]
    fn test_cursor_inside_multibyte_input() {
        let mode = AppMode::Dialog(DialogKind::CreateFile);
        let state = DialogState {
            input: "héllo".to_string(),
            cursor_position: 1,
        };
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(buffer_to_string(&buf, area).contains("héllo"));
    }

    #[test]
    fn test_error_dialog_renders() {
        let mode = AppMode::Dialog(DialogKind::Error {
            title: "Rename Failed".to_string(),
            message: "Permission denied".to_string(),
        });
        let state = DialogState::default();
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Rename Failed"));
        assert!(content.contains("Permission denied"));
    }

    #[test]
    fn test_no_dialog_mode_noop() {
        let mode = AppMode::Normal;
        let state = DialogState::default();
        let widget = DialogWidget::new(&mode, &state);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        // Buffer should be empty (all spaces)
        let content = buffer_to_string(&buf, area);
        assert!(content.trim().is_empty());
    }

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }
}
