use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders},
    Frame,
};

use crate::app::{App, AppMode, Focus};
use crate::components::details::DetailsWidget;
use crate::components::dialog::DialogWidget;
use crate::components::status_bar::StatusBarWidget;
use crate::components::table::{header_title, ListingTableWidget};
use crate::components::tree::TreeWidget;

fn pane(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

/// Render the application UI.
pub fn render(app: &App, frame: &mut Frame) {
    let [main, status] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .areas(frame.area());
    let [tree_area, right] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .areas(main);
    let [table_area, details_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(9)])
        .areas(right);

    let browser = &app.browser;
    let presentation = browser.presentation();

    let tree = TreeWidget::new(browser.tree(), presentation)
        .cursor(app.tree_cursor, app.focus == Focus::Tree)
        .block(pane(" Folders ".to_string(), app.focus == Focus::Tree));
    frame.render_widget(tree, tree_area);

    let table_title = match browser.table().directory() {
        Some(dir) => format!(" {} ", presentation.display_name_for(&dir.path)),
        None => " Contents ".to_string(),
    };
    let table = ListingTableWidget::new(browser.table(), presentation)
        .focused(app.focus == Focus::Table)
        .block(pane(table_title, app.focus == Focus::Table));
    frame.render_widget(table, table_area);

    let details = DetailsWidget::new(browser.current(), presentation)
        .block(pane(" Details ".to_string(), false));
    frame.render_widget(details, details_area);

    let path_str = browser
        .current()
        .map(|e| e.path.display().to_string())
        .unwrap_or_default();
    let sort_label = browser
        .table()
        .sort()
        .map(|(column, direction)| format!(" {} ", header_title(column, Some((column, direction)))));
    let mut status_bar = StatusBarWidget::new(&path_str).busy(browser.is_busy());
    if let Some(label) = &sort_label {
        status_bar = status_bar.sort_label(label);
    }
    if let Some((msg, _)) = &app.status_message {
        status_bar = status_bar.status_message(msg);
    }
    frame.render_widget(status_bar, status);

    if let AppMode::Dialog(_) = app.mode {
        frame.render_widget(DialogWidget::new(&app.mode, &app.dialog_state), frame.area());
    }
}
