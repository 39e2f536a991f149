use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppMode, DialogKind, Focus};
use crate::browser::EntryKind;
use crate::launcher::LaunchAction;

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode.clone() {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Dialog(DialogKind::Error { .. }) => app.close_dialog(),
        AppMode::Dialog(DialogKind::DeleteConfirm { .. }) => handle_confirm(app, key),
        AppMode::Dialog(_) => handle_input(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),

        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),
        KeyCode::Char('h') | KeyCode::Left if app.focus == Focus::Tree => app.select_parent(),
        KeyCode::Char('l') | KeyCode::Right if app.focus == Focus::Tree => app.expand_selected(),
        KeyCode::Enter => match app.focus {
            Focus::Tree => app.expand_selected(),
            Focus::Table => app.activate_table_row(),
        },

        KeyCode::Char('o') => app.launch(LaunchAction::Open),
        KeyCode::Char('e') => app.pending_edit = true,
        KeyCode::Char('p') => app.launch(LaunchAction::Print),

        KeyCode::Char('n') => app.request_create(EntryKind::File),
        KeyCode::Char('N') => app.request_create(EntryKind::Directory),
        KeyCode::Char('r') | KeyCode::F(2) => app.request_rename(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('c') => app.duplicate(),

        KeyCode::Char('s') => app.cycle_sort_column(),
        KeyCode::Char('S') => app.toggle_sort_direction(),
        KeyCode::Char('0') => app.clear_sort(),
        _ => {}
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.confirm_dialog(),
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Backspace => app.dialog_delete_char(),
        KeyCode::Left => app.dialog_move_cursor_left(),
        KeyCode::Right => app.dialog_move_cursor_right(),
        KeyCode::Home => app.dialog_cursor_home(),
        KeyCode::End => app.dialog_cursor_end(),
        KeyCode::Char(c) => app.dialog_input_char(c),
        _ => {}
    }
}
