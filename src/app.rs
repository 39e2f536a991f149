use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::browser::{Browser, EntryKind, ListingComplete};
use crate::error::OpError;
use crate::fs::table::{Column, SortDirection};
use crate::fs::tree::NodeId;
use crate::launcher::LaunchAction;

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    CreateFile,
    CreateDirectory,
    Rename { original: PathBuf },
    DeleteConfirm { target: PathBuf, is_directory: bool },
    Error { title: String, message: String },
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    Dialog(DialogKind),
}

/// Which pane receives navigation keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Tree,
    Table,
}

/// State for a dialog's text input.
#[derive(Debug, Default)]
pub struct DialogState {
    pub input: String,
    pub cursor_position: usize,
}

/// Main application state.
pub struct App {
    pub browser: Browser,
    pub focus: Focus,
    /// Highlighted tree node.
    pub tree_cursor: Option<NodeId>,
    pub should_quit: bool,
    pub mode: AppMode,
    pub dialog_state: DialogState,
    pub status_message: Option<(String, Instant)>,
    pub confirm_delete: bool,
    /// Set when an edit was requested; the event loop runs it with the
    /// terminal released.
    pub pending_edit: bool,
    /// Path still being opened up in the tree, one expansion at a time.
    reveal_target: Option<PathBuf>,
}

impl App {
    /// Create the app and pick the first filesystem root.
    pub fn new(browser: Browser, confirm_delete: bool) -> Self {
        let mut app = Self {
            browser,
            focus: Focus::Tree,
            tree_cursor: None,
            should_quit: false,
            mode: AppMode::Normal,
            dialog_state: DialogState::default(),
            status_message: None,
            confirm_delete,
            pending_edit: false,
            reveal_target: None,
        };
        if let Some(&first) = app.browser.tree().roots().first() {
            app.pick_tree_node(first);
        }
        app
    }

    /// Feed a finished listing into the browser.
    pub fn handle_listing(&mut self, done: ListingComplete) {
        self.browser.apply_listing(done);
        self.advance_reveal();
    }

    // ── Tree navigation ─────────────────────────────────────────────────────

    /// Visible tree row of the cursor, falling back to the first row when the
    /// cursor node is gone.
    pub fn tree_cursor_row(&self) -> usize {
        let rows = self.browser.tree().visible_rows();
        self.tree_cursor
            .and_then(|id| rows.iter().position(|&(row_id, _)| row_id == id))
            .unwrap_or(0)
    }

    fn pick_tree_node(&mut self, id: NodeId) {
        self.tree_cursor = Some(id);
        self.browser.select_from_tree(id);
    }

    fn pick_tree_row(&mut self, row: usize) {
        let rows = self.browser.tree().visible_rows();
        if let Some(&(id, _)) = rows.get(row.min(rows.len().saturating_sub(1))) {
            self.pick_tree_node(id);
        }
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Tree => self.pick_tree_row(self.tree_cursor_row() + 1),
            Focus::Table => {
                let next = self
                    .browser
                    .table()
                    .selected_view_row()
                    .map(|r| r + 1)
                    .unwrap_or(0);
                self.pick_table_row(next);
            }
        }
    }

    /// Move selection up by one item.
    pub fn select_previous(&mut self) {
        match self.focus {
            Focus::Tree => self.pick_tree_row(self.tree_cursor_row().saturating_sub(1)),
            Focus::Table => {
                let prev = self
                    .browser
                    .table()
                    .selected_view_row()
                    .map(|r| r.saturating_sub(1))
                    .unwrap_or(0);
                self.pick_table_row(prev);
            }
        }
    }

    /// Jump to the first item.
    pub fn select_first(&mut self) {
        match self.focus {
            Focus::Tree => self.pick_tree_row(0),
            Focus::Table => self.pick_table_row(0),
        }
    }

    /// Jump to the last item.
    pub fn select_last(&mut self) {
        match self.focus {
            Focus::Tree => self.pick_tree_row(usize::MAX),
            Focus::Table => {
                let last = self.browser.table().row_count().saturating_sub(1);
                self.pick_table_row(last);
            }
        }
    }

    /// Move the tree cursor to the parent of the current node.
    pub fn select_parent(&mut self) {
        let tree = self.browser.tree();
        let parent = self
            .tree_cursor
            .and_then(|id| tree.parent(id))
            .filter(|&p| p != tree.root());
        if let Some(parent) = parent {
            self.pick_tree_node(parent);
        }
    }

    /// Expand the node under the tree cursor without changing the table.
    pub fn expand_selected(&mut self) {
        if let Some(id) = self.tree_cursor {
            self.browser.expand(id);
        }
    }

    /// Switch focus between tree and table.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tree => Focus::Table,
            Focus::Table => Focus::Tree,
        };
    }

    // ── Table ───────────────────────────────────────────────────────────────

    fn pick_table_row(&mut self, view_row: usize) {
        let len = self.browser.table().row_count();
        if len == 0 {
            return;
        }
        if let Err(e) = self.browser.select_table_view_row(view_row.min(len - 1)) {
            tracing::debug!("{}", e);
        }
    }

    /// Enter on a table row: show a directory in the tree, open a file.
    pub fn activate_table_row(&mut self) {
        let Some(entry) = self.browser.current().cloned() else {
            return;
        };
        if entry.is_directory {
            match self.browser.tree().find_node(&entry.path) {
                Some(id) => {
                    self.pick_tree_node(id);
                    self.focus = Focus::Tree;
                }
                None => self.reveal(&entry.path),
            }
        } else {
            self.launch(LaunchAction::Open);
        }
    }

    /// Sort by the next column, starting from the file name.
    pub fn cycle_sort_column(&mut self) {
        let (column, direction) = match self.browser.table().sort() {
            Some((column, direction)) => (column.next(), direction),
            None => (Column::DisplayName, SortDirection::Ascending),
        };
        self.browser.sort_table(column, direction);
        self.set_status_message(format!("Sorted by {}", column.title()));
    }

    pub fn toggle_sort_direction(&mut self) {
        let (column, direction) = self
            .browser
            .table()
            .sort()
            .unwrap_or((Column::DisplayName, SortDirection::Ascending));
        self.browser.sort_table(column, direction.toggled());
    }

    pub fn clear_sort(&mut self) {
        self.browser.clear_table_sort();
        self.set_status_message("Listing order".to_string());
    }

    // ── Reveal ──────────────────────────────────────────────────────────────

    /// Open up the tree down to `path` and pick it.
    ///
    /// Takes one expansion per level; progress happens as listings arrive.
    pub fn reveal(&mut self, path: &Path) {
        self.reveal_target = Some(path.to_path_buf());
        self.advance_reveal();
    }

    fn advance_reveal(&mut self) {
        let Some(target) = self.reveal_target.clone() else {
            return;
        };
        let tree = self.browser.tree();
        let closest = tree
            .visible_rows()
            .into_iter()
            .filter_map(|(id, _)| tree.get(id).map(|n| (id, n)))
            .filter(|(_, n)| target.starts_with(&n.entry.path))
            .max_by_key(|(_, n)| n.entry.path.components().count())
            .map(|(id, n)| (id, n.entry.path == target, n.children_loaded));

        match closest {
            None => {
                tracing::debug!("{} is under no filesystem root", target.display());
                self.reveal_target = None;
            }
            Some((id, true, _)) | Some((id, false, true)) => {
                self.reveal_target = None;
                self.pick_tree_node(id);
            }
            Some((id, false, false)) => {
                self.browser.expand(id);
            }
        }
    }

    // ── File operations ─────────────────────────────────────────────────────

    fn report(&mut self, err: OpError) {
        tracing::debug!("operation failed: {}", err);
        self.open_dialog(DialogKind::Error {
            title: err.title().to_string(),
            message: err.to_string(),
        });
    }

    pub fn launch(&mut self, action: LaunchAction) {
        match self.browser.launch(action) {
            Ok(()) => self.set_status_message(format!("Sent to {}", action)),
            Err(e) => self.report(e),
        }
    }

    pub fn duplicate(&mut self) {
        match self.browser.duplicate() {
            Ok(outcome) => self.set_status_message(format!("Copied to {}", outcome.to.display())),
            Err(e) => self.report(e),
        }
    }

    /// Start a delete, asking first when configured to.
    pub fn request_delete(&mut self) {
        let Some((target, is_directory)) = self
            .browser
            .current()
            .map(|e| (e.path.clone(), e.is_directory))
        else {
            self.report(OpError::NoSelection);
            return;
        };
        if self.confirm_delete {
            self.open_dialog(DialogKind::DeleteConfirm {
                target,
                is_directory,
            });
        } else {
            self.delete();
        }
    }

    fn delete(&mut self) {
        match self.browser.delete() {
            Ok(outcome) => {
                self.set_status_message(format!("Deleted {}", outcome.path.display()))
            }
            Err(e) => self.report(e),
        }
    }

    /// Open the rename dialog for the current file.
    pub fn request_rename(&mut self) {
        match self.browser.current().map(|e| e.path.clone()) {
            Some(original) => self.open_dialog(DialogKind::Rename { original }),
            None => self.report(OpError::NoSelection),
        }
    }

    pub fn request_create(&mut self, kind: EntryKind) {
        if self.browser.current().is_none() {
            self.report(OpError::NoSelection);
            return;
        }
        self.open_dialog(match kind {
            EntryKind::File => DialogKind::CreateFile,
            EntryKind::Directory => DialogKind::CreateDirectory,
        });
    }

    /// Run the action of the open dialog with its input.
    pub fn confirm_dialog(&mut self) {
        let AppMode::Dialog(kind) = self.mode.clone() else {
            return;
        };
        let input = self.dialog_state.input.clone();
        self.close_dialog();

        let result = match kind {
            DialogKind::CreateFile | DialogKind::CreateDirectory => {
                let entry_kind = if kind == DialogKind::CreateFile {
                    EntryKind::File
                } else {
                    EntryKind::Directory
                };
                self.browser
                    .create_entry(&input, entry_kind)
                    .map(|o| format!("Created {}", o.path.display()))
            }
            DialogKind::Rename { .. } => self
                .browser
                .rename(&input)
                .map(|o| format!("Renamed to {}", o.to.display())),
            DialogKind::DeleteConfirm { .. } => {
                self.delete();
                return;
            }
            DialogKind::Error { .. } => return,
        };
        match result {
            Ok(msg) => self.set_status_message(msg),
            Err(e) => self.report(e),
        }
    }

    // ── Dialog input ────────────────────────────────────────────────────────

    /// Open a dialog of the given kind.
    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_state = DialogState::default();
        if let DialogKind::Rename { ref original } = kind {
            if let Some(name) = original.file_name() {
                let name = name.to_string_lossy().to_string();
                self.dialog_state.cursor_position = name.len();
                self.dialog_state.input = name;
            }
        }
        self.mode = AppMode::Dialog(kind);
    }

    /// Close the current dialog and return to normal mode.
    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_state = DialogState::default();
    }

    /// Insert a character at the current cursor position.
    pub fn dialog_input_char(&mut self, c: char) {
        self.dialog_state
            .input
            .insert(self.dialog_state.cursor_position, c);
        self.dialog_state.cursor_position += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn dialog_delete_char(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
            self.dialog_state
                .input
                .remove(self.dialog_state.cursor_position);
        }
    }

    /// Move cursor left by one character.
    pub fn dialog_move_cursor_left(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(prev) = self.dialog_state.input[..pos].chars().next_back() {
            self.dialog_state.cursor_position -= prev.len_utf8();
        }
    }

    /// Move cursor right by one character.
    pub fn dialog_move_cursor_right(&mut self) {
        let pos = self.dialog_state.cursor_position;
        if let Some(next) = self.dialog_state.input[pos..].chars().next() {
            self.dialog_state.cursor_position += next.len_utf8();
        }
    }

    /// Move cursor to the beginning of the input.
    pub fn dialog_cursor_home(&mut self) {
        self.dialog_state.cursor_position = 0;
    }

    /// Move cursor to the end of the input.
    pub fn dialog_cursor_end(&mut self) {
        self.dialog_state.cursor_position = self.dialog_state.input.len();
    }

    // ── Status ──────────────────────────────────────────────────────────────

    /// Set a status message with current timestamp.
    pub fn set_status_message(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    /// Clear the status message if it has been displayed for more than 3 seconds.
    pub fn clear_expired_status(&mut self) {
        if let Some((_, ref created)) = self.status_message {
            if created.elapsed().as_secs() > 3 {
                self.status_message = None;
            }
        }
    }

    /// Quit the application.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::test_support::{browser, child_names, table_names};
    use crate::event::Event;
    use std::fs::{self, File};
    use tempfile::TempDir;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// root/
    /// ├── alpha/
    /// │   └── deep/
    /// │       └── deeper/
    /// ├── beta/
    /// ├── file_a.txt
    /// └── file_b.rs
    async fn setup_app() -> (TempDir, App, UnboundedReceiver<Event>) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("alpha").join("deep").join("deeper")).unwrap();
        fs::create_dir(dir.path().join("beta")).unwrap();
        File::create(dir.path().join("file_a.txt")).unwrap();
        File::create(dir.path().join("file_b.rs")).unwrap();
        let (browser, mut rx) = browser(dir.path());
        let mut app = App::new(browser, true);
        drain(&mut app, &mut rx).await;
        (dir, app, rx)
    }

    /// Apply listings through the app until the browser is idle.
    async fn drain(app: &mut App, rx: &mut UnboundedReceiver<Event>) {
        while app.browser.is_busy() {
            match rx.recv().await {
                Some(Event::Listing(done)) => app.handle_listing(done),
                Some(_) => {}
                None => break,
            }
        }
    }

    fn cursor_name(app: &App) -> String {
        let id = app.tree_cursor.unwrap();
        app.browser.tree().get(id).unwrap().entry.name()
    }

    #[tokio::test]
    async fn starts_on_first_root() {
        let (dir, app, _rx) = setup_app().await;
        assert_eq!(app.tree_cursor_row(), 0);
        assert_eq!(app.browser.current().unwrap().path, dir.path());
        assert_eq!(
            table_names(&app.browser),
            vec!["alpha", "beta", "file_a.txt", "file_b.rs"]
        );
    }

    #[tokio::test]
    async fn tree_navigation_selects_nodes() {
        let (dir, mut app, mut rx) = setup_app().await;
        app.select_next();
        assert_eq!(cursor_name(&app), "alpha");
        drain(&mut app, &mut rx).await;
        assert_eq!(app.browser.current().unwrap().path, dir.path().join("alpha"));
        assert_eq!(table_names(&app.browser), vec!["deep"]);

        // alpha's expansion inserted "deep" right below it.
        app.select_next();
        assert_eq!(cursor_name(&app), "deep");
        app.select_last();
        drain(&mut app, &mut rx).await;
        assert_eq!(cursor_name(&app), "beta");
        app.select_previous();
        assert_eq!(cursor_name(&app), "deeper");
        app.select_parent();
        assert_eq!(cursor_name(&app), "deep");
        app.select_first();
        assert_eq!(app.tree_cursor_row(), 0);
        drain(&mut app, &mut rx).await;
    }

    #[tokio::test]
    async fn select_parent_stops_at_root() {
        let (dir, mut app, _rx) = setup_app().await;
        app.select_parent();
        assert_eq!(app.browser.current().unwrap().path, dir.path());
    }

    #[tokio::test]
    async fn table_navigation_follows_view_order() {
        let (dir, mut app, _rx) = setup_app().await;
        app.toggle_focus();
        assert_eq!(app.focus, Focus::Table);

        app.select_next();
        assert_eq!(app.browser.current().unwrap().path, dir.path().join("alpha"));
        app.select_last();
        assert_eq!(app.browser.current().unwrap().path, dir.path().join("file_b.rs"));
        app.select_next();
        assert_eq!(app.browser.current().unwrap().path, dir.path().join("file_b.rs"));

        app.toggle_sort_direction();
        app.select_first();
        assert_eq!(app.browser.current().unwrap().path, dir.path().join("file_b.rs"));
    }

    #[tokio::test]
    async fn cycle_sort_starts_with_file_name() {
        let (_dir, mut app, _rx) = setup_app().await;
        app.cycle_sort_column();
        assert_eq!(
            app.browser.table().sort(),
            Some((Column::DisplayName, SortDirection::Ascending))
        );
        app.cycle_sort_column();
        assert_eq!(
            app.browser.table().sort(),
            Some((Column::Path, SortDirection::Ascending))
        );
        app.clear_sort();
        assert_eq!(app.browser.table().sort(), None);
    }

    #[tokio::test]
    async fn reveal_expands_level_by_level() {
        let (dir, mut app, mut rx) = setup_app().await;
        let target = dir.path().join("alpha").join("deep").join("deeper");

        app.reveal(&target);
        drain(&mut app, &mut rx).await;

        assert_eq!(cursor_name(&app), "deeper");
        assert_eq!(app.browser.current().unwrap().path, target);
        let alpha = app.browser.tree().find_node(&dir.path().join("alpha")).unwrap();
        assert_eq!(child_names(&app.browser, alpha), vec!["deep"]);
    }

    #[tokio::test]
    async fn reveal_of_missing_path_stops_at_closest_node() {
        let (dir, mut app, mut rx) = setup_app().await;
        app.reveal(&dir.path().join("beta").join("nope"));
        drain(&mut app, &mut rx).await;
        assert_eq!(cursor_name(&app), "beta");
    }

    #[tokio::test]
    async fn activate_directory_row_moves_tree_cursor() {
        let (dir, mut app, mut rx) = setup_app().await;
        app.toggle_focus();
        app.select_next();
        app.select_next();
        app.activate_table_row();
        assert_eq!(app.focus, Focus::Tree);
        assert_eq!(cursor_name(&app), "beta");
        drain(&mut app, &mut rx).await;
        assert_eq!(app.browser.table().directory().unwrap().path, dir.path().join("beta"));
    }

    #[tokio::test]
    async fn delete_asks_for_confirmation() {
        let (dir, mut app, mut rx) = setup_app().await;
        app.toggle_focus();
        app.select_last();

        app.request_delete();
        assert_eq!(
            app.mode,
            AppMode::Dialog(DialogKind::DeleteConfirm {
                target: dir.path().join("file_b.rs"),
                is_directory: false,
            })
        );
        app.confirm_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        drain(&mut app, &mut rx).await;

        assert!(!dir.path().join("file_b.rs").exists());
        assert_eq!(
            table_names(&app.browser),
            vec!["alpha", "beta", "file_a.txt"]
        );
    }

    #[tokio::test]
    async fn create_directory_through_dialog() {
        let (dir, mut app, mut rx) = setup_app().await;
        app.request_create(EntryKind::Directory);
        assert_eq!(app.mode, AppMode::Dialog(DialogKind::CreateDirectory));
        for c in "gamma".chars() {
            app.dialog_input_char(c);
        }
        app.confirm_dialog();
        drain(&mut app, &mut rx).await;

        assert!(dir.path().join("gamma").is_dir());
        let root = app.browser.tree().roots()[0];
        assert_eq!(child_names(&app.browser, root), vec!["alpha", "beta", "gamma"]);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn failed_rename_shows_error_dialog() {
        let (_dir, mut app, _rx) = setup_app().await;
        app.toggle_focus();
        app.select_last();
        app.request_rename();
        assert_eq!(app.dialog_state.input, "file_b.rs");

        app.dialog_cursor_home();
        for _ in 0..app.dialog_state.input.len() {
            app.dialog_move_cursor_right();
        }
        while !app.dialog_state.input.is_empty() {
            app.dialog_delete_char();
        }
        for c in "file_a.txt".chars() {
            app.dialog_input_char(c);
        }
        app.confirm_dialog();

        match &app.mode {
            AppMode::Dialog(DialogKind::Error { title, message }) => {
                assert_eq!(title, "Rename Failed");
                assert!(message.contains("file_b.rs"));
            }
            other => panic!("expected error dialog, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn close_dialog_returns_to_normal() {
        let (_dir, mut app, _rx) = setup_app().await;
        app.open_dialog(DialogKind::CreateDirectory);
        app.close_dialog();
        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.dialog_state.input.is_empty());
        assert_eq!(app.dialog_state.cursor_position, 0);
    }

    #[tokio::test]
    async fn dialog_input_editing() {
        let (_dir, mut app, _rx) = setup_app().await;
        app.open_dialog(DialogKind::CreateFile);
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.cursor_position, 0);

        app.dialog_input_char('a');
        app.dialog_input_char('é');
        app.dialog_input_char('c');
        assert_eq!(app.dialog_state.input, "aéc");
        app.dialog_move_cursor_left();
        app.dialog_move_cursor_left();
        assert_eq!(app.dialog_state.cursor_position, 1);
        app.dialog_move_cursor_right();
        assert_eq!(app.dialog_state.cursor_position, 3);
        app.dialog_delete_char();
        assert_eq!(app.dialog_state.input, "ac");
        app.dialog_cursor_end();
        assert_eq!(app.dialog_state.cursor_position, 2);
    }

    #[tokio::test]
    async fn rename_prefills_input() {
        let (_dir, mut app, _rx) = setup_app().await;
        let path = PathBuf::from("/some/dir/hello.txt");
        app.open_dialog(DialogKind::Rename { original: path });
        assert_eq!(app.dialog_state.input, "hello.txt");
        assert_eq!(app.dialog_state.cursor_position, 9);
    }

    #[tokio::test]
    async fn clear_expired_status_removes_old() {
        let (_dir, mut app, _rx) = setup_app().await;
        app.set_status_message("fresh".to_string());
        app.clear_expired_status();
        assert!(app.status_message.is_some());

        app.status_message = Some((
            "old".to_string(),
            Instant::now() - std::time::Duration::from_secs(5),
        ));
        app.clear_expired_status();
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn quit_sets_flag() {
        let (_dir, mut app, _rx) = setup_app().await;
        assert!(!app.should_quit);
        app.quit();
        assert!(app.should_quit);
    }
}
