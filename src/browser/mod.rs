//! Keeps the directory tree, the listing table and the current file in step.
//!
//! Enumerations run on tokio's blocking pool and come back through the
//! application event queue as [`Event::Listing`]; only the event loop calls
//! [`Browser::apply_listing`], so the tree and table have a single writer.

mod file_ops;
mod selection;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::{EnumerationError, RowOutOfRange};
use crate::event::Event;
use crate::fs::entry::PathEntry;
use crate::fs::lister::{DirectoryLister, ListingSnapshot};
use crate::fs::operations::FileCopier;
use crate::fs::table::{Column, ListingTable, SortDirection};
use crate::fs::tree::{DirectoryTree, ExpandRequest, NodeId};
use crate::launcher::Launcher;
use crate::presentation::PresentationProvider;

pub use file_ops::{CopyOutcome, CreateOutcome, DeleteOutcome, EntryKind, RenameOutcome};
pub use selection::SelectionState;

/// One scheduled enumeration and what to do with its result.
#[derive(Debug, Clone)]
pub struct ListingRequest {
    pub directory_entry: PathEntry,
    /// Complete the expansion of this node.
    pub expand: Option<NodeId>,
    /// Add missing subdirectories to the tree node for this directory, if it
    /// is materialized and loaded when the result arrives. The ticket is
    /// compared with the newest refresh issued for the same directory.
    pub reconcile: Option<u64>,
    /// Reload the table; the ticket orders table requests.
    pub table_ticket: Option<u64>,
}

impl ListingRequest {
    pub fn path(&self) -> &Path {
        &self.directory_entry.path
    }
}

/// A finished enumeration, posted back to the event loop.
#[derive(Debug)]
pub struct ListingComplete {
    pub request: ListingRequest,
    pub result: Result<ListingSnapshot, EnumerationError>,
}

/// The selection coordinator.
pub struct Browser {
    tree: DirectoryTree,
    table: ListingTable,
    selection: SelectionState,
    lister: DirectoryLister,
    launcher: Box<dyn Launcher>,
    copier: Box<dyn FileCopier>,
    tx: mpsc::UnboundedSender<Event>,
    busy: usize,
    next_ticket: u64,
    applied_ticket: u64,
    /// Newest reconcile ticket issued per directory.
    reconcile_issued: HashMap<PathBuf, u64>,
}

impl Browser {
    pub fn new(
        tree: DirectoryTree,
        lister: DirectoryLister,
        launcher: Box<dyn Launcher>,
        copier: Box<dyn FileCopier>,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Self {
        Self {
            tree,
            table: ListingTable::new(),
            selection: SelectionState::default(),
            lister,
            launcher,
            copier,
            tx,
            busy: 0,
            next_ticket: 0,
            applied_ticket: 0,
            reconcile_issued: HashMap::new(),
        }
    }

    pub fn tree(&self) -> &DirectoryTree {
        &self.tree
    }

    pub fn table(&self) -> &ListingTable {
        &self.table
    }

    pub fn presentation(&self) -> &dyn PresentationProvider {
        self.lister.presentation().as_ref()
    }

    pub fn current(&self) -> Option<&PathEntry> {
        self.selection.current()
    }

    /// Whether any enumeration has not been applied yet.
    pub fn is_busy(&self) -> bool {
        self.busy > 0
    }

    pub fn busy_count(&self) -> usize {
        self.busy
    }

    /// Pick a tree node.
    ///
    /// The node becomes the current file and is expanded. A directory also
    /// gets its contents loaded into the table; when the expansion starts here
    /// a single enumeration serves both.
    pub fn select_from_tree(&mut self, id: NodeId) -> Option<PathEntry> {
        let entry = self.tree.get(id)?.entry.clone();
        self.selection.set(entry.clone());

        let expand = match self.tree.expand(id) {
            ExpandRequest::Started(_) => Some(id),
            _ => None,
        };
        let table_ticket = entry.is_directory.then(|| self.issue_ticket());
        if expand.is_some() || table_ticket.is_some() {
            self.spawn_listing(ListingRequest {
                directory_entry: entry.clone(),
                expand,
                reconcile: None,
                table_ticket,
            });
        }
        Some(entry)
    }

    /// Pick a table row by model index. The tree is not touched.
    pub fn select_from_table(&mut self, row: usize) -> Result<PathEntry, RowOutOfRange> {
        let entry = self.table.entry_at(row)?.clone();
        self.selection.set(entry.clone());
        Ok(entry)
    }

    /// Pick the table row shown at `view_row` under the current sort.
    pub fn select_table_view_row(&mut self, view_row: usize) -> Result<PathEntry, RowOutOfRange> {
        let row = self
            .table
            .select_view_row(view_row)
            .ok_or(RowOutOfRange {
                row: view_row,
                len: self.table.row_count(),
            })?;
        self.select_from_table(row)
    }

    /// Expand a node without changing the selection or the table.
    pub fn expand(&mut self, id: NodeId) -> ExpandRequest {
        let request = self.tree.expand(id);
        if let ExpandRequest::Started(_) = request {
            if let Some(node) = self.tree.get(id) {
                let directory_entry = node.entry.clone();
                self.spawn_listing(ListingRequest {
                    directory_entry,
                    expand: Some(id),
                    reconcile: None,
                    table_ticket: None,
                });
            }
        }
        request
    }

    pub fn sort_table(&mut self, column: Column, direction: SortDirection) {
        let presentation = Arc::clone(self.lister.presentation());
        self.table.sort_by(column, direction, presentation.as_ref());
    }

    pub fn clear_table_sort(&mut self) {
        self.table.clear_sort();
    }

    /// Apply a finished enumeration. Call only from the event loop.
    ///
    /// A failed enumeration is treated as an empty directory. Table results
    /// older than one already shown are dropped.
    pub fn apply_listing(&mut self, done: ListingComplete) {
        self.busy = self.busy.saturating_sub(1);
        let ListingComplete { request, result } = done;

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("{}", e);
                ListingSnapshot::empty(request.directory_entry.clone())
            }
        };

        if let Some(id) = request.expand {
            self.tree.complete_expansion(id, Ok(snapshot.clone()));
        }

        if let Some(ticket) = request.reconcile {
            self.apply_reconcile(request.path(), ticket, &snapshot);
        }

        if let Some(ticket) = request.table_ticket {
            if ticket < self.applied_ticket {
                tracing::debug!(
                    "dropping stale listing of {} (ticket {} < {})",
                    request.path().display(),
                    ticket,
                    self.applied_ticket
                );
            } else {
                self.applied_ticket = ticket;
                let presentation = Arc::clone(self.lister.presentation());
                self.table.load(Arc::new(snapshot), presentation.as_ref());
            }
        }
    }

    /// Add subdirectories from `snapshot` to the node for `dir`.
    ///
    /// A snapshot taken before a later refresh of the same directory may still
    /// list entries that were deleted or renamed since, so it is dropped.
    fn apply_reconcile(&mut self, dir: &Path, ticket: u64, snapshot: &ListingSnapshot) {
        if let Some(&newest) = self.reconcile_issued.get(dir) {
            if newest > ticket {
                tracing::debug!(
                    "dropping stale reconcile of {} (ticket {} < {})",
                    dir.display(),
                    ticket,
                    newest
                );
                return;
            }
        }

        match self.tree.find_node(dir) {
            Some(id) => {
                let added = self.tree.reconcile(id, snapshot);
                if added > 0 {
                    tracing::debug!("added {} nodes under {}", added, dir.display());
                }
            }
            None => tracing::debug!("{} is not in the tree, skipping reconcile", dir.display()),
        }
    }

    /// Re-list `dir` into the table and add any new subdirectories to its
    /// tree node.
    fn refresh_directory(&mut self, dir: &Path) {
        let directory_entry = match PathEntry::from_path(dir) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("cannot refresh {}: {}", dir.display(), e);
                return;
            }
        };
        let ticket = self.issue_ticket();
        self.reconcile_issued.insert(dir.to_path_buf(), ticket);
        self.spawn_listing(ListingRequest {
            directory_entry,
            expand: None,
            reconcile: Some(ticket),
            table_ticket: Some(ticket),
        });
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn spawn_listing(&mut self, request: ListingRequest) {
        self.busy += 1;
        let lister = self.lister.clone();
        let tx = self.tx.clone();
        tracing::debug!("listing {}", request.path().display());
        tokio::task::spawn_blocking(move || {
            let result = lister.list(request.path());
            if tx.send(Event::Listing(ListingComplete { request, result })).is_err() {
                tracing::debug!("event loop gone, discarding listing");
            }
        });
    }
}

/// Parent directory of a path, as an owned path.
fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use tokio::sync::mpsc;

    use super::Browser;
    use crate::event::Event;
    use crate::fs::entry::PathEntry;
    use crate::fs::lister::{DirectoryLister, ListingOrder};
    use crate::fs::operations::LocalCopier;
    use crate::fs::tree::{DirectoryTree, NodeId};
    use crate::launcher::{LaunchAction, LaunchError, Launcher};
    use crate::presentation::SystemPresentation;

    pub type Calls = Arc<Mutex<Vec<(LaunchAction, PathBuf)>>>;

    /// Launcher that records calls instead of running anything.
    pub struct RecordingLauncher {
        pub supported: bool,
        pub fail: bool,
        pub calls: Calls,
    }

    impl Launcher for RecordingLauncher {
        fn is_supported(&self, _action: LaunchAction) -> bool {
            self.supported
        }

        fn open(&self, path: &Path) -> Result<(), LaunchError> {
            self.record(LaunchAction::Open, path)
        }

        fn edit(&self, path: &Path) -> Result<(), LaunchError> {
            self.record(LaunchAction::Edit, path)
        }

        fn print(&self, path: &Path) -> Result<(), LaunchError> {
            self.record(LaunchAction::Print, path)
        }
    }

    impl RecordingLauncher {
        fn record(&self, action: LaunchAction, path: &Path) -> Result<(), LaunchError> {
            self.calls.lock().unwrap().push((action, path.to_path_buf()));
            if self.fail {
                Err(LaunchError::Failed {
                    program: "fake".into(),
                    status: "exit status: 1".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    pub fn lister() -> DirectoryLister {
        DirectoryLister::new(
            Arc::new(SystemPresentation::new(false)),
            false,
            ListingOrder::DisplayName,
        )
    }

    pub fn browser_with(
        root: &Path,
        launcher: RecordingLauncher,
    ) -> (Browser, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let lister = lister();
        let tree = DirectoryTree::seed(vec![PathEntry::from_path(root).unwrap()], &lister);
        let browser = Browser::new(tree, lister, Box::new(launcher), Box::new(LocalCopier), tx);
        (browser, rx)
    }

    pub fn browser(root: &Path) -> (Browser, mpsc::UnboundedReceiver<Event>) {
        browser_with(
            root,
            RecordingLauncher {
                supported: true,
                fail: false,
                calls: Calls::default(),
            },
        )
    }

    /// Apply queued listings until nothing is in flight.
    pub async fn settle(browser: &mut Browser, rx: &mut mpsc::UnboundedReceiver<Event>) {
        while browser.is_busy() {
            match rx.recv().await {
                Some(Event::Listing(done)) => browser.apply_listing(done),
                Some(_) => {}
                None => break,
            }
        }
    }

    pub fn node(browser: &Browser, path: &Path) -> NodeId {
        browser.tree().find_node(path).unwrap()
    }

    pub fn child_names(browser: &Browser, id: NodeId) -> Vec<String> {
        let tree = browser.tree();
        tree.children(id)
            .iter()
            .map(|&c| tree.get(c).unwrap().entry.name())
            .collect()
    }

    pub fn table_names(browser: &Browser) -> Vec<String> {
        let table = browser.table();
        (0..table.row_count())
            .map(|row| table.entry_at(row).unwrap().name())
            .collect()
    }
}
