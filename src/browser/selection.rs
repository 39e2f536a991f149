use crate::fs::entry::PathEntry;

/// The single "current file".
///
/// Written only by tree and table picks; the last pick wins.
#[derive(Debug, Default, Clone)]
pub struct SelectionState {
    current: Option<PathEntry>,
}

impl SelectionState {
    pub fn current(&self) -> Option<&PathEntry> {
        self.current.as_ref()
    }

    pub(super) fn set(&mut self, entry: PathEntry) {
        tracing::debug!("current file: {}", entry.path.display());
        self.current = Some(entry);
    }
}
