use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::EnumerationError;
use crate::fs::entry::PathEntry;
use crate::presentation::PresentationProvider;

/// Ordering applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrder {
    /// Case-insensitive display name, ties broken by the raw file name. Stable.
    DisplayName,
    /// Whatever order the filesystem returned.
    Filesystem,
}

impl ListingOrder {
    /// Parse from a config string.
    pub fn from_config(s: &str) -> Self {
        match s {
            "filesystem" | "none" => ListingOrder::Filesystem,
            _ => ListingOrder::DisplayName,
        }
    }
}

/// Result of enumerating one directory.
///
/// Produced wholesale by a single [`DirectoryLister::list`] call and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSnapshot {
    pub directory_entry: PathEntry,
    pub all_entries: Vec<PathEntry>,
    /// The directories of `all_entries`, in the same relative order.
    pub subdirectory_entries: Vec<PathEntry>,
}

impl ListingSnapshot {
    /// A listing with nothing in it.
    pub fn empty(directory_entry: PathEntry) -> Self {
        Self {
            directory_entry,
            all_entries: Vec::new(),
            subdirectory_entries: Vec::new(),
        }
    }

    /// Build a snapshot, deriving the subdirectory subset from `all_entries`.
    pub fn from_entries(directory_entry: PathEntry, all_entries: Vec<PathEntry>) -> Self {
        let subdirectory_entries = all_entries
            .iter()
            .filter(|e| e.is_directory)
            .cloned()
            .collect();
        Self {
            directory_entry,
            all_entries,
            subdirectory_entries,
        }
    }
}

/// One-level directory enumeration.
///
/// Cheap to clone; clones share the presentation provider.
#[derive(Clone)]
pub struct DirectoryLister {
    presentation: Arc<dyn PresentationProvider>,
    show_hidden: bool,
    order: ListingOrder,
}

impl std::fmt::Debug for DirectoryLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryLister")
            .field("presentation", &"<dyn PresentationProvider>")
            .field("show_hidden", &self.show_hidden)
            .field("order", &self.order)
            .finish()
    }
}

impl DirectoryLister {
    pub fn new(
        presentation: Arc<dyn PresentationProvider>,
        show_hidden: bool,
        order: ListingOrder,
    ) -> Self {
        Self {
            presentation,
            show_hidden,
            order,
        }
    }

    pub fn presentation(&self) -> &Arc<dyn PresentationProvider> {
        &self.presentation
    }

    /// Enumerate the direct children of `path`.
    ///
    /// Entries whose metadata cannot be read are skipped. Failing to open the
    /// directory itself (missing, not a directory, permission denied) is an
    /// error. Blocking; call it off the interactive thread.
    pub fn list(&self, path: &Path) -> Result<ListingSnapshot, EnumerationError> {
        let enumeration_error = |source| EnumerationError {
            path: path.to_path_buf(),
            source,
        };

        let directory_entry = PathEntry::from_path(path).map_err(enumeration_error)?;
        let entries = fs::read_dir(path).map_err(enumeration_error)?;

        let mut all_entries = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let entry_path = entry.path();
            match PathEntry::from_path(&entry_path) {
                Ok(path_entry) => {
                    if !self.show_hidden && path_entry.is_hidden() {
                        continue;
                    }
                    all_entries.push(path_entry);
                }
                Err(e) => {
                    tracing::debug!("skipping {}: {}", entry_path.display(), e);
                }
            }
        }

        if self.order == ListingOrder::DisplayName {
            all_entries.sort_by_cached_key(|e| {
                (
                    self.presentation.display_name_for(&e.path).to_lowercase(),
                    e.name(),
                )
            });
        }

        tracing::debug!(
            "listed {} ({} entries)",
            path.display(),
            all_entries.len()
        );
        Ok(ListingSnapshot::from_entries(directory_entry, all_entries))
    }
}
