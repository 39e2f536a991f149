//! File operations on the current file.
//!
//! Each operation checks the selection, changes the filesystem, then mirrors
//! the change into the tree and re-lists the affected directory. When the
//! filesystem step fails the tree is left alone.

use std::io;
use std::path::{Path, PathBuf};

use super::{parent_dir, Browser};
use crate::error::{OpError, OpResult};
use crate::fs::entry::PathEntry;
use crate::fs::operations;
use crate::fs::tree::NodeId;
use crate::launcher::LaunchAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
    /// The renamed directory's node was dropped from the tree.
    pub removed_node: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub path: PathBuf,
    /// Files and directories removed.
    pub deleted: usize,
    pub removed_node: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateOutcome {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub inserted_node: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Why `name` cannot be used as a single path component, if it can't.
fn invalid_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("the name is empty")
    } else if name == "." || name == ".." {
        Some("the name is reserved")
    } else if name.chars().any(std::path::is_separator) {
        Some("the name contains a path separator")
    } else {
        None
    }
}

impl Browser {
    fn selected(&self) -> OpResult<PathEntry> {
        self.selection.current().cloned().ok_or(OpError::NoSelection)
    }

    /// Drop the tree node for `path`, if one is materialized.
    fn remove_tree_node(&mut self, path: &Path) -> bool {
        match self.tree.find_node(path) {
            Some(id) => {
                self.tree.remove_node(id);
                true
            }
            None => {
                tracing::debug!("{} has no tree node to remove", path.display());
                false
            }
        }
    }

    fn refresh_parent(&mut self, path: &Path) {
        match parent_dir(path) {
            Some(parent) => self.refresh_directory(&parent),
            None => tracing::debug!("{} has no parent to refresh", path.display()),
        }
    }

    /// Rename the current file within its directory.
    pub fn rename(&mut self, new_name: &str) -> OpResult<RenameOutcome> {
        let target = self.selected()?;
        let failed = |cause: &str| OpError::RenameFailed {
            path: target.path.clone(),
            cause: cause.to_string(),
        };

        let new_name = new_name.trim();
        if let Some(reason) = invalid_name(new_name) {
            return Err(failed(reason));
        }
        let parent = parent_dir(&target.path).ok_or_else(|| failed("it has no parent directory"))?;
        if std::fs::symlink_metadata(&target.path).is_err() {
            return Err(failed("it no longer exists"));
        }
        let destination = parent.join(new_name);
        operations::rename(&target.path, &destination).map_err(|e| failed(&e.to_string()))?;

        let removed_node = target.is_directory && self.remove_tree_node(&target.path);
        self.refresh_directory(&parent);

        tracing::info!(
            "renamed {} to {}",
            target.path.display(),
            destination.display()
        );
        Ok(RenameOutcome {
            from: target.path,
            to: destination,
            removed_node,
        })
    }

    /// Delete the current file, recursively for directories.
    ///
    /// Assumes the user already confirmed.
    pub fn delete(&mut self) -> OpResult<DeleteOutcome> {
        let target = self.selected()?;

        let report = operations::delete_quietly(&target.path);
        let still_there = std::fs::symlink_metadata(&target.path).is_ok();
        if !report.succeeded() || still_there {
            let cause = report
                .errors
                .first()
                .cloned()
                .unwrap_or_else(|| "it still exists".to_string());
            tracing::debug!(
                "delete of {} left {} errors",
                target.path.display(),
                report.errors.len()
            );
            return Err(OpError::DeleteFailed {
                path: target.path,
                cause,
            });
        }

        let removed_node = target.is_directory && self.remove_tree_node(&target.path);
        self.refresh_parent(&target.path);

        tracing::info!(
            "deleted {} ({} items)",
            target.path.display(),
            report.deleted
        );
        Ok(DeleteOutcome {
            path: target.path,
            deleted: report.deleted,
            removed_node,
        })
    }

    /// Create an empty file or directory named `name`.
    ///
    /// It goes inside the current file when that is a directory, next to it
    /// otherwise. An existing path is never overwritten.
    pub fn create_entry(&mut self, name: &str, kind: EntryKind) -> OpResult<CreateOutcome> {
        let current = self.selected()?;
        let parent = if current.is_directory {
            current.path.clone()
        } else {
            parent_dir(&current.path).ok_or_else(|| OpError::CreateFailed {
                path: current.path.clone(),
                cause: "it has no parent directory".to_string(),
            })?
        };

        let name = name.trim();
        if let Some(reason) = invalid_name(name) {
            return Err(OpError::CreateFailed {
                path: parent.join(name),
                cause: reason.to_string(),
            });
        }
        let path = parent.join(name);

        let created = match kind {
            EntryKind::File => operations::create_file(&path),
            EntryKind::Directory => operations::create_dir(&path),
        };
        match created {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(OpError::AlreadyExists { path });
            }
            Err(e) => {
                return Err(OpError::CreateFailed {
                    path,
                    cause: e.to_string(),
                });
            }
        }

        let inserted_node = match kind {
            EntryKind::Directory => self.insert_created_directory(&parent, &path),
            EntryKind::File => None,
        };
        self.refresh_directory(&parent);

        tracing::info!("created {:?} {}", kind, path.display());
        Ok(CreateOutcome {
            path,
            kind,
            inserted_node,
        })
    }

    /// Add a node for a freshly created directory.
    ///
    /// Parents that were never expanded are skipped; their first expansion
    /// lists the new directory anyway.
    fn insert_created_directory(&mut self, parent: &Path, path: &Path) -> Option<NodeId> {
        let Some(parent_id) = self.tree.find_node(parent) else {
            tracing::debug!("{} is not in the tree", parent.display());
            return None;
        };
        if !self.tree.get(parent_id)?.children_loaded {
            tracing::debug!("{} not expanded yet, leaving it to expansion", parent.display());
            return None;
        }
        match PathEntry::from_path(path) {
            Ok(entry) => Some(self.tree.insert_child(parent_id, entry)),
            Err(e) => {
                tracing::debug!("cannot stat new directory {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Copy the current file next to itself under a free `_copy` name.
    pub fn duplicate(&mut self) -> OpResult<CopyOutcome> {
        let source = self.selected()?;
        if !source.is_regular_file {
            return Err(OpError::CopyFailed {
                path: source.path,
                cause: "only regular files can be duplicated".to_string(),
            });
        }

        let destination = operations::resolve_collision(&source.path);
        match self.copier.copy(&source.path, &destination) {
            Ok(true) => {}
            Ok(false) => return Err(OpError::AlreadyExists { path: destination }),
            Err(e) => {
                return Err(OpError::CopyFailed {
                    path: source.path,
                    cause: e.to_string(),
                });
            }
        }
        self.refresh_parent(&source.path);

        tracing::info!(
            "copied {} to {}",
            source.path.display(),
            destination.display()
        );
        Ok(CopyOutcome {
            from: source.path,
            to: destination,
        })
    }

    /// Hand the current file to the launcher.
    pub fn launch(&mut self, action: LaunchAction) -> OpResult<()> {
        let target = self.selected()?;
        if !self.launcher.is_supported(action) {
            return Err(OpError::LauncherUnsupported {
                action: action.to_string(),
                path: target.path,
            });
        }
        self.launcher
            .launch(action, &target.path)
            .map_err(|e| OpError::LaunchFailed {
                action: action.to_string(),
                path: target.path.clone(),
                cause: e.to_string(),
            })?;
        tracing::info!("{} {}", action, target.path.display());
        Ok(())
    }
}
