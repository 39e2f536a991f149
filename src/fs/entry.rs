use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Metadata snapshot of a single filesystem path.
///
/// Taken once at listing time and never refreshed; a stale entry is expected
/// when the filesystem changes underneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    pub path: PathBuf,
    pub is_directory: bool,
    pub is_regular_file: bool,
    /// Length in bytes, always 0 for directories.
    pub size_bytes: u64,
    pub last_modified: Option<SystemTime>,
    pub can_read: bool,
    pub can_write: bool,
    pub can_execute: bool,
}

impl PathEntry {
    /// Read the metadata of `path`.
    ///
    /// Symlinks are followed; a dangling link falls back to the link's own
    /// metadata so it still shows up (as neither file nor directory).
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let metadata = match fs::metadata(path) {
            Ok(m) => m,
            Err(_) => fs::symlink_metadata(path)?,
        };
        let is_directory = metadata.is_dir();
        let is_regular_file = metadata.is_file();

        Ok(Self {
            path: path.to_path_buf(),
            is_directory,
            is_regular_file,
            size_bytes: if is_directory { 0 } else { metadata.len() },
            last_modified: metadata.modified().ok(),
            can_read: access::readable(path, &metadata),
            can_write: access::writable(path, &metadata),
            can_execute: access::executable(path, &metadata),
        })
    }

    /// Final path component, or the whole path for filesystem roots.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.to_string_lossy().to_string())
    }

    /// Whether the final component starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(false)
    }

    /// The directory containing this entry, if any.
    pub fn parent(&self) -> Option<&Path> {
        self.path.parent()
    }
}

#[cfg(unix)]
mod access {
    use std::fs::Metadata;
    use std::path::Path;

    use nix::unistd::{access, AccessFlags};

    pub fn readable(path: &Path, _meta: &Metadata) -> bool {
        access(path, AccessFlags::R_OK).is_ok()
    }

    pub fn writable(path: &Path, _meta: &Metadata) -> bool {
        access(path, AccessFlags::W_OK).is_ok()
    }

    pub fn executable(path: &Path, _meta: &Metadata) -> bool {
        access(path, AccessFlags::X_OK).is_ok()
    }
}

#[cfg(not(unix))]
mod access {
    use std::fs::Metadata;
    use std::path::Path;

    pub fn readable(_path: &Path, _meta: &Metadata) -> bool {
        true
    }

    pub fn writable(_path: &Path, meta: &Metadata) -> bool {
        !meta.permissions().readonly()
    }

    pub fn executable(path: &Path, meta: &Metadata) -> bool {
        if meta.is_dir() {
            return true;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        matches!(ext.as_str(), "exe" | "bat" | "cmd" | "com")
    }
}
