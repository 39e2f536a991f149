use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Create an empty file, failing with `AlreadyExists` if anything is already
/// at `path`.
pub fn create_file(path: &Path) -> io::Result<()> {
    OpenOptions::new().write(true).create_new(true).open(path)?;
    Ok(())
}

/// Create a new directory at the given path.
pub fn create_dir(path: &Path) -> io::Result<()> {
    fs::create_dir(path)
}

/// Rename a file or directory, refusing to replace an existing destination.
pub fn rename(from: &Path, to: &Path) -> io::Result<()> {
    if fs::symlink_metadata(to).is_ok() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }
    fs::rename(from, to)
}

/// Outcome of a best-effort delete.
#[derive(Debug, Default)]
pub struct DeleteReport {
    pub deleted: usize,
    pub errors: Vec<String>,
}

impl DeleteReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Delete a file or directory tree, continuing past individual failures.
///
/// Symlinks are removed, never followed. Files are removed first, then
/// directories deepest first. Never fails outright; every problem is
/// collected in the report.
pub fn delete_quietly(path: &Path) -> DeleteReport {
    let mut report = DeleteReport::default();

    let is_dir = match fs::symlink_metadata(path) {
        Ok(meta) => meta.is_dir(),
        Err(e) => {
            report.errors.push(format!("{}: {}", path.display(), e));
            return report;
        }
    };

    if !is_dir {
        match fs::remove_file(path) {
            Ok(()) => report.deleted += 1,
            Err(e) => report.errors.push(format!("{}: {}", path.display(), e)),
        }
        return report;
    }

    // Collect all entries bottom-up (files first, then dirs)
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut stack = vec![path.to_path_buf()];

    while let Some(dir) = stack.pop() {
        dirs.push(dir.clone());
        let entries = match fs::read_dir(&dir) {
            Ok(e) => e,
            Err(e) => {
                report.errors.push(format!("{}: {}", dir.display(), e));
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    report.errors.push(format!("{}: {}", dir.display(), e));
                    continue;
                }
            };
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => stack.push(entry.path()),
                _ => files.push(entry.path()),
            }
        }
    }

    for file in &files {
        match fs::remove_file(file) {
            Ok(()) => report.deleted += 1,
            Err(e) => report.errors.push(format!("{}: {}", file.display(), e)),
        }
    }

    // Delete directories bottom-up (deepest first)
    dirs.reverse();
    for dir in &dirs {
        match fs::remove_dir(dir) {
            Ok(()) => report.deleted += 1,
            Err(e) => report.errors.push(format!("{}: {}", dir.display(), e)),
        }
    }

    report
}

/// Resolve a name collision by appending `_copy`, `_copy2`, etc.
///
/// Returns a path that does not exist yet in the destination directory.
pub fn resolve_collision(dest: &Path) -> PathBuf {
    if !dest.exists() {
        return dest.to_path_buf();
    }

    let parent = dest.parent().unwrap_or(Path::new("."));
    let stem = dest
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = dest.extension().map(|e| e.to_string_lossy().to_string());

    for i in 1..=1000 {
        let suffix = if i == 1 {
            "_copy".to_string()
        } else {
            format!("_copy{}", i)
        };
        let new_name = match &ext {
            Some(e) => format!("{}{}.{}", stem, suffix, e),
            None => format!("{}{}", stem, suffix),
        };
        let candidate = parent.join(&new_name);
        if !candidate.exists() {
            return candidate;
        }
    }

    dest.to_path_buf()
}

/// Copies a single file.
pub trait FileCopier {
    /// Copy `from` to a new file at `to`.
    ///
    /// Returns `Ok(false)` without touching anything when `to` already exists,
    /// and `Ok(true)` only once every byte has been written. Read, write and
    /// execute flags are carried over from `from`.
    fn copy(&self, from: &Path, to: &Path) -> io::Result<bool>;
}

/// [`FileCopier`] for the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalCopier;

impl FileCopier for LocalCopier {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<bool> {
        let mut source = fs::File::open(from)?;
        let mut dest = match OpenOptions::new().write(true).create_new(true).open(to) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e),
        };

        let transfer = io::copy(&mut source, &mut dest)
            .and_then(|_| dest.sync_all())
            .and_then(|_| source.metadata())
            .and_then(|meta| fs::set_permissions(to, meta.permissions()));

        match transfer {
            Ok(()) => Ok(true),
            Err(e) => {
                drop(dest);
                if let Err(cleanup) = fs::remove_file(to) {
                    tracing::warn!(
                        "could not remove partial copy {}: {}",
                        to.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }
}
