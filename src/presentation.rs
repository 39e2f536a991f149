//! Icon and display-name lookup for paths.
//!
//! The core never renders anything itself; it asks a [`PresentationProvider`]
//! for an opaque [`IconHandle`] and a display string. Listing runs on the
//! blocking pool, so providers must be `Send + Sync`.

use std::path::{Path, PathBuf};

use crate::fs::entry::PathEntry;

/// Opaque icon reference handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IconHandle(pub &'static str);

impl IconHandle {
    pub fn glyph(&self) -> &'static str {
        self.0
    }
}

/// Supplies icons, display names and filesystem roots.
pub trait PresentationProvider: Send + Sync {
    /// Icon for a path. May touch the filesystem to learn its kind.
    fn icon_for(&self, path: &Path) -> IconHandle;

    /// Icon for an already-listed entry. Renderers call this every frame, so
    /// implementations should work from the entry alone.
    fn icon_for_entry(&self, entry: &PathEntry) -> IconHandle {
        self.icon_for(&entry.path)
    }

    fn display_name_for(&self, path: &Path) -> String;
    /// The filesystem roots shown at the top of the tree.
    fn roots(&self) -> Vec<PathEntry>;
}

/// Default provider backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct SystemPresentation {
    use_icons: bool,
    roots: Option<Vec<PathBuf>>,
}

impl SystemPresentation {
    pub fn new(use_icons: bool) -> Self {
        Self {
            use_icons,
            roots: None,
        }
    }

    /// Replace the platform roots with an explicit list.
    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.roots = Some(roots);
        self
    }

    fn platform_roots() -> Vec<PathBuf> {
        if cfg!(windows) {
            ('A'..='Z')
                .map(|letter| PathBuf::from(format!("{}:\\", letter)))
                .filter(|p| p.exists())
                .collect()
        } else {
            vec![PathBuf::from("/")]
        }
    }

    fn icon(&self, path: &Path, is_dir: bool) -> IconHandle {
        match (self.use_icons, is_dir) {
            (true, true) => IconHandle("\u{f07b} "),
            (true, false) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                IconHandle(Self::file_icon_by_ext(&name))
            }
            (false, true) => IconHandle("[D] "),
            (false, false) => IconHandle("[F] "),
        }
    }

    /// Get a Nerd Font icon for a file based on its extension.
    fn file_icon_by_ext(name: &str) -> &'static str {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        match ext.as_str() {
            "rs" => "\u{e7a8} ",
            "py" => "\u{e73c} ",
            "js" | "jsx" => "\u{e74e} ",
            "ts" | "tsx" => "\u{e628} ",
            "html" | "htm" => "\u{e736} ",
            "json" => "\u{e60b} ",
            "toml" | "yaml" | "yml" | "ini" | "cfg" => "\u{e615} ",
            "md" | "markdown" | "rst" | "txt" => "\u{f48a} ",
            "sh" | "bash" | "zsh" | "fish" => "\u{f489} ",
            "java" | "jar" | "class" => "\u{e738} ",
            "c" | "h" => "\u{e61e} ",
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "svg" | "ico" | "webp" => "\u{f1c5} ",
            "zip" | "tar" | "gz" | "xz" | "bz2" | "rar" | "7z" => "\u{f410} ",
            "pdf" => "\u{f1c1} ",
            _ => "\u{f15b} ",
        }
    }
}

impl PresentationProvider for SystemPresentation {
    fn icon_for(&self, path: &Path) -> IconHandle {
        self.icon(path, path.is_dir())
    }

    fn icon_for_entry(&self, entry: &PathEntry) -> IconHandle {
        self.icon(&entry.path, entry.is_directory)
    }

    fn display_name_for(&self, path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }

    fn roots(&self) -> Vec<PathEntry> {
        let candidates = self.roots.clone().unwrap_or_else(Self::platform_roots);
        candidates
            .iter()
            .filter_map(|p| match PathEntry::from_path(p) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping filesystem root {}: {}", p.display(), e);
                    None
                }
            })
            .collect()
    }
}
