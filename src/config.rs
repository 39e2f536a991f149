//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--show-hidden`, `--log-file`, positional path)
//! 2. `--config <file>`
//! 3. `$FILEMAN_CONFIG` environment variable (path to config file)
//! 4. Project-local `.fileman.toml` in the current working directory
//! 5. Global `<config_dir>/fileman/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::fs::lister::ListingOrder;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory to select at startup (overridden by CLI positional arg).
    pub default_path: Option<String>,
    /// Ask before deleting.
    pub confirm_delete: Option<bool>,
}

/// Directory listing settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListingConfig {
    /// Include dot files.
    pub show_hidden: Option<bool>,
    /// "name" (default) or "filesystem".
    pub order: Option<String>,
}

/// Rendering settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path.
    pub file: Option<String>,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: Option<String>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub listing: ListingConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does NOT include the CLI `--config` path; that is handled separately.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("FILEMAN_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".fileman.toml"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("fileman").join("config.toml"));
    }

    paths
}

/// Try to read and parse a TOML config file. Returns `None` if the file
/// doesn't exist or can't be parsed (with a warning printed to stderr).
///
/// Config is read before logging is set up, hence stderr.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            eprintln!(
                "Warning: failed to parse config file {}: {}",
                path.display(),
                e
            );
            None
        }
    }
}

// ── Merge logic ──────────────────────────────────────────────────────────────

impl AppConfig {
    /// Merge `other` on top of `self`; `other`'s `Some` values win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                default_path: other
                    .general
                    .default_path
                    .clone()
                    .or(self.general.default_path),
                confirm_delete: other.general.confirm_delete.or(self.general.confirm_delete),
            },
            listing: ListingConfig {
                show_hidden: other.listing.show_hidden.or(self.listing.show_hidden),
                order: other.listing.order.clone().or(self.listing.order),
            },
            display: DisplayConfig {
                use_icons: other.display.use_icons.or(self.display.use_icons),
            },
            logging: LoggingConfig {
                file: other.logging.file.clone().or(self.logging.file),
                level: other.logging.level.clone().or(self.logging.level),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> AppConfig {
        let mut config = AppConfig::default();

        // Walk in reverse so that highest-priority (env var) overwrites lower.
        for path in candidate_paths().iter().rev() {
            if let Some(file_cfg) = load_file(path) {
                config = config.merge(&file_cfg);
            }
        }

        if let Some(cli_path) = cli_config_path {
            match load_file(cli_path) {
                Some(file_cfg) => config = config.merge(&file_cfg),
                None => eprintln!("Warning: could not load {}", cli_path.display()),
            }
        }

        if let Some(overrides) = cli_overrides {
            config = config.merge(overrides);
        }

        config
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    /// Startup directory from the config file, if any.
    pub fn default_path(&self) -> Option<PathBuf> {
        self.general.default_path.as_ref().map(PathBuf::from)
    }

    /// Whether to confirm before delete.
    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    /// Whether listings include hidden files.
    pub fn show_hidden(&self) -> bool {
        self.listing.show_hidden.unwrap_or(false)
    }

    pub fn listing_order(&self) -> ListingOrder {
        self.listing
            .order
            .as_deref()
            .map(ListingOrder::from_config)
            .unwrap_or(ListingOrder::DisplayName)
    }

    /// Whether to use nerd font icons.
    pub fn use_icons(&self) -> bool {
        self.display.use_icons.unwrap_or(true)
    }

    /// Log file: configured path, else `<cache_dir>/fileman/fileman.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.logging
            .file
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::cache_dir().map(|d| d.join("fileman").join("fileman.log")))
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_values() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.default_path(), None);
        assert!(cfg.confirm_delete());
        assert!(!cfg.show_hidden());
        assert_eq!(cfg.listing_order(), ListingOrder::DisplayName);
        assert!(cfg.use_icons());
        assert_eq!(cfg.log_level(), "info");
    }

    #[test]
    fn test_toml_parsing_full() {
        let toml = r#"
[general]
default_path = "/srv/data"
confirm_delete = false

[listing]
show_hidden = true
order = "filesystem"

[display]
use_icons = false

[logging]
file = "/tmp/fileman-test.log"
level = "debug"
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert_eq!(cfg.default_path(), Some(PathBuf::from("/srv/data")));
        assert!(!cfg.confirm_delete());
        assert!(cfg.show_hidden());
        assert_eq!(cfg.listing_order(), ListingOrder::Filesystem);
        assert!(!cfg.use_icons());
        assert_eq!(cfg.log_file(), Some(PathBuf::from("/tmp/fileman-test.log")));
        assert_eq!(cfg.log_level(), "debug");
    }

    #[test]
    fn test_toml_parsing_partial() {
        let toml = r#"
[listing]
show_hidden = true
"#;
        let cfg: AppConfig = toml::from_str(toml).expect("parse failed");
        assert!(cfg.show_hidden());
        // Everything else should be defaults
        assert!(cfg.confirm_delete());
        assert_eq!(cfg.listing_order(), ListingOrder::DisplayName);
    }

    #[test]
    fn test_toml_parsing_empty() {
        let cfg: AppConfig = toml::from_str("").expect("parse failed");
        assert!(!cfg.show_hidden());
        assert!(cfg.confirm_delete());
    }

    #[test]
    fn test_merge_overrides() {
        let base = AppConfig {
            general: GeneralConfig {
                confirm_delete: Some(false),
                ..Default::default()
            },
            listing: ListingConfig {
                show_hidden: Some(false),
                order: Some("filesystem".into()),
            },
            ..Default::default()
        };

        let over = AppConfig {
            listing: ListingConfig {
                show_hidden: Some(true),
                // order not set, base value is kept
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = base.merge(&over);
        assert!(merged.show_hidden()); // overridden
        assert_eq!(merged.listing_order(), ListingOrder::Filesystem); // from base
        assert!(!merged.confirm_delete()); // from base
    }

    #[test]
    fn test_merge_none_does_not_clear_some() {
        let base = AppConfig {
            logging: LoggingConfig {
                file: Some("/var/log/fm.log".into()),
                level: Some("trace".into()),
            },
            ..Default::default()
        };

        let merged = base.merge(&AppConfig::default());
        assert_eq!(merged.log_file(), Some(PathBuf::from("/var/log/fm.log")));
        assert_eq!(merged.log_level(), "trace");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("test-config.toml");
        let mut f = std::fs::File::create(&cfg_path).expect("create");
        writeln!(
            f,
            r#"
[listing]
show_hidden = true

[display]
use_icons = false
"#
        )
        .expect("write");

        let cfg = load_file(&cfg_path).expect("load");
        assert!(cfg.show_hidden());
        assert!(!cfg.use_icons());
        // Unset fields fall through to defaults
        assert!(cfg.confirm_delete());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_file(Path::new("/nonexistent/config.toml")).is_none());
    }

    #[test]
    fn test_load_invalid_toml_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("bad.toml");
        std::fs::write(&cfg_path, "this is { not valid toml").expect("write");
        assert!(load_file(&cfg_path).is_none());
    }

    #[test]
    fn test_load_with_cli_overrides() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg_path = dir.path().join("config.toml");
        std::fs::write(
            &cfg_path,
            r#"
[general]
confirm_delete = false

[listing]
show_hidden = false
"#,
        )
        .expect("write");

        let cli_overrides = AppConfig {
            listing: ListingConfig {
                show_hidden: Some(true),
                ..Default::default()
            },
            ..Default::default()
        };

        let cfg = AppConfig::load(Some(&cfg_path), Some(&cli_overrides));
        // CLI override wins
        assert!(cfg.show_hidden());
        // File value preserved (not overridden by CLI)
        assert!(!cfg.confirm_delete());
    }
}
