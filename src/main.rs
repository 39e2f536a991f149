mod app;
mod browser;
mod components;
mod config;
mod error;
mod event;
mod fs;
mod handler;
mod launcher;
mod logging;
mod presentation;
mod tui;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::app::App;
use crate::browser::Browser;
use crate::config::{AppConfig, ListingConfig, LoggingConfig};
use crate::error::AppError;
use crate::event::{Event, EventHandler};
use crate::fs::lister::DirectoryLister;
use crate::fs::operations::LocalCopier;
use crate::fs::tree::DirectoryTree;
use crate::launcher::{LaunchAction, SystemLauncher};
use crate::presentation::{PresentationProvider, SystemPresentation};
use crate::tui::{install_panic_hook, Tui};

/// A two-pane terminal file browser.
#[derive(Parser, Debug)]
#[command(name = "fileman", version, about)]
struct Cli {
    /// Directory to select at startup (defaults to the current directory)
    path: Option<PathBuf>,

    /// Read settings from this file instead of the usual locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Include hidden entries in listings
    #[arg(long)]
    show_hidden: bool,

    /// Write the log here
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> AppConfig {
        AppConfig {
            listing: ListingConfig {
                show_hidden: self.show_hidden.then_some(true),
                ..Default::default()
            },
            logging: LoggingConfig {
                file: self
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> error::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref(), Some(&cli.overrides()));

    if let Some(log_file) = config.log_file() {
        if let Err(e) = logging::init(&log_file, config.log_level()) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }

    let requested = match cli.path.clone().or_else(|| config.default_path()) {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let start = requested.canonicalize().map_err(|_| {
        AppError::InvalidPath(format!("{} does not exist", requested.display()))
    })?;
    tracing::info!("starting in {}", start.display());

    install_panic_hook();

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(16));

    let presentation: Arc<dyn PresentationProvider> =
        Arc::new(SystemPresentation::new(config.use_icons()));
    let lister = DirectoryLister::new(
        Arc::clone(&presentation),
        config.show_hidden(),
        config.listing_order(),
    );
    let tree = DirectoryTree::seed(presentation.roots(), &lister);
    let browser = Browser::new(
        tree,
        lister,
        Box::new(SystemLauncher::from_env()),
        Box::new(LocalCopier),
        events.sender(),
    );
    let mut app = App::new(browser, config.confirm_delete());
    app.reveal(&start);

    loop {
        tui.terminal_mut().draw(|frame| {
            ui::render(&app, frame);
        })?;

        match events.next().await? {
            Event::Key(key) => handler::handle_key_event(&mut app, key),
            Event::Tick => app.clear_expired_status(),
            Event::Resize(_, _) => {}
            Event::Listing(done) => app.handle_listing(done),
        }

        if app.pending_edit {
            app.pending_edit = false;
            events.pause();
            let suspended = tui.suspended(|| app.launch(LaunchAction::Edit));
            events.resume();
            suspended?;
        }

        if app.should_quit {
            break;
        }
    }

    tui.restore()?;
    tracing::info!("exiting");
    Ok(())
}
