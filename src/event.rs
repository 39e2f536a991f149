use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use crate::browser::ListingComplete;
use crate::error::Result;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// A periodic tick for rendering.
    Tick,
    /// Terminal resize event.
    Resize(u16, u16),
    /// A directory enumeration finished on the blocking pool.
    Listing(ListingComplete),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
///
/// The same channel carries finished listings, so the event loop is the only
/// consumer of both.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
    paused: Arc<AtomicBool>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let paused = Arc::new(AtomicBool::new(false));
        let poll_paused = Arc::clone(&paused);

        tokio::task::spawn_blocking(move || loop {
            if poll_paused.load(Ordering::Acquire) {
                std::thread::sleep(tick_rate);
                continue;
            }
            let event = match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        Event::Key(key)
                    }
                    Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                    Ok(_) => continue,
                    Err(e) => {
                        tracing::warn!("terminal read failed: {}", e);
                        continue;
                    }
                },
                Ok(false) => Event::Tick,
                Err(e) => {
                    tracing::warn!("terminal poll failed: {}", e);
                    Event::Tick
                }
            };
            if event_tx.send(event).is_err() {
                break;
            }
        });

        Self {
            rx,
            tx,
            paused,
            tick_rate,
        }
    }

    /// Stop reading the terminal so a foreground child gets the keyboard.
    ///
    /// Blocks for one poll interval so an in-progress poll can finish.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        std::thread::sleep(self.tick_rate);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
    }

    /// Get a sender clone for background tasks to post results.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Receive the next event (waits until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}
