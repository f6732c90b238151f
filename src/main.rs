//! freshfeed — a live-updating RSS reader that never starts from a blank screen.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ fetch()  ┌─────────────┐ Snapshot ┌──────────┐  draw()  ┌──────────┐
//! │ poll.rs  │ ───────► │ Coordinator │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (task)   │          │ (lib crate) │broadcast │ (state)  │          │ (render) │
//! └──────────┘          └─────────────┘          └──────────┘          └──────────┘
//!                        ▲    │   ▲                   ▲
//!              RssSource ┘    ▼   └ FeedCache         │ handle_key_event()
//!                        FeedCache (write-back)  ┌──────────┐
//!                                                │ input.rs │
//!                                                └──────────┘
//! ```
//!
//! * **`config`** — command-line arguments.
//! * **`poll`** — spawns the task that refreshes on a timer.
//! * **`app`** — owns all UI state; applies each snapshot.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together and runs the event loop.

mod app;
mod config;
mod input;
mod poll;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::App;
use config::{Args, Config};
use freshfeed::{feed_coordinator, DataSource, FeedCache, RssSource, DEFAULT_CAPACITY};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Send logs to `config.log_file`; the terminal belongs to the UI.
///
/// Filter with `FRESHFEED_LOG` (e.g. `FRESHFEED_LOG=freshfeed=debug`).
fn init_tracing(config: &Config) -> Result<()> {
    if let Some(dir) = config.log_file.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;

    let filter = EnvFilter::try_from_env("FRESHFEED_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_tracing(&config)?;
    info!(url = %config.url, cache = %config.cache_file.display(), "starting freshfeed");

    // -- configure the coordinator -------------------------------------------
    let source: Arc<dyn DataSource> = Arc::new(
        RssSource::new(&config.url, &config.label).with_timeout(config.request_timeout),
    );
    let feed_name = source.name().to_string();
    let cache = FeedCache::new(&config.cache_file);
    let coordinator = Arc::new(feed_coordinator(source, cache, DEFAULT_CAPACITY)?);
    let mut snapshots = coordinator.subscribe()?;

    // -- start background refresh --------------------------------------------
    let poller = poll::spawn(Arc::clone(&coordinator), config.refresh_interval);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    install_panic_hook();
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new().with_feed_name(feed_name);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply any snapshots broadcast since the last tick.
    //   2. Start a manual refresh if one was requested.
    //   3. Render the UI.
    //   4. Poll for keyboard input (up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        // 1. Process snapshots
        loop {
            match snapshots.try_recv() {
                Ok(snapshot) => app.apply(&snapshot),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "UI fell behind the snapshot stream");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        // 2. Manual refresh
        if std::mem::take(&mut app.refresh_requested) {
            info!("manual refresh");
            // Not awaited: the snapshots report its progress.
            drop(coordinator.fetch()?);
        }

        // 3. Render
        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        // 4. Handle input
        let ready = tokio::task::block_in_place(|| event::poll(tick_rate))?;
        if ready {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    coordinator.close();
    poller.abort();
    info!("exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
