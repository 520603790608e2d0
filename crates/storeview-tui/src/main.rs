//! Storeview TUI
//!
//! Terminal front-end mirroring a server-authoritative JSON store.
//!
//! ## Layout
//!
//! - Top: the mirror region (serialized store, or a connection placeholder)
//! - Middle: controls (recording toggle, name field)
//! - Bottom: connection state and key hints
//!
//! ## Keys
//!
//! - r: toggle recording (sends the inverted value to the server)
//! - i or Enter: focus the name field; Enter/Esc ends the edit and sends
//! - q or Ctrl-C: quit

mod app;
mod ui;

use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tracing_subscriber::EnvFilter;

use storeview_core::{transport, CommandSender, Config, TransportError, TransportEvent};

use app::App;

#[derive(Parser)]
#[command(name = "storeview")]
#[command(about = "Mirror a server JSON store over SSE or WebSocket")]
#[command(version)]
struct Cli {
    /// Base HTTP URL of the backend server
    #[arg(long)]
    url: Option<String>,

    /// Transport to use: sse or websocket
    #[arg(long)]
    transport: Option<String>,

    /// Path to the config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write logs to this file (the terminal stays clean)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.log_file {
        init_logging(path)?;
    }

    // Load config, then apply CLI overrides on top
    let mut config = match cli.config {
        Some(ref path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.url {
        config.server_url = url;
    }
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }
    tracing::info!(
        "starting against {} over {}",
        config.server_url,
        config.transport
    );

    // The transport and command sender live on the tokio runtime; the UI
    // loop stays synchronous and drains their channels.
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let _guard = runtime.enter();

    let (mut app, events) = match transport::spawn(&config) {
        Ok(events) => (App::new(), Some(events)),
        Err(e @ TransportError::Unsupported(_)) => (App::with_fallback(e.to_string()), None),
        Err(e) => return Err(e.into()),
    };

    let sender = CommandSender::new(&config);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Run app
    let result = run_app(&mut terminal, &mut app, events, sender);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

/// Route tracing output to a file so it never corrupts the terminal UI
fn init_logging(path: &PathBuf) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {:?}", path))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    mut events: Option<tokio::sync::mpsc::UnboundedReceiver<TransportEvent>>,
    sender: CommandSender,
) -> Result<()> {
    loop {
        // Drain transport events in arrival order, then render once
        if let Some(ref mut rx) = events {
            while let Ok(event) = rx.try_recv() {
                app.apply(&event);
            }
        }
        app.sync_view();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle key events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                app.handle_key(key);
            }
        }

        // Fire-and-forget any commands the handlers queued
        for command in app.take_outbox() {
            let sender = sender.clone();
            tokio::spawn(async move {
                sender.send(&command).await;
            });
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
