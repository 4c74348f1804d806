#![forbid(unsafe_code)]

mod config;
mod constants;
mod controller;
mod engine;
mod error;
mod gui;
mod hotkeys;
mod input;
mod location_picker;
mod logging;
mod notifications;
mod types;
mod updater;
mod x11_utils;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::{mpsc, Arc, OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use config::ConfigStore;
use constants::app;
use controller::AppController;
use engine::ClickEngine;
use gui::GuiOptions;
use hotkeys::{HotkeyListener, X11HotkeyGrabber};
use input::X11Input;
use x11_utils::X11Context;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file to use instead of the per-user default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// trace, debug, info, warn or error (defaults to LOG_LEVEL, then info)
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Skip the release check at startup
    #[arg(long)]
    no_update_check: bool,
}

/// SIGINT/SIGTERM set the flag; the window notices it on its next frame
fn register_signals() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag))
            .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }
    Ok(flag)
}

fn run(args: Args) -> Result<()> {
    let close_requested = register_signals()?;

    let x11 = X11Context::connect().context("Cannot start without an X11 display")?;
    info!(
        width = x11.screen_width,
        height = x11.screen_height,
        "Connected to X11"
    );

    let store = ConfigStore::new(args.config.unwrap_or_else(ConfigStore::default_path));
    info!(path = ?store.path(), "Using settings file");

    // Background threads wake the window through this once it exists
    let repaint_handle: Arc<OnceLock<egui::Context>> = Arc::new(OnceLock::new());

    let grabber = X11HotkeyGrabber::new(&x11);
    let (hotkey_tx, hotkey_rx) = mpsc::channel();
    let pump_handle = Arc::clone(&repaint_handle);
    let _pump = grabber.spawn_event_pump(hotkey_tx, move || {
        if let Some(ctx) = pump_handle.get() {
            ctx.request_repaint();
        }
    });

    let engine = ClickEngine::new(Box::new(X11Input::new(&x11)));
    let hotkeys = HotkeyListener::new(Box::new(grabber));
    let controller = AppController::new(store, engine, hotkeys, hotkey_rx);

    gui::run_gui(
        controller,
        GuiOptions {
            screen_px: (x11.screen_width, x11.screen_height),
            close_requested,
            check_updates: !args.no_update_check,
            repaint_handle,
        },
    )
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = logging::init(logging::resolve_level(args.log_level.as_deref()));
    info!(version = app::VERSION, "Starting {}", app::NAME);

    match run(args) {
        Ok(()) => {
            info!("Exited normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %format!("{:#}", e), "Startup failed");
            eprintln!("{}: {:#}", app::NAME, e);
            ExitCode::FAILURE
        }
    }
}
