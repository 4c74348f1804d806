//! Logging setup: stderr plus an append-only file under the local data dir

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::paths;

/// Map a level name to a tracing level, defaulting to INFO
pub fn parse_level(name: &str) -> Level {
    match name.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// `--log-level`, then `LOG_LEVEL`, then info
pub fn resolve_level(cli: Option<&str>) -> Level {
    match cli {
        Some(name) => parse_level(name),
        None => parse_level(&std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string())),
    }
}

/// `<data local dir>/slickclick`
pub fn log_dir() -> PathBuf {
    let mut dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.push(paths::APP_DIR);
    dir
}

fn directives(level: Level) -> String {
    // Dependencies stay quieter than our own debug output
    let level = level.as_str().to_lowercase();
    format!("{level},x11rb=warn,winit=warn,eframe=info,egui_glow=warn,reqwest=info,hyper=info")
}

fn file_appender() -> Result<RollingFileAppender> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create log directory {:?}", dir))?;
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(paths::LOG_FILENAME)
        .build(&dir)
        .with_context(|| format!("Failed to open log file in {:?}", dir))
}

/// Install the global subscriber
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process. Without a writable log dir only stderr is used.
pub fn init(level: Level) -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard, file_error) = match file_appender() {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(directives(level)))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = installed {
        eprintln!("Failed to install log subscriber: {e}");
    }
    if let Some(e) = file_error {
        tracing::warn!(error = %format!("{:#}", e), "File logging disabled");
    }
    guard
}
