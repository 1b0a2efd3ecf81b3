// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber for the forge binary.
//!
//! Compact lines go to stderr. `forge run` also writes a daily-rotated
//! `<state_dir>/logs/forge.log`; the returned guard flushes it on drop.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::env;

/// Log file name prefix inside the logs directory
pub const LOG_FILE: &str = "forge.log";

fn filter() -> EnvFilter {
    EnvFilter::try_new(env::log_filter()).unwrap_or_else(|_| EnvFilter::new(env::DEFAULT_LOG_FILTER))
}

/// Stderr only, for one-shot commands.
pub fn init_stderr() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}

/// Stderr plus the rotating file under `logs_dir`.
pub fn init_with_file(logs_dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;
    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    Ok(guard)
}
