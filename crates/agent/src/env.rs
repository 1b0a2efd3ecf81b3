// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the forge binary.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ConfigError;

/// Filter used when `FORGE_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Resolve state directory: FORGE_STATE_DIR > XDG_STATE_HOME/forge > ~/.local/state/forge
pub fn state_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty("FORGE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("forge"));
    }
    let home = dirs::home_dir().ok_or(ConfigError::NoStateDir)?;
    Ok(home.join(".local/state/forge"))
}

/// Config file override
pub fn config_path() -> Option<PathBuf> {
    non_empty("FORGE_CONFIG").map(PathBuf::from)
}

/// Machine name override; wins over `[agent] machine`
pub fn machine() -> Option<String> {
    non_empty("FORGE_MACHINE")
}

/// Name this host reports when nothing is configured.
pub fn host_name() -> String {
    non_empty("HOSTNAME").or_else(|| non_empty("COMPUTERNAME")).unwrap_or_else(|| "localhost".to_string())
}

/// Agent tick override
pub fn tick_interval() -> Option<Duration> {
    non_empty("FORGE_TICK_MS").and_then(|s| s.parse::<u64>().ok()).filter(|ms| *ms > 0).map(Duration::from_millis)
}

/// `EnvFilter` directives for the subscriber
pub fn log_filter() -> String {
    non_empty("FORGE_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

fn non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
