// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mutable run configuration for one script.

use std::path::PathBuf;
use std::time::Duration;

/// Tool executables used by spawned steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPaths {
    pub msvc: Option<PathBuf>,
    pub make: Option<PathBuf>,
    pub game: Option<PathBuf>,
}

/// Everything a script may change while it runs, plus what the run
/// accumulates (checked-out files, the synced changelist).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptConfig {
    pub platform: String,
    pub configuration: String,
    pub game: String,
    pub client_spec: Option<String>,
    pub timeout: Duration,
    pub check_errors: bool,
    pub check_warnings: bool,
    pub tools: ToolPaths,
    pub fail_addresses: Vec<String>,
    pub success_addresses: Vec<String>,
    /// Last `status` echo
    pub status: Option<String>,
    /// Files opened for edit this run; reverted on exit unless submitted
    pub checked_out: Vec<String>,
    /// Changelist the workspace was last synced to
    pub most_recent_build: Option<i64>,
    /// Change summaries gathered by `getchanges`
    pub changes: Vec<String>,
}

impl ScriptConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10 * 60);

    pub fn timeout_minutes(&self) -> u64 {
        self.timeout.as_secs() / 60
    }

    /// Record files opened for edit, skipping duplicates.
    pub fn add_checked_out<I: IntoIterator<Item = String>>(&mut self, files: I) {
        for file in files {
            if !self.checked_out.contains(&file) {
                self.checked_out.push(file);
            }
        }
    }

    /// Hand back every checked-out file, leaving the list empty.
    pub fn take_checked_out(&mut self) -> Vec<String> {
        std::mem::take(&mut self.checked_out)
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            platform: "Win32".to_string(),
            configuration: "Release".to_string(),
            game: "All".to_string(),
            client_spec: None,
            timeout: Self::DEFAULT_TIMEOUT,
            check_errors: true,
            check_warnings: false,
            tools: ToolPaths::default(),
            fail_addresses: Vec::new(),
            success_addresses: Vec::new(),
            status: None,
            checked_out: Vec::new(),
            most_recent_build: None,
            changes: Vec::new(),
        }
    }
}
