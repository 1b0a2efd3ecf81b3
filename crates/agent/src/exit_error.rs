// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit statuses for command failures that are not program errors.
//!
//! Commands return `ExitError` rather than calling `std::process::exit()`
//! so `main()` owns process termination.

use thiserror::Error;

/// A check or lookup came back negative (bad script, unknown job)
pub const EXIT_FAILED: i32 = 1;
/// Another agent holds the state directory
pub const EXIT_LOCKED: i32 = 2;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(EXIT_FAILED, message)
    }
}
