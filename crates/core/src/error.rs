// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Closed taxonomy of ways a build step can fail.
//!
//! Every failure at a dispatch site maps to exactly one [`ErrorKind`]; the
//! agent's finalise step is the only place a kind becomes a message.

use serde::{Deserialize, Serialize};

/// Coarse grouping of error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    None,
    /// The build script itself is missing or malformed
    Script,
    /// A revision-control operation failed
    SourceControl,
    /// An external tool failed or hung
    Process,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[default]
    None,
    NoScript,
    IllegalCommand,
    SccSync,
    SccCheckout,
    SccSubmit,
    SccRevert,
    SccGetChanges,
    SccGetClientRoot,
    Process,
    TimedOut,
}

crate::simple_display! {
    ErrorKind {
        None => "None",
        NoScript => "NoScript",
        IllegalCommand => "IllegalCommand",
        SccSync => "SCC_Sync",
        SccCheckout => "SCC_Checkout",
        SccSubmit => "SCC_Submit",
        SccRevert => "SCC_Revert",
        SccGetChanges => "SCC_GetChanges",
        SccGetClientRoot => "SCC_GetClientRoot",
        Process => "Process",
        TimedOut => "TimedOut",
    }
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::None,
        ErrorKind::NoScript,
        ErrorKind::IllegalCommand,
        ErrorKind::SccSync,
        ErrorKind::SccCheckout,
        ErrorKind::SccSubmit,
        ErrorKind::SccRevert,
        ErrorKind::SccGetChanges,
        ErrorKind::SccGetClientRoot,
        ErrorKind::Process,
        ErrorKind::TimedOut,
    ];

    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorKind::None => ErrorCategory::None,
            ErrorKind::NoScript | ErrorKind::IllegalCommand => ErrorCategory::Script,
            ErrorKind::SccSync
            | ErrorKind::SccCheckout
            | ErrorKind::SccSubmit
            | ErrorKind::SccRevert
            | ErrorKind::SccGetChanges
            | ErrorKind::SccGetClientRoot => ErrorCategory::SourceControl,
            ErrorKind::Process | ErrorKind::TimedOut => ErrorCategory::Process,
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorKind::None
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
