// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed status messages and notification subjects.

use forge_core::{ErrorCategory, ErrorKind};
use forge_script::CommandToken;

use crate::classifier::SUCCEEDED;

/// Detail used when a failed tool left nothing recognizable in its log.
pub const COULD_NOT_FIND_ERROR: &str = "Could not find error";

/// The step a failure is reported against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedStep<'a> {
    pub token: CommandToken,
    pub args: &'a str,
}

impl FailedStep<'_> {
    fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.token.to_string()
        } else {
            format!("{} {}", self.token, self.args)
        }
    }
}

/// Build the status message for a failed step.
///
/// `detail` is the classifier's output for the step log; pass
/// [`SUCCEEDED`] when nothing matched.
pub fn failure_message(kind: ErrorKind, step: &FailedStep<'_>, detail: &str, timeout_minutes: u64) -> String {
    let found = (detail != SUCCEEDED && !detail.is_empty()).then_some(detail);
    match kind.category() {
        ErrorCategory::None => detail.to_string(),
        ErrorCategory::Script if kind == ErrorKind::NoScript => "No build script".to_string(),
        ErrorCategory::Script => format!("Illegal command: '{}'", step.args),
        ErrorCategory::SourceControl => {
            let mut msg = format!("{} failed with error '{}'", step.command_line(), kind);
            if let Some(detail) = found {
                msg.push_str("\n\n");
                msg.push_str(detail);
            }
            msg
        }
        ErrorCategory::Process if kind == ErrorKind::TimedOut => format!(
            "'{}' TIMED OUT after {} minutes\n(This normally means a child process crashed)\n\n{}",
            step.command_line(),
            timeout_minutes,
            found.unwrap_or(COULD_NOT_FIND_ERROR)
        ),
        ErrorCategory::Process => format!(
            "'{}' failed\n\n{}",
            step.command_line(),
            found.unwrap_or(COULD_NOT_FIND_ERROR)
        ),
    }
}

/// What a builder notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Failed,
    Succeeded,
    Killed,
}

forge_core::simple_display! {
    BuildAction {
        Failed => "FAILED",
        Succeeded => "SUCCEEDED",
        Killed => "KILLED",
    }
}

/// `[BUILDER][<branch>][<game>][<platform>][<ACTION>] <job name>`
pub fn builder_subject(branch: &str, game: &str, platform: &str, action: BuildAction, job_name: &str) -> String {
    format!("[BUILDER][{}][{}][{}][{}] {}", branch, game, platform, action, job_name)
}

/// `[CIS][<branch>][FIXED] Fixed in changelist <n>`
pub fn cis_fixed_subject(branch: &str, changelist: i64) -> String {
    format!("[CIS][{}][FIXED] Fixed in changelist {}", branch, changelist)
}

#[cfg(test)]
#[path = "messages_tests.rs"]
mod tests;
