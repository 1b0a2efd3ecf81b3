// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pass/fail classification of captured tool logs.
//!
//! A log passes when no line matches an enabled signature. Separator
//! lines are kept for context around matches but never fail a log on
//! their own.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Status returned for a clean log.
pub const SUCCEEDED: &str = "Succeeded";

/// Substrings that mark a log line as an error, warning, or separator.
/// Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Signatures {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub separator: String,
}

impl Default for Signatures {
    fn default() -> Self {
        Self {
            errors: vec![
                " : error".to_string(),
                ": error:".to_string(),
                ": fatal error".to_string(),
                "Error,".to_string(),
            ],
            warnings: vec![" : warning".to_string(), ": warning:".to_string()],
            separator: "------".to_string(),
        }
    }
}

/// Which signatures apply to one classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassifyMode {
    pub check_errors: bool,
    pub check_warnings: bool,
    /// Keep every line (revision-control failures report the whole log)
    pub report_all: bool,
}

impl ClassifyMode {
    pub fn checks(check_errors: bool, check_warnings: bool) -> Self {
        Self { check_errors, check_warnings, report_all: false }
    }

    pub fn full_log() -> Self {
        Self { report_all: true, ..Self::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogClassifier {
    signatures: Signatures,
}

impl LogClassifier {
    pub fn new(signatures: Signatures) -> Self {
        Self { signatures }
    }

    /// [`SUCCEEDED`] when nothing matched, otherwise the matched lines.
    pub fn classify(&self, text: &str, mode: ClassifyMode) -> String {
        let mut kept = Vec::new();
        let mut failed = false;

        for line in text.lines() {
            let line = line.trim_end();
            if self.is_separator(line) {
                kept.push(line);
                continue;
            }
            let matched = (mode.report_all && !line.is_empty())
                || (mode.check_errors && contains_any(line, &self.signatures.errors))
                || (mode.check_warnings && contains_any(line, &self.signatures.warnings));
            if matched {
                kept.push(line);
                failed = true;
            }
        }

        if failed {
            kept.join("\n")
        } else {
            SUCCEEDED.to_string()
        }
    }

    /// Classify a log file. A missing or unreadable log reads as empty.
    pub fn classify_file(&self, path: &Path, mode: ClassifyMode) -> String {
        match std::fs::read(path) {
            Ok(bytes) => self.classify(&String::from_utf8_lossy(&bytes), mode),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no step log to classify");
                SUCCEEDED.to_string()
            }
        }
    }

    fn is_separator(&self, line: &str) -> bool {
        !self.signatures.separator.is_empty() && line.contains(self.signatures.separator.as_str())
    }
}

fn contains_any(line: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && line.contains(n.as_str()))
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
