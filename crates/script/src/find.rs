// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build script discovery

use std::path::{Path, PathBuf};

/// Extension appended to command references that have none.
pub const SCRIPT_EXTENSION: &str = "build";

/// Resolve a job's command reference to a script file.
///
/// `Jobs/CISCodeBuilderGear` becomes `<scripts_dir>/Jobs/CISCodeBuilderGear.build`;
/// references that already carry an extension are used as-is.
pub fn script_path(scripts_dir: &Path, command: &str) -> PathBuf {
    let relative = Path::new(command.trim().trim_start_matches(['/', '\\']));
    let path = scripts_dir.join(relative);
    if relative.extension().is_some() {
        path
    } else {
        path.with_extension(SCRIPT_EXTENSION)
    }
}

/// Command references for every script under `scripts_dir`, sorted.
///
/// Unreadable directories are skipped.
pub fn list_scripts(scripts_dir: &Path) -> Vec<String> {
    let mut found = Vec::new();
    collect(scripts_dir, scripts_dir, &mut found);
    found.sort();
    found
}

fn collect(root: &Path, dir: &Path, found: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(root, &path, found);
        } else if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
            if let Ok(relative) = path.with_extension("").strip_prefix(root) {
                let reference: Vec<_> =
                    relative.components().map(|c| c.as_os_str().to_string_lossy()).collect();
                found.push(reference.join("/"));
            }
        }
    }
}

#[cfg(test)]
#[path = "find_tests.rs"]
mod tests;
