// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{BuildJob, ChangeList, JobId, JobStatus};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for changelists and depot paths.
pub mod strategies {
    use crate::ChangeList;
    use proptest::prelude::*;

    /// Content file extensions that never trigger code CI.
    pub const CONTENT_EXTENSIONS: &[&str] =
        &["upk", "umap", "mobile", "sword", "gear", "nano", "nanomobile", "ut3", "udk"];

    fn arb_segment() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_]{0,10}"
    }

    /// A depot path under `//depot/<branch>/` with 1-4 directory levels.
    pub fn arb_depot_path(branch: &'static str) -> impl Strategy<Value = String> {
        (
            prop::collection::vec(arb_segment(), 1..4),
            arb_segment(),
            prop_oneof![Just("cpp"), Just("h"), Just("uc"), Just("ini"), Just("txt")],
        )
            .prop_map(move |(dirs, stem, ext)| {
                format!("//depot/{}/{}/{}.{}", branch, dirs.join("/"), stem, ext)
            })
    }

    /// A depot path to a content package anywhere in the branch.
    pub fn arb_content_path(branch: &'static str) -> impl Strategy<Value = String> {
        (
            prop::collection::vec(arb_segment(), 0..4),
            arb_segment(),
            prop::sample::select(CONTENT_EXTENSIONS),
        )
            .prop_map(move |(dirs, stem, ext)| {
                let mut path = format!("//depot/{}/", branch);
                for dir in dirs {
                    path.push_str(&dir);
                    path.push('/');
                }
                format!("{}{}.{}", path, stem, ext)
            })
    }

    pub fn arb_changelist(branch: &'static str) -> impl Strategy<Value = ChangeList> {
        (1i64..100_000, prop::collection::vec(arb_depot_path(branch), 0..8))
            .prop_map(|(number, files)| ChangeList::new(number).with_files(files))
    }
}

// ── Record factories ─────────────────────────────────────────────────

/// A changelist touching the given depot paths.
pub fn changelist(number: i64, files: &[&str]) -> ChangeList {
    ChangeList::new(number).with_files(files.iter().copied())
}

/// A finished CI job row as the health scan sees it.
pub fn ci_result(id: i64, name: &str, branch: &str, changelist: i64, succeeded: bool) -> BuildJob {
    BuildJob::builder()
        .id(JobId::new(id))
        .name(name)
        .branch(branch)
        .label(changelist.to_string())
        .status(JobStatus::Dead)
        .complete(true)
        .succeeded(succeeded)
        .build()
}
