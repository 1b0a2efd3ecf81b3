// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-cis: continuous integration scanner
//!
//! Maps submitted changelists to the CI tasks they can break, queues a
//! build per dirty task, and keeps a last-good/last-failed changelist per
//! task so the branch's health can be reported.

mod classify;
mod error;
mod health;
mod registry;
mod scan;
pub mod watermarks;

pub use classify::{ChangeClassifier, DirtySet};
pub use error::CisError;
pub use health::{evaluate, update_last_good_and_failed, Baseline, TaskHealth, STALENESS_HORIZON};
pub use registry::{ParseTaskError, TaskDef, TaskId};
pub use scan::{CisDeps, CisEngine, CisSettings, MonitorReport, ScanMode, ScanReport, SpawnedTask};
