// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level scenarios: the CIS scanner, the job store and the build
//! agent working together.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/ci_cycle.rs"]
mod ci_cycle;

#[path = "specs/shared_store.rs"]
mod shared_store;
