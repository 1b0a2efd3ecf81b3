// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-adapters: boundaries to revision control, notification, and tools

pub mod notify;
pub mod process;
pub mod scc;

pub use notify::{
    DesktopNotifyAdapter, Notification, NotificationKind, NotifyAdapter, NotifyError,
    OutboxNotifyAdapter,
};
pub use process::{
    ProcessAdapter, ProcessError, ProcessExit, ProcessHandle, SpawnSpec, TokioProcessAdapter,
    TokioProcessHandle,
};
pub use scc::{LabelInfo, P4CliAdapter, SccAdapter, SccError};

#[cfg(any(test, feature = "test-support"))]
pub use notify::FakeNotifyAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use process::{FakeProcessAdapter, FakeProcessHandle, FakeRun};
#[cfg(any(test, feature = "test-support"))]
pub use scc::{FakeSccAdapter, SccCall};
