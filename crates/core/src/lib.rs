// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-core: shared types for the forge build agent and CIS scanner

pub mod macros;

pub mod build_log;
pub mod changelist;
pub mod clock;
pub mod error;
pub mod field;
pub mod id;
pub mod job;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use build_log::BuildLogRecord;
pub use changelist::{ChangeList, CommandDefinition};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{ErrorCategory, ErrorKind};
pub use field::{FieldValue, Table};
pub use id::{BuildLogId, JobId, PollSignal};
#[cfg(any(test, feature = "test-support"))]
pub use job::BuildJobBuilder;
pub use job::{BuildJob, JobOutcome, JobStatus, NewJob, ParseStatusError};
