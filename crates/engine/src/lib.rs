// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-engine: the build agent's state machine and the pieces it drives

pub mod agent;
pub mod classifier;
pub mod dispatcher;
mod error;
pub mod job_logger;
pub mod log_paths;
pub mod messages;
pub mod supervisor;

pub use agent::{last_good_key, Agent, AgentDeps, AgentSettings, Mode, HEARTBEAT_INTERVAL};
pub use classifier::{ClassifyMode, LogClassifier, Signatures, SUCCEEDED};
pub use dispatcher::{Dispatch, Dispatcher, StepContext};
pub use error::AgentError;
pub use job_logger::JobLogger;
pub use messages::{builder_subject, cis_fixed_subject, failure_message, BuildAction, FailedStep};
pub use supervisor::{Finish, ProcessSupervisor};
