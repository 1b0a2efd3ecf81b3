// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-script: build script interpreter
//!
//! Scripts are plain text, one directive per line. A directive either
//! changes the run's [`ScriptConfig`] or names an action for the agent to
//! dispatch; [`ScriptInterpreter`] turns lines into [`CommandToken`]s.

mod config;
mod directive;
mod find;
mod interpreter;
mod token;

pub use config::{ScriptConfig, ToolPaths};
pub use find::{list_scripts, script_path, SCRIPT_EXTENSION};
pub use interpreter::{ParsedLine, ScriptInterpreter};
pub use token::CommandToken;
