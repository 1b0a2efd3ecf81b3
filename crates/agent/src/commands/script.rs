// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `forge script`: validate and list build scripts.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use forge_core::ErrorKind;
use forge_script::{list_scripts, CommandToken, ParsedLine, ScriptConfig, ScriptInterpreter};

use super::Context;
use crate::exit_error::ExitError;

#[derive(Args)]
pub struct ScriptArgs {
    #[command(subcommand)]
    pub command: ScriptCommand,
}

#[derive(Subcommand)]
pub enum ScriptCommand {
    /// Interpret a script without running it and report the first bad line
    Check {
        /// Script file
        file: PathBuf,
    },
    /// List command references for every script in the scripts directory
    List {},
}

/// What a dry interpretation of a script produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Dispatchable lines, in order
    pub steps: Vec<ParsedLine>,
    /// First line the interpreter rejected
    pub error: Option<(ErrorKind, ParsedLine)>,
}

/// Interpret `source` to the end, stopping at the first error.
pub fn check(source: &str) -> CheckReport {
    let mut interpreter = ScriptInterpreter::new(source, ScriptConfig::default());
    let mut steps = Vec::new();
    loop {
        let line = interpreter.next_command();
        match line.token {
            CommandToken::Config => {}
            CommandToken::Finished => return CheckReport { steps, error: None },
            CommandToken::Error => return CheckReport { steps, error: Some((interpreter.error_kind(), line)) },
            _ => steps.push(line),
        }
    }
}

pub fn handle(command: ScriptCommand, ctx: &Context) -> Result<()> {
    match command {
        ScriptCommand::Check { file } => check_file(&file),
        ScriptCommand::List {} => {
            let dir = ctx.config.scripts_dir(&ctx.paths);
            let scripts = list_scripts(&dir);
            if scripts.is_empty() {
                println!("No scripts under {}", dir.display());
            }
            for script in scripts {
                println!("{}", script);
            }
            Ok(())
        }
    }
}

fn check_file(file: &Path) -> Result<()> {
    let source = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let report = check(&source);
    for step in &report.steps {
        if step.line == 0 {
            println!("  end: {}", step.token);
        } else {
            println!("{:>5}: {} {}", step.line, step.token, step.args);
        }
    }
    match report.error {
        None => {
            println!("{}: ok ({} steps)", file.display(), report.steps.len());
            Ok(())
        }
        Some((kind, line)) => Err(ExitError::failed(format!(
            "{}:{}: {}: {}",
            file.display(),
            line.line,
            kind,
            line.args
        ))
        .into()),
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
