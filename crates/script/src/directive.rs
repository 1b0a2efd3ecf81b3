// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyword table and configuration setters.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ScriptConfig;
use crate::token::CommandToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    Action(CommandToken),
    Setting(Setting),
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Setting {
    Platform,
    Configuration,
    Game,
    ClientSpec,
    Timeout,
    CheckErrors,
    CheckWarnings,
    MsvcTool,
    MakeTool,
    GameTool,
    FailAddress,
    SuccessAddress,
}

const KEYWORDS: &[(&str, Directive)] = &[
    ("status", Directive::Status),
    ("platform", Directive::Setting(Setting::Platform)),
    ("buildconfig", Directive::Setting(Setting::Configuration)),
    ("configuration", Directive::Setting(Setting::Configuration)),
    ("game", Directive::Setting(Setting::Game)),
    ("clientspec", Directive::Setting(Setting::ClientSpec)),
    ("timeout", Directive::Setting(Setting::Timeout)),
    ("checkerrors", Directive::Setting(Setting::CheckErrors)),
    ("checkwarnings", Directive::Setting(Setting::CheckWarnings)),
    ("msvcapplication", Directive::Setting(Setting::MsvcTool)),
    ("makeapplication", Directive::Setting(Setting::MakeTool)),
    ("gameapplication", Directive::Setting(Setting::GameTool)),
    ("failaddress", Directive::Setting(Setting::FailAddress)),
    ("successaddress", Directive::Setting(Setting::SuccessAddress)),
    ("sync", Directive::Action(CommandToken::Sync)),
    ("checkout", Directive::Action(CommandToken::Checkout)),
    ("revert", Directive::Action(CommandToken::Revert)),
    ("getchanges", Directive::Action(CommandToken::GetChanges)),
    ("submit", Directive::Action(CommandToken::Submit)),
    ("msvcclean", Directive::Action(CommandToken::MsvcClean)),
    ("msvcbuild", Directive::Action(CommandToken::MsvcBuild)),
    ("msvcfull", Directive::Action(CommandToken::MsvcFull)),
    ("gccclean", Directive::Action(CommandToken::GccClean)),
    ("gccbuild", Directive::Action(CommandToken::GccBuild)),
    ("gccfull", Directive::Action(CommandToken::GccFull)),
    ("buildscript", Directive::Action(CommandToken::BuildScript)),
    ("cook", Directive::Action(CommandToken::Cook)),
    ("cookmaps", Directive::Action(CommandToken::Cook)),
];

/// Look up an already-lowercased keyword.
pub(crate) fn lookup(keyword: &str) -> Option<Directive> {
    KEYWORDS.iter().find(|(k, _)| *k == keyword).map(|(_, d)| *d)
}

/// Apply a configuration directive. The error is a short reason for the log.
pub(crate) fn apply(config: &mut ScriptConfig, setting: Setting, value: &str) -> Result<(), String> {
    match setting {
        Setting::Platform => config.platform = required(value)?,
        Setting::Configuration => config.configuration = required(value)?,
        Setting::Game => config.game = required(value)?,
        Setting::ClientSpec => config.client_spec = Some(required(value)?),
        Setting::Timeout => {
            let minutes: u64 =
                value.parse().map_err(|_| format!("timeout expects minutes, got `{}`", value))?;
            let secs = minutes
                .checked_mul(60)
                .ok_or_else(|| format!("timeout of {} minutes is out of range", minutes))?;
            config.timeout = Duration::from_secs(secs);
        }
        Setting::CheckErrors => config.check_errors = toggle(value)?,
        Setting::CheckWarnings => config.check_warnings = toggle(value)?,
        Setting::MsvcTool => config.tools.msvc = Some(PathBuf::from(required(value)?)),
        Setting::MakeTool => config.tools.make = Some(PathBuf::from(required(value)?)),
        Setting::GameTool => config.tools.game = Some(PathBuf::from(required(value)?)),
        Setting::FailAddress => config.fail_addresses = addresses(value),
        Setting::SuccessAddress => config.success_addresses = addresses(value),
    }
    Ok(())
}

fn required(value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err("missing value".to_string())
    } else {
        Ok(value.to_string())
    }
}

/// Bare toggle keywords mean "on".
fn toggle(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "" | "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(format!("expected on/off, got `{}`", other)),
    }
}

fn addresses(value: &str) -> Vec<String> {
    value
        .split([';', ',', ' ', '\t'])
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "directive_tests.rs"]
mod tests;
