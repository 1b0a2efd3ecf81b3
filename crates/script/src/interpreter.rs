// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Line-at-a-time build script interpreter.
//!
//! The interpreter is pulled by the agent: each call to
//! [`ScriptInterpreter::next_command`] consumes lines until one produces
//! something to dispatch. Configuration lines update [`ScriptConfig`] in
//! place and come back as [`CommandToken::Config`].

use std::path::Path;

use forge_core::ErrorKind;

use crate::config::ScriptConfig;
use crate::directive::{self, Directive};
use crate::token::CommandToken;

/// One interpreted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub token: CommandToken,
    /// Trimmed text after the keyword. For errors, the offending line.
    pub args: String,
    /// 1-based line number; 0 for synthetic tokens
    pub line: usize,
}

impl ParsedLine {
    pub fn synthetic(token: CommandToken) -> Self {
        Self { token, args: String::new(), line: 0 }
    }
}

pub struct ScriptInterpreter {
    lines: Option<Vec<String>>,
    cursor: usize,
    exhausted: bool,
    error: ErrorKind,
    config: ScriptConfig,
    status_echo: Option<String>,
}

impl ScriptInterpreter {
    pub fn new(source: &str, config: ScriptConfig) -> Self {
        Self {
            lines: Some(source.lines().map(str::to_string).collect()),
            cursor: 0,
            exhausted: false,
            error: ErrorKind::None,
            config,
            status_echo: None,
        }
    }

    /// An interpreter with no script; the first command is a `NoScript` error.
    pub fn missing(config: ScriptConfig) -> Self {
        Self {
            lines: None,
            cursor: 0,
            exhausted: false,
            error: ErrorKind::None,
            config,
            status_echo: None,
        }
    }

    /// Load a script from disk. Unreadable scripts behave like missing ones.
    pub fn open(path: &Path, config: ScriptConfig) -> Self {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::new(&source, config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "build script not readable");
                Self::missing(config)
            }
        }
    }

    pub fn config(&self) -> &ScriptConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ScriptConfig {
        &mut self.config
    }

    /// Error kind behind the last [`CommandToken::Error`]
    pub fn error_kind(&self) -> ErrorKind {
        self.error
    }

    /// Text of the most recent `status` line, if not yet taken.
    pub fn take_status_echo(&mut self) -> Option<String> {
        self.status_echo.take()
    }

    /// Interpret the next line.
    pub fn next_command(&mut self) -> ParsedLine {
        let Some(lines) = &self.lines else {
            self.error = ErrorKind::NoScript;
            return ParsedLine::synthetic(CommandToken::Error);
        };

        if self.cursor >= lines.len() {
            // End of input submits once, then the run is finished.
            let token = if self.exhausted { CommandToken::Finished } else { CommandToken::Submit };
            self.exhausted = true;
            return ParsedLine::synthetic(token);
        }

        let raw = lines[self.cursor].clone();
        self.cursor += 1;
        self.interpret(&raw, self.cursor)
    }

    fn interpret(&mut self, raw: &str, line: usize) -> ParsedLine {
        let text = raw.trim();
        if text.is_empty() || text.starts_with("//") {
            return ParsedLine { token: CommandToken::Config, args: String::new(), line };
        }

        let (keyword, args) = split_keyword(text);
        let keyword = keyword.to_ascii_lowercase();

        match directive::lookup(&keyword) {
            None => self.illegal(text, line, "unknown directive"),
            Some(Directive::Status) => {
                self.config.status = Some(args.to_string());
                self.status_echo = Some(args.to_string());
                ParsedLine { token: CommandToken::Config, args: args.to_string(), line }
            }
            Some(Directive::Setting(setting)) => {
                match directive::apply(&mut self.config, setting, args) {
                    Ok(()) => {
                        tracing::debug!(line, keyword = %keyword, value = args, "script setting");
                        ParsedLine { token: CommandToken::Config, args: args.to_string(), line }
                    }
                    Err(reason) => self.illegal(text, line, &reason),
                }
            }
            Some(Directive::Action(token)) => ParsedLine { token, args: args.to_string(), line },
        }
    }

    fn illegal(&mut self, text: &str, line: usize, reason: &str) -> ParsedLine {
        tracing::warn!(line, text, reason, "illegal script command");
        self.error = ErrorKind::IllegalCommand;
        ParsedLine { token: CommandToken::Error, args: text.to_string(), line }
    }
}

/// Split a trimmed line into its keyword and trimmed remainder.
fn split_keyword(text: &str) -> (&str, &str) {
    match text.find([' ', '\t']) {
        Some(pos) => (&text[..pos], text[pos..].trim()),
        None => (text, ""),
    }
}

#[cfg(test)]
#[path = "interpreter_tests.rs"]
mod tests;
