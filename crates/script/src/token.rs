// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command tokens produced by the interpreter.

use serde::{Deserialize, Serialize};

/// What a script line asks the agent to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandToken {
    /// Script could not continue; the interpreter's error kind says why
    Error,
    /// Configuration or comment line; nothing to dispatch
    Config,
    /// Script exhausted and submitted
    Finished,
    Submit,
    Sync,
    Checkout,
    Revert,
    GetChanges,
    MsvcClean,
    MsvcBuild,
    MsvcFull,
    GccClean,
    GccBuild,
    GccFull,
    BuildScript,
    Cook,
}

forge_core::simple_display! {
    CommandToken {
        Error => "error",
        Config => "config",
        Finished => "finished",
        Submit => "submit",
        Sync => "sync",
        Checkout => "checkout",
        Revert => "revert",
        GetChanges => "getchanges",
        MsvcClean => "msvcclean",
        MsvcBuild => "msvcbuild",
        MsvcFull => "msvcfull",
        GccClean => "gccclean",
        GccBuild => "gccbuild",
        GccFull => "gccfull",
        BuildScript => "buildscript",
        Cook => "cook",
    }
}

impl CommandToken {
    /// Steps that talk to revision control rather than launch a tool.
    pub fn is_source_control(self) -> bool {
        matches!(
            self,
            CommandToken::Sync
                | CommandToken::Checkout
                | CommandToken::Revert
                | CommandToken::GetChanges
                | CommandToken::Submit
        )
    }

    /// Steps that spawn an external tool and need monitoring.
    pub fn launches_tool(self) -> bool {
        matches!(
            self,
            CommandToken::MsvcClean
                | CommandToken::MsvcBuild
                | CommandToken::GccClean
                | CommandToken::GccBuild
                | CommandToken::BuildScript
                | CommandToken::Cook
        )
    }

    /// Composite commands run as a clean followed by a build.
    pub fn split_composite(self) -> Option<(CommandToken, CommandToken)> {
        match self {
            CommandToken::MsvcFull => Some((CommandToken::MsvcClean, CommandToken::MsvcBuild)),
            CommandToken::GccFull => Some((CommandToken::GccClean, CommandToken::GccBuild)),
            _ => None,
        }
    }
}
