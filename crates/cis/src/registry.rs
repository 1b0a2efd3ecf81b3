// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed set of CI tasks, in scan order.

use std::str::FromStr;

use forge_core::CommandDefinition;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable identity of a CI task. The display form is the task's name in
/// job names, script names, and watermark keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskId {
    Example,
    Mobile,
    Gear,
    Nano,
    NanoMobile,
    Sword,
    Udk,
    SonyPs3,
    Xbox360,
    MobileDevice,
    Tools,
}

forge_core::simple_display! {
    TaskId {
        Example => "Example",
        Mobile => "Mobile",
        Gear => "Gear",
        Nano => "Nano",
        NanoMobile => "NanoMobile",
        Sword => "Sword",
        Udk => "UDK",
        SonyPs3 => "SonyPS3",
        Xbox360 => "Xbox360",
        MobileDevice => "MobileDevice",
        Tools => "Tools",
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown CIS task `{0}`")]
pub struct ParseTaskError(pub String);

impl FromStr for TaskId {
    type Err = ParseTaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseTaskError(s.to_string()))
    }
}

const CONSOLES: &[TaskId] = &[TaskId::SonyPs3, TaskId::Xbox360];
const HANDHELD: &[TaskId] = &[TaskId::MobileDevice];

/// Static description of one CI task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDef {
    pub id: TaskId,
    pub game_specific: bool,
    pub platform_specific: bool,
    pub compile_allowed: bool,
    /// Folders (relative to the workspace root) that must exist for the
    /// task to run on this machine
    pub watch_folders: &'static [&'static str],
    /// Game tasks: prefix under `Development/Src/` owning the game's code.
    /// Other tasks: directory names under `Development/Src/` they build.
    pub source_dirs: &'static [&'static str],
    /// `(source dir, subfolder)` pairs built by the Tools task instead
    pub tools_dirs: &'static [(&'static str, &'static str)],
    /// Game tasks: top-level game folder holding `Config/Default*.ini`
    pub game_dir: Option<&'static str>,
    /// Tasks whose build always includes this game's code
    pub built_by: &'static [TaskId],
}

const fn game(id: TaskId, prefix: &'static [&'static str], dir: &'static str, watch: &'static [&'static str], built_by: &'static [TaskId]) -> TaskDef {
    TaskDef {
        id,
        game_specific: true,
        platform_specific: false,
        compile_allowed: true,
        watch_folders: watch,
        source_dirs: prefix,
        tools_dirs: &[],
        game_dir: Some(dir),
        built_by,
    }
}

static EXAMPLE: TaskDef = game(TaskId::Example, &["Example"], "ExampleGame", &["ExampleGame"], CONSOLES);
static MOBILE: TaskDef = game(TaskId::Mobile, &["Mobile"], "MobileGame", &["MobileGame"], HANDHELD);
static GEAR: TaskDef = game(TaskId::Gear, &["Gear"], "GearGame", &["GearGame"], CONSOLES);
static NANO: TaskDef = game(TaskId::Nano, &["Nano"], "NanoGame", &["NanoGame"], CONSOLES);
static NANO_MOBILE: TaskDef =
    game(TaskId::NanoMobile, &["NanoMobile"], "NanoMobileGame", &["NanoMobileGame"], HANDHELD);
static SWORD: TaskDef = game(TaskId::Sword, &["Sword"], "SwordGame", &["SwordGame"], HANDHELD);
static UDK: TaskDef = game(TaskId::Udk, &["UDK"], "UDKGame", &["UDKGame"], CONSOLES);

static SONY_PS3: TaskDef = TaskDef {
    id: TaskId::SonyPs3,
    game_specific: false,
    platform_specific: true,
    compile_allowed: true,
    watch_folders: &["Development/Src/PS3"],
    source_dirs: &["PS3"],
    tools_dirs: &[("PS3", "PS3Tools")],
    game_dir: None,
    built_by: &[],
};

static XBOX360: TaskDef = TaskDef {
    id: TaskId::Xbox360,
    game_specific: false,
    platform_specific: true,
    compile_allowed: true,
    watch_folders: &["Development/Src/Xenon"],
    source_dirs: &["Xenon"],
    tools_dirs: &[("Xenon", "XeTools")],
    game_dir: None,
    built_by: &[],
};

static MOBILE_DEVICE: TaskDef = TaskDef {
    id: TaskId::MobileDevice,
    game_specific: false,
    platform_specific: false,
    compile_allowed: true,
    watch_folders: &["Development/Src/IPhone", "Development/Src/Android"],
    source_dirs: &["IPhone", "Android", "ES2Drv"],
    tools_dirs: &[("IPhone", "IPhoneTools"), ("Android", "AndroidTools")],
    game_dir: None,
    built_by: &[],
};

static TOOLS: TaskDef = TaskDef {
    id: TaskId::Tools,
    game_specific: false,
    platform_specific: false,
    compile_allowed: true,
    watch_folders: &[],
    source_dirs: &[],
    tools_dirs: &[],
    game_dir: None,
    built_by: &[],
};

impl TaskId {
    /// Every task, in the order scans visit them.
    pub const ALL: [TaskId; 11] = [
        TaskId::Example,
        TaskId::Mobile,
        TaskId::Gear,
        TaskId::Nano,
        TaskId::NanoMobile,
        TaskId::Sword,
        TaskId::Udk,
        TaskId::SonyPs3,
        TaskId::Xbox360,
        TaskId::MobileDevice,
        TaskId::Tools,
    ];

    pub fn def(self) -> &'static TaskDef {
        match self {
            TaskId::Example => &EXAMPLE,
            TaskId::Mobile => &MOBILE,
            TaskId::Gear => &GEAR,
            TaskId::Nano => &NANO,
            TaskId::NanoMobile => &NANO_MOBILE,
            TaskId::Sword => &SWORD,
            TaskId::Udk => &UDK,
            TaskId::SonyPs3 => &SONY_PS3,
            TaskId::Xbox360 => &XBOX360,
            TaskId::MobileDevice => &MOBILE_DEVICE,
            TaskId::Tools => &TOOLS,
        }
    }

    /// Per-game script tasks.
    pub fn games() -> impl Iterator<Item = TaskId> {
        TaskId::ALL.into_iter().filter(|id| id.def().game_specific)
    }

    /// `CIS Code Builder (<Task>)`, also the key the health scan matches on.
    pub fn job_name(self) -> String {
        format!("CIS Code Builder ({})", self)
    }
}

impl TaskDef {
    /// The build this task queues.
    pub fn command(&self) -> CommandDefinition {
        let name = self.id.to_string();
        CommandDefinition {
            platform: if self.platform_specific { name.clone() } else { "Win32".to_string() },
            game: if self.game_specific { name.clone() } else { "All".to_string() },
            configuration: "Release".to_string(),
            script: format!("Jobs/CISCodeBuilder{}", name),
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
