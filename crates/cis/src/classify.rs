// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-impact classification: which tasks a changed file can break.
//!
//! Rules, first match wins (paths relative to `//depot/<branch>/`):
//!
//! ```text
//!   *.uc, *.uci                  Tools, plus the owning game's location rules;
//!                                unowned script marks every game
//!   content packages/maps        nothing
//!   Development/Src/**/*.vcproj  Tools
//!   Engine/Config/Base*.ini      every game
//!   <Game>/Config/Default*.ini   that game
//!   other *.ini                  nothing
//!   Development/Src/<dir>/...    platform task (its *Tools folders: Tools),
//!                                Windows: every game, game prefix: game + its
//!                                console builds, unknown: everything
//!   Development/Tools/...        Tools (UnrealSwarm/Agent: every game)
//!   Engine/..., Development/External/...  everything
//! ```

use std::collections::BTreeSet;

use forge_core::ChangeList;

use crate::registry::{TaskDef, TaskId};

/// Package and map extensions. Content never triggers a code build.
const CONTENT_EXTENSIONS: &[&str] =
    &["upk", "umap", "mobile", "sword", "gear", "nano", "nanomobile", "ut3", "udk"];

const SRC: &str = "Development/Src/";
const TOOLS: &str = "Development/Tools/";
const SWARM_AGENT: &str = "Development/Tools/UnrealSwarm/Agent/";
const EXTERNAL: &str = "Development/External/";
const ENGINE: &str = "Engine/";
const ENGINE_BASE_CONFIG: &str = "Engine/Config/Base";
const WINDOWS: &str = "Windows";
const WINDOWS_TOOLS: &str = "WindowsTools";

/// Tasks marked as needing a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtySet(BTreeSet<TaskId>);

impl DirtySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, task: TaskId) {
        self.0.insert(task);
    }

    pub fn mark_all(&mut self, tasks: impl IntoIterator<Item = TaskId>) {
        self.0.extend(tasks);
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.0.contains(&task)
    }

    /// Clear `task`, reporting whether it was dirty.
    pub fn clear(&mut self, task: TaskId) -> bool {
        self.0.remove(&task)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Dirty tasks in registry order.
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<TaskId> for DirtySet {
    fn from_iter<I: IntoIterator<Item = TaskId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Classifies depot paths for one branch.
#[derive(Debug, Clone)]
pub struct ChangeClassifier {
    branch_root: String,
}

impl ChangeClassifier {
    /// `depot_root` is the depot prefix (`//depot`); files outside
    /// `<depot_root>/<branch>/` are ignored.
    pub fn new(depot_root: &str, branch: &str) -> Self {
        Self { branch_root: format!("{}/{}/", depot_root.trim_end_matches('/'), branch) }
    }

    pub fn classify_changelist(&self, change: &ChangeList) -> DirtySet {
        let mut dirty = DirtySet::new();
        self.mark_changelist(change, &mut dirty);
        dirty
    }

    /// Add every task `change` affects to `dirty`.
    pub fn mark_changelist(&self, change: &ChangeList, dirty: &mut DirtySet) {
        for file in &change.files {
            let before = dirty.len();
            self.mark_file(file, dirty);
            tracing::trace!(changelist = change.number, file, newly_dirty = dirty.len() - before, "classified");
        }
    }

    pub fn mark_file(&self, path: &str, dirty: &mut DirtySet) {
        let Some(rel) = path.strip_prefix(self.branch_root.as_str()) else {
            return;
        };
        let ext = extension(rel);

        if ext == "uc" || ext == "uci" {
            dirty.mark(TaskId::Tools);
            if owning_game(rel.strip_prefix(SRC).unwrap_or_default()).is_none() {
                dirty.mark_all(TaskId::games());
                return;
            }
        } else if CONTENT_EXTENSIONS.contains(&ext.as_str()) {
            return;
        } else if ext == "vcproj" && rel.starts_with(SRC) {
            dirty.mark(TaskId::Tools);
            return;
        } else if ext == "ini" {
            mark_config(rel, dirty);
            return;
        }

        mark_location(rel, dirty);
    }
}

fn mark_config(rel: &str, dirty: &mut DirtySet) {
    if rel.starts_with(ENGINE_BASE_CONFIG) {
        dirty.mark_all(TaskId::games());
        return;
    }
    let owner = TaskId::games().find(|id| {
        id.def()
            .game_dir
            .is_some_and(|dir| rel.strip_prefix(dir).is_some_and(|rest| rest.starts_with("/Config/Default")))
    });
    if let Some(game) = owner {
        dirty.mark(game);
    }
}

fn mark_location(rel: &str, dirty: &mut DirtySet) {
    if let Some(src) = rel.strip_prefix(SRC) {
        mark_source(src, dirty);
    } else if rel.starts_with(SWARM_AGENT) {
        dirty.mark_all(TaskId::games());
    } else if rel.starts_with(TOOLS) {
        dirty.mark(TaskId::Tools);
    } else if rel.starts_with(ENGINE) || rel.starts_with(EXTERNAL) {
        dirty.mark_all(TaskId::ALL);
    }
}

/// `src` is the path below `Development/Src/`.
fn mark_source(src: &str, dirty: &mut DirtySet) {
    let (dir, rest) = src.split_once('/').unwrap_or((src, ""));

    if dir == WINDOWS {
        if rest.starts_with(WINDOWS_TOOLS) {
            dirty.mark(TaskId::Tools);
        } else {
            dirty.mark_all(TaskId::games());
        }
        return;
    }

    let platform = TaskId::ALL
        .into_iter()
        .map(TaskId::def)
        .find(|def| !def.game_specific && def.source_dirs.contains(&dir));
    if let Some(def) = platform {
        if def.tools_dirs.iter().any(|(owner, tools)| *owner == dir && rest.starts_with(tools)) {
            dirty.mark(TaskId::Tools);
        } else {
            dirty.mark(def.id);
        }
        return;
    }

    match owning_game(src) {
        Some(def) => {
            dirty.mark(def.id);
            dirty.mark_all(def.built_by.iter().copied());
        }
        None => dirty.mark_all(TaskId::ALL),
    }
}

/// The game whose source prefix is the longest match for `src`.
fn owning_game(src: &str) -> Option<&'static TaskDef> {
    TaskId::games()
        .map(TaskId::def)
        .filter_map(|def| {
            def.source_dirs
                .iter()
                .filter(|prefix| src.starts_with(*prefix))
                .map(|prefix| prefix.len())
                .max()
                .map(|len| (len, def))
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, def)| def)
}

fn extension(rel: &str) -> String {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
