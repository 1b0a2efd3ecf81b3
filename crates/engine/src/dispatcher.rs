// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps script commands to revision-control operations and tool launches.
//!
//! Every failure is caught here and turned into one [`ErrorKind`]; raw
//! adapter errors only reach the step log and tracing.

use std::path::{Path, PathBuf};

use forge_adapters::{ProcessAdapter, SccAdapter, SccError, SpawnSpec};
use forge_core::{BuildJob, Clock, ErrorKind};
use forge_script::{CommandToken, ParsedLine, ScriptConfig};

use crate::job_logger::append_step_log;
use crate::supervisor::ProcessSupervisor;

/// File spec for whole-workspace revision-control operations.
pub const WORKSPACE_SPEC: &str = "//...";

/// Everything one dispatch may read or update.
pub struct StepContext<'a> {
    pub job: &'a BuildJob,
    pub config: &'a mut ScriptConfig,
    /// Captured output for this step
    pub log: &'a Path,
    /// Last changelist this command built successfully (0 when unknown)
    pub last_good: i64,
}

/// Result of dispatching one command.
pub enum Dispatch<H> {
    /// Synchronous step finished; `ErrorKind::None` on success
    Done(ErrorKind),
    /// A tool is running; monitor it
    Spawned(ProcessSupervisor<H>),
}

/// Revision for a `sync` line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Revision {
    Changelist(i64),
    Label(String),
    Default,
}

fn parse_sync_args(args: &str) -> (String, Revision) {
    let mut spec = WORKSPACE_SPEC.to_string();
    let mut revision = Revision::Default;
    for word in args.split_whitespace() {
        if let Some(label) = word.strip_prefix('@') {
            revision = Revision::Label(label.to_string());
        } else if let Ok(cl) = word.parse::<i64>() {
            revision = Revision::Changelist(cl);
        } else {
            spec = word.to_string();
        }
    }
    (spec, revision)
}

pub struct Dispatcher<V, P, C> {
    scc: V,
    process: P,
    clock: C,
    /// Client root the workspace must be mapped to, when configured
    expected_root: Option<String>,
    workspace_root: Option<PathBuf>,
    client_checked: bool,
}

impl<V, P, C> Dispatcher<V, P, C>
where
    V: SccAdapter,
    P: ProcessAdapter,
    C: Clock,
{
    pub fn new(
        scc: V,
        process: P,
        clock: C,
        expected_root: Option<String>,
        workspace_root: Option<PathBuf>,
    ) -> Self {
        Self { scc, process, clock, expected_root, workspace_root, client_checked: false }
    }

    /// Forget client validation; the next revision-control step re-checks.
    pub fn reset(&mut self) {
        self.client_checked = false;
    }

    pub fn scc(&self) -> &V {
        &self.scc
    }

    pub async fn dispatch(&mut self, line: &ParsedLine, ctx: StepContext<'_>) -> Dispatch<P::Handle> {
        if line.token.is_source_control() {
            Dispatch::Done(self.source_control(line, ctx).await)
        } else if line.token.launches_tool() {
            self.launch(line, ctx)
        } else {
            tracing::warn!(token = %line.token, "command has no dispatch action");
            Dispatch::Done(ErrorKind::IllegalCommand)
        }
    }

    async fn source_control(&mut self, line: &ParsedLine, ctx: StepContext<'_>) -> ErrorKind {
        if let Err(reason) = self.validate_client(ctx.config).await {
            tracing::warn!(job_id = ctx.job.id.get(), %reason, "client root check failed");
            append_step_log(ctx.log, &[reason]);
            return ErrorKind::SccGetClientRoot;
        }

        let kind = match line.token {
            CommandToken::Sync => ErrorKind::SccSync,
            CommandToken::Checkout => ErrorKind::SccCheckout,
            CommandToken::Revert => ErrorKind::SccRevert,
            CommandToken::Submit => ErrorKind::SccSubmit,
            _ => ErrorKind::SccGetChanges,
        };
        let log = ctx.log;
        let job_id = ctx.job.id.get();
        let result = match line.token {
            CommandToken::Sync => self.sync(&line.args, ctx).await,
            CommandToken::Checkout => self.checkout(&line.args, ctx).await,
            CommandToken::Revert => self.revert(&line.args, ctx).await,
            CommandToken::Submit => self.submit(&line.args, ctx).await,
            _ => self.get_changes(ctx).await,
        };

        match result {
            Ok(lines) => {
                append_step_log(log, &lines);
                ErrorKind::None
            }
            Err(e) => {
                tracing::warn!(job_id, token = %line.token, error = %e, "revision-control step failed");
                append_step_log(log, &[e.to_string()]);
                kind
            }
        }
    }

    async fn validate_client(&mut self, config: &ScriptConfig) -> Result<(), String> {
        if self.client_checked {
            return Ok(());
        }
        self.scc.use_client(config.client_spec.as_deref());
        let root = self.scc.get_client_root().await.map_err(|e| format!("client root: {}", e))?;
        if root.trim().is_empty() {
            return Err("client root is empty".to_string());
        }
        if let Some(expected) = &self.expected_root {
            if !same_root(&root, expected) {
                return Err(format!("client root {} does not match {}", root, expected));
            }
        }
        self.client_checked = true;
        Ok(())
    }

    async fn sync(&self, args: &str, ctx: StepContext<'_>) -> Result<Vec<String>, SccError> {
        let (spec, revision) = parse_sync_args(args);
        let changelist = match revision {
            Revision::Changelist(cl) => cl,
            Revision::Label(label) => self.scc.get_label_info(&label).await?.changelist,
            Revision::Default => match ctx.job.label_changelist() {
                Some(cl) => cl,
                None => self.scc.get_most_recent_build(&spec).await?,
            },
        };

        let mut lines = self.scc.sync_to_changelist(&spec, changelist).await?;
        ctx.config.most_recent_build = Some(changelist);
        lines.push(format!("Synced {} to changelist {}", spec, changelist));
        Ok(lines)
    }

    async fn checkout(&self, args: &str, ctx: StepContext<'_>) -> Result<Vec<String>, SccError> {
        if args.is_empty() {
            return Err(SccError::Rejected("checkout needs a file spec".to_string()));
        }
        let files = self.scc.checkout_file_spec(args).await?;
        ctx.config.add_checked_out(files.iter().cloned());
        Ok(files.into_iter().map(|f| format!("{} - opened for edit", f)).collect())
    }

    async fn revert(&self, args: &str, ctx: StepContext<'_>) -> Result<Vec<String>, SccError> {
        let specs = if args.is_empty() {
            ctx.config.take_checked_out()
        } else {
            ctx.config.checked_out.retain(|f| f != args);
            vec![args.to_string()]
        };
        if specs.is_empty() {
            return Ok(vec!["Nothing to revert".to_string()]);
        }
        self.scc.revert(&specs).await?;
        Ok(specs.into_iter().map(|f| format!("{} - reverted", f)).collect())
    }

    async fn submit(&self, args: &str, ctx: StepContext<'_>) -> Result<Vec<String>, SccError> {
        if ctx.config.checked_out.is_empty() {
            return Ok(vec!["Nothing to submit".to_string()]);
        }
        let description =
            if args.is_empty() { format!("[BUILDER] {}", ctx.job.name) } else { args.to_string() };
        let files = ctx.config.checked_out.clone();

        let submitted = match self.scc.submit(&description, &files).await {
            Ok(cl) => cl,
            Err(e) => {
                tracing::info!(job_id = ctx.job.id.get(), error = %e, "submit failed, resolving and retrying");
                self.scc.auto_resolve().await?;
                self.scc.submit(&description, &files).await?
            }
        };
        ctx.config.checked_out.clear();
        Ok(vec![format!("Submitted changelist {}", submitted)])
    }

    async fn get_changes(&self, ctx: StepContext<'_>) -> Result<Vec<String>, SccError> {
        let last = match ctx.config.most_recent_build {
            Some(cl) => cl,
            None => self.scc.get_most_recent_build(WORKSPACE_SPEC).await?,
        };
        let first = if ctx.last_good > 0 { ctx.last_good + 1 } else { last };
        if first > last {
            return Ok(vec!["No new changes".to_string()]);
        }

        let mut changes = self.scc.get_changes_in_range(WORKSPACE_SPEC, first, last).await?;
        changes.sort_by_key(|c| c.number);
        let summaries: Vec<String> = changes.iter().map(|c| c.summary()).collect();
        ctx.config.changes.extend(summaries.iter().cloned());
        Ok(summaries)
    }

    fn launch(&self, line: &ParsedLine, ctx: StepContext<'_>) -> Dispatch<P::Handle> {
        let span = tracing::info_span!(
            "process.spawn",
            job_id = ctx.job.id.get(),
            token = %line.token,
        );
        let _guard = span.enter();

        let spec = match tool_spec(line, ctx.config) {
            Ok(spec) => spec,
            Err(kind) => {
                append_step_log(ctx.log, &[format!("cannot run {} {}", line.token, line.args)]);
                return Dispatch::Done(kind);
            }
        };

        let changelist = ctx.config.most_recent_build.or_else(|| ctx.job.label_changelist());
        let mut spec = spec
            .env("FORGE_PLATFORM", ctx.config.platform.clone())
            .env("FORGE_CONFIGURATION", ctx.config.configuration.clone())
            .env("FORGE_BRANCH", ctx.job.branch.clone())
            .output(ctx.log.to_path_buf());
        if let Some(cl) = changelist {
            spec = spec.env("FORGE_CHANGELIST", cl.to_string());
        }
        if let Some(root) = &self.workspace_root {
            spec = spec.cwd(root.clone());
        }

        let command = spec.display_command();
        match self.process.spawn(&spec) {
            Ok(handle) => {
                tracing::info!(%command, "tool launched");
                Dispatch::Spawned(ProcessSupervisor::new(
                    handle,
                    command,
                    self.clock.now(),
                    ctx.config.timeout,
                ))
            }
            Err(e) => {
                tracing::warn!(%command, error = %e, "tool failed to launch");
                append_step_log(ctx.log, &[e.to_string()]);
                Dispatch::Done(ErrorKind::Process)
            }
        }
    }
}

/// Executable and arguments for a tool command.
fn tool_spec(line: &ParsedLine, config: &ScriptConfig) -> Result<SpawnSpec, ErrorKind> {
    let params: Vec<&str> = line.args.split_whitespace().collect();
    let cfg = config.configuration.as_str();
    let tool = |path: &Option<PathBuf>| path.clone().ok_or(ErrorKind::Process);

    let (executable, args) = match line.token {
        CommandToken::MsvcClean | CommandToken::MsvcBuild => {
            let (solution, project) = one_or_two(&params)?;
            let action = if line.token == CommandToken::MsvcClean { "/clean" } else { "/build" };
            let mut args = vec![with_extension(solution, "sln"), action.to_string(), cfg.to_string()];
            if let Some(project) = project {
                args.extend(["/project".to_string(), project.to_string()]);
            }
            (tool(&config.tools.msvc)?, args)
        }
        CommandToken::GccClean | CommandToken::GccBuild => {
            let (makefile, target) = one_or_two(&params)?;
            let mut args = vec!["-f".to_string(), makefile.to_string()];
            if let Some(target) = target {
                args.push(target.to_string());
            }
            if line.token == CommandToken::GccClean {
                args.push("clean".to_string());
            }
            args.push(format!("PLATFORM={}", config.platform));
            args.push(format!("BUILDTYPE={}", cfg));
            (tool(&config.tools.make)?, args)
        }
        CommandToken::BuildScript => {
            let mut args = vec![
                "make".to_string(),
                format!("-platform={}", config.platform),
                format!("-configuration={}", cfg),
            ];
            args.extend(params.iter().map(|p| p.to_string()));
            (tool(&config.tools.game)?, args)
        }
        CommandToken::Cook => {
            let mut args = vec!["CookPackages".to_string(), format!("-platform={}", config.platform)];
            args.extend(params.iter().map(|p| p.to_string()));
            (tool(&config.tools.game)?, args)
        }
        _ => return Err(ErrorKind::IllegalCommand),
    };
    Ok(SpawnSpec::new(executable).args(args))
}

fn one_or_two<'a>(params: &[&'a str]) -> Result<(&'a str, Option<&'a str>), ErrorKind> {
    match params {
        [first] => Ok((*first, None)),
        [first, second] => Ok((*first, Some(*second))),
        _ => Err(ErrorKind::IllegalCommand),
    }
}

fn with_extension(name: &str, ext: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{}.{}", name, ext)
    }
}

fn same_root(actual: &str, expected: &str) -> bool {
    let trim = |s: &str| s.trim().trim_end_matches(['/', '\\']).to_string();
    trim(actual).eq_ignore_ascii_case(&trim(expected))
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
