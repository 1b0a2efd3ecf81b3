// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The build agent: one claimed job at a time, advanced once per tick.
//!
//! ```text
//!   claim ──► Init ──► Monitor ──► Finalise ──► Init ...
//!               │                      │
//!               ├── Finished ──────────┼──────► Exit
//!               └── Error ───► Finalise (failed)
//! ```
//!
//! A kill request for the active job jumps straight to Exit.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use forge_adapters::{NotifyAdapter, ProcessAdapter, SccAdapter};
use forge_core::{
    BuildJob, BuildLogId, Clock, ErrorCategory, ErrorKind, JobId, JobOutcome, PollSignal,
};
use forge_script::{script_path, CommandToken, ParsedLine, ScriptConfig, ScriptInterpreter};
use forge_storage::JobStore;

use crate::classifier::{ClassifyMode, LogClassifier, Signatures, SUCCEEDED};
use crate::dispatcher::{Dispatch, Dispatcher, StepContext};
use crate::error::AgentError;
use crate::job_logger::JobLogger;
use crate::log_paths;
use crate::messages::{builder_subject, failure_message, BuildAction, FailedStep};
use crate::supervisor::ProcessSupervisor;

/// Default interval between store heartbeats.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Watermark key holding the last changelist a command built successfully.
pub fn last_good_key(command: &str) -> String {
    format!("LastGoodBuild:{}", command)
}

/// Agent dependencies (adapters and store)
pub struct AgentDeps<S, V, N, P> {
    pub store: S,
    pub scc: V,
    pub notifier: N,
    pub process: P,
}

/// Per-agent settings resolved from configuration.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub machine: String,
    pub scripts_dir: PathBuf,
    pub log_dir: PathBuf,
    /// Working directory for spawned tools
    pub workspace_root: Option<PathBuf>,
    /// Client root every run must be mapped to
    pub client_root: Option<String>,
    pub heartbeat: Duration,
    /// Starting configuration for every script
    pub script_defaults: ScriptConfig,
    pub fail_addresses: Vec<String>,
    pub success_addresses: Vec<String>,
    pub signatures: Signatures,
}

impl AgentSettings {
    pub fn new(machine: impl Into<String>, scripts_dir: PathBuf, log_dir: PathBuf) -> Self {
        Self {
            machine: machine.into(),
            scripts_dir,
            log_dir,
            workspace_root: None,
            client_root: None,
            heartbeat: HEARTBEAT_INTERVAL,
            script_defaults: ScriptConfig::default(),
            fail_addresses: Vec::new(),
            success_addresses: Vec::new(),
            signatures: Signatures::default(),
        }
    }
}

/// Where the active job is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Init,
    Monitor,
    Finalise,
    Exit,
}

forge_core::simple_display! {
    Mode {
        Init => "init",
        Monitor => "monitor",
        Finalise => "finalise",
        Exit => "exit",
    }
}

struct CurrentStep<H> {
    line: ParsedLine,
    log: PathBuf,
    error: ErrorKind,
    supervisor: Option<ProcessSupervisor<H>>,
}

struct ActiveJob<H> {
    job: BuildJob,
    build_log: BuildLogId,
    mode: Mode,
    interpreter: ScriptInterpreter,
    /// Synthetic commands run before the next script line
    pending: VecDeque<ParsedLine>,
    step: Option<CurrentStep<H>>,
    step_index: u32,
    outcome: JobOutcome,
}

pub struct Agent<S, V, N, P: ProcessAdapter, C> {
    store: S,
    notifier: N,
    dispatcher: Dispatcher<V, P, C>,
    clock: C,
    settings: AgentSettings,
    classifier: LogClassifier,
    logger: JobLogger,
    active: Option<ActiveJob<P::Handle>>,
    /// Claimed job whose setup failed and whose release is still owed
    abandoned: Option<JobId>,
    last_heartbeat: Option<Instant>,
}

impl<S, V, N, P, C> Agent<S, V, N, P, C>
where
    S: JobStore,
    V: SccAdapter,
    N: NotifyAdapter,
    P: ProcessAdapter,
    C: Clock,
{
    pub fn new(deps: AgentDeps<S, V, N, P>, settings: AgentSettings, clock: C) -> Self {
        let dispatcher = Dispatcher::new(
            deps.scc,
            deps.process,
            clock.clone(),
            settings.client_root.clone(),
            settings.workspace_root.clone(),
        );
        Self {
            store: deps.store,
            notifier: deps.notifier,
            dispatcher,
            clock,
            classifier: LogClassifier::new(settings.signatures.clone()),
            logger: JobLogger::new(settings.log_dir.clone()),
            settings,
            active: None,
            abandoned: None,
            last_heartbeat: None,
        }
    }

    pub fn machine(&self) -> &str {
        &self.settings.machine
    }

    pub fn active_job(&self) -> Option<&BuildJob> {
        self.active.as_ref().map(|a| &a.job)
    }

    /// Mode of the active job, `None` when idle.
    pub fn mode(&self) -> Option<Mode> {
        self.active.as_ref().map(|a| a.mode)
    }

    /// One pass of the agent loop: heartbeat, poll, then one step.
    pub async fn tick(&mut self) -> Result<(), AgentError> {
        self.heartbeat_if_due()?;
        self.release_abandoned();

        match PollSignal::from_raw(self.store.poll(&self.settings.machine)?) {
            PollSignal::Idle => {}
            PollSignal::Kill(id) => self.kill(id).await?,
            PollSignal::Claim(id) if self.active.is_none() => self.start(id)?,
            PollSignal::Claim(_) => {}
        }

        self.step().await
    }

    /// Stop the active job (agent shutdown). The job ends `Killed`.
    pub async fn abort(&mut self) -> Result<(), AgentError> {
        if let Some(id) = self.active.as_ref().map(|a| a.job.id) {
            self.kill(id).await?;
            self.exit().await?;
        }
        Ok(())
    }

    /// Run the Exit step now. Does nothing when no job is active.
    pub async fn exit(&mut self) -> Result<(), AgentError> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        active.mode = Mode::Exit;
        if let Err(e) = self.exit_job(&mut active).await {
            self.active = Some(active);
            return Err(e);
        }
        Ok(())
    }

    fn heartbeat_if_due(&mut self) -> Result<(), AgentError> {
        let now = self.clock.now();
        let due = self
            .last_heartbeat
            .map(|last| now.saturating_duration_since(last) >= self.settings.heartbeat)
            .unwrap_or(true);
        if due {
            self.store.heartbeat(&self.settings.machine, self.clock.epoch_ms())?;
            self.last_heartbeat = Some(now);
        }
        Ok(())
    }

    fn start(&mut self, id: JobId) -> Result<(), AgentError> {
        let machine = self.settings.machine.clone();
        if !self.store.claim(id, &machine)? {
            tracing::debug!(job_id = id.get(), "claim lost to another agent");
            return Ok(());
        }
        if let Err(e) = self.adopt(id) {
            tracing::warn!(job_id = id.get(), error = %e, "job setup failed after claim, releasing it");
            self.abandoned = Some(id);
            self.release_abandoned();
            return Err(e);
        }
        Ok(())
    }

    /// Release a claimed job that never became active, so the store
    /// offers this machine work again.
    fn release_abandoned(&mut self) {
        let Some(id) = self.abandoned else {
            return;
        };
        match self.store.release(id, JobOutcome::Failed) {
            Ok(()) => self.abandoned = None,
            Err(e) => tracing::warn!(job_id = id.get(), error = %e, "failed to release abandoned job"),
        }
    }

    fn adopt(&mut self, id: JobId) -> Result<(), AgentError> {
        let machine = self.settings.machine.clone();
        let job = self.store.job(id)?;
        let build_log = self.store.create_build_log(id, &machine, &job.command, self.clock.epoch_ms())?;
        self.dispatcher.reset();

        let mut config = self.settings.script_defaults.clone();
        config.platform = job.platform.clone();
        config.game = job.game.clone();
        config.configuration = job.configuration.clone();
        let path = script_path(&self.settings.scripts_dir, &job.command);
        let interpreter = ScriptInterpreter::open(&path, config);

        self.logger.info(
            id,
            "init",
            &format!("claimed by {}, running {} ({})", machine, job.name, path.display()),
        );
        self.active = Some(ActiveJob {
            job,
            build_log,
            mode: Mode::Init,
            interpreter,
            pending: VecDeque::new(),
            step: None,
            step_index: 0,
            outcome: JobOutcome::Failed,
        });
        Ok(())
    }

    async fn kill(&mut self, id: JobId) -> Result<(), AgentError> {
        if !self.active.as_ref().is_some_and(|a| a.job.id == id) {
            return self.kill_orphan(id);
        }
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        if active.mode == Mode::Exit {
            return Ok(());
        }

        if let Some(supervisor) = active.step.as_mut().and_then(|s| s.supervisor.as_mut()) {
            supervisor.kill();
        }
        active.outcome = JobOutcome::Killed;
        active.mode = Mode::Exit;
        self.logger.warn(id, "kill", "kill requested");

        let config = active.interpreter.config();
        let subject = builder_subject(
            &active.job.branch,
            &config.game,
            &config.platform,
            BuildAction::Killed,
            &active.job.name,
        );
        let recipients = recipients(&config.fail_addresses, &self.settings.fail_addresses);
        let body = format!("{} was killed on {}", active.job.name, self.settings.machine);
        if let Err(e) = self.notifier.send_killed(&recipients, &subject, &body).await {
            tracing::warn!(job_id = id.get(), error = %e, "failed to send kill notification");
        }
        Ok(())
    }

    /// A kill for a job this agent is not running (e.g. left over from a
    /// previous agent process). Close the row so the signal stops.
    fn kill_orphan(&mut self, id: JobId) -> Result<(), AgentError> {
        tracing::warn!(job_id = id.get(), "kill requested for a job not running here");
        self.store.release(id, JobOutcome::Killed)?;
        if let Some(log) = self.store.job(id)?.build_log {
            let outcome = JobOutcome::Killed.to_string();
            self.store.finish_build_log(log, self.clock.epoch_ms(), &outcome)?;
        }
        Ok(())
    }

    async fn step(&mut self) -> Result<(), AgentError> {
        let Some(mut active) = self.active.take() else {
            return Ok(());
        };
        let mode = active.mode;
        let result = match mode {
            Mode::Init => self.init(&mut active).await,
            Mode::Monitor => {
                self.monitor(&mut active);
                Ok(())
            }
            Mode::Finalise => self.finalise(&mut active).await,
            Mode::Exit => self.exit_job(&mut active).await,
        };
        if mode != Mode::Exit || result.is_err() {
            self.active = Some(active);
        }
        result
    }

    async fn init(&mut self, active: &mut ActiveJob<P::Handle>) -> Result<(), AgentError> {
        let line = match active.pending.pop_front() {
            Some(line) => line,
            None => active.interpreter.next_command(),
        };

        if let Some(status) = active.interpreter.take_status_echo() {
            self.logger.info(active.job.id, "status", &format!("[STATUS] {}", status));
            self.store.set_build_log_status(active.build_log, &status)?;
        }

        match line.token {
            CommandToken::Config => Ok(()),
            CommandToken::Error => {
                active.step = Some(CurrentStep {
                    error: active.interpreter.error_kind(),
                    line,
                    log: PathBuf::new(),
                    supervisor: None,
                });
                active.mode = Mode::Finalise;
                Ok(())
            }
            CommandToken::Finished => self.succeed(active).await,
            CommandToken::Submit => {
                active.pending.push_back(ParsedLine::synthetic(CommandToken::Finished));
                self.dispatch(active, line).await
            }
            token => match token.split_composite() {
                Some((first, second)) => {
                    active.pending.push_front(ParsedLine { token: second, ..line.clone() });
                    self.dispatch(active, ParsedLine { token: first, ..line }).await
                }
                None => self.dispatch(active, line).await,
            },
        }
    }

    async fn dispatch(&mut self, active: &mut ActiveJob<P::Handle>, line: ParsedLine) -> Result<(), AgentError> {
        let id = active.job.id;
        active.step_index += 1;
        let log = log_paths::step_log_path(&self.settings.log_dir, id, active.step_index, line.token);

        let described = describe(&line);
        self.logger.info(id, "init", &described);
        self.store.set_build_log_status(active.build_log, &described)?;

        let last_good = if line.token == CommandToken::GetChanges {
            self.store.watermark(&active.job.branch, &last_good_key(&active.job.command))?
        } else {
            0
        };

        let ctx = StepContext {
            job: &active.job,
            config: active.interpreter.config_mut(),
            log: &log,
            last_good,
        };
        let dispatched = self.dispatcher.dispatch(&line, ctx).await;

        let config = active.interpreter.config();
        match line.token {
            CommandToken::Sync => {
                if let Some(cl) = config.most_recent_build {
                    self.store.set_build_log_changelist(active.build_log, cl)?;
                }
            }
            CommandToken::GetChanges if !config.changes.is_empty() => {
                self.logger.append_fenced(id, "init", "changes", &config.changes.join("\n"));
            }
            _ => {}
        }

        let (error, supervisor, mode) = match dispatched {
            Dispatch::Done(error) => (error, None, Mode::Finalise),
            Dispatch::Spawned(supervisor) => {
                let pid = supervisor.pid().map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
                self.logger.info(id, "init", &format!("launched {} (pid {})", supervisor.command(), pid));
                (ErrorKind::None, Some(supervisor), Mode::Monitor)
            }
        };
        active.step = Some(CurrentStep { line, log, error, supervisor });
        active.mode = mode;
        Ok(())
    }

    fn monitor(&mut self, active: &mut ActiveJob<P::Handle>) {
        let now = self.clock.now();
        let Some(step) = active.step.as_mut() else {
            active.mode = Mode::Finalise;
            return;
        };
        let Some(supervisor) = step.supervisor.as_mut() else {
            active.mode = Mode::Finalise;
            return;
        };
        if let Some(finish) = supervisor.poll(now) {
            step.error = finish.error_kind();
            tracing::info!(
                job_id = active.job.id.get(),
                token = %step.line.token,
                command = supervisor.command(),
                pid = ?supervisor.pid(),
                ?finish,
                "step finished"
            );
            active.mode = Mode::Finalise;
        }
    }

    async fn finalise(&mut self, active: &mut ActiveJob<P::Handle>) -> Result<(), AgentError> {
        let Some(step) = active.step.take() else {
            active.mode = Mode::Init;
            return Ok(());
        };
        let config = active.interpreter.config();
        let checks = ClassifyMode::checks(config.check_errors, config.check_warnings);

        let args = if step.error == ErrorKind::IllegalCommand && step.line.token != CommandToken::Error {
            describe(&step.line)
        } else {
            step.line.args.clone()
        };
        let failed = FailedStep { token: step.line.token, args: &args };
        let minutes = config.timeout_minutes();

        let message = match step.error.category() {
            ErrorCategory::None => {
                let status = self.classifier.classify_file(&step.log, checks);
                if status == SUCCEEDED {
                    active.mode = Mode::Init;
                    return Ok(());
                }
                failure_message(ErrorKind::None, &failed, &status, minutes)
            }
            ErrorCategory::Script => failure_message(step.error, &failed, SUCCEEDED, minutes),
            ErrorCategory::SourceControl => {
                let detail = self.classifier.classify_file(&step.log, ClassifyMode::full_log());
                failure_message(step.error, &failed, &detail, minutes)
            }
            ErrorCategory::Process => {
                let detail = self.classifier.classify_file(&step.log, checks);
                failure_message(step.error, &failed, &detail, minutes)
            }
        };
        self.fail(active, step.error, &message).await;
        Ok(())
    }

    async fn fail(&mut self, active: &mut ActiveJob<P::Handle>, kind: ErrorKind, message: &str) {
        let id = active.job.id;
        self.logger.error(id, "finalise", message);
        tracing::info!(job_id = id.get(), error = %kind, "job failed");

        let config = active.interpreter.config();
        let subject = builder_subject(
            &active.job.branch,
            &config.game,
            &config.platform,
            BuildAction::Failed,
            &active.job.name,
        );
        let recipients = recipients(&config.fail_addresses, &self.settings.fail_addresses);
        if let Err(e) = self.notifier.send_failed(&recipients, &subject, message).await {
            tracing::warn!(job_id = id.get(), error = %e, "failed to send failure notification");
        }
        active.outcome = JobOutcome::Failed;
        active.mode = Mode::Exit;
    }

    async fn succeed(&mut self, active: &mut ActiveJob<P::Handle>) -> Result<(), AgentError> {
        let id = active.job.id;
        let config = active.interpreter.config();
        if let Some(cl) = config.most_recent_build {
            self.store.set_watermark(&active.job.branch, &last_good_key(&active.job.command), cl)?;
        }

        let mut body = format!("{} succeeded on {}", active.job.name, self.settings.machine);
        if let Some(cl) = config.most_recent_build {
            body.push_str(&format!("\nBuilt from changelist {}", cl));
        }
        if !config.changes.is_empty() {
            body.push_str("\n\nChanges:\n");
            body.push_str(&config.changes.join("\n"));
        }

        let subject = builder_subject(
            &active.job.branch,
            &config.game,
            &config.platform,
            BuildAction::Succeeded,
            &active.job.name,
        );
        let recipients = recipients(&config.success_addresses, &self.settings.success_addresses);
        if let Err(e) = self.notifier.send_succeeded(&recipients, &subject, &body).await {
            tracing::warn!(job_id = id.get(), error = %e, "failed to send success notification");
        }
        self.logger.info(id, "init", "script finished");
        active.outcome = JobOutcome::Succeeded;
        active.mode = Mode::Exit;
        Ok(())
    }

    async fn exit_job(&mut self, active: &mut ActiveJob<P::Handle>) -> Result<(), AgentError> {
        let id = active.job.id;
        let files = active.interpreter.config_mut().take_checked_out();
        if !files.is_empty() {
            match self.dispatcher.scc().revert(&files).await {
                Ok(()) => self.logger.info(id, "exit", &format!("reverted {} file(s)", files.len())),
                Err(e) => self.logger.warn(id, "exit", &format!("revert failed: {}", e)),
            }
        }

        self.store.release(id, active.outcome)?;
        let outcome = active.outcome.to_string();
        self.store.finish_build_log(active.build_log, self.clock.epoch_ms(), &outcome)?;
        self.logger.info(id, "exit", &format!("job {}", outcome));
        Ok(())
    }
}

fn describe(line: &ParsedLine) -> String {
    if line.args.is_empty() {
        line.token.to_string()
    } else {
        format!("{} {}", line.token, line.args)
    }
}

fn recipients(script: &[String], defaults: &[String]) -> Vec<String> {
    if script.is_empty() {
        defaults.to_vec()
    } else {
        script.to_vec()
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
