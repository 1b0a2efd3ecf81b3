// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning external build tools.
//!
//! A spawned tool runs under a background task that waits for exit (or a
//! kill request), drains stdout/stderr into the optional log file, closes
//! the file, and only then publishes the exit. The agent loop reads that
//! published exit through [`ProcessHandle::exit`]; nothing else crosses
//! threads.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::{mpsc, oneshot};

/// How long to keep draining output after the tool exits. Tools that leave
/// grandchildren holding the pipes open would otherwise never finish.
const DRAIN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open output log {path}: {source}")]
    OutputLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnSpec {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: Option<PathBuf>,
    /// Capture stdout and stderr into this file
    pub output: Option<PathBuf>,
}

impl SpawnSpec {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self { executable: executable.into(), ..Self::default() }
    }

    forge_core::setters! {
        set {
            args: Vec<String>,
        }
        option {
            cwd: PathBuf,
            output: PathBuf,
        }
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Command line as it would be typed, for logs and messages.
    pub fn display_command(&self) -> String {
        let mut line = self.executable.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// How a tool ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessExit {
    Exited(i32),
    /// Ended by a signal not sent by us
    Signalled,
    /// Ended because we killed it
    Killed,
}

impl ProcessExit {
    pub fn success(self) -> bool {
        self == ProcessExit::Exited(0)
    }
}

forge_core::simple_display! {
    ProcessExit {
        Exited(..) => "exited",
        Signalled => "signalled",
        Killed => "killed",
    }
}

/// A running (or finished) tool.
pub trait ProcessHandle: Send + 'static {
    fn pid(&self) -> Option<u32>;

    /// `None` while running. Once `Some`, the output log is closed.
    fn exit(&self) -> Option<ProcessExit>;

    /// Force-kill the tool and everything it started. Idempotent.
    fn kill(&mut self);
}

pub trait ProcessAdapter: Clone + Send + Sync + 'static {
    type Handle: ProcessHandle;

    fn spawn(&self, spec: &SpawnSpec) -> Result<Self::Handle, ProcessError>;
}

/// Real tools via `tokio::process`. Must be used inside a tokio runtime.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessAdapter;

pub struct TokioProcessHandle {
    pid: Option<u32>,
    exit: Arc<OnceLock<ProcessExit>>,
    kill_tx: Option<oneshot::Sender<()>>,
}

impl ProcessHandle for TokioProcessHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn exit(&self) -> Option<ProcessExit> {
        self.exit.get().copied()
    }

    fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl ProcessAdapter for TokioProcessAdapter {
    type Handle = TokioProcessHandle;

    fn spawn(&self, spec: &SpawnSpec) -> Result<TokioProcessHandle, ProcessError> {
        let sink = match &spec.output {
            Some(path) => Some(open_log(path)?),
            None => None,
        };

        let mut cmd = tokio::process::Command::new(&spec.executable);
        cmd.args(&spec.args)
            .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }
        if sink.is_some() {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(|source| ProcessError::SpawnFailed {
            command: spec.display_command(),
            source,
        })?;
        let pid = child.id();
        tracing::info!(pid, cmd = %spec.display_command(), "spawned tool");

        let (line_tx, line_rx) = mpsc::unbounded_channel();
        if let Some(out) = child.stdout.take() {
            tokio::spawn(pump(out, line_tx.clone()));
        }
        if let Some(err) = child.stderr.take() {
            tokio::spawn(pump(err, line_tx.clone()));
        }
        drop(line_tx);

        let exit = Arc::new(OnceLock::new());
        let (kill_tx, kill_rx) = oneshot::channel();
        tokio::spawn(supervise(child, pid, sink, line_rx, kill_rx, Arc::clone(&exit)));

        Ok(TokioProcessHandle { pid, exit, kill_tx: Some(kill_tx) })
    }
}

fn open_log(path: &std::path::Path) -> Result<std::fs::File, ProcessError> {
    let wrap = |source| ProcessError::OutputLog { path: path.to_path_buf(), source };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(wrap)?;
    }
    std::fs::OpenOptions::new().create(true).append(true).open(path).map_err(wrap)
}

async fn pump<R: AsyncRead + Unpin>(reader: R, tx: mpsc::UnboundedSender<String>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).is_err() {
            break;
        }
    }
}

async fn supervise(
    mut child: tokio::process::Child,
    pid: Option<u32>,
    sink: Option<std::fs::File>,
    mut lines: mpsc::UnboundedReceiver<String>,
    kill_rx: oneshot::Receiver<()>,
    exit: Arc<OnceLock<ProcessExit>>,
) {
    // The writer owns the log file; it is closed when this task ends.
    let writer = tokio::spawn(async move {
        let mut out = sink.map(|f| BufWriter::new(tokio::fs::File::from_std(f)));
        while let Some(line) = lines.recv().await {
            if let Some(out) = out.as_mut() {
                if out.write_all(line.as_bytes()).await.is_err() || out.write_all(b"\n").await.is_err() {
                    tracing::warn!(pid, "failed to write tool output");
                }
            }
        }
        if let Some(mut out) = out {
            let _ = out.flush().await;
        }
    });

    let outcome = tokio::select! {
        status = child.wait() => match status {
            Ok(status) => status.code().map(ProcessExit::Exited).unwrap_or(ProcessExit::Signalled),
            Err(e) => {
                tracing::warn!(pid, error = %e, "failed waiting for tool");
                ProcessExit::Signalled
            }
        },
        // A dropped handle counts as a kill request.
        _ = kill_rx => {
            kill_tree(pid);
            let _ = child.kill().await;
            ProcessExit::Killed
        }
    };

    let drain = writer.abort_handle();
    if tokio::time::timeout(DRAIN_GRACE, writer).await.is_err() {
        tracing::warn!(pid, "tool output still open after exit; closing log");
        kill_tree(pid);
        drain.abort();
    }

    tracing::info!(pid, outcome = %outcome, "tool finished");
    let _ = exit.set(outcome);
}

/// Kill the tool's whole process group.
#[cfg(unix)]
fn kill_tree(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_tree(_pid: Option<u32>) {}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ProcessAdapter, ProcessError, ProcessExit, ProcessHandle, SpawnSpec};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Scripted result for the next spawn.
    #[derive(Debug, Clone)]
    pub enum FakeRun {
        /// Exit immediately with this code, writing `output` to the log
        Exit { code: i32, output: String },
        /// Keep running until killed or released
        Hang,
        /// Fail to spawn
        SpawnError,
    }

    struct FakeProcessState {
        spawned: Vec<SpawnSpec>,
        script: VecDeque<FakeRun>,
        kills: usize,
    }

    /// Process adapter that never touches the OS.
    #[derive(Clone)]
    pub struct FakeProcessAdapter {
        inner: Arc<Mutex<FakeProcessState>>,
    }

    impl Default for FakeProcessAdapter {
        fn default() -> Self {
            Self {
                inner: Arc::new(Mutex::new(FakeProcessState {
                    spawned: Vec::new(),
                    script: VecDeque::new(),
                    kills: 0,
                })),
            }
        }
    }

    impl FakeProcessAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue the result of a future spawn. Unscripted spawns exit 0.
        pub fn push(&self, run: FakeRun) {
            self.inner.lock().script.push_back(run);
        }

        pub fn exit_with(&self, code: i32, output: &str) {
            self.push(FakeRun::Exit { code, output: output.to_string() });
        }

        pub fn spawned(&self) -> Vec<SpawnSpec> {
            self.inner.lock().spawned.clone()
        }

        pub fn kills(&self) -> usize {
            self.inner.lock().kills
        }
    }

    pub struct FakeProcessHandle {
        exit: Option<ProcessExit>,
        adapter: Arc<Mutex<FakeProcessState>>,
    }

    impl ProcessHandle for FakeProcessHandle {
        fn pid(&self) -> Option<u32> {
            None
        }

        fn exit(&self) -> Option<ProcessExit> {
            self.exit
        }

        fn kill(&mut self) {
            if self.exit.is_none() {
                self.adapter.lock().kills += 1;
                self.exit = Some(ProcessExit::Killed);
            }
        }
    }

    impl ProcessAdapter for FakeProcessAdapter {
        type Handle = FakeProcessHandle;

        fn spawn(&self, spec: &SpawnSpec) -> Result<FakeProcessHandle, ProcessError> {
            let run = {
                let mut inner = self.inner.lock();
                inner.spawned.push(spec.clone());
                inner.script.pop_front().unwrap_or(FakeRun::Exit { code: 0, output: String::new() })
            };
            let exit = match run {
                FakeRun::SpawnError => {
                    return Err(ProcessError::SpawnFailed {
                        command: spec.display_command(),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such tool"),
                    })
                }
                FakeRun::Hang => None,
                FakeRun::Exit { code, output } => {
                    if let Some(path) = &spec.output {
                        if let Some(parent) = path.parent() {
                            let _ = std::fs::create_dir_all(parent);
                        }
                        let _ = std::fs::write(path, output);
                    }
                    Some(ProcessExit::Exited(code))
                }
            };
            Ok(FakeProcessHandle { exit, adapter: Arc::clone(&self.inner) })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessAdapter, FakeProcessHandle, FakeRun};

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
