//! Subprocess execution behind the [`CommandRunner`] trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, warn};

/// Where a child's stdout ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdoutRoute {
    /// Shares winpack's stdout
    #[default]
    Inherit,
    /// Copied to winpack's stderr, keeping stdout free for a machine-readable report
    Stderr,
}

/// A single wrapper call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub env: Vec<(String, OsString)>,
    pub stdout: StdoutRoute,
}

impl Invocation {
    /// First argument, which is always the Gradle task name.
    pub fn task(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// How a subprocess ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit status; -1 when the process was terminated by a signal
    pub code: i32,
    /// Lines the process wrote to stderr
    pub advisories: Vec<String>,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion. `Err` means the process could not be started.
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome>;
}

/// Spawns real processes.
///
/// Stdout follows the invocation's [`StdoutRoute`]. Stderr is read line by
/// line and re-emitted as warnings; Gradle writes non-fatal noise there, often
/// in the console code page, so only the exit status decides success.
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        debug!(
            program = %invocation.program.display(),
            args = ?invocation.args,
            cwd = %invocation.cwd.display(),
            "Spawning"
        );

        let stdout = match invocation.stdout {
            StdoutRoute::Inherit => Stdio::inherit(),
            StdoutRoute::Stderr => Stdio::piped(),
        };
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::piped())
            .spawn()?;

        let (advisories, ()) = tokio::join!(
            read_advisories(child.stderr.take()),
            forward_stdout(child.stdout.take())
        );

        let status = child.wait().await?;
        Ok(ProcessOutcome {
            code: status.code().unwrap_or(-1),
            advisories,
        })
    }
}

/// Collects non-blank stderr lines. Undecodable bytes are replaced, and a read
/// error ends collection without failing the step.
async fn read_advisories(stderr: Option<ChildStderr>) -> Vec<String> {
    let mut advisories = Vec::new();
    let Some(stderr) = stderr else {
        return advisories;
    };

    let mut segments = BufReader::new(stderr).split(b'\n');
    loop {
        match segments.next_segment().await {
            Ok(Some(bytes)) => {
                let line = String::from_utf8_lossy(&bytes);
                let line = line.trim_end_matches('\r');
                if !line.trim().is_empty() {
                    warn!(target: "winpack::gradle", "{}", line);
                    advisories.push(line.to_string());
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Stopped reading wrapper stderr");
                break;
            }
        }
    }
    advisories
}

async fn forward_stdout(stdout: Option<ChildStdout>) {
    let Some(mut stdout) = stdout else {
        return;
    };
    if let Err(e) = tokio::io::copy(&mut stdout, &mut tokio::io::stderr()).await {
        warn!(error = %e, "Stopped forwarding wrapper stdout");
    }
}

/// Records invocations and answers with scripted exit codes, keyed by task.
///
/// Tasks without a scripted code exit 0.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
    exit_codes: HashMap<String, i32>,
    unspawnable: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exit_code(mut self, task: &str, code: i32) -> Self {
        self.exit_codes.insert(task.to_string(), code);
        self
    }

    /// Makes `task` fail to spawn, as if the program were missing.
    pub fn with_spawn_failure(mut self, task: &str) -> Self {
        self.unspawnable.push(task.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tasks(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|c| c.task().map(str::to_string))
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<ProcessOutcome> {
        self.calls.lock().unwrap().push(invocation.clone());

        let task = invocation.task().unwrap_or_default();
        if self.unspawnable.iter().any(|t| t == task) {
            return Err(io::Error::new(io::ErrorKind::NotFound, "program not found"));
        }

        Ok(ProcessOutcome {
            code: self.exit_codes.get(task).copied().unwrap_or(0),
            advisories: Vec::new(),
        })
    }
}
