use super::request::BuildRequest;
use super::runner::{CommandRunner, Invocation};
use crate::config::WinpackConfig;
use crate::error::BuildError;
use crate::fs::FileSystem;
use crate::report::{Advisory, AdvisoryKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Clean,
    Format,
    Primary,
}

/// Record of one wrapper call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub kind: StepKind,
    pub task: String,
    /// None when the process could not be started
    pub exit_code: Option<i32>,
}

/// What the invoker did when the primary step succeeded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InvocationSummary {
    pub steps: Vec<StepRecord>,
    pub advisories: Vec<Advisory>,
}

impl InvocationSummary {
    fn advise(&mut self, kind: AdvisoryKind, message: String) {
        warn!(kind = ?kind, "{}", message);
        self.advisories.push(Advisory::new(kind, message));
    }
}

/// Stage 3: runs clean, format-fix and the primary task through the wrapper.
pub struct BuildInvoker<'a> {
    fs: &'a dyn FileSystem,
    runner: &'a dyn CommandRunner,
    config: &'a WinpackConfig,
}

impl<'a> BuildInvoker<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        runner: &'a dyn CommandRunner,
        config: &'a WinpackConfig,
    ) -> Self {
        Self { fs, runner, config }
    }

    /// Path of the Gradle wrapper, or `WrapperMissing`.
    pub fn wrapper(&self, project_dir: &Path) -> Result<PathBuf, BuildError> {
        let wrapper = project_dir.join(self.config.platform.wrapper_script());
        if self.fs.is_file(&wrapper) {
            Ok(wrapper)
        } else {
            Err(BuildError::WrapperMissing(wrapper))
        }
    }

    pub async fn invoke(
        &self,
        request: &BuildRequest,
        project_dir: &Path,
    ) -> Result<InvocationSummary, BuildError> {
        let wrapper = self.wrapper(project_dir)?;
        let mut summary = InvocationSummary::default();

        if request.clean {
            let code = self
                .run_step(&wrapper, project_dir, request, StepKind::Clean, "clean", &mut summary)
                .await?;
            if code != 0 {
                return Err(BuildError::CleanFailed(code));
            }
        }

        if let Some(task) = &request.format_task {
            match self
                .run_step(&wrapper, project_dir, request, StepKind::Format, task, &mut summary)
                .await
            {
                Ok(0) => {}
                Ok(code) => summary.advise(
                    AdvisoryKind::FormatFailed,
                    format!("{} exited with code {}; continuing", task, code),
                ),
                Err(e) => summary.advise(
                    AdvisoryKind::FormatFailed,
                    format!("{} could not run ({}); continuing", task, e),
                ),
            }
        }

        if request.target.requires_credentials() {
            let marker = project_dir.join(&self.config.credentials_file);
            if !self.fs.is_file(&marker) {
                summary.advise(
                    AdvisoryKind::CredentialsMissing,
                    format!(
                        "{} not found; the installer will be built unsigned",
                        self.config.credentials_file
                    ),
                );
            }
        }

        let task = request.target.task_name();
        let code = self
            .run_step(&wrapper, project_dir, request, StepKind::Primary, task, &mut summary)
            .await?;
        if code != 0 {
            return Err(BuildError::PrimaryBuildFailed(code));
        }

        Ok(summary)
    }

    async fn run_step(
        &self,
        wrapper: &Path,
        project_dir: &Path,
        request: &BuildRequest,
        kind: StepKind,
        task: &str,
        summary: &mut InvocationSummary,
    ) -> Result<i32, BuildError> {
        info!(step = ?kind, task, "Running {}", task);

        let invocation = Invocation {
            program: wrapper.to_path_buf(),
            args: request.args_for(task),
            cwd: project_dir.to_path_buf(),
            env: request
                .env_overrides
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            stdout: request.stdout,
        };

        match self.runner.run(&invocation).await {
            Ok(outcome) => {
                summary.steps.push(StepRecord {
                    kind,
                    task: task.to_string(),
                    exit_code: Some(outcome.code),
                });
                Ok(outcome.code)
            }
            Err(source) => {
                summary.steps.push(StepRecord {
                    kind,
                    task: task.to_string(),
                    exit_code: None,
                });
                Err(BuildError::Spawn {
                    program: wrapper.to_path_buf(),
                    source,
                })
            }
        }
    }
}
