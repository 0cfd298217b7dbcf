//! The four-stage build pipeline.
//!
//! ```text
//! probe toolchain -> normalize JAVA_HOME -> invoke wrapper -> report
//! ```
//!
//! Each stage may end the run with a [`BuildError`]. The first two stages
//! never start a wrapper subprocess, so toolchain and path problems are caught
//! before anything touches the project.

use crate::build::{
    BuildInvoker, BuildRequest, BuildTarget, CommandRunner, StdoutRoute, SystemRunner,
};
use crate::config::WinpackConfig;
use crate::error::BuildError;
use crate::fs::{FileSystem, RealFileSystem};
use crate::normalize::{NormalizedHome, PathNormalizer};
use crate::report::{BuildReport, ResultReporter};
use crate::toolchain::{
    locator_for, EnvironmentProber, JavaVersionQuery, ToolchainDescriptor, ToolchainLocator,
    VersionQuery,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// What the operator asked for on the command line.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub target: BuildTarget,
    pub clean: bool,
    pub project_dir: PathBuf,
    /// Where wrapper stdout goes; `Stderr` when stdout carries a report
    pub stdout: StdoutRoute,
}

/// Output of stages 1 and 2.
#[derive(Debug, Clone, Serialize)]
pub struct PreparedToolchain {
    pub toolchain: ToolchainDescriptor,
    pub java_home: NormalizedHome,
}

/// What `doctor` reports: stages 1 and 2 plus the wrapper location.
#[derive(Debug, Clone, Serialize)]
pub struct DoctorReport {
    #[serde(flatten)]
    pub prepared: PreparedToolchain,
    pub wrapper: PathBuf,
}

pub struct BuildPipeline {
    config: WinpackConfig,
    fs: Arc<dyn FileSystem>,
    runner: Arc<dyn CommandRunner>,
    version_query: Arc<dyn VersionQuery>,
    locator: Box<dyn ToolchainLocator>,
}

impl BuildPipeline {
    /// Pipeline wired to the real file system and real subprocesses.
    pub fn new(config: WinpackConfig) -> Self {
        Self::with_components(
            config,
            Arc::new(RealFileSystem::new()),
            Arc::new(SystemRunner),
            Arc::new(JavaVersionQuery),
        )
    }

    pub fn with_components(
        config: WinpackConfig,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn CommandRunner>,
        version_query: Arc<dyn VersionQuery>,
    ) -> Self {
        let locator = locator_for(config.platform);
        Self {
            config,
            fs,
            runner,
            version_query,
            locator,
        }
    }

    pub fn config(&self) -> &WinpackConfig {
        &self.config
    }

    /// Stages 1 and 2: find the toolchain and settle on a JAVA_HOME.
    pub async fn prepare(&self) -> Result<PreparedToolchain, BuildError> {
        let prober = EnvironmentProber::new(
            self.fs.as_ref(),
            self.locator.as_ref(),
            self.version_query.as_ref(),
        );
        let toolchain = prober.probe(&self.config).await?;

        let java_home = PathNormalizer::new(self.fs.as_ref(), &self.config).normalize(&toolchain)?;

        Ok(PreparedToolchain {
            toolchain,
            java_home,
        })
    }

    /// Checks everything a build needs without starting the wrapper.
    pub async fn diagnose(&self, project_dir: &Path) -> Result<DoctorReport, BuildError> {
        let prepared = self.prepare().await?;
        let wrapper = BuildInvoker::new(self.fs.as_ref(), self.runner.as_ref(), &self.config)
            .wrapper(project_dir)?;
        Ok(DoctorReport { prepared, wrapper })
    }

    /// Runs all four stages.
    pub async fn run(&self, options: &BuildOptions) -> Result<BuildReport, BuildError> {
        let prepared = self.prepare().await?;

        let request = BuildRequest::new(
            options.target,
            options.clean,
            &self.config,
            &prepared.toolchain,
            &prepared.java_home,
        )
        .with_stdout(options.stdout);

        let invoker = BuildInvoker::new(self.fs.as_ref(), self.runner.as_ref(), &self.config);
        let mut summary = invoker.invoke(&request, &options.project_dir).await?;

        let result =
            ResultReporter::new(self.fs.as_ref()).report(&options.project_dir, &mut summary.advisories);
        info!(
            artifacts = result.artifacts.len(),
            "Build completed successfully"
        );

        Ok(BuildReport {
            target: options.target,
            toolchain: prepared.toolchain,
            java_home: prepared.java_home,
            steps: summary.steps,
            advisories: summary.advisories,
            result,
        })
    }
}
