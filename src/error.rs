//! Fatal build errors and their operator remediation hints.

use crate::config::HostPlatform;
use std::path::PathBuf;
use thiserror::Error;

/// Minimum supported Java feature release.
pub const MIN_JAVA_VERSION: u32 = 17;

/// Every variant is terminal for the run; nothing is retried.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("No Java runtime found on PATH, JAVA_HOME or in known install locations")]
    ToolchainMissing,

    #[error("Java runtime found at {java_home:?} but the compiler (javac) is missing; this looks like a JRE-only install")]
    CompilerMissing { java_home: PathBuf },

    #[error("Java {found} found at {java_home:?}, but {required} or newer is required")]
    VersionTooLow {
        found: u32,
        required: u32,
        java_home: PathBuf,
    },

    #[error("Java installation path contains whitespace and no usable alias exists at {alias:?}: {path:?}")]
    UnsupportedPath {
        path: PathBuf,
        alias: PathBuf,
        instructions: Vec<String>,
    },

    #[error("Gradle wrapper not found at {0:?}")]
    WrapperMissing(PathBuf),

    #[error("Clean step failed with exit code {0}")]
    CleanFailed(i32),

    #[error("Build failed with exit code {0}")]
    PrimaryBuildFailed(i32),

    #[error("Failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    /// Short machine-friendly classification, used in JSON/YAML reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::ToolchainMissing => "toolchain_missing",
            BuildError::CompilerMissing { .. } => "compiler_missing",
            BuildError::VersionTooLow { .. } => "version_too_low",
            BuildError::UnsupportedPath { .. } => "unsupported_path",
            BuildError::WrapperMissing(_) => "wrapper_missing",
            BuildError::CleanFailed(_) => "clean_failed",
            BuildError::PrimaryBuildFailed(_) => "primary_build_failed",
            BuildError::Spawn { .. } => "spawn_failed",
        }
    }

    /// Exit status of the failed subprocess, if there was one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BuildError::CleanFailed(code) | BuildError::PrimaryBuildFailed(code) => Some(*code),
            _ => None,
        }
    }

    /// Operator-facing lines describing how to fix the condition.
    pub fn remediation(&self, platform: HostPlatform) -> Vec<String> {
        match self {
            BuildError::ToolchainMissing | BuildError::CompilerMissing { .. } => {
                let mut hint = install_hint(platform);
                hint.push(
                    "Or set JAVA_HOME to an existing JDK installation, or add its bin directory to PATH"
                        .to_string(),
                );
                hint
            }
            BuildError::VersionTooLow { .. } => {
                let mut hint = install_hint(platform);
                hint.push(format!(
                    "Then point JAVA_HOME at the new JDK so it takes precedence over the older one (need {}+)",
                    MIN_JAVA_VERSION
                ));
                hint
            }
            BuildError::UnsupportedPath { instructions, .. } => instructions.clone(),
            BuildError::WrapperMissing(_) => vec![
                "Run winpack from the project root that contains the Gradle wrapper".to_string(),
                "Or pass --project-dir <DIR>".to_string(),
            ],
            BuildError::CleanFailed(_) => vec![
                "Check the output above; a locked file under build/ is the usual cause on Windows"
                    .to_string(),
                "Re-run with --clean false to skip the clean step".to_string(),
            ],
            BuildError::PrimaryBuildFailed(_) => vec![
                "Check the build output above for the failing task".to_string(),
                "Re-run with WINPACK_GRADLE_ARGS=\"--stacktrace\" for more detail".to_string(),
            ],
            BuildError::Spawn { .. } => vec![
                "Make sure the Gradle wrapper is executable (chmod +x gradlew)".to_string(),
            ],
        }
    }
}

fn install_hint(platform: HostPlatform) -> Vec<String> {
    match platform {
        HostPlatform::Windows => {
            vec!["Install a JDK: winget install Microsoft.OpenJDK.21".to_string()]
        }
        HostPlatform::Posix => vec![
            "Install a JDK: sdk install java 21-tem".to_string(),
            "  or with your package manager, e.g. apt install openjdk-21-jdk".to_string(),
        ],
    }
}
