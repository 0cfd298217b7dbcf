use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::build::BuildTarget;

/// Build front-end for a Compose Desktop project on Windows
#[derive(Parser, Debug)]
#[command(
    name = "winpack",
    about = "Build front-end for a Compose Desktop project on Windows",
    version,
    author,
    long_about = "winpack finds a suitable Java toolchain, works around Windows install paths \
                  that the Gradle wrapper cannot handle, runs the clean, format and packaging \
                  tasks in order, and lists the artifacts that were produced."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build the project",
        long_about = "Validates the Java toolchain, then runs clean, the format fix and the \
                      packaging task through the Gradle wrapper.\n\n\
                      Examples:\n  \
                      winpack build\n  \
                      winpack build --clean false\n  \
                      winpack build --build-type msi\n  \
                      winpack build --project-dir ../desktop --format json"
    )]
    Build(BuildArgs),

    #[command(
        about = "Check that a build could run",
        long_about = "Probes the Java toolchain, resolves the JAVA_HOME the build would use \
                      and checks for the Gradle wrapper. Nothing is executed in the project.\n\n\
                      Examples:\n  \
                      winpack doctor\n  \
                      winpack doctor --format yaml"
    )]
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    #[arg(
        long,
        value_name = "BOOL",
        action = ArgAction::Set,
        default_value_t = true,
        help = "Run the clean task first"
    )]
    pub clean: bool,

    #[arg(long, help = "Skip the clean task (same as --clean false)")]
    pub no_clean: bool,

    #[arg(
        short = 't',
        long,
        value_enum,
        default_value = "dist",
        help = "Artifact to produce"
    )]
    pub build_type: BuildTypeArg,

    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        help = "Project directory (defaults to current directory)"
    )]
    pub project_dir: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

impl BuildArgs {
    pub fn clean_requested(&self) -> bool {
        self.clean && !self.no_clean
    }
}

#[derive(Parser, Debug, Clone)]
pub struct DoctorArgs {
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        help = "Project directory (defaults to current directory)"
    )]
    pub project_dir: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTypeArg {
    /// Portable distribution
    Dist,
    /// Windows installer
    Msi,
}

impl From<BuildTypeArg> for BuildTarget {
    fn from(arg: BuildTypeArg) -> Self {
        match arg {
            BuildTypeArg::Dist => BuildTarget::Dist,
            BuildTypeArg::Msi => BuildTarget::Msi,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
