//! Subcommand handlers. Each returns the process exit code.

use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::commands::{BuildArgs, DoctorArgs};
use super::output::{FailureReport, OutputFormat, OutputFormatter};
use crate::build::StdoutRoute;
use crate::config::WinpackConfig;
use crate::error::BuildError;
use crate::pipeline::{BuildOptions, BuildPipeline};

pub async fn handle_build(args: &BuildArgs) -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };
    let Some(project_dir) = resolve_project_dir(args.project_dir.as_deref()) else {
        return 1;
    };

    let format: OutputFormat = args.format.into();
    let options = BuildOptions {
        target: args.build_type.into(),
        clean: args.clean_requested(),
        project_dir,
        stdout: stdout_route(format),
    };
    info!(
        build_type = options.target.as_str(),
        clean = options.clean,
        project = %options.project_dir.display(),
        "Starting build"
    );

    let formatter = OutputFormatter::new(format);
    let pipeline = BuildPipeline::new(config);

    match pipeline.run(&options).await {
        Ok(report) => match formatter.format_report(&report) {
            Ok(output) => {
                println!("{}", output);
                0
            }
            Err(e) => {
                error!("Failed to format output: {:#}", e);
                1
            }
        },
        Err(e) => report_failure(&formatter, format, &pipeline, &e),
    }
}

/// Wrapper output must not land in front of a JSON or YAML report.
fn stdout_route(format: OutputFormat) -> StdoutRoute {
    match format {
        OutputFormat::Human => StdoutRoute::Inherit,
        OutputFormat::Json | OutputFormat::Yaml => StdoutRoute::Stderr,
    }
}

pub async fn handle_doctor(args: &DoctorArgs) -> i32 {
    let Some(config) = load_config() else {
        return 1;
    };
    let Some(project_dir) = resolve_project_dir(args.project_dir.as_deref()) else {
        return 1;
    };
    debug!("{}", config);

    let formatter = OutputFormatter::new(args.format.into());
    let pipeline = BuildPipeline::new(config);

    match pipeline.diagnose(&project_dir).await {
        Ok(report) => match formatter.format_doctor(&report) {
            Ok(output) => {
                println!("{}", output);
                0
            }
            Err(e) => {
                error!("Failed to format output: {:#}", e);
                1
            }
        },
        Err(e) => report_failure(&formatter, args.format.into(), &pipeline, &e),
    }
}

fn load_config() -> Option<WinpackConfig> {
    match WinpackConfig::load() {
        Ok(config) => Some(config),
        Err(e) => {
            error!("Configuration error: {}", e);
            eprintln!("\nPlease check your WINPACK_* environment variables.");
            None
        }
    }
}

fn resolve_project_dir(arg: Option<&Path>) -> Option<PathBuf> {
    let project_dir = match arg {
        Some(dir) => dir.to_path_buf(),
        None => match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Failed to get current directory: {}", e);
                return None;
            }
        },
    };

    if !project_dir.is_dir() {
        error!(
            "Project directory does not exist: {}",
            project_dir.display()
        );
        return None;
    }

    debug!("Project directory: {}", project_dir.display());
    Some(project_dir)
}

/// Prints the failure and returns 1.
///
/// Machine formats go to stdout so callers can parse them; human output goes
/// to stderr.
fn report_failure(
    formatter: &OutputFormatter,
    format: OutputFormat,
    pipeline: &BuildPipeline,
    err: &BuildError,
) -> i32 {
    error!(kind = err.kind(), "{}", err);

    let failure = FailureReport::new(err, pipeline.config().platform);
    match formatter.format_failure(&failure) {
        Ok(output) if format == OutputFormat::Human => eprintln!("{}", output),
        Ok(output) => println!("{}", output),
        Err(e) => error!("Failed to format output: {:#}", e),
    }

    1
}
