use winpack::cli::commands::{CliArgs, Commands};
use winpack::cli::handlers::{handle_build, handle_doctor};
use winpack::util::{init_logging, LoggingConfig};
use winpack::{NAME, VERSION};

use clap::Parser;
use std::process;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging(LoggingConfig::from_args(
        args.log_level.as_deref(),
        args.verbose,
        args.quiet,
    ));

    debug!("{} v{} starting", NAME, VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Build(build_args) => handle_build(build_args).await,
        Commands::Doctor(doctor_args) => handle_doctor(doctor_args).await,
    };

    process::exit(exit_code);
}
