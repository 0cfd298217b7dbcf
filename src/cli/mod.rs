pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{BuildArgs, CliArgs, Commands, DoctorArgs};
pub use handlers::{handle_build, handle_doctor};
pub use output::{FailureReport, OutputFormat, OutputFormatter};
