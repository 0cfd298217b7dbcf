//! Structured logging setup for winpack
//!
//! Logs go to stderr so that stdout carries only the final report, plus the
//! wrapper's own output in human format. Subprocess stderr is re-emitted under the `winpack::gradle`
//! target.
//!
//! Level precedence: `--log-level`, then `-v`/`-q`, then `WINPACK_LOG_LEVEL`,
//! then `info`. When `RUST_LOG` is set it replaces all of them.

use crate::config::parse_bool;
use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., winpack::build::invoker) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Resolves the level from command-line flags, falling back to
    /// `WINPACK_LOG_LEVEL` and `WINPACK_LOG_JSON`.
    pub fn from_args(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let env_level = env::var("WINPACK_LOG_LEVEL").ok();
        let use_json = env::var("WINPACK_LOG_JSON").ok();

        Self {
            level: resolve_level(log_level, verbose, quiet, env_level.as_deref()),
            use_json: json_enabled(use_json.as_deref()),
            include_location: verbose,
            ..Default::default()
        }
    }
}

pub fn resolve_level(
    log_level: Option<&str>,
    verbose: bool,
    quiet: bool,
    env_level: Option<&str>,
) -> Level {
    if let Some(level_str) = log_level {
        parse_level(level_str)
    } else if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        parse_level(env_level.unwrap_or("info"))
    }
}

/// `WINPACK_LOG_JSON` accepts the same spellings as every other boolean
/// variable. Anything unparseable leaves JSON off.
pub fn json_enabled(value: Option<&str>) -> bool {
    value
        .and_then(|v| parse_bool("WINPACK_LOG_JSON", v).ok())
        .unwrap_or(false)
}

/// Parses a log level, case-insensitively. Unknown values fall back to INFO.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = if env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(format!("warn,winpack={}", config.level))
        };

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
