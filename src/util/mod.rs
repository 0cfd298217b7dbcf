//! Utility modules for winpack

pub mod logging;

pub use logging::{init_logging, LoggingConfig};
