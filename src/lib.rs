//! winpack - build front-end for Compose Desktop projects on Windows
//!
//! Before any Gradle task runs, winpack makes sure a usable JDK is present and
//! that its path can be handed to the Gradle wrapper. It then runs the clean,
//! format-fix and packaging tasks in order and reports what was produced.
//!
//! # Pipeline
//!
//! 1. **Probe** ([`toolchain`]): locate `java`, require `javac`, enforce Java 17+
//! 2. **Normalize** ([`normalize`]): swap a whitespace-containing `JAVA_HOME`
//!    for a pre-made alias, or fail with instructions
//! 3. **Invoke** ([`build`]): clean (optional), format fix (advisory), primary task
//! 4. **Report** ([`report`]): list artifacts under the conventional locations
//!
//! [`pipeline::BuildPipeline`] runs the stages in order. Every stage reads an
//! explicit [`config::WinpackConfig`] built from an environment snapshot; the
//! process environment is never modified.
//!
//! # Example
//!
//! ```no_run
//! use winpack::build::{BuildTarget, StdoutRoute};
//! use winpack::pipeline::{BuildOptions, BuildPipeline};
//! use winpack::WinpackConfig;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pipeline = BuildPipeline::new(WinpackConfig::load()?);
//! let report = pipeline
//!     .run(&BuildOptions {
//!         target: BuildTarget::Dist,
//!         clean: true,
//!         project_dir: ".".into(),
//!         stdout: StdoutRoute::Inherit,
//!     })
//!     .await?;
//!
//! for artifact in &report.result.artifacts {
//!     println!("{}: {}", artifact.kind.label(), artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod fs;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod toolchain;
pub mod util;

pub use config::{ConfigError, EnvSnapshot, HostPlatform, WinpackConfig};
pub use error::{BuildError, MIN_JAVA_VERSION};
pub use pipeline::{BuildOptions, BuildPipeline};
pub use report::BuildReport;
pub use toolchain::ToolchainDescriptor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
