//! Java toolchain discovery.
//!
//! - [`locator`]: where to look, one implementation per host family
//! - [`version`]: banner parsing behind the [`VersionQuery`] trait
//! - [`prober`]: combines the two and enforces the version floor

pub mod locator;
pub mod prober;
pub mod version;

pub use locator::{locator_for, LocatedRuntime, LocationSource, ToolchainLocator};
pub use prober::EnvironmentProber;
pub use version::{parse_version_banner, JavaVersion, JavaVersionQuery, VersionQuery};

use serde::{Serialize, Serializer};
use std::ffi::OsString;
use std::path::PathBuf;

/// Result of a successful probe, consumed by the normalizer and the invoker.
#[derive(Debug, Clone, Serialize)]
pub struct ToolchainDescriptor {
    pub java_home: PathBuf,
    pub java: PathBuf,
    pub javac: PathBuf,
    pub version: JavaVersion,
    #[serde(serialize_with = "serialize_search_path")]
    pub search_path: OsString,
    pub source: LocationSource,
}

fn serialize_search_path<S: Serializer>(value: &OsString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string_lossy())
}
