//! Toolchain locators: where to look for a Java runtime on each host family.

use crate::config::{HostPlatform, WinpackConfig};
use crate::fs::FileSystem;
use serde::Serialize;
use std::cmp::Ordering;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How the runtime was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    JavaHome,
    SearchPath,
    VendorDirectory,
}

/// A runtime executable plus the installation root it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedRuntime {
    pub java_home: PathBuf,
    pub java: PathBuf,
    /// Effective search path for the rest of the run
    pub search_path: OsString,
    pub source: LocationSource,
}

pub trait ToolchainLocator: Send + Sync {
    fn name(&self) -> &str;

    fn locate(&self, fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime>;
}

/// Picks the locator for the host family. Called once at startup.
pub fn locator_for(platform: HostPlatform) -> Box<dyn ToolchainLocator> {
    match platform {
        HostPlatform::Windows => Box::new(WindowsLocator),
        HostPlatform::Posix => Box::new(PosixLocator),
    }
}

/// `JAVA_HOME`, then `PATH`.
pub struct PosixLocator;

impl ToolchainLocator for PosixLocator {
    fn name(&self) -> &str {
        "posix"
    }

    fn locate(&self, fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime> {
        from_java_home(fs, config).or_else(|| from_search_path(fs, config))
    }
}

/// `JAVA_HOME`, then `PATH`, then the conventional vendor install roots.
pub struct WindowsLocator;

impl ToolchainLocator for WindowsLocator {
    fn name(&self) -> &str {
        "windows"
    }

    fn locate(&self, fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime> {
        from_java_home(fs, config)
            .or_else(|| from_search_path(fs, config))
            .or_else(|| from_vendor_roots(fs, config))
    }
}

fn java_in(home: &Path, platform: HostPlatform) -> PathBuf {
    home.join("bin").join(platform.executable("java"))
}

fn from_java_home(fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime> {
    let home = config.java_home.as_ref()?;
    let java = java_in(home, config.platform);

    if !fs.is_file(&java) {
        warn!(
            java_home = %home.display(),
            "JAVA_HOME does not contain a Java runtime, ignoring it"
        );
        return None;
    }

    debug!(java = %java.display(), "Using JAVA_HOME");
    Some(LocatedRuntime {
        java_home: home.clone(),
        java,
        search_path: config.search_path.clone(),
        source: LocationSource::JavaHome,
    })
}

fn from_search_path(fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime> {
    let found = fs.find_executable(&config.platform.executable("java"), &config.search_path)?;

    // /usr/bin/java is usually a symlink into the real installation
    let java = fs.canonicalize(&found).unwrap_or_else(|_| found.clone());
    let java_home = java.parent().and_then(Path::parent)?.to_path_buf();

    debug!(
        found = %found.display(),
        resolved = %java.display(),
        "Found java on PATH"
    );
    Some(LocatedRuntime {
        java_home,
        java,
        search_path: config.search_path.clone(),
        source: LocationSource::SearchPath,
    })
}

fn from_vendor_roots(fs: &dyn FileSystem, config: &WinpackConfig) -> Option<LocatedRuntime> {
    for root in &config.vendor_roots {
        if !fs.is_dir(root) {
            debug!(root = %root.display(), "Vendor root not present");
            continue;
        }

        let Some(java_home) = newest_installation(fs, root, config.platform) else {
            continue;
        };

        let java = java_in(&java_home, config.platform);
        let search_path = prepend_path(&java_home.join("bin"), &config.search_path);
        info!(java_home = %java_home.display(), "Found Java in vendor install directory");

        return Some(LocatedRuntime {
            java_home,
            java,
            search_path,
            source: LocationSource::VendorDirectory,
        });
    }

    None
}

/// The root itself if it is an installation, otherwise its best child.
///
/// Children are ranked JDKs before anything else, then by descending
/// version numbers in the directory name (`jdk-21.0.2` before `jdk-17.0.9`).
fn newest_installation(fs: &dyn FileSystem, root: &Path, platform: HostPlatform) -> Option<PathBuf> {
    if fs.is_file(&java_in(root, platform)) {
        return Some(root.to_path_buf());
    }

    let mut candidates: Vec<_> = fs
        .read_dir(root)
        .ok()?
        .into_iter()
        .filter(|entry| entry.is_dir())
        .filter(|entry| fs.is_file(&java_in(entry.path(), platform)))
        .collect();

    candidates.sort_by(|a, b| rank_installation(b.file_name(), a.file_name()));
    candidates.into_iter().next().map(|entry| entry.path)
}

fn rank_installation(a: &str, b: &str) -> Ordering {
    let is_jdk = |name: &str| name.to_ascii_lowercase().starts_with("jdk");
    is_jdk(a)
        .cmp(&is_jdk(b))
        .then_with(|| version_key(a).cmp(&version_key(b)))
        .then_with(|| a.cmp(b))
}

fn version_key(name: &str) -> Vec<u32> {
    name.split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Puts `dir` in front of an existing `PATH`-style list.
pub fn prepend_path(dir: &Path, search_path: &OsString) -> OsString {
    let paths = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(search_path));
    // join_paths only fails on entries containing the separator itself
    std::env::join_paths(paths).unwrap_or_else(|_| search_path.clone())
}
